//! The factory provisioning flow.
//!
//! [`FactoryFlow`] runs once per device:
//!
//! ```text
//! Idle → CertLoaded → CnExtracted → ItemsStored → TrustAnchorSet
//!      → FingerprintReady → AwaitingOperatorAck → Done
//! ```
//!
//! Any failure moves the flow to [`FlowState::Failed`] and aborts the run.
//! Nothing is retried; the operator re-invokes the flow.
//!
//! # Example
//!
//! ```no_run
//! use factory_identity::{FactoryFlow, FileBlobStore, FileProvisioningStore, StdConsole};
//!
//! let blobs = FileBlobStore::new("/var/lib/factory/blobs");
//! let store = FileProvisioningStore::create("/var/lib/factory/store").unwrap();
//! let mut flow = FactoryFlow::new(blobs, store, StdConsole::new());
//! let report = flow.run().unwrap();
//! println!("provisioned {}", report.endpoint_name);
//! ```

use crate::certificate::{extract_common_name, CertificateBuffer, CommonName};
use crate::console::OperatorConsole;
use crate::fingerprint::{enrollment_id_with, DigestEngine, EnrollmentId, Sha256Engine};
use crate::items::{factory_items, names};
use crate::profile::DeviceProfile;
use crate::store::{BlobStore, ProvisioningStore, StorageUid};
use crate::{Error, Result, DEVICE_CERT_MAX_LEN, DEVICE_CERT_STORAGE_ID};
use tracing::{debug, error, info};

/// Key the operator presses after registering the enrollment ID.
pub const ACK_KEY: u8 = b'c';

/// Progress of a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    CertLoaded,
    CnExtracted,
    ItemsStored,
    TrustAnchorSet,
    FingerprintReady,
    AwaitingOperatorAck,
    Done,
    /// Terminal failure, with the failing step and its error.
    Failed(String),
}

/// Outcome of a successful provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    /// Subject CN, used as endpoint name and serial number.
    pub endpoint_name: CommonName,
    /// Enrollment ID shown to the operator.
    pub enrollment_id: EnrollmentId,
    /// Names of the items written, in write order.
    pub items_written: Vec<&'static str>,
}

/// Drives one factory provisioning run over its collaborators.
pub struct FactoryFlow<B, P, C> {
    blobs: B,
    store: P,
    console: C,
    profile: DeviceProfile,
    cert_uid: StorageUid,
    digest: Box<dyn DigestEngine>,
    state: FlowState,
    step: &'static str,
}

impl<B, P, C> FactoryFlow<B, P, C>
where
    B: BlobStore,
    P: ProvisioningStore,
    C: OperatorConsole,
{
    /// Creates a flow with the default device profile and certificate UID.
    pub fn new(blobs: B, store: P, console: C) -> Self {
        Self {
            blobs,
            store,
            console,
            profile: DeviceProfile::default(),
            cert_uid: DEVICE_CERT_STORAGE_ID,
            digest: Box::new(Sha256Engine),
            state: FlowState::Idle,
            step: "start",
        }
    }

    /// Uses `profile` for the static item values.
    pub fn with_profile(mut self, profile: DeviceProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Reads the device certificate from `uid` instead of [`DEVICE_CERT_STORAGE_ID`].
    pub fn with_cert_uid(mut self, uid: StorageUid) -> Self {
        self.cert_uid = uid;
        self
    }

    /// Uses `engine` to hash the device certificate.
    pub fn with_digest_engine(mut self, engine: impl DigestEngine + 'static) -> Self {
        self.digest = Box::new(engine);
        self
    }

    /// Returns the current state.
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Returns the blob store the certificate is read from.
    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Returns the provisioning store items are written to.
    pub fn store(&self) -> &P {
        &self.store
    }

    /// Returns the operator console.
    pub fn console(&self) -> &C {
        &self.console
    }

    /// Runs the flow to completion, including the blocking operator wait.
    ///
    /// A flow runs at most once; calling this again fails.
    pub fn run(&mut self) -> Result<ProvisionReport> {
        if self.state != FlowState::Idle {
            return Err(Error::InvalidParameter(format!(
                "provisioning flow already ran (state {:?})",
                self.state
            )));
        }

        info!(cert_uid = self.cert_uid, "starting factory provisioning");
        match self.execute() {
            Ok(report) => {
                self.transition(FlowState::Done);
                info!(
                    endpoint_name = %report.endpoint_name,
                    items = report.items_written.len(),
                    "factory provisioning complete"
                );
                Ok(report)
            }
            Err(e) => {
                error!(step = self.step, error = %e, "factory provisioning failed");
                self.state = FlowState::Failed(format!("{}: {e}", self.step));
                Err(e)
            }
        }
    }

    fn execute(&mut self) -> Result<ProvisionReport> {
        self.begin("check provisioning store");
        if !self.store.is_initialized() {
            return Err(Error::NotInitialized);
        }

        self.begin("load device certificate");
        let cert = self.load_certificate()?;
        self.transition(FlowState::CertLoaded);

        self.begin("extract common name");
        let common_name = extract_common_name(cert.der())?;
        info!(endpoint_name = %common_name, "device common name");
        self.transition(FlowState::CnExtracted);

        self.begin("store factory items");
        let items = factory_items(&self.profile, &common_name, cert.der());
        let mut items_written = Vec::with_capacity(items.len());
        for item in &items {
            self.store
                .store_item(item, true)
                .map_err(|e| Error::ItemWrite {
                    item: item.name.to_string(),
                    source: Box::new(e),
                })?;
            items_written.push(item.name);
        }
        self.transition(FlowState::ItemsStored);

        self.begin("set trust anchor");
        self.store
            .set_trust_anchor(names::BOOTSTRAP_SERVER_CA_CERT)
            .map_err(|e| match e {
                Error::TrustAnchor(_) => e,
                other => Error::TrustAnchor(other.to_string()),
            })?;
        self.transition(FlowState::TrustAnchorSet);

        self.begin("compute enrollment ID");
        let enrollment_id = enrollment_id_with(self.digest.as_ref(), cert.der())?;
        self.transition(FlowState::FingerprintReady);

        self.begin("operator acknowledgement");
        self.announce(&enrollment_id)?;
        self.transition(FlowState::AwaitingOperatorAck);
        self.wait_for_ack()?;

        Ok(ProvisionReport {
            endpoint_name: common_name,
            enrollment_id,
            items_written,
        })
    }

    /// Reads the stored PEM certificate (size, then contents) and decodes it.
    fn load_certificate(&mut self) -> Result<CertificateBuffer> {
        let info = self.blobs.info(self.cert_uid)?;
        if info.size > DEVICE_CERT_MAX_LEN {
            return Err(Error::CertificateTooLarge {
                size: info.size,
                max: DEVICE_CERT_MAX_LEN,
            });
        }

        let mut pem = vec![0u8; info.size];
        let read = self.blobs.read(self.cert_uid, &mut pem)?;
        pem.truncate(read);

        let mut cert = CertificateBuffer::new();
        cert.load_pem(&pem)?;
        Ok(cert)
    }

    fn announce(&mut self, enrollment_id: &EnrollmentId) -> Result<()> {
        self.console
            .show("\nWarning: This message will appear only once!\n\n")?;
        self.console
            .show(&format!("Device Enrollment ID is:\n{enrollment_id}\n\n"))?;
        self.console.show(
            "Please add the Enrollment ID to your account and press 'c' key to continue...\n\n",
        )
    }

    fn wait_for_ack(&mut self) -> Result<()> {
        loop {
            match self.console.read_key()? {
                Some(ACK_KEY) => return Ok(()),
                Some(_) => continue,
                None => return Err(Error::OperatorAborted),
            }
        }
    }

    fn begin(&mut self, step: &'static str) {
        debug!(step, "provisioning step");
        self.step = step;
    }

    fn transition(&mut self, next: FlowState) {
        debug!(from = ?self.state, to = ?next, "provisioning state");
        self.state = next;
    }
}
