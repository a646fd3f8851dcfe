//! Factory-time device identity provisioning.
//!
//! This crate turns the device certificate written to secure storage during
//! manufacturing into the items a connected device needs on first boot, and
//! derives the enrollment ID an operator registers out-of-band.
//!
//! # Components
//!
//! - [`pem`] - PEM block to DER decoding into caller-owned buffers
//! - [`certificate`] - Owned certificate buffer and subject CN extraction
//! - [`fingerprint`] - SHA-256 enrollment ID (`A-XX:XX:...`) generation
//! - [`items`] - Factory item table and well-known item names
//! - [`profile`] - Static per-product device metadata
//! - [`trust`] - Bootstrap trust anchor validation
//! - [`store`] - Blob and provisioning store traits with in-memory backends
//! - [`file_store`] - File-backed blob and provisioning stores
//! - [`console`] - Operator console abstraction
//! - [`flow`] - The provisioning orchestrator

pub mod certificate;
pub mod console;
pub mod file_store;
pub mod fingerprint;
pub mod flow;
pub mod items;
pub mod pem;
pub mod profile;
pub mod store;
pub mod trust;

pub use certificate::{
    extract_common_name, extract_common_name_into, CertificateBuffer, CommonName,
};
pub use console::{OperatorConsole, ScriptedConsole, StdConsole};
pub use file_store::{FileBlobStore, FileProvisioningStore};
pub use fingerprint::{enrollment_id, write_enrollment_id, DigestEngine, EnrollmentId, Sha256Engine};
pub use flow::{FactoryFlow, FlowState, ProvisionReport};
pub use items::{factory_items, FactoryItem, ItemKind, ItemValue};
pub use pem::{decode_pem, pem_to_der};
pub use profile::DeviceProfile;
pub use store::{
    BlobInfo, BlobStore, MemoryBlobStore, MemoryProvisioningStore, ProvisioningStore,
    StorageUid, StoredItem,
};
pub use trust::TrustAnchor;

/// Storage identifier of the PEM device certificate in the secure blob store.
pub const DEVICE_CERT_STORAGE_ID: StorageUid = 0x100;

/// Maximum accepted size of the stored device certificate, in bytes.
pub const DEVICE_CERT_MAX_LEN: usize = 2000;

/// Errors that can occur while provisioning a device.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// PEM framing is missing or out of order.
    #[error("malformed PEM: {0}")]
    MalformedPem(String),

    /// The PEM payload is not valid base64.
    #[error("invalid base64 character in PEM payload: {0}")]
    InvalidBase64Character(String),

    /// A caller-supplied buffer cannot hold the result.
    #[error("buffer too small: need {needed} bytes, have {capacity}")]
    BufferTooSmall { needed: usize, capacity: usize },

    /// The stored certificate exceeds [`DEVICE_CERT_MAX_LEN`].
    #[error("certificate is {size} bytes, maximum is {max}")]
    CertificateTooLarge { size: usize, max: usize },

    /// Blob or provisioning store failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Writing a named factory item failed.
    #[error("failed to store factory item {item}: {source}")]
    ItemWrite {
        item: String,
        #[source]
        source: Box<Error>,
    },

    /// DER certificate parsing error.
    #[error("certificate error: {0}")]
    Certificate(String),

    /// Invalid argument supplied by the caller.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A required certificate attribute is missing, empty, or unusable.
    #[error("invalid certificate attribute: {0}")]
    InvalidAttribute(String),

    /// The hash primitive failed.
    #[error("hashing failed: {0}")]
    Hash(String),

    /// The provisioning store has not been initialized.
    #[error("provisioning store not initialized")]
    NotInitialized,

    /// Trust anchor registration failed.
    #[error("failed to set trust anchor: {0}")]
    TrustAnchor(String),

    /// Operator input closed before the enrollment ID was acknowledged.
    #[error("operator input closed before acknowledgement")]
    OperatorAborted,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for factory-identity operations.
pub type Result<T> = std::result::Result<T, Error>;
