//! Bootstrap trust anchor.
//!
//! The bootstrap server CA stored as a factory item becomes the root that
//! later TLS/DTLS handshakes with the bootstrap server are validated against.

use crate::{Error, Result};
use rustls::pki_types::CertificateDer;
use rustls::RootCertStore;
use std::sync::Arc;

/// A validated root CA certificate.
#[derive(Debug, Clone)]
pub struct TrustAnchor {
    der: Vec<u8>,
    subject: String,
}

impl TrustAnchor {
    /// Validates `der` as a CA certificate usable as a TLS root.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        if der.is_empty() {
            return Err(Error::TrustAnchor("empty CA certificate".to_string()));
        }

        let (_, cert) = x509_parser::parse_x509_certificate(der)
            .map_err(|e| Error::TrustAnchor(format!("failed to parse CA certificate: {e}")))?;

        if !cert.is_ca() {
            return Err(Error::TrustAnchor(format!(
                "{} is not a CA certificate",
                cert.subject()
            )));
        }
        let subject = cert.subject().to_string();

        let anchor = Self {
            der: der.to_vec(),
            subject,
        };
        anchor.to_rustls_root_store()?;
        Ok(anchor)
    }

    /// Returns the DER-encoded CA certificate.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Returns the CA subject as a string.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Converts to a rustls RootCertStore.
    pub fn to_rustls_root_store(&self) -> Result<Arc<RootCertStore>> {
        let mut store = RootCertStore::empty();
        store
            .add(CertificateDer::from(self.der.clone()))
            .map_err(|e| Error::TrustAnchor(format!("failed to add root cert: {e}")))?;
        Ok(Arc::new(store))
    }
}
