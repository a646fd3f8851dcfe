//! Device certificate buffer and subject field extraction.
//!
//! [`CertificateBuffer`] is the owned working area for the device
//! certificate during a provisioning run. It is sized to
//! [`DEVICE_CERT_MAX_LEN`](crate::DEVICE_CERT_MAX_LEN) and is filled by
//! decoding the stored PEM blob.

use crate::pem::pem_to_der;
use crate::{Error, Result, DEVICE_CERT_MAX_LEN};
use std::fmt;
use tracing::debug;

/// Maximum length of a subject Common Name, excluding any terminator.
pub const CN_MAX_LEN: usize = 63;

/// Owned, bounded buffer holding one DER certificate.
#[derive(Clone)]
pub struct CertificateBuffer {
    buf: Vec<u8>,
    len: usize,
}

impl CertificateBuffer {
    /// Creates an empty buffer with room for [`DEVICE_CERT_MAX_LEN`] bytes.
    pub fn new() -> Self {
        Self {
            buf: vec![0; DEVICE_CERT_MAX_LEN],
            len: 0,
        }
    }

    /// Creates a buffer holding a copy of `der`.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        if der.len() > DEVICE_CERT_MAX_LEN {
            return Err(Error::CertificateTooLarge {
                size: der.len(),
                max: DEVICE_CERT_MAX_LEN,
            });
        }
        let mut cert = Self::new();
        cert.buf[..der.len()].copy_from_slice(der);
        cert.len = der.len();
        Ok(cert)
    }

    /// Decodes a PEM block into this buffer, replacing any previous contents.
    ///
    /// The buffer keeps its previous contents if decoding fails.
    pub fn load_pem(&mut self, pem: &[u8]) -> Result<usize> {
        let len = pem_to_der(pem, &mut self.buf)?;
        self.len = len;
        debug!(der_len = len, "decoded device certificate");
        Ok(len)
    }

    /// Returns the DER-encoded certificate.
    pub fn der(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Returns the DER length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no certificate has been loaded.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for CertificateBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CertificateBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateBuffer")
            .field("len", &self.len)
            .finish()
    }
}

/// A validated subject Common Name: non-empty and at most [`CN_MAX_LEN`] bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommonName(String);

impl CommonName {
    /// Validates and wraps a Common Name value.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(Error::InvalidAttribute("CN attribute is empty".to_string()));
        }
        if value.len() > CN_MAX_LEN {
            return Err(Error::InvalidAttribute(format!(
                "CN attribute is {} bytes, maximum is {CN_MAX_LEN}",
                value.len()
            )));
        }
        Ok(Self(value))
    }

    /// Returns the CN as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the CN bytes, without terminator.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Returns the visible length of the CN.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; an empty CN cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CommonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extracts the subject Common Name from a DER certificate.
///
/// # Errors
///
/// - [`Error::InvalidParameter`] if `der` is empty
/// - [`Error::Certificate`] if `der` is not a parseable X.509 certificate
/// - [`Error::InvalidAttribute`] if the CN is missing, empty, not a string,
///   or longer than [`CN_MAX_LEN`]
pub fn extract_common_name(der: &[u8]) -> Result<CommonName> {
    if der.is_empty() {
        return Err(Error::InvalidParameter("got empty certificate".to_string()));
    }

    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| Error::Certificate(format!("failed to parse certificate: {e}")))?;

    let attr = cert
        .subject()
        .iter_common_name()
        .next()
        .ok_or_else(|| Error::InvalidAttribute("certificate subject has no CN".to_string()))?;

    let value = attr
        .as_str()
        .map_err(|e| Error::InvalidAttribute(format!("CN is not a string: {e}")))?;

    CommonName::new(value)
}

/// Extracts the subject Common Name into `out`, returning its visible length.
///
/// No terminator is written.
pub fn extract_common_name_into(der: &[u8], out: &mut [u8]) -> Result<usize> {
    let cn = extract_common_name(der)?;
    if cn.len() > out.len() {
        return Err(Error::BufferTooSmall {
            needed: cn.len(),
            capacity: out.len(),
        });
    }
    out[..cn.len()].copy_from_slice(cn.as_bytes());
    Ok(cn.len())
}
