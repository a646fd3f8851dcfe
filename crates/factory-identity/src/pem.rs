//! PEM to DER decoding.
//!
//! The decoder takes the first `-----BEGIN` / `-----END` pair in the input,
//! skips the rest of the BEGIN line, and base64-decodes everything up to the
//! END marker. Line breaks and spaces inside the payload are ignored, so
//! both `\n` and `\r\n` armored files decode the same way.
//!
//! # Example
//!
//! ```
//! use factory_identity::pem_to_der;
//!
//! let pem = b"-----BEGIN CERTIFICATE-----\nMAA=\n-----END CERTIFICATE-----\n";
//! let mut der = [0u8; 16];
//! let len = pem_to_der(pem, &mut der).unwrap();
//! assert_eq!(&der[..len], &[0x30, 0x00]);
//! ```

use crate::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::{DecodeError, Engine};

const BEGIN_MARKER: &[u8] = b"-----BEGIN";
const END_MARKER: &[u8] = b"-----END";

/// Decodes the PEM block in `input` into `output`, returning the DER length.
///
/// `output` is overwritten from index 0 and left untouched on error.
///
/// # Errors
///
/// - [`Error::MalformedPem`] if a marker is missing or END precedes the payload
/// - [`Error::InvalidBase64Character`] if the payload is not valid base64
/// - [`Error::BufferTooSmall`] if the decoded payload does not fit in `output`
pub fn pem_to_der(input: &[u8], output: &mut [u8]) -> Result<usize> {
    let der = decode_pem(input)?;
    if der.len() > output.len() {
        return Err(Error::BufferTooSmall {
            needed: der.len(),
            capacity: output.len(),
        });
    }

    output[..der.len()].copy_from_slice(&der);
    Ok(der.len())
}

/// Decodes the PEM block in `input` into a freshly allocated DER buffer.
pub fn decode_pem(input: &[u8]) -> Result<Vec<u8>> {
    let payload = locate_payload(input)?;
    decode_payload(payload)
}

/// Finds the base64 payload between the BEGIN line and the END marker.
fn locate_payload(input: &[u8]) -> Result<&[u8]> {
    let begin = find(input, BEGIN_MARKER)
        .ok_or_else(|| Error::MalformedPem("missing -----BEGIN marker".to_string()))?;
    let end = find(input, END_MARKER)
        .ok_or_else(|| Error::MalformedPem("missing -----END marker".to_string()))?;

    // Skip the label and the dash run closing the BEGIN line.
    let mut start = begin + BEGIN_MARKER.len();
    while start < input.len() && input[start] != b'-' {
        start += 1;
    }
    while start < input.len() && input[start] == b'-' {
        start += 1;
    }
    if input.get(start) == Some(&b'\r') {
        start += 1;
    }
    if input.get(start) == Some(&b'\n') {
        start += 1;
    }

    if end <= start {
        return Err(Error::MalformedPem(
            "-----END marker does not follow the PEM payload".to_string(),
        ));
    }

    Ok(&input[start..end])
}

/// Base64-decodes a PEM payload, skipping spaces and line breaks.
fn decode_payload(payload: &[u8]) -> Result<Vec<u8>> {
    let mut compact = Vec::with_capacity(payload.len());
    let mut i = 0;
    while i < payload.len() {
        match payload[i] {
            b' ' | b'\n' => {}
            b'\r' if payload.get(i + 1) == Some(&b'\n') => {}
            byte => compact.push(byte),
        }
        i += 1;
    }

    STANDARD.decode(&compact).map_err(|e| {
        Error::InvalidBase64Character(match e {
            DecodeError::InvalidByte(offset, byte) => {
                format!("byte 0x{byte:02x} at payload offset {offset}")
            }
            other => other.to_string(),
        })
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
