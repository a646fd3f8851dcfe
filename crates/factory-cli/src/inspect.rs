//! Inspect commands - offline enrollment ID and Common Name helpers
//!
//! These never touch a provisioning store; they read a PEM certificate file
//! and print what the factory flow would derive from it.

use anyhow::{bail, Context, Result};
use clap::Args;
use factory_identity::{decode_pem, enrollment_id, extract_common_name, EnrollmentId};
use std::path::{Path, PathBuf};

/// Read a PEM certificate file
#[derive(Args, Debug)]
pub struct CertArgs {
    /// PEM certificate file
    pub pem_file: PathBuf,
}

/// Check an enrollment ID against a PEM certificate
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// PEM certificate file
    pub pem_file: PathBuf,

    /// Enrollment ID as registered (`A-XX:XX:...`)
    pub enrollment_id: String,
}

/// Print the enrollment ID of a certificate
pub fn enroll_id(args: &CertArgs) -> Result<()> {
    println!("{}", compute_enrollment_id(&args.pem_file)?);
    Ok(())
}

/// Print the subject Common Name of a certificate
pub fn common_name(args: &CertArgs) -> Result<()> {
    let der = read_der(&args.pem_file)?;
    let cn = extract_common_name(&der)
        .with_context(|| format!("No usable Common Name in {}", args.pem_file.display()))?;
    println!("{cn}");
    Ok(())
}

/// Fail unless the enrollment ID matches the certificate
pub fn verify(args: &VerifyArgs) -> Result<()> {
    let expected: EnrollmentId = args
        .enrollment_id
        .parse()
        .with_context(|| format!("Invalid enrollment ID '{}'", args.enrollment_id))?;
    let actual = compute_enrollment_id(&args.pem_file)?;

    if actual != expected {
        bail!(
            "Enrollment ID mismatch for {}\n  expected: {}\n  actual:   {}",
            args.pem_file.display(),
            expected,
            actual
        );
    }

    println!("OK: {actual}");
    Ok(())
}

fn compute_enrollment_id(path: &Path) -> Result<EnrollmentId> {
    let der = read_der(path)?;
    enrollment_id(&der)
        .with_context(|| format!("Failed to hash certificate {}", path.display()))
}

fn read_der(path: &Path) -> Result<Vec<u8>> {
    let pem = std::fs::read(path)
        .with_context(|| format!("Failed to read certificate {}", path.display()))?;
    decode_pem(&pem).with_context(|| format!("Invalid PEM in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DEVICE_PEM: &str =
        include_str!("../../factory-identity/tests/fixtures/device123.pem");
    const DEVICE_ID: &str = "A-EA:AE:4B:97:6A:34:50:0F:2B:CC:E9:56:FB:2D:71:59:\
                             01:95:BE:B5:4D:F4:B5:0F:38:13:56:5F:4C:47:2C:6A";

    fn pem_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_compute_enrollment_id() {
        let file = pem_file(DEVICE_PEM);
        let id = compute_enrollment_id(file.path()).unwrap();
        assert_eq!(id.as_str(), DEVICE_ID);
    }

    #[test]
    fn test_verify_accepts_lowercase() {
        let file = pem_file(DEVICE_PEM);
        let args = VerifyArgs {
            pem_file: file.path().to_path_buf(),
            enrollment_id: DEVICE_ID.to_lowercase().replacen("a-", "A-", 1),
        };
        assert!(verify(&args).is_ok());
    }

    #[test]
    fn test_verify_mismatch() {
        let file = pem_file(DEVICE_PEM);
        let wrong = DEVICE_ID.replacen("EA", "EB", 1);
        let args = VerifyArgs {
            pem_file: file.path().to_path_buf(),
            enrollment_id: wrong,
        };
        let err = verify(&args).unwrap_err();
        assert!(err.to_string().contains("mismatch"));
    }

    #[test]
    fn test_verify_rejects_malformed_id() {
        let file = pem_file(DEVICE_PEM);
        let args = VerifyArgs {
            pem_file: file.path().to_path_buf(),
            enrollment_id: "not-an-id".to_string(),
        };
        assert!(verify(&args).is_err());
    }

    #[test]
    fn test_common_name_rejects_non_pem() {
        let file = pem_file("just some text\n");
        let args = CertArgs {
            pem_file: file.path().to_path_buf(),
        };
        assert!(common_name(&args).is_err());
    }

    #[test]
    fn test_missing_file() {
        let args = CertArgs {
            pem_file: PathBuf::from("/nonexistent/device.pem"),
        };
        assert!(enroll_id(&args).is_err());
    }
}
