//! Presenting a rendered certificate for inspection

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CertError;

/// Something the operator can open to look at the certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewHandle {
    pub path: PathBuf,
}

/// Receives each finished certificate. Only called with complete artifacts.
pub trait DocumentViewer: Send + Sync {
    fn present(&self, file_name: &str, pdf: &[u8]) -> Result<ViewHandle, CertError>;
}

/// Writes each certificate to a uniquely named `.pdf` file that outlives the
/// process.
#[derive(Debug, Clone)]
pub struct TempFileViewer {
    dir: PathBuf,
}

impl TempFileViewer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Files go to the system temp directory.
    pub fn system_temp() -> Self {
        Self::new(std::env::temp_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Default for TempFileViewer {
    fn default() -> Self {
        Self::system_temp()
    }
}

impl DocumentViewer for TempFileViewer {
    fn present(&self, file_name: &str, pdf: &[u8]) -> Result<ViewHandle, CertError> {
        let stem = file_name.strip_suffix(".pdf").unwrap_or(file_name);
        let mut file = tempfile::Builder::new()
            .prefix(&format!("{}_", stem))
            .suffix(".pdf")
            .tempfile_in(&self.dir)
            .map_err(|e| CertError::Presentation(format!("Failed to create file: {}", e)))?;

        file.write_all(pdf)
            .map_err(|e| CertError::Presentation(format!("Failed to write PDF data: {}", e)))?;
        file.flush()
            .map_err(|e| CertError::Presentation(format!("Failed to flush PDF data: {}", e)))?;

        let (_, path) = file
            .keep()
            .map_err(|e| CertError::Presentation(format!("Failed to keep file: {}", e)))?;

        tracing::debug!("Certificate available at {}", path.display());
        Ok(ViewHandle { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_unique_pdf_files() {
        let dir = tempfile::tempdir().unwrap();
        let viewer = TempFileViewer::new(dir.path());

        let first = viewer.present("barangay_certification.pdf", b"%PDF-1").unwrap();
        let second = viewer.present("barangay_certification.pdf", b"%PDF-2").unwrap();

        assert_ne!(first.path, second.path);
        assert_eq!(first.path.extension().unwrap(), "pdf");
        assert!(first
            .path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("barangay_certification_"));
        assert_eq!(std::fs::read(&second.path).unwrap(), b"%PDF-2");
    }

    #[test]
    fn test_missing_directory_is_presentation_error() {
        let viewer = TempFileViewer::new("/nonexistent/barangay/output");
        let err = viewer.present("cert.pdf", b"%PDF").unwrap_err();
        assert!(matches!(err, CertError::Presentation(_)));
    }
}
