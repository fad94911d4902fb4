//! Input resolution: validate a user-supplied path before unzipping it.
//!
//! A DOCX is a zip container, so the first four bytes must be the local
//! file header signature `PK\x03\x04`. Checking up front gives callers a
//! meaningful error for a PDF or a legacy `.doc` instead of a zip-crate
//! message about central directories.

use crate::error::PaperError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Local file header signature of a zip archive.
pub const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";

/// Returns true when `bytes` starts with the zip signature.
pub fn has_zip_magic(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && bytes[..4] == ZIP_MAGIC
}

/// Resolve a local path to a readable DOCX file.
pub fn resolve_input(path: impl AsRef<Path>) -> Result<PathBuf, PaperError> {
    let path = path.as_ref().to_path_buf();

    if !path.exists() {
        return Err(PaperError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && magic != ZIP_MAGIC {
                return Err(PaperError::NotADocx { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PaperError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(PaperError::FileNotFound { path });
        }
    }

    debug!("Resolved local DOCX: {}", path.display());
    Ok(path)
}
