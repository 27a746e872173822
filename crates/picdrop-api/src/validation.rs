//! Upload validation
//!
//! Size bounds always apply. File type checks (extension, declared content type and the
//! leading signature bytes) only run when `ENFORCE_FILE_TYPE` is on.

use picdrop_core::Config;
use picdrop_storage::{derive_extension, IncomingFile, StagedUpload};

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too small: {size} bytes (min: {min} bytes)")]
    FileTooSmall { size: u64, min: u64 },

    #[error("File has no extension")]
    MissingExtension,

    #[error("Invalid file extension: {extension} (allowed: {allowed})")]
    InvalidExtension { extension: String, allowed: String },

    #[error("File part has no content type")]
    MissingContentType,

    #[error("Invalid content type: {content_type} (allowed: {allowed})")]
    InvalidContentType {
        content_type: String,
        allowed: String,
    },

    #[error("Content type {content_type} does not match extension {extension}")]
    ContentTypeMismatch {
        extension: String,
        content_type: String,
    },

    #[error("File content is not a recognized image")]
    UnrecognizedSignature,
}

/// Validates uploads against the configured size bounds and, optionally, image type rules.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    min_file_size: u64,
    enforce_file_type: bool,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

impl UploadValidator {
    pub fn new(
        min_file_size: u64,
        enforce_file_type: bool,
        allowed_extensions: Vec<String>,
        allowed_content_types: Vec<String>,
    ) -> Self {
        Self {
            min_file_size,
            enforce_file_type,
            allowed_extensions,
            allowed_content_types,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.min_file_size_bytes() as u64,
            config.enforce_file_type(),
            config.allowed_extensions().to_vec(),
            config.allowed_content_types().to_vec(),
        )
    }

    /// Check what the client declared for a part, before any of its bytes are read.
    pub fn validate_declared(&self, incoming: &IncomingFile) -> Result<(), ValidationError> {
        if !self.enforce_file_type {
            return Ok(());
        }

        let extension = derive_extension(&incoming.original_filename)
            .map(str::to_lowercase)
            .ok_or(ValidationError::MissingExtension)?;
        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.join(", "),
            });
        }

        let content_type = incoming
            .content_type
            .as_deref()
            .map(normalize_mime_type)
            .ok_or(ValidationError::MissingContentType)?;
        if !self.allowed_content_types.contains(&content_type) {
            return Err(ValidationError::InvalidContentType {
                content_type,
                allowed: self.allowed_content_types.join(", "),
            });
        }

        if let Some(expected) = expected_content_types(&extension) {
            if !expected.contains(&content_type.as_str()) {
                return Err(ValidationError::ContentTypeMismatch {
                    extension,
                    content_type,
                });
            }
        }

        Ok(())
    }

    /// Check a fully received upload before it is committed.
    pub fn validate_staged(&self, staged: &StagedUpload) -> Result<(), ValidationError> {
        if staged.size() < self.min_file_size {
            return Err(ValidationError::FileTooSmall {
                size: staged.size(),
                min: self.min_file_size,
            });
        }

        if self.enforce_file_type {
            match detect_image_type(staged.head()) {
                Some(detected) if self.allowed_content_types.iter().any(|ct| ct == detected) => {}
                _ => return Err(ValidationError::UnrecognizedSignature),
            }
        }

        Ok(())
    }
}

/// Strip parameters and case (e.g. "Image/JPEG; charset=binary" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

fn expected_content_types(extension: &str) -> Option<&'static [&'static str]> {
    let expected: &'static [&'static str] = match extension {
        "jpg" | "jpeg" => &["image/jpeg"],
        "png" => &["image/png"],
        "gif" => &["image/gif"],
        "webp" => &["image/webp"],
        "bmp" => &["image/bmp", "image/x-ms-bmp"],
        _ => return None,
    };
    Some(expected)
}

/// Identify an image format from its leading bytes.
pub fn detect_image_type(head: &[u8]) -> Option<&'static str> {
    if head.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if head.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if head.len() >= 12 && head.starts_with(b"RIFF") && &head[8..12] == b"WEBP" {
        Some("image/webp")
    } else if head.starts_with(b"BM") {
        Some("image/bmp")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enforcing() -> UploadValidator {
        UploadValidator::new(
            0,
            true,
            vec!["jpg".into(), "jpeg".into(), "png".into()],
            vec!["image/jpeg".into(), "image/png".into()],
        )
    }

    fn incoming(name: &str, content_type: Option<&str>) -> IncomingFile {
        IncomingFile::new(name, content_type.map(String::from))
    }

    #[test]
    fn permissive_by_default() {
        let validator = UploadValidator::new(0, false, vec![], vec![]);
        assert!(validator
            .validate_declared(&incoming("notes.txt", Some("text/plain")))
            .is_ok());
        assert!(validator.validate_declared(&incoming("noext", None)).is_ok());
    }

    #[test]
    fn accepts_allowed_image() {
        let validator = enforcing();
        assert!(validator
            .validate_declared(&incoming("photo.JPG", Some("image/jpeg; charset=binary")))
            .is_ok());
    }

    #[test]
    fn rejects_disallowed_extension() {
        let result = enforcing().validate_declared(&incoming("notes.txt", Some("image/png")));
        assert!(matches!(result, Err(ValidationError::InvalidExtension { .. })));
    }

    #[test]
    fn rejects_missing_content_type() {
        let result = enforcing().validate_declared(&incoming("photo.png", None));
        assert!(matches!(result, Err(ValidationError::MissingContentType)));
    }

    #[test]
    fn rejects_mismatched_content_type() {
        let result = enforcing().validate_declared(&incoming("photo.png", Some("image/jpeg")));
        assert!(matches!(
            result,
            Err(ValidationError::ContentTypeMismatch { .. })
        ));
    }

    #[test]
    fn detects_signatures() {
        assert_eq!(detect_image_type(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(
            detect_image_type(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            Some("image/png")
        );
        assert_eq!(detect_image_type(b"GIF89a\x01\x00"), Some("image/gif"));
        assert_eq!(detect_image_type(b"RIFF\x24\x00\x00\x00WEBPVP8 "), Some("image/webp"));
        assert_eq!(detect_image_type(b"BM\x36\x00"), Some("image/bmp"));
        assert_eq!(detect_image_type(b"RIFF\x24\x00\x00\x00WAVE"), None);
        assert_eq!(detect_image_type(b"hello"), None);
        assert_eq!(detect_image_type(&[]), None);
    }
}
