//! Type and size checks applied before any network activity

use std::ops::Deref;

use crate::{error::ValidationError, models::UploadedFile};

/// 10 MiB
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

pub const ACCEPTED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/jpg", "application/pdf"];

/// A file that passed [`FileValidator`]; the only input the dispatcher accepts
#[derive(Debug, Clone, PartialEq)]
pub struct ValidFile(UploadedFile);

impl ValidFile {
    pub fn into_inner(self) -> UploadedFile {
        self.0
    }
}

impl Deref for ValidFile {
    type Target = UploadedFile;

    fn deref(&self) -> &UploadedFile {
        &self.0
    }
}

/// Pure predicate over MIME type and byte size
#[derive(Debug, Clone)]
pub struct FileValidator {
    accepted: Vec<String>,
    max_size: u64,
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new(ACCEPTED_MIME_TYPES, MAX_FILE_SIZE)
    }
}

impl FileValidator {
    pub fn new<I, S>(accepted: I, max_size: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accepted: accepted.into_iter().map(Into::into).collect(),
            max_size,
        }
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    pub fn accepts_type(&self, mime_type: &str) -> bool {
        self.accepted.iter().any(|t| t == mime_type)
    }

    /// Type is checked before size
    pub fn check(&self, mime_type: &str, size: u64) -> Result<(), ValidationError> {
        if !self.accepts_type(mime_type) {
            return Err(ValidationError::UnsupportedType {
                mime_type: mime_type.to_string(),
            });
        }
        if size > self.max_size {
            return Err(ValidationError::TooLarge {
                size,
                limit: self.max_size,
            });
        }
        Ok(())
    }

    pub fn validate(&self, file: UploadedFile) -> Result<ValidFile, ValidationError> {
        self.check(file.mime_type(), file.size())?;
        Ok(ValidFile(file))
    }
}

/// Validate against the default policy
pub fn validate(file: UploadedFile) -> Result<ValidFile, ValidationError> {
    FileValidator::default().validate(file)
}
