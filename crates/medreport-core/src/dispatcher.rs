//! Chooses the remote operation for a validated file

use std::fmt;

use tracing::debug;

use crate::{error::DispatchError, validator::ValidFile};

/// Remote analysis operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `POST /analyze/image`
    ImageAnalysis,
    /// `POST /analyze/pdf`
    DocumentAnalysis,
}

impl Endpoint {
    /// `image/*` goes to image analysis, `application/pdf` to document analysis
    pub fn for_mime_type(mime_type: &str) -> Result<Self, DispatchError> {
        if mime_type == "application/pdf" {
            Ok(Endpoint::DocumentAnalysis)
        } else if mime_type.starts_with("image/") {
            Ok(Endpoint::ImageAnalysis)
        } else {
            Err(DispatchError::UnsupportedType {
                mime_type: mime_type.to_string(),
            })
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::ImageAnalysis => "/analyze/image",
            Endpoint::DocumentAnalysis => "/analyze/pdf",
        }
    }

    /// Short category name used in synthetic summaries
    pub fn file_category(&self) -> &'static str {
        match self {
            Endpoint::ImageAnalysis => "image",
            Endpoint::DocumentAnalysis => "pdf",
        }
    }

    /// Message used when an error response carries no `detail`
    pub fn failure_message(&self) -> &'static str {
        match self {
            Endpoint::ImageAnalysis => "Failed to analyze image",
            Endpoint::DocumentAnalysis => "Failed to analyze PDF",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

pub fn dispatch(file: &ValidFile) -> Result<Endpoint, DispatchError> {
    let endpoint = Endpoint::for_mime_type(file.mime_type())?;
    debug!("Routing {} ({}) to {}", file.name(), file.mime_type(), endpoint);
    Ok(endpoint)
}
