/*!
 * Source documents handed to the translation pipeline.
 */

use crate::errors::InputError;

use super::segmenter::{Segment, segment};

/// An authored markdown document and the id its cache entries live under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    id: String,
    text: String,
}

impl SourceDocument {
    /// Create a document from text
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Result<Self, InputError> {
        let id = id.into();
        validate_document_id(&id)?;
        Ok(Self {
            id,
            text: text.into(),
        })
    }

    /// Create a document from raw bytes, which must be UTF-8
    pub fn from_bytes(id: impl Into<String>, bytes: Vec<u8>) -> Result<Self, InputError> {
        let id = id.into();
        validate_document_id(&id)?;
        let text = String::from_utf8(bytes).map_err(|e| InputError::NotUtf8 {
            document_id: id.clone(),
            message: e.utf8_error().to_string(),
        })?;
        Ok(Self { id, text })
    }

    /// Document id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Full source text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Segment the document
    pub fn segments(&self) -> Vec<Segment> {
        segment(&self.text)
    }
}

/// Check that a document id can be used as a single cache-key path component
pub fn validate_document_id(id: &str) -> Result<(), InputError> {
    let invalid = id.is_empty()
        || id.contains('/')
        || id.contains('\\')
        || id.contains("..")
        || id.chars().any(char::is_whitespace);

    if invalid {
        return Err(InputError::InvalidDocumentId(id.to_string()));
    }
    Ok(())
}
