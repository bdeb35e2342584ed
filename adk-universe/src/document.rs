//! Items written to a universe and the `/emit` request body.

use serde::Serialize;

use crate::error::{Result, UniverseError};

/// A `{id, text}` item as stored in a universe.
///
/// The store owns the item; this crate only ever sends it.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Document<'a> {
    /// Identifier of the item within its universe. Must not be empty.
    pub id: &'a str,
    /// Full text of the item. May be empty.
    pub text: &'a str,
}

impl<'a> Document<'a> {
    /// Create a document, rejecting an empty id.
    pub fn new(id: &'a str, text: &'a str) -> Result<Self> {
        validate_file_id(id)?;
        Ok(Self { id, text })
    }
}

/// Body of `POST /emit`: create the item, or overwrite it if the id exists.
#[derive(Debug, Serialize)]
pub(crate) struct EmitRequest<'a> {
    pub universe: &'a str,
    pub thing: Document<'a>,
}

pub(crate) fn validate_file_id(file_id: &str) -> Result<()> {
    if file_id.is_empty() {
        return Err(UniverseError::ValidationError("fileId must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn emit_body_shape() {
        let body = EmitRequest {
            universe: "myuni",
            thing: Document::new("doc1", "hello world").unwrap(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"universe": "myuni", "thing": {"id": "doc1", "text": "hello world"}})
        );
    }

    #[test]
    fn empty_id_is_rejected_but_empty_text_is_not() {
        assert!(matches!(Document::new("", "text"), Err(UniverseError::ValidationError(_))));
        assert!(Document::new("doc", "").is_ok());
    }
}
