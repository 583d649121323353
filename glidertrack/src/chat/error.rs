//! Error types for the chat transport.

use thiserror::Error;

/// Errors returned by a [`ChatTransport`](super::ChatTransport) or
/// [`UpdateSource`](super::UpdateSource).
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Response body could not be decoded.
    #[error("Failed to parse response: {0}")]
    JsonError(String),

    /// The API rejected the request.
    #[error("API error {code}: {description}")]
    Api { code: i64, description: String },

    /// The edit carried the same content as the message already has.
    #[error("Message is not modified")]
    NotModified,

    /// The message can no longer be edited (expired or deleted).
    #[error("Message can no longer be edited")]
    NotEditable,
}

impl TransportError {
    /// Map an API error description onto the variants the broadcaster acts on.
    pub fn from_api(code: i64, description: impl Into<String>) -> Self {
        let description = description.into();
        let lower = description.to_lowercase();

        if lower.contains("message is not modified") {
            TransportError::NotModified
        } else if lower.contains("message can't be edited")
            || lower.contains("message to edit not found")
        {
            TransportError::NotEditable
        } else {
            TransportError::Api { code, description }
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        // Request URLs embed the bot token
        let e = e.without_url();
        if e.is_decode() {
            TransportError::JsonError(e.to_string())
        } else {
            TransportError::HttpError(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_api_not_modified() {
        let err = TransportError::from_api(
            400,
            "Bad Request: message is not modified: specified new message content and reply markup are exactly the same",
        );
        assert!(matches!(err, TransportError::NotModified));
    }

    #[test]
    fn test_from_api_not_editable() {
        let err = TransportError::from_api(400, "Bad Request: message can't be edited");
        assert!(matches!(err, TransportError::NotEditable));

        let err = TransportError::from_api(400, "Bad Request: message to edit not found");
        assert!(matches!(err, TransportError::NotEditable));
    }

    #[test]
    fn test_from_api_other() {
        let err = TransportError::from_api(403, "Forbidden: bot was blocked by the user");
        match err {
            TransportError::Api { code, description } => {
                assert_eq!(code, 403);
                assert!(description.contains("blocked"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
