use thiserror::Error;

/// Error produced when a request body does not conform to the syntax implied
/// by its declared content type.
///
/// This covers bad JSON, bad percent-encoding, and broken multipart
/// structure (missing boundary, missing part headers, malformed
/// `Content-Disposition`). An unrecognized content type is deliberately not
/// an error: the dispatcher returns an empty result instead, and callers
/// that want strict validation check for emptiness themselves.
///
/// A failed parse never yields a partial result; the caller either gets a
/// fully built [`ParsedBody`](crate::ParsedBody) or this error.
#[derive(Error, Debug)]
pub enum BodyError {
    #[error("malformed body: {reason}")]
    Malformed { reason: String },
}

impl BodyError {
    pub fn malformed<S: ToString>(reason: S) -> Self {
        Self::Malformed { reason: reason.to_string() }
    }
}
