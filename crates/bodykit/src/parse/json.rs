//! JSON body decoding.

use bytes::Bytes;
use serde_json::Value;
use tracing::trace;

use crate::error::BodyError;

/// Decodes the body as a single JSON document.
///
/// The decoded value is handed through unchanged: objects, arrays and
/// scalars all stay in the JSON data model rather than being folded into
/// the form shape.
pub(crate) fn parse(body: &Bytes) -> Result<Value, BodyError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| BodyError::malformed(format!("invalid json: {e}")))?;
    trace!(len = body.len(), "decoded json body");
    Ok(value)
}
