//! Content-type dispatch over the body sub-parsers.
//!
//! The dispatcher inspects the media-type token of the `Content-Type`
//! header (everything before the first `;`, trimmed, compared without
//! case) and routes the raw body to exactly one sub-parser:
//!
//! - `application/json`: the decoded value passes through as
//!   [`ParsedBody::Json`]
//! - `application/x-www-form-urlencoded`: percent-encoded pairs become
//!   form arguments
//! - `multipart/form-data`: boundary-delimited parts become arguments and
//!   files
//!
//! Anything else, including a missing header, produces the empty result
//! rather than an error; downstream layers that need strict content-type
//! validation check [`ParsedBody::is_empty`] themselves. An empty body
//! short-circuits to the empty result before the content type is looked at.
//!
//! Parsing is pure and synchronous: no I/O, no shared state, and a failed
//! parse yields only the error, never a partially filled result.

mod json;
mod multipart;
mod part_header;
mod urlencoded;

use bytes::Bytes;
use http::HeaderMap;
use http::header::CONTENT_TYPE;
use tracing::trace;

use crate::error::BodyError;
use crate::form::ParsedBody;

/// Parses a fully buffered request body according to its `Content-Type`.
///
/// `content_type` is the raw header value, parameters included; pass `None`
/// when the request carries no such header.
///
/// # Errors
///
/// Returns [`BodyError::Malformed`] when the body does not conform to the
/// syntax its declared content type implies. Unrecognized content types are
/// not an error.
pub fn parse(content_type: Option<&str>, body: &Bytes) -> Result<ParsedBody, BodyError> {
    if body.is_empty() {
        trace!("empty body, skipping parse");
        return Ok(ParsedBody::empty());
    }

    let Some(content_type) = content_type else {
        trace!("no content type, returning empty result");
        return Ok(ParsedBody::empty());
    };

    let media_type = media_type_of(content_type);
    trace!(media_type = %media_type, len = body.len(), "dispatching body parser");

    if media_type == mime::APPLICATION_JSON.essence_str() {
        json::parse(body).map(ParsedBody::Json)
    } else if media_type == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
        urlencoded::parse(body).map(ParsedBody::Form)
    } else if media_type == mime::MULTIPART_FORM_DATA.essence_str() {
        multipart::parse(content_type, body).map(ParsedBody::Form)
    } else {
        trace!(media_type = %media_type, "unrecognized content type, returning empty result");
        Ok(ParsedBody::empty())
    }
}

/// Reads the `Content-Type` header out of `headers` and delegates to
/// [`parse`].
///
/// A header value that is not visible ASCII is treated the same as an
/// absent header.
pub fn parse_request(headers: &HeaderMap, body: &Bytes) -> Result<ParsedBody, BodyError> {
    let content_type = headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok());
    parse(content_type, body)
}

/// The media-type token: everything before the first `;`, trimmed and
/// lowercased.
fn media_type_of(content_type: &str) -> String {
    content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase()
}
