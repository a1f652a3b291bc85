//! `application/x-www-form-urlencoded` body decoding.

use bytes::Bytes;
use tracing::trace;

use crate::ensure;
use crate::error::BodyError;
use crate::form::{FieldMap, FormBody};

/// Decodes percent-encoded key/value pairs into form arguments.
///
/// Pairs are separated by `&` and split at the first `=`; both halves are
/// percent-decoded with `+` read as space. A key without `=` maps to the
/// empty string, and repeated keys accumulate values in encounter order.
/// This sub-parser never produces files.
pub(crate) fn parse(body: &Bytes) -> Result<FormBody, BodyError> {
    let text =
        std::str::from_utf8(body).map_err(|_| BodyError::malformed("urlencoded body is not utf-8"))?;

    let mut arguments = FieldMap::new();
    for pair in text.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        arguments.append(&decode_component(name)?, decode_component(value)?);
    }

    trace!(fields = arguments.len(), "decoded urlencoded body");
    Ok(FormBody { arguments, files: FieldMap::new() })
}

/// Strictly percent-decodes one form component.
///
/// `urlencoding::decode` passes malformed escapes through untouched, so
/// escapes are validated up front: every `%` must be followed by two hex
/// digits.
fn decode_component(component: &str) -> Result<String, BodyError> {
    let bytes = component.as_bytes();
    for (index, byte) in bytes.iter().enumerate() {
        if *byte == b'%' {
            let complete = bytes.len() >= index + 3
                && bytes[index + 1].is_ascii_hexdigit()
                && bytes[index + 2].is_ascii_hexdigit();
            ensure!(complete, BodyError::malformed(format!("invalid percent escape in {component:?}")));
        }
    }

    let with_spaces = component.replace('+', " ");
    match urlencoding::decode(&with_spaces) {
        Ok(decoded) => Ok(decoded.into_owned()),
        Err(_) => Err(BodyError::malformed(format!("component {component:?} does not decode to utf-8"))),
    }
}
