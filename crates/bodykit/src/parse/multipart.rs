//! `multipart/form-data` body decoding.
//!
//! The body is segmented by delimiter lines built from the `boundary`
//! parameter of the content type: `--boundary` opens each part and
//! `--boundary--` terminates the sequence. An occurrence of the delimiter
//! bytes only counts when it is anchored at the start of a line (the start
//! of the body, or right after a CRLF) and is itself followed by CRLF or
//! `--`. Boundary-like byte runs inside a file payload therefore pass
//! through as data, and payload bytes round-trip exactly.
//!
//! Each part splits at its first blank line into a header block (see
//! [`part_header`](super::part_header)) and a payload; the CRLF that
//! precedes the next delimiter line belongs to the framing and is stripped
//! from the payload. Parts with a `filename` parameter are file parts and
//! land in `files`; the rest are field parts whose payload must be UTF-8
//! and lands in `arguments`.

use std::ops::Range;

use bytes::Bytes;
use memchr::memmem;
use mime::Mime;
use tracing::trace;

use crate::ensure;
use crate::error::BodyError;
use crate::form::{FileUpload, FormBody};
use crate::parse::part_header::PartHeaders;

/// Content type recorded for file parts that do not declare their own.
const DEFAULT_FILE_CONTENT_TYPE: &str = "application/unknown";

/// Parses a multipart body against the boundary declared in `content_type`.
pub(crate) fn parse(content_type: &str, body: &Bytes) -> Result<FormBody, BodyError> {
    let boundary = extract_boundary(content_type)?;
    let parts = split_parts(body, &boundary)?;
    trace!(boundary = %boundary, parts = parts.len(), "segmented multipart body");

    let mut form = FormBody::default();
    for range in parts {
        read_part(body, range, &mut form)?;
    }
    Ok(form)
}

/// Pulls the `boundary` parameter out of the content-type header value.
fn extract_boundary(content_type: &str) -> Result<String, BodyError> {
    let parsed: Mime = content_type
        .parse()
        .map_err(|_| BodyError::malformed(format!("unparseable content type {content_type:?}")))?;
    let boundary = parsed
        .get_param(mime::BOUNDARY)
        .ok_or_else(|| BodyError::malformed("multipart content type is missing a boundary"))?;

    // some clients quote the parameter value
    let boundary = boundary.as_str().trim_matches('"');
    ensure!(!boundary.is_empty(), BodyError::malformed("multipart boundary is empty"));
    Ok(boundary.to_string())
}

/// Splits the body into per-part content ranges.
fn split_parts(body: &[u8], boundary: &str) -> Result<Vec<Range<usize>>, BodyError> {
    let delimiter = format!("--{boundary}").into_bytes();
    let finder = memmem::Finder::new(&delimiter);

    let mut parts = Vec::new();
    let mut open: Option<usize> = None;
    let mut pos = 0;
    let mut terminated = false;

    while let Some(offset) = finder.find(&body[pos..]) {
        let at = pos + offset;
        let end = at + delimiter.len();
        let anchored = at == 0 || body[..at].ends_with(b"\r\n");
        let tail = &body[end..];

        if anchored && tail.starts_with(b"--") {
            if let Some(start) = open.take() {
                parts.push(close_part(start, at)?);
            }
            terminated = true;
            break;
        }

        if anchored && tail.starts_with(b"\r\n") {
            if let Some(start) = open.take() {
                parts.push(close_part(start, at)?);
            }
            open = Some(end + 2);
            pos = end + 2;
            continue;
        }

        // boundary-like bytes inside a payload, or a longer token sharing
        // the delimiter prefix
        pos = at + 1;
    }

    ensure!(
        terminated,
        BodyError::malformed(if parts.is_empty() && open.is_none() {
            "boundary never appears in body"
        } else {
            "multipart body has no final boundary"
        })
    );
    Ok(parts)
}

/// A part's content ends right before the CRLF that precedes the next
/// delimiter line.
fn close_part(start: usize, delimiter_at: usize) -> Result<Range<usize>, BodyError> {
    ensure!(delimiter_at >= start + 2, BodyError::malformed("part does not end with CRLF"));
    Ok(start..delimiter_at - 2)
}

/// Parses one part: header block, classification, payload extraction.
fn read_part(body: &Bytes, range: Range<usize>, form: &mut FormBody) -> Result<(), BodyError> {
    let content = &body[range.clone()];
    let header_end = memmem::find(content, b"\r\n\r\n")
        .ok_or_else(|| BodyError::malformed("part is missing its blank header line"))?;

    let headers = PartHeaders::parse(&content[..header_end + 4])?;
    let payload = body.slice(range.start + header_end + 4..range.end);

    match headers.filename {
        Some(filename) => {
            let content_type =
                headers.content_type.unwrap_or_else(|| DEFAULT_FILE_CONTENT_TYPE.to_string());
            trace!(name = %headers.name, filename = %filename, len = payload.len(), "read file part");
            form.files.append(&headers.name, FileUpload { filename, content_type, body: payload });
        }
        None => {
            let value = String::from_utf8(payload.to_vec())
                .map_err(|_| BodyError::malformed(format!("field {:?} is not utf-8", headers.name)))?;
            trace!(name = %headers.name, "read field part");
            form.arguments.append(&headers.name, value);
        }
    }
    Ok(())
}
