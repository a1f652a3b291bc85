//! Header parsing for individual multipart parts.
//!
//! Each part opens with a small CRLF-terminated header block. The block is
//! run through `httparse` and then reduced to the three things
//! classification needs: the field name and optional filename from
//! `Content-Disposition`, and the part's own `Content-Type` if declared.
//!
//! Parameter values in `Content-Disposition` may be double-quoted with
//! backslash escapes (`filename="a \"b\".txt"`). Duplicate `name` or
//! `filename` parameters and folded (continuation-line) headers are
//! rejected as malformed.

use crate::ensure;
use crate::error::BodyError;

/// Upper bound on headers within one part. Real parts carry two or three.
const MAX_PART_HEADERS: usize = 16;

/// Headers of one multipart part, reduced to what classification needs.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct PartHeaders {
    /// Field name from the `name` parameter of `Content-Disposition`.
    pub(crate) name: String,
    /// `filename` parameter, present only on file parts.
    pub(crate) filename: Option<String>,
    /// The part's own `Content-Type` header, if declared.
    pub(crate) content_type: Option<String>,
}

impl PartHeaders {
    /// Parses a header block, including its terminating blank line.
    pub(crate) fn parse(block: &[u8]) -> Result<Self, BodyError> {
        let mut headers = [httparse::EMPTY_HEADER; MAX_PART_HEADERS];
        let parsed = match httparse::parse_headers(block, &mut headers) {
            Ok(httparse::Status::Complete((_, parsed))) => parsed,
            Ok(httparse::Status::Partial) => {
                return Err(BodyError::malformed("truncated part headers"));
            }
            Err(e) => return Err(BodyError::malformed(format!("invalid part headers: {e}"))),
        };

        let mut disposition = None;
        let mut content_type = None;
        for header in parsed {
            let value = std::str::from_utf8(header.value)
                .map_err(|_| BodyError::malformed(format!("header {:?} is not utf-8", header.name)))?
                .trim();
            if header.name.eq_ignore_ascii_case("content-disposition") {
                disposition = Some(value);
            } else if header.name.eq_ignore_ascii_case("content-type") {
                content_type = Some(value.to_string());
            }
        }

        let disposition =
            disposition.ok_or_else(|| BodyError::malformed("part is missing Content-Disposition"))?;
        let (name, filename) = parse_disposition(disposition)?;

        Ok(Self { name, filename, content_type })
    }
}

/// Extracts `name` and `filename` from a `Content-Disposition` value such
/// as `form-data; name="avatar"; filename="me.png"`.
fn parse_disposition(value: &str) -> Result<(String, Option<String>), BodyError> {
    let segments = split_outside_quotes(value)?;
    let mut segments = segments.into_iter();

    let disposition_type = segments.next().unwrap_or("").trim();
    ensure!(
        disposition_type == "form-data",
        BodyError::malformed(format!("unexpected disposition type {disposition_type:?}"))
    );

    let mut name = None;
    let mut filename = None;
    for segment in segments {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let Some((key, raw_value)) = segment.split_once('=') else {
            return Err(BodyError::malformed(format!("disposition parameter {segment:?} has no value")));
        };

        let slot = match key.trim().to_ascii_lowercase().as_str() {
            "name" => &mut name,
            "filename" => &mut filename,
            _ => continue,
        };
        ensure!(
            slot.is_none(),
            BodyError::malformed(format!("duplicate disposition parameter in {value:?}"))
        );
        *slot = Some(unquote(raw_value.trim())?);
    }

    let name = name.ok_or_else(|| BodyError::malformed("disposition is missing the name parameter"))?;
    Ok((name, filename))
}

/// Splits a header value on `;`, honoring double-quoted segments so a
/// quoted filename may itself contain semicolons.
fn split_outside_quotes(value: &str) -> Result<Vec<&str>, BodyError> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (index, ch) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                segments.push(&value[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    ensure!(!in_quotes, BodyError::malformed(format!("unterminated quote in {value:?}")));

    segments.push(&value[start..]);
    Ok(segments)
}

/// Strips optional surrounding double quotes and resolves `\"` and `\\`
/// escapes.
fn unquote(raw: &str) -> Result<String, BodyError> {
    if !raw.starts_with('"') {
        return Ok(raw.to_string());
    }
    ensure!(
        raw.len() >= 2 && raw.ends_with('"'),
        BodyError::malformed(format!("unterminated quoted value {raw:?}"))
    );

    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(escaped) => out.push(escaped),
                None => return Err(BodyError::malformed(format!("dangling escape in {raw:?}"))),
            }
        } else {
            out.push(ch);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_part_headers() {
        let block = b"Content-Disposition: form-data; name=\"key\"\r\n\r\n";
        let headers = PartHeaders::parse(block).unwrap();
        assert_eq!(
            headers,
            PartHeaders { name: "key".to_string(), filename: None, content_type: None }
        );
    }

    #[test]
    fn file_part_headers() {
        let block = b"Content-Disposition: form-data; name=\"file\"; filename=\"test_file.txt\"\r\n\
                      Content-Type: text/plain\r\n\r\n";
        let headers = PartHeaders::parse(block).unwrap();
        assert_eq!(headers.name, "file");
        assert_eq!(headers.filename.as_deref(), Some("test_file.txt"));
        assert_eq!(headers.content_type.as_deref(), Some("text/plain"));
    }

    #[test]
    fn header_names_are_case_insensitive() {
        let block = b"content-disposition: form-data; name=\"k\"\r\nCONTENT-TYPE: image/png\r\n\r\n";
        let headers = PartHeaders::parse(block).unwrap();
        assert_eq!(headers.name, "k");
        assert_eq!(headers.content_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn unquoted_parameter_values() {
        let headers = PartHeaders::parse(b"Content-Disposition: form-data; name=plain\r\n\r\n").unwrap();
        assert_eq!(headers.name, "plain");
    }

    #[test]
    fn quoted_filename_with_escapes() {
        let block = b"Content-Disposition: form-data; name=\"f\"; filename=\"a \\\"b\\\".txt\"\r\n\r\n";
        let headers = PartHeaders::parse(block).unwrap();
        assert_eq!(headers.filename.as_deref(), Some("a \"b\".txt"));
    }

    #[test]
    fn quoted_filename_may_contain_semicolons() {
        let block = b"Content-Disposition: form-data; name=\"f\"; filename=\"one;two.txt\"\r\n\r\n";
        let headers = PartHeaders::parse(block).unwrap();
        assert_eq!(headers.filename.as_deref(), Some("one;two.txt"));
    }

    #[test]
    fn rejects_missing_disposition_header() {
        let error = PartHeaders::parse(b"Content-Type: text/plain\r\n\r\n").unwrap_err();
        assert!(error.to_string().contains("missing Content-Disposition"));
    }

    #[test]
    fn rejects_missing_name_parameter() {
        let error = PartHeaders::parse(b"Content-Disposition: form-data\r\n\r\n").unwrap_err();
        assert!(error.to_string().contains("missing the name parameter"));
    }

    #[test]
    fn rejects_unexpected_disposition_type() {
        let error = PartHeaders::parse(b"Content-Disposition: attachment; name=\"k\"\r\n\r\n").unwrap_err();
        assert!(error.to_string().contains("unexpected disposition type"));
    }

    #[test]
    fn disposition_type_is_case_sensitive() {
        let block = b"Content-Disposition: Form-Data; name=\"k\"\r\n\r\n";
        let error = PartHeaders::parse(block).unwrap_err();
        assert!(error.to_string().contains("unexpected disposition type"));
    }

    #[test]
    fn rejects_duplicate_name_parameter() {
        let block = b"Content-Disposition: form-data; name=\"a\"; name=\"b\"\r\n\r\n";
        let error = PartHeaders::parse(block).unwrap_err();
        assert!(error.to_string().contains("duplicate disposition parameter"));
    }

    #[test]
    fn rejects_unterminated_quote() {
        let block = b"Content-Disposition: form-data; name=\"broken\r\n\r\n";
        assert!(PartHeaders::parse(block).is_err());
    }

    #[test]
    fn rejects_garbage_header_line() {
        let block = b"Content-Disposition: form-data; name=\"k\"\r\nnot a header line\r\n\r\n";
        assert!(PartHeaders::parse(block).is_err());
    }
}
