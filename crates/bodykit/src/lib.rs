//! Normalized request-body parsing for HTTP servers.
//!
//! This crate takes an incoming request's `Content-Type` header and its fully
//! buffered body bytes, and produces a content-type-agnostic representation:
//! a mapping of form field names to string values plus a mapping of file
//! field names to uploaded-file descriptors. The surrounding server hands the
//! raw bytes in and receives the normalized result (or a parse failure) back.
//!
//! # Features
//!
//! - `application/json` bodies decoded into a generic [`serde_json::Value`]
//! - `application/x-www-form-urlencoded` bodies decoded into ordered,
//!   multi-valued form arguments
//! - `multipart/form-data` bodies segmented into field and file parts, with
//!   file payloads kept as zero-copy [`bytes::Bytes`] slices
//! - Unrecognized content types degrade to an empty result instead of failing
//! - Pure, synchronous parsing with no shared state between requests
//!
//! # Example
//!
//! ```
//! use bodykit::parse;
//! use bytes::Bytes;
//!
//! let body = Bytes::from_static(b"name=ferris&lang=rust&lang=en");
//! let parsed = parse(Some("application/x-www-form-urlencoded"), &body).unwrap();
//!
//! let form = parsed.as_form().unwrap();
//! assert_eq!(form.arguments.get("name"), Some(&["ferris".to_string()][..]));
//! assert_eq!(form.arguments.get("lang"), Some(&["rust".to_string(), "en".to_string()][..]));
//! assert!(form.files.is_empty());
//! ```
//!
//! # Architecture
//!
//! The crate is organized into three modules:
//!
//! - [`form`]: the normalized data model ([`ParsedBody`], [`FormBody`],
//!   [`FileUpload`], [`FieldMap`])
//! - [`parse`]: the content-type dispatcher and the three sub-parsers
//! - [`error`]: the error type surfaced to the calling layer
//!
//! Parsing is a single dispatch over the media-type token followed by exactly
//! one sub-parser run; only the multipart sub-parser carries internal scan
//! state, and that state lives on the stack of one call.
//!
//! # Limitations
//!
//! - The body must already be fully materialized in memory; streaming and
//!   chunked-transfer assembly belong to the connection layer
//! - No connection handling, routing or response formatting; this crate is
//!   the parsing stage only
//! - Header folding (obsolete line continuations) inside multipart parts is
//!   rejected

pub mod error;
pub mod form;
pub mod parse;

mod utils;
pub(crate) use utils::ensure;

pub use error::BodyError;
pub use form::{FieldMap, FileUpload, FormBody, ParsedBody};
pub use parse::{parse, parse_request};
