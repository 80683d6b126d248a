//! # Sextant Core
//!
//! Core types shared by every Sextant crate:
//!
//! - [`Request`] and [`RawRequest`]: the inbound request and its bounded body reader
//! - [`Response`] and [`FinalizedResponse`]: the outbound response and its transport form
//! - [`Error`], [`HttpError`] and [`Fault`]: the error taxonomy of hooks and handlers
//! - [`RequestContext`], [`RequestId`] and [`Stage`]: per-request bookkeeping
//! - [`Settings`]: the settings capability read by the dispatcher
//! - [`status`]: the HTTP status registry
//!
//! ## Example
//!
//! ```
//! use sextant_core::{RawRequest, Request, Response};
//! use http::Method;
//!
//! let mut request = Request::new(RawRequest::new(Method::POST, "/echo").with_bytes("hi"), 1024);
//! let body = request.body().unwrap().clone();
//!
//! let response = Response::bytes(body).finalize().unwrap();
//! assert_eq!(response.status_line, "200 OK");
//! ```

#![doc(html_root_url = "https://docs.rs/sextant-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod request;
mod response;
mod settings;
pub mod status;

pub use context::{RequestContext, RequestId, Stage};
pub use error::{
    Error, ErrorBody, ErrorDetails, Fault, HttpError, PanicReport, SextantResult,
    INTERNAL_SERVER_ERROR_CODE, INTERNAL_SERVER_ERROR_MESSAGE,
};
pub use request::{parse_urlencoded, RawRequest, Request};
pub use response::{
    Body, ChunkStream, FinalizedResponse, Response, APPLICATION_JSON, OCTET_STREAM, TEXT_PLAIN,
};
pub use settings::{Settings, StaticSettings, DEFAULT_MAX_BODY_SIZE};

// Re-export the router types that appear in this crate's public API.
pub use sextant_router::{ParamValue, Params};
