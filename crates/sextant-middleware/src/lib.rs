//! # Sextant Middleware
//!
//! Middleware hooks for the Sextant dispatcher.
//!
//! A [`Middleware`] has three optional hooks, run by a [`MiddlewareChain`]
//! in registration order:
//!
//! ```text
//! Request → before_route (m1, m2, ...) → routing → before_handler (m1, m2, ...)
//!                                                          ↓
//! Response ← after_handler (m1, m2, ...) ←──────────── view
//! ```
//!
//! | Hook | Can short-circuit | Sees path params |
//! |---|---|---|
//! | `before_route` | yes, via [`Flow::Respond`] | no |
//! | `before_handler` | yes, via [`Flow::Respond`] | yes |
//! | `after_handler` | no, mutates the response in place | yes |
//!
//! ## Example
//!
//! ```
//! use sextant_core::{RawRequest, Request, Response};
//! use sextant_middleware::{Flow, FnMiddleware, MiddlewareChain};
//! use http::Method;
//!
//! let mut chain = MiddlewareChain::new();
//! chain.push(FnMiddleware::new("deny_admin").on_before_route(|req| {
//!     if req.path().starts_with("/admin") {
//!         Ok(Flow::Respond(Response::text("forbidden").with_status(http::StatusCode::FORBIDDEN)))
//!     } else {
//!         Ok(Flow::Continue)
//!     }
//! }));
//!
//! let mut request = Request::from(RawRequest::new(Method::GET, "/admin/users"));
//! let flow = chain.before_route(&mut request).unwrap();
//! assert!(!flow.is_continue());
//! ```

#![doc(html_root_url = "https://docs.rs/sextant-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod middleware;
pub mod stages;

pub use chain::{BoxedMiddleware, MiddlewareChain};
pub use middleware::{Flow, FnMiddleware, Middleware};
pub use sextant_core::Stage;
pub use stages::{BodyLimit, RequestIdMiddleware, REQUEST_ID_HEADER};
