//! Built-in middleware.
//!
//! - [`BodyLimit`] rejects requests whose declared body is over the limit
//!   before any view runs. The dispatcher always installs it ahead of user
//!   middleware.
//! - [`RequestIdMiddleware`] propagates request IDs through the
//!   `x-request-id` header.

pub mod body_limit;
pub mod request_id;

pub use body_limit::BodyLimit;
pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};
