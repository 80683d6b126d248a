//! # Sextant Test
//!
//! In-memory testing for Sextant applications. Requests go through
//! [`App::dispatch`](sextant::App::dispatch) exactly as a server adapter
//! would send them, with no sockets involved.
//!
//! ## Example
//!
//! ```
//! use sextant::{App, ViewBinding};
//! use sextant_core::Response;
//! use sextant_test::TestClient;
//! use http::Method;
//!
//! let app = App::builder()
//!     .route(
//!         ViewBinding::handler("/users/<id:int>", |req| {
//!             let id = req.params().get_int("id").unwrap_or_default();
//!             Response::json(&serde_json::json!({ "id": id }))
//!         })
//!         .method(Method::GET),
//!     )
//!     .bootstrap()
//!     .unwrap();
//!
//! let client = TestClient::new(app);
//! let response = client.get("/users/7").send();
//! response.assert_status_code(200);
//! assert_eq!(response.json_value().unwrap()["id"], 7);
//! ```

#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
