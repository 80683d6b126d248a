//! # Sextant
//!
//! **A small, synchronous web framework core.**
//!
//! Sextant turns a [`RawRequest`](sextant_core::RawRequest) handed over by a
//! server adapter into a finalized response:
//!
//! - **Typed routing**: a segment trie with static, typed and optional
//!   parameters, a bounded resolution cache and reverse URL building.
//! - **Views**: a handler plus scoped `before_handler`, `after_handler` and
//!   `on_exception` hooks.
//! - **Middlewares**: ordered hooks around routing and the view.
//! - **Uniform errors**: application errors keep their status, faults
//!   become a 500 whose details only show up in debug mode.
//!
//! ## Quick Start
//!
//! ```
//! use sextant::prelude::*;
//! use http::Method;
//!
//! let app = App::builder()
//!     .route(
//!         ViewBinding::handler("/users/<id:int>", |req| {
//!             let id = req.params().get_int("id").unwrap_or_default();
//!             Response::json(&serde_json::json!({ "id": id }))
//!         })
//!         .method(Method::GET)
//!         .name("user"),
//!     )
//!     .bootstrap()
//!     .unwrap();
//!
//! let response = app.dispatch(RawRequest::new(Method::GET, "/users/42"));
//! assert_eq!(response.status.as_u16(), 200);
//! assert_eq!(app.registry().url_for("user", [("id", 42_i64)]).unwrap(), "/users/42");
//! ```
//!
//! ## Dispatch order
//!
//! ```text
//! before_route (M1..Mn) → resolve → body limit → before_handler (M1..Mn)
//!     → view.before_handler → view.handle → view.after_handler
//!     → after_handler (M1..Mn) → finalize
//! ```

#![forbid(unsafe_code)]

mod app;
mod registry;
mod render;
mod unwind;
mod view;

pub use app::{App, AppBuilder};
pub use registry::{Registry, ViewMatch};
pub use view::{FnView, Recovery, View, ViewBinding};

// Re-export the building blocks
pub use sextant_core as core;
pub use sextant_middleware as middleware;
pub use sextant_router as router;
pub use sextant_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```
/// use sextant::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{App, AppBuilder, Recovery, Registry, View, ViewBinding};

    pub use sextant_core::{
        Error, Fault, FinalizedResponse, HttpError, RawRequest, Request, RequestContext,
        RequestId, Response, SextantResult, Settings, StaticSettings,
    };

    pub use sextant_middleware::{Flow, FnMiddleware, Middleware};

    pub use sextant_router::{ParamType, ParamValue, Params, RouteError};
}
