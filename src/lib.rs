#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # status-repeater
//!
//! Tower middleware that stops hammering a backend with requests it has just failed.
//!
//! Once a request produces the configured *trigger* status (say `404` or `503`), requests
//! with the same key are answered with that status directly, without reaching the inner
//! service, for a fixed window.
//!
//! ## Features
//!
//! - **Pluggable keys** via [`FormatKey`]; the default keys by method and request target
//! - **Per-layer state** in a lock-free [`SuppressionStore`]
//! - **Transparent forwarding**: non-suppressed responses and inner errors pass untouched
//! - **Injectable clock** for deterministic tests
//!
//! Expired entries are ignored rather than evicted, so the store grows with the number of
//! distinct keys that ever triggered.
//!
//! ## Quick Start
//!
//! ```rust
//! use http::StatusCode;
//! use status_repeater::{StatusRepeaterLayer, DEFAULT_WINDOW};
//! use tower::ServiceBuilder;
//! # use http::{Request, Response};
//! # use std::convert::Infallible;
//!
//! let layer = StatusRepeaterLayer::new(StatusCode::NOT_FOUND, DEFAULT_WINDOW).unwrap();
//! let svc = ServiceBuilder::new().layer(layer).service(tower::service_fn(
//!     |_req: Request<()>| async { Ok::<_, Infallible>(Response::new(String::new())) },
//! ));
//! # let _ = svc;
//! ```

pub mod clock;
pub mod error;
pub mod key;
pub mod observer;
pub mod prelude;
pub mod repeater;
pub mod stats;
pub mod store;

// Re-exports
pub use clock::{Clock, MonotonicClock};
pub use error::BuildError;
pub use key::{DefaultFormatKey, FormatKey};
pub use observer::ResponseFuture;
pub use repeater::{StatusRepeater, StatusRepeaterBuilder, StatusRepeaterLayer, DEFAULT_WINDOW};
pub use stats::RepeaterStats;
pub use store::SuppressionStore;
