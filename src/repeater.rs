//! Tower layer and service that repeat a trigger status instead of re-running requests.
//!
//! Once a request produces the trigger status, every request with the same key is answered
//! with that status, without reaching the inner service, until the window elapses.
//!
//! # Example
//! ```
//! use http::{Request, Response, StatusCode};
//! use status_repeater::StatusRepeaterLayer;
//! use std::convert::Infallible;
//! use std::time::Duration;
//! use tower::{service_fn, ServiceBuilder, ServiceExt};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let layer = StatusRepeaterLayer::new(StatusCode::NOT_FOUND, Duration::from_secs(60))?;
//! let svc = ServiceBuilder::new().layer(layer.clone()).service(service_fn(
//!     |_req: Request<()>| async {
//!         let mut response = Response::new(String::from("missing"));
//!         *response.status_mut() = StatusCode::NOT_FOUND;
//!         Ok::<_, Infallible>(response)
//!     },
//! ));
//!
//! let first = svc.clone().oneshot(Request::get("/articles?id=1").body(())?).await?;
//! let second = svc.oneshot(Request::get("/articles?id=1").body(())?).await?;
//! assert_eq!(first.body(), "missing");
//! assert_eq!(second.status(), StatusCode::NOT_FOUND);
//! assert!(second.body().is_empty());
//! assert_eq!(layer.stats().suppressed, 1);
//! # Ok(())
//! # }
//! ```

use crate::clock::{Clock, MonotonicClock};
use crate::error::BuildError;
use crate::key::{DefaultFormatKey, FormatKey};
use crate::observer::{Observer, ResponseFuture};
use crate::stats::{Counters, RepeaterStats};
use crate::store::SuppressionStore;
use http::{Request, Response, StatusCode};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tower_layer::Layer;
use tower_service::Service;

/// Window used when none is configured.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// State shared by every service built from one layer.
#[derive(Debug)]
pub(crate) struct RepeaterCore {
    pub(crate) trigger: StatusCode,
    pub(crate) store: SuppressionStore,
    pub(crate) counters: Counters,
}

/// Layer that wraps services in a [`StatusRepeater`].
///
/// Each built layer owns its own suppression store. Clones of the layer, and every service
/// it produces, share that store; separately built layers never see each other's keys.
///
/// The trigger is compared against [`Response::status`], and an `http` response always
/// carries one: `Response::new` starts at `200 OK`. A handler that never sets a status
/// therefore counts as `200`, so with a trigger of [`StatusCode::OK`] such responses arm
/// their key like any explicit `200` would.
#[derive(Debug)]
pub struct StatusRepeaterLayer<K = DefaultFormatKey> {
    core: Arc<RepeaterCore>,
    format_key: Arc<K>,
}

impl StatusRepeaterLayer {
    /// Repeat `trigger` for `window` after it is produced, keyed by [`DefaultFormatKey`].
    ///
    /// # Examples
    /// ```
    /// use http::StatusCode;
    /// use status_repeater::StatusRepeaterLayer;
    /// use std::time::Duration;
    /// let layer = StatusRepeaterLayer::new(StatusCode::NOT_FOUND, Duration::from_secs(30)).unwrap();
    /// assert_eq!(layer.trigger(), StatusCode::NOT_FOUND);
    /// ```
    pub fn new(trigger: StatusCode, window: Duration) -> Result<Self, BuildError> {
        Self::builder(trigger).window(window).build()
    }

    /// Start configuring a layer that repeats `trigger`.
    pub fn builder(trigger: StatusCode) -> StatusRepeaterBuilder {
        StatusRepeaterBuilder::new(trigger)
    }
}

impl<K> StatusRepeaterLayer<K> {
    /// Status that arms suppression and is replayed while suppressed.
    pub fn trigger(&self) -> StatusCode {
        self.core.trigger
    }

    /// The suppression store shared by this layer's services.
    pub fn store(&self) -> &SuppressionStore {
        &self.core.store
    }

    pub fn stats(&self) -> RepeaterStats {
        self.core.counters.snapshot()
    }
}

impl<K> Clone for StatusRepeaterLayer<K> {
    fn clone(&self) -> Self {
        Self { core: self.core.clone(), format_key: self.format_key.clone() }
    }
}

impl<S, K> Layer<S> for StatusRepeaterLayer<K> {
    type Service = StatusRepeater<S, K>;

    fn layer(&self, inner: S) -> Self::Service {
        StatusRepeater { inner, core: self.core.clone(), format_key: self.format_key.clone() }
    }
}

/// Builder for [`StatusRepeaterLayer`].
#[derive(Debug)]
pub struct StatusRepeaterBuilder<K = DefaultFormatKey> {
    trigger: StatusCode,
    window: Duration,
    format_key: K,
    clock: Arc<dyn Clock>,
}

impl StatusRepeaterBuilder {
    /// Builder with [`DEFAULT_WINDOW`], [`DefaultFormatKey`] and a [`MonotonicClock`].
    pub fn new(trigger: StatusCode) -> Self {
        Self {
            trigger,
            window: DEFAULT_WINDOW,
            format_key: DefaultFormatKey,
            clock: Arc::new(MonotonicClock::default()),
        }
    }
}

impl<K> StatusRepeaterBuilder<K> {
    /// How long a key stays suppressed after producing the trigger. Must be > 0.
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Replace the key derivation.
    ///
    /// # Example
    /// ```
    /// use http::{Request, StatusCode};
    /// use status_repeater::StatusRepeaterLayer;
    ///
    /// // Suppress per article id; requests without one are never suppressed.
    /// let layer = StatusRepeaterLayer::builder(StatusCode::NOT_FOUND)
    ///     .format_key(|req: &Request<()>| -> Option<String> {
    ///         req.uri().query()?.split('&').find(|kv| kv.starts_with("id=")).map(str::to_owned)
    ///     })
    ///     .build()
    ///     .unwrap();
    /// # let _ = layer;
    /// ```
    pub fn format_key<K2>(self, format_key: K2) -> StatusRepeaterBuilder<K2> {
        StatusRepeaterBuilder {
            trigger: self.trigger,
            window: self.window,
            format_key,
            clock: self.clock,
        }
    }

    /// Override the clock (useful for deterministic tests).
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Build the layer, validating inputs.
    pub fn build(self) -> Result<StatusRepeaterLayer<K>, BuildError> {
        if self.window.is_zero() {
            return Err(BuildError::ZeroWindow);
        }
        if self.trigger.is_informational() {
            return Err(BuildError::InformationalTrigger(self.trigger));
        }
        let core = RepeaterCore {
            trigger: self.trigger,
            store: SuppressionStore::with_clock(self.window, self.clock),
            counters: Counters::default(),
        };
        Ok(StatusRepeaterLayer { core: Arc::new(core), format_key: Arc::new(self.format_key) })
    }
}

/// Middleware service produced by [`StatusRepeaterLayer`].
///
/// Per request:
/// - no key: forwarded untouched, the store is not consulted;
/// - key suppressed: answered with the trigger status and an empty body, the inner service
///   is not called;
/// - otherwise: forwarded, and a trigger-status response (re)arms the key for one window.
///
/// Errors from the inner service pass through unchanged and never arm a key.
#[derive(Debug)]
pub struct StatusRepeater<S, K = DefaultFormatKey> {
    inner: S,
    core: Arc<RepeaterCore>,
    format_key: Arc<K>,
}

impl<S, K> StatusRepeater<S, K> {
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    /// The suppression store shared with the originating layer.
    pub fn store(&self) -> &SuppressionStore {
        &self.core.store
    }

    pub fn stats(&self) -> RepeaterStats {
        self.core.counters.snapshot()
    }
}

impl<S: Clone, K> Clone for StatusRepeater<S, K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            core: self.core.clone(),
            format_key: self.format_key.clone(),
        }
    }
}

impl<S, K, ReqBody, ResBody> Service<Request<ReqBody>> for StatusRepeater<S, K>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    K: FormatKey<ReqBody>,
    ResBody: Default,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future, ResBody, S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let Some(key) = self.format_key.format_key(&request) else {
            tracing::trace!(
                method = %request.method(),
                uri = %request.uri(),
                "Status repeater: no key, passing through"
            );
            self.core.counters.passthrough();
            return ResponseFuture::forward(self.inner.call(request), None);
        };

        if self.core.store.is_active(&key) {
            tracing::debug!(
                key = %key,
                status = self.core.trigger.as_u16(),
                "Status repeater: repeating status"
            );
            self.core.counters.suppressed();
            return ResponseFuture::repeat(self.core.trigger);
        }

        self.core.counters.observed();
        let observer = Observer::new(key, self.core.clone());
        ResponseFuture::forward(self.inner.call(request), Some(observer))
    }
}
