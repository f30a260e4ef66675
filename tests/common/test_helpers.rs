#![allow(dead_code)]

use http::{Request, Response, StatusCode};
use status_repeater::Clock;
use std::convert::Infallible;
use std::future::{ready, Ready};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tower::{Service, ServiceExt};

/// Clock that only moves when told to.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Inner service that answers with a fixed sequence of statuses, one per call.
#[derive(Debug, Clone)]
pub struct ScriptedService {
    statuses: Arc<Vec<StatusCode>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedService {
    pub fn new(statuses: &[u16]) -> Self {
        let statuses = statuses
            .iter()
            .map(|code| StatusCode::from_u16(*code).expect("valid status"))
            .collect();
        Self { statuses: Arc::new(statuses), calls: Arc::new(AtomicUsize::new(0)) }
    }

    /// How many times the script has been consumed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn script_len(&self) -> usize {
        self.statuses.len()
    }
}

impl<B> Service<Request<B>> for ScriptedService {
    type Response = Response<String>;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: Request<B>) -> Self::Future {
        let i = self.calls.fetch_add(1, Ordering::SeqCst);
        let status = *self.statuses.get(i).expect("inner service called more often than scripted");
        let mut response = Response::new(String::new());
        *response.status_mut() = status;
        ready(Ok(response))
    }
}

pub fn get(uri: &str) -> Request<()> {
    Request::get(uri).body(()).expect("valid request")
}

/// Drive one request through `svc`, which must not fail.
pub async fn send<S>(svc: &mut S, req: Request<()>) -> Response<String>
where
    S: Service<Request<()>, Response = Response<String>>,
    S::Error: std::fmt::Debug,
{
    svc.ready().await.expect("service ready").call(req).await.expect("call succeeds")
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
