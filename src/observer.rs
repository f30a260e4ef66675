//! Response observation for the status repeater.
//!
//! [`ResponseFuture`] is what the repeater hands back to the caller. While forwarding, it
//! resolves to exactly what the inner service produced (status, headers and body are
//! untouched) and, on the way out, looks at the status once to decide whether the key
//! should be armed. While repeating, it resolves to a bare trigger-status response.

use crate::repeater::RepeaterCore;
use http::{Response, StatusCode};
use pin_project::pin_project;
use std::future::{Future, Ready};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

/// Captures the status of one forwarded request and arms its key on a trigger match.
#[derive(Debug)]
pub(crate) struct Observer {
    key: String,
    core: Arc<RepeaterCore>,
}

impl Observer {
    pub(crate) fn new(key: String, core: Arc<RepeaterCore>) -> Self {
        Self { key, core }
    }

    /// `observed` is `None` when the inner service failed instead of responding.
    fn finish(self, observed: Option<StatusCode>) {
        let trigger = self.core.trigger;
        if observed != Some(trigger) {
            return;
        }

        tracing::info!(
            key = %self.key,
            status = trigger.as_u16(),
            window = ?self.core.store.window(),
            "Status repeater → armed"
        );
        self.core.store.record(self.key);
        self.core.counters.armed();
    }
}

/// Response future returned by [`StatusRepeater`](crate::StatusRepeater).
#[pin_project]
pub struct ResponseFuture<F, B, E> {
    #[pin]
    kind: Kind<F, B, E>,
}

#[pin_project(project = KindProj)]
enum Kind<F, B, E> {
    Forward {
        #[pin]
        future: F,
        observer: Option<Observer>,
    },
    Repeat {
        #[pin]
        reply: Ready<Result<Response<B>, E>>,
    },
}

impl<F, B, E> ResponseFuture<F, B, E> {
    pub(crate) fn forward(future: F, observer: Option<Observer>) -> Self {
        Self { kind: Kind::Forward { future, observer } }
    }

    pub(crate) fn repeat(status: StatusCode) -> Self
    where
        B: Default,
    {
        let mut response = Response::new(B::default());
        *response.status_mut() = status;
        Self { kind: Kind::Repeat { reply: std::future::ready(Ok(response)) } }
    }
}

impl<F, B, E> Future for ResponseFuture<F, B, E>
where
    F: Future<Output = Result<Response<B>, E>>,
{
    type Output = Result<Response<B>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project().kind.project() {
            KindProj::Forward { future, observer } => {
                let result = ready!(future.poll(cx));
                if let Some(observer) = observer.take() {
                    observer.finish(result.as_ref().ok().map(|response| response.status()));
                }
                Poll::Ready(result)
            }
            KindProj::Repeat { reply } => reply.poll(cx),
        }
    }
}
