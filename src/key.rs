//! Request key derivation.
//!
//! A key names the requests that count as "the same operation" for suppression. The
//! derivation also decides applicability: returning `None` sends the request straight to
//! the inner service without touching the suppression store.

use http::uri::PathAndQuery;
use http::Request;

/// Derives a suppression key from a request.
///
/// Implemented for [`DefaultFormatKey`] and for any
/// `Fn(&Request<B>) -> Option<String> + Send + Sync`.
///
/// # Example
/// ```
/// use http::Request;
/// use status_repeater::FormatKey;
///
/// // Only GETs are eligible, keyed by path alone.
/// let by_path = |req: &Request<()>| {
///     (req.method() == http::Method::GET).then(|| req.uri().path().to_owned())
/// };
/// let req = Request::get("/articles?id=1").body(()).unwrap();
/// assert_eq!(by_path.format_key(&req).as_deref(), Some("/articles"));
/// ```
pub trait FormatKey<B>: Send + Sync {
    /// Key for `request`, or `None` when suppression does not apply to it.
    fn format_key(&self, request: &Request<B>) -> Option<String>;
}

/// Keys requests by method followed by the request target, e.g. `GET/articles?id=123`.
///
/// Matching is exact: query parameters are not reordered and nothing is case-folded, so
/// `?a=1&b=2` and `?b=2&a=1` are different keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatKey;

impl<B> FormatKey<B> for DefaultFormatKey {
    fn format_key(&self, request: &Request<B>) -> Option<String> {
        let target = request.uri().path_and_query().map(PathAndQuery::as_str).unwrap_or("/");
        Some(format!("{}{}", request.method(), target))
    }
}

impl<B, F> FormatKey<B> for F
where
    F: Fn(&Request<B>) -> Option<String> + Send + Sync,
{
    fn format_key(&self, request: &Request<B>) -> Option<String> {
        self(request)
    }
}
