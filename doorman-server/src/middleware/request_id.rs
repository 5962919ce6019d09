//! ULID request IDs.

use http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use ulid::Ulid;

/// Generates a fresh ULID per request, set and propagated as the
/// `request_id` header.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestUlid;

impl MakeRequestId for MakeRequestUlid {
    fn make_request_id<B>(&mut self, _: &Request<B>) -> Option<RequestId> {
        let ulid = Ulid::new().to_string();
        let value = HeaderValue::from_str(&ulid).ok()?;
        Some(RequestId::new(value))
    }
}
