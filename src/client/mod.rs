//! Resilient API client
//!
//! Request flow:
//! cache check (reads) → request interceptors → retry policy → transport
//! → response interceptors → cache update or invalidation.

pub mod api_client;
pub mod errors;
pub mod interceptors;
pub mod retry;
pub mod transport;
pub mod types;

pub use api_client::ApiClient;
pub use errors::{ApiError, ErrorKind, InterceptorPhase};
pub use interceptors::{
    request_fn, response_fn, InterceptorChain, RequestInterceptor, ResponseAction,
    ResponseInterceptor,
};
pub use retry::RetryPolicy;
pub use transport::{call_with_deadline, Deadline, ReqwestTransport, Transport};
pub use types::*;
