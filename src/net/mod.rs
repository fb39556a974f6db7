//! Backend networking: the API gateway and the calls built on it.

pub mod api;
pub mod error;
pub mod gateway;
pub mod interceptor;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::{GatewayError, TransportError};
pub use gateway::ApiGateway;
pub use transport::{ReqwestTransport, Transport};
pub use types::{ApiErrorBody, MultipartForm, Payload, RequestOptions};
