//! HTTP-facing adapters: identity extraction and verdict mapping.

mod identity;
mod response;

pub use identity::client_ip;
pub use response::{rejection_response, success_headers};
