//! Cookie-based user authentication: logging in and out, and the middleware
//! that guards the API routes.

pub(crate) mod cookie;
mod log_in;
mod log_out;
mod middleware;

pub(crate) use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::log_in_endpoint;
pub use log_out::log_out_endpoint;
pub use middleware::auth_guard;
