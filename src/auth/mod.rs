//! Cookie based authentication of the owner making a request.
//!
//! Users register or log in with an email and password, after which
//! [set_auth_cookie] issues a session. Every protected route is wrapped in
//! [auth_guard], which hands the owner ID to the handlers.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod register;
mod token;

pub use cookie::{DEFAULT_COOKIE_DURATION, set_auth_cookie};
pub use log_in::post_log_in;
pub use log_out::post_log_out;
pub use middleware::auth_guard;
pub use register::post_register;
pub(crate) use token::Token;

#[cfg(test)]
pub use cookie::COOKIE_TOKEN;
