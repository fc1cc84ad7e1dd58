//! Request authentication for resource servers.
//!
//! # Components
//!
//! - `auth` - Bearer header handling on top of the JWT validator

pub mod auth;

pub use auth::{AuthenticationFailure, BearerAuthenticator};
