pub mod jwks_publisher;
pub mod refresh_token_service;
pub mod session_service;
pub mod token_issuer;
