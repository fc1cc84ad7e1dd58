pub mod refresh_tokens;
