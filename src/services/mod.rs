// Threatmark services
// Stateless validation, the in-memory rate limiter, and the upstream feed client.

pub mod feed_client;
pub mod rate_limiter;
pub mod url_validator;
