//! Models for the demo article service
//!
//! The sample record type plus the DTOs used for HTTP request and response
//! bodies.

pub mod article;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use article::Article;
pub use requests::ArticleRequest;
pub use responses::{DeleteResponse, HealthResponse, StatsResponse};
