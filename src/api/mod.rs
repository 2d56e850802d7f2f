//! API Module
//!
//! HTTP handlers and routing for the demo article service, which exercises
//! the cache-aside layer end to end.
//!
//! # Endpoints
//! - `GET /articles` - List latest articles, filtered by query parameters
//! - `POST /articles` - Create an article
//! - `GET /articles/:id` - Fetch one article
//! - `PUT /articles/:id` - Replace an article
//! - `DELETE /articles/:id` - Delete an article
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
