//! REST API implementation
//!
//! - types: request/response type definitions
//! - extractors: JSON extractor with readable rejections
//! - conversions: payload to resolver request, state to response
//! - handlers: endpoint handlers
//! - router: router creation

mod conversions;
mod extractors;
mod handlers;
mod router;
pub mod types;

// Re-export public API
pub use extractors::JsonExtractor;
pub use router::create_router;
pub use types::{AppState, HealthResponse, ReloadResponse, RunInputsPayload, RunInputsResponse};
