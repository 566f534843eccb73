//! HTTP middleware stack for the shop server.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added in `main`, capture errors and transactions)
//! 2. `TraceLayer` (one span per request)
//! 3. Request ID (record in span, echo in response)
//! 4. Body limit (caps multipart uploads)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware, request_span};
