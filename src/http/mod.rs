//! HTTP adapter subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, path → handler lookup)
//!     → request.rs (extract RequestInfo: headers, session, remote IP)
//!     → pipeline (blocking pool)
//!     → transport.rs (buffered output → Axum response)
//!     → Send to client
//! ```

pub mod request;
pub mod server;
pub mod transport;

pub use server::{ForwardRenderer, PipelineServer};
pub use transport::BufferedTransport;
