//! Device classification from the User-Agent header.
//!
//! Pure, no I/O: one request-scoped descriptor per classification, used for
//! access logging and behavioral branching in application logic.

pub mod classifier;
pub mod descriptor;

pub use classifier::classify;
pub use descriptor::{Carrier, DeviceCategory, DeviceDescriptor};
