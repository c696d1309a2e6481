//! Server-rendered request-processing pipeline with device classification.

pub mod config;
pub mod device;
pub mod dispatch;
pub mod http;
pub mod observability;
pub mod page;
pub mod pipeline;

pub use config::{load_config, PipelineConfig};
pub use device::{classify, DeviceCategory, DeviceDescriptor};
pub use http::{ForwardRenderer, PipelineServer};
pub use page::{Download, PageResult, PageUrl};
pub use pipeline::{AppFailure, Pipeline, RequestHandler, RequestInfo, RouteConfig};
