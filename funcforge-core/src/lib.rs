//! FuncForge Core Library
//!
//! Packaging and execution orchestrator for the FuncForge FaaS gateway:
//! archive extraction, handler detection, templated image builds, the
//! function registry, and on-demand container execution.

pub mod archive;
pub mod builder;
pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod registry;
pub mod service;
pub mod template;
pub mod types;

// Re-export commonly used types
pub use builder::{parse_image_id, ImageBuilder};
pub use config::GatewayConfig;
pub use engine::{ContainerEngine, DockerCli, EngineOutput};
pub use error::{ForgeError, ForgeResult};
pub use registry::FunctionRegistry;
pub use service::{FunctionService, LoadReceipt};
pub use template::TemplateStore;
pub use types::{FunctionId, ImageId, Language};
