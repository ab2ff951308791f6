//! Prism Core - Embeddable image identification stage.
//!
//! Prism is a single pipeline stage that normalizes "something that
//! represents an image" into a decoded image annotated with a perceptual
//! hash. It receives one message, resolves it to image bytes by probing a
//! fixed-priority chain of capabilities, decodes it, optionally fingerprints
//! it off the dispatch path, and emits a result message that points back at
//! its origin.
//!
//! # Architecture
//!
//! ```text
//! Message → Resolve (stream | bytes | path | template) → Decode → PHash → IdentifiedImage
//! ```
//!
//! Anything the stage cannot turn into an image produces no result at all,
//! not an error. The stage is built to sit in a heterogeneous message
//! stream where most messages are not images.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use prism_core::{Config, FieldRenderer, FileMessage, IdentifyStage, PipelineMessage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), prism_core::ConfigError> {
//!     let config = Config::load()?;
//!     let stage = IdentifyStage::new(&config.identify, &config.hash, FieldRenderer)?;
//!
//!     let msg: Arc<dyn PipelineMessage> = Arc::new(FileMessage::new("./image.jpg"));
//!     if let Some(result) = stage.handle(&msg).await {
//!         println!("{:?}", result.summary());
//!     }
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod message;
pub mod pipeline;
pub mod render;

// Re-exports for convenient access
pub use config::{Config, HashConfig, IdentifyConfig, LoggingConfig, OutputConfig};
pub use error::{ConfigError, DecodeError, ResolveError};
pub use message::{
    BinaryMessage, ByteStream, FileMessage, IdentifiedImage, ImageSummary, PipelineMessage,
    StreamMessage, TextMessage,
};
pub use pipeline::{DecodedImage, IdentifyStage, PerceptualHash, PerceptualHasher, ResolvedSource};
pub use render::{FieldRenderer, RenderContext, Renderer};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
