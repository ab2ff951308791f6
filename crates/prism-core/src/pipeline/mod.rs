//! The identification pipeline, stage by stage:
//! - **source**: Resolve a message to a byte-addressable image source
//! - **decode**: Decode the source into an image
//! - **phash**: Perceptual fingerprinting
//! - **identify**: Orchestrates one message through all of the above

pub mod decode;
pub mod identify;
pub mod phash;
pub mod source;

// Re-exports for convenient access
pub use decode::{decode, DecodedImage};
pub use identify::IdentifyStage;
pub use phash::{PerceptualHash, PerceptualHasher};
pub use source::{resolve, ResolvedSource};
