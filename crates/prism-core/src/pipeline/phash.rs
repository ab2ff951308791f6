//! Perceptual fingerprinting of decoded images.

use std::fmt;

use image::{DynamicImage, GenericImageView};
use image_hasher::{HasherConfig, ImageHash};

use crate::config::HashConfig;
use crate::error::ConfigError;

/// A perceptual hash with a canonical Base64 string encoding.
///
/// The encoding round-trips losslessly: `PerceptualHash::parse(h.encode())`
/// yields a hash equal to `h`. Similar images produce nearby hashes; how
/// near counts as "the same picture" is the consumer's call, this crate
/// only exposes the [`distance`](Self::distance).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerceptualHash(ImageHash);

impl PerceptualHash {
    /// Canonical string encoding.
    pub fn encode(&self) -> String {
        self.0.to_base64()
    }

    /// Parse the canonical encoding. `None` for anything malformed.
    pub fn parse(s: &str) -> Option<Self> {
        ImageHash::from_base64(s).ok().map(Self)
    }

    /// Hamming distance to another hash. 0 means identical fingerprints.
    pub fn distance(&self, other: &Self) -> u32 {
        self.0.dist(&other.0)
    }
}

impl fmt::Display for PerceptualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Computes perceptual hashes with a hasher configured once per stage.
pub struct PerceptualHasher {
    hasher: image_hasher::Hasher,
}

impl PerceptualHasher {
    /// Build the hasher from configuration. Fails on an unknown algorithm
    /// name, at stage construction rather than per message.
    pub fn new(config: &HashConfig) -> Result<Self, ConfigError> {
        let alg = config.algorithm()?;
        let hasher = HasherConfig::new()
            .hash_alg(alg)
            .hash_size(config.hash_size, config.hash_size)
            .to_hasher();
        Ok(Self { hasher })
    }

    /// Hash an image.
    ///
    /// Returns `None` when the image has no computable hash; a zero-area
    /// image has nothing to fingerprint.
    pub fn hash(&self, image: &DynamicImage) -> Option<PerceptualHash> {
        if image.width() == 0 || image.height() == 0 {
            return None;
        }
        Some(PerceptualHash(self.hasher.hash_image(image)))
    }
}
