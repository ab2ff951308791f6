//! The identification stage: resolve, decode, fingerprint, emit.

use std::sync::Arc;

use crate::config::{HashConfig, IdentifyConfig};
use crate::error::{ConfigError, ResolveError};
use crate::message::{IdentifiedImage, PipelineMessage};
use crate::pipeline::decode::decode;
use crate::pipeline::phash::PerceptualHasher;
use crate::pipeline::source::resolve;
use crate::render::Renderer;

/// A configured instance of the identification stage.
///
/// Internally immutable, so one instance serves any number of concurrent
/// invocations; each invocation owns all of its own state.
pub struct IdentifyStage {
    name: String,
    from: String,
    include_phash: bool,
    renderer: Box<dyn Renderer>,
    hasher: Arc<PerceptualHasher>,
}

impl IdentifyStage {
    /// Build a stage instance. The only failure mode is bad configuration;
    /// nothing here touches a message.
    pub fn new(
        config: &IdentifyConfig,
        hash: &HashConfig,
        renderer: impl Renderer + 'static,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            name: config.name.clone(),
            from: config.from.clone(),
            include_phash: config.include_phash,
            renderer: Box::new(renderer),
            hasher: Arc::new(PerceptualHasher::new(hash)?),
        })
    }

    /// Stage instance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle one message.
    ///
    /// Returns `None` for anything this stage cannot turn into an image.
    /// That is an expected outcome in a heterogeneous stream, not an error;
    /// the reasons land in the logs, never on the caller.
    pub async fn handle(&self, msg: &Arc<dyn PipelineMessage>) -> Option<IdentifiedImage> {
        let source = match resolve(
            msg.as_ref(),
            &self.from,
            self.renderer.as_ref(),
            &self.name,
        )
        .await
        {
            Ok(source) => source,
            Err(err @ ResolveError::Stream(_)) => {
                tracing::warn!("{}: stream error while resolving image source: {err}", self.name);
                return None;
            }
            Err(err) => {
                tracing::debug!("{}: {err}", self.name);
                return None;
            }
        };

        let decoded = match decode(source).await {
            Ok(decoded) => decoded,
            Err(err) if err.is_unsupported() => {
                tracing::debug!("{}: no decoder for this content: {err}", self.name);
                return None;
            }
            Err(err) => {
                tracing::warn!(
                    "{}: {} error while identifying image: {err}",
                    self.name,
                    err.category()
                );
                return None;
            }
        };

        // Hashing costs real CPU time. Hand it to a blocking worker and
        // await the result, so the dispatch loop underneath stays free.
        // The worker owns the image and returns it with the hash; it
        // writes nothing else, so the join is the only synchronization.
        let (decoded, phash) = if self.include_phash {
            let hasher = Arc::clone(&self.hasher);
            match tokio::task::spawn_blocking(move || {
                let phash = hasher.hash(&decoded.image);
                (decoded, phash)
            })
            .await
            {
                Ok(pair) => pair,
                Err(err) => {
                    tracing::warn!("{}: hash worker failed: {err}", self.name);
                    return None;
                }
            }
        } else {
            (decoded, None)
        };

        Some(IdentifiedImage {
            derived_from: Arc::downgrade(msg),
            stage: self.name.clone(),
            image: decoded,
            phash,
        })
    }
}
