//! Message shapes consumed and produced by the identification stage.
//!
//! The stage sits in a host pipeline that delivers messages of unknown
//! concrete type. It never enumerates those types; it probes the
//! [`PipelineMessage`] capability queries in a fixed priority order (see
//! [`resolve`](crate::pipeline::source::resolve)). The shapes defined here
//! cover the common cases, but any host type implementing the trait flows
//! through the stage unchanged.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Weak;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;
use tokio::sync::Mutex;

use crate::pipeline::decode::DecodedImage;
use crate::pipeline::phash::PerceptualHash;

/// A message's byte stream. Read once, then exhausted.
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

/// A message flowing through the host pipeline.
///
/// Every capability query defaults to "not offered", so a message type
/// implements only what it actually carries. A message may answer more than
/// one query; the resolver takes the highest-priority answer and ignores
/// the rest.
#[async_trait]
pub trait PipelineMessage: Send + Sync {
    /// Open the message's byte stream, if it carries one.
    ///
    /// Opening may suspend (the stream can be backed by deferred I/O).
    /// Streams are read-once: a second open reports an error rather than
    /// silently yielding an empty stream.
    async fn open_stream(&self) -> Option<io::Result<ByteStream>> {
        None
    }

    /// The message's in-memory binary payload, if it carries one.
    fn bytes(&self) -> Option<Bytes> {
        None
    }

    /// Path to the local file backing this message, if any. The path is
    /// trusted to exist; whoever localised the resource vouched for it.
    fn local_path(&self) -> Option<&Path> {
        None
    }

    /// The message's textual value, exposed to the `from` template.
    fn text(&self) -> Option<&str> {
        None
    }
}

enum StreamState {
    Ready(ByteStream),
    Deferred(Pin<Box<dyn Future<Output = io::Result<ByteStream>> + Send>>),
}

/// A message wrapping a byte stream, possibly one that has not been opened
/// yet.
pub struct StreamMessage {
    state: Mutex<Option<StreamState>>,
}

impl StreamMessage {
    /// Wrap an already-open stream.
    pub fn new(stream: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            state: Mutex::new(Some(StreamState::Ready(Box::new(stream)))),
        }
    }

    /// Wrap a stream that opens on first use. The future runs when the
    /// resolver claims the stream, which is where the caller suspends.
    pub fn deferred<F>(open: F) -> Self
    where
        F: Future<Output = io::Result<ByteStream>> + Send + 'static,
    {
        Self {
            state: Mutex::new(Some(StreamState::Deferred(Box::pin(open)))),
        }
    }
}

#[async_trait]
impl PipelineMessage for StreamMessage {
    async fn open_stream(&self) -> Option<io::Result<ByteStream>> {
        let state = self.state.lock().await.take();
        Some(match state {
            Some(StreamState::Ready(stream)) => Ok(stream),
            Some(StreamState::Deferred(open)) => open.await,
            None => Err(io::Error::other("message stream already consumed")),
        })
    }
}

/// A message carrying an in-memory binary payload.
pub struct BinaryMessage {
    bytes: Bytes,
}

impl BinaryMessage {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl PipelineMessage for BinaryMessage {
    fn bytes(&self) -> Option<Bytes> {
        Some(self.bytes.clone())
    }
}

/// A message pointing at a file already on the local filesystem.
///
/// Remote resources are downloaded by an upstream stage before they get
/// here; this stage never fetches anything over the network.
pub struct FileMessage {
    path: PathBuf,
}

impl FileMessage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PipelineMessage for FileMessage {
    fn local_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// A plain message carrying only a textual value. Resolution for these goes
/// through the configured `from` template.
pub struct TextMessage {
    value: String,
}

impl TextMessage {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl PipelineMessage for TextMessage {
    fn text(&self) -> Option<&str> {
        Some(&self.value)
    }
}

/// Result message emitted by the stage.
///
/// The decoded image and its hash wrap codec state and do not serialize;
/// only the [`summary`](Self::summary) projection crosses process
/// boundaries. A consumer on the far side that needs the pixels should be
/// sent the originating message instead and run it back through the stage
/// over there.
pub struct IdentifiedImage {
    /// Lineage back to the message this was derived from. Weak on purpose:
    /// a result must never extend the life of its input.
    pub derived_from: Weak<dyn PipelineMessage>,

    /// Name of the stage instance that produced this, for diagnostics.
    pub stage: String,

    /// The decoded image, owned by this message.
    pub image: DecodedImage,

    /// Perceptual hash, when enabled and computable.
    pub phash: Option<PerceptualHash>,
}

impl IdentifiedImage {
    /// Serializable projection of this message.
    pub fn summary(&self) -> ImageSummary {
        ImageSummary {
            stage: self.stage.clone(),
            width: self.image.width,
            height: self.image.height,
            format: self.image.format_name().to_string(),
            phash: self.phash.as_ref().map(PerceptualHash::encode),
        }
    }
}

/// The serializable subset of an [`IdentifiedImage`]: the facts about the
/// image, with the hash in its canonical string encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSummary {
    /// Stage instance that produced the record
    pub stage: String,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Detected format ("jpeg", "png", "webp", etc.)
    pub format: String,

    /// Canonical perceptual hash encoding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phash: Option<String>,
}
