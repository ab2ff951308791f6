//! Error types for the Prism identification stage.
//!
//! Per-message failures (`ResolveError`, `DecodeError`) are soft: the stage
//! flattens them to "no result" at its boundary, so callers can never
//! propagate a "this message was not an image" condition as a crash. The
//! only hard error family is `ConfigError`, raised at construction time.

use std::io;
use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Soft failures from the source resolver.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// A stream-capable message whose stream could not be opened, or was
    /// already consumed. Logged at warning level; the stream capability
    /// short-circuits resolution, so there is no fallback from here.
    #[error("failed to open message stream: {0}")]
    Stream(#[from] io::Error),

    /// The message offered no capability and the rendered template was
    /// neither an existing path nor decodable Base64. The Base64 failure is
    /// kept for the debug log; externally this is just "no result".
    #[error("message did not resolve to an image source (rendered {rendered:?})")]
    NoSource {
        /// Rendered candidate, truncated for log hygiene
        rendered: String,
        /// Why the Base64 fallback rejected it
        #[source]
        base64: base64::DecodeError,
    },
}

/// Soft failures from the decoder.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Content sniffing and the extension fallback both failed to name a format
    #[error("unrecognized image format")]
    UnknownFormat,

    /// The codec has no decoder for the detected format
    #[error("{0}")]
    Unsupported(image::ImageError),

    /// Reading the source failed before the codec saw it
    #[error("{0}")]
    Read(#[from] io::Error),

    /// The codec rejected the content
    #[error("{0}")]
    Decode(image::ImageError),
}

impl DecodeError {
    /// Stable category label used in log lines.
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnknownFormat | Self::Unsupported(_) => "unsupported-format",
            Self::Read(_) => "read",
            Self::Decode(_) => "decode",
        }
    }

    /// True when the failure means "no decoder for this content", the quiet
    /// kind that gets logged at diagnostic level rather than as a warning.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnknownFormat | Self::Unsupported(_))
    }

    pub(crate) fn from_image(err: image::ImageError) -> Self {
        if matches!(err, image::ImageError::Unsupported(_)) {
            Self::Unsupported(err)
        } else {
            Self::Decode(err)
        }
    }
}
