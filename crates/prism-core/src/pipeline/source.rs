//! Source resolution: turn an arbitrary message into something decodable.

use std::fmt;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;

use crate::error::ResolveError;
use crate::message::{ByteStream, PipelineMessage};
use crate::render::{RenderContext, Renderer};

/// A byte-addressable image source produced by [`resolve`].
///
/// Exactly one variant per invocation; the enum owns whatever it names for
/// the rest of the invocation.
pub enum ResolvedSource {
    /// A byte stream, read once
    Stream(ByteStream),
    /// An owned in-memory buffer
    Bytes(Bytes),
    /// A file already on the local filesystem
    Path(PathBuf),
}

impl fmt::Debug for ResolvedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            Self::Path(path) => write!(f, "Path({})", path.display()),
        }
    }
}

/// Resolve a message to an image source.
///
/// Capability checks run in a fixed priority order and each returns eagerly:
///
/// 1. Stream: awaiting the open is the suspension point. Once a message
///    claims this capability the outcome is decided here; an empty or
///    garbage stream fails later, at decode.
/// 2. In-memory bytes.
/// 3. Local path, with no existence re-check. The capability guarantees a
///    real local file.
/// 4. Render the `from` template and read the result as a path if a file
///    exists there, else as Base64 image data.
///
/// The template only gets consulted for the generic case: a message carrying
/// a stream, bytes, or a path is richer than anything a template could
/// re-derive from it. The rendered string is overloaded by configuration
/// convenience (inline literal image data, or a path expression) and the
/// path reading wins when a string would satisfy both.
pub async fn resolve(
    msg: &dyn PipelineMessage,
    template: &str,
    renderer: &dyn Renderer,
    stage: &str,
) -> Result<ResolvedSource, ResolveError> {
    if let Some(stream) = msg.open_stream().await {
        return Ok(ResolvedSource::Stream(stream?));
    }

    if let Some(bytes) = msg.bytes() {
        return Ok(ResolvedSource::Bytes(bytes));
    }

    if let Some(path) = msg.local_path() {
        return Ok(ResolvedSource::Path(path.to_path_buf()));
    }

    let rendered = renderer.render(template, &RenderContext { message: msg, stage });

    if is_uri_reference(&rendered) && Path::new(&rendered).exists() {
        return Ok(ResolvedSource::Path(PathBuf::from(rendered)));
    }

    match BASE64.decode(rendered.trim()) {
        Ok(decoded) => Ok(ResolvedSource::Bytes(Bytes::from(decoded))),
        Err(err) => Err(ResolveError::NoSource {
            rendered: preview(&rendered),
            base64: err,
        }),
    }
}

/// Syntactic well-formedness check for a URI reference, absolute or
/// relative. Deliberately loose: the real test is the filesystem lookup
/// that follows, this only rejects strings that could not name a file.
/// Empties, whitespace, control characters, and the characters RFC 3986
/// excludes outright all fail.
fn is_uri_reference(s: &str) -> bool {
    !s.is_empty()
        && !s.chars().any(|c| {
            c.is_control()
                || c.is_whitespace()
                || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '\\' | '^' | '`')
        })
}

/// Cap the rendered candidate kept on the error. Inline payloads can be
/// whole images; logs don't want them.
fn preview(s: &str) -> String {
    const MAX_CHARS: usize = 64;
    let mut out: String = s.chars().take(MAX_CHARS).collect();
    if s.chars().count() > MAX_CHARS {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{BinaryMessage, FileMessage, StreamMessage, TextMessage};
    use crate::render::FieldRenderer;
    use async_trait::async_trait;
    use std::io::{Cursor, Write};

    /// Renderer for tests that must not reach the template fallback.
    fn untouchable() -> impl Renderer {
        |_: &str, _: &RenderContext<'_>| -> String {
            panic!("template rendered for a message with a capability")
        }
    }

    #[tokio::test]
    async fn test_stream_message_resolves_to_stream() {
        let msg = StreamMessage::new(Cursor::new(vec![1u8, 2, 3]));
        let source = resolve(&msg, "{value}", &untouchable(), "identify")
            .await
            .unwrap();
        assert!(matches!(source, ResolvedSource::Stream(_)));
    }

    #[tokio::test]
    async fn test_binary_message_resolves_to_bytes() {
        let msg = BinaryMessage::new(vec![9u8, 8, 7]);
        let source = resolve(&msg, "{value}", &untouchable(), "identify")
            .await
            .unwrap();
        match source {
            ResolvedSource::Bytes(bytes) => assert_eq!(bytes.as_ref(), &[9, 8, 7]),
            other => panic!("expected bytes, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_file_message_resolves_to_path() {
        // Path is taken on the capability's word, without an existence check
        let msg = FileMessage::new("/nonexistent/cat.png");
        let source = resolve(&msg, "{value}", &untouchable(), "identify")
            .await
            .unwrap();
        match source {
            ResolvedSource::Path(path) => {
                assert_eq!(path, Path::new("/nonexistent/cat.png"))
            }
            other => panic!("expected path, got {other:?}"),
        }
    }

    /// A host message answering several capability queries at once.
    struct OverloadedMessage {
        stream: StreamMessage,
    }

    #[async_trait]
    impl PipelineMessage for OverloadedMessage {
        async fn open_stream(&self) -> Option<std::io::Result<ByteStream>> {
            self.stream.open_stream().await
        }

        fn bytes(&self) -> Option<Bytes> {
            Some(Bytes::from_static(b"unused"))
        }

        fn local_path(&self) -> Option<&Path> {
            Some(Path::new("/unused"))
        }
    }

    struct BytesAndPath;

    impl PipelineMessage for BytesAndPath {
        fn bytes(&self) -> Option<Bytes> {
            Some(Bytes::from_static(b"payload"))
        }

        fn local_path(&self) -> Option<&Path> {
            Some(Path::new("/shadowed"))
        }
    }

    #[tokio::test]
    async fn test_priority_stream_beats_everything() {
        let msg = OverloadedMessage {
            stream: StreamMessage::new(Cursor::new(vec![0u8; 2])),
        };
        let source = resolve(&msg, "{value}", &untouchable(), "identify")
            .await
            .unwrap();
        assert!(matches!(source, ResolvedSource::Stream(_)));
    }

    #[tokio::test]
    async fn test_priority_bytes_beat_path() {
        let source = resolve(&BytesAndPath, "{value}", &untouchable(), "identify")
            .await
            .unwrap();
        assert!(matches!(source, ResolvedSource::Bytes(_)));
    }

    #[tokio::test]
    async fn test_stream_open_failure_does_not_fall_through() {
        let msg = StreamMessage::deferred(async {
            Err(std::io::Error::other("upstream hung up"))
        });
        let err = resolve(&msg, "{value}", &untouchable(), "identify")
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Stream(_)));
    }

    #[tokio::test]
    async fn test_template_resolves_existing_file_as_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not looked at here").unwrap();
        let msg = TextMessage::new(file.path().to_str().unwrap());

        let source = resolve(&msg, "{value}", &FieldRenderer, "identify")
            .await
            .unwrap();
        assert!(matches!(source, ResolvedSource::Path(_)));
    }

    #[tokio::test]
    async fn test_template_falls_back_to_base64() {
        let msg = TextMessage::new(BASE64.encode(b"raw image bytes"));
        let source = resolve(&msg, "{value}", &FieldRenderer, "identify")
            .await
            .unwrap();
        match source {
            ResolvedSource::Bytes(bytes) => assert_eq!(bytes.as_ref(), b"raw image bytes"),
            other => panic!("expected bytes, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_template_neither_path_nor_base64() {
        let msg = TextMessage::new("definitely not base64!!");
        let err = resolve(&msg, "{value}", &FieldRenderer, "identify")
            .await
            .unwrap_err();
        match err {
            ResolveError::NoSource { rendered, .. } => {
                assert!(rendered.starts_with("definitely"))
            }
            other => panic!("expected NoSource, got {other:?}"),
        }
    }

    #[test]
    fn test_uri_reference_syntax() {
        assert!(is_uri_reference("/photos/cat.png"));
        assert!(is_uri_reference("relative/path.jpg"));
        assert!(is_uri_reference("file:///tmp/a.png"));
        assert!(!is_uri_reference(""));
        assert!(!is_uri_reference("has a space"));
        assert!(!is_uri_reference("angle<bracket"));
        assert!(!is_uri_reference("line\nbreak"));
    }

    #[test]
    fn test_preview_caps_long_candidates() {
        let long = "A".repeat(500);
        let shortened = preview(&long);
        assert!(shortened.len() < 80);
        assert!(shortened.ends_with("..."));
    }
}
