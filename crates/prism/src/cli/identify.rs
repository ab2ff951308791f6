//! The `identify` command: run inputs through the stage and emit records.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use prism_core::{Config, FieldRenderer, FileMessage, IdentifyStage, PipelineMessage, TextMessage};

use crate::output::{self, OutputFormat};

/// Arguments for the identify command.
#[derive(Args, Debug)]
pub struct IdentifyArgs {
    /// Inputs to identify. An existing file is fed as a file message; any
    /// other string becomes a plain message resolved through the configured
    /// `from` template (so inline Base64 works from the shell).
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Skip the perceptual hash
    #[arg(long)]
    pub no_phash: bool,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: json or jsonl
    #[arg(long)]
    pub format: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the identify command.
pub async fn execute(args: IdentifyArgs, config: &Config) -> anyhow::Result<()> {
    let mut identify = config.identify.clone();
    if args.no_phash {
        identify.include_phash = false;
    }
    let stage = IdentifyStage::new(&identify, &config.hash, FieldRenderer)?;

    let format_name = args.format.as_deref().unwrap_or(&config.output.format);
    let format = OutputFormat::parse(format_name)
        .ok_or_else(|| anyhow::anyhow!("unknown output format: {format_name:?}"))?;
    let pretty = args.pretty || config.output.pretty;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for input in &args.inputs {
        let msg: Arc<dyn PipelineMessage> = if Path::new(input).exists() {
            Arc::new(FileMessage::new(PathBuf::from(input)))
        } else {
            Arc::new(TextMessage::new(input.clone()))
        };

        match stage.handle(&msg).await {
            Some(result) => records.push(result.summary()),
            None => {
                skipped += 1;
                tracing::info!("no image in {input:?}");
            }
        }
    }

    match &args.output {
        Some(path) => {
            let mut file = std::fs::File::create(path)?;
            output::write_records(&mut file, &records, format, pretty)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            output::write_records(&mut lock, &records, format, pretty)?;
        }
    }

    tracing::info!("{} identified, {} skipped", records.len(), skipped);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};
    use prism_core::ImageSummary;
    use std::io::Cursor;

    fn png_file(dir: &Path, name: &str) -> PathBuf {
        let img = DynamicImage::new_rgb8(12, 12);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, buf.into_inner()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_identify_writes_records_and_skips_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let image = png_file(dir.path(), "in.png");
        let out = dir.path().join("out.json");

        let args = IdentifyArgs {
            inputs: vec![
                image.to_str().unwrap().to_string(),
                "not an image at all".to_string(),
            ],
            no_phash: false,
            output: Some(out.clone()),
            format: Some("json".to_string()),
            pretty: false,
        };
        execute(args, &Config::default()).await.unwrap();

        let records: Vec<ImageSummary> =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].format, "png");
        assert!(records[0].phash.is_some());
    }

    #[tokio::test]
    async fn test_no_phash_flag() {
        let dir = tempfile::tempdir().unwrap();
        let image = png_file(dir.path(), "in.png");
        let out = dir.path().join("out.jsonl");

        let args = IdentifyArgs {
            inputs: vec![image.to_str().unwrap().to_string()],
            no_phash: true,
            output: Some(out.clone()),
            format: None,
            pretty: false,
        };
        execute(args, &Config::default()).await.unwrap();

        let line = std::fs::read_to_string(&out).unwrap();
        let record: ImageSummary = serde_json::from_str(line.trim()).unwrap();
        assert!(record.phash.is_none());
    }
}
