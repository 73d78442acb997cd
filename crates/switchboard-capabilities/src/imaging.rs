//! Grayscale conversion of local image files.
//!
//! Input is `src [dst]`, whitespace separated. Without `dst` the result is
//! written to `<output_dir>/<stem>_gray.png`. Decoding and encoding run on
//! the blocking pool.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::{DynamicImage, ImageError};
use switchboard_core::{Capability, CapabilityError, CapabilityResult};
use tracing::debug;

const USAGE: &str = "укажите путь к изображению и, при желании, путь для результата";

/// Converts images to 8-bit grayscale.
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    output_dir: PathBuf,
}

impl ImageProcessor {
    /// Creates a processor writing default outputs under `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory for outputs when no destination is given.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Resolves `(source, destination, destination_is_default)`.
    fn plan(&self, input: &str) -> CapabilityResult<(PathBuf, PathBuf, bool)> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        match tokens.as_slice() {
            [src] => {
                let src = PathBuf::from(src);
                let stem = src
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| CapabilityError::validation(USAGE))?;
                let dst = self.output_dir.join(format!("{stem}_gray.png"));
                Ok((src, dst, true))
            }
            [src, dst] => Ok((PathBuf::from(src), PathBuf::from(dst), false)),
            _ => Err(CapabilityError::validation(USAGE)),
        }
    }
}

fn convert(src: &Path, dst: &Path) -> CapabilityResult<()> {
    let img = image::open(src).map_err(classify)?;
    let gray = DynamicImage::ImageLuma8(img.to_luma8());
    gray.save(dst).map_err(classify)
}

fn classify(err: ImageError) -> CapabilityError {
    match err {
        ImageError::IoError(e) => CapabilityError::Io(e.to_string()),
        ImageError::Decoding(e) => {
            debug!(error = %e, "Image decoding failed");
            CapabilityError::validation("файл не является изображением поддерживаемого формата")
        }
        ImageError::Unsupported(e) => {
            debug!(error = %e, "Unsupported image format");
            CapabilityError::validation("формат изображения не поддерживается (PNG или JPEG)")
        }
        other => CapabilityError::io(other.to_string()),
    }
}

#[async_trait]
impl Capability for ImageProcessor {
    fn name(&self) -> &'static str {
        "image"
    }

    async fn handle(&self, input: &str) -> CapabilityResult<String> {
        let (src, dst, default_dst) = self.plan(input)?;
        if default_dst {
            tokio::fs::create_dir_all(&self.output_dir).await?;
        }

        debug!(src = %src.display(), dst = %dst.display(), "Converting image to grayscale");
        tokio::task::spawn_blocking(move || convert(&src, &dst))
            .await
            .map_err(|e| CapabilityError::io(format!("image worker failed: {e}")))??;

        Ok("Изображение обработано и сохранено.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ColorType, Rgb, RgbImage};

    fn sample(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let img = RgbImage::from_fn(4, 4, |x, y| Rgb([(x * 60) as u8, (y * 60) as u8, 200]));
        img.save(&path).unwrap();
        path
    }

    #[tokio::test]
    async fn test_explicit_destination() {
        let dir = tempfile::tempdir().unwrap();
        let src = sample(dir.path(), "photo.png");
        let dst = dir.path().join("out.png");

        let reply = ImageProcessor::new(dir.path())
            .handle(&format!("{} {}", src.display(), dst.display()))
            .await
            .unwrap();
        assert_eq!(reply, "Изображение обработано и сохранено.");

        let out = image::open(&dst).unwrap();
        assert_eq!(out.color(), ColorType::L8);
        assert_eq!((out.width(), out.height()), (4, 4));
    }

    #[tokio::test]
    async fn test_default_destination() {
        let dir = tempfile::tempdir().unwrap();
        let src = sample(dir.path(), "cat.png");
        let out_dir = dir.path().join("processed");

        ImageProcessor::new(&out_dir)
            .handle(&src.display().to_string())
            .await
            .unwrap();
        assert!(out_dir.join("cat_gray.png").exists());
    }

    #[tokio::test]
    async fn test_missing_source_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.png");
        let result = ImageProcessor::new(dir.path())
            .handle(&missing.display().to_string())
            .await;
        assert!(matches!(result, Err(CapabilityError::Io(_))));
    }

    #[tokio::test]
    async fn test_unwritable_destination_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let src = sample(dir.path(), "a.png");
        let dst = dir.path().join("no/such/dir/b.png");
        let result = ImageProcessor::new(dir.path())
            .handle(&format!("{} {}", src.display(), dst.display()))
            .await;
        assert!(matches!(result, Err(CapabilityError::Io(_))));
    }

    #[tokio::test]
    async fn test_not_an_image_is_validation() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("notes.png");
        std::fs::write(&src, b"definitely not a png").unwrap();
        let result = ImageProcessor::new(dir.path())
            .handle(&src.display().to_string())
            .await;
        assert!(matches!(result, Err(CapabilityError::Validation(_))));
    }

    #[tokio::test]
    async fn test_bad_arity() {
        let processor = ImageProcessor::new("/tmp");
        assert!(matches!(
            processor.handle("").await,
            Err(CapabilityError::Validation(_))
        ));
        assert!(matches!(
            processor.handle("a b c").await,
            Err(CapabilityError::Validation(_))
        ));
    }
}
