use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageEncoder, ImageFormat};
use pagekit_core::{Error, FileRecord, Result, StageContext, StageKind, Transform};
use tracing::debug;

use crate::command;

/// Lossless image optimization.
///
/// PNGs are re-encoded at maximum compression and the smaller buffer is
/// kept. Everything else (fonts, SVGs, JPEGs) passes through unless an
/// external command is configured, which then handles every file.
pub struct OptimizeStage {
    command: Option<String>,
}

impl OptimizeStage {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

impl Transform for OptimizeStage {
    fn kind(&self) -> StageKind {
        StageKind::Optimize
    }

    fn transform(&self, file: FileRecord, ctx: &StageContext<'_>) -> Result<Vec<FileRecord>> {
        if let Some(cmd) = self.command.as_deref().filter(|c| !c.trim().is_empty()) {
            let output = command::pipe("optimize", cmd, &file, ctx)?;
            return Ok(vec![file.with_contents(output)]);
        }

        if file.extension().as_deref() != Some("png") {
            return Ok(vec![file]);
        }

        let optimized = recompress_png(&file.contents)
            .map_err(|e| Error::transform("optimize", file.source_path(), e))?;

        if optimized.len() < file.contents.len() {
            debug!(
                "{}: {} -> {} bytes",
                file.path.display(),
                file.contents.len(),
                optimized.len()
            );
            Ok(vec![file.with_contents(optimized)])
        } else {
            Ok(vec![file])
        }
    }
}

fn recompress_png(bytes: &[u8]) -> image::ImageResult<Vec<u8>> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
    let mut out = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive);
    encoder.write_image(img.as_bytes(), img.width(), img.height(), img.color())?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use pagekit_core::Config;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn uncompressed_png() -> Vec<u8> {
        let img = ImageBuffer::from_pixel(64, 64, Rgba([200u8, 30, 30, 255]));
        let mut out = Vec::new();
        PngEncoder::new_with_quality(
            Cursor::new(&mut out),
            CompressionType::Fast,
            FilterType::NoFilter,
        )
        .write_image(img.as_raw(), 64, 64, image::ColorType::Rgba8)
        .unwrap();
        out
    }

    #[test]
    fn test_png_never_grows_and_stays_decodable() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::default();
        let ctx = StageContext {
            config: &config,
            root: temp_dir.path(),
        };
        let original = uncompressed_png();
        let file = FileRecord::new("logo.png", temp_dir.path(), original.clone());

        let out = OptimizeStage::new(None).transform(file, &ctx).unwrap();
        assert!(out[0].contents.len() <= original.len());

        let decoded = image::load_from_memory(&out[0].contents).unwrap();
        assert_eq!(decoded.width(), 64);
    }

    #[test]
    fn test_other_formats_pass_through() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::default();
        let ctx = StageContext {
            config: &config,
            root: temp_dir.path(),
        };
        let file = FileRecord::new("font.woff2", temp_dir.path(), b"wOF2".to_vec());

        let out = OptimizeStage::new(None).transform(file.clone(), &ctx).unwrap();
        assert_eq!(out, vec![file]);
    }

    #[test]
    fn test_corrupt_png_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::default();
        let ctx = StageContext {
            config: &config,
            root: temp_dir.path(),
        };
        let file = FileRecord::new("broken.png", temp_dir.path(), b"not a png".to_vec());

        assert!(OptimizeStage::new(None).transform(file, &ctx).is_err());
    }
}
