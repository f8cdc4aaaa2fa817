use std::path::{Path, PathBuf};

use png::{BitDepth, ColorType, Compression, Encoder};
use tracing::{debug, info};

use crate::config::OutputConfig;
use crate::error::{FrameError, Result};
use crate::frame::Frame;

/// Where a saved frame ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameArtifact {
    pub frame_index: u64,
    pub location: PathBuf,
}

/// Destination for finished frames
///
/// A sink must either persist the whole frame or return an error; the frame
/// buffer only advances its counter after a successful write.
pub trait FrameSink {
    /// Get the sink name for logging
    fn name(&self) -> &str;

    /// Persist `frame` under `frame_index`
    fn write_frame(&mut self, frame_index: u64, frame: &Frame) -> Result<FrameArtifact>;

    /// Undo a write, used when a multi-frame save fails part way
    fn discard_frame(&mut self, artifact: &FrameArtifact) -> Result<()>;
}

/// Writes frames as a numbered PNG sequence (`Frame_000.png`, `Frame_001.png`, ...)
#[derive(Debug, Clone)]
pub struct PngSequenceWriter {
    config: OutputConfig,
    directory_ready: bool,
}

impl PngSequenceWriter {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            directory_ready: false,
        }
    }

    /// Same sequence naming, different target directory
    pub fn in_directory<P: Into<PathBuf>>(directory: P) -> Self {
        Self::new(OutputConfig {
            directory: directory.into(),
            ..OutputConfig::default()
        })
    }

    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    /// File path frame `frame_index` is written to
    pub fn path_for(&self, frame_index: u64) -> PathBuf {
        self.config.directory.join(self.config.file_name(frame_index))
    }

    fn ensure_directory(&mut self) -> std::io::Result<()> {
        if !self.directory_ready {
            std::fs::create_dir_all(&self.config.directory)?;
            info!("Writing frames to {:?}", self.config.directory);
            self.directory_ready = true;
        }
        Ok(())
    }
}

impl FrameSink for PngSequenceWriter {
    fn name(&self) -> &str {
        "png-sequence"
    }

    fn write_frame(&mut self, frame_index: u64, frame: &Frame) -> Result<FrameArtifact> {
        let path = self.path_for(frame_index);
        let failed = |reason: String| FrameError::EncodeFailed {
            frame_index,
            path: path.clone(),
            reason,
        };

        self.ensure_directory().map_err(|e| failed(e.to_string()))?;

        // Encode fully in memory so a failure never leaves a truncated file
        let bytes = encode_png(frame, self.config.keep_alpha, self.config.compression.into())
            .map_err(|e| failed(e.to_string()))?;
        std::fs::write(&path, bytes).map_err(|e| {
            let _ = std::fs::remove_file(&path);
            failed(e.to_string())
        })?;

        debug!("Saved frame {} to {:?}", frame_index, path);
        Ok(FrameArtifact {
            frame_index,
            location: path,
        })
    }

    fn discard_frame(&mut self, artifact: &FrameArtifact) -> Result<()> {
        match std::fs::remove_file(&artifact.location) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => {
                debug!("Discarded frame {} at {:?}", artifact.frame_index, artifact.location);
                Ok(())
            }
        }
    }
}

/// Encode a frame as 8-bit RGB or RGBA PNG
pub fn encode_png(
    frame: &Frame,
    keep_alpha: bool,
    compression: Compression,
) -> std::result::Result<Vec<u8>, png::EncodingError> {
    let mut bytes = Vec::new();
    {
        let mut encoder = Encoder::new(&mut bytes, frame.width(), frame.height());
        encoder.set_depth(BitDepth::Eight);
        encoder.set_compression(compression);

        let data = if keep_alpha {
            encoder.set_color(ColorType::Rgba);
            frame.to_rgba_bytes()
        } else {
            encoder.set_color(ColorType::Rgb);
            frame.to_rgb_bytes()
        };

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&data)?;
        writer.finish()?;
    }
    Ok(bytes)
}

/// Keeps every frame in memory, for previews and tests
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    frames: Vec<(u64, Frame)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[(u64, Frame)] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn last(&self) -> Option<&Frame> {
        self.frames.last().map(|(_, frame)| frame)
    }

    pub fn into_frames(self) -> Vec<(u64, Frame)> {
        self.frames
    }
}

impl FrameSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn write_frame(&mut self, frame_index: u64, frame: &Frame) -> Result<FrameArtifact> {
        self.frames.push((frame_index, frame.clone()));
        Ok(FrameArtifact {
            frame_index,
            location: PathBuf::from(format!("memory:{}", frame_index)),
        })
    }

    fn discard_frame(&mut self, artifact: &FrameArtifact) -> Result<()> {
        self.frames.retain(|(index, _)| *index != artifact.frame_index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_png_sequence_naming_and_content() {
        let dir = tempdir().unwrap();
        let mut writer = PngSequenceWriter::in_directory(dir.path().join("out"));

        let mut frame = Frame::new_filled(5, 4, [255, 255, 255, 255]);
        frame.set_pixel(1, 2, [10, 20, 30, 255]);

        let artifact = writer.write_frame(7, &frame).unwrap();
        assert_eq!(artifact.location, dir.path().join("out").join("Frame_007.png"));

        let decoded = image::open(&artifact.location).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
        let rgb = decoded.to_rgb8();
        assert_eq!(rgb.dimensions(), (5, 4));
        assert_eq!(rgb.get_pixel(1, 2).0, [10, 20, 30]);
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_keep_alpha_writes_rgba() {
        let dir = tempdir().unwrap();
        let mut writer = PngSequenceWriter::new(OutputConfig {
            directory: dir.path().to_path_buf(),
            prefix: "shot_".to_string(),
            digits: 4,
            keep_alpha: true,
            ..OutputConfig::default()
        });

        let frame = Frame::new_filled(2, 2, [1, 2, 3, 100]);
        let artifact = writer.write_frame(3, &frame).unwrap();
        assert!(artifact.location.ends_with("shot_0003.png"));

        let decoded = image::open(&artifact.location).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0).0, [1, 2, 3, 100]);
    }

    #[test]
    fn test_unwritable_directory_reports_frame() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"x").unwrap();

        let mut writer = PngSequenceWriter::in_directory(&blocker);
        let err = writer.write_frame(12, &Frame::new_filled(2, 2, [0; 4])).unwrap_err();

        assert_eq!(err.frame_index(), Some(12));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_discard_removes_written_file() {
        let dir = tempdir().unwrap();
        let mut writer = PngSequenceWriter::in_directory(dir.path());

        let artifact = writer.write_frame(0, &Frame::new_filled(2, 2, [0; 4])).unwrap();
        assert!(artifact.location.exists());

        writer.discard_frame(&artifact).unwrap();
        assert!(!artifact.location.exists());
        // Already gone is fine
        writer.discard_frame(&artifact).unwrap();
    }

    #[test]
    fn test_memory_sink_keeps_frames() {
        let mut sink = MemorySink::new();
        sink.write_frame(0, &Frame::new_filled(1, 1, [0; 4])).unwrap();
        sink.write_frame(1, &Frame::new_filled(1, 1, [9; 4])).unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.last().unwrap().get_pixel(0, 0), [9; 4]);
    }
}
