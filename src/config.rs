use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    frame::EmptyFramePolicy,
    transform::Sampling,
};

/// Main configuration for the Sprite-Animator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Frame sequence output settings
    pub output: OutputConfig,

    /// Canvas and frame lifecycle settings
    pub frame: FrameConfig,

    /// Sprite transform settings
    pub transform: TransformConfig,

    /// Sprite loading settings
    pub sprites: SpriteConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.output.validate()?;
        self.frame.validate()?;
        Ok(())
    }
}

/// PNG compression level for written frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    #[default]
    Default,
    Fast,
    Best,
}

impl From<CompressionLevel> for png::Compression {
    fn from(level: CompressionLevel) -> Self {
        match level {
            CompressionLevel::Default => png::Compression::Default,
            CompressionLevel::Fast => png::Compression::Fast,
            CompressionLevel::Best => png::Compression::Best,
        }
    }
}

/// Frame sequence output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the numbered frames are written to
    pub directory: PathBuf,

    /// File name prefix, followed by the zero-padded frame number
    pub prefix: String,

    /// Width of the zero-padded frame number
    pub digits: usize,

    /// Keep the alpha channel in written frames (RGB otherwise)
    pub keep_alpha: bool,

    /// PNG compression level
    pub compression: CompressionLevel,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("frames"),
            prefix: "Frame_".to_string(),
            digits: 3,
            keep_alpha: false,
            compression: CompressionLevel::Default,
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() || self.prefix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                key: "output.prefix".to_string(),
                value: self.prefix.clone()
            }.into());
        }

        if !(1..=9).contains(&self.digits) {
            return Err(ConfigError::InvalidValue {
                key: "output.digits".to_string(),
                value: self.digits.to_string()
            }.into());
        }

        Ok(())
    }

    /// File name for the given frame index, e.g. `Frame_007.png`
    pub fn file_name(&self, frame_index: u64) -> String {
        format!("{}{:0width$}.png", self.prefix, frame_index, width = self.digits)
    }
}

/// Canvas and frame lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Canvas width used when no background image is set
    pub width: u32,

    /// Canvas height used when no background image is set
    pub height: u32,

    /// RGBA fill of the default background template
    pub background: [u8; 4],

    /// What saving a frame with nothing composited does
    pub empty_frame_policy: EmptyFramePolicy,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            background: [255, 255, 255, 255],
            empty_frame_policy: EmptyFramePolicy::Warn,
        }
    }
}

impl FrameConfig {
    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidValue {
                key: "frame.dimensions".to_string(),
                value: format!("{}x{}", self.width, self.height)
            }.into());
        }

        Ok(())
    }
}

/// Sprite transform configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Resampling used by rotation and non-integer scaling
    pub sampling: Sampling,
}

/// Sprite loading configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    /// RGB color made fully transparent when sprites are loaded
    pub color_key: Option<[u8; 3]>,
}
