use std::path::{Path, PathBuf};

use image::{imageops, RgbaImage};
use tracing::{debug, info, warn};

use crate::config::SpriteConfig;
use crate::error::{AssetError, Result};
use crate::sprite::{FrameElement, Sprite};

/// Loads sprite sequences from image files on disk
///
/// Sequence order is the alphanumerical order of the file names, so
/// `walk_000.png`, `walk_001.png`, ... load in the order they are numbered.
#[derive(Debug, Clone, Default)]
pub struct SpriteLoader {
    color_key: Option<[u8; 3]>,
}

impl SpriteLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SpriteConfig) -> Self {
        Self {
            color_key: config.color_key,
        }
    }

    /// Make pixels of exactly this RGB color fully transparent on load
    pub fn with_color_key(mut self, key: [u8; 3]) -> Self {
        self.color_key = Some(key);
        self
    }

    /// Decode a single image file into a sprite
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Sprite> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|e| AssetError::DecodeFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut image = decoded.to_rgba8();
        if let Some(key) = self.color_key {
            apply_color_key(&mut image, key);
        }

        let label = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("sprite")
            .to_string();
        Ok(Sprite::new(image)?.with_label(label))
    }

    /// Load every image in `directory` as one ordered sequence
    pub fn load_event_dir<P: AsRef<Path>>(&self, directory: P) -> Result<Vec<Sprite>> {
        let directory = directory.as_ref();
        let files = self.list_files(directory, |path| Self::is_image_file(path))?;
        self.load_files(directory, files)
    }

    /// Load `<prefix><1-3 digits>.png` files from `directory`
    pub fn load_sequence<P: AsRef<Path>>(&self, directory: P, prefix: &str) -> Result<Vec<Sprite>> {
        let directory = directory.as_ref();
        let files = self.list_files(directory, |path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| matches_sequence_name(name, prefix))
                .unwrap_or(false)
        })?;
        self.load_files(directory, files)
    }

    /// Build a frame element from a folder with one subdirectory per event
    ///
    /// `Sprites/Cat/Walking/*.png` becomes event `Walking` of element `name`.
    pub fn load_element<P: AsRef<Path>>(&self, name: &str, directory: P) -> Result<FrameElement> {
        let directory = directory.as_ref();
        let event_dirs = self.list_files(directory, |path| path.is_dir())?;

        let mut element = FrameElement::new(name);
        for event_dir in event_dirs {
            let Some(event) = event_dir.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };
            match self.load_event_dir(&event_dir) {
                Ok(sprites) => element.register_event(event, sprites)?,
                Err(e) => warn!("Skipping event folder {:?}: {}", event_dir, e),
            }
        }

        if element.events().is_empty() {
            return Err(AssetError::LoadFailed {
                path: format!("No event folders with sprites found in {}", directory.display()),
            }
            .into());
        }

        info!("Loaded element '{}' with events {:?}", name, element.events());
        Ok(element)
    }

    /// Crop the same region out of every sprite
    pub fn crop(sprites: &[Sprite], x: u32, y: u32, width: u32, height: u32) -> Result<Vec<Sprite>> {
        if sprites.is_empty() {
            return Err(AssetError::InvalidSprite {
                reason: "no sprites to crop".to_string(),
            }
            .into());
        }

        sprites
            .iter()
            .map(|sprite| {
                let (w, h) = sprite.dimensions();
                let fits = x.checked_add(width).map_or(false, |right| right <= w)
                    && y.checked_add(height).map_or(false, |bottom| bottom <= h);
                if !fits || width == 0 || height == 0 {
                    return Err(AssetError::InvalidSprite {
                        reason: format!(
                            "crop {}x{}+{}+{} does not fit a {}x{} sprite",
                            width, height, x, y, w, h
                        ),
                    }
                    .into());
                }

                let cropped = imageops::crop_imm(sprite.image(), x, y, width, height).to_image();
                let cropped = Sprite::new(cropped)?;
                Ok(match sprite.label() {
                    Some(label) => cropped.with_label(label),
                    None => cropped,
                })
            })
            .collect()
    }

    fn list_files<F>(&self, directory: &Path, keep: F) -> Result<Vec<PathBuf>>
    where
        F: Fn(&Path) -> bool,
    {
        if !directory.is_dir() {
            return Err(AssetError::LoadFailed {
                path: directory.display().to_string(),
            }
            .into());
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(directory)? {
            let path = entry?.path();
            if !Self::is_hidden_file(&path) && keep(&path) {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }

    fn load_files(&self, directory: &Path, files: Vec<PathBuf>) -> Result<Vec<Sprite>> {
        if files.is_empty() {
            return Err(AssetError::LoadFailed {
                path: format!("No sprite images found in {}", directory.display()),
            }
            .into());
        }

        let sprites = files
            .iter()
            .map(|path| self.load(path))
            .collect::<Result<Vec<_>>>()?;

        debug!("Loaded {} sprites from {:?}", sprites.len(), directory);
        Ok(sprites)
    }

    fn is_image_file(path: &Path) -> bool {
        path.is_file()
            && match path.extension().and_then(|ext| ext.to_str()) {
                Some(ext) => matches!(ext.to_lowercase().as_str(), "png" | "jpg" | "jpeg" | "bmp"),
                None => false,
            }
    }

    fn is_hidden_file(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
    }
}

/// `<prefix><1-3 digits>.png`
fn matches_sequence_name(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(".png"))
        .map(|digits| (1..=3).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

/// Turn every pixel matching `key` exactly into a transparent one
pub fn apply_color_key(image: &mut RgbaImage, key: [u8; 3]) {
    for pixel in image.pixels_mut() {
        if pixel[0] == key[0] && pixel[1] == key[1] && pixel[2] == key[2] {
            pixel[3] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use tempfile::tempdir;

    fn write_png(path: &Path, color: [u8; 4]) {
        let image: RgbaImage = ImageBuffer::from_pixel(4, 3, Rgba(color));
        image.save(path).unwrap();
    }

    #[test]
    fn test_sequence_name_matching() {
        assert!(matches_sequence_name("walk_000.png", "walk_"));
        assert!(matches_sequence_name("walk_7.png", "walk_"));
        assert!(!matches_sequence_name("walk_0000.png", "walk_"));
        assert!(!matches_sequence_name("walk_.png", "walk_"));
        assert!(!matches_sequence_name("walk_01.jpg", "walk_"));
        assert!(!matches_sequence_name("run_001.png", "walk_"));
    }

    #[test]
    fn test_load_sequence_in_name_order() {
        let dir = tempdir().unwrap();
        write_png(&dir.path().join("walk_002.png"), [2, 0, 0, 255]);
        write_png(&dir.path().join("walk_000.png"), [0, 0, 0, 255]);
        write_png(&dir.path().join("walk_001.png"), [1, 0, 0, 255]);
        write_png(&dir.path().join("idle_000.png"), [9, 9, 9, 255]);

        let sprites = SpriteLoader::new().load_sequence(dir.path(), "walk_").unwrap();
        let reds: Vec<u8> = sprites.iter().map(|s| s.pixel(0, 0)[0]).collect();

        assert_eq!(reds, vec![0, 1, 2]);
        assert_eq!(sprites[0].label(), Some("walk_000.png"));
    }

    #[test]
    fn test_color_key_makes_pixels_transparent() {
        let dir = tempdir().unwrap();
        write_png(&dir.path().join("a.png"), [60, 60, 60, 255]);

        let sprite = SpriteLoader::new().with_color_key([60, 60, 60]).load(dir.path().join("a.png")).unwrap();
        assert_eq!(sprite.pixel(1, 1)[3], 0);

        let plain = SpriteLoader::new().load(dir.path().join("a.png")).unwrap();
        assert_eq!(plain.pixel(1, 1)[3], 255);
    }

    #[test]
    fn test_load_element_from_event_folders() {
        let dir = tempdir().unwrap();
        for (event, count) in [("Sitting", 1), ("Walking", 2)] {
            let event_dir = dir.path().join(event);
            std::fs::create_dir(&event_dir).unwrap();
            for i in 0..count {
                write_png(&event_dir.join(format!("{}_{:03}.png", event, i)), [i as u8, 0, 0, 255]);
            }
        }
        std::fs::create_dir(dir.path().join("Empty")).unwrap();

        let cat = SpriteLoader::new().load_element("cat", dir.path()).unwrap();
        assert_eq!(cat.events(), vec!["Sitting", "Walking"]);
        assert_eq!(cat.event_len("Walking").unwrap(), 2);
    }

    #[test]
    fn test_missing_or_empty_directory() {
        let dir = tempdir().unwrap();
        let loader = SpriteLoader::new();

        assert!(loader.load_event_dir(dir.path()).is_err());
        assert!(loader.load_event_dir(dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_crop() {
        let sprite = Sprite::new(ImageBuffer::from_fn(6, 4, |x, y| Rgba([x as u8, y as u8, 0, 255]))).unwrap();

        let cropped = SpriteLoader::crop(&[sprite.clone()], 2, 1, 3, 2).unwrap();
        assert_eq!(cropped[0].dimensions(), (3, 2));
        assert_eq!(cropped[0].pixel(0, 0), [2, 1, 0, 255]);

        assert!(SpriteLoader::crop(&[sprite.clone()], 4, 0, 3, 1).is_err());
        assert!(SpriteLoader::crop(&[], 0, 0, 1, 1).is_err());
    }
}
