// Texture content: decoded RGBA8 images

use crate::engine::assets::{Asset, AssetValue, ContentBackend, Dispose, Importer, TypeTag};
use anyhow::Result;
use glam::UVec2;
use image::GenericImageView;
use log::debug;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// A decoded texture, ready for upload
pub struct Texture {
    label: String,
    size: UVec2,

    /// Tightly packed RGBA8 rows
    pixels: Vec<u8>,

    released: AtomicBool,
}

impl Texture {
    /// Create a texture from encoded image bytes
    pub fn from_bytes(bytes: &[u8], label: &str) -> Result<Self> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_image(&img, label))
    }

    /// Create a texture from an image
    pub fn from_image(img: &image::DynamicImage, label: &str) -> Self {
        let (width, height) = img.dimensions();

        Self {
            label: label.to_string(),
            size: UVec2::new(width, height),
            pixels: img.to_rgba8().into_raw(),
            released: AtomicBool::new(false),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.x
    }

    pub fn height(&self) -> u32 {
        self.size.y
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Check if the texture was disposed by its group
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl Asset for Texture {
    const TAG: TypeTag = TypeTag::new("texture");
}

impl Dispose for Texture {
    fn dispose(&self) {
        if !self.released.swap(true, Ordering::AcqRel) {
            debug!("Released texture '{}' ({}x{})", self.label, self.size.x, self.size.y);
        }
    }
}

/// Imports png, jpeg and bmp files as [`Texture`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureImporter;

impl TextureImporter {
    pub const EXTENSIONS: &'static [&'static str] = &["png", "jpg", "jpeg", "bmp"];
}

impl Importer for TextureImporter {
    fn tag(&self) -> TypeTag {
        Texture::TAG
    }

    fn import(&self, backend: &dyn ContentBackend, path: &Path) -> Result<AssetValue> {
        let bytes = backend.read(path)?;
        let texture = Texture::from_bytes(&bytes, &path.display().to_string())?;
        Ok(AssetValue::disposable(texture))
    }
}
