//! RGBA8 from PNG/JPEG, flipped so row 0 is the bottom of the image.

use std::path::Path;

use crate::error::{AssetError, Result};

/// Decoded pixels ready for upload, always four bytes per texel.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TextureData {
    /// Load a PNG or JPEG file, forcing four channels and flipping vertically
    /// to match OBJ texture coordinates (v = 0 at the bottom).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AssetError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let img = image::open(path).map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = img.flipv().to_rgba8();
        let (width, height) = rgba.dimensions();
        log::info!("Loaded texture {:?} ({}x{})", path, width, height);

        Ok(Self {
            data: rgba.into_raw(),
            width,
            height,
        })
    }

    /// Single opaque white texel; stands in for "no texture" so every draw can
    /// sample something.
    pub fn white() -> Self {
        Self {
            data: vec![255; 4],
            width: 1,
            height: 1,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == self.width as usize * self.height as usize * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_is_one_opaque_texel() {
        let white = TextureData::white();
        assert!(white.is_valid());
        assert_eq!(white.data, vec![255; 4]);
    }

    #[test]
    fn truncated_data_is_invalid() {
        let tex = TextureData {
            data: vec![0; 15],
            width: 2,
            height: 2,
        };
        assert!(!tex.is_valid());
    }

    #[test]
    fn load_flips_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two_rows.png");
        // Top row red, bottom row blue.
        let img = image::RgbaImage::from_fn(1, 2, |_, y| {
            if y == 0 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 255])
            }
        });
        img.save(&path).unwrap();

        let tex = TextureData::load(&path).unwrap();
        assert_eq!((tex.width, tex.height), (1, 2));
        assert_eq!(&tex.data[0..4], &[0, 0, 255, 255]);
        assert_eq!(&tex.data[4..8], &[255, 0, 0, 255]);
    }

    #[test]
    fn missing_texture_is_file_not_found() {
        let err = TextureData::load("/no/such/texture.png").unwrap_err();
        assert!(matches!(err, AssetError::FileNotFound { .. }));
    }
}
