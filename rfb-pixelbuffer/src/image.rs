//! Decoded rectangle pixels.

use crate::managed::BYTES_PER_PIXEL;
use anyhow::{anyhow, Result};

/// A `width` x `height` block of 4-byte pixels, row-major, tightly packed.
///
/// Decoders produce an `Image` per rectangle and hand it to
/// [`ManagedPixelBuffer::blend`](crate::ManagedPixelBuffer::blend).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Image {
    /// Wrap raw pixel bytes.
    ///
    /// # Errors
    ///
    /// Fails if `data` is not exactly `width * height * 4` bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use rfb_pixelbuffer::Image;
    ///
    /// let image = Image::from_raw(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    /// assert_eq!(image.pixel(1, 0), Some([5, 6, 7, 8]));
    /// assert!(Image::from_raw(2, 2, vec![0; 4]).is_err());
    /// ```
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(anyhow!(
                "Image data size mismatch: got {} bytes, expected {} for {}x{}",
                data.len(),
                expected,
                width,
                height
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bytes of row `y`.
    pub fn row(&self, y: u32) -> &[u8] {
        let row_bytes = self.width as usize * BYTES_PER_PIXEL;
        let start = y as usize * row_bytes;
        &self.data[start..start + row_bytes]
    }

    /// The pixel at (`x`, `y`), or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let mut pixel = [0u8; 4];
        pixel.copy_from_slice(&self.data[offset..offset + BYTES_PER_PIXEL]);
        Some(pixel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows() {
        let data: Vec<u8> = (0..16).collect();
        let image = Image::from_raw(2, 2, data).unwrap();
        assert_eq!(image.row(0), &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(image.row(1), &[8, 9, 10, 11, 12, 13, 14, 15]);
        assert_eq!(image.pixel(0, 1), Some([8, 9, 10, 11]));
        assert_eq!(image.pixel(2, 0), None);
    }

    #[test]
    fn test_empty_image() {
        let image = Image::from_raw(0, 5, Vec::new()).unwrap();
        assert_eq!(image.width(), 0);
        assert_eq!(image.pixel(0, 0), None);
    }
}
