//! Managed pixel buffer implementation.
//!
//! This module provides [`ManagedPixelBuffer`], the client's copy of the remote
//! framebuffer. It owns its pixel data in a `Vec` and is only ever changed by
//! blending decoded rectangles into it or by a full reallocation when the
//! server resizes the desktop.
//!
//! # Example
//!
//! ```
//! use rfb_pixelbuffer::{Image, ManagedPixelBuffer};
//!
//! let mut buffer = ManagedPixelBuffer::new(100, 100);
//!
//! // Paint a 2x1 rectangle at (10, 10)
//! let image = Image::from_raw(2, 1, vec![0xFF; 8]).unwrap();
//! buffer.blend(&image, 10, 10);
//!
//! assert_eq!(buffer.pixel(11, 10), Some([0xFF; 4]));
//! assert_eq!(buffer.dimensions(), (100, 100));
//! ```

use crate::Image;

/// Every pixel in the store occupies four bytes.
pub const BYTES_PER_PIXEL: usize = 4;

/// A framebuffer that manages its own memory.
///
/// # Memory Layout
///
/// The buffer is stored in row-major order with a stride equal to the width.
/// For a buffer of width W and height H:
///
/// ```text
/// Total size = W * H * 4 bytes
/// Pixel at (x, y) starts at offset: (y * W + x) * 4
/// ```
///
/// The stride is measured in **pixels**, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedPixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ManagedPixelBuffer {
    /// Creates a zero-filled buffer of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; Self::byte_len(width, height)],
        }
    }

    fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * BYTES_PER_PIXEL
    }

    /// Replaces the buffer with a zero-filled one of the new size.
    ///
    /// Unlike a resize, no pixel survives, even when the size is unchanged.
    ///
    /// ```
    /// use rfb_pixelbuffer::ManagedPixelBuffer;
    ///
    /// let mut buffer = ManagedPixelBuffer::new(4, 4);
    /// buffer.reallocate(800, 600);
    /// assert_eq!(buffer.data().len(), 800 * 600 * 4);
    /// ```
    pub fn reallocate(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data = vec![0u8; Self::byte_len(width, height)];
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the stride in pixels. Always equals the width.
    pub fn stride(&self) -> usize {
        self.width as usize
    }

    /// Raw pixel data, row-major with no padding between rows.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The four bytes of the pixel at (`x`, `y`), or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.stride() + x as usize) * BYTES_PER_PIXEL;
        let mut pixel = [0u8; 4];
        pixel.copy_from_slice(&self.data[offset..offset + BYTES_PER_PIXEL]);
        Some(pixel)
    }

    /// Copies `image` opaquely with its top-left corner at (`x`, `y`).
    ///
    /// Parts of the image falling outside the buffer are clipped.
    pub fn blend(&mut self, image: &Image, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }

        let visible_width = image.width().min(self.width - x) as usize;
        let visible_height = image.height().min(self.height - y);
        let row_bytes = visible_width * BYTES_PER_PIXEL;
        if row_bytes == 0 {
            return;
        }

        for row in 0..visible_height {
            let dst_offset = ((y + row) as usize * self.stride() + x as usize) * BYTES_PER_PIXEL;
            self.data[dst_offset..dst_offset + row_bytes]
                .copy_from_slice(&image.row(row)[..row_bytes]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn solid(width: u32, height: u32, pixel: [u8; 4]) -> Image {
        let data = pixel
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * BYTES_PER_PIXEL)
            .collect();
        Image::from_raw(width, height, data).unwrap()
    }

    #[test]
    fn test_create_buffer() {
        let buffer = ManagedPixelBuffer::new(100, 100);
        assert_eq!(buffer.dimensions(), (100, 100));
        assert_eq!(buffer.stride(), 100);
        assert_eq!(buffer.data().len(), 100 * 100 * 4);
    }

    #[test]
    fn test_reallocate_discards_contents() {
        let mut buffer = ManagedPixelBuffer::new(10, 10);
        buffer.blend(&solid(10, 10, [9, 9, 9, 9]), 0, 0);

        buffer.reallocate(10, 10);
        assert!(buffer.data().iter().all(|&b| b == 0));

        buffer.reallocate(20, 5);
        assert_eq!(buffer.dimensions(), (20, 5));
        assert_eq!(buffer.stride(), 20);
        assert_eq!(buffer.data().len(), 20 * 5 * 4);
    }

    #[test]
    fn test_blend_places_rows() {
        let mut buffer = ManagedPixelBuffer::new(4, 4);
        let image = Image::from_raw(2, 2, (1..=16).collect()).unwrap();
        buffer.blend(&image, 1, 2);

        assert_eq!(buffer.pixel(1, 2), Some([1, 2, 3, 4]));
        assert_eq!(buffer.pixel(2, 2), Some([5, 6, 7, 8]));
        assert_eq!(buffer.pixel(1, 3), Some([9, 10, 11, 12]));
        assert_eq!(buffer.pixel(2, 3), Some([13, 14, 15, 16]));
        assert_eq!(buffer.pixel(0, 2), Some([0, 0, 0, 0]));
        assert_eq!(buffer.pixel(3, 3), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_blend_is_opaque() {
        let mut buffer = ManagedPixelBuffer::new(2, 2);
        buffer.blend(&solid(2, 2, [0xFF; 4]), 0, 0);
        buffer.blend(&solid(1, 1, [0, 0, 0, 0]), 1, 1);
        assert_eq!(buffer.pixel(1, 1), Some([0, 0, 0, 0]));
        assert_eq!(buffer.pixel(0, 0), Some([0xFF; 4]));
    }

    #[test]
    fn test_blend_clips_to_buffer() {
        let mut buffer = ManagedPixelBuffer::new(4, 4);
        buffer.blend(&solid(3, 3, [7, 7, 7, 7]), 2, 2);

        assert_eq!(buffer.pixel(3, 3), Some([7, 7, 7, 7]));
        assert_eq!(buffer.pixel(2, 2), Some([7, 7, 7, 7]));
        assert_eq!(buffer.pixel(1, 1), Some([0, 0, 0, 0]));

        // Entirely outside.
        buffer.blend(&solid(1, 1, [1, 1, 1, 1]), 4, 0);
        buffer.blend(&solid(1, 1, [1, 1, 1, 1]), 0, 9);
        assert!(!buffer.data().chunks(4).any(|p| p == [1, 1, 1, 1]));
    }

    #[test]
    fn test_pixel_out_of_bounds() {
        let buffer = ManagedPixelBuffer::new(2, 2);
        assert_eq!(buffer.pixel(2, 0), None);
        assert_eq!(buffer.pixel(0, 2), None);
    }
}
