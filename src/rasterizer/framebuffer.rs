//! Framebuffer for software rendering
//!
//! A fixed-capacity grid of 32-bit cells. The same layout holds either packed
//! `0xAARRGGBB` colour or quantized depth (smaller = nearer), never both in one buffer.
//! The backing store is allocated once; `resize` only changes the logical size.

use super::{MAX_FB_HEIGHT, MAX_FB_WIDTH};

/// Depth clear value: "infinitely far"
pub const CLEAR_DEPTH: u32 = u32::MAX;

pub struct Framebuffer {
    data: Box<[u32]>,
    capacity_width: usize,
    capacity_height: usize,
    width: usize,
    height: usize,
}

impl Framebuffer {
    /// Buffer whose capacity equals its logical size
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_capacity(width, height)
    }

    /// Allocate `capacity_width x capacity_height` cells; the logical size starts at full capacity.
    ///
    /// # Panics
    /// If the capacity exceeds `MAX_FB_WIDTH x MAX_FB_HEIGHT`.
    pub fn with_capacity(capacity_width: usize, capacity_height: usize) -> Self {
        assert!(
            capacity_width <= MAX_FB_WIDTH && capacity_height <= MAX_FB_HEIGHT,
            "framebuffer capacity {}x{} exceeds maximum {}x{}",
            capacity_width, capacity_height, MAX_FB_WIDTH, MAX_FB_HEIGHT
        );

        Self {
            data: vec![0; capacity_width * capacity_height].into_boxed_slice(),
            capacity_width,
            capacity_height,
            width: capacity_width,
            height: capacity_height,
        }
    }

    /// Change the logical size without reallocating.
    ///
    /// # Panics
    /// If the new size does not fit the backing capacity.
    pub fn resize(&mut self, width: usize, height: usize) {
        assert!(
            width <= self.capacity_width && height <= self.capacity_height,
            "framebuffer size {}x{} exceeds capacity {}x{}",
            width, height, self.capacity_width, self.capacity_height
        );
        self.width = width;
        self.height = height;
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn capacity(&self) -> (usize, usize) {
        (self.capacity_width, self.capacity_height)
    }

    /// Overwrite every cell of the logical region; cells past it are left alone
    pub fn fill(&mut self, value: u32) {
        let len = self.width * self.height;
        self.data[..len].fill(value);
    }

    /// Row-major offset of `(x, y)`. Callers validate bounds.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "pixel ({}, {}) outside {}x{}", x, y, self.width, self.height
        );
        y * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.data[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u32) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Cells `[x0, x1)` of row `y`
    #[inline]
    pub fn span_mut(&mut self, y: usize, x0: usize, x1: usize) -> &mut [u32] {
        let start = y * self.width;
        &mut self.data[start + x0..start + x1]
    }

    /// The logical region, row-major
    pub fn as_slice(&self) -> &[u32] {
        &self.data[..self.width * self.height]
    }

    /// Whole backing store, including cells past the logical region
    pub fn backing(&self) -> &[u32] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_covers_logical_region_only() {
        let mut fb = Framebuffer::with_capacity(16, 16);
        fb.fill(7);
        fb.resize(10, 5);
        fb.fill(0xDEAD_BEEF);

        for y in 0..5 {
            for x in 0..10 {
                assert_eq!(fb.get(x, y), 0xDEAD_BEEF);
            }
        }
        assert!(fb.backing()[50..].iter().all(|&c| c == 7));
        assert_eq!(fb.as_slice().len(), 50);
    }

    #[test]
    fn test_row_major_indexing() {
        let mut fb = Framebuffer::new(4, 3);
        fb.fill(0);
        fb.set(3, 1, 42);
        assert_eq!(fb.index(3, 1), 7);
        assert_eq!(fb.as_slice()[7], 42);
        assert_eq!(fb.span_mut(1, 2, 4).to_vec(), vec![0, 42]);
    }

    #[test]
    #[should_panic(expected = "exceeds capacity")]
    fn test_resize_past_capacity_panics() {
        let mut fb = Framebuffer::new(8, 8);
        fb.resize(9, 8);
    }

    #[test]
    #[should_panic(expected = "exceeds maximum")]
    fn test_capacity_past_maximum_panics() {
        let _ = Framebuffer::with_capacity(MAX_FB_WIDTH + 1, 1);
    }
}
