//! Stereo block buffer.
//!
//! [`StereoBuffer`] is the interchange type between pipeline components:
//! a pair of equal-length `Vec<f32>` channels, allocated at prepare time
//! and reused for every block.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// A stereo audio buffer (separate left/right channel storage).
#[derive(Debug, Clone)]
pub struct StereoBuffer {
    /// Left channel samples.
    pub left: Vec<f32>,
    /// Right channel samples.
    pub right: Vec<f32>,
}

impl StereoBuffer {
    /// Creates a new zeroed stereo buffer with the given block size.
    pub fn new(block_size: usize) -> Self {
        Self {
            left: vec![0.0; block_size],
            right: vec![0.0; block_size],
        }
    }

    /// Fills both channels with zeros.
    pub fn clear(&mut self) {
        self.left.fill(0.0);
        self.right.fill(0.0);
    }

    /// Resizes both channels, zeroing any new samples.
    pub fn resize(&mut self, block_size: usize) {
        self.left.resize(block_size, 0.0);
        self.right.resize(block_size, 0.0);
    }

    /// Number of samples per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// True if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Copies the first `num_samples` of each channel from another buffer.
    pub fn copy_from(&mut self, other: &StereoBuffer, num_samples: usize) {
        self.left[..num_samples].copy_from_slice(&other.left[..num_samples]);
        self.right[..num_samples].copy_from_slice(&other.right[..num_samples]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_zeroed() {
        let buf = StereoBuffer::new(64);
        assert_eq!(buf.len(), 64);
        assert!(buf.left.iter().all(|&s| s == 0.0));
        assert!(buf.right.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn copy_from_partial_block() {
        let mut src = StereoBuffer::new(8);
        src.left.fill(1.0);
        src.right.fill(-1.0);

        let mut dst = StereoBuffer::new(8);
        dst.copy_from(&src, 4);

        assert_eq!(dst.left[3], 1.0);
        assert_eq!(dst.left[4], 0.0);
        assert_eq!(dst.right[3], -1.0);
    }
}
