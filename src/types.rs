// Frame types shared by the camera, the row delay and the window.

use crate::error::Error;
use image::{Rgb, RgbImage};

/// Bytes per pixel in the sensor layout: B, G, R, padding.
pub const BYTES_PER_PIXEL: usize = 4;

/// What the window takes.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }
}

/// One image in the sensor's byte layout, rows packed top to bottom.
#[derive(Clone, Debug, PartialEq)]
pub struct Bgr32Frame {
    pub width: usize,
    pub height: usize,
    pub bytes: Vec<u8>, // length = width * height * BYTES_PER_PIXEL
}

impl Bgr32Frame {
    /// All-black frame; shown when there is no sensor.
    pub fn blank(width: usize, height: usize) -> Self {
        Self { width, height, bytes: vec![0u8; width * height * BYTES_PER_PIXEL] }
    }

    /// Repack tightly packed R,G,B bytes into B,G,R,0.
    pub fn from_rgb(width: usize, height: usize, rgb: &[u8]) -> Result<Self, Error> {
        let expected = width * height * 3;
        if rgb.len() != expected {
            return Err(Error::FrameSize { expected, actual: rgb.len() });
        }
        let mut bytes = Vec::with_capacity(width * height * BYTES_PER_PIXEL);
        for px in rgb.chunks_exact(3) {
            bytes.extend_from_slice(&[px[2], px[1], px[0], 0]);
        }
        Ok(Self { width, height, bytes })
    }

    /// Copy into the window buffer. Little-endian B,G,R,0 reads as 0x00RRGGBB.
    pub fn write_to(&self, fb: &mut FrameBuffer) -> Result<(), Error> {
        let expected = fb.width * fb.height * BYTES_PER_PIXEL;
        if fb.width != self.width
            || fb.height != self.height
            || self.bytes.len() != expected
            || fb.pixels.len() != fb.width * fb.height
        {
            return Err(Error::FrameSize { expected, actual: self.bytes.len() });
        }
        for (dst, src) in fb.pixels.iter_mut().zip(self.bytes.chunks_exact(BYTES_PER_PIXEL)) {
            *dst = u32::from_le_bytes([src[0], src[1], src[2], 0]);
        }
        Ok(())
    }

    /// Back to an RGB image, e.g. for saving a snapshot.
    pub fn to_rgb_image(&self) -> RgbImage {
        let mut img = RgbImage::new(self.width as u32, self.height as u32);
        for (dst, src) in img.pixels_mut().zip(self.bytes.chunks_exact(BYTES_PER_PIXEL)) {
            *dst = Rgb([src[2], src[1], src[0]]);
        }
        img
    }
}
