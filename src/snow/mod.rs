use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageFormat, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fraction of pixels that receive noise on the live study endpoint.
pub const LIVE_MASK_PROBABILITY: f64 = 0.15;
/// Slightly denser mask used when pre-rendering a noisy image offline.
pub const OFFLINE_MASK_PROBABILITY: f64 = 0.18;

#[derive(Debug, Clone, Copy)]
pub struct SnowParams {
    pub brightness: f32,
    pub noise_intensity: f32,
    pub mask_probability: f64,
}

impl SnowParams {
    pub fn live(brightness: f32, noise_intensity: f32) -> Self {
        Self {
            brightness,
            noise_intensity,
            mask_probability: LIVE_MASK_PROBABILITY,
        }
    }

    pub fn offline(noise_intensity: f32) -> Self {
        Self {
            brightness: 1.0,
            noise_intensity,
            mask_probability: OFFLINE_MASK_PROBABILITY,
        }
    }
}

/// Simulates visual snow over a source image: scales every channel by the
/// brightness factor, then adds a uniform random RGB overlay at the pixel
/// positions selected by a Bernoulli mask. One-shot per-pixel transform,
/// no state carried between applications beyond the RNG.
pub struct SnowSynthesizer {
    rng: StdRng,
}

impl SnowSynthesizer {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn apply(&mut self, source: &RgbImage, params: &SnowParams) -> RgbImage {
        let mut output = RgbImage::new(source.width(), source.height());

        for (dst, src) in output.pixels_mut().zip(source.pixels()) {
            let mut channels = [0.0f32; 3];
            for (channel, value) in channels.iter_mut().zip(src.0) {
                *channel = (f32::from(value) * params.brightness).clamp(0.0, 255.0);
            }

            if self.rng.gen::<f64>() < params.mask_probability {
                for channel in channels.iter_mut() {
                    let noise = self.rng.gen_range(0..256) as f32;
                    *channel = (*channel + noise * params.noise_intensity).clamp(0.0, 255.0);
                }
            }

            dst.0 = [channels[0] as u8, channels[1] as u8, channels[2] as u8];
        }

        output
    }
}

impl Default for SnowSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_source(path: &Path) -> Result<RgbImage> {
    let img = image::open(path)
        .with_context(|| format!("failed to load study image {}", path.display()))?;
    Ok(img.to_rgb8())
}

pub fn encode_jpeg(img: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Jpeg)
        .context("failed to encode image as JPEG")?;
    Ok(buffer.into_inner())
}
