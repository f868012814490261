#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use shotreel::{CreatorOpts, MemorySource, Scene, SceneDoc, Shot};

pub const RED: [u8; 4] = [200, 0, 0, 255];
pub const BLUE: [u8; 4] = [0, 0, 200, 255];

/// Solid-colour PNG.
pub fn png(rgba: [u8; 4], width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("encode png");
    buf
}

/// Mono 8 kHz WAV holding a constant level for `ms` milliseconds.
pub fn wav(ms: u32, level: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let sample = (level.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
    let mut buf = Cursor::new(Vec::new());
    {
        let mut w = hound::WavWriter::new(&mut buf, spec).expect("wav writer");
        for _ in 0..ms * 8 {
            w.write_sample(sample).expect("write sample");
        }
        w.finalize().expect("finalize wav");
    }
    buf.into_inner()
}

pub fn media() -> Arc<MemorySource> {
    Arc::new(
        MemorySource::new()
            .with("a.png", png(RED, 16, 9))
            .with("b.png", png(BLUE, 16, 9))
            .with("line.wav", wav(4000, 0.5))
            .with("theme.wav", wav(1000, 0.25)),
    )
}

pub fn shot(image: &str, duration: Option<u64>) -> Shot {
    Shot {
        image_url: Some(image.to_owned()),
        duration,
        ..Shot::default()
    }
}

pub fn scene(shots: Vec<Shot>) -> Scene {
    Scene {
        id: None,
        doc: SceneDoc::default(),
        shots,
    }
}

/// Small export options: 32x18 at 25 fps.
pub fn opts() -> CreatorOpts {
    CreatorOpts {
        width: 32,
        ..CreatorOpts::default()
    }
}

pub fn assert_close(px: [u8; 4], want: [u8; 4], tol: u8) {
    for k in 0..4 {
        assert!(
            px[k].abs_diff(want[k]) <= tol,
            "pixel {px:?} not within {tol} of {want:?}"
        );
    }
}
