use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;

use crate::assets::fetched::{PreparedAudio, PreparedImage};

pub fn decode_image(bytes: &[u8]) -> anyhow::Result<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

pub fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

/// Decode a RIFF/WAVE payload into interleaved `f32` PCM at its native rate.
pub fn decode_wav(bytes: &[u8]) -> anyhow::Result<PreparedAudio> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes)).context("open wav stream")?;
    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .context("read f32 wav samples")?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .context("read integer wav samples")?
        }
    };

    anyhow::ensure!(spec.channels > 0, "wav stream has zero channels");
    Ok(PreparedAudio {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        interleaved_f32: Arc::new(samples),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
