use std::io::Cursor;

use super::*;

#[test]
fn decode_image_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let prepared = decode_image(&buf).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_rejects_garbage() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn decode_wav_int16_mono_duration() {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut buf = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut buf, spec).unwrap();
        for _ in 0..4000 {
            writer.write_sample(16384i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    let bytes = buf.into_inner();
    assert!(is_wav(&bytes));

    let audio = decode_wav(&bytes).unwrap();
    assert_eq!(audio.sample_rate, 8000);
    assert_eq!(audio.channels, 1);
    assert_eq!(audio.frames(), 4000);
    assert_eq!(audio.duration_ms(), 500);
    assert!((audio.interleaved_f32[0] - 0.5).abs() < 1e-4);
}

#[test]
fn is_wav_checks_riff_header() {
    assert!(!is_wav(b"RIFF"));
    assert!(!is_wav(b"RIFF\0\0\0\0AVI LIST"));
}
