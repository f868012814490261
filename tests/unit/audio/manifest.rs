use super::*;
use crate::assets::fetched::{PreparedAudio, PreparedImage};
use crate::timeline::acoustic::AcousticEnv;
use crate::timeline::shot::VoiceLine;

fn tone(name: &str, ms: usize) -> Arc<FetchedFile> {
    FetchedFile::audio(
        name,
        PreparedAudio {
            sample_rate: 1000,
            channels: 1,
            interleaved_f32: Arc::new(vec![0.5; ms]),
        },
    )
}

fn shot(idx: usize, duration: u64) -> FetchedShot {
    FetchedShot::still(
        0,
        idx,
        FetchedFile::image("img", PreparedImage::solid(2, 2, [0, 0, 0, 255])),
        duration,
    )
}

fn of_kind(m: &AudioManifest, kind: TrackKind) -> Vec<&AudioSegment> {
    m.segments.iter().filter(|s| s.kind == kind).collect()
}

#[test]
fn total_samples_cover_the_timeline() {
    let tl = Timeline::from_shots(vec![shot(0, 3000), shot(1, 2000)]);
    let m = build_audio_manifest(&tl, &Volume::default());
    assert_eq!(m.total_samples, 5000 * 48);
    assert_eq!(m.channels, 2);
    assert!(m.segments.is_empty());
}

#[test]
fn shared_music_forms_one_looped_run() {
    let music = tone("theme", 700);
    let mut a = shot(0, 3000);
    a.music = Some(music.clone());
    a.fade_in = 1000;
    a.fade_out = 500;
    let mut b = shot(1, 2000);
    b.music = Some(music);
    b.fade_in = 500;
    b.fade_out = 1000;
    let tl = Timeline::from_shots(vec![a, b]);

    let m = build_audio_manifest(&tl, &Volume::default());
    let music = of_kind(&m, TrackKind::Music);
    assert_eq!(music.len(), 1);
    let seg = music[0];
    assert_eq!(seg.timeline_start_sample, 0);
    assert_eq!(seg.timeline_end_sample, 5000 * 48);
    assert!(seg.looped);
    assert_eq!(seg.fade_in_sec, 1.0);
    assert_eq!(seg.fade_out_sec, 1.0);
    assert_eq!(seg.volume, 0.16);
}

#[test]
fn music_changes_cross_fade_around_the_boundary() {
    let mut a = shot(0, 3000);
    a.music = Some(tone("one", 700));
    a.fade_out = 500;
    let mut b = shot(1, 2000);
    b.music = Some(tone("two", 700));
    b.fade_in = 500;
    let tl = Timeline::from_shots(vec![a, b]);

    let m = build_audio_manifest(&tl, &Volume::default());
    let music = of_kind(&m, TrackKind::Music);
    assert_eq!(music.len(), 2);
    assert_eq!(music[0].timeline_end_sample, 3250 * 48);
    assert_eq!(music[0].fade_out_sec, 0.5);
    assert_eq!(music[1].timeline_start_sample, 2750 * 48);
    assert_eq!(music[1].fade_in_sec, 0.5);
    // Looped source offset follows the run start.
    assert!((music[1].source_start_sec - (2750 % 700) as f64 / 1000.0).abs() < 1e-9);
}

#[test]
fn black_cut_switches_music_hard() {
    let mut a = shot(0, 3000);
    a.music = Some(tone("one", 700));
    let mut b = shot(1, 2000);
    b.music = Some(tone("two", 700));
    b.has_black_fading = true;
    let tl = Timeline::from_shots(vec![a, b]);

    let m = build_audio_manifest(&tl, &Volume::default());
    let music = of_kind(&m, TrackKind::Music);
    assert_eq!(music[0].timeline_end_sample, 3000 * 48);
    assert_eq!(music[1].timeline_start_sample, 3000 * 48);
    assert_eq!(music[1].fade_in_sec, 0.0);
}

#[test]
fn voices_are_placed_after_leading_silence_with_echo() {
    let mut a = shot(0, 3000);
    let mut b = shot(1, 4000);
    b.voice = vec![VoiceLine::new(tone("v0", 1000)), VoiceLine::new(tone("v1", 500))];
    b.acoustic_env = Some(AcousticEnv::Hall);
    a.sound = Some(tone("rain", 300));
    let tl = Timeline::from_shots(vec![a, b]);

    let m = build_audio_manifest(&tl, &Volume::default());
    let voice = of_kind(&m, TrackKind::Voice);
    assert_eq!(voice.len(), 2);
    assert_eq!(voice[0].timeline_start_sample, (3000 + 900) * 48);
    assert_eq!(voice[0].timeline_end_sample, (3000 + 1900) * 48);
    assert_eq!(voice[1].timeline_start_sample, (3000 + 2100) * 48);
    assert!((voice[0].volume - 0.84).abs() < 1e-6);
    assert!(!voice[0].looped);

    let echo = of_kind(&m, TrackKind::Echo);
    assert_eq!(echo.len(), 2);
    assert_eq!(echo[0].timeline_start_sample, (3000 + 900 + 110) * 48);

    let ambient = of_kind(&m, TrackKind::Ambient);
    assert_eq!(ambient.len(), 1);
    assert_eq!(ambient[0].timeline_end_sample, 3000 * 48);
}

#[test]
fn telephone_voice_keeps_a_short_echo() {
    let mut a = shot(0, 3000);
    a.voice = vec![VoiceLine::new(tone("v0", 1000))];
    a.acoustic_env = Some(AcousticEnv::Telephone);
    let tl = Timeline::from_shots(vec![a]);

    let m = build_audio_manifest(&tl, &Volume::default());
    let voice = of_kind(&m, TrackKind::Voice);
    let echo = of_kind(&m, TrackKind::Echo);
    assert_eq!((voice.len(), echo.len()), (1, 1));
    assert!((voice[0].volume - 0.7).abs() < 1e-6);
    assert!((echo[0].volume - 0.3).abs() < 1e-6);
    assert_eq!(echo[0].timeline_start_sample, (900 + 8) * 48);
}

#[test]
fn sample_conversion_rounds() {
    assert_eq!(ms_to_sample(0, 48_000), 0);
    assert_eq!(ms_to_sample(1, 48_000), 48);
    assert_eq!(ms_to_sample(1, 44_100), 44);
}
