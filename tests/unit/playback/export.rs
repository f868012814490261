use super::*;
use crate::assets::fetched::{FetchedFile, PreparedImage};
use crate::encode::sink::InMemorySink;
use crate::foundation::core::FrameIndex;
use crate::timeline::shot::FetchedShot;

const RED: [u8; 4] = [200, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 200, 255];

fn timeline() -> Timeline {
    let mut a = FetchedShot::still(
        0,
        0,
        FetchedFile::image("a", PreparedImage::solid(8, 8, RED)),
        200,
    );
    a.fade_in = 80;
    a.fade_out = 80;
    a.zoom_end = 1.1;
    let mut b = FetchedShot::still(
        0,
        1,
        FetchedFile::image("b", PreparedImage::solid(8, 8, BLUE)),
        120,
    );
    b.fade_in = 80;
    b.previous_image = Some(a.image.clone());
    Timeline::from_shots(vec![a, b])
}

fn driver(tl: &Timeline) -> ExportDriver<'_> {
    ExportDriver::new(tl, Canvas::from_width(32).unwrap(), Fps::default())
}

#[test]
fn frame_count_covers_the_timeline() {
    let tl = timeline();
    // 320 ms at 40 ms per frame.
    assert_eq!(driver(&tl).total_frames(), 8);
}

#[test]
fn run_pushes_every_frame_in_order() {
    let tl = timeline();
    let mut sink = InMemorySink::new();
    let stats = driver(&tl)
        .run(&mut sink, None, &CancelToken::new())
        .unwrap();
    assert_eq!(stats.frames, 8);
    assert_eq!(stats.duration_ms, 320);
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, (0..8).collect::<Vec<_>>());
    assert_eq!(sink.config().unwrap().height, 18);
    // Frame 0 fades in from black.
    assert!(sink.frames()[0].1.is_black());
    // Frame 3 (120 ms) is steady on shot A.
    assert!(sink.frames()[3].1.is_uniform(RED));
}

#[test]
fn two_runs_are_identical() {
    let tl = timeline();
    let d = driver(&tl);
    let mut first = InMemorySink::new();
    let mut second = InMemorySink::new();
    d.run(&mut first, None, &CancelToken::new()).unwrap();
    d.run(&mut second, None, &CancelToken::new()).unwrap();
    assert_eq!(first.frames(), second.frames());
}

#[test]
fn cancelled_export_leaves_nothing() {
    let tl = timeline();
    let mut sink = InMemorySink::new();
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = driver(&tl).run(&mut sink, None, &cancel).unwrap_err();
    assert!(matches!(err, ShotreelError::Cancelled));
    assert!(sink.frames().is_empty());
    assert!(!sink.is_finished());
}

#[test]
fn empty_timeline_is_rejected() {
    let tl = Timeline::default();
    let mut sink = InMemorySink::new();
    assert!(matches!(
        driver(&tl).run(&mut sink, None, &CancelToken::new()),
        Err(ShotreelError::EmptyTimeline)
    ));
}

#[test]
fn single_frames_by_index_and_time() {
    let tl = timeline();
    let d = driver(&tl);
    let frame = d
        .frame_at(FrameIndex(3), &mut CanvasOptions::default())
        .unwrap();
    assert!(frame.is_uniform(RED));
    let frame = d
        .frame_at_time(300.0, &mut CanvasOptions::default())
        .unwrap();
    assert!(frame.is_uniform(BLUE));
    assert!(
        d.frame_at_time(320.0, &mut CanvasOptions::default())
            .is_err()
    );
}
