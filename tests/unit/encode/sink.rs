use super::*;
use crate::foundation::core::Canvas;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 16,
        height: 9,
        fps: Fps::default(),
        total_frames: 2,
        audio: None,
    }
}

fn frame() -> FrameRGBA {
    FrameRGBA::black(Canvas::from_width(16).unwrap())
}

#[test]
fn frames_become_visible_on_end() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame()).unwrap();
    sink.push_frame(FrameIndex(1), &frame()).unwrap();
    assert!(sink.frames().is_empty());
    sink.end().unwrap();
    assert!(sink.is_finished());
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.config().unwrap().total_frames, 2);
}

#[test]
fn abort_discards_everything() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame()).unwrap();
    sink.abort();
    assert!(sink.frames().is_empty());
    assert!(!sink.is_finished());
}

#[test]
fn out_of_order_and_unstarted_pushes_fail() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_frame(FrameIndex(0), &frame()).is_err());
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(1), &frame()).unwrap();
    assert!(matches!(
        sink.push_frame(FrameIndex(1), &frame()),
        Err(ShotreelError::Encode(_))
    ));
}
