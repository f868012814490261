use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::*;

fn canvas() -> Canvas {
    Canvas::from_width(16).unwrap()
}

#[test]
fn new_surfaces_start_black() {
    let off = OffscreenCanvas::new(canvas());
    assert!(!off.is_live());
    assert_eq!(off.frame().height, 9);
    assert!(off.frame().is_black());
}

#[test]
fn live_canvas_hands_frames_to_presenter() {
    let seen = Arc::new(AtomicU64::new(0));
    let counter = seen.clone();
    let mut live = LiveCanvas::new(
        canvas(),
        Box::new(move |frame: &FrameRGBA| {
            assert_eq!(frame.width, 16);
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    );
    assert!(live.is_live());
    live.present().unwrap();
    live.present().unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 2);
    assert_eq!(live.presented(), 2);
}

#[test]
fn presenter_errors_propagate() {
    let mut live = LiveCanvas::new(
        canvas(),
        Box::new(|_: &FrameRGBA| Err(ShotreelError::validation("display gone"))),
    );
    assert!(live.present().is_err());
    assert_eq!(live.presented(), 0);
}

#[test]
fn pixel_access_and_unpremultiply() {
    let mut off = OffscreenCanvas::new(canvas());
    off.frame_mut().data[..4].copy_from_slice(&[64, 0, 0, 128]);
    let frame = off.into_frame();
    assert_eq!(frame.pixel(0, 0), Some([64, 0, 0, 128]));
    assert_eq!(frame.pixel(16, 0), None);
    let straight = frame.to_straight_rgba();
    assert_eq!(&straight[..4], &[128, 0, 0, 128]);
    assert_eq!(&straight[4..8], &[0, 0, 0, 255]);
}
