use super::*;

#[test]
fn canvas_height_is_exact_16_9() {
    assert_eq!(canvas_height(100.0), 56.25);
    assert_eq!(canvas_height(512.0), 288.0);
    assert_eq!(canvas_height(1920.0), 1080.0);
}

#[test]
fn canvas_from_width_rounds_height() {
    assert_eq!(
        Canvas::from_width(512).unwrap(),
        Canvas {
            width: 512,
            height: 288
        }
    );
    assert_eq!(Canvas::from_width(100).unwrap().height, 56);
    assert!(Canvas::from_width(0).is_err());
}

#[test]
fn fps_frame_math() {
    let fps = Fps::default();
    assert_eq!(fps.frame_ms(), 40.0);
    assert_eq!(fps.frame_to_ms(FrameIndex(75)), 3000.0);
    assert_eq!(fps.frames_covering_ms(5000), 125);
    assert_eq!(fps.frames_covering_ms(5001), 126);
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}
