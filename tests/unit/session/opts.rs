use super::*;

#[test]
fn defaults_match_documented_values() {
    let opts = CreatorOpts::default();
    assert_eq!(opts.shot_default_duration_ms, 3000);
    assert_eq!(opts.fps, Fps { num: 25, den: 1 });
    assert_eq!(opts.fade_ms, 1000);
    assert_eq!(opts.zoom_intensity, 0.03);
    assert_eq!(
        opts.canvas().unwrap(),
        Canvas {
            width: 512,
            height: 288
        }
    );
    assert_eq!(opts.volume.music, 0.16);
}

#[test]
fn partial_json_keeps_defaults() {
    let opts = CreatorOpts::from_json_str(r#"{"env": "interactive", "fade_ms": 500}"#).unwrap();
    assert_eq!(opts.env, Env::Interactive);
    assert_eq!(opts.fade_ms, 500);
    assert_eq!(opts.shot_default_duration_ms, 3000);
}

#[test]
fn invalid_values_are_rejected() {
    assert!(CreatorOpts::from_json_str(r#"{"fps": {"num": 0, "den": 1}}"#).is_err());
    assert!(CreatorOpts::from_json_str(r#"{"width": 0}"#).is_err());
    assert!(CreatorOpts::from_json_str(r#"{"retry": {"attempts": 0, "initial_backoff_ms": 1}}"#).is_err());
    assert!(CreatorOpts::from_json_str("not json").is_err());
}
