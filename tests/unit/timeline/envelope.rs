use super::*;

#[test]
fn directions_map_to_envelopes() {
    assert_eq!(
        zoom_envelope(ZoomDirection::In, 0.1),
        ZoomEnvelope {
            start: 1.0,
            end: 1.1
        }
    );
    assert_eq!(
        zoom_envelope(ZoomDirection::Out, 0.1),
        ZoomEnvelope {
            start: 1.1,
            end: 1.0
        }
    );
    assert_eq!(zoom_envelope(ZoomDirection::None, 0.1), ZoomEnvelope::default());
}

#[test]
fn scale_interpolates_linearly_and_clamps() {
    let env = ZoomEnvelope {
        start: 1.0,
        end: 1.1,
    };
    assert_eq!(env.scale_at(0.0, 3000), 1.0);
    assert!((env.scale_at(1500.0, 3000) - 1.05).abs() < 1e-12);
    assert!((env.scale_at(5000.0, 3000) - 1.1).abs() < 1e-12);
    assert_eq!(env.scale_at(10.0, 0), 1.1);
}

#[test]
fn invalid_zoom_is_clamped_with_warning() {
    let (env, warning) = check_zoom(
        ZoomEnvelope {
            start: 1.0,
            end: -0.5,
        },
        2,
        3,
        false,
    )
    .unwrap();
    assert_eq!(env, ZoomEnvelope::default());
    assert!(matches!(
        warning,
        Some(TimelineWarning::ZoomClamped {
            scene_idx: 2,
            shot_idx: 3,
            ..
        })
    ));

    let (env, warning) = check_zoom(
        ZoomEnvelope {
            start: f64::NAN,
            end: 1.2,
        },
        0,
        0,
        false,
    )
    .unwrap();
    assert_eq!(env.start, 1.0);
    assert_eq!(env.end, 1.2);
    assert!(warning.is_some());
}

#[test]
fn strict_mode_rejects_invalid_zoom() {
    let err = check_zoom(
        ZoomEnvelope {
            start: 0.0,
            end: 1.0,
        },
        0,
        1,
        true,
    )
    .unwrap_err();
    assert!(matches!(err, ShotreelError::InvalidZoomEnvelope(_)));
    assert!(err.to_string().starts_with("invalid zoom envelope:"));
}

#[test]
fn valid_zoom_passes_through() {
    let env = ZoomEnvelope {
        start: 1.03,
        end: 1.0,
    };
    assert_eq!(check_zoom(env, 0, 0, true).unwrap(), (env, None));
}

#[test]
fn fades_are_symmetric_across_boundaries() {
    let fades = assign_fades(&[3000, 600, 4000], &[false, false, false], 1000);
    assert_eq!(
        fades,
        vec![
            Fades {
                fade_in: 1000,
                fade_out: 300
            },
            Fades {
                fade_in: 300,
                fade_out: 300
            },
            Fades {
                fade_in: 300,
                fade_out: 1000
            },
        ]
    );
    for (f, d) in fades.iter().zip([3000u64, 600, 4000]) {
        assert!(f.fade_in + f.fade_out <= d);
    }
}

#[test]
fn black_cut_zeroes_both_sides() {
    let fades = assign_fades(&[3000, 2000], &[false, true], 500);
    assert_eq!(fades[0].fade_out, 0);
    assert_eq!(fades[1].fade_in, 0);
    assert_eq!(fades[0].fade_in, 500);
    assert_eq!(fades[1].fade_out, 500);
}

#[test]
fn empty_and_single_shot_fades() {
    assert!(assign_fades(&[], &[], 1000).is_empty());
    assert_eq!(
        assign_fades(&[1200], &[false], 1000),
        vec![Fades {
            fade_in: 600,
            fade_out: 600
        }]
    );
}

#[test]
fn clamp_keeps_ratio_and_fits_duration() {
    assert_eq!(
        clamp_fades(500, 500, 2000),
        (
            Fades {
                fade_in: 500,
                fade_out: 500
            },
            false
        )
    );
    let (f, changed) = clamp_fades(900, 300, 600);
    assert!(changed);
    assert_eq!(f.fade_in, 450);
    assert_eq!(f.fade_out, 150);
    let (f, _) = clamp_fades(10, 10, 0);
    assert_eq!(f, Fades::default());
}
