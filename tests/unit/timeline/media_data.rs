use super::*;
use crate::scene::model::{BoundingBox, DialogLine, Music, SceneDoc, Shot};

fn shot(image: Option<&str>) -> Shot {
    Shot {
        image_url: image.map(str::to_owned),
        ..Shot::default()
    }
}

fn scene(shots: Vec<Shot>) -> Scene {
    Scene {
        id: None,
        doc: SceneDoc::default(),
        shots,
    }
}

#[test]
fn flattens_in_order_and_links_previous_images() {
    let scenes = vec![
        scene(vec![shot(Some("a.png")), shot(Some("b.png"))]),
        scene(vec![shot(Some("c.png"))]),
    ];
    let md = prepare_media_data(&scenes, &CreatorOpts::default()).unwrap();
    let idx: Vec<_> = md.iter().map(|m| (m.scene_idx, m.shot_idx)).collect();
    assert_eq!(idx, vec![(0, 0), (0, 1), (1, 0)]);
    assert_eq!(md[0].previous_image, None);
    assert_eq!(md[1].previous_image.as_deref(), Some("a.png"));
    assert_eq!(md[2].previous_image.as_deref(), Some("b.png"));
}

#[test]
fn shot_without_image_reuses_previous() {
    let scenes = vec![scene(vec![shot(Some("a.png")), shot(None)])];
    let md = prepare_media_data(&scenes, &CreatorOpts::default()).unwrap();
    assert_eq!(md[1].image, "a.png");
}

#[test]
fn first_shot_without_any_image_is_rejected() {
    let scenes = vec![scene(vec![shot(None)])];
    let err = prepare_media_data(&scenes, &CreatorOpts::default()).unwrap_err();
    assert!(matches!(err, ShotreelError::Validation(_)));
}

#[test]
fn empty_input_reports_empty_timeline() {
    assert!(matches!(
        prepare_media_data(&[], &CreatorOpts::default()),
        Err(ShotreelError::EmptyTimeline)
    ));
    assert!(matches!(
        prepare_media_data(&[scene(vec![])], &CreatorOpts::default()),
        Err(ShotreelError::EmptyTimeline)
    ));
}

#[test]
fn part_renders_one_scene_with_prior_image() {
    let scenes = vec![
        scene(vec![shot(Some("a.png")), shot(Some("b.png"))]),
        scene(vec![]),
        scene(vec![shot(Some("c.png"))]),
    ];
    let opts = CreatorOpts {
        part: Some(2),
        ..CreatorOpts::default()
    };
    let md = prepare_media_data(&scenes, &opts).unwrap();
    assert_eq!(md.len(), 1);
    assert_eq!(md[0].scene_idx, 2);
    assert_eq!(md[0].previous_image.as_deref(), Some("b.png"));

    let opts = CreatorOpts {
        part: Some(7),
        ..CreatorOpts::default()
    };
    assert!(prepare_media_data(&scenes, &opts).is_err());
}

#[test]
fn carries_audio_references_and_speaker_regions() {
    let mut s = shot(Some("a.png"));
    s.sound_urls = vec!["rain.wav".into(), "wind.wav".into()];
    s.selected_sound_index = Some(1);
    s.acoustic_env = Some("hall".into());
    s.dialog = vec![
        DialogLine {
            line: "hello".into(),
            line_url: Some("v0.wav".into()),
            character_id: Some("bob".into()),
            ..DialogLine::default()
        },
        DialogLine {
            line: "unvoiced".into(),
            ..DialogLine::default()
        },
    ];
    s.bounding_boxes = vec![BoundingBox {
        rect: vec![0.1, 0.2, 0.3, 0.4],
        character_id: "bob".into(),
    }];
    let mut sc = scene(vec![s]);
    sc.doc.musics = vec![None, Some(Music {
        id: "theme.wav".into(),
        desc: None,
    })];
    sc.doc.selected_music_index = Some(1);

    let md = prepare_media_data(&[sc], &CreatorOpts::default()).unwrap();
    let m = &md[0];
    assert_eq!(m.music.as_deref(), Some("theme.wav"));
    assert_eq!(m.sound.as_deref(), Some("wind.wav"));
    assert_eq!(m.acoustic_env.as_deref(), Some("hall"));
    assert_eq!(m.voice.len(), 1);
    assert_eq!(m.voice[0].url, "v0.wav");
    assert_eq!(m.voice[0].region.as_deref(), Some(&[0.1, 0.2, 0.3, 0.4][..]));
}

#[test]
fn invalid_music_selection_is_rejected() {
    let mut sc = scene(vec![shot(Some("a.png"))]);
    sc.doc.selected_music_index = Some(0);
    assert!(matches!(
        prepare_media_data(&[sc], &CreatorOpts::default()),
        Err(ShotreelError::Validation(_))
    ));
}

#[test]
fn media_data_serializes_round_trip_shape() {
    let md = prepare_media_data(&[scene(vec![shot(Some("a.png"))])], &CreatorOpts::default())
        .unwrap();
    let json = serde_json::to_value(&md[0]).unwrap();
    assert_eq!(json["image"], "a.png");
    assert_eq!(json["zoom"], "in");
    assert_eq!(json["transition"], "crossfade");
}
