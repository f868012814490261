use super::*;

fn seq(len_ms: u64) -> VoiceSlot {
    VoiceSlot {
        len_ms,
        offset_ms: None,
    }
}

#[test]
fn silent_shot_uses_default_or_authored() {
    assert_eq!(shot_duration(None, &[], 3000), 3000);
    assert_eq!(shot_duration(Some(4500), &[], 3000), 4500);
    assert_eq!(shot_duration(Some(1000), &[], 3000), 3000);
}

#[test]
fn sequential_lines_are_padded_and_separated() {
    let slots = [seq(1000), seq(2000)];
    assert_eq!(voice_offsets(&slots), vec![900, 2100]);
    // 900 + 1000 + 200 + 2000 + 200 + 900
    assert_eq!(voice_span(&slots), 5200);
}

#[test]
fn voice_longer_than_authored_wins() {
    let slots = [seq(4000)];
    let d = shot_duration(Some(2000), &slots, 3000);
    assert_eq!(d, 6000);
    assert!(d >= voice_offsets(&slots)[0] + 4000);
}

#[test]
fn offset_lines_keep_their_position() {
    let slots = [
        VoiceSlot {
            len_ms: 500,
            offset_ms: Some(3000),
        },
        seq(1000),
    ];
    assert_eq!(voice_offsets(&slots), vec![3000, 900]);
    assert_eq!(voice_span(&slots), 3000 + 500 + 900);
}
