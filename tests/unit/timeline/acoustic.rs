use super::*;

#[test]
fn parse_accepts_known_tags_case_insensitively() {
    for env in AcousticEnv::ALL {
        assert_eq!(AcousticEnv::parse(env.as_str()), Some(env));
        assert_eq!(
            AcousticEnv::parse(&env.as_str().to_ascii_uppercase()),
            Some(env)
        );
    }
    assert_eq!(AcousticEnv::parse(" hall "), Some(AcousticEnv::Hall));
}

#[test]
fn unknown_or_empty_tags_are_dry() {
    assert_eq!(AcousticEnv::parse(""), None);
    assert_eq!(AcousticEnv::parse("cathedral"), None);
}

#[test]
fn dry_levels_and_echo_sum_to_unity() {
    assert_eq!(AcousticEnv::Hall.dry_level(), 0.84);
    assert_eq!(AcousticEnv::Telephone.dry_level(), 0.7);

    for env in AcousticEnv::ALL {
        let tap = env.echo();
        assert!(tap.delay_ms > 0);
        assert!((tap.level + env.dry_level() - 1.0).abs() < 1e-6);
    }

    // The telephone keeps its reverb share instead of just getting quieter.
    let phone = AcousticEnv::Telephone.echo();
    assert!((phone.level - 0.3).abs() < 1e-6);
    assert!(phone.delay_ms < AcousticEnv::SmallRoom.echo().delay_ms);
}

#[test]
fn serde_uses_snake_case_tags() {
    let s = serde_json::to_string(&AcousticEnv::LargeRoom).unwrap();
    assert_eq!(s, "\"large_room\"");
    let back: AcousticEnv = serde_json::from_str("\"small_room\"").unwrap();
    assert_eq!(back, AcousticEnv::SmallRoom);
}
