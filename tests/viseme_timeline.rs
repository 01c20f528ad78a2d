use marionette::puppet::viseme::{Viseme, VisemeTrack, text_to_visemes};

#[test]
fn timeline_is_monotone_and_ends_in_silence() {
    for text in [
        "hello",
        "hello world",
        "The quick brown fox jumps over the lazy dog!",
        "a",
        "punctuation, everywhere... really?!",
    ] {
        let track = text_to_visemes(text, None);
        assert!(!track.is_empty());
        let events = track.events();
        for pair in events.windows(2) {
            assert!(
                pair[0].time <= pair[1].time,
                "times must be non-decreasing in {text:?}"
            );
        }
        assert_eq!(
            events.last().unwrap().viseme,
            Viseme::Sil,
            "terminal event must be silence in {text:?}"
        );
    }
}

#[test]
fn empty_and_whitespace_input_yield_a_silence_event() {
    for text in ["", "   ", "\n\t"] {
        let track = text_to_visemes(text, None);
        assert_eq!(track.len(), 1);
        assert_eq!(track.events()[0].viseme, Viseme::Sil);
        assert_eq!(track.events()[0].time, 0.0);
    }
}

#[test]
fn duration_defaults_to_word_count_pacing() {
    // Two words at 0.4 s each plus one inter-word gap of 0.05 s.
    let track = text_to_visemes("hello world", None);
    let end = track.duration();
    assert!((end - 0.85).abs() < 1e-3, "unexpected end time {end}");
}

#[test]
fn explicit_duration_stretches_the_timeline() {
    let track = text_to_visemes("apple", Some(2.0));
    // One word: the trailing silence lands exactly at the requested length.
    assert!((track.duration() - 2.0).abs() < 1e-3);
}

#[test]
fn query_returns_last_event_at_or_before_t() {
    let track = text_to_visemes("apple", Some(1.0));
    // a-p-p-l-e at 0.2 s per character.
    assert_eq!(track.at(0.0), Viseme::Aa);
    assert_eq!(track.at(0.25), Viseme::Pp);
    assert_eq!(track.at(0.65), Viseme::Nn);
    assert_eq!(track.at(0.85), Viseme::E);
    assert_eq!(track.at(10.0), Viseme::Sil);
}

#[test]
fn query_is_total_for_any_input() {
    let empty = VisemeTrack::default();
    assert_eq!(empty.at(0.0), Viseme::Sil);
    assert_eq!(empty.at(-5.0), Viseme::Sil);
    assert_eq!(empty.at(f32::MAX), Viseme::Sil);

    let track = text_to_visemes("apple", None);
    // Before the first event the first viseme applies.
    assert_eq!(track.at(-1.0), Viseme::Aa);
}

#[test]
fn character_classes_follow_the_fixed_table() {
    let track = text_to_visemes("mow", Some(0.3));
    let events = track.events();
    assert_eq!(events[0].viseme, Viseme::Pp);
    assert_eq!(events[1].viseme, Viseme::Oh);
    assert_eq!(events[2].viseme, Viseme::Ou);
    assert_eq!(events[0].phoneme, "PP");
}

#[test]
fn uppercase_input_maps_like_lowercase() {
    let upper = text_to_visemes("HELLO", Some(1.0));
    let lower = text_to_visemes("hello", Some(1.0));
    let pairs = upper.events().iter().zip(lower.events().iter());
    for (u, l) in pairs {
        assert_eq!(u.viseme, l.viseme);
    }
}
