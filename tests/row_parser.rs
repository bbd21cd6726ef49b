// tests/row_parser.rs
use market_trend_report::config::{ParsePolicy, VolumeRange};
use market_trend_report::extract::{parse_row, FixedVolume, RandomVolumes};
use market_trend_report::Trend;

fn policy() -> ParsePolicy {
    ParsePolicy::default()
}

#[test]
fn empty_line_is_rejected() {
    assert!(parse_row("", 0, &policy(), &mut FixedVolume(1)).is_none());
}

#[test]
fn well_formed_row() {
    let r = parse_row("Sourdough | 45,000 | Up | 25%", 0, &policy(), &mut FixedVolume(1)).unwrap();
    assert_eq!(r.term(), "Sourdough");
    assert_eq!(r.volume(), 45_000);
    assert_eq!(r.trend(), Trend::Up);
    assert_eq!(r.change_percent(), 25.0);
}

#[test]
fn numbered_row_with_negative_change() {
    let r = parse_row("1. Local Coffee | 12500 | Stable | -3", 0, &policy(), &mut FixedVolume(1)).unwrap();
    assert_eq!(r.term(), "Local Coffee");
    assert_eq!(r.change_percent(), -3.0);
    assert_eq!(r.trend(), Trend::Stable);
}

#[test]
fn header_row_is_rejected() {
    assert!(parse_row("Keyword|Volume|Trend|Change%", 0, &policy(), &mut FixedVolume(1)).is_none());
    assert!(parse_row("TERM | VOL | DIR", 0, &policy(), &mut FixedVolume(1)).is_none());
}

#[test]
fn placeholder_volumes_stay_in_policy_range() {
    let p = policy();
    let mut src = RandomVolumes::seeded(2026);
    for i in 0..200 {
        let line = format!("Item {i} | unknown | up");
        let r = parse_row(&line, i, &p, &mut src).unwrap();
        assert!(p.structured_volume.contains(r.volume()), "volume {} out of range", r.volume());
    }
}

#[test]
fn custom_range_is_respected() {
    let mut p = policy();
    p.structured_volume = VolumeRange::new(10, 20);
    let mut src = RandomVolumes::seeded(1);
    for _ in 0..50 {
        let r = parse_row("Bagel | - | down", 0, &p, &mut src).unwrap();
        assert!((10..=20).contains(&r.volume()));
        assert_eq!(r.trend(), Trend::Down);
    }
}

#[test]
fn accepted_records_hold_invariants_on_noisy_lines() {
    let lines = [
        "Sourdough | 45,000 | Up | 25%",
        "  2)   Rye   |  3 000  |  DOWN  |  -4.5 %  ",
        "| Focaccia | 1.2k | Upward | +8 |",
        "Pretzel | | |",
        "a | 1 | up",
        "🍞 Bread | 10 | ↑",
        "12. | 4 | up",
        "Muffins | 9 | down | -",
        "Bagels | 99999999999999999999999999 | stable | 1e400",
    ];
    let p = policy();
    let mut src = RandomVolumes::seeded(9);
    for (i, line) in lines.iter().enumerate() {
        if let Some(r) = parse_row(line, i, &p, &mut src) {
            assert!(r.term().chars().count() > 1, "{line}");
            assert!(r.volume() > 0, "{line}");
            assert!(r.change_percent().is_finite(), "{line}");
            assert!(!p.is_header_like(r.term()), "{line}");
        }
    }
}
