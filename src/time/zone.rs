//! Timezone abbreviation lookup

use chrono::FixedOffset;

/// Known abbreviations and their offset from UTC in minutes.
///
/// Ambiguous abbreviations (IST, CST in Asia, ...) resolve to the reading
/// most common in iCloud exports or are left out entirely.
const ZONES: &[(&str, i32)] = &[
    ("GMT", 0),
    ("UTC", 0),
    ("UT", 0),
    ("Z", 0),
    ("WET", 0),
    ("WEST", 60),
    ("BST", 60),
    ("CET", 60),
    ("CEST", 120),
    ("EET", 120),
    ("EEST", 180),
    ("MSK", 180),
    ("EST", -300),
    ("EDT", -240),
    ("CST", -360),
    ("CDT", -300),
    ("MST", -420),
    ("MDT", -360),
    ("PST", -480),
    ("PDT", -420),
    ("AKST", -540),
    ("AKDT", -480),
    ("HST", -600),
    ("JST", 540),
    ("KST", 540),
    ("AWST", 480),
    ("ACST", 570),
    ("ACDT", 630),
    ("AEST", 600),
    ("AEDT", 660),
    ("NZST", 720),
    ("NZDT", 780),
];

/// Resolve a timezone abbreviation (case-insensitive) to a fixed offset
pub fn offset_for(abbrev: &str) -> Option<FixedOffset> {
    ZONES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(abbrev))
        .and_then(|(_, minutes)| FixedOffset::east_opt(minutes * 60))
}

/// All abbreviations the parser accepts
pub fn known_abbreviations() -> impl Iterator<Item = &'static str> {
    ZONES.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gmt_is_zero() {
        assert_eq!(offset_for("GMT"), FixedOffset::east_opt(0));
        assert_eq!(offset_for("gmt"), FixedOffset::east_opt(0));
    }

    #[test]
    fn test_negative_and_half_hour_offsets() {
        assert_eq!(offset_for("PST"), FixedOffset::west_opt(8 * 3600));
        assert_eq!(offset_for("ACST"), FixedOffset::east_opt(9 * 3600 + 1800));
    }

    #[test]
    fn test_unknown_abbreviation() {
        assert!(offset_for("XYZ").is_none());
        assert!(offset_for("").is_none());
    }

    #[test]
    fn test_every_entry_resolves() {
        for abbrev in known_abbreviations() {
            assert!(offset_for(abbrev).is_some(), "{abbrev} should resolve");
        }
    }
}
