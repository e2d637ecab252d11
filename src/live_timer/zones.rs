use chrono_tz::Tz;

// Well-known countries resolved locally to a DST-aware IANA zone
const WELL_KNOWN_ZONES: &[(&str, Tz)] = &[
    ("United States", chrono_tz::America::New_York),
    ("India", chrono_tz::Asia::Kolkata),
    ("United Kingdom", chrono_tz::Europe::London),
    ("Japan", chrono_tz::Asia::Tokyo),
    ("Australia", chrono_tz::Australia::Sydney),
    ("Germany", chrono_tz::Europe::Berlin),
    ("France", chrono_tz::Europe::Paris),
    ("Brazil", chrono_tz::America::Sao_Paulo),
    ("Canada", chrono_tz::America::Toronto),
    ("China", chrono_tz::Asia::Shanghai),
];

/// Canonical country name and zone for a well-known country.
///
/// Matching ignores surrounding whitespace and ASCII case.
pub fn well_known_zone(name: &str) -> Option<(&'static str, Tz)> {
    let name = name.trim();
    WELL_KNOWN_ZONES
        .iter()
        .find(|(country, _)| country.eq_ignore_ascii_case(name))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_table_entries() {
        assert_eq!(
            well_known_zone("India"),
            Some(("India", chrono_tz::Asia::Kolkata))
        );
        assert_eq!(
            well_known_zone("  united kingdom "),
            Some(("United Kingdom", chrono_tz::Europe::London))
        );
    }

    #[test]
    fn other_countries_fall_through() {
        assert_eq!(well_known_zone("Nepal"), None);
        assert_eq!(well_known_zone(""), None);
    }
}
