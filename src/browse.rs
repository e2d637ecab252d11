use std::fmt::Write;

use crate::countries::CountryRecord;

const NOT_AVAILABLE: &str = "N/A";

/// `29136808` -> `29,136,808`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Code used to key favorites; the common name when the service has no cca3.
pub fn country_code(record: &CountryRecord) -> String {
    record
        .cca3
        .clone()
        .unwrap_or_else(|| record.name.common.clone())
}

fn capital(record: &CountryRecord) -> &str {
    record.capital.first().map_or(NOT_AVAILABLE, String::as_str)
}

fn region(record: &CountryRecord) -> &str {
    record.region.as_deref().unwrap_or(NOT_AVAILABLE)
}

fn population(record: &CountryRecord) -> String {
    record
        .population
        .map_or_else(|| NOT_AVAILABLE.to_string(), group_thousands)
}

/// One line of the search result list.
pub fn summary_line(record: &CountryRecord) -> String {
    format!(
        "{} ({}) - capital: {}, region: {}, population: {}",
        record.name.common,
        country_code(record),
        capital(record),
        region(record),
        population(record)
    )
}

/// Multi-line country card.
pub fn detail_card(record: &CountryRecord, favorite: bool) -> String {
    let mut card = String::new();
    let marker = if favorite { " [favorite]" } else { "" };
    let _ = writeln!(card, "{}{}", record.name.common, marker);
    if let Some(official) = &record.name.official {
        let _ = writeln!(card, "  Official name: {}", official);
    }
    if let Some(flag) = record.flag_url() {
        let _ = writeln!(card, "  Flag: {}", flag);
    }
    let _ = writeln!(card, "  Capital: {}", capital(record));
    let _ = writeln!(card, "  Region: {}", region(record));
    let _ = writeln!(card, "  Population: {}", population(record));
    let timezones = if record.timezones.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        record.timezones.join(", ")
    };
    let _ = write!(card, "  Timezones: {}", timezones);
    card
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countries::parse_records;

    fn japan() -> CountryRecord {
        parse_records(
            r#"[{
                "name": { "common": "Japan", "official": "Japan" },
                "cca3": "JPN",
                "capital": ["Tokyo"],
                "region": "Asia",
                "population": 125836021,
                "timezones": ["UTC+09:00"],
                "flags": { "png": "https://flagcdn.com/w320/jp.png" }
            }]"#,
        )
        .unwrap()
        .remove(0)
    }

    #[test]
    fn groups_digits() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(125836021), "125,836,021");
    }

    #[test]
    fn summary_uses_placeholders() {
        assert_eq!(
            summary_line(&japan()),
            "Japan (JPN) - capital: Tokyo, region: Asia, population: 125,836,021"
        );

        let bare = parse_records(r#"[{ "name": { "common": "Antarctica" } }]"#)
            .unwrap()
            .remove(0);
        assert_eq!(
            summary_line(&bare),
            "Antarctica (Antarctica) - capital: N/A, region: N/A, population: N/A"
        );
    }

    #[test]
    fn detail_card_marks_favorites() {
        let card = detail_card(&japan(), true);
        assert!(card.starts_with("Japan [favorite]\n"));
        assert!(card.contains("  Flag: https://flagcdn.com/w320/jp.png\n"));
        assert!(card.ends_with("  Timezones: UTC+09:00"));

        assert!(detail_card(&japan(), false).starts_with("Japan\n"));
    }
}
