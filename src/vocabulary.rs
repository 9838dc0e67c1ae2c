// src/vocabulary.rs
//! Closed keyword tables mapping query phrases onto filter values.
//!
//! Phrases are written in normalized form (see [`normalize_text`]): lower-case,
//! apostrophes dropped, every other non-alphanumeric run collapsed to one space.

use crate::types::{Degree, EmploymentType, TargetLevel};

/// City or region phrase -> normalized gazetteer entry.
pub const GAZETTEER: &[(&str, &str)] = &[
    ("bangalore", "Bangalore, India"),
    ("bengaluru", "Bangalore, India"),
    ("hyderabad", "Hyderabad, India"),
    ("mumbai", "Mumbai, India"),
    ("bombay", "Mumbai, India"),
    ("pune", "Pune, India"),
    ("gurgaon", "Gurugram, India"),
    ("gurugram", "Gurugram, India"),
    ("chennai", "Chennai, India"),
    ("new york", "New York, NY, USA"),
    ("new york city", "New York, NY, USA"),
    ("nyc", "New York, NY, USA"),
    ("san francisco", "San Francisco, CA, USA"),
    ("mountain view", "Mountain View, CA, USA"),
    ("sunnyvale", "Sunnyvale, CA, USA"),
    ("seattle", "Seattle, WA, USA"),
    ("austin", "Austin, TX, USA"),
    ("london", "London, UK"),
    ("dublin", "Dublin, Ireland"),
    ("zurich", "Zurich, Switzerland"),
    ("munich", "Munich, Germany"),
    ("warsaw", "Warsaw, Poland"),
    ("singapore", "Singapore"),
    ("tokyo", "Tokyo, Japan"),
    ("sydney", "Sydney NSW, Australia"),
    ("toronto", "Toronto, ON, Canada"),
];

/// Country-only entries. Consulted when no city or region matches.
pub const COUNTRIES: &[(&str, &str)] = &[
    ("india", "India"),
    ("usa", "USA"),
    ("united states", "USA"),
    ("uk", "UK"),
    ("united kingdom", "UK"),
];

pub const TARGET_LEVELS: &[(&str, TargetLevel)] = &[
    ("intern", TargetLevel::InternAndApprentice),
    ("interns", TargetLevel::InternAndApprentice),
    ("internship", TargetLevel::InternAndApprentice),
    ("internships", TargetLevel::InternAndApprentice),
    ("apprentice", TargetLevel::InternAndApprentice),
    ("apprentices", TargetLevel::InternAndApprentice),
    ("apprenticeship", TargetLevel::InternAndApprentice),
    ("apprenticeships", TargetLevel::InternAndApprentice),
    ("trainee", TargetLevel::InternAndApprentice),
    ("early", TargetLevel::Early),
    ("early career", TargetLevel::Early),
    ("entry", TargetLevel::Early),
    ("entry level", TargetLevel::Early),
    ("junior", TargetLevel::Early),
    ("new grad", TargetLevel::Early),
    ("new graduate", TargetLevel::Early),
    ("fresher", TargetLevel::Early),
    ("freshers", TargetLevel::Early),
    ("mid", TargetLevel::Mid),
    ("mid level", TargetLevel::Mid),
    ("mid career", TargetLevel::Mid),
    ("intermediate", TargetLevel::Mid),
    ("experienced", TargetLevel::Mid),
    ("senior", TargetLevel::Advanced),
    ("advanced", TargetLevel::Advanced),
    ("staff", TargetLevel::Advanced),
    ("principal", TargetLevel::Advanced),
];

pub const DEGREES: &[(&str, Degree)] = &[
    ("pursuing", Degree::PursuingDegree),
    ("pursuing degree", Degree::PursuingDegree),
    ("pursuing a degree", Degree::PursuingDegree),
    ("currently pursuing", Degree::PursuingDegree),
    ("currently enrolled", Degree::PursuingDegree),
    ("pursuing bachelors", Degree::PursuingDegree),
    ("pursuing bachelors degree", Degree::PursuingDegree),
    ("pursuing a bachelors degree", Degree::PursuingDegree),
    ("pursuing masters", Degree::PursuingDegree),
    ("pursuing masters degree", Degree::PursuingDegree),
    ("pursuing a masters degree", Degree::PursuingDegree),
    ("pursuing phd", Degree::PursuingDegree),
    ("pursuing a phd", Degree::PursuingDegree),
    ("student", Degree::PursuingDegree),
    ("students", Degree::PursuingDegree),
    ("degree", Degree::CompletedDegree),
    ("completed degree", Degree::CompletedDegree),
    ("completed a degree", Degree::CompletedDegree),
    ("graduated", Degree::CompletedDegree),
    ("bachelors", Degree::CompletedDegree),
    ("bachelors degree", Degree::CompletedDegree),
    ("masters", Degree::CompletedDegree),
    ("masters degree", Degree::CompletedDegree),
    ("phd", Degree::CompletedDegree),
    ("doctorate", Degree::CompletedDegree),
];

pub const EMPLOYMENT_TYPES: &[(&str, EmploymentType)] = &[
    ("full time", EmploymentType::FullTime),
    ("fulltime", EmploymentType::FullTime),
    ("permanent", EmploymentType::FullTime),
    ("part time", EmploymentType::PartTime),
    ("parttime", EmploymentType::PartTime),
    ("paid internship", EmploymentType::Intern),
    ("internship position", EmploymentType::Intern),
    ("internship role", EmploymentType::Intern),
    ("intern position", EmploymentType::Intern),
    ("intern role", EmploymentType::Intern),
];

pub const REMOTE: &[(&str, bool)] = &[
    ("remote", true),
    ("remotely", true),
    ("fully remote", true),
    ("work from home", true),
    ("wfh", true),
    ("on site", false),
    ("onsite", false),
    ("in office", false),
    ("in person", false),
    ("no remote", false),
    ("not remote", false),
];

/// Lower-cases, drops apostrophes and collapses everything else that is not
/// alphanumeric into single spaces.
pub fn normalize_text(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\'' || c == '\u{2019}' {
            continue;
        }
        if c.is_alphanumeric() {
            cleaned.extend(c.to_lowercase());
        } else {
            cleaned.push(' ');
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Finds the best entry of `table` occurring as whole words in `normalized`.
///
/// The longest phrase wins; ties go to the earliest occurrence, then to table order.
pub fn best_match<T: Copy>(table: &[(&str, T)], normalized: &str) -> Option<T> {
    let haystack = format!(" {} ", normalized);
    let mut best: Option<(usize, usize, usize, T)> = None;

    for (index, (phrase, value)) in table.iter().enumerate() {
        let needle = format!(" {} ", phrase);
        let Some(position) = haystack.find(&needle) else {
            continue;
        };
        let length = phrase.len();
        let better = match best {
            None => true,
            Some((best_len, best_pos, best_index, _)) => {
                (length, std::cmp::Reverse(position), std::cmp::Reverse(index))
                    > (best_len, std::cmp::Reverse(best_pos), std::cmp::Reverse(best_index))
            }
        };
        if better {
            best = Some((length, position, index, *value));
        }
    }

    best.map(|(_, _, _, value)| value)
}

/// Resolves already-normalized text to a gazetteer entry.
///
/// An exact canonical value is returned as is. Otherwise a city or region
/// beats a country, whatever the phrase lengths.
pub fn match_location(normalized: &str) -> Option<&'static str> {
    let exact = GAZETTEER
        .iter()
        .chain(COUNTRIES)
        .map(|(_, canonical)| *canonical)
        .find(|canonical| normalize_text(canonical) == normalized);

    exact
        .or_else(|| best_match(GAZETTEER, normalized))
        .or_else(|| best_match(COUNTRIES, normalized))
}

/// Maps free text onto a gazetteer entry, if any phrase matches.
pub fn normalize_location(text: &str) -> Option<&'static str> {
    match_location(&normalize_text(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Full-Time   Roles!"), "full time roles");
        assert_eq!(normalize_text("Bachelor's Degree"), "bachelors degree");
        assert_eq!(normalize_text("Bachelor\u{2019}s"), "bachelors");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_tables_are_normalized() {
        let phrases = GAZETTEER
            .iter()
            .map(|(p, _)| *p)
            .chain(COUNTRIES.iter().map(|(p, _)| *p))
            .chain(TARGET_LEVELS.iter().map(|(p, _)| *p))
            .chain(DEGREES.iter().map(|(p, _)| *p))
            .chain(EMPLOYMENT_TYPES.iter().map(|(p, _)| *p))
            .chain(REMOTE.iter().map(|(p, _)| *p));

        for phrase in phrases {
            assert_eq!(normalize_text(phrase), phrase, "phrase not normalized: {phrase}");
        }
    }

    #[test]
    fn test_best_match_requires_whole_words() {
        // "intern" must not match inside "international"
        assert_eq!(best_match(TARGET_LEVELS, "international roles"), None);
        assert_eq!(
            best_match(TARGET_LEVELS, "an intern role"),
            Some(TargetLevel::InternAndApprentice)
        );
    }

    #[test]
    fn test_longest_phrase_wins() {
        assert_eq!(
            best_match(DEGREES, "for pursuing degree"),
            Some(Degree::PursuingDegree)
        );
        assert_eq!(
            best_match(DEGREES, "need a bachelors degree"),
            Some(Degree::CompletedDegree)
        );
        assert_eq!(best_match(REMOTE, "no remote please"), Some(false));
    }

    #[test]
    fn test_ties_go_to_earliest_occurrence() {
        assert_eq!(best_match(GAZETTEER, "london or dublin"), Some("London, UK"));
        assert_eq!(best_match(GAZETTEER, "dublin or london"), Some("Dublin, Ireland"));
    }

    #[test]
    fn test_normalize_location() {
        assert_eq!(normalize_location("Bengaluru"), Some("Bangalore, India"));
        assert_eq!(normalize_location("Bangalore, India"), Some("Bangalore, India"));
        assert_eq!(normalize_location("New York, NY, USA"), Some("New York, NY, USA"));
        assert_eq!(normalize_location("Atlantis"), None);
    }

    #[test]
    fn test_city_beats_country() {
        assert_eq!(normalize_location("Pune, India"), Some("Pune, India"));
        assert_eq!(normalize_location("India, Pune"), Some("Pune, India"));
        assert_eq!(match_location("pune in india"), Some("Pune, India"));
        assert_eq!(match_location("united kingdom london"), Some("London, UK"));
        assert_eq!(match_location("anywhere in india"), Some("India"));
    }

    #[test]
    fn test_every_canonical_value_resolves_to_itself() {
        for (_, canonical) in GAZETTEER.iter().chain(COUNTRIES) {
            assert_eq!(normalize_location(canonical), Some(*canonical));
        }
    }
}
