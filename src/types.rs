// src/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Seniority / entry signal understood by the careers site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetLevel {
    InternAndApprentice,
    Early,
    Mid,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Degree {
    PursuingDegree,
    CompletedDegree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Intern,
}

impl TargetLevel {
    pub const ALL: [TargetLevel; 4] = [
        TargetLevel::InternAndApprentice,
        TargetLevel::Early,
        TargetLevel::Mid,
        TargetLevel::Advanced,
    ];

    /// Wire value used in URLs and JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetLevel::InternAndApprentice => "INTERN_AND_APPRENTICE",
            TargetLevel::Early => "EARLY",
            TargetLevel::Mid => "MID",
            TargetLevel::Advanced => "ADVANCED",
        }
    }
}

impl Degree {
    pub const ALL: [Degree; 2] = [Degree::PursuingDegree, Degree::CompletedDegree];

    pub fn as_str(&self) -> &'static str {
        match self {
            Degree::PursuingDegree => "PURSUING_DEGREE",
            Degree::CompletedDegree => "COMPLETED_DEGREE",
        }
    }
}

impl EmploymentType {
    pub const ALL: [EmploymentType; 3] = [
        EmploymentType::FullTime,
        EmploymentType::PartTime,
        EmploymentType::Intern,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "FULL_TIME",
            EmploymentType::PartTime => "PART_TIME",
            EmploymentType::Intern => "INTERN",
        }
    }
}

/// Looks up a closed-vocabulary value by its wire name. Unknown names yield `None`.
pub trait WireValue: Sized + Copy + 'static {
    fn variants() -> &'static [Self];
    fn wire_name(&self) -> &'static str;

    fn from_wire(value: &str) -> Option<Self> {
        let wanted = value.trim();
        Self::variants()
            .iter()
            .copied()
            .find(|v| v.wire_name().eq_ignore_ascii_case(wanted))
    }
}

impl WireValue for TargetLevel {
    fn variants() -> &'static [Self] {
        &Self::ALL
    }
    fn wire_name(&self) -> &'static str {
        self.as_str()
    }
}

impl WireValue for Degree {
    fn variants() -> &'static [Self] {
        &Self::ALL
    }
    fn wire_name(&self) -> &'static str {
        self.as_str()
    }
}

impl WireValue for EmploymentType {
    fn variants() -> &'static [Self] {
        &Self::ALL
    }
    fn wire_name(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for TargetLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized search intent. Unset fields are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_level: Option<TargetLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<Degree>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<EmploymentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<bool>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.target_level.is_none()
            && self.degree.is_none()
            && self.employment_type.is_none()
            && self.remote.is_none()
    }
}

/// One extracted search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub title: String,
    pub location: String,
    pub link: String,
    pub snippet: String,
}

/// A fetched results page together with the URL it was served from.
#[derive(Debug, Clone)]
pub struct Document {
    pub url: Url,
    pub body: String,
}

impl Document {
    pub fn new(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub filters: FilterSet,
    pub url: String,
    pub listings: Vec<JobListing>,
    pub fetched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_set_serializes_only_populated_fields() {
        let filters = FilterSet {
            location: Some("Bangalore, India".to_string()),
            target_level: Some(TargetLevel::InternAndApprentice),
            degree: Some(Degree::PursuingDegree),
            ..Default::default()
        };

        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "location": "Bangalore, India",
                "target_level": "INTERN_AND_APPRENTICE",
                "degree": "PURSUING_DEGREE"
            })
        );
    }

    #[test]
    fn test_empty_filter_set() {
        let filters = FilterSet::default();
        assert!(filters.is_empty());
        assert_eq!(serde_json::to_string(&filters).unwrap(), "{}");
    }

    #[test]
    fn test_from_wire() {
        assert_eq!(TargetLevel::from_wire("EARLY"), Some(TargetLevel::Early));
        assert_eq!(Degree::from_wire(" pursuing_degree "), Some(Degree::PursuingDegree));
        assert_eq!(EmploymentType::from_wire("FULL_TIME"), Some(EmploymentType::FullTime));
        assert_eq!(TargetLevel::from_wire("EXPERIENCED"), None);
        assert_eq!(Degree::from_wire("BACHELORS"), None);
    }

    #[test]
    fn test_serde_names_match_wire_names() {
        for level in TargetLevel::ALL {
            let json = serde_json::to_string(&level).unwrap();
            assert_eq!(json, format!("\"{}\"", level.as_str()));
        }
        for degree in Degree::ALL {
            let json = serde_json::to_string(&degree).unwrap();
            assert_eq!(json, format!("\"{}\"", degree.as_str()));
        }
        for kind in EmploymentType::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
