// src/url_builder.rs
use crate::types::FilterSet;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.google.com/about/careers/applications/jobs/results/";

/// Maps a FilterSet onto a search-results URL.
///
/// Parameters are always emitted in the order location, target_level, degree,
/// employment_type, remote, form-encoded (`+` for spaces).
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: Url,
}

impl Default for UrlBuilder {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
        }
    }
}

impl UrlBuilder {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base_url)?;
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn build(&self, filters: &FilterSet) -> Url {
        let params = Self::params(filters);
        let mut url = self.base.clone();

        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &params {
                pairs.append_pair(key, value);
            }
        }

        url
    }

    fn params(filters: &FilterSet) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(5);

        if let Some(location) = &filters.location {
            params.push(("location", location.clone()));
        }
        if let Some(level) = filters.target_level {
            params.push(("target_level", level.as_str().to_string()));
        }
        if let Some(degree) = filters.degree {
            params.push(("degree", degree.as_str().to_string()));
        }
        if let Some(kind) = filters.employment_type {
            params.push(("employment_type", kind.as_str().to_string()));
        }
        if let Some(remote) = filters.remote {
            params.push(("remote", remote.to_string()));
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Degree, EmploymentType, TargetLevel};

    #[test]
    fn test_empty_filters_yield_bare_base() {
        let url = UrlBuilder::default().build(&FilterSet::default());
        assert_eq!(url.as_str(), DEFAULT_BASE_URL);
        assert!(url.query().is_none());
    }

    #[test]
    fn test_bangalore_internship_url() {
        let filters = FilterSet {
            location: Some("Bangalore, India".to_string()),
            target_level: Some(TargetLevel::InternAndApprentice),
            degree: Some(Degree::PursuingDegree),
            ..Default::default()
        };

        assert_eq!(
            UrlBuilder::default().build(&filters).as_str(),
            "https://www.google.com/about/careers/applications/jobs/results/?location=Bangalore%2C+India&target_level=INTERN_AND_APPRENTICE&degree=PURSUING_DEGREE"
        );
    }

    #[test]
    fn test_all_fields_in_fixed_order() {
        let filters = FilterSet {
            remote: Some(true),
            employment_type: Some(EmploymentType::FullTime),
            degree: Some(Degree::CompletedDegree),
            target_level: Some(TargetLevel::Advanced),
            location: Some("New York, NY, USA".to_string()),
        };

        let url = UrlBuilder::default().build(&filters);
        assert_eq!(
            url.query(),
            Some("location=New+York%2C+NY%2C+USA&target_level=ADVANCED&degree=COMPLETED_DEGREE&employment_type=FULL_TIME&remote=true")
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = UrlBuilder::default();
        let filters = FilterSet {
            location: Some("Zurich, Switzerland".to_string()),
            remote: Some(false),
            ..Default::default()
        };

        let first = builder.build(&filters);
        let second = builder.build(&filters.clone());
        assert_eq!(first.as_str(), second.as_str());
        assert!(first.as_str().ends_with("?location=Zurich%2C+Switzerland&remote=false"));
    }

    #[test]
    fn test_custom_base_drops_existing_query() {
        let builder = UrlBuilder::new("http://localhost:8080/jobs?page=2#top").unwrap();
        let url = builder.build(&FilterSet {
            target_level: Some(TargetLevel::Early),
            ..Default::default()
        });
        assert_eq!(url.as_str(), "http://localhost:8080/jobs?target_level=EARLY");
    }

    #[test]
    fn test_invalid_base_is_rejected() {
        assert!(UrlBuilder::new("not a url").is_err());
    }
}
