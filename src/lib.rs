//! Natural-language job search against a careers results page.
//!
//! A query runs through four stages in order:
//!
//! 1. [`interpreter`] turns free text into a closed-vocabulary [`FilterSet`]
//! 2. [`url_builder`] maps the filters onto a deterministic search URL
//! 3. [`fetcher`] retrieves the results page (retry and rate limiting are decorators)
//! 4. [`parser`] extracts deduplicated [`JobListing`]s from the markup
//!
//! [`pipeline::JobSearch`] wires the stages together.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod interpreter;
pub mod parser;
pub mod pipeline;
pub mod types;
pub mod url_builder;
pub mod vocabulary;

pub use config::SearchConfig;
pub use error::{FetchError, ParseError, SearchError};
pub use interpreter::{build_interpreter, QueryInterpreter};
pub use parser::ListingParser;
pub use pipeline::{JobSearch, SearchPlan};
pub use types::{Degree, Document, EmploymentType, FilterSet, JobListing, SearchResults, TargetLevel};
pub use url_builder::UrlBuilder;
