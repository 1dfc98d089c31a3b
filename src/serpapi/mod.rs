//! SerpApi access: the seed Google search and the related-questions continuation endpoint.

pub mod client;
pub mod types;

pub use client::{Locale, SearchClient, SerpApiClient, SerpApiError};
pub use types::{RawQuestion, RawResult};
