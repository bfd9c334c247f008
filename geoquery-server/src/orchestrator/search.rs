//! Paginated, multi-term place search.
//!
//! The query text is normalised into a list of terms (split on `,`). Each
//! term is followed through every result page before the next term starts;
//! pages of one term are inherently sequential because each needs the
//! previous page's token. With more than one term the merged list is
//! deduplicated by record id.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::SearchRecord;
use crate::google::{ApiStatus, Endpoint, MapsRequest, PlacesSearchBody};

use super::engine::Orchestrator;
use super::error::QueryError;

/// Separator between independent search terms in the query text.
pub const TERM_SEPARATOR: char = ',';

/// A text or category search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: Option<String>,
    /// Provider category, e.g. "school".
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub radius: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Split query text into search terms.
///
/// Blank terms are dropped, so `None`, `""` and `","` all yield no terms
/// (a category-only search).
pub fn split_terms(text: Option<&str>) -> Vec<String> {
    text.map(|t| {
        t.split(TERM_SEPARATOR)
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

/// Keep the first record for each id; records without an id are all kept.
pub fn dedup_by_id(records: Vec<SearchRecord>) -> Vec<SearchRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| match r.dedup_key() {
            Some(key) => seen.insert(key.to_string()),
            None => true,
        })
        .collect()
}

impl SearchQuery {
    fn first_page(&self, term: Option<&str>) -> MapsRequest {
        MapsRequest::new(Endpoint::TextSearch)
            .with_optional("query", term)
            .with_optional("type", self.kind.as_deref())
            .with_optional("location", self.location.as_deref())
            .with_optional("radius", self.radius.as_deref())
            .with_optional("language", self.language.as_deref())
    }

    fn next_page(&self, token: &str) -> MapsRequest {
        MapsRequest::new(Endpoint::TextSearch)
            .with_param("pagetoken", token)
            .with_optional("type", self.kind.as_deref())
    }
}

impl Orchestrator {
    /// Search places for every term and merge the results.
    ///
    /// Strict: a transport failure, quota exhaustion or provider rejection
    /// on any page fails the search.
    pub async fn search_places(&self, query: &SearchQuery) -> Result<Vec<SearchRecord>, QueryError> {
        let terms = split_terms(query.query.as_deref());
        if terms.is_empty() && query.kind.is_none() {
            return Err(QueryError::InvalidQuery(
                "either query or type is required".into(),
            ));
        }

        if terms.len() <= 1 {
            return self.search_term(query, terms.first().map(String::as_str)).await;
        }

        let mut merged = Vec::new();
        for term in &terms {
            merged.extend(self.search_term(query, Some(term)).await?);
        }
        let before = merged.len();
        let merged = dedup_by_id(merged);
        debug!(
            terms = terms.len(),
            before,
            after = merged.len(),
            "merged multi-term search"
        );
        Ok(merged)
    }

    /// All pages for one term, in page order.
    async fn search_term(
        &self,
        query: &SearchQuery,
        term: Option<&str>,
    ) -> Result<Vec<SearchRecord>, QueryError> {
        let mut records = Vec::new();
        let mut request = query.first_page(term);
        let mut pages = 0;

        loop {
            pages += 1;
            let response = self.executor.execute(&request).await?.require()?;

            match response.status {
                ApiStatus::Ok | ApiStatus::ZeroResults => {}
                status => {
                    return Err(QueryError::Provider {
                        status,
                        message: response.error_message().unwrap_or_default().to_string(),
                    });
                }
            }

            let page: PlacesSearchBody = response.decode()?;
            debug!(term, page = pages, results = page.results.len(), "search page");
            records.extend(page.results);

            let Some(token) = page.next_page_token else {
                break;
            };
            if pages >= self.config.max_pages_per_term {
                warn!(term, pages, "page limit reached, ignoring further pages");
                break;
            }

            // The token is not valid until the provider has propagated it.
            tokio::time::sleep(self.config.page_token_delay).await;
            request = query.next_page(&token);
        }

        Ok(records)
    }
}
