use serde::Serialize;

use crate::error::DomainError;
use crate::forms::{self, FormState, SearchForm};
use crate::ports::{PostRepository, SearchHit};

#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    /// Raw `query` parameter.
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchContext {
    pub form: FormState<SearchForm>,
    pub query: Option<String>,
    pub results: Vec<SearchHit>,
}

/// Full-text search over post titles and bodies.
///
/// A missing or empty query is not a search. Results are not paginated.
pub async fn post_search(
    posts: &dyn PostRepository,
    request: SearchRequest,
) -> Result<SearchContext, DomainError> {
    let Some(raw) = request.query.filter(|q| !q.is_empty()) else {
        return Ok(SearchContext {
            form: FormState::unbound(),
            query: None,
            results: Vec::new(),
        });
    };

    let form = match forms::bind(SearchForm { query: Some(raw) }) {
        Ok(form) => form,
        Err(state) => {
            return Ok(SearchContext {
                form: state,
                query: None,
                results: Vec::new(),
            });
        }
    };

    let query = form.query.clone().unwrap_or_default();
    let mut results = posts.search(&query).await?;
    results.sort_by(|a, b| {
        b.rank
            .total_cmp(&a.rank)
            .then_with(|| b.post.publish.cmp(&a.post.publish))
    });

    Ok(SearchContext {
        form: FormState::valid(form),
        query: Some(query),
        results,
    })
}
