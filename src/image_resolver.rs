use crate::wiki::{Lookup, WikiClient};

/// Maps a free-text term to an illustrative thumbnail URL.
///
/// Three ordered steps, first hit wins:
///
/// 1. summary of the page titled exactly `term`;
/// 2. full-text search for `term`, keeping only the top hit's title;
/// 3. summary of that title.
///
/// A miss or failure in step 1 falls through to the search. A miss or
/// failure in the search ends the chain with no image; step 3 is never
/// attempted without a title to look up.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    wiki: WikiClient,
}

impl ImageResolver {
    pub fn new(wiki: WikiClient) -> Self {
        Self { wiki }
    }

    /// Returns the thumbnail URL, or an empty string when none was found.
    /// Never fails.
    pub async fn resolve(&self, term: &str) -> String {
        if let Some(url) = self.direct_thumbnail(term).await {
            return url;
        }
        let Some(title) = self.search_title(term).await else {
            return String::new();
        };
        self.resolved_thumbnail(&title).await.unwrap_or_default()
    }

    /// Step 1: treat the term as an exact page title.
    pub async fn direct_thumbnail(&self, term: &str) -> Option<String> {
        let lookup = self.wiki.page_thumbnail(term).await;
        settle("direct summary", term, lookup)
    }

    /// Step 2: best search hit for the term.
    pub async fn search_title(&self, term: &str) -> Option<String> {
        let lookup = self.wiki.top_search_title(term).await;
        settle("search", term, lookup)
    }

    /// Step 3: summary of the title found by search.
    pub async fn resolved_thumbnail(&self, title: &str) -> Option<String> {
        let lookup = self.wiki.page_thumbnail(title).await;
        settle("resolved summary", title, lookup)
    }
}

fn settle(step: &str, input: &str, lookup: Lookup<String>) -> Option<String> {
    match &lookup {
        Lookup::Found(v) => log::debug!("{step} for {input:?}: found {v}"),
        Lookup::Absent => log::debug!("{step} for {input:?}: nothing"),
        Lookup::Failed(e) => log::warn!("{step} for {input:?} failed: {e}"),
    }
    lookup.found()
}
