use async_trait::async_trait;
use showroom_core::{EndpointPolicy, SourceError};

use super::{Candidate, IdMatch, SourceAdapter, SourceKind};
use crate::fetcher::RetryingFetcher;

/// `{base}{path}{id}` with the id percent-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    base: String,
    path: String,
}

impl UrlTemplate {
    pub fn new(base: impl Into<String>, path: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
            path: path.into(),
        }
    }

    pub fn render(&self, id: &str) -> String {
        format!("{}{}{}", self.base, self.path, urlencoding::encode(id))
    }
}

/// One HTTP endpoint: label, URL template, timeout and retry budget.
pub struct HttpSource {
    label: String,
    template: UrlTemplate,
    policy: EndpointPolicy,
    id_match: IdMatch,
    fetcher: RetryingFetcher,
}

impl HttpSource {
    pub fn new(
        label: impl Into<String>,
        template: UrlTemplate,
        policy: EndpointPolicy,
        fetcher: RetryingFetcher,
    ) -> Self {
        Self {
            label: label.into(),
            template,
            policy,
            id_match: IdMatch::Exact,
            fetcher,
        }
    }

    pub fn with_id_match(mut self, id_match: IdMatch) -> Self {
        self.id_match = id_match;
        self
    }

    pub fn url_for(&self, id: &str) -> String {
        self.template.render(id)
    }
}

#[async_trait]
impl SourceAdapter for HttpSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Network
    }

    fn id_match(&self) -> IdMatch {
        self.id_match
    }

    async fn fetch(&self, id: &str) -> Result<Option<Candidate>, SourceError> {
        let url = self.url_for(id);
        let payload = self.fetcher.fetch(&url, &self.policy).await?;
        Ok(Some(Candidate::Raw(payload)))
    }
}
