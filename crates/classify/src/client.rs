use std::time::Duration;

use bookshelf_kernel::settings::ClassifySettings;
use reqwest::Url;

use crate::decode::{decode_lookup, decode_search};
use crate::error::ClassifyError;
use crate::models::{ClassificationLookup, SearchResult};

/// HTTP client for the Classify API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ClassifyClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ClassifyClient {
    pub fn new(settings: &ClassifySettings) -> Result<Self, ClassifyError> {
        let base_url =
            Url::parse(&settings.base_url).map_err(|e| ClassifyError::InvalidBaseUrl {
                url: settings.base_url.clone(),
                reason: e.to_string(),
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>?title=<term>&summary=true`
    pub fn search_url(&self, title: &str) -> Url {
        self.query_url("title", title)
    }

    /// `<base>?owi=<id>&summary=true`
    pub fn lookup_url(&self, owi: &str) -> Url {
        self.query_url("owi", owi)
    }

    fn query_url(&self, key: &str, value: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair(key, value)
            .append_pair("summary", "true");
        url
    }

    /// Issue one GET and return the full body. Non-2xx responses are
    /// reported as transport errors.
    pub async fn fetch(&self, url: Url) -> Result<Vec<u8>, ClassifyError> {
        tracing::debug!(%url, "querying classify");

        let response = self.http.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;

        Ok(body.to_vec())
    }

    pub async fn search(&self, title: &str) -> Result<Vec<SearchResult>, ClassifyError> {
        let body = self.fetch(self.search_url(title)).await?;
        let results = decode_search(&body)?;

        tracing::info!(title, count = results.len(), "classify search completed");
        Ok(results)
    }

    pub async fn lookup(&self, owi: &str) -> Result<ClassificationLookup, ClassifyError> {
        let body = self.fetch(self.lookup_url(owi)).await?;
        let lookup = decode_lookup(owi, &body)?;

        tracing::info!(
            owi,
            classification = %lookup.classification,
            "classify lookup completed"
        );
        Ok(lookup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, routing::get, Router};
    use std::collections::HashMap;

    fn client_for(base_url: &str) -> ClassifyClient {
        ClassifyClient::new(&ClassifySettings {
            base_url: base_url.to_string(),
            timeout_ms: 2000,
        })
        .unwrap()
    }

    async fn stub_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/classify2/Classify")
    }

    #[test]
    fn search_url_escapes_the_term() {
        let client = client_for("http://classify.oclc.org/classify2/Classify");
        assert_eq!(
            client.search_url("War & Peace").as_str(),
            "http://classify.oclc.org/classify2/Classify?title=War+%26+Peace&summary=true"
        );
    }

    #[test]
    fn lookup_url_uses_owi() {
        let client = client_for("http://classify.oclc.org/classify2/Classify");
        assert_eq!(
            client.lookup_url("44637874").as_str(),
            "http://classify.oclc.org/classify2/Classify?owi=44637874&summary=true"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ClassifyClient::new(&ClassifySettings {
            base_url: "not a url".to_string(),
            timeout_ms: 1000,
        })
        .unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidBaseUrl { .. }));
    }

    #[tokio::test]
    async fn search_sends_title_and_summary() {
        let router = Router::new().route(
            "/classify2/Classify",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("summary").map(String::as_str), Some("true"));
                let title = params.get("title").cloned().unwrap_or_default();
                format!(
                    r#"<classify><response code="4"/><works><work title="{title}" author="A" hyr="2001" owi="1"/></works></classify>"#
                )
            }),
        );
        let client = client_for(&stub_server(router).await);

        let results = client.search("Dune").await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Dune");
        assert_eq!(results[0].year, "2001");
    }

    #[tokio::test]
    async fn non_success_status_is_a_transport_error() {
        let router = Router::new().route(
            "/classify2/Classify",
            get(|| async { (axum::http::StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let client = client_for(&stub_server(router).await);

        let err = client.lookup("1").await.unwrap_err();
        assert!(matches!(err, ClassifyError::Transport(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_propagated() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(&format!("http://{addr}/classify2/Classify"));
        let err = client.search("anything").await.unwrap_err();
        assert!(matches!(err, ClassifyError::Transport(_)));
        assert_eq!(err.to_string(), "classify request failed");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn search_results_serialize_with_front_end_names() {
        let result = SearchResult {
            title: "Hamlet".to_string(),
            author: "Shakespeare, William".to_string(),
            year: "1988".to_string(),
            id: "44637874".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&[result]).unwrap(),
            r#"[{"Title":"Hamlet","Author":"Shakespeare, William","Year":"1988","ID":"44637874"}]"#
        );
    }
}
