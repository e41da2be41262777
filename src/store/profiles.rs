use super::{ProfileStore, StoreError, StoreResult};
use crate::models::{CandidateQuery, Profile};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// HTTP client for the profile subsystem's internal REST API.
///
/// The directory owns all profile data; this adapter only reads. Every
/// request carries the service API key and a fresh request id so calls can
/// be correlated across service logs.
pub struct ProfileDirectory {
    base_url: String,
    api_key: String,
    client: Client,
}

impl ProfileDirectory {
    pub fn new(base_url: String, api_key: String, timeout_secs: u64) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json(&self, url: &str) -> StoreResult<Option<Value>> {
        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .header("X-Request-Id", uuid::Uuid::new_v4().to_string())
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read body".to_string());
            tracing::error!("Profile directory returned {}: {}", status, body);
            return Err(StoreError::Unavailable(format!(
                "profile directory returned {}",
                status
            )));
        }

        Ok(Some(response.json().await?))
    }
}

#[async_trait]
impl ProfileStore for ProfileDirectory {
    async fn fetch(&self, user_id: &str) -> StoreResult<Option<Profile>> {
        let url = self.endpoint(&format!("profiles/{}", urlencoding::encode(user_id)));

        tracing::debug!("Fetching profile for user: {}", user_id);

        let json = match self.get_json(&url).await? {
            Some(json) => json,
            None => return Ok(None),
        };

        let profile = serde_json::from_value(json)
            .map_err(|e| StoreError::Malformed(format!("failed to parse profile: {}", e)))?;

        Ok(Some(profile))
    }

    async fn find_candidates(&self, query: &CandidateQuery) -> StoreResult<Vec<Profile>> {
        let mut params = vec![
            "visible=true".to_string(),
            format!("minAge={}", query.min_age),
            format!("maxAge={}", query.max_age),
            format!("limit={}", query.fetch_limit),
            "sort=newest".to_string(),
        ];
        if let Some(city) = &query.city {
            params.push(format!("city={}", urlencoding::encode(city)));
        }

        let url = format!("{}?{}", self.endpoint("profiles"), params.join("&"));

        let json = match self.get_json(&url).await? {
            Some(json) => json,
            // The collection endpoint never 404s in practice; treat it as
            // empty rather than failing the whole feed.
            None => return Ok(Vec::new()),
        };

        let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0);

        let documents = json
            .get("profiles")
            .and_then(|d| d.as_array())
            .ok_or_else(|| StoreError::Malformed("missing profiles array".into()))?;

        // The directory applies visibility, age and city server-side; the
        // swiped-set exclusion is ours, and a malformed document drops that
        // one candidate rather than the whole page.
        let candidates: Vec<Profile> = documents
            .iter()
            .filter_map(|doc| serde_json::from_value(doc.clone()).ok())
            .filter(|p: &Profile| {
                p.user_id != query.requester_id && !query.exclude_ids.contains(&p.user_id)
            })
            .collect();

        tracing::debug!(
            "Queried {} candidates for {} (directory total: {})",
            candidates.len(),
            query.requester_id,
            total
        );

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn directory(server: &mockito::Server) -> ProfileDirectory {
        ProfileDirectory::new(server.url(), "test_key".to_string(), 5).unwrap()
    }

    fn profile_json(id: &str, age: u8) -> String {
        format!(
            r#"{{"userId":"{}","name":"User {}","age":{},"sunSign":"Lion","interests":["yoga"]}}"#,
            id, id, age
        )
    }

    #[tokio::test]
    async fn fetch_parses_profile() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/profiles/u1")
            .match_header("x-api-key", "test_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(profile_json("u1", 30))
            .create_async()
            .await;

        let profile = directory(&server).fetch("u1").await.unwrap().unwrap();

        assert_eq!(profile.user_id, "u1");
        assert_eq!(profile.age, 30);
        assert_eq!(profile.sun_sign.as_deref(), Some("Lion"));
        assert!(profile.visible);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_maps_404_to_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/profiles/ghost")
            .with_status(404)
            .create_async()
            .await;

        let profile = directory(&server).fetch("ghost").await.unwrap();
        assert!(profile.is_none());
    }

    #[tokio::test]
    async fn fetch_surfaces_server_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/profiles/u1")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let err = directory(&server).fetch("u1").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn candidates_sends_filters_and_post_filters_exclusions() {
        let mut server = mockito::Server::new_async().await;
        let body = format!(
            r#"{{"total":3,"profiles":[{},{},{}]}}"#,
            profile_json("self", 30),
            profile_json("swiped", 28),
            profile_json("fresh", 27),
        );
        let mock = server
            .mock("GET", "/profiles")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("visible".into(), "true".into()),
                mockito::Matcher::UrlEncoded("minAge".into(), "25".into()),
                mockito::Matcher::UrlEncoded("maxAge".into(), "35".into()),
                mockito::Matcher::UrlEncoded("limit".into(), "200".into()),
                mockito::Matcher::UrlEncoded("city".into(), "Paris".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let query = CandidateQuery {
            requester_id: "self".to_string(),
            exclude_ids: ["swiped".to_string()].into_iter().collect(),
            min_age: 25,
            max_age: 35,
            city: Some("Paris".to_string()),
            fetch_limit: 200,
        };

        let candidates = directory(&server).find_candidates(&query).await.unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].user_id, "fresh");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_document_drops_one_candidate_not_the_page() {
        let mut server = mockito::Server::new_async().await;
        let body = format!(
            r#"{{"total":2,"profiles":[{},{{"userId":42}}]}}"#,
            profile_json("ok", 30),
        );
        server
            .mock("GET", "/profiles")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let query = CandidateQuery {
            requester_id: "self".to_string(),
            exclude_ids: HashSet::new(),
            min_age: 18,
            max_age: 99,
            city: None,
            fetch_limit: 200,
        };

        let candidates = directory(&server).find_candidates(&query).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].user_id, "ok");
    }
}
