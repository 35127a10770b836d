//! Employee data providers.
//!
//! Records come either from a JSON file on disk or from the metrics API.
//! Both return raw [`EmployeeRecord`]s; validation happens in the analysis
//! layer.

use crate::analysis::classifier::Thresholds;
use crate::analysis::snapshot::TeamFilter;
use crate::error::ProviderError;
use crate::models::EmployeeRecord;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Read a JSON array of employee records from disk.
pub async fn load_records(path: &Path) -> Result<Vec<EmployeeRecord>, ProviderError> {
    let origin = path.display().to_string();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ProviderError::Io {
            path: origin.clone(),
            source,
        })?;

    let records: Vec<EmployeeRecord> = decode(&content, &origin)?;
    info!("Loaded {} records from {}", records.len(), origin);
    Ok(records)
}

fn decode<T: DeserializeOwned>(content: &str, origin: &str) -> Result<T, ProviderError> {
    serde_json::from_str(content).map_err(|source| ProviderError::Decode {
        origin: origin.to_string(),
        source,
    })
}

/// Body of `GET /config/thresholds`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThresholdsResponse {
    silent_architect_threshold: Thresholds,
}

/// Client for the metrics HTTP API.
pub struct ApiClient {
    base_url: String,
    timeout_seconds: u64,
    http_client: reqwest::Client,
}

impl ApiClient {
    /// Create a client for an API rooted at `base_url` (e.g. `http://host/api/v1`).
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self, ProviderError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|source| ProviderError::Request {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self {
            base_url,
            timeout_seconds,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET request for the scatter endpoint, with `team` as a query
    /// parameter when a single team is selected.
    pub fn records_request(&self, filter: &TeamFilter) -> Result<reqwest::Request, ProviderError> {
        let url = format!("{}/dashboard/scatter", self.base_url);
        let mut builder = self.http_client.get(&url);
        if let Some(team) = filter.team() {
            builder = builder.query(&[("team", team)]);
        }
        builder
            .build()
            .map_err(|source| ProviderError::Request { url, source })
    }

    fn thresholds_request(&self) -> Result<reqwest::Request, ProviderError> {
        let url = format!("{}/config/thresholds", self.base_url);
        self.http_client
            .get(&url)
            .build()
            .map_err(|source| ProviderError::Request { url, source })
    }

    /// Fetch raw employee records, narrowed server-side when a team is selected.
    pub async fn fetch_records(
        &self,
        filter: &TeamFilter,
    ) -> Result<Vec<EmployeeRecord>, ProviderError> {
        let request = self.records_request(filter)?;
        let url = request.url().to_string();
        let records: Vec<EmployeeRecord> = self.get_json(request).await?;
        info!("Fetched {} records from {}", records.len(), url);
        Ok(records)
    }

    /// Fetch the server's default Silent Architect thresholds.
    pub async fn fetch_thresholds(&self) -> Result<Thresholds, ProviderError> {
        let request = self.thresholds_request()?;
        let response: ThresholdsResponse = self.get_json(request).await?;
        debug!(
            "Server thresholds: impact >= {}, activity <= {}",
            response.silent_architect_threshold.impact,
            response.silent_architect_threshold.activity
        );
        Ok(response.silent_architect_threshold)
    }

    /// Fetch records and thresholds concurrently.
    pub async fn fetch_all(
        &self,
        filter: &TeamFilter,
    ) -> Result<(Vec<EmployeeRecord>, Thresholds), ProviderError> {
        futures::try_join!(self.fetch_records(filter), self.fetch_thresholds())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::Request,
    ) -> Result<T, ProviderError> {
        let url = request.url().to_string();
        debug!("GET {}", url);

        let response = self.http_client.execute(request).await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    url: url.clone(),
                    seconds: self.timeout_seconds,
                }
            } else if e.is_connect() {
                ProviderError::Connect { url: url.clone() }
            } else {
                ProviderError::Request {
                    url: url.clone(),
                    source: e,
                }
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { url, status, body });
        }

        let body = response.text().await.map_err(|source| ProviderError::Request {
            url: url.clone(),
            source,
        })?;

        decode(&body, &url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmployeeId, RawScore};
    use std::io::Write;

    const SCATTER_BODY: &str = r#"[
        {
            "id": 1,
            "name": "Sarah Chen",
            "role": "Senior Engineer",
            "team": "Engineering",
            "impactScore": "92.00",
            "activityScore": 45,
            "silentArchitect": true,
            "impactBreakdown": [
                {
                    "metric": "Code Reviews",
                    "score": 55,
                    "description": "Reviewed 40 pull requests.",
                    "stats": {"count": 40, "label": "PRs Reviewed"}
                }
            ]
        },
        {"id": "e-2", "name": "Marcus", "team": "Product", "impactScore": null, "activityScore": 90}
    ]"#;

    #[test]
    fn test_load_records_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCATTER_BODY.as_bytes()).unwrap();

        let records = tokio_test::block_on(load_records(file.path())).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].impact_score, Some(RawScore::Text("92.00".to_string())));
        assert_eq!(records[0].impact_breakdown[0].stats.as_ref().unwrap().count, 40);
        assert_eq!(records[1].id, EmployeeId::Text("e-2".to_string()));
        assert_eq!(records[1].impact_score, None);
        assert_eq!(records[1].role, "");
    }

    #[test]
    fn test_load_records_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = tokio_test::block_on(load_records(&dir.path().join("missing.json"))).unwrap_err();
        assert!(matches!(err, ProviderError::Io { .. }));
    }

    #[test]
    fn test_load_records_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"not\": \"an array\"}").unwrap();

        let err = tokio_test::block_on(load_records(file.path())).unwrap_err();
        assert!(matches!(err, ProviderError::Decode { .. }));
        assert!(err.to_string().starts_with("failed to decode"));
    }

    #[test]
    fn test_thresholds_response_shape() {
        let body = r#"{
            "silentArchitectThreshold": {"impact": 80, "activity": 50},
            "highPerformerThreshold": {"impact": 80, "activity": 80}
        }"#;
        let response: ThresholdsResponse = decode(body, "test").unwrap();
        assert_eq!(
            response.silent_architect_threshold,
            Thresholds {
                impact: 80.0,
                activity: 50.0
            }
        );
    }

    #[test]
    fn test_records_request_url() {
        let client = ApiClient::new("http://localhost:8000/api/v1/", 5).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api/v1");

        let all = client.records_request(&TeamFilter::All).unwrap();
        assert_eq!(all.method(), &reqwest::Method::GET);
        assert_eq!(all.url().path(), "/api/v1/dashboard/scatter");
        assert_eq!(all.url().query(), None);

        let team = client.records_request(&TeamFilter::parse("Data & ML")).unwrap();
        assert_eq!(team.url().path(), "/api/v1/dashboard/scatter");
        let pairs: Vec<(String, String)> = team.url().query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("team".to_string(), "Data & ML".to_string())]);
    }

    #[test]
    fn test_records_request_keeps_reserved_characters_in_team() {
        let client = ApiClient::new("http://localhost:8000/api/v1", 5).unwrap();
        let request = client
            .records_request(&TeamFilter::parse("R&D #2 / 50%"))
            .unwrap();
        let team: Vec<String> = request
            .url()
            .query_pairs()
            .filter(|(key, _)| key == "team")
            .map(|(_, value)| value.into_owned())
            .collect();
        assert_eq!(team, vec!["R&D #2 / 50%".to_string()]);
        assert_eq!(request.url().fragment(), None);
    }

    #[test]
    fn test_connect_failure_is_provider_error() {
        let client = ApiClient::new("http://127.0.0.1:9", 2).unwrap();
        let err = tokio_test::block_on(client.fetch_thresholds()).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Connect { .. } | ProviderError::Timeout { .. } | ProviderError::Request { .. }
        ));
    }
}
