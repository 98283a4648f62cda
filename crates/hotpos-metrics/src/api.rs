//! # Branch API Client
//!
//! [`BranchDataSource`] over the POS backend's REST API.
//!
//! ## Endpoints
//! ```text
//! GET /branches                                        → Branch[]
//! GET /sales/branch/{id}/range?startDate=&endDate=     → Sale[]
//! GET /stock/branch/{id}/low                           → StockItem[]
//! GET /dashboard/stats[?branchId=]                     → DashboardStats
//!
//! Authorization: Bearer <token>      (when configured)
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use hotpos_core::series::day_key;
use hotpos_core::{Branch, BranchId, BranchStats, SaleRecord, StockLevelRecord};

use crate::config::ApiSettings;
use crate::error::{MetricsError, MetricsResult};
use crate::source::BranchDataSource;

/// HTTP client for the branch API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
    timeout_secs: u64,
}

impl ApiClient {
    /// Builds a client from settings. Fails on a malformed base URL.
    pub fn new(settings: &ApiSettings) -> MetricsResult<Self> {
        let base_url = Url::parse(&settings.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(MetricsError::InvalidUrl(settings.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| MetricsError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(ApiClient {
            client,
            base_url,
            token: settings.token.clone(),
            timeout_secs: settings.timeout_secs,
        })
    }

    /// Appends path segments to the base URL, keeping any base path.
    fn endpoint(&self, segments: &[&str]) -> MetricsResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MetricsError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> MetricsResult<T> {
        debug!(%url, "GET");

        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = server_message(&body).unwrap_or_else(|| status_error(status));
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    MetricsError::Unauthorized(message)
                }
                _ => MetricsError::HttpStatus {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| MetricsError::DeserializationFailed(format!("{url}: {e}")))
    }

    fn transport_error(&self, err: reqwest::Error) -> MetricsError {
        if err.is_timeout() {
            return MetricsError::Timeout(self.timeout_secs);
        }
        if err.is_connect() {
            return MetricsError::ConnectionFailed(format!("Cannot reach API at {}", self.base_url));
        }
        err.into()
    }
}

/// Pulls `message` out of a JSON error body, if there is one.
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

fn status_error(status: StatusCode) -> String {
    match status.as_u16() {
        401 => "Session is invalid or expired".to_string(),
        403 => "Not permitted to view this branch".to_string(),
        404 => "Endpoint not found".to_string(),
        s if s >= 500 => format!("Server error (HTTP {s})"),
        s => format!("Unexpected response (HTTP {s})"),
    }
}

#[async_trait]
impl BranchDataSource for ApiClient {
    async fn list_branches(&self) -> MetricsResult<Vec<Branch>> {
        let url = self.endpoint(&["branches"])?;
        self.get_json(url).await
    }

    async fn sales_in_range(
        &self,
        branch: BranchId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> MetricsResult<Vec<SaleRecord>> {
        let id = branch.to_string();
        let mut url = self.endpoint(&["sales", "branch", &id, "range"])?;
        url.query_pairs_mut()
            .append_pair("startDate", &day_key(start))
            .append_pair("endDate", &day_key(end));
        self.get_json(url).await
    }

    async fn low_stock(&self, branch: BranchId) -> MetricsResult<Vec<StockLevelRecord>> {
        let id = branch.to_string();
        let url = self.endpoint(&["stock", "branch", &id, "low"])?;
        self.get_json(url).await
    }

    async fn dashboard_stats(&self, branch: Option<BranchId>) -> MetricsResult<BranchStats> {
        let mut url = self.endpoint(&["dashboard", "stats"])?;
        if let Some(id) = branch {
            url.query_pairs_mut().append_pair("branchId", &id.to_string());
        }
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiSettings {
            base_url: base.to_string(),
            token: Some("t0ken".into()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    /// Serves one canned response and hands back the raw request head.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/api", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });

        (base, handle)
    }

    #[tokio::test]
    async fn test_sales_range_request_and_decode() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"id":7,"branchId":4,"saleDate":"2026-10-02T11:00:00","grandTotal":250.75}]"#,
        )
        .await;
        let api = client(&base);

        let start = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 10, 7).unwrap();
        let sales = api.sales_in_range(BranchId(4), start, end).await.unwrap();

        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].branch_id, BranchId(4));
        assert_eq!(sales[0].grand_total.cents(), 25_075);

        let head = server.await.unwrap();
        assert!(head.starts_with(
            "GET /api/sales/branch/4/range?startDate=2026-10-01&endDate=2026-10-07 HTTP/1.1"
        ));
        assert!(head.to_lowercase().contains("authorization: bearer t0ken"));
    }

    #[tokio::test]
    async fn test_no_token_sends_no_authorization() {
        let (base, server) = serve_once("200 OK", r#"{"totalSalesToday":12.5}"#).await;
        let api = ApiClient::new(&ApiSettings {
            base_url: base,
            token: None,
            timeout_secs: 5,
        })
        .unwrap();

        let stats = api.dashboard_stats(Some(BranchId(2))).await.unwrap();
        assert_eq!(stats.total_sales_today.cents(), 1_250);

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /api/dashboard/stats?branchId=2 HTTP/1.1"));
        assert!(!head.to_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_error() {
        let (base, server) = serve_once("401 Unauthorized", "").await;
        let err = client(&base).list_branches().await.unwrap_err();

        assert!(matches!(
            err,
            MetricsError::Unauthorized(ref m) if m == "Session is invalid or expired"
        ));
        assert!(err.is_auth_error());
        assert!(!err.is_retryable());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_forbidden_maps_to_auth_error() {
        let (base, server) = serve_once("403 Forbidden", r#"{"message":"Branch 4 is not yours"}"#).await;
        let err = client(&base).low_stock(BranchId(4)).await.unwrap_err();

        assert!(matches!(err, MetricsError::Unauthorized(ref m) if m == "Branch 4 is not yours"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_keeps_body_message() {
        let (base, server) = serve_once(
            "500 Internal Server Error",
            r#"{"status":500,"message":"Database unavailable"}"#,
        )
        .await;
        let err = client(&base).low_stock(BranchId(1)).await.unwrap_err();

        match &err {
            MetricsError::HttpStatus { status, message } => {
                assert_eq!(*status, 500);
                assert_eq!(message, "Database unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_retryable());

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /api/stock/branch/1/low HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_deserialization_error() {
        let (base, server) = serve_once("200 OK", r#"{"not":"a list"}"#).await;
        let err = client(&base).list_branches().await.unwrap_err();

        assert!(matches!(err, MetricsError::DeserializationFailed(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_api_is_retryable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/api", listener.local_addr().unwrap());
        drop(listener);

        let err = client(&base).list_branches().await.unwrap_err();
        assert!(matches!(err, MetricsError::ConnectionFailed(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = client("http://localhost:8081/api");
        let url = api.endpoint(&["stock", "branch", "4", "low"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8081/api/stock/branch/4/low");

        let api = client("http://localhost:8081/api/");
        let url = api.endpoint(&["branches"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8081/api/branches");
    }

    #[test]
    fn test_rejects_non_base_url() {
        let err = ApiClient::new(&ApiSettings {
            base_url: "mailto:ops@example.com".into(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(status_error(StatusCode::NOT_FOUND), "Endpoint not found");
        assert_eq!(status_error(StatusCode::BAD_GATEWAY), "Server error (HTTP 502)");
        assert_eq!(status_error(StatusCode::IM_A_TEAPOT), "Unexpected response (HTTP 418)");
    }

    #[test]
    fn test_server_message_extraction() {
        assert_eq!(
            server_message(r#"{"status":404,"message":"Branch not found"}"#).as_deref(),
            Some("Branch not found")
        );
        assert_eq!(server_message(r#"{"message":"  "}"#), None);
        assert_eq!(server_message("<html>Bad Gateway</html>"), None);
    }
}
