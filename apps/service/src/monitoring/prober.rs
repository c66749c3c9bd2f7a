use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::types::ProbeOutcome;
use crate::database::models::MonitoredService;

/// One reachability check against a service's URL.
///
/// A probe never fails: every transport fault collapses into a
/// `{is_up: false, status_code: 0}` outcome. That failure is the signal.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, service: &MonitoredService) -> ProbeOutcome;
}

/// HEAD-request prober with an HTTPS→HTTP downgrade retry.
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self> {
        // Redirects are followed by default; an existence check does not
        // need the body, so HEAD is enough.
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn head(&self, url: &str) -> Result<u16, reqwest::Error> {
        let response = self.client.head(url).send().await?;
        Ok(response.status().as_u16())
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, service: &MonitoredService) -> ProbeOutcome {
        match self.head(&service.url).await {
            Ok(status_code) => ProbeOutcome::from_status_code(status_code),
            Err(err) => {
                // TLS handshake, connect or timeout failure on an https
                // target: try the plain-http equivalent once before
                // declaring the service down. Other schemes are not retried.
                if let Some(fallback) = http_fallback_url(&service.url) {
                    debug!(url = %service.url, error = %err, "https probe failed, retrying over http");
                    match self.head(&fallback).await {
                        Ok(status_code) => return ProbeOutcome::from_status_code(status_code),
                        Err(fallback_err) => {
                            debug!(url = %fallback, error = %fallback_err, "http fallback failed");
                        }
                    }
                } else {
                    debug!(url = %service.url, error = %err, "probe failed");
                }
                ProbeOutcome::unreachable()
            }
        }
    }
}

fn http_fallback_url(url: &str) -> Option<String> {
    url.strip_prefix("https://").map(|rest| format!("http://{rest}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn service_with_url(url: &str) -> MonitoredService {
        MonitoredService {
            id: 1,
            name: "test".to_string(),
            url: url.to_string(),
            owner: "owner".to_string(),
            is_active: true,
            check_interval: 300,
            last_checked: None,
            last_status: crate::monitoring::types::ServiceStatus::Unknown,
            created_at: Utc::now(),
        }
    }

    /// Plain-TCP listener answering every request with a fixed status line.
    async fn spawn_http_server(status_line: &'static str) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = stream.read(&mut buf).await;
                    let response = format!(
                        "HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                });
            }
        });
        addr
    }

    fn prober() -> HttpProber {
        HttpProber::new(Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn responding_endpoint_is_up() {
        let addr = spawn_http_server("200 OK").await;
        let outcome = prober().probe(&service_with_url(&format!("http://{addr}"))).await;
        assert!(outcome.is_up);
        assert_eq!(outcome.status_code, 200);
    }

    #[tokio::test]
    async fn error_status_is_down_with_code() {
        let addr = spawn_http_server("500 Internal Server Error").await;
        let outcome = prober().probe(&service_with_url(&format!("http://{addr}"))).await;
        assert!(!outcome.is_up);
        assert_eq!(outcome.status_code, 500);
    }

    #[tokio::test]
    async fn https_failure_falls_back_to_http() {
        // The listener speaks plain HTTP, so the https attempt fails the
        // TLS handshake and only the downgraded retry succeeds.
        let addr = spawn_http_server("200 OK").await;
        let outcome = prober().probe(&service_with_url(&format!("https://{addr}"))).await;
        assert!(outcome.is_up);
        assert_eq!(outcome.status_code, 200);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_down_with_code_zero() {
        // Bind a port, then free it so the connection is refused.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let outcome = prober().probe(&service_with_url(&format!("http://{addr}"))).await;
        assert!(!outcome.is_up);
        assert_eq!(outcome.status_code, 0);
    }

    #[tokio::test]
    async fn malformed_url_is_down_not_a_crash() {
        let outcome = prober().probe(&service_with_url("not a url at all")).await;
        assert!(!outcome.is_up);
        assert_eq!(outcome.status_code, 0);
    }
}
