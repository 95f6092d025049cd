//! HTTP reachability probe.

use std::sync::Arc;
use std::time::Duration;

use crate::error::OpsResult;

/// Black-box endpoint probe: reachable or not, never an error.
/// Monitoring endpoints may legitimately still be warming up, so
/// callers treat `false` as a warning, not a failure.
pub struct HttpProbe {
    agent: ureq::Agent,
}

impl HttpProbe {
    /// Probe accepting self-signed certificates. The local test
    /// environment's Caddy serves its own internal CA.
    pub fn insecure(timeout: Duration) -> OpsResult<Self> {
        let tls = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true)
            .build()?;

        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .tls_connector(Arc::new(tls))
            .build();

        Ok(Self { agent })
    }

    /// Whether `url` answers 200, optionally with `expected`
    /// somewhere in the body (case-insensitive).
    #[must_use]
    pub fn reachable(&self, url: &str, expected: Option<&str>) -> bool {
        let Ok(response) = self.agent.get(url).call() else {
            return false;
        };
        if response.status() != 200 {
            return false;
        }

        match expected {
            None => true,
            Some(needle) => response
                .into_string()
                .is_ok_and(|body| body_contains(&body, needle)),
        }
    }
}

/// Case-insensitive substring check on a response body.
#[must_use]
pub fn body_contains(body: &str, needle: &str) -> bool {
    body.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_contains_is_case_insensitive() {
        assert!(body_contains("<title>Grafana</title>", "grafana"));
        assert!(body_contains("PROMETHEUS ready", "Prometheus"));
        assert!(!body_contains("loki ready", "grafana"));
    }

    #[test]
    fn unreachable_endpoint_reports_false_not_error() {
        let probe = HttpProbe::insecure(Duration::from_millis(500)).unwrap();
        assert!(!probe.reachable("http://127.0.0.1:9/", None));
    }
}
