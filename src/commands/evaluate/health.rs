use super::*;

const HEALTHY: &str = "healthy";

#[derive(Debug, Clone, Deserialize)]
pub struct HealthPayload {
    pub overall: String,
    pub components: BTreeMap<String, ComponentHealth>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentHealth {
    pub status: String,
}

impl HealthPayload {
    pub fn is_healthy(&self) -> bool {
        self.overall == HEALTHY
    }
}

/// Fetches and parses the health payload. Transport failures, non-200
/// responses and malformed payloads are all errors.
pub fn probe_health(client: &Client, endpoint: &str, timeout: Duration) -> Result<HealthPayload> {
    let response = client
        .get(endpoint)
        .timeout(timeout)
        .send()
        .with_context(|| format!("health request to {endpoint} failed"))?;

    let status = response.status();
    if status != StatusCode::OK {
        bail!("health endpoint {endpoint} returned {status}");
    }

    let body = response
        .text()
        .with_context(|| format!("failed to read health response from {endpoint}"))?;
    parse_health_payload(&body)
}

pub fn parse_health_payload(body: &str) -> Result<HealthPayload> {
    serde_json::from_str(body).context("malformed health payload")
}

/// Probes the service and refuses to continue unless it reports healthy.
pub fn ensure_healthy(client: &Client, endpoint: &str, timeout: Duration) -> Result<HealthPayload> {
    let payload = probe_health(client, endpoint, timeout).context("service health check failed")?;

    info!(overall = %payload.overall, endpoint, "service health");
    for (component, health) in &payload.components {
        info!(component = %component, status = %health.status, "component health");
    }

    if !payload.is_healthy() {
        bail!(
            "service at {endpoint} is not healthy (overall status: {})",
            payload.overall
        );
    }

    Ok(payload)
}
