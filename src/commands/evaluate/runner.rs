use super::*;

const UNKNOWN_INTENT: &str = "unknown";

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    limit: u32,
    use_cache: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    intent: Option<String>,
    #[serde(default)]
    databases_used: Vec<String>,
    #[serde(default)]
    result_count: u64,
    #[serde(default)]
    cached: bool,
}

/// Sends corpus queries to the classification service, one at a time.
#[derive(Debug, Clone)]
pub struct QueryRunner {
    client: Client,
    endpoint: String,
    limit: u32,
    timeout: Duration,
}

impl QueryRunner {
    pub fn new(client: Client, endpoint: impl Into<String>, limit: u32, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            limit,
            timeout,
        }
    }

    /// Executes `spec` exactly once. Failures are captured in the returned
    /// result rather than propagated.
    pub fn run_query(&self, spec: &QuerySpec, index: usize, total: usize) -> QueryResult {
        info!(
            "[{index}/{total}] ({}) {}",
            spec.difficulty.as_str().to_ascii_uppercase(),
            truncate_chars(&spec.query, QUERY_PREVIEW_CHARS)
        );

        let started = Instant::now();
        let exchange = self.send(&spec.query);
        let latency_seconds = started.elapsed().as_secs_f64();

        let outcome = match exchange {
            Ok((status, body)) => classify_response(status, &body, &spec.intent),
            Err(err) => QueryOutcome::Exception {
                error_message: format!("{err:#}"),
            },
        };
        log_outcome(&outcome, &spec.intent, latency_seconds);

        QueryResult {
            query_id: spec.query_id(index),
            query: spec.query.clone(),
            expected_intent: spec.intent.clone(),
            difficulty: spec.difficulty,
            difficulty_rationale: spec.difficulty_rationale.clone().unwrap_or_default(),
            latency_seconds,
            timestamp: now_utc_string(),
            outcome,
        }
    }

    fn send(&self, query: &str) -> Result<(StatusCode, String)> {
        let request = QueryRequest {
            query,
            limit: self.limit,
            use_cache: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .with_context(|| format!("query request to {} failed", self.endpoint))?;

        let status = response.status();
        let body = response
            .text()
            .with_context(|| format!("failed to read query response from {}", self.endpoint))?;
        Ok((status, body))
    }
}

/// Turns a raw HTTP exchange into an outcome. Correctness is a case-sensitive
/// comparison of the predicted and expected labels.
pub fn classify_response(status: StatusCode, body: &str, expected_intent: &str) -> QueryOutcome {
    if status != StatusCode::OK {
        return QueryOutcome::Error {
            error_code: status.as_u16(),
            error_message: body.to_string(),
        };
    }

    match serde_json::from_str::<QueryResponse>(body) {
        Ok(response) => {
            let actual_intent = response
                .intent
                .unwrap_or_else(|| UNKNOWN_INTENT.to_string());
            QueryOutcome::Success {
                intent_correct: actual_intent == expected_intent,
                actual_intent,
                databases_used: response.databases_used,
                result_count: response.result_count,
                cached: response.cached,
            }
        }
        Err(err) => QueryOutcome::Exception {
            error_message: format!("failed to parse query response: {err}"),
        },
    }
}

fn log_outcome(outcome: &QueryOutcome, expected_intent: &str, latency_seconds: f64) {
    let latency = format!("{latency_seconds:.3}s");
    match outcome {
        QueryOutcome::Success {
            actual_intent,
            intent_correct,
            ..
        } => info!(
            latency = %latency,
            intent = %actual_intent,
            expected = %expected_intent,
            correct = *intent_correct,
            "query classified"
        ),
        QueryOutcome::Error { error_code, .. } => warn!(
            outcome = outcome.status(),
            latency = %latency,
            http_status = *error_code,
            "query failed"
        ),
        QueryOutcome::Exception { error_message } => warn!(
            outcome = outcome.status(),
            latency = %latency,
            error = %error_message,
            "query failed"
        ),
    }
}
