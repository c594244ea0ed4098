use std::fmt;

use serde::{Deserialize, Serialize};

/// Intent labels the classifier is expected to produce.
///
/// Declaration order is the report order (graph, temporal, semantic, metadata).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Graph,
    Temporal,
    Semantic,
    Metadata,
}

impl Intent {
    pub const ALL: [Intent; 4] = [
        Intent::Graph,
        Intent::Temporal,
        Intent::Semantic,
        Intent::Metadata,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Temporal => "temporal",
            Self::Semantic => "semantic",
            Self::Metadata => "metadata",
        }
    }

    /// Exact, case-sensitive match against the known labels.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|intent| intent.as_str() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Graph => "Graph",
            Self::Temporal => "Temporal",
            Self::Semantic => "Semantic",
            Self::Metadata => "Metadata",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    /// Minimum tier accuracy (percent) required by the success criteria.
    pub fn accuracy_target(self) -> f64 {
        match self {
            Self::Easy => 95.0,
            Self::Medium => 85.0,
            Self::Hard => 70.0,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Corpus file: `{ "queries": [ ... ] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuite {
    pub queries: Vec<QuerySpec>,
}

impl TestSuite {
    pub fn count_by_difficulty(&self, difficulty: Difficulty) -> usize {
        self.queries
            .iter()
            .filter(|query| query.difficulty == difficulty)
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySpec {
    #[serde(default)]
    pub id: Option<String>,
    pub query: String,
    /// Kept verbatim so labels outside the known set survive into the results.
    pub intent: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub difficulty_rationale: Option<String>,
}

impl QuerySpec {
    pub fn query_id(&self, index: usize) -> String {
        self.id.clone().unwrap_or_else(|| format!("q{index}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query_id: String,
    pub query: String,
    pub expected_intent: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub difficulty_rationale: String,
    pub latency_seconds: f64,
    pub timestamp: String,
    #[serde(flatten)]
    pub outcome: QueryOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum QueryOutcome {
    Success {
        actual_intent: String,
        intent_correct: bool,
        databases_used: Vec<String>,
        result_count: u64,
        cached: bool,
    },
    Error {
        error_code: u16,
        error_message: String,
    },
    Exception {
        error_message: String,
    },
}

impl QueryOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Error { .. } => "error",
            Self::Exception { .. } => "exception",
        }
    }
}

impl QueryResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, QueryOutcome::Success { .. })
    }

    /// `None` when the query failed; failed queries carry no correctness judgment.
    pub fn intent_correct(&self) -> Option<bool> {
        match &self.outcome {
            QueryOutcome::Success { intent_correct, .. } => Some(*intent_correct),
            _ => None,
        }
    }

    pub fn actual_intent(&self) -> Option<&str> {
        match &self.outcome {
            QueryOutcome::Success { actual_intent, .. } => Some(actual_intent.as_str()),
            _ => None,
        }
    }

    pub fn databases_used(&self) -> &[String] {
        match &self.outcome {
            QueryOutcome::Success { databases_used, .. } => databases_used.as_slice(),
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub timestamp: String,
    pub total_queries: usize,
    pub test_suite: String,
    pub test_suite_sha256: String,
    pub hybrid_classifier_enabled: bool,
    pub api_endpoint: String,
    pub query_limit: u32,
}

/// Layout of `stratified_results.json`.
#[derive(Debug, Serialize)]
pub struct ResultsDocument<'a, M: Serialize> {
    pub test_run: &'a RunMetadata,
    pub results: &'a [QueryResult],
    pub metrics: &'a M,
}
