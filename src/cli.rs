use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "intent-eval",
    version,
    about = "Difficulty-stratified accuracy and latency evaluation for a query intent classifier"
)]
pub struct Cli {
    #[arg(
        long,
        default_value = "tests/test-suites/difficulty-stratified-balanced-250.json"
    )]
    pub test_suite: PathBuf,

    /// Recorded in the run metadata only; the service picks its classifier at startup.
    #[arg(long, default_value_t = false)]
    pub use_hybrid: bool,

    #[arg(long, default_value = "http://localhost:8000")]
    pub api_base: String,

    #[arg(long, default_value = "monitoring/stratified")]
    pub results_dir: PathBuf,

    #[arg(long, default_value_t = 10)]
    pub limit: u32,

    #[arg(long, default_value_t = 30)]
    pub query_timeout_secs: u64,

    #[arg(long, default_value_t = 10)]
    pub health_timeout_secs: u64,

    #[arg(long, default_value_t = 100)]
    pub pause_ms: u64,
}

impl Cli {
    pub fn query_endpoint(&self) -> String {
        format!("{}/api/v1/query/", self.api_base.trim_end_matches('/'))
    }

    pub fn health_endpoint(&self) -> String {
        format!("{}/api/v1/query/health", self.api_base.trim_end_matches('/'))
    }
}
