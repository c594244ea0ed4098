use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cli::Cli;
use crate::model::{
    Difficulty, Intent, QueryOutcome, QueryResult, QuerySpec, ResultsDocument, RunMetadata,
    TestSuite,
};
use crate::util::{now_utc_string, sha256_file, truncate_chars, write_json_pretty, write_text};

const RESULTS_FILE_NAME: &str = "stratified_results.json";
const SUMMARY_FILE_NAME: &str = "stratified_summary.txt";
const CONFUSION_FILE_NAME: &str = "confusion_matrix.txt";
const NO_SUCCESSFUL_QUERIES: &str = "No successful queries";
const CACHE_DISABLED_NOTE: &str = "Cache disabled for testing";
const MAX_FAILURE_EXAMPLES: usize = 10;
const SUMMARY_FAILURE_EXAMPLES: usize = 5;
const QUERY_PREVIEW_CHARS: usize = 60;
const RULE_WIDTH: usize = 80;

mod confusion;
mod formatting;
mod health;
mod latency;
mod metrics;
mod run;
mod runner;

use self::confusion::*;
use self::formatting::*;
use self::health::*;
use self::latency::*;
use self::metrics::*;
use self::runner::*;

pub use self::run::run;
