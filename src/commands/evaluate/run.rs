use std::io::{self, Write};

use super::*;

#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub results: PathBuf,
    pub summary: PathBuf,
    pub confusion: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(results_dir: &Path) -> Self {
        Self {
            results: results_dir.join(RESULTS_FILE_NAME),
            summary: results_dir.join(SUMMARY_FILE_NAME),
            confusion: results_dir.join(CONFUSION_FILE_NAME),
        }
    }
}

pub fn run(args: Cli) -> Result<()> {
    let query_endpoint = args.query_endpoint();
    let health_endpoint = args.health_endpoint();

    let suite_name = args
        .test_suite
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!(
        test_suite = %suite_name,
        hybrid_classifier = args.use_hybrid,
        "starting difficulty-stratified evaluation"
    );
    if args.use_hybrid {
        info!("hybrid classification is chosen at service startup; flag is recorded in run metadata only");
    }

    let suite = load_test_suite(&args.test_suite)?;
    let test_suite_sha256 = sha256_file(&args.test_suite)?;
    info!(
        path = %args.test_suite.display(),
        total = suite.queries.len(),
        easy = suite.count_by_difficulty(Difficulty::Easy),
        medium = suite.count_by_difficulty(Difficulty::Medium),
        hard = suite.count_by_difficulty(Difficulty::Hard),
        "loaded test queries"
    );

    let client = Client::builder()
        .build()
        .context("failed to build http client")?;
    ensure_healthy(
        &client,
        &health_endpoint,
        Duration::from_secs(args.health_timeout_secs),
    )?;

    info!(endpoint = %query_endpoint, "running stratified queries (cache disabled)");
    let runner = QueryRunner::new(
        client,
        query_endpoint.clone(),
        args.limit,
        Duration::from_secs(args.query_timeout_secs),
    );
    let results = run_suite(&runner, &suite.queries, Duration::from_millis(args.pause_ms));

    info!("calculating metrics");
    let metrics = compute_metrics(&results);
    if let EvaluationMetrics::NoSuccessfulQueries(marker) = &metrics {
        warn!(total = marker.total_queries, "{}", marker.error);
    }

    let run_metadata = RunMetadata {
        timestamp: now_utc_string(),
        total_queries: suite.queries.len(),
        test_suite: args.test_suite.display().to_string(),
        test_suite_sha256,
        hybrid_classifier_enabled: args.use_hybrid,
        api_endpoint: query_endpoint,
        query_limit: args.limit,
    };
    let summary = format_summary(&metrics, &run_metadata);
    let confusion = format_confusion_matrix(metrics.confusion_matrix());

    let paths = ArtifactPaths::in_dir(&args.results_dir);
    write_artifacts(&paths, &run_metadata, &results, &metrics, &summary, &confusion)?;
    print_reports(&summary, &confusion)?;

    info!(
        results = %paths.results.display(),
        summary = %paths.summary.display(),
        confusion_matrix = %paths.confusion.display(),
        "difficulty-stratified evaluation complete"
    );

    Ok(())
}

pub fn load_test_suite(path: &Path) -> Result<TestSuite> {
    if !path.exists() {
        bail!("test suite not found: {}", path.display());
    }

    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse test suite {}", path.display()))
}

/// Runs every query in corpus order, pausing between queries so the service
/// is not flooded. A failed query never stops the run.
pub fn run_suite(runner: &QueryRunner, queries: &[QuerySpec], pause: Duration) -> Vec<QueryResult> {
    let total = queries.len();
    let mut results = Vec::with_capacity(total);

    for (position, spec) in queries.iter().enumerate() {
        if position > 0 && !pause.is_zero() {
            thread::sleep(pause);
        }
        results.push(runner.run_query(spec, position + 1, total));
    }

    results
}

pub fn write_artifacts(
    paths: &ArtifactPaths,
    run_metadata: &RunMetadata,
    results: &[QueryResult],
    metrics: &EvaluationMetrics,
    summary: &str,
    confusion: &str,
) -> Result<()> {
    let document = ResultsDocument {
        test_run: run_metadata,
        results,
        metrics,
    };

    write_json_pretty(&paths.results, &document)?;
    info!(path = %paths.results.display(), "wrote detailed results");

    write_text(&paths.summary, summary)?;
    info!(path = %paths.summary.display(), "wrote summary");

    write_text(&paths.confusion, confusion)?;
    info!(path = %paths.confusion.display(), "wrote confusion matrix");

    Ok(())
}

fn print_reports(summary: &str, confusion: &str) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "{summary}")?;
    writeln!(output, "{confusion}")?;
    output.flush()?;
    Ok(())
}
