use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Pass,
    Warn,
    Fail,
}

impl Marker {
    fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "[PASS]",
            Self::Warn => "[WARN]",
            Self::Fail => "[FAIL]",
        }
    }

    fn graded(accuracy: f64, pass_at: f64, warn_at: f64) -> Self {
        if accuracy >= pass_at {
            Self::Pass
        } else if accuracy >= warn_at {
            Self::Warn
        } else {
            Self::Fail
        }
    }
}

pub fn format_summary(metrics: &EvaluationMetrics, run: &RunMetadata) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut summary = vec![
        rule.clone(),
        "DIFFICULTY-STRATIFIED PERFORMANCE TEST RESULTS".to_string(),
        format!("Date: {}", run.timestamp),
        format!("Test Suite: {}", run.test_suite),
        format!(
            "Hybrid Classifier: {}",
            if run.hybrid_classifier_enabled {
                "enabled (reported only)"
            } else {
                "disabled"
            }
        ),
        rule.clone(),
        String::new(),
    ];

    match metrics {
        EvaluationMetrics::Report(report) => push_report(&mut summary, report),
        EvaluationMetrics::NoSuccessfulQueries(marker) => {
            summary.push("Overall Results".to_string());
            summary.push(format!("   Total Queries:      {}", marker.total_queries));
            summary.push(format!("   Failed:             {}", marker.failed_queries));
            summary.push(format!("   {}", marker.error));
            summary.push(String::new());
        }
    }

    summary.push(rule);
    summary.join("\n")
}

fn push_report(summary: &mut Vec<String>, report: &MetricsReport) {
    let overall = &report.overall;
    summary.push("Overall Results".to_string());
    summary.push(format!("   Total Queries:      {}", overall.total_queries));
    summary.push(format!(
        "   Successful:         {} ({:.1}%)",
        overall.successful_queries, overall.success_rate
    ));
    summary.push(format!("   Failed:             {}", overall.failed_queries));
    summary.push(format!(
        "   Overall Accuracy:   {:.1}% ({}/{})",
        overall.overall_accuracy, overall.correct_count, overall.total_count
    ));
    summary.push(String::new());

    let latency = &report.latency;
    summary.push("Query Latency".to_string());
    summary.push(format!("   P50 (median):       {:.3}s", latency.p50_seconds));
    summary.push(format!("   P90:                {:.3}s", latency.p90_seconds));
    summary.push(format!("   P99:                {:.3}s", latency.p99_seconds));
    summary.push(format!("   Mean:               {:.3}s", latency.mean_seconds));
    summary.push(format!(
        "   Range:              {:.3}s - {:.3}s",
        latency.min_seconds, latency.max_seconds
    ));
    summary.push(String::new());

    summary.push("Accuracy by Difficulty Tier".to_string());
    for (difficulty, tier) in &report.by_difficulty {
        summary.push(format!(
            "   {:<8}: {} {:.1}% ({}/{}) | Avg Latency: {:.3}s",
            difficulty.label(),
            Marker::graded(tier.accuracy, 95.0, 80.0).as_str(),
            tier.accuracy,
            tier.correct,
            tier.total,
            tier.avg_latency
        ));
    }
    summary.push(String::new());

    for difficulty in Difficulty::ALL {
        summary.push(format!("Intent Breakdown - {} Tier", difficulty.label()));
        if let Some(intents) = report.intent_by_difficulty.get(&difficulty) {
            for (intent, counts) in intents {
                summary.push(format_intent_line(
                    *intent,
                    counts,
                    Marker::graded(counts.accuracy, 100.0, 80.0),
                ));
            }
        }
        summary.push(String::new());
    }

    summary.push("Overall Intent Accuracy (All Tiers)".to_string());
    for (intent, counts) in &report.intent_overall {
        summary.push(format_intent_line(
            *intent,
            counts,
            Marker::graded(counts.accuracy, 95.0, 80.0),
        ));
    }
    summary.push(String::new());

    let routing = &report.database_routing;
    summary.push("Database Routing".to_string());
    summary.push(format!(
        "   Most Used:          {}",
        routing.most_used.as_deref().unwrap_or("none")
    ));
    summary.push(String::new());
    summary.push("   Usage Distribution:".to_string());
    for (database, count) in routing.ranked() {
        summary.push(format!("      {database:<12}: {count} queries"));
    }
    summary.push(String::new());

    push_failure_analysis(summary, &report.failure_analysis);
    push_success_criteria(summary, report);
}

fn format_intent_line(intent: Intent, counts: &AccuracyCounts, marker: Marker) -> String {
    format!(
        "   {:<10}: {} {:.1}% ({}/{})",
        intent.as_str(),
        marker.as_str(),
        counts.accuracy,
        counts.correct,
        counts.total
    )
}

fn push_failure_analysis(summary: &mut Vec<String>, failures: &FailureAnalysis) {
    if failures.total_failures == 0 {
        return;
    }

    summary.push("Failure Analysis".to_string());
    summary.push(format!("   Total Failures:     {}", failures.total_failures));
    summary.push(String::new());
    summary.push("   By Difficulty:".to_string());
    for (difficulty, tier) in &failures.by_difficulty {
        summary.push(format!(
            "      {:<8}: {} failures ({:.1}%)",
            difficulty.label(),
            tier.count,
            tier.percentage
        ));
    }
    summary.push(String::new());

    if !failures.examples.is_empty() {
        summary.push("   Example Failures:".to_string());
        for (position, example) in failures
            .examples
            .iter()
            .take(SUMMARY_FAILURE_EXAMPLES)
            .enumerate()
        {
            summary.push(String::new());
            summary.push(format!(
                "   {}. [{}] {}",
                position + 1,
                example.difficulty.as_str().to_ascii_uppercase(),
                example.query
            ));
            summary.push(format!(
                "      Expected: {} | Actual: {}",
                example.expected, example.actual
            ));
            summary.push(format!("      Rationale: {}", example.rationale));
        }
    }
    summary.push(String::new());
}

fn push_success_criteria(summary: &mut Vec<String>, report: &MetricsReport) {
    summary.push("Success Criteria Evaluation".to_string());
    for difficulty in Difficulty::ALL {
        let accuracy = report.tier_accuracy(difficulty);
        let target = difficulty.accuracy_target();
        let marker = if accuracy >= target {
            Marker::Pass
        } else {
            Marker::Fail
        };
        let criterion = format!("{} tier >={target:.0}%:", difficulty.label());
        summary.push(format!(
            "   {criterion:<20}{} (actual: {accuracy:.1}%)",
            marker.as_str()
        ));
    }
    summary.push(String::new());
}
