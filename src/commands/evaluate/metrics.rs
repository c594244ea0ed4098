use super::*;

/// Outcome of aggregation. Without a single successful query there is
/// nothing to compute accuracy or latency over, so only the marker is kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EvaluationMetrics {
    Report(Box<MetricsReport>),
    NoSuccessfulQueries(NoSuccessfulQueries),
}

impl EvaluationMetrics {
    pub fn report(&self) -> Option<&MetricsReport> {
        match self {
            Self::Report(report) => Some(report.as_ref()),
            Self::NoSuccessfulQueries(_) => None,
        }
    }

    pub fn confusion_matrix(&self) -> &ConfusionMatrix {
        match self {
            Self::Report(report) => &report.confusion_matrix,
            Self::NoSuccessfulQueries(marker) => &marker.confusion_matrix,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoSuccessfulQueries {
    pub error: String,
    pub total_queries: usize,
    pub failed_queries: usize,
    pub confusion_matrix: ConfusionMatrix,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub overall: OverallMetrics,
    pub latency: LatencyMetrics,
    pub by_difficulty: BTreeMap<Difficulty, TierMetrics>,
    pub intent_by_difficulty: BTreeMap<Difficulty, BTreeMap<Intent, AccuracyCounts>>,
    pub intent_overall: BTreeMap<Intent, AccuracyCounts>,
    pub confusion_matrix: ConfusionMatrix,
    pub database_routing: DatabaseRouting,
    pub failure_analysis: FailureAnalysis,
    pub cache_performance: CachePerformance,
}

impl MetricsReport {
    pub fn tier_accuracy(&self, difficulty: Difficulty) -> f64 {
        self.by_difficulty
            .get(&difficulty)
            .map(|tier| tier.accuracy)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallMetrics {
    pub total_queries: usize,
    pub successful_queries: usize,
    pub failed_queries: usize,
    pub success_rate: f64,
    pub overall_accuracy: f64,
    pub correct_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierMetrics {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub avg_latency: f64,
    pub median_latency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccuracyCounts {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
}

impl AccuracyCounts {
    fn from_results<'a>(results: impl IntoIterator<Item = &'a QueryResult>) -> Option<Self> {
        let (total, correct) = results
            .into_iter()
            .fold((0usize, 0usize), |(total, correct), result| {
                let hit = result.intent_correct().unwrap_or(false);
                (total + 1, correct + usize::from(hit))
            });
        if total == 0 {
            return None;
        }

        Some(Self {
            total,
            correct,
            accuracy: percentage(correct, total),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseRouting {
    pub usage_counts: BTreeMap<String, usize>,
    pub most_used: Option<String>,
}

impl DatabaseRouting {
    /// Usage sorted by descending count, then by name.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut ranked = self
            .usage_counts
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect::<Vec<(&str, usize)>>();
        ranked.sort_by(|left, right| right.1.cmp(&left.1).then(left.0.cmp(right.0)));
        ranked
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureAnalysis {
    pub total_failures: usize,
    pub by_difficulty: BTreeMap<Difficulty, TierFailures>,
    pub examples: Vec<FailureExample>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierFailures {
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureExample {
    pub query: String,
    pub expected: String,
    pub actual: String,
    pub difficulty: Difficulty,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachePerformance {
    pub hit_rate: f64,
    pub note: String,
}

pub fn compute_metrics(results: &[QueryResult]) -> EvaluationMetrics {
    let confusion_matrix = build_confusion_matrix(results);
    let successful = results
        .iter()
        .filter(|result| result.is_success())
        .collect::<Vec<&QueryResult>>();

    let latencies = successful
        .iter()
        .map(|result| result.latency_seconds)
        .collect::<Vec<f64>>();
    let Some(latency) = summarize_latencies(&latencies) else {
        return EvaluationMetrics::NoSuccessfulQueries(NoSuccessfulQueries {
            error: NO_SUCCESSFUL_QUERIES.to_string(),
            total_queries: results.len(),
            failed_queries: results.len(),
            confusion_matrix,
        });
    };

    let correct_count = successful
        .iter()
        .filter(|result| result.intent_correct() == Some(true))
        .count();
    let overall = OverallMetrics {
        total_queries: results.len(),
        successful_queries: successful.len(),
        failed_queries: results.len() - successful.len(),
        success_rate: percentage(successful.len(), results.len()),
        overall_accuracy: percentage(correct_count, successful.len()),
        correct_count,
        total_count: successful.len(),
    };

    let mut by_difficulty = BTreeMap::new();
    let mut intent_by_difficulty = BTreeMap::new();
    for difficulty in Difficulty::ALL {
        let tier = successful
            .iter()
            .copied()
            .filter(|result| result.difficulty == difficulty)
            .collect::<Vec<&QueryResult>>();

        if let Some(metrics) = tier_metrics(&tier) {
            by_difficulty.insert(difficulty, metrics);
        }
        intent_by_difficulty.insert(difficulty, accuracy_by_intent(&tier));
    }

    EvaluationMetrics::Report(Box::new(MetricsReport {
        overall,
        latency,
        by_difficulty,
        intent_by_difficulty,
        intent_overall: accuracy_by_intent(&successful),
        confusion_matrix,
        database_routing: database_routing(&successful),
        failure_analysis: failure_analysis(&successful),
        cache_performance: CachePerformance {
            hit_rate: 0.0,
            note: CACHE_DISABLED_NOTE.to_string(),
        },
    }))
}

fn tier_metrics(tier: &[&QueryResult]) -> Option<TierMetrics> {
    let counts = AccuracyCounts::from_results(tier.iter().copied())?;
    let latencies = tier
        .iter()
        .map(|result| result.latency_seconds)
        .collect::<Vec<f64>>();

    Some(TierMetrics {
        total: counts.total,
        correct: counts.correct,
        accuracy: counts.accuracy,
        avg_latency: mean(&latencies)?,
        median_latency: median(&latencies)?,
    })
}

fn accuracy_by_intent(successful: &[&QueryResult]) -> BTreeMap<Intent, AccuracyCounts> {
    Intent::ALL
        .into_iter()
        .filter_map(|intent| {
            let matching = successful
                .iter()
                .copied()
                .filter(|result| result.expected_intent == intent.as_str());
            AccuracyCounts::from_results(matching).map(|counts| (intent, counts))
        })
        .collect()
}

fn database_routing(successful: &[&QueryResult]) -> DatabaseRouting {
    // Kept in first-seen order so ties for most-used go to the earliest database.
    let mut usage = Vec::<(String, usize)>::new();
    for result in successful {
        let mut seen = Vec::<&str>::new();
        for database in result.databases_used() {
            if seen.contains(&database.as_str()) {
                continue;
            }
            seen.push(database);

            match usage.iter_mut().find(|(name, _)| name == database) {
                Some((_, count)) => *count += 1,
                None => usage.push((database.clone(), 1)),
            }
        }
    }

    let mut most_used: Option<&(String, usize)> = None;
    for entry in &usage {
        if most_used.is_none_or(|best| entry.1 > best.1) {
            most_used = Some(entry);
        }
    }

    DatabaseRouting {
        most_used: most_used.map(|(name, _)| name.clone()),
        usage_counts: usage.iter().cloned().collect(),
    }
}

fn failure_analysis(successful: &[&QueryResult]) -> FailureAnalysis {
    let failures = successful
        .iter()
        .copied()
        .filter(|result| result.intent_correct() == Some(false))
        .collect::<Vec<&QueryResult>>();

    let mut by_difficulty = BTreeMap::new();
    for difficulty in Difficulty::ALL {
        let count = failures
            .iter()
            .filter(|result| result.difficulty == difficulty)
            .count();
        if count == 0 {
            continue;
        }
        let tier_total = successful
            .iter()
            .filter(|result| result.difficulty == difficulty)
            .count();
        by_difficulty.insert(
            difficulty,
            TierFailures {
                count,
                percentage: percentage(count, tier_total),
            },
        );
    }

    let examples = failures
        .iter()
        .take(MAX_FAILURE_EXAMPLES)
        .map(|result| FailureExample {
            query: result.query.clone(),
            expected: result.expected_intent.clone(),
            actual: result.actual_intent().unwrap_or_default().to_string(),
            difficulty: result.difficulty,
            rationale: result.difficulty_rationale.clone(),
        })
        .collect();

    FailureAnalysis {
        total_failures: failures.len(),
        by_difficulty,
        examples,
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}
