use super::*;

/// Counts of observed intents for one expected intent. Anything outside the
/// known labels, including failed queries, lands in `unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionRow {
    pub graph: usize,
    pub temporal: usize,
    pub semantic: usize,
    pub metadata: usize,
    pub unknown: usize,
}

impl ConfusionRow {
    pub fn get(&self, predicted: Intent) -> usize {
        match predicted {
            Intent::Graph => self.graph,
            Intent::Temporal => self.temporal,
            Intent::Semantic => self.semantic,
            Intent::Metadata => self.metadata,
        }
    }

    fn cell_mut(&mut self, predicted: Option<Intent>) -> &mut usize {
        match predicted {
            Some(Intent::Graph) => &mut self.graph,
            Some(Intent::Temporal) => &mut self.temporal,
            Some(Intent::Semantic) => &mut self.semantic,
            Some(Intent::Metadata) => &mut self.metadata,
            None => &mut self.unknown,
        }
    }

    pub fn total(&self) -> usize {
        self.graph + self.temporal + self.semantic + self.metadata + self.unknown
    }

    pub fn misclassified(&self, expected: Intent) -> usize {
        self.total() - self.get(expected)
    }
}

/// Expected intent (rows) against observed intent (columns).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub graph: ConfusionRow,
    pub temporal: ConfusionRow,
    pub semantic: ConfusionRow,
    pub metadata: ConfusionRow,
}

impl ConfusionMatrix {
    pub fn row(&self, expected: Intent) -> &ConfusionRow {
        match expected {
            Intent::Graph => &self.graph,
            Intent::Temporal => &self.temporal,
            Intent::Semantic => &self.semantic,
            Intent::Metadata => &self.metadata,
        }
    }

    fn row_mut(&mut self, expected: Intent) -> &mut ConfusionRow {
        match expected {
            Intent::Graph => &mut self.graph,
            Intent::Temporal => &mut self.temporal,
            Intent::Semantic => &mut self.semantic,
            Intent::Metadata => &mut self.metadata,
        }
    }

    pub fn cell(&self, expected: Intent, predicted: Intent) -> usize {
        self.row(expected).get(predicted)
    }

    pub fn unknown(&self, expected: Intent) -> usize {
        self.row(expected).unknown
    }
}

/// Built over every result. Results whose expected label is not a known
/// intent are skipped; failed results have no prediction and count as unknown.
pub fn build_confusion_matrix(results: &[QueryResult]) -> ConfusionMatrix {
    let mut matrix = ConfusionMatrix::default();

    for result in results {
        let Some(expected) = Intent::parse(&result.expected_intent) else {
            continue;
        };
        let predicted = result.actual_intent().and_then(Intent::parse);
        *matrix.row_mut(expected).cell_mut(predicted) += 1;
    }

    matrix
}

pub fn format_confusion_matrix(confusion: &ConfusionMatrix) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut lines = Vec::new();

    lines.push(String::new());
    lines.push(rule.clone());
    lines.push("CONFUSION MATRIX - Intent Classification".to_string());
    lines.push(rule.clone());
    lines.push(String::new());
    lines.push("Predicted Intent (columns) vs Expected Intent (rows):".to_string());
    lines.push(String::new());

    let mut header = "Expected      |".to_string();
    for intent in Intent::ALL {
        header.push_str(&format!(" {:<10} |", intent.as_str()));
    }
    header.push_str(" unknown |");
    lines.push(header.clone());
    lines.push("-".repeat(header.chars().count()));

    for expected in Intent::ALL {
        let mut row = format!("{:<13} |", expected.as_str());
        for predicted in Intent::ALL {
            row.push_str(&format!(" {:>10} |", confusion.cell(expected, predicted)));
        }
        row.push_str(&format!(" {:>7} |", confusion.unknown(expected)));
        lines.push(row);
    }

    lines.push(String::new());
    lines.push("Confusion Summary:".to_string());
    for expected in Intent::ALL {
        let row = confusion.row(expected);
        if row.misclassified(expected) == 0 {
            continue;
        }

        lines.push(String::new());
        lines.push(format!("{} queries misclassified as:", expected.label()));
        for predicted in Intent::ALL.into_iter().filter(|intent| *intent != expected) {
            let count = row.get(predicted);
            if count > 0 {
                lines.push(format!("  - {predicted}: {count} queries"));
            }
        }
        if row.unknown > 0 {
            lines.push(format!("  - unknown: {} queries", row.unknown));
        }
    }

    lines.push(rule);
    lines.join("\n")
}
