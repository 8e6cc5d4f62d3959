//! Class labels and the risk scale derived from them.

use std::collections::HashMap;

/// Labels the model was trained with, in output-layer order.
pub const DEFAULT_CLASS_LABELS: [&str; 4] = ["High", "Low", "Moderate", "invalid"];

/// Risk assigned to labels missing from the standard scale.
pub const DEFAULT_RISK_SCORE: i32 = 1;

const RISK_SCORES: [(&str, i32); 4] = [("High", 3), ("Moderate", 2), ("Low", 1), ("invalid", 0)];

/// Ordered label set aligned with the model's output width.
#[derive(Debug, Clone)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    /// Parses a comma-separated label override, trimming whitespace and
    /// dropping empty entries.
    pub fn parse_override(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }

    pub fn default_labels() -> Vec<String> {
        DEFAULT_CLASS_LABELS.iter().map(|s| s.to_string()).collect()
    }

    /// Aligns configured labels with the number of classes the model actually
    /// outputs: missing positions are filled with `class_{i}`, extras are
    /// dropped. A mismatch is logged but never fatal.
    pub fn reconcile(mut labels: Vec<String>, output_len: usize) -> Self {
        if labels.len() != output_len {
            tracing::warn!(
                configured = labels.len(),
                model_outputs = output_len,
                "Class label count does not match model output width; padding or truncating"
            );
        }
        if labels.len() < output_len {
            for i in labels.len()..output_len {
                labels.push(format!("class_{}", i));
            }
        } else {
            labels.truncate(output_len);
        }
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|s| s.as_str())
    }
}

/// Maps predicted labels onto the 0..=3 risk scale.
#[derive(Debug, Clone)]
pub struct RiskMap {
    scores: HashMap<String, i32>,
}

impl RiskMap {
    pub fn standard() -> Self {
        let scores = RISK_SCORES
            .iter()
            .map(|(label, score)| (label.to_string(), *score))
            .collect();
        Self { scores }
    }

    /// Unknown labels, including synthetic `class_{i}` fills, score 1.
    pub fn score(&self, label: &str) -> i32 {
        self.scores.get(label).copied().unwrap_or(DEFAULT_RISK_SCORE)
    }
}
