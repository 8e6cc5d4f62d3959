//! Mock classifier for exercising the HTTP surface without a model artifact.

use crate::services::classifier::Classifier;
use async_trait::async_trait;
use service_core::error::AppError;
use tract_onnx::prelude::*;

/// Answers every prediction with a fixed probability vector.
pub struct MockClassifier {
    probabilities: Vec<f32>,
}

impl MockClassifier {
    pub fn new(probabilities: Vec<f32>) -> Self {
        Self { probabilities }
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    fn output_len(&self) -> usize {
        self.probabilities.len()
    }

    async fn predict(&self, _input: Tensor) -> Result<Vec<f32>, AppError> {
        Ok(self.probabilities.clone())
    }
}
