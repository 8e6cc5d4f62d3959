//! Classifier seam and the ONNX-backed implementation.

use crate::services::preprocess::{IMG_CHANNELS, IMG_HEIGHT, IMG_WIDTH};
use async_trait::async_trait;
use service_core::error::AppError;
use std::sync::Arc;
use tract_onnx::prelude::*;

/// Boundary between the HTTP layer and the model runtime, so tests can swap
/// in a deterministic implementation.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Number of classes in the model's output layer.
    fn output_len(&self) -> usize;

    /// Runs the model on a preprocessed input tensor and returns the raw
    /// per-class probabilities.
    async fn predict(&self, input: Tensor) -> Result<Vec<f32>, AppError>;
}

/// Classifier running entirely in-process via tract.
pub struct OnnxClassifier {
    plan: Arc<TypedRunnableModel<TypedModel>>,
    output_len: usize,
}

impl OnnxClassifier {
    /// Loads the artifact, pins its input to a `[1, 224, 224, 3]` f32 tensor
    /// and measures the output width with a dummy forward pass.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let input_shape = [1, IMG_HEIGHT as usize, IMG_WIDTH as usize, IMG_CHANNELS];

        let model = tract_onnx::onnx().model_for_path(path).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("failed to read model at '{}': {}", path, e))
        })?;

        let plan = model
            .with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), input_shape))
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("failed to pin model input: {}", e)))?
            .into_optimized()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("failed to optimize model: {}", e)))?
            .into_runnable()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("failed to plan model: {}", e)))?;

        // The output width is discovered, not configured: run zeros through
        // once and count the elements that come out.
        let dummy =
            tract_ndarray::ArrayD::<f32>::zeros(tract_ndarray::IxDyn(&input_shape)).into_tvalue();
        let outputs = plan
            .run(tvec!(dummy))
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("model warmup run failed: {}", e)))?;
        let output_len = outputs.first().map(|output| output.len()).unwrap_or(0);
        if output_len == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "model produced an empty output layer"
            )));
        }

        Ok(Self {
            plan: Arc::new(plan),
            output_len,
        })
    }
}

#[async_trait]
impl Classifier for OnnxClassifier {
    fn output_len(&self) -> usize {
        self.output_len
    }

    async fn predict(&self, input: Tensor) -> Result<Vec<f32>, AppError> {
        let plan = self.plan.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<f32>, AppError> {
            let outputs = plan
                .run(tvec!(input.into_tvalue()))
                .map_err(|e| AppError::InternalError(anyhow::anyhow!("inference failed: {}", e)))?;
            let output = outputs.first().ok_or_else(|| {
                AppError::InternalError(anyhow::anyhow!("model produced no outputs"))
            })?;
            let probabilities = output.to_array_view::<f32>().map_err(|e| {
                AppError::InternalError(anyhow::anyhow!("failed to read model output: {}", e))
            })?;
            Ok(probabilities.iter().copied().collect())
        })
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("inference task failed: {}", e)))?
    }
}
