use crate::dtos::{PredictRequest, PredictionResponse, parse_photo_data_uri};
use crate::services::preprocess;
use crate::startup::AppState;
use axum::{
    Json,
    extract::{FromRequest, Multipart, Request, State},
    http::header,
    response::IntoResponse,
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use metrics::{counter, histogram};
use service_core::error::AppError;
use std::collections::BTreeMap;
use std::time::Instant;

const NO_IMAGE_MESSAGE: &str =
    "No image provided. Send multipart/form-data 'photo' or JSON 'photoBase64'.";

/// Upload shapes accepted by the predict endpoint.
enum IncomingImage {
    Multipart { original_name: String, data: Vec<u8> },
    Base64 { extension: String, data: Vec<u8> },
}

impl IncomingImage {
    fn data(&self) -> &[u8] {
        match self {
            IncomingImage::Multipart { data, .. } => data,
            IncomingImage::Base64 { data, .. } => data,
        }
    }
}

/// Classifies an uploaded image.
///
/// The image arrives either as a multipart `photo` field or as a JSON body
/// with a `photoBase64` data URI. It is persisted to the upload folder
/// before inference, so failed predictions still leave the file behind for
/// inspection.
pub async fn predict(
    State(state): State<AppState>,
    req: Request,
) -> Result<impl IntoResponse, AppError> {
    let image = extract_image(req).await?;

    let saved = match &image {
        IncomingImage::Multipart {
            original_name,
            data,
        } => state.uploads.save_multipart(original_name, data).await?,
        IncomingImage::Base64 { extension, data } => {
            state.uploads.save_base64(extension, data).await?
        }
    };
    tracing::info!(
        path = %saved.public_path,
        bytes = image.data().len(),
        "Stored incoming image"
    );

    let input = preprocess::image_to_tensor(image.data())?;

    let started = Instant::now();
    let probabilities = state.classifier.predict(input).await?;
    histogram!("inference_duration_seconds").record(started.elapsed().as_secs_f64());

    let (best_index, confidence) = argmax(&probabilities).ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!("model returned no probabilities"))
    })?;
    let predicted_class = state
        .labels
        .get(best_index)
        .ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "class index {} outside label set of {}",
                best_index,
                state.labels.len()
            ))
        })?
        .to_string();

    let by_label: BTreeMap<String, f32> = state
        .labels
        .iter()
        .zip(probabilities.iter())
        .map(|(label, p)| (label.to_string(), *p))
        .collect();
    let risk_score = state.risk.score(&predicted_class);

    counter!("predictions_total", "class" => predicted_class.clone()).increment(1);
    tracing::info!(
        predicted_class = %predicted_class,
        confidence,
        risk_score,
        "Prediction complete"
    );

    Ok(Json(PredictionResponse {
        predicted_class,
        confidence,
        probabilities: by_label,
        risk_score,
        saved_path: Some(saved.public_path),
    }))
}

async fn extract_image(req: Request) -> Result<IncomingImage, AppError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(req, &()).await.map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("Failed to read multipart body: {}", e))
        })?;
        read_photo_field(multipart).await
    } else if content_type.starts_with("application/json") {
        let Json(body) = Json::<PredictRequest>::from_request(req, &())
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid JSON body: {}", e)))?;
        decode_photo_base64(body)
    } else {
        Err(AppError::BadRequest(anyhow::anyhow!(NO_IMAGE_MESSAGE)))
    }
}

async fn read_photo_field(mut multipart: Multipart) -> Result<IncomingImage, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        if field.name() != Some("photo") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("unnamed").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e)))?
            .to_vec();

        return Ok(IncomingImage::Multipart {
            original_name,
            data,
        });
    }

    Err(AppError::BadRequest(anyhow::anyhow!(NO_IMAGE_MESSAGE)))
}

fn decode_photo_base64(body: PredictRequest) -> Result<IncomingImage, AppError> {
    let raw = body
        .photo_base64
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!(NO_IMAGE_MESSAGE)))?;

    let (extension, payload) = parse_photo_data_uri(&raw)
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("photoBase64 not in expected format")))?;

    let data = BASE64.decode(payload).map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("failed to decode base64 payload: {}", e))
    })?;

    Ok(IncomingImage::Base64 {
        extension: extension.to_string(),
        data,
    })
}

/// First maximum wins on ties, matching the model's class ordering.
fn argmax(probabilities: &[f32]) -> Option<(usize, f32)> {
    if probabilities.is_empty() {
        return None;
    }
    let mut best_index = 0;
    let mut best_score = f32::MIN;
    for (i, &p) in probabilities.iter().enumerate() {
        if p > best_score {
            best_index = i;
            best_score = p;
        }
    }
    Some((best_index, best_score))
}
