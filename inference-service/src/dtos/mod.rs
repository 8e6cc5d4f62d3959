pub mod predict;

pub use predict::{PredictRequest, PredictionResponse, parse_photo_data_uri};
