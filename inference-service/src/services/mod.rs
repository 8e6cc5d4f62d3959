pub mod classifier;
pub mod metrics;
pub mod mock;
pub mod preprocess;
pub mod uploads;

pub use classifier::{Classifier, OnnxClassifier};
pub use metrics::{get_metrics, init_metrics};
pub use mock::MockClassifier;
pub use uploads::{SavedUpload, UploadStore};
