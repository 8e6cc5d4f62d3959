use inference_service::config::InferenceConfig;
use inference_service::services::{Classifier, MockClassifier};
use inference_service::startup::Application;
use std::sync::Arc;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub upload_folder: String,
}

impl TestApp {
    /// Spawns the service with a mock classifier that always answers
    /// `[0.1, 0.2, 0.6, 0.1]`, which maps to "Moderate" under the default
    /// label set.
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(MockClassifier::new(vec![0.1, 0.2, 0.6, 0.1])), None).await
    }

    pub async fn spawn_with(classifier: Arc<dyn Classifier>, class_labels: Option<&str>) -> Self {
        let upload_folder = format!("target/test-uploads-{}", Uuid::new_v4());

        let mut config = InferenceConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.uploads.folder = upload_folder.clone();
        config.model.class_labels = class_labels.map(|s| s.to_string());

        let app = Application::build_with_classifier(config, classifier)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            upload_folder,
        }
    }

    /// Names of the files currently sitting in the upload folder.
    pub async fn uploaded_files(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(mut entries) = tokio::fs::read_dir(&self.upload_folder).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names
    }

    /// Cleanup test resources (upload folder).
    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.upload_folder).await;
    }
}
