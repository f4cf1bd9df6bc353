//! Object-created event handling

use crate::event::{EventRecord, EventResponse, ObjectCreatedEvent};
use photoshare_core::models::ThumbnailOutcome;
use photoshare_core::{AppError, Config, ErrorMetadata};
use photoshare_services::{create_storage, Storage, ThumbnailGenerator, ThumbnailSettings};
use std::sync::Arc;

const SKIPPED_MESSAGE: &str = "Skipping thumbnail processing for an existing thumbnail";
const FAILURE_STATUS: u16 = 500;

/// Runs the thumbnail generator for every record of an object-created event
#[derive(Clone)]
pub struct ThumbnailWorker {
    config: Arc<Config>,
    generator: ThumbnailGenerator,
}

impl ThumbnailWorker {
    pub fn new(config: Arc<Config>, generator: ThumbnailGenerator) -> Self {
        Self { config, generator }
    }

    /// Build a worker writing to the configured thumbnail bucket
    pub async fn from_config(config: Config) -> Result<Self, AppError> {
        let thumbnails = create_storage(&config, &config.thumbnail_bucket).await?;
        let generator = ThumbnailGenerator::new(thumbnails, ThumbnailSettings::from_config(&config));
        Ok(Self::new(Arc::new(config), generator))
    }

    /// Process all records sequentially.
    ///
    /// Succeeds only if every record succeeds. Failures are reported in the response
    /// rather than as an error so the platform does not redeliver the whole batch.
    #[tracing::instrument(skip_all, fields(records = event.records.len()))]
    pub async fn handle_event(&self, event: ObjectCreatedEvent) -> EventResponse {
        if event.records.is_empty() {
            let err = AppError::InvalidInput("Event contains no records".to_string());
            tracing::warn!(error = %err, "Rejecting event");
            return EventResponse::failure(err.http_status_code(), failure_message(&err));
        }

        let total = event.records.len();
        let mut messages = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for record in &event.records {
            match self.process_record(record).await {
                Ok(ThumbnailOutcome::Created { thumbnail_key, .. }) => {
                    messages.push(format!("Thumbnail created: {}", thumbnail_key));
                }
                Ok(ThumbnailOutcome::Skipped { .. }) => {
                    messages.push(SKIPPED_MESSAGE.to_string());
                }
                Err(err) => {
                    tracing::error!(
                        bucket = %record.bucket(),
                        key = %record.raw_key(),
                        error = %err.detailed_message(),
                        "Error creating thumbnail"
                    );
                    failures.push((record.raw_key().to_string(), err));
                }
            }
        }

        match failures.as_slice() {
            [] => EventResponse::ok(messages.join("\n")),
            [(_, err)] if total == 1 => {
                EventResponse::failure(FAILURE_STATUS, failure_message(err))
            }
            _ => {
                let detail: Vec<String> = failures
                    .iter()
                    .map(|(key, err)| format!("{} ({})", key, err))
                    .collect();
                EventResponse::failure(
                    FAILURE_STATUS,
                    format!(
                        "Error creating thumbnail: {} of {} records failed: {}",
                        failures.len(),
                        total,
                        detail.join("; ")
                    ),
                )
            }
        }
    }

    async fn process_record(&self, record: &EventRecord) -> Result<ThumbnailOutcome, AppError> {
        let thumbnails = self.generator.thumbnail_storage();
        if record.bucket() == thumbnails.bucket() {
            return self.generator.process(thumbnails.as_ref(), record.raw_key()).await;
        }

        let source: Arc<dyn Storage> = create_storage(&self.config, record.bucket()).await?;
        self.generator.process(source.as_ref(), record.raw_key()).await
    }
}

fn failure_message(err: &AppError) -> String {
    format!("Error creating thumbnail: {}", err)
}
