use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use photoshare_core::Config;
use photoshare_services::{init_telemetry, LogFormat};
use photoshare_worker::{ObjectCreatedEvent, ThumbnailWorker};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_telemetry(LogFormat::Json)?;

    let config = Config::from_env()?;
    tracing::info!(
        thumbnail_bucket = %config.thumbnail_bucket,
        backend = %config.storage_backend,
        "Starting thumbnail worker"
    );

    let worker = ThumbnailWorker::from_config(config).await?;
    let worker = &worker;

    run(service_fn(|event: LambdaEvent<ObjectCreatedEvent>| async move {
        Ok::<_, Error>(worker.handle_event(event.payload).await)
    }))
    .await
}
