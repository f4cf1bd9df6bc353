use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const DEFAULT_FILTER: &str = "photoshare=debug,tower_http=debug";

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single-line output for local runs
    Compact,
    /// One JSON object per event, for the serverless log collector
    Json,
}

impl LogFormat {
    /// JSON when running inside the Lambda runtime, compact otherwise
    pub fn detect() -> Self {
        if std::env::var_os("AWS_LAMBDA_RUNTIME_API").is_some() {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. Fails if a subscriber is already installed.
pub fn init_telemetry(format: LogFormat) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    match format {
        LogFormat::Compact => {
            let console_fmt = tracing_subscriber::fmt::layer().event_format(
                Format::default()
                    .compact()
                    .with_target(false)
                    .without_time(),
            );
            tracing_subscriber::registry()
                .with(filter)
                .with(console_fmt)
                .try_init()?;
        }
        LogFormat::Json => {
            // CloudWatch stamps every line itself
            let json_fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .without_time();
            tracing_subscriber::registry()
                .with(filter)
                .with(json_fmt)
                .try_init()?;
        }
    }

    tracing::debug!(?format, "Telemetry initialized");
    Ok(())
}
