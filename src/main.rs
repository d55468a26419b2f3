use portrait_album::app::StudioApp;
use portrait_album::config::Settings;
use portrait_album::error::AppError;
use tracing::{info, Level};

fn init_logging(level: Level) {
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let settings = Settings::load(None)?;
    init_logging(settings.max_log_level());
    info!(
        "Starting with model {} and {} workers",
        settings.api.model, settings.generation.concurrency
    );

    StudioApp::start_gui(&settings, tokio::runtime::Handle::current())
}
