mod app;
mod config;
mod paths;
mod settings;
mod terminal;
mod text;

use std::fs::{self, File};
use std::time::Duration;

use log::{error, info, warn};
use simplelog::{Config, LevelFilter, WriteLogger};
use specimen_lib::SpecimenClient;
use specimen_lib::error::{ApiError, Error as SpecimenError};
use thiserror::Error;

use crate::app::App;
use crate::config::AppConfig;
use crate::settings::{SettingsError, SettingsProvider, SqliteBackend};
use crate::terminal::TerminalGuard;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
enum AppError {
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Specimen(#[from] SpecimenError),
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        Self::Specimen(err.into())
    }
}

fn init_logging() {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    match File::create(&path) {
        Ok(file) => {
            if let Err(e) = WriteLogger::init(LevelFilter::Debug, Config::default(), file) {
                eprintln!("Failed to initialize logger: {}", e);
            }
        }
        Err(e) => eprintln!("Failed to create log file {}: {}", path.display(), e),
    }
}

async fn open_settings() -> Result<Option<SettingsProvider>, AppError> {
    let Some(path) = paths::settings_db() else {
        return Ok(None);
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let backend = SqliteBackend::open(&path).await?;
    Ok(Some(SettingsProvider::new(backend)))
}

async fn run() -> Result<(), AppError> {
    let settings = match open_settings().await {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Settings unavailable, using defaults: {}", e);
            None
        }
    };

    let config = AppConfig::resolve(std::env::args().skip(1), settings.as_ref()).await;

    let mut builder = SpecimenClient::builder()
        .url(config.server_url)
        .connect_timeout(CONNECT_TIMEOUT);
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build()?;

    let (app, rx) = App::new(client);
    let mut terminal = TerminalGuard::new()?;
    app.run(rx, &mut terminal).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();
    info!("Starting specimen-search");

    if let Err(e) = run().await {
        error!("Fatal: {}", e);
        eprintln!("Error: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_wrap_library_error() {
        let err = AppError::from(ApiError::InvalidUrl("ftp://x".to_string()));
        assert!(matches!(err, AppError::Specimen(SpecimenError::Api(_))));
        assert_eq!(err.to_string(), "Invalid URL: ftp://x");
    }
}
