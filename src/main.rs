// src/main.rs

use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion_patch::constants::{DETAILED_LOG_PATTERN, PLAIN_LOG_PATTERN};
use notion_patch::{pipeline, AppError, CommandLineInput, RenderConfig};
use std::fs;
use std::path::Path;

/// Sets up logging configuration.
///
/// The console writes to stderr so a payload printed on stdout stays clean.
fn setup_logging(verbose: bool, log_file_path: &Path) -> Result<(), AppError> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        DETAILED_LOG_PATTERN
    } else {
        PLAIN_LOG_PATTERN
    };

    let console_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(DETAILED_LOG_PATTERN)))
        .build(log_file_path)
        .map_err(|e| AppError::Logging(e.to_string()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("console")
                .appender("file")
                .build(log_level),
        )
        .map_err(|e| AppError::Logging(e.to_string()))?;

    log4rs::init_config(config).map_err(|e| AppError::Logging(e.to_string()))?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

fn main() -> Result<(), AppError> {
    let cli = CommandLineInput::parse();
    let config = RenderConfig::resolve(cli)?;

    setup_logging(config.verbose, &config.log_file)?;

    let payload = pipeline::compose(&config.task)?;
    let bytes = pipeline::deliver(&payload, &config)?;
    log::debug!("Delivered {} bytes", bytes);

    Ok(())
}
