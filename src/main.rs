//! CLI entry point for the coursedl tool.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use coursedl_core::catalog::CatalogStore;
use coursedl_core::platform::{
    DEFAULT_API_BASE, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_NOTEBOOK_BASE,
    DEFAULT_READ_TIMEOUT_SECS,
};
use coursedl_core::{CourseExtractor, Database, Endpoints, ExtractionPolicy, HttpTransport};
use tracing::{debug, error, info};

mod app_config;
mod cli;

use app_config::FileConfig;
use cli::Args;

const DEFAULT_DATABASE: &str = "coursera-dl.db";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(class_names = ?args.class_names, "CLI arguments parsed");

    let file_config = app_config::load_default_file_config()?;
    let policy = build_policy(&args, &file_config);
    let endpoints = Endpoints::new(
        args.api_base.as_deref().unwrap_or(DEFAULT_API_BASE),
        args.notebook_base.as_deref().unwrap_or(DEFAULT_NOTEBOOK_BASE),
    );
    let transport = HttpTransport::with_timeouts(
        &endpoints,
        args.cauth.as_deref(),
        args.connect_timeout
            .or(file_config.connect_timeout_secs)
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        args.read_timeout
            .or(file_config.read_timeout_secs)
            .unwrap_or(DEFAULT_READ_TIMEOUT_SECS),
    )?;

    let database_path = args
        .database
        .clone()
        .or_else(|| file_config.database.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));
    let db = Database::open(&database_path)
        .await
        .with_context(|| format!("Failed to open catalog database '{}'", database_path.display()))?;
    let store = Arc::new(CatalogStore::new(db.clone()));
    let extractor = CourseExtractor::new(Arc::new(transport), endpoints, store);

    let exit = run(&args, &extractor, &policy).await;
    db.close().await;
    exit
}

async fn run(args: &Args, extractor: &CourseExtractor, policy: &ExtractionPolicy) -> Result<ExitCode> {
    if args.list_courses {
        let courses = extractor.list_courses().await?;
        info!(count = courses.len(), "Enrolled courses");
        for course in courses {
            println!("{course}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut any_error = false;
    for class_name in &args.class_names {
        info!(class_name = %class_name, "Processing course");
        match extractor.get_modules(class_name, policy).await {
            Ok((error_occurred, tree)) => {
                any_error |= error_occurred;
                let rendered = serde_json::to_string_pretty(&serde_json::json!({
                    "class_name": class_name,
                    "error_occurred": error_occurred,
                    "modules": tree,
                }))?;
                println!("{rendered}");
            }
            Err(run_error) => {
                any_error = true;
                error!(class_name = %class_name, error = %run_error, "Course run aborted");
            }
        }
    }

    Ok(if any_error { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn build_policy(args: &Args, file: &FileConfig) -> ExtractionPolicy {
    let defaults = ExtractionPolicy::default();
    ExtractionPolicy {
        reverse_order: args.reverse || file.reverse_order.unwrap_or(defaults.reverse_order),
        subtitle_language: args
            .subtitle_language
            .clone()
            .or_else(|| file.subtitle_language.clone())
            .unwrap_or(defaults.subtitle_language),
        video_resolution: args
            .video_resolution
            .clone()
            .or_else(|| file.video_resolution.clone()),
        download_quizzes: args.download_quizzes
            || file.download_quizzes.unwrap_or(defaults.download_quizzes),
        download_notebooks: args.download_notebooks
            || file.download_notebooks.unwrap_or(defaults.download_notebooks),
        unrestricted_filenames: args.unrestricted_filenames
            || file
                .unrestricted_filenames
                .unwrap_or(defaults.unrestricted_filenames),
        mathjax_cdn_url: args
            .mathjax_cdn
            .clone()
            .or_else(|| file.mathjax_cdn_url.clone()),
    }
}
