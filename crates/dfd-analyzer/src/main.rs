//! Deepfake analysis command line tool.
//!
//! Usage: `dfd-analyze <video>...`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dfd_analyzer::{AnalysisOutcome, AnalyzerConfig, DeepfakeAnalyzer, StorageBackend};
use dfd_media::{LazyClassifier, OpenCvBackend};
use dfd_models::{is_supported_video, render_report, SUPPORTED_VIDEO_EXTENSIONS};
use dfd_storage::{LocalResultStore, R2Client, R2ResultStore, ResultStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing()?;

    let videos: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if videos.is_empty() {
        anyhow::bail!(
            "usage: dfd-analyze <video>... (supported: {})",
            SUPPORTED_VIDEO_EXTENSIONS.join(", ")
        );
    }

    let config = AnalyzerConfig::from_env()?;
    info!("Analyzer config: {:?}", config);

    let store: Arc<dyn ResultStore> = match config.storage_backend {
        StorageBackend::Local => Arc::new(LocalResultStore::new(&config.results_dir)),
        StorageBackend::R2 => Arc::new(R2ResultStore::new(
            R2Client::from_env().context("failed to configure R2 result store")?,
        )),
    };

    let backend = OpenCvBackend::new(config.cascade_path.clone())
        .context("failed to resolve face cascade")?;

    let analyzer = DeepfakeAnalyzer::new(
        Arc::new(backend),
        LazyClassifier::onnx(&config.model_path),
        store,
    );

    let mut failures = 0usize;
    for video in &videos {
        if !is_supported_video(video) {
            error!(video = %video.display(), "Invalid file type");
            failures += 1;
            continue;
        }

        match analyzer.analyze(video).await {
            Ok(outcome) => {
                if let Err(e) = print_outcome(video, &outcome, config.report_dir.as_deref()).await {
                    error!(video = %video.display(), error = %e, "Failed to write output");
                    failures += 1;
                }
            }
            Err(e) => {
                error!(video = %video.display(), kind = e.kind(), "{}", e);
                eprintln!("{}: {}", video.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        error!(failures, total = videos.len(), "Some videos could not be analyzed");
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("dfd=info".parse()?)
        .add_directive("ort=warn".parse()?)
        .add_directive("aws_config=warn".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

async fn print_outcome(
    video: &Path,
    outcome: &AnalysisOutcome,
    report_dir: Option<&Path>,
) -> anyhow::Result<()> {
    println!("{}", outcome.result.to_json_pretty()?);
    match (&outcome.result_id, &outcome.persistence_warning) {
        (Some(id), _) => println!("resultId: {}", id),
        (None, Some(warning)) => eprintln!("warning: {}", warning),
        (None, None) => {}
    }

    if let Some(dir) = report_dir {
        let filename = video
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| video.display().to_string());
        let report_name = match &outcome.result_id {
            Some(id) => format!("{}.txt", id),
            None => format!("{}.report.txt", filename),
        };

        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create report dir {}", dir.display()))?;
        let report_path = dir.join(report_name);
        tokio::fs::write(&report_path, render_report(&outcome.result, &filename))
            .await
            .with_context(|| format!("failed to write report {}", report_path.display()))?;
        info!(report = %report_path.display(), "Report written");
    }
    Ok(())
}
