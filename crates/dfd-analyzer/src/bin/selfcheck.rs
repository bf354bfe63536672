use std::path::Path;

use dfd_analyzer::{AnalyzerConfig, StorageBackend};
use dfd_media::{HaarFaceLocalizer, OrtFaceClassifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AnalyzerConfig::from_env()?;

    println!(
        "dfd-selfcheck: starting with model={} backend={}",
        config.model_path.display(),
        config.storage_backend.as_str()
    );

    OrtFaceClassifier::load(&config.model_path)
        .map_err(|e| anyhow::anyhow!("classifier not loadable: {}", e))?;
    HaarFaceLocalizer::new(config.cascade_path.as_deref())
        .map_err(|e| anyhow::anyhow!("face cascade not loadable: {}", e))?;

    match config.storage_backend {
        StorageBackend::Local => ensure_results_dir(&config.results_dir).await?,
        StorageBackend::R2 => ensure_env_present(&[
            "R2_ENDPOINT_URL",
            "R2_ACCESS_KEY_ID",
            "R2_SECRET_ACCESS_KEY",
            "R2_BUCKET_NAME",
        ])?,
    }

    println!("dfd-selfcheck: ok");
    Ok(())
}

async fn ensure_results_dir(path: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(path).await?;
    let probe = path.join(".selfcheck");
    tokio::fs::write(&probe, b"ok").await?;
    tokio::fs::remove_file(&probe).await?;
    Ok(())
}

fn ensure_env_present(vars: &[&str]) -> anyhow::Result<()> {
    for var in vars {
        if std::env::var(var).is_err() {
            return Err(anyhow::anyhow!("missing required env var {}", var));
        }
    }
    Ok(())
}
