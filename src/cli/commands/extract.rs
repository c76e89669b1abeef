//! Run the pipeline on a local image.

use std::path::Path;

use anyhow::Context;

use crate::config::Settings;
use crate::pipeline::Pipeline;

/// Process one image file and print the outcome as pretty JSON.
pub async fn cmd_extract(settings: &Settings, image: &Path) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("failed to read {}", image.display()))?;

    let pipeline = Pipeline::from_settings(settings)?;
    let outcome = pipeline.process(bytes).await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
