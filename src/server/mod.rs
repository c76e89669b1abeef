//! Web server for uploading images and viewing extraction results.
//!
//! - `GET /` upload form
//! - `POST /upload` run the pipeline on an uploaded image (`image` or `file` field)
//! - `GET /uploads/:filename` serve a saved upload
//! - `POST /api/extract` JSON variant of `/upload`
//! - `GET /health` liveness

mod handlers;
mod routes;
mod template_structs;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::pipeline::Pipeline;
use crate::storage::UploadStore;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub uploads: Arc<UploadStore>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Build the pipeline and upload store. Failures here are fatal to startup.
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let pipeline = Pipeline::from_settings(settings)?;
        let uploads = UploadStore::open(&settings.upload_dir)?;

        Ok(Self {
            pipeline: Arc::new(pipeline),
            uploads: Arc::new(uploads),
            max_upload_bytes: settings.max_upload_bytes,
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
