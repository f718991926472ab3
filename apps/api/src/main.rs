mod binding;
mod config;
mod document;
mod drafts;
mod errors;
mod layout;
mod render;
mod routes;
mod signing;
mod state;
mod templates;

#[cfg(test)]
mod testing;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::drafts::DraftStore;
use crate::layout::default_page_config;
use crate::render::{PdfRenderer, PreviewStore, RenderBackend};
use crate::routes::build_router;
use crate::signing::{HttpEsignClient, S3Storage, SignatureWorkflow};
use crate::state::AppState;
use crate::templates::{CompanyProfile, TemplateRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting docsign API v{}", env!("CARGO_PKG_VERSION"));

    // Template registry, built once from the company profile
    let templates = Arc::new(TemplateRegistry::new(&CompanyProfile {
        name: config.company_name.clone(),
    }));
    info!("Template registry loaded for {}", config.company_name);

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    let storage = Arc::new(S3Storage::new(
        s3,
        config.s3_bucket.clone(),
        &config.s3_public_url,
    ));
    info!("S3 client initialized");

    // Initialize e-sign client
    let esign = Arc::new(HttpEsignClient::new(
        &config.esign_api_url,
        config.esign_api_token.clone(),
    )?);
    info!("E-sign client initialized ({})", config.esign_api_url);

    // Local PDF backend: US letter, 1" margins, Helvetica 11pt
    let page_config = default_page_config();
    info!(
        "Render page config: {}x{}pt, body {}pt",
        page_config.page_width_pt, page_config.page_height_pt, page_config.body_size_pt
    );
    let renderer: Arc<dyn RenderBackend> = Arc::new(PdfRenderer::new(page_config));

    let company_signer = config.company_signer();
    if let Some(signer) = &company_signer {
        info!("Contracts will be countersigned by {}", signer.email);
    }

    let workflow = Arc::new(SignatureWorkflow::new(
        esign,
        storage,
        renderer.clone(),
        templates.clone(),
        company_signer,
    ));

    // Build app state
    let state = AppState {
        templates,
        drafts: DraftStore::new(),
        previews: PreviewStore::new(),
        renderer,
        workflow,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "docsign-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
