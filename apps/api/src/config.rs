use anyhow::{Context, Result};

use crate::signing::CompanySigner;

const DEFAULT_COMPANY_NAME: &str = "Talentum Staffing LLC";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub esign_api_url: String,
    pub esign_api_token: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    /// Base URL under which uploaded objects are publicly reachable.
    pub s3_public_url: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub company_name: String,
    pub company_signer_email: Option<String>,
    pub company_signer_name: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            esign_api_url: require_env("ESIGN_API_URL")?,
            esign_api_token: require_env("ESIGN_API_TOKEN")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            s3_public_url: require_env("S3_PUBLIC_URL")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            company_name: optional_env("COMPANY_NAME")
                .unwrap_or_else(|| DEFAULT_COMPANY_NAME.to_string()),
            company_signer_email: optional_env("COMPANY_SIGNER_EMAIL"),
            company_signer_name: optional_env("COMPANY_SIGNER_NAME"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// The contract countersigner, when both its email and name are configured.
    pub fn company_signer(&self) -> Option<CompanySigner> {
        match (&self.company_signer_email, &self.company_signer_name) {
            (Some(email), Some(name)) => Some(CompanySigner {
                email: email.clone(),
                name: name.clone(),
            }),
            _ => None,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
