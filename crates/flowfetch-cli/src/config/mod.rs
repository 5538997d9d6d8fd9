//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── s3: S3Config               # Region, endpoint, credentials, timeout
//! ├── fetch: FetchProperties     # Bucket, key, version, byte range
//! ├── unit: UnitConfig           # Attributes and content of the input unit
//! └── output                     # Where the fetched payload is written
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! flowfetch --bucket media --key '${dir}/${filename}' \
//!     --attribute dir=photos --attribute filename=cat.jpg --output cat.jpg
//!
//! # Or via environment variables
//! FLOWFETCH_BUCKET=media AWS_REGION=eu-west-1 flowfetch --attribute filename=cat.jpg
//! ```

mod unit;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use flowfetch_object::S3Config;
use flowfetch_processor::FetchProperties;
use serde::{Deserialize, Serialize};
pub use unit::UnitConfig;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "flowfetch")]
#[command(about = "Fetch one S3 object into a flow unit")]
#[command(version)]
pub struct Cli {
    /// S3 connection configuration.
    #[clap(flatten)]
    pub s3: S3Config,

    /// Which object to fetch, as attribute expressions.
    #[clap(flatten)]
    pub fetch: FetchProperties,

    /// The unit the fetch runs against.
    #[clap(flatten)]
    pub unit: UnitConfig,

    /// File the fetched payload is written to; stdout when absent.
    #[arg(short, long, env = "FLOWFETCH_OUTPUT")]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded first so clap can use its values as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.s3.validate().context("invalid S3 configuration")?;
        self.fetch
            .validate()
            .context("invalid fetch configuration")?;
        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            backend = %self.s3.backend,
            region = %self.s3.region,
            endpoint = ?self.s3.endpoint,
            credentials_file = ?self.s3.credentials_file,
            timeout_secs = self.s3.timeout_secs,
            "S3 configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            bucket = %self.fetch.bucket,
            key = %self.fetch.key,
            version_id = ?self.fetch.version_id,
            range_start = ?self.fetch.range_start,
            range_end = ?self.fetch.range_end,
            range_policy = %self.fetch.range_policy,
            "Fetch configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
