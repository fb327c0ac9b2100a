//! QR batch generator
//!
//! Reads the code pool CSV, signs each code under the shared secret,
//! builds its verification URL and renders one QR PNG per code with an
//! optional centered logo overlay.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use redeem_core::pool;
use redeem_core::qr::{self, EcLevel, QrStyle};
use redeem_core::signature::{self, SigningKey};

/// QR batch generator CLI
#[derive(Parser)]
#[command(name = "qr-batch-gen")]
#[command(about = "Render signed QR images for a code pool", long_about = None)]
struct Cli {
    /// Pool CSV produced by code-pool-gen
    #[arg(long, default_value = "./pool/code_pool.csv")]
    pool: PathBuf,

    /// Directory receiving one PNG per code
    #[arg(long, default_value = "./qrs")]
    out_dir: PathBuf,

    /// Base verification URL (code and signature become query parameters)
    #[arg(long)]
    base_url: Option<String>,

    /// HMAC secret for signing payloads
    #[arg(long, env = "REDEEM_HMAC_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Logo image overlaid on each QR
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Logo width as a fraction of the QR width
    #[arg(long)]
    logo_ratio: Option<f32>,

    /// QR error-correction level: L, M, Q or H
    #[arg(long)]
    ec_level: Option<String>,

    /// Fail instead of degrading when the logo file is missing
    #[arg(long)]
    require_logo: bool,

    /// Write a JSON manifest of the generated artifacts
    #[arg(long)]
    manifest: bool,

    /// TOML config file with defaults; command-line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,
}

/// File-based defaults, merged below the CLI flags.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    base_url: Option<String>,
    secret: Option<String>,
    logo: Option<PathBuf>,
    logo_ratio: Option<f32>,
    ec_level: Option<String>,
    require_logo: Option<bool>,
}

#[derive(Serialize)]
struct ManifestEntry {
    code: String,
    url: String,
    file: String,
}

fn parse_ec_level(text: &str) -> Result<EcLevel> {
    match text.trim().to_ascii_uppercase().as_str() {
        "L" => Ok(EcLevel::L),
        "M" => Ok(EcLevel::M),
        "Q" => Ok(EcLevel::Q),
        "H" => Ok(EcLevel::H),
        other => bail!("unknown error-correction level {other:?} (expected L, M, Q or H)"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let file_cfg: FileConfig = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        }
        None => FileConfig::default(),
    };

    let base_url = cli
        .base_url
        .or(file_cfg.base_url)
        .context("no base URL given (use --base-url or the config file)")?;
    let secret = cli
        .secret
        .or(file_cfg.secret)
        .context("no HMAC secret given (use --secret, REDEEM_HMAC_SECRET or the config file)")?;
    let logo = cli.logo.or(file_cfg.logo);
    let require_logo = cli.require_logo || file_cfg.require_logo.unwrap_or(false);

    let mut style = QrStyle {
        logo_optional: !require_logo,
        ..QrStyle::default()
    };
    if let Some(ratio) = cli.logo_ratio.or(file_cfg.logo_ratio) {
        if !(0.0..1.0).contains(&ratio) {
            bail!("logo ratio {ratio} out of range (expected 0.0 to 1.0)");
        }
        style.logo_ratio = ratio;
    }
    if let Some(level) = cli.ec_level.as_deref().or(file_cfg.ec_level.as_deref()) {
        style.ec_level = parse_ec_level(level)?;
    }

    let key = SigningKey::new(secret.as_bytes()).context("rejected HMAC secret")?;
    if key.is_weak() {
        warn!(
            "HMAC secret is shorter than {} bytes; prefer a longer random secret",
            SigningKey::RECOMMENDED_MIN_LEN
        );
    }

    // Resolve the missing-logo degradation once, before the batch
    let logo = match logo {
        Some(path) if !path.is_file() && !require_logo => {
            warn!(logo = %path.display(), "logo file missing, rendering without overlay");
            None
        }
        other => other,
    };

    let entries = pool::read_pool(&cli.pool)
        .with_context(|| format!("failed to read pool file {}", cli.pool.display()))?;
    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("failed to create output directory {}", cli.out_dir.display()))?;
    info!(entries = entries.len(), out_dir = %cli.out_dir.display(), "rendering QR batch");

    let mut manifest = Vec::new();
    for entry in &entries {
        let sig = signature::sign_code(&key, &entry.code);
        let url = signature::verification_url(&base_url, &entry.code, &sig);
        let img = qr::render(&url, &style, logo.as_deref())
            .with_context(|| format!("failed to render QR for {}", entry.code))?;
        let path = qr::save_png(&img, &cli.out_dir, &entry.code)
            .with_context(|| format!("failed to save QR for {}", entry.code))?;
        println!("Saved {}", path.display());

        if cli.manifest {
            manifest.push(ManifestEntry {
                code: entry.code.to_string(),
                url,
                file: path.display().to_string(),
            });
        }
    }

    if cli.manifest {
        let path = cli.out_dir.join("manifest.json");
        fs::write(&path, serde_json::to_string_pretty(&manifest)?)
            .with_context(|| format!("failed to write manifest {}", path.display()))?;
        println!("✅ Saved manifest to {}", path.display());
    }

    println!(
        "✅ Generated {} QR codes in {}",
        entries.len(),
        cli.out_dir.display()
    );
    Ok(())
}
