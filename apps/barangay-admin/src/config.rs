//! Settings from flags, environment and `.env`

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use cert_core::{CertificateAssets, OperatorCredentials};
use clap::Args;
use records_client::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_DELIVERY_PATH, DEFAULT_TIMEOUT_SECS};

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Records API base URL
    #[arg(long, env = "BARANGAY_API_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub api_url: String,

    /// Delivery endpoint path under the API URL
    #[arg(long, env = "BARANGAY_DELIVERY_PATH", default_value = DEFAULT_DELIVERY_PATH, global = true)]
    pub delivery_path: String,

    /// HTTP timeout in seconds
    #[arg(long, env = "BARANGAY_HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    /// Emblem image (PNG or JPEG) used as the watermark
    #[arg(long, env = "BARANGAY_EMBLEM", global = true)]
    pub emblem: Option<PathBuf>,

    /// Seal image (PNG or JPEG)
    #[arg(long, env = "BARANGAY_SEAL", global = true)]
    pub seal: Option<PathBuf>,

    /// Where composed certificates are written (default: system temp dir)
    #[arg(long, env = "BARANGAY_OUTPUT_DIR", global = true)]
    pub output_dir: Option<PathBuf>,

    /// Operator account e-mail
    #[arg(long, env = "BARANGAY_ADMIN_EMAIL", global = true)]
    pub admin_email: Option<String>,

    /// Operator account password hash (Argon2 PHC string)
    #[arg(long, env = "BARANGAY_ADMIN_PASSWORD_HASH", hide_env_values = true, global = true)]
    pub admin_password_hash: Option<String>,

    /// Password to sign in with
    #[arg(long, env = "BARANGAY_OPERATOR_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,
}

impl Settings {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.clone(),
            delivery_path: self.delivery_path.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn credentials(&self) -> Result<OperatorCredentials> {
        Ok(OperatorCredentials {
            email: self
                .admin_email
                .clone()
                .context("BARANGAY_ADMIN_EMAIL is not set")?,
            password_hash: self
                .admin_password_hash
                .clone()
                .context("BARANGAY_ADMIN_PASSWORD_HASH is not set")?,
        })
    }

    pub fn password(&self) -> Result<&str> {
        self.password
            .as_deref()
            .context("No password given (--password or BARANGAY_OPERATOR_PASSWORD)")
    }

    pub fn assets(&self) -> Result<CertificateAssets> {
        let emblem = self
            .emblem
            .as_deref()
            .context("No emblem image (--emblem or BARANGAY_EMBLEM)")?;
        let seal = self
            .seal
            .as_deref()
            .context("No seal image (--seal or BARANGAY_SEAL)")?;
        Ok(CertificateAssets::load(emblem, seal)?)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
