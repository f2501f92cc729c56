//! certbot hook for Loopia dns-01 challenges
//!
//! Meant to be wired up as `--manual-auth-hook "dns-loopia-hook auth"` and
//! `--manual-cleanup-hook "dns-loopia-hook cleanup"`. certbot passes the
//! domain and token through `CERTBOT_DOMAIN` / `CERTBOT_VALIDATION`.
//!
//! Logs go to stderr; set `RUST_LOG=debug` for per-call detail.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dns_loopia_provider::{
    ConfigProvider, DnsAuthenticator, EnvConfig, FileConfig, ProviderError, ResolutionError,
    create_authenticator,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Label prepended to the certificate domain for dns-01 validation.
const ACME_CHALLENGE_LABEL: &str = "_acme-challenge";

#[derive(Debug, Parser)]
#[command(name = "dns-loopia-hook", version, about)]
struct Cli {
    /// DNS provider to use
    #[arg(long, default_value = "loopia", global = true)]
    provider: String,

    /// TOML credentials file (falls back to LOOPIA_USERNAME / LOOPIA_PASSWORD)
    #[arg(long, env = "LOOPIA_CREDENTIALS", global = true)]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Publish the challenge TXT record
    Auth {
        #[command(flatten)]
        challenge: Challenge,

        /// Seconds to wait for DNS propagation after publishing
        #[arg(long, default_value_t = 10)]
        propagation_seconds: u64,
    },
    /// Remove the challenge TXT record
    Cleanup {
        #[command(flatten)]
        challenge: Challenge,
    },
}

#[derive(Debug, Args)]
struct Challenge {
    /// Domain being validated
    #[arg(long, env = "CERTBOT_DOMAIN")]
    domain: String,

    /// Challenge token to publish
    #[arg(long, env = "CERTBOT_VALIDATION")]
    validation: String,
}

impl Challenge {
    fn validation_name(&self) -> String {
        let domain = self.domain.trim_end_matches('.');
        let domain = domain.strip_prefix("*.").unwrap_or(domain);
        format!("{ACME_CHALLENGE_LABEL}.{domain}")
    }
}

fn load_authenticator(cli: &Cli) -> anyhow::Result<Arc<dyn DnsAuthenticator>> {
    let config: Box<dyn ConfigProvider> = match &cli.credentials {
        Some(path) => Box::new(FileConfig::load(path)?),
        None => Box::new(EnvConfig::from_env()),
    };
    create_authenticator(&cli.provider, config.as_ref())
        .with_context(|| format!("Failed to set up provider '{}'", cli.provider))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let authenticator = match load_authenticator(&cli) {
        Ok(authenticator) => authenticator,
        // 清理失败不影响签发结果
        Err(e) if matches!(cli.command, Command::Cleanup { .. }) => {
            tracing::warn!("Skipping cleanup: {e:#}");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    match cli.command {
        Command::Auth {
            challenge,
            propagation_seconds,
        } => {
            let validation_name = challenge.validation_name();
            authenticator
                .perform(&challenge.domain, &validation_name, &challenge.validation)
                .await?;
            tracing::info!("Published challenge for {}", challenge.domain);

            if propagation_seconds > 0 {
                tracing::info!("Waiting {propagation_seconds}s for DNS propagation");
                tokio::time::sleep(Duration::from_secs(propagation_seconds)).await;
            }
        }
        Command::Cleanup { challenge } => {
            let validation_name = challenge.validation_name();
            authenticator
                .cleanup(&challenge.domain, &validation_name, &challenge.validation)
                .await;
            tracing::info!("Cleaned up challenge for {}", challenge.domain);
        }
    }
    Ok(())
}

/// 凭证错误、参数错误、找不到 zone 属于用户侧问题，按 warn 记录
fn is_expected_failure(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        if let Some(e) = cause.downcast_ref::<ProviderError>() {
            return e.is_expected();
        }
        match cause.downcast_ref::<ResolutionError>() {
            Some(ResolutionError::Lookup(e)) => e.is_expected(),
            Some(ResolutionError::NoMatchingZone { .. } | ResolutionError::NotASuffix { .. }) => {
                true
            }
            None => false,
        }
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    // stdout 留给 certbot，日志只写 stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_ansi(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if is_expected_failure(&e) {
                tracing::warn!("{e:#}");
            } else {
                tracing::error!("{e:#}");
            }
            ExitCode::FAILURE
        }
    }
}
