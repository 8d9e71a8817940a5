// # ddns-sync - one-shot DDNS synchronization
//
// A THIN integration layer: every decision (compare, update, cache,
// notify) lives in ddns-core. This binary only:
// 1. Reads configuration from environment variables
// 2. Initializes logging and the runtime
// 3. Wires the HTTP adapters into a `SyncContext`
// 4. Runs one synchronization pass and exits
//
// ## Configuration
//
// - `DDNS_CONFIG_PATH`: Path to the JSON record file (required)
// - `DDNS_CACHE_PATH`: Cache directory; unset or empty disables caching
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
// - `DDNS_LOG_FORMAT`: json or text (default: json)
//
// ## Example
//
// ```bash
// export DDNS_CONFIG_PATH=/etc/ddns/records.json
// export DDNS_CACHE_PATH=/var/cache/ddns
//
// ddns-sync
// ```
//
// Record failures are logged and reported, never turned into a non-zero
// exit status; the next scheduled run retries them.

use anyhow::{Context, Result};
use ddns_core::{
    DdnsConfig, FileCache, Notifier, RetryPolicy, RunReport, SyncContext, SyncSettings, run_all,
};
use ddns_ip_http::HttpAddressResolver;
use ddns_notify_webhook::HttpWebhookTransport;
use ddns_provider_cloudflare::CloudflareUpdater;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Run completed (even if some records failed)
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Run completed
    Completed = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Json,
    Text,
}

/// Process configuration
#[derive(Debug)]
struct Config {
    config_path: PathBuf,
    cache_path: Option<PathBuf>,
    log_level: String,
    log_format: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config_path = lookup("DDNS_CONFIG_PATH").context(
            "DDNS_CONFIG_PATH is required. \
            Set it via: export DDNS_CONFIG_PATH=/etc/ddns/records.json",
        )?;

        Ok(Self {
            config_path: PathBuf::from(config_path),
            cache_path: lookup("DDNS_CACHE_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            log_level: lookup("DDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format: lookup("DDNS_LOG_FORMAT").unwrap_or_else(|| "json".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.config_path.as_os_str().is_empty() {
            anyhow::bail!("DDNS_CONFIG_PATH cannot be empty");
        }

        self.level()?;
        self.format()?;

        Ok(())
    }

    fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    fn format(&self) -> Result<LogFormat> {
        match self.log_format.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" => Ok(LogFormat::Text),
            _ => anyhow::bail!(
                "DDNS_LOG_FORMAT '{}' is not valid. Valid formats: json, text",
                self.log_format
            ),
        }
    }

    /// Runtime settings derived from the environment
    fn settings(&self) -> SyncSettings {
        SyncSettings::default().with_cache_dir(self.cache_path.clone())
    }
}

/// Install the global tracing subscriber (stderr)
fn init_tracing(config: &Config) -> Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(config.level()?)
        .with_writer(std::io::stderr);

    let installed = match config.format()? {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
    };
    installed.context("Failed to set tracing subscriber")
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return DdnsExitCode::ConfigError.into();
    }

    if let Err(e) = init_tracing(&config) {
        eprintln!("{:#}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddns-sync");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create tokio runtime");
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(run(&config, config.settings()));
    exit_code_for(result).into()
}

/// Load records, build the adapters and run one pass
///
/// Errors are startup failures only; a started run always yields a report.
async fn run(config: &Config, settings: SyncSettings) -> Result<RunReport> {
    let records = DdnsConfig::load(&config.config_path)
        .await
        .context("Failed to load DNS configuration")?;

    info!(
        records = records.record_count(),
        cache_enabled = settings.cache_dir.is_some(),
        "Configuration loaded"
    );

    let ctx = build_context(&settings)?;
    Ok(run_all(&ctx, &records, &settings).await)
}

/// Log the outcome of a run and map it to the process exit code
fn exit_code_for(result: Result<RunReport>) -> DdnsExitCode {
    match result {
        Ok(report) => {
            info!(
                updated = report.updated_count(),
                skipped = report.skipped_count(),
                failed = report.failed_count(),
                "Sync run completed"
            );
            DdnsExitCode::Completed
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "Startup failed");
            DdnsExitCode::ConfigError
        }
    }
}

/// Wire the HTTP adapters together
///
/// The provider and the resolver share one client (and its timeout);
/// webhooks get their own shorter-timeout client.
fn build_context(settings: &SyncSettings) -> Result<SyncContext> {
    let api_client = reqwest::Client::builder()
        .timeout(settings.http_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let transport = HttpWebhookTransport::new(settings.webhook_timeout)
        .context("Failed to build webhook client")?;

    Ok(SyncContext::new(
        Arc::new(HttpAddressResolver::with_client(api_client.clone())),
        Arc::new(CloudflareUpdater::with_client(api_client)),
        Arc::new(FileCache::new(settings.cache_dir.clone())),
        Notifier::new(Arc::new(transport), RetryPolicy::from(settings)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddns_core::{CacheKey, RecordConfig, RecordType};
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_path_is_required() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.to_string().contains("DDNS_CONFIG_PATH"));
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("DDNS_CONFIG_PATH", "/etc/ddns/records.json")]).unwrap();
        config.validate().unwrap();

        assert_eq!(config.level().unwrap(), Level::INFO);
        assert_eq!(config.format().unwrap(), LogFormat::Json);
        assert!(config.settings().cache_dir.is_none());
    }

    #[test]
    fn test_empty_cache_path_disables_cache() {
        let config = config_from(&[
            ("DDNS_CONFIG_PATH", "/etc/ddns/records.json"),
            ("DDNS_CACHE_PATH", ""),
        ])
        .unwrap();
        assert!(config.settings().cache_dir.is_none());

        let config = config_from(&[
            ("DDNS_CONFIG_PATH", "/etc/ddns/records.json"),
            ("DDNS_CACHE_PATH", "/var/cache/ddns"),
        ])
        .unwrap();
        assert_eq!(
            config.settings().cache_dir,
            Some(PathBuf::from("/var/cache/ddns"))
        );
    }

    #[test]
    fn test_invalid_log_settings_rejected() {
        let config = config_from(&[
            ("DDNS_CONFIG_PATH", "/etc/ddns/records.json"),
            ("DDNS_LOG_LEVEL", "verbose"),
        ])
        .unwrap();
        assert!(config.validate().is_err());

        let config = config_from(&[
            ("DDNS_CONFIG_PATH", "/etc/ddns/records.json"),
            ("DDNS_LOG_FORMAT", "xml"),
        ])
        .unwrap();
        assert!(config.validate().is_err());

        let config = config_from(&[
            ("DDNS_CONFIG_PATH", "/etc/ddns/records.json"),
            ("DDNS_LOG_LEVEL", "DEBUG"),
            ("DDNS_LOG_FORMAT", "Text"),
        ])
        .unwrap();
        config.validate().unwrap();
        assert_eq!(config.format().unwrap(), LogFormat::Text);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(DdnsExitCode::Completed as u8, 0);
        assert_eq!(DdnsExitCode::ConfigError as u8, 1);
        assert_eq!(DdnsExitCode::RuntimeError as u8, 2);
    }

    #[tokio::test]
    async fn test_missing_record_file_is_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_from(&[(
            "DDNS_CONFIG_PATH",
            dir.path().join("missing.json").to_str().unwrap(),
        )])
        .unwrap();

        let err = run(&config, config.settings()).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load DNS configuration"));
    }

    #[tokio::test]
    async fn test_empty_record_file_is_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, r#"{"a": [], "aaaa": []}"#).unwrap();
        let config = config_from(&[("DDNS_CONFIG_PATH", path.to_str().unwrap())]).unwrap();

        let err = run(&config, config.settings()).await.unwrap_err();
        assert!(format!("{:#}", err).contains("no DNS records found in config file"));
    }

    #[test]
    fn test_startup_error_exits_with_config_error() {
        let code = exit_code_for(Err(anyhow::anyhow!("no records")));
        assert_eq!(code, DdnsExitCode::ConfigError);
    }

    /// Serve exactly one plain-text response and return the endpoint URL
    async fn serve_once(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_completed_run_exits_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let records_path = dir.path().join("records.json");
        std::fs::write(
            &records_path,
            r#"{"a": [{"name": "home.example.com", "api_token": "secret-token",
                "zone_id": "023e105f4ecef8ad9ca31a8372d0c353",
                "record_id": "372e67954025e0ba6aaa6d586b9e0b59"}]}"#,
        )
        .unwrap();

        // A cached match keeps the run away from the real provider
        let cache_dir = dir.path().join("cache");
        std::fs::create_dir(&cache_dir).unwrap();
        let record = RecordConfig::new(
            "home.example.com",
            "secret-token",
            "023e105f4ecef8ad9ca31a8372d0c353",
            "372e67954025e0ba6aaa6d586b9e0b59",
        );
        let key = CacheKey::for_record(RecordType::A, &record);
        std::fs::write(cache_dir.join(key.file_name()), "203.0.113.7").unwrap();

        let config = config_from(&[
            ("DDNS_CONFIG_PATH", records_path.to_str().unwrap()),
            ("DDNS_CACHE_PATH", cache_dir.to_str().unwrap()),
        ])
        .unwrap();
        let mut settings = config.settings();
        settings.ipv4_discovery_url = serve_once("203.0.113.7\n").await;

        let report = run(&config, settings).await.unwrap();
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.failed_count(), 0);
        assert_eq!(exit_code_for(Ok(report)), DdnsExitCode::Completed);
    }
}
