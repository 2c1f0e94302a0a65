use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use fitbit_client::auth::JsonFileTokenStore;
use fitbit_client::config::Config;
use fitbit_client::http_client::ReqwestFitbitClient;
use fitbit_client::{DetailLevel, IntradayMetric};
use fitbit_collector::{
    Collector, CollectorConfig, CollectorResult, DateRange, Overrides, RateLimiter,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fitbit-collect")]
#[command(about = "Collect Fitbit daily and intraday activity data into CSV files", long_about = None)]
#[command(version)]
struct Cli {
    /// First date to collect (YYYY-MM-DD)
    #[arg(long, requires = "end", conflicts_with = "last_days")]
    start: Option<String>,

    /// Last date to collect, inclusive (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    end: Option<String>,

    /// Collect the N days ending yesterday
    #[arg(long, default_value_t = 10)]
    last_days: u32,

    /// Provider calls allowed per trailing hour [env: FITBIT_MAX_CALLS_PER_HOUR]
    #[arg(long)]
    max_calls_per_hour: Option<u32>,

    /// Intraday metric: steps, calories, distance, floors, elevation
    #[arg(long)]
    metric: Option<IntradayMetric>,

    /// Intraday detail level: 1min, 5min, 15min
    #[arg(long)]
    detail: Option<DetailLevel>,

    /// Output directory [env: FITBIT_OUTPUT_DIR]
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Write an "Inactive" walk row for dates without logged activities
    #[arg(long)]
    fill_inactive: bool,

    /// Token file holding access_token / refresh_token / expires_at [env: FITBIT_TOKEN_FILE]
    #[arg(long)]
    token_file: Option<PathBuf>,

    /// Log level used when neither FITBIT_LOG_LEVEL nor RUST_LOG is set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            max_calls_per_hour: self.max_calls_per_hour,
            output_dir: self.out_dir.clone(),
            metric: self.metric,
            detail: self.detail,
            fill_inactive: self.fill_inactive,
        }
    }

    fn date_range(&self, today: NaiveDate) -> CollectorResult<DateRange> {
        DateRange::from_bounds_or_last_days(
            self.start.as_deref(),
            self.end.as_deref(),
            today,
            self.last_days,
        )
    }
}

/// `FITBIT_LOG_LEVEL`, then `RUST_LOG`, then the `--log-level` flag.
fn log_filter(
    fitbit_log_level: Option<String>,
    rust_log: Option<String>,
    flag: &str,
) -> (String, EnvFilter) {
    let log_env = fitbit_log_level.or(rust_log).unwrap_or_else(|| flag.to_string());
    let combined_filter = format!("{},hyper_util=warn,reqwest=warn", log_env);
    let env_filter = EnvFilter::try_new(combined_filter)
        .unwrap_or_else(|_| EnvFilter::new("info,hyper_util=warn,reqwest=warn"));
    (log_env, env_filter)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (log_env, env_filter) = log_filter(
        std::env::var("FITBIT_LOG_LEVEL").ok(),
        std::env::var("RUST_LOG").ok(),
        &cli.log_level,
    );
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::debug!("fitbit-collect: log filter: {}", log_env);

    let mut client_cfg = Config::from_env().context("loading Fitbit client configuration")?;
    if let Some(path) = cli.token_file.clone() {
        client_cfg.token_file = path;
    }
    let cfg = CollectorConfig::from_env()
        .and_then(|cfg| cfg.with_overrides(cli.overrides()))
        .context("loading collector configuration")?;
    let range = cli.date_range(chrono::Local::now().date_naive())?;

    let store = Arc::new(JsonFileTokenStore::new(&client_cfg.token_file));
    let tokens = store
        .load()
        .await
        .with_context(|| format!("loading tokens from {}", client_cfg.token_file.display()))?;
    let client = ReqwestFitbitClient::from_config(&client_cfg, tokens)?.with_token_store(store);

    let limiter = RateLimiter::per_hour(cfg.max_calls_per_hour)?;
    let mut collector = Collector::new(Arc::new(client), limiter, cfg.collect_options());
    let report = collector.run(&range, &cfg.output_dir).await?;

    report.stats.log_summary("fitbit collection");
    for path in report.paths() {
        println!("{}", path.display());
    }
    Ok(())
}
