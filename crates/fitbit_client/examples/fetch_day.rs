use fitbit_client::auth::JsonFileTokenStore;
use fitbit_client::utils::parse_date;
use fitbit_client::{
    DetailLevel, FitbitClient, IntradayMetric, config::Config, http_client::ReqwestFitbitClient,
};
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: expects FITBIT_CLIENT_ID / FITBIT_CLIENT_SECRET in env and a token file
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let date = std::env::args()
        .nth(1)
        .and_then(|s| parse_date(&s))
        .ok_or("usage: fetch_day YYYY-MM-DD")?;

    let store = Arc::new(JsonFileTokenStore::new(&cfg.token_file));
    let tokens = store.load().await?;
    let client = ReqwestFitbitClient::from_config(&cfg, tokens)?.with_token_store(store);

    let daily = client.get_daily_activity(date).await?;
    println!(
        "{}: {} steps, {} logged activities",
        date,
        daily.summary.steps,
        daily.activities.len()
    );
    let series = client
        .get_intraday_series(IntradayMetric::Steps, date, DetailLevel::FifteenMinutes)
        .await?;
    println!("{} intraday samples", series.dataset.len());
    Ok(())
}
