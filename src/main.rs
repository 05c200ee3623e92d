mod dashboard;
mod display;

use std::time::Duration;

use anyhow::Result;
use meteoclock_clock::{DisplayZone, HttpTimeSource, SyncedClock};
use meteoclock_core::{AppError, Config, ConfigError};
use meteoclock_weather::{
    ConfiguredPosition, Geocoder, LocationResolver, NoPosition, PositionSource, WeatherProvider,
};
use tokio::time::{Instant, Interval};

use crate::display::{BoardSink, Slot, SlotBoard};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    meteoclock_core::init()?;

    let (config, _report) = Config::load_validated().map_err(|e| startup_failure(e.into()))?;
    let zone = DisplayZone::from_name(config.clock.timezone.as_deref()).map_err(|e| {
        startup_failure(ConfigError::Invalid(format!("clock.timezone: {}", e)).into())
    })?;

    let time_source = HttpTimeSource::new(
        &config.clock.time_api_url,
        config.clock.sync_timeout_secs.map(Duration::from_secs),
    )
    .map_err(|e| startup_failure(anyhow::Error::from(e).into()))?;
    let geocoder = Geocoder::new(&config.weather.geocode_api_url)
        .map_err(|e| startup_failure(anyhow::Error::from(e).into()))?;
    let provider = WeatherProvider::new(&config.weather.weather_api_url)
        .map_err(|e| startup_failure(anyhow::Error::from(e).into()))?;

    let board = SlotBoard::default();
    let clock = SyncedClock::new(BoardSink::new(board.clone(), true), zone);

    tracing::info!("Meteoclock started");

    match config.location.coordinates() {
        Some((latitude, longitude)) => {
            let resolver = LocationResolver::new(ConfiguredPosition { latitude, longitude }, geocoder);
            run(&config, &clock, &time_source, &resolver, &provider, &board).await
        }
        None => {
            let resolver = LocationResolver::new(NoPosition, geocoder);
            run(&config, &clock, &time_source, &resolver, &provider, &board).await
        }
    }
}

/// Print the short message for the terminal, keep the detail in the log.
fn startup_failure(err: AppError) -> anyhow::Error {
    tracing::error!("{}", err);
    eprintln!("{}", err.user_message());
    err.into()
}

async fn run<P: PositionSource>(
    config: &Config,
    clock: &SyncedClock<BoardSink>,
    time_source: &HttpTimeSource,
    resolver: &LocationResolver<P>,
    provider: &WeatherProvider,
    board: &SlotBoard,
) -> Result<()> {
    let (tick, ()) = tokio::join!(
        clock.initialize(time_source),
        dashboard::refresh_weather(resolver, provider, board),
    );
    tracing::debug!(origin = ?clock.origin(), "Clock running");

    let mut refresh = refresh_interval(config.weather.refresh_minutes);

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    tracing::error!("Failed to listen for shutdown signal: {}", e);
                }
                break;
            }
            _ = next_refresh(&mut refresh) => {
                tracing::debug!("Refreshing weather");
                dashboard::refresh_weather(resolver, provider, board).await;
            }
        }
    }

    tick.cancel();
    println!();
    tracing::info!(last_time = ?board.get(Slot::Time), "Shutting down");
    Ok(())
}

fn refresh_interval(minutes: u32) -> Option<Interval> {
    if minutes == 0 {
        return None;
    }
    let period = Duration::from_secs(u64::from(minutes) * 60);
    Some(tokio::time::interval_at(Instant::now() + period, period))
}

async fn next_refresh(refresh: &mut Option<Interval>) {
    match refresh {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
