use std::time::{Duration, Instant};

use anyhow::Result;

use skycast_app::{AppShell, ViewState};
use skycast_session::SystemLocator;

#[tokio::main]
async fn main() -> Result<()> {
    skycast_core::init()?;

    let (config, _validation) = skycast_core::Config::load_validated()?;

    let shell = match AppShell::initialize(&config, SystemLocator).await {
        Ok(shell) => shell,
        Err(e) => {
            // Fatal initialization error: nothing to render but the message
            eprintln!("Skycast failed to start: {}", e.user_message());
            eprintln!("({})", e);
            eprintln!("Fix your connection and relaunch to retry.");
            std::process::exit(1);
        }
    };

    println!("Skycast");
    println!("  session: {}", shell.session().session_id);
    println!("  city:    {}", shell.current_city());

    // Wait for the initial forecast fetch to settle, then print a summary
    let deadline = Instant::now() + Duration::from_secs(15);
    loop {
        match shell.weather_state() {
            ViewState::Ready(data) => {
                println!(
                    "  now:     {:.0}° {} (feels like {:.0}°)",
                    data.current.temperature, data.current.condition, data.current.feels_like
                );
                if let Some(today) = data.daily.first() {
                    println!("  today:   {:.0}° / {:.0}°", today.max_temp, today.min_temp);
                }
                break;
            }
            ViewState::Error(message) => {
                println!("  weather unavailable: {}", message);
                break;
            }
            _ => {
                if Instant::now() >= deadline {
                    println!("  weather fetch timed out");
                    break;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }

    Ok(())
}
