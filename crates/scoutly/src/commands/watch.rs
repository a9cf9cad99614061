//! Live event streaming.
//!
//! Subscribes to the push channel and prints one line per change. The
//! bridge's routing task refreshes the owning sensor before we render,
//! so resolved mode shows post-refresh state.

use std::io::Write;
use std::time::Duration;

use chrono::Local;
use tokio::sync::broadcast;

use scoutly_core::{Bridge, DeviceId};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(bridge: &Bridge, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut events = bridge.events().await?;
    let color = output::should_color(&global.color);

    if !global.quiet {
        eprintln!("Watching for sensor changes (Ctrl-C to stop)...");
    }

    let deadline = args.duration.map(Duration::from_secs);
    let watch_loop = async {
        loop {
            match events.recv().await {
                Ok(event) => print_event(bridge, &event, args.raw, color),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    eprintln!("warning: dropped {missed} events (consumer too slow)");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    match deadline {
        Some(limit) => {
            tokio::select! {
                () = watch_loop => {}
                () = tokio::time::sleep(limit) => {}
                _ = tokio::signal::ctrl_c() => {}
            }
        }
        None => {
            tokio::select! {
                () = watch_loop => {}
                _ = tokio::signal::ctrl_c() => {}
            }
        }
    }

    Ok(())
}

fn print_event(bridge: &Bridge, event: &scoutly_core::ChangeEvent, raw: bool, color: bool) {
    let timestamp = Local::now().format("%H:%M:%S");
    let mut stdout = std::io::stdout().lock();

    if raw {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(stdout, "{timestamp} {json}");
        }
        return;
    }

    // Routed mode: resolve the event to the owning sensor, if tracked
    let id = DeviceId::from(event.id.as_str());
    match bridge.sensor(&id) {
        Some(sensor) => {
            let _ = writeln!(
                stdout,
                "{timestamp} {:<24} {:<10} {}",
                sensor.name(),
                sensor.semantic_class().to_string(),
                output::state_label(sensor.is_active(), color),
            );
        }
        None => {
            let _ = writeln!(stdout, "{timestamp} {id} (untracked device)");
        }
    }
}
