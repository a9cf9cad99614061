mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use scoutly_core::Bridge;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a bridge connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "scoutly", &mut std::io::stdout());
            Ok(())
        }

        // All other commands require a connected bridge
        cmd => {
            // One-shot commands don't need the push channel
            let channel = matches!(cmd, Command::Watch(_));
            let bridge_config = build_bridge_config(&cli.global, channel)?;
            let bridge = Bridge::new(bridge_config);
            bridge.connect().await?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &bridge, &cli.global).await;
            bridge.shutdown().await;
            result
        }
    }
}

/// Build a `BridgeConfig` from the config file, profile, and CLI overrides.
fn build_bridge_config(
    global: &cli::GlobalOpts,
    channel: bool,
) -> Result<scoutly_core::BridgeConfig, CliError> {
    let cfg = config::load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);

    // If a profile exists, use it with CLI flag overrides
    if let Some(profile) = cfg.profiles.get(&profile_name) {
        let mut bridge_config = config::resolve_profile(profile, &profile_name, global)?;
        bridge_config.channel_enabled = channel && bridge_config.channel_enabled;
        return Ok(bridge_config);
    }

    // An explicitly requested profile that does not exist is most likely
    // a typo; falling through to the bare-flags path would misdiagnose it
    // as a missing config.
    if global.profile.is_some() {
        let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if names.is_empty() {
                "(none)".into()
            } else {
                names.join(", ")
            },
        });
    }

    // No profile found -- try to build from CLI flags / env vars alone
    let email = global.email.clone().ok_or_else(|| CliError::NoConfig {
        path: config::config_path().display().to_string(),
    })?;

    let password = std::env::var("SCOUT_PASSWORD")
        .map(secrecy::SecretString::from)
        .map_err(|_| CliError::NoCredentials {
            profile: profile_name,
        })?;

    let mut bridge_config = scoutly_core::BridgeConfig {
        email,
        password,
        location: global.location.clone(),
        channel_enabled: channel,
        ..scoutly_core::BridgeConfig::default()
    };
    if let Some(secs) = global.timeout {
        bridge_config.timeout = std::time::Duration::from_secs(secs);
    }
    Ok(bridge_config)
}
