//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "email = \"{}\"", p.email);
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if let Some(ref location) = p.location {
            let _ = writeln!(out, "location = \"{location}\"");
        }
        if let Some(ref base) = p.base_url {
            let _ = writeln!(out, "base_url = \"{base}\"");
        }
        if let Some(ref ws) = p.ws_url {
            let _ = writeln!(out, "ws_url = \"{ws}\"");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(channel) = p.channel {
            let _ = writeln!(out, "channel = {channel}");
        }
    }

    out
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
        }

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            output::print_output(&format_config_redacted(&cfg), global.quiet);
        }

        ConfigCommand::Init {
            name,
            email,
            location,
            password_env,
        } => {
            let mut cfg = config::load_config_or_default();

            cfg.profiles.insert(
                name.clone(),
                Profile {
                    email,
                    password: None,
                    password_env: Some(password_env.clone()),
                    location,
                    base_url: None,
                    ws_url: None,
                    timeout: None,
                    channel: None,
                },
            );
            if cfg.default_profile.is_none() {
                cfg.default_profile = Some(name.clone());
            }

            config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!("Profile '{name}' saved to {}", config::config_path().display());
                eprintln!("Set the password via the {password_env} environment variable.");
            }
        }
    }

    Ok(())
}
