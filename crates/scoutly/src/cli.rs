//! Clap derive structures for the `scoutly` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// scoutly -- CLI for Scout Alarm security sensors
#[derive(Debug, Parser)]
#[command(
    name = "scoutly",
    version,
    about = "Inspect and watch Scout Alarm security sensors from the command line",
    long_about = "A CLI for Scout Alarm accounts.\n\n\
        Exposes each supported security device (door, window, motion, smoke,\n\
        water, glass break) as a binary on/off sensor, with live updates over\n\
        the Scout push channel.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "SCOUT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Account email (overrides profile)
    #[arg(long, short = 'e', env = "SCOUT_EMAIL", global = true)]
    pub email: Option<String>,

    /// Location id or name (overrides profile)
    #[arg(long, short = 'l', env = "SCOUT_LOCATION", global = true)]
    pub location: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SCOUT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides the profile's timeout)
    #[arg(long, env = "SCOUT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect raw device records
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Inspect binary sensor states
    #[command(alias = "sen", alias = "s")]
    Sensors(SensorsArgs),

    /// Stream live sensor changes
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Manage configuration profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List all devices at the location (including unsupported types)
    #[command(alias = "ls")]
    List,

    /// Show one device's full record
    Show {
        /// Device id
        id: String,
    },
}

// ── Sensors ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SensorsArgs {
    #[command(subcommand)]
    pub command: SensorsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SensorsCommand {
    /// List all binary sensors and their current state
    #[command(alias = "ls")]
    List {
        /// Only show active (triggered) sensors
        #[arg(long)]
        active: bool,
    },

    /// Show one sensor's state and attributes
    Show {
        /// Device id
        id: String,

        /// Re-fetch the device record before rendering
        #[arg(long)]
        fresh: bool,
    },
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Print raw push events instead of resolved sensor states
    #[arg(long)]
    pub raw: bool,

    /// Stop after this many seconds (default: until interrupted)
    #[arg(long)]
    pub duration: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Show the current configuration (secrets redacted)
    Show,

    /// Create or update a profile
    Init {
        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// Account email
        #[arg(long)]
        email: String,

        /// Location id or name
        #[arg(long)]
        location: Option<String>,

        /// Environment variable holding the password
        #[arg(long, default_value = "SCOUT_PASSWORD")]
        password_env: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
