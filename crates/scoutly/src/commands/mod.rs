//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod sensors;
pub mod watch;

use scoutly_core::Bridge;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a bridge-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, bridge: &Bridge, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(bridge, args, global).await,
        Command::Sensors(args) => sensors::handle(bridge, args, global).await,
        Command::Watch(args) => watch::handle(bridge, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
