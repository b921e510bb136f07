//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod forget_target;
pub mod rotate;
pub mod stage;
pub mod status;
pub mod util;
pub mod validate;
pub mod wlans;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a parsed command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Rotate => rotate::handle(global).await,
        Command::Status => status::handle(global),
        Command::Validate => validate::handle(global),
        Command::Stage(args) => stage::handle(&args, global),
        Command::ForgetTarget => forget_target::handle(global),
        Command::Wlans => wlans::handle(global).await,
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "ssidrot", &mut std::io::stdout());
            Ok(())
        }
    }
}
