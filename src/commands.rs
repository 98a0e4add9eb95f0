use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use container_deploy_process_management::drivers::types::CiContext;
use log::error;

pub mod deploy;
pub mod sync_defaults;
pub mod tag;

pub trait ContainerDeployCommand {
    /// Runs the command and returns a result
    /// of the execution
    ///
    /// # Errors
    /// Can return a `miette` Error
    fn try_run(&mut self) -> miette::Result<()>;

    /// Runs the command and exits if there is an error.
    fn run(&mut self) {
        if let Err(e) = self.try_run() {
            error!("Failed:\n{e:?}");
            std::process::exit(1);
        }
    }
}

#[derive(Parser, Debug)]
#[clap(name = "container-deploy", about, long_about = None, version)]
pub struct ContainerDeployArgs {
    #[command(subcommand)]
    pub command: CommandArgs,

    #[clap(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// The directory to write command logs to.
    /// Defaults to `$HOME/.cache/container-deploy`.
    #[arg(long)]
    pub log_out: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum CommandArgs {
    /// Build, publish, and sync the defaults of
    /// every container, or a single one.
    Deploy(deploy::DeployCommand),

    /// Publish a container's defaults into the
    /// defaults repository and tag them.
    SyncDefaults(sync_defaults::SyncDefaultsCommand),

    /// Print the tag a container would be
    /// published with for the current CI event.
    Tag(tag::TagCommand),
}

/// Values that take precedence over the ones
/// read from the CI environment.
#[derive(Default, Clone, Debug, Args)]
pub struct CiArgs {
    /// The event that triggered this run.
    #[arg(long)]
    event_type: Option<String>,

    /// The source branch of a pull request.
    #[arg(long)]
    pull_request_branch: Option<String>,

    /// The incrementing CI build number.
    #[arg(long)]
    build_number: Option<String>,
}

impl CiArgs {
    #[must_use]
    pub fn apply(&self, context: CiContext) -> CiContext {
        context.with_overrides(
            self.event_type.clone(),
            self.pull_request_branch.clone(),
            self.build_number.clone(),
        )
    }
}

#[cfg(test)]
mod test {
    use clap::CommandFactory;

    use super::ContainerDeployArgs;

    #[test]
    fn cli_is_consistent() {
        ContainerDeployArgs::command().debug_assert();
    }
}
