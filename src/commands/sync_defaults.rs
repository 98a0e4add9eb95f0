use std::path::PathBuf;

use bon::Builder;
use clap::Args;
use container_deploy_process_management::drivers::{Driver, DriverArgs};
use container_deploy_utils::constants::{
    CONTAINER, DEFAULTS_BRANCH, DEFAULTS_DIR, DEFAULTS_LABEL, DEFAULTS_PATH, DEFAULTS_REPOSITORY,
    DEFAULT_BRANCH, DOCKER_TAG,
};
use log::trace;
use miette::Result;

use crate::pipeline::{config::SyncRequest, defaults::DefaultsSynchronizer, validate};

use super::ContainerDeployCommand;

#[derive(Debug, Clone, Args, Builder)]
pub struct SyncDefaultsCommand {
    /// The container whose defaults are published.
    #[arg(short, long, env = CONTAINER)]
    #[builder(into)]
    container: Option<String>,

    /// The git repository the defaults are published to.
    #[arg(long, env = DEFAULTS_REPOSITORY)]
    #[builder(into)]
    defaults_repository: Option<String>,

    /// The directory inside the defaults repository.
    /// Defaults to the container name.
    #[arg(long, env = DEFAULTS_LABEL)]
    #[builder(into)]
    defaults_label: Option<String>,

    /// The image tag the defaults were built with.
    #[arg(short, long, env = DOCKER_TAG)]
    #[builder(into)]
    tag: Option<String>,

    /// The local directory the defaults are copied from.
    #[arg(long, default_value = DEFAULTS_PATH, env = DEFAULTS_DIR)]
    #[builder(default = PathBuf::from(DEFAULTS_PATH), into)]
    defaults_dir: PathBuf,

    /// The branch of the defaults repository to push to.
    #[arg(long, default_value = DEFAULT_BRANCH, env = DEFAULTS_BRANCH)]
    #[builder(default = DEFAULT_BRANCH.to_string(), into)]
    defaults_branch: String,

    #[clap(flatten)]
    #[builder(default)]
    drivers: DriverArgs,
}

impl ContainerDeployCommand for SyncDefaultsCommand {
    fn try_run(&mut self) -> Result<()> {
        trace!("SyncDefaultsCommand::try_run()");

        let job = validate::validate_sync(
            &SyncRequest::builder()
                .maybe_container(self.container.clone())
                .maybe_defaults_repository(self.defaults_repository.clone())
                .maybe_defaults_label(self.defaults_label.clone())
                .maybe_tag(self.tag.clone())
                .defaults_dir(self.defaults_dir.clone())
                .defaults_branch(self.defaults_branch.clone())
                .build(),
        )?;

        let driver = Driver::new(self.drivers);
        DefaultsSynchronizer::new(&driver).sync(&job.container, &job.tag, &job.target)
    }
}
