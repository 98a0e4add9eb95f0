use std::path::PathBuf;

use bon::Builder;
use clap::Args;
use container_deploy_process_management::drivers::{Driver, DriverArgs};
use container_deploy_utils::constants::{CONTAINER, CONTAINERS_PATH, DEPLOY_CONTAINERS_DIR};
use log::trace;
use miette::Result;

use crate::pipeline::validate;

use super::{CiArgs, ContainerDeployCommand};

#[derive(Debug, Clone, Args, Builder)]
pub struct TagCommand {
    /// The container to resolve the tag for.
    #[arg(env = CONTAINER)]
    #[builder(into)]
    container: String,

    /// The directory holding the container definitions.
    #[arg(long, default_value = CONTAINERS_PATH, env = DEPLOY_CONTAINERS_DIR)]
    #[builder(default = PathBuf::from(CONTAINERS_PATH), into)]
    containers_dir: PathBuf,

    #[clap(flatten)]
    #[builder(default)]
    ci: CiArgs,

    #[clap(flatten)]
    #[builder(default)]
    drivers: DriverArgs,
}

impl ContainerDeployCommand for TagCommand {
    fn try_run(&mut self) -> Result<()> {
        trace!("TagCommand::try_run()");

        let driver = Driver::new(self.drivers);
        let tag = validate::resolve_version_tag(
            &self.containers_dir,
            &self.container,
            &self.ci.apply(driver.ci_context()),
        )?;

        println!("{tag}");
        Ok(())
    }
}
