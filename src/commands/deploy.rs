use std::path::PathBuf;

use bon::Builder;
use clap::Args;
use container_deploy_process_management::drivers::{Driver, DriverArgs};
use container_deploy_utils::{
    constants::{
        BUILD_SCRIPT, CONTAINER, CONTAINERS_PATH, DEFAULTS_BRANCH, DEFAULTS_DIR, DEFAULTS_LABEL,
        DEFAULTS_REPOSITORY, DEFAULT_BRANCH, DEPLOY_BUILD_SCRIPT, DEPLOY_CONTAINERS_DIR,
        DEPLOY_FAIL_FAST,
    },
    credentials::CredentialsArgs,
};
use log::trace;
use miette::Result;

use crate::pipeline::{self, config::DeployRequest};

use super::{CiArgs, ContainerDeployCommand};

#[derive(Debug, Clone, Args, Builder)]
pub struct DeployCommand {
    /// The directory holding the container definitions.
    #[arg(long, default_value = CONTAINERS_PATH, env = DEPLOY_CONTAINERS_DIR)]
    #[builder(default = PathBuf::from(CONTAINERS_PATH), into)]
    containers_dir: PathBuf,

    /// The script that builds a single container.
    ///
    /// Relative paths are taken from the
    /// containers directory.
    #[arg(long, default_value = BUILD_SCRIPT, env = DEPLOY_BUILD_SCRIPT)]
    #[builder(default = PathBuf::from(BUILD_SCRIPT), into)]
    build_script: PathBuf,

    /// An extra argument passed to the build script
    /// before the container name. Can be repeated.
    #[arg(long = "build-script-arg", allow_hyphen_values = true)]
    #[builder(default)]
    build_script_args: Vec<String>,

    /// Only deploy this container.
    #[arg(short, long, env = CONTAINER)]
    #[builder(into)]
    container: Option<String>,

    /// The git repository the defaults are published to.
    #[arg(long, env = DEFAULTS_REPOSITORY)]
    #[builder(into)]
    defaults_repository: Option<String>,

    /// The directory inside the defaults repository.
    /// Defaults to the container name.
    ///
    /// NOTE: Only used with `--container`.
    #[arg(long, env = DEFAULTS_LABEL)]
    #[builder(into)]
    defaults_label: Option<String>,

    /// The local directory the defaults are copied from.
    ///
    /// NOTE: Only used with `--container`.
    #[arg(long, env = DEFAULTS_DIR)]
    #[builder(into)]
    defaults_dir: Option<PathBuf>,

    /// The branch of the defaults repository to push to.
    #[arg(long, default_value = DEFAULT_BRANCH, env = DEFAULTS_BRANCH)]
    #[builder(default = DEFAULT_BRANCH.to_string(), into)]
    defaults_branch: String,

    /// Stop at the first container that fails.
    #[arg(long, env = DEPLOY_FAIL_FAST)]
    #[builder(default)]
    fail_fast: bool,

    #[clap(flatten)]
    #[builder(default)]
    ci: CiArgs,

    #[clap(flatten)]
    #[builder(default)]
    credentials: CredentialsArgs,

    #[clap(flatten)]
    #[builder(default)]
    drivers: DriverArgs,
}

impl ContainerDeployCommand for DeployCommand {
    fn try_run(&mut self) -> Result<()> {
        trace!("DeployCommand::try_run()");

        let driver = Driver::new(self.drivers);
        let request = DeployRequest::builder()
            .containers_dir(self.containers_dir.clone())
            .build_script(self.build_script.clone())
            .build_script_args(self.build_script_args.clone())
            .maybe_container(self.container.clone())
            .maybe_defaults_repository(self.defaults_repository.clone())
            .maybe_defaults_label(self.defaults_label.clone())
            .maybe_defaults_dir(self.defaults_dir.clone())
            .defaults_branch(self.defaults_branch.clone())
            .credentials(self.credentials.clone())
            .ci(self.ci.apply(driver.ci_context()))
            .registry_tool(driver.registry_driver().binary())
            .fail_fast(self.fail_fast)
            .build();

        pipeline::deploy(&driver, &request)?.into_result()
    }
}
