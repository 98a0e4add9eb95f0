//! Drivers for the external tools a deployment talks to: the build
//! script, the registry CLI, git, and the CI environment. The pipeline
//! only sees the traits, so the implementation details stay out of
//! the command logic.

use std::{path::Path, time::Duration};

use bon::Builder;
use clap::Args;
use container_deploy_utils::constants::{
    DEPLOY_CI_DRIVER, DEPLOY_COMMAND_TIMEOUT, DEPLOY_REGISTRY_DRIVER,
};
use log::trace;
use miette::Result;

use self::{
    build_script_driver::BuildScriptDriver,
    docker_driver::DockerDriver,
    git_driver::GitDriver,
    github_driver::GithubDriver,
    gitlab_driver::GitlabDriver,
    local_driver::LocalDriver,
    opts::{BuildScriptOpts, CloneOpts, CreateTagOpts, LoginOpts, PushOpts, TagOpts},
    podman_driver::PodmanDriver,
    travis_driver::TravisDriver,
    types::{CiContext, CiDriverType, RegistryDriverType},
};

#[cfg(any(test, feature = "test"))]
pub use test_driver::{DriverCall, TestDriver};
pub use traits::*;

mod build_script_driver;
mod docker_driver;
mod git_driver;
mod github_driver;
mod gitlab_driver;
mod local_driver;
pub mod opts;
mod podman_driver;
#[cfg(any(test, feature = "test"))]
mod test_driver;
mod traits;
mod travis_driver;
pub mod types;

/// Args for selecting the various drivers to use for runtime.
///
/// If the args are left uninitialized, the program will determine
/// the best one available.
#[derive(Default, Clone, Copy, Debug, Builder, Args)]
pub struct DriverArgs {
    /// Select which driver to use to login to
    /// and push to the registry.
    #[arg(short = 'R', long, env = DEPLOY_REGISTRY_DRIVER)]
    registry_driver: Option<RegistryDriverType>,

    /// Select which CI system to read the
    /// triggering event from.
    #[arg(long, env = DEPLOY_CI_DRIVER)]
    ci_driver: Option<CiDriverType>,

    /// Kill registry and git commands that
    /// run longer than this many seconds.
    #[arg(long, env = DEPLOY_COMMAND_TIMEOUT)]
    command_timeout: Option<u64>,
}

pub(crate) trait DetermineDriver<T> {
    fn determine_driver(&mut self) -> T;
}

/// The production driver, shelling out to the selected tools.
#[derive(Debug, Clone, Copy)]
pub struct Driver {
    registry_driver: RegistryDriverType,
    ci_driver: CiDriverType,
    timeout: Option<Duration>,
}

impl Driver {
    #[must_use]
    pub fn new(mut args: DriverArgs) -> Self {
        trace!("Driver::new({args:?})");

        let driver = Self {
            registry_driver: args.registry_driver.determine_driver(),
            ci_driver: args.ci_driver.determine_driver(),
            timeout: args.command_timeout.map(Duration::from_secs),
        };
        trace!("Driver set {driver:?}");
        driver
    }

    #[must_use]
    pub const fn registry_driver(&self) -> RegistryDriverType {
        self.registry_driver
    }

    #[must_use]
    pub const fn ci_driver(&self) -> CiDriverType {
        self.ci_driver
    }

    /// Read the CI event context for the selected CI driver.
    #[must_use]
    pub fn ci_context(&self) -> CiContext {
        match self.ci_driver {
            CiDriverType::Local => LocalDriver::context(),
            CiDriverType::Travis => TravisDriver::context(),
            CiDriverType::Github => GithubDriver::context(),
            CiDriverType::Gitlab => GitlabDriver::context(),
        }
    }

    const fn git(&self) -> GitDriver {
        GitDriver::new(self.timeout)
    }
}

impl BuildDriver for Driver {
    fn build(&self, opts: &BuildScriptOpts) -> Result<()> {
        BuildScriptDriver.build(opts)
    }
}

macro_rules! impl_registry_driver {
    ($self:ident.$func:ident($($args:expr),*)) => {
        match $self.registry_driver {
            RegistryDriverType::Docker => DockerDriver::new($self.timeout).$func($($args,)*),
            RegistryDriverType::Podman => PodmanDriver::new($self.timeout).$func($($args,)*),
        }
    };
}

impl RegistryDriver for Driver {
    fn login(&self, opts: &LoginOpts) -> Result<()> {
        impl_registry_driver!(self.login(opts))
    }

    fn tag(&self, opts: &TagOpts) -> Result<()> {
        impl_registry_driver!(self.tag(opts))
    }

    fn push(&self, opts: &PushOpts) -> Result<()> {
        impl_registry_driver!(self.push(opts))
    }
}

impl VcsDriver for Driver {
    fn clone_repo(&self, opts: &CloneOpts) -> Result<()> {
        self.git().clone_repo(opts)
    }

    fn add(&self, repo: &Path, path: &str) -> Result<()> {
        self.git().add(repo, path)
    }

    fn has_staged_changes(&self, repo: &Path) -> Result<bool> {
        self.git().has_staged_changes(repo)
    }

    fn commit(&self, repo: &Path, message: &str) -> Result<()> {
        self.git().commit(repo, message)
    }

    fn push_branch(&self, repo: &Path, branch: &str) -> Result<()> {
        self.git().push_branch(repo, branch)
    }

    fn tag_exists(&self, repo: &Path, tag: &str) -> Result<bool> {
        self.git().tag_exists(repo, tag)
    }

    fn delete_tag(&self, repo: &Path, tag: &str) -> Result<()> {
        self.git().delete_tag(repo, tag)
    }

    fn delete_remote_tag(&self, repo: &Path, tag: &str) -> Result<()> {
        self.git().delete_remote_tag(repo, tag)
    }

    fn create_tag(&self, opts: &CreateTagOpts) -> Result<()> {
        self.git().create_tag(opts)
    }

    fn push_tag(&self, repo: &Path, tag: &str) -> Result<()> {
        self.git().push_tag(repo, tag)
    }
}

#[cfg(test)]
mod test {
    use container_deploy_utils::{
        constants::{TRAVIS, TRAVIS_BUILD_NUMBER, TRAVIS_EVENT_TYPE},
        test_utils::set_env_var,
    };
    use pretty_assertions::assert_eq;

    use super::{
        types::{CiDriverType, RegistryDriverType},
        Driver, DriverArgs,
    };

    #[test]
    fn explicit_args_select_drivers() {
        let driver = Driver::new(
            DriverArgs::builder()
                .registry_driver(RegistryDriverType::Podman)
                .ci_driver(CiDriverType::Travis)
                .command_timeout(30)
                .build(),
        );

        assert_eq!(driver.registry_driver(), RegistryDriverType::Podman);
        assert_eq!(driver.ci_driver(), CiDriverType::Travis);
    }

    #[test]
    fn ci_context_uses_selected_driver() {
        set_env_var(TRAVIS, "true");
        set_env_var(TRAVIS_EVENT_TYPE, "push");
        set_env_var(TRAVIS_BUILD_NUMBER, "57");

        let driver = Driver::new(
            DriverArgs::builder()
                .registry_driver(RegistryDriverType::Docker)
                .build(),
        );
        let context = driver.ci_context();

        assert_eq!(context.driver, CiDriverType::Travis);
        assert_eq!(context.build_number.value(), Some("57"));
    }
}
