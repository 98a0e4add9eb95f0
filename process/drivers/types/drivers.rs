use clap::ValueEnum;
use container_deploy_utils::constants::{GITHUB_ACTIONS, GITLAB_CI, TRAVIS};
use log::trace;

#[cfg(not(test))]
use container_deploy_utils::get_env_var;

#[cfg(test)]
use container_deploy_utils::test_utils::get_env_var;

use crate::drivers::DetermineDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RegistryDriverType {
    Docker,
    Podman,
}

impl RegistryDriverType {
    /// The CLI binary backing this driver.
    #[must_use]
    pub const fn binary(self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Podman => "podman",
        }
    }
}

impl DetermineDriver<RegistryDriverType> for Option<RegistryDriverType> {
    fn determine_driver(&mut self) -> RegistryDriverType {
        trace!("RegistryDriverType::determine_driver()");

        // Falling back to docker lets validation report the missing binary.
        *self.get_or_insert(
            match (
                container_deploy_utils::check_command_exists("docker"),
                container_deploy_utils::check_command_exists("podman"),
            ) {
                (Err(_), Ok(())) => RegistryDriverType::Podman,
                _ => RegistryDriverType::Docker,
            },
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CiDriverType {
    Local,
    Travis,
    Github,
    Gitlab,
}

impl DetermineDriver<CiDriverType> for Option<CiDriverType> {
    fn determine_driver(&mut self) -> CiDriverType {
        trace!("CiDriverType::determine_driver()");

        *self.get_or_insert(
            match (
                get_env_var(TRAVIS).ok(),
                get_env_var(GITHUB_ACTIONS).ok(),
                get_env_var(GITLAB_CI).ok(),
            ) {
                (Some(_travis), _, _) => CiDriverType::Travis,
                (None, Some(_github_actions), _) => CiDriverType::Github,
                (None, None, Some(_gitlab_ci)) => CiDriverType::Gitlab,
                _ => CiDriverType::Local,
            },
        )
    }
}

#[cfg(test)]
mod test {
    use container_deploy_utils::{
        constants::{GITHUB_ACTIONS, GITLAB_CI, TRAVIS},
        test_utils::{set_env_var, unset_env_var},
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::drivers::DetermineDriver;

    use super::{CiDriverType, RegistryDriverType};

    fn clear() {
        unset_env_var(TRAVIS);
        unset_env_var(GITHUB_ACTIONS);
        unset_env_var(GITLAB_CI);
    }

    #[rstest]
    #[case::travis(&[TRAVIS], CiDriverType::Travis)]
    #[case::github(&[GITHUB_ACTIONS], CiDriverType::Github)]
    #[case::gitlab(&[GITLAB_CI], CiDriverType::Gitlab)]
    #[case::travis_wins(&[GITLAB_CI, TRAVIS], CiDriverType::Travis)]
    #[case::github_before_gitlab(&[GITLAB_CI, GITHUB_ACTIONS], CiDriverType::Github)]
    #[case::local(&[], CiDriverType::Local)]
    fn detects_ci_driver(#[case] vars: &[&str], #[case] expected: CiDriverType) {
        clear();
        for var in vars {
            set_env_var(var, "true");
        }

        assert_eq!(None::<CiDriverType>.determine_driver(), expected);
    }

    #[test]
    fn selected_driver_is_kept() {
        clear();
        set_env_var(TRAVIS, "true");

        assert_eq!(Some(CiDriverType::Gitlab).determine_driver(), CiDriverType::Gitlab);
        assert_eq!(
            Some(RegistryDriverType::Podman).determine_driver(),
            RegistryDriverType::Podman
        );
    }

    #[test]
    fn registry_binaries() {
        assert_eq!(RegistryDriverType::Docker.binary(), "docker");
        assert_eq!(RegistryDriverType::Podman.binary(), "podman");
    }
}
