//! The deploy pipeline: validate everything up front, then build,
//! publish, and sync the defaults of each container in order.

use std::fmt;

use colored::Colorize;
use container_deploy_process_management::drivers::{
    opts::BuildScriptOpts, BuildDriver, RegistryDriver, VcsDriver,
};
use indexmap::IndexMap;
use log::{error, info, trace, warn};
use miette::{bail, Report, Result};

use self::{
    config::{ContainerPlan, DefaultsPlan, DeployRequest, PipelineConfig},
    defaults::DefaultsSynchronizer,
    error::ValidationError,
    publish::{ImagePublisher, PublishResult},
};

pub mod config;
pub mod defaults;
pub mod error;
pub mod publish;
pub mod validate;

/// The step a container was on when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Build,
    Publish,
    SyncDefaults,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Build => "build",
            Self::Publish => "publish",
            Self::SyncDefaults => "defaults sync",
        })
    }
}

#[derive(Debug)]
pub enum ContainerOutcome {
    Succeeded {
        publish: PublishResult,
        defaults_synced: bool,
    },
    Failed {
        stage: Stage,
        report: Report,
    },

    /// Skipped after an earlier container failed with fail-fast on.
    NotRun,
}

impl ContainerOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    #[must_use]
    pub const fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::Failed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// The outcome of every targeted container, in processing order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: IndexMap<String, ContainerOutcome>,
}

impl RunReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.values().all(ContainerOutcome::is_success)
    }

    #[must_use]
    pub fn get(&self, container: &str) -> Option<&ContainerOutcome> {
        self.outcomes.get(container)
    }

    /// Log each failure and collapse the report into a single result.
    ///
    /// # Errors
    /// Will error if any container did not complete every step.
    pub fn into_result(self) -> Result<()> {
        let total = self.outcomes.len();
        let mut failed = Vec::new();

        for (name, outcome) in self.outcomes {
            match outcome {
                ContainerOutcome::Succeeded { publish, .. } => {
                    info!("{} {} {}", "✓".green(), name.bold(), publish.image);
                }
                ContainerOutcome::Failed { stage, report } => {
                    error!("{} {} failed during {stage}: {report:?}", "✗".red(), name.bold());
                    failed.push(format!("{name} ({stage})"));
                }
                ContainerOutcome::NotRun => {
                    warn!("{} {} was not run", "-".yellow(), name.bold());
                    failed.push(format!("{name} (not run)"));
                }
            }
        }

        if !failed.is_empty() {
            bail!(
                "{} of {total} container(s) did not deploy: {}",
                failed.len(),
                failed.join(", ")
            );
        }
        Ok(())
    }
}

/// Runs validated container plans against a driver.
pub struct Pipeline<'a, D> {
    driver: &'a D,
    config: &'a PipelineConfig,
}

impl<'a, D> Pipeline<'a, D>
where
    D: BuildDriver + RegistryDriver + VcsDriver,
{
    pub const fn new(driver: &'a D, config: &'a PipelineConfig) -> Self {
        Self { driver, config }
    }

    /// Process each plan in order. Without fail-fast every container
    /// is attempted; with it the rest are marked not run after the
    /// first failure.
    pub fn run(&self, plans: &[ContainerPlan]) -> RunReport {
        trace!("Pipeline::run({} plans)", plans.len());

        info!(
            "Deploying {} container(s) with a {}",
            plans.len(),
            self.config.tag_type.describe()
        );

        let mut publisher = ImagePublisher::new(self.driver, &self.config.credentials);
        let mut report = RunReport::default();
        let mut aborted = false;

        for plan in plans {
            let outcome = if aborted {
                ContainerOutcome::NotRun
            } else {
                self.run_container(&mut publisher, plan)
            };

            if let ContainerOutcome::Failed { stage, .. } = &outcome {
                warn!("{} failed during {stage}", plan.name());
                aborted = self.config.fail_fast;
            }
            report.outcomes.insert(plan.name().to_string(), outcome);
        }

        report
    }

    fn run_container(&self, publisher: &mut ImagePublisher<'_, D>, plan: &ContainerPlan) -> ContainerOutcome {
        info!("Building {} as {}", plan.name().bold(), plan.image);

        if let Err(report) = self.driver.build(
            &BuildScriptOpts::builder()
                .script(&self.config.build_script)
                .working_dir(&self.config.containers_dir)
                .container(plan.name())
                .tag(plan.tag.as_str())
                .credentials(&self.config.credentials)
                .args(&self.config.build_script_args)
                .build(),
        ) {
            return ContainerOutcome::Failed {
                stage: Stage::Build,
                report,
            };
        }

        let publish = match publisher.publish(plan) {
            Ok(publish) => publish,
            Err(report) => {
                return ContainerOutcome::Failed {
                    stage: Stage::Publish,
                    report,
                }
            }
        };

        let defaults_synced = match &plan.defaults {
            DefaultsPlan::Sync(target) => {
                if let Err(report) =
                    DefaultsSynchronizer::new(self.driver).sync(plan.name(), &plan.tag, target)
                {
                    return ContainerOutcome::Failed {
                        stage: Stage::SyncDefaults,
                        report,
                    };
                }
                true
            }
            DefaultsPlan::Skip(reason) => {
                info!("Skipping defaults for {}: {reason}", plan.name());
                false
            }
        };

        ContainerOutcome::Succeeded {
            publish,
            defaults_synced,
        }
    }
}

/// Validate a request and run it.
///
/// # Errors
/// Returns the validation problems when nothing could be run.
pub fn deploy<D>(driver: &D, request: &DeployRequest) -> Result<RunReport, ValidationError>
where
    D: BuildDriver + RegistryDriver + VcsDriver,
{
    let (config, plans) = validate::validate_deploy(request)?;
    Ok(Pipeline::new(driver, &config).run(&plans))
}

#[cfg(test)]
mod test {
    use std::{fs, path::Path};

    use container_deploy_process_management::drivers::{types::CiContext, DriverCall, TestDriver};
    use container_deploy_utils::constants::DOCKER_BUILDER_USER;
    use pretty_assertions::assert_eq;

    use crate::test::{deploy_request, fixture, pr_context, push_context};

    use super::{config::DeployRequest, deploy, ContainerOutcome, Stage};

    const WEB: &str = "registry.example.com/org/web:1.4.57";
    const WEB_LATEST: &str = "registry.example.com/org/web:latest";
    const MESSAGE: &str = "Updating [ web ] defaults. Triggered by Docker build [ 1.4.57 ]";

    fn single_web(root: &Path, ci: CiContext) -> DeployRequest {
        DeployRequest {
            container: Some("web".into()),
            defaults_repository: Some("git@github.com:org/defaults.git".into()),
            ..deploy_request(root, ci)
        }
    }

    #[test]
    fn web_push_builds_publishes_and_syncs() {
        let root = fixture();
        let driver = TestDriver::new();

        let report = deploy(&driver, &single_web(root.path(), push_context())).unwrap();

        assert!(report.is_success());
        let calls = driver.calls();
        assert_eq!(
            calls[..5],
            [
                DriverCall::Build {
                    container: "web".into(),
                    tag: "1.4.57".into(),
                    args: vec![],
                },
                DriverCall::Login {
                    registry: "registry.example.com".into(),
                    username: "bot".into(),
                },
                DriverCall::Push { image: WEB.into() },
                DriverCall::Tag {
                    src: WEB.into(),
                    dest: WEB_LATEST.into(),
                },
                DriverCall::Push {
                    image: WEB_LATEST.into()
                },
            ]
        );
        assert!(matches!(&calls[5], DriverCall::Clone { url, .. } if url == "git@github.com:org/defaults.git"));
        assert_eq!(
            calls[6..],
            [
                DriverCall::Add { path: "web".into() },
                DriverCall::Commit {
                    message: MESSAGE.into()
                },
                DriverCall::PushBranch {
                    branch: "master".into()
                },
                DriverCall::CreateTag {
                    tag: "web/1.4.57".into(),
                    message: MESSAGE.into(),
                },
                DriverCall::PushTag {
                    tag: "web/1.4.57".into()
                },
            ]
        );
        assert!(matches!(
            report.get("web"),
            Some(ContainerOutcome::Succeeded {
                defaults_synced: true,
                ..
            })
        ));
    }

    #[test]
    fn single_label_registry_is_pushed_as_is() {
        let root = fixture();
        fs::write(
            root.path().join("web/docker_metadata.sh"),
            "export DOCKER_REGISTRY_HOST=\"registry\"\nexport DOCKER_REPOSITORY=\"org/web\"\nexport DOCKER_MINOR_VERSION=\"1.4\"\n",
        )
        .unwrap();
        let driver = TestDriver::new();

        let report = deploy(&driver, &single_web(root.path(), push_context())).unwrap();

        assert!(report.is_success());
        assert_eq!(
            driver.calls()[1..5],
            [
                DriverCall::Login {
                    registry: "registry".into(),
                    username: "bot".into(),
                },
                DriverCall::Push {
                    image: "registry/org/web:1.4.57".into()
                },
                DriverCall::Tag {
                    src: "registry/org/web:1.4.57".into(),
                    dest: "registry/org/web:latest".into(),
                },
                DriverCall::Push {
                    image: "registry/org/web:latest".into()
                },
            ]
        );
    }

    #[test]
    fn pull_request_pushes_branch_tag_only() {
        let root = fixture();
        let driver = TestDriver::new();

        let report = deploy(&driver, &single_web(root.path(), pr_context())).unwrap();

        assert!(report.is_success());
        let calls = driver.calls();
        assert!(calls.contains(&DriverCall::Push {
            image: "registry.example.com/org/web:feature-x".into()
        }));
        assert!(!calls
            .iter()
            .any(|call| matches!(call, DriverCall::Tag { .. })));
        assert!(calls.contains(&DriverCall::PushTag {
            tag: "web/feature-x".into()
        }));
    }

    #[test]
    fn invalid_config_touches_nothing() {
        let root = fixture();
        let driver = TestDriver::new();
        let request = DeployRequest {
            credentials: Default::default(),
            ..single_web(root.path(), push_context())
        };

        let err = deploy(&driver, &request).unwrap_err();

        assert!(err.names_var(DOCKER_BUILDER_USER));
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn failures_are_collected_and_the_rest_continue() {
        let root = fixture();
        let driver = TestDriver::new().fail_when(
            |call| matches!(call, DriverCall::Build { container, .. } if container == "api"),
        );

        let report = deploy(&driver, &deploy_request(root.path(), push_context())).unwrap();

        assert!(!report.is_success());
        assert_eq!(report.get("api").and_then(ContainerOutcome::failed_stage), Some(Stage::Build));
        assert!(report.get("web").is_some_and(ContainerOutcome::is_success));
        assert!(driver.calls().contains(&DriverCall::Push { image: WEB.into() }));
        assert!(report.into_result().is_err());
    }

    #[test]
    fn fail_fast_stops_after_first_failure() {
        let root = fixture();
        let driver = TestDriver::new().fail_when(
            |call| matches!(call, DriverCall::Build { container, .. } if container == "api"),
        );
        let request = DeployRequest {
            fail_fast: true,
            ..deploy_request(root.path(), push_context())
        };

        let report = deploy(&driver, &request).unwrap();

        assert!(matches!(report.get("web"), Some(ContainerOutcome::NotRun)));
        assert_eq!(driver.calls().len(), 1);
    }

    #[test]
    fn failed_push_blocks_defaults_sync() {
        let root = fixture();
        let driver = TestDriver::new()
            .fail_when(|call| matches!(call, DriverCall::Push { image } if image == WEB));

        let report = deploy(&driver, &single_web(root.path(), push_context())).unwrap();

        assert_eq!(report.get("web").and_then(ContainerOutcome::failed_stage), Some(Stage::Publish));
        assert!(!driver
            .calls()
            .iter()
            .any(|call| matches!(call, DriverCall::Clone { .. })));
    }

    #[test]
    fn stale_latest_is_a_publish_failure() {
        let root = fixture();
        let driver = TestDriver::new()
            .fail_when(|call| matches!(call, DriverCall::Push { image } if image == WEB_LATEST));

        let report = deploy(&driver, &single_web(root.path(), push_context())).unwrap();

        let Some(ContainerOutcome::Failed { stage, report }) = report.get("web") else {
            panic!("web should have failed");
        };
        assert_eq!(*stage, Stage::Publish);
        assert!(format!("{report:?}").contains("latest alias is stale"));
        assert!(driver.calls().contains(&DriverCall::Push { image: WEB.into() }));
    }

    #[test]
    fn sync_failure_is_reported_separately() {
        let root = fixture();
        let driver =
            TestDriver::new().fail_when(|call| matches!(call, DriverCall::PushBranch { .. }));

        let report = deploy(&driver, &single_web(root.path(), push_context())).unwrap();

        assert_eq!(
            report.get("web").and_then(ContainerOutcome::failed_stage),
            Some(Stage::SyncDefaults)
        );
    }

    #[test]
    fn registry_login_happens_once() {
        let root = fixture();
        fs::remove_dir_all(root.path().join("web/defaults")).unwrap();
        let driver = TestDriver::new();
        let request = DeployRequest {
            defaults_repository: Some("git@github.com:org/defaults.git".into()),
            ..deploy_request(root.path(), push_context())
        };

        let report = deploy(&driver, &request).unwrap();

        assert!(report.is_success());
        let logins = driver
            .calls()
            .into_iter()
            .filter(|call| matches!(call, DriverCall::Login { .. }))
            .count();
        assert_eq!(logins, 1);
        assert!(matches!(
            report.get("web"),
            Some(ContainerOutcome::Succeeded {
                defaults_synced: false,
                ..
            })
        ));
    }
}
