//! Checks everything a run depends on before any build, push, or
//! clone happens.
//!
//! Every check runs even after one fails so a single invocation
//! reports all of the problems at once.

use std::path::{Component, Path, PathBuf};

use container_deploy_definition::{
    container, ContainerLayout, ContainerSpec, Metadata, RepositoryName, TagType, VersionTag,
};
use container_deploy_process_management::drivers::types::{CiContext, CiValue};
use container_deploy_utils::{
    constants::{
        CONTAINER, DEFAULTS_REPOSITORY, DOCKER_BUILDER_PASSWORD, DOCKER_BUILDER_USER, DOCKER_TAG,
        LATEST_TAG,
    },
    credentials::Credentials,
    is_executable,
};
use lazy_regex::regex_is_match;
use log::{debug, info, trace, warn};
use oci_distribution::Reference;

use super::{
    config::{
        ContainerPlan, DefaultsPlan, DefaultsTarget, DeployRequest, PipelineConfig, SyncJob,
        SyncRequest, ToolCheck,
    },
    error::{ConfigError, ValidationError},
};

const GIT: &str = "git";
const GIT_DIR: &str = ".git";

struct Validator {
    errors: Vec<ConfigError>,
    tool_check: ToolCheck,
}

impl Validator {
    fn new(tool_check: ToolCheck) -> Self {
        Self {
            errors: Vec::new(),
            tool_check,
        }
    }

    fn push<E: Into<ConfigError>>(&mut self, err: E) {
        let err = err.into();
        debug!("Validation failed: {err}");
        self.errors.push(err);
    }

    fn check<T, E: Into<ConfigError>>(&mut self, result: Result<T, E>) -> Option<T> {
        result.map_err(|err| self.push(err)).ok()
    }

    fn require(&mut self, var: &'static str, what: &'static str, value: Option<&str>) -> Option<String> {
        let value = value.map(str::trim).filter(|value| !value.is_empty());

        if value.is_none() {
            self.push(ConfigError::MissingEnvVar { var, what });
        }
        value.map(ToString::to_string)
    }

    fn require_ci(&mut self, value: &CiValue, what: &'static str) -> Option<String> {
        self.require(value.var, what, value.value())
    }

    fn require_dir(&mut self, what: &'static str, path: &Path) -> bool {
        let exists = path.is_dir();

        if !exists {
            self.push(ConfigError::MissingDirectory {
                what,
                path: path.to_path_buf(),
            });
        }
        exists
    }

    fn require_build_script(&mut self, path: &Path) {
        if !path.is_file() {
            self.push(ConfigError::MissingFile {
                what: "build script",
                path: path.to_path_buf(),
            });
        } else if !is_executable(path) {
            self.push(ConfigError::BuildScriptNotExecutable {
                path: path.to_path_buf(),
            });
        }
    }

    fn require_tool(&mut self, tool: &'static str) {
        if !(self.tool_check)(tool) {
            self.push(ConfigError::MissingTool {
                tool: tool.to_string(),
            });
        }
    }

    fn credentials(&mut self, request: &DeployRequest) -> Option<Credentials> {
        let username = self.require(
            DOCKER_BUILDER_USER,
            "registry username",
            request.credentials.username(),
        );
        let password = request.credentials.password();

        if password.is_none() {
            self.push(ConfigError::MissingEnvVar {
                var: DOCKER_BUILDER_PASSWORD,
                what: "registry password",
            });
        }

        Some(
            Credentials::builder()
                .username(username?)
                .password(password?)
                .build(),
        )
    }

    fn tag_type(&mut self, ci: &CiContext) -> Option<TagType> {
        trace!("Validator::tag_type({ci:?})");

        let event = self.require_ci(&ci.event_type, "CI event type")?;

        let tag_type = if ci.is_pull_request() == Some(true) {
            TagType::PullRequest {
                branch: self.require_ci(&ci.pull_request_branch, "pull request source branch")?,
            }
        } else {
            TagType::IncrementPatch {
                build_number: self.require_ci(&ci.build_number, "CI build number")?,
            }
        };

        info!(
            "{:?} event {event:?} resolved to a {}",
            ci.driver,
            tag_type.describe()
        );
        Some(tag_type)
    }

    fn defaults_label(&mut self, label: &str) -> Option<String> {
        let label = label.trim();
        let mut components = Path::new(label).components();
        let plain = !label.is_empty()
            && components
                .clone()
                .all(|component| matches!(component, Component::Normal(_)))
            && !matches!(
                components.next(),
                Some(first) if first.as_os_str().eq_ignore_ascii_case(GIT_DIR)
            );

        if plain {
            Some(label.to_string())
        } else {
            self.push(ConfigError::InvalidDefaultsLabel {
                label: label.to_string(),
            });
            None
        }
    }

    fn repository(&mut self, url: Option<&str>) -> Option<(String, RepositoryName)> {
        let url = url.map(str::trim).filter(|url| !url.is_empty())?;
        let repository = self.check(url.parse::<RepositoryName>())?;

        debug!("Defaults repository {url} is {repository}");
        Some((url.to_string(), repository))
    }

    fn metadata(&mut self, spec: &ContainerSpec) -> Option<Metadata> {
        if !spec.metadata.is_file() {
            self.push(ConfigError::MissingFile {
                what: "metadata file",
                path: spec.metadata.clone(),
            });
            return None;
        }

        self.check(Metadata::from_file(&spec.metadata))
    }

    fn container_specs(&mut self, root: &Path, selected: Option<&str>) -> Vec<ContainerSpec> {
        match selected {
            Some(name) => self.check(container::find(root, name)).into_iter().collect(),
            None => self.check(container::discover(root)).unwrap_or_default(),
        }
    }

    /// Flat containers always need their descriptor, nested ones only
    /// when they are deployed on their own.
    fn require_descriptor(&mut self, spec: &ContainerSpec, single: bool) {
        if (single || spec.layout == ContainerLayout::Flat) && !spec.has_descriptor() {
            self.push(ConfigError::MissingFile {
                what: "build descriptor",
                path: spec.descriptor.clone(),
            });
        }
    }

    /// Resolve the image reference for a container, checking every key
    /// the metadata has to provide.
    fn image(
        &mut self,
        spec: &ContainerSpec,
        metadata: &Metadata,
        tag_type: Option<&TagType>,
    ) -> Option<(String, VersionTag, Reference)> {
        let registry = self.check(metadata.registry_host()).map(ToString::to_string);
        let repository = self.check(metadata.repository_for(spec));
        let tag = tag_type.and_then(|tag_type| self.check(tag_type.version_tag(metadata)));
        let (registry, repository, tag) = (registry?, repository?, tag?);

        let reference = format!("{registry}/{repository}:{tag}");
        let invalid = |reason: String| ConfigError::InvalidImageReference {
            container: spec.name.clone(),
            reference: reference.clone(),
            reason,
        };

        if !regex_is_match!(
            r"^[A-Za-z0-9]([A-Za-z0-9.-]*[A-Za-z0-9])?(:[0-9]+)?$",
            &registry
        ) {
            self.push(invalid(format!("{registry:?} is not a registry host")));
            return None;
        }

        // Under `localhost` the first repository segment can't be taken
        // for a host, and the host itself is kept verbatim below.
        match format!("localhost/{repository}:{tag}").parse::<Reference>() {
            Ok(parsed) if parsed.repository() == repository => {
                let image = Reference::with_tag(registry.clone(), repository, tag.to_string());
                Some((registry, tag, image))
            }
            Ok(parsed) => {
                self.push(invalid(format!(
                    "the repository would be read as {}",
                    parsed.repository()
                )));
                None
            }
            Err(err) => {
                self.push(invalid(err.to_string()));
                None
            }
        }
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, ValidationError> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(ValidationError {
                errors: self.errors,
            }),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// The build script path, taken relative to the definitions
/// directory unless absolute.
#[must_use]
pub fn build_script_path(containers_dir: &Path, build_script: &Path) -> PathBuf {
    if build_script.is_absolute() {
        build_script.to_path_buf()
    } else {
        containers_dir.join(build_script)
    }
}

/// Validate a deploy run.
///
/// # Errors
/// Returns every configuration problem found.
pub fn validate_deploy(
    request: &DeployRequest,
) -> Result<(PipelineConfig, Vec<ContainerPlan>), ValidationError> {
    trace!("validate_deploy({request:#?})");

    let mut v = Validator::new(request.tool_check);
    let root = &request.containers_dir;

    let root_exists = v.require_dir("container definitions", root);
    let build_script = build_script_path(root, &request.build_script);
    v.require_build_script(&build_script);

    let credentials = v.credentials(request);
    let tag_type = v.tag_type(&request.ci);

    let selected = non_empty(request.container.as_deref());
    let repository = v.repository(request.defaults_repository.as_deref());
    if selected.is_some() && non_empty(request.defaults_repository.as_deref()).is_none() {
        v.push(ConfigError::MissingEnvVar {
            var: DEFAULTS_REPOSITORY,
            what: "defaults repository",
        });
    }

    let label = non_empty(request.defaults_label.as_deref());
    let defaults_dir = request.defaults_dir.as_deref();
    if selected.is_none() && (label.is_some() || defaults_dir.is_some()) {
        warn!("The defaults label and directory only apply when a single container is selected");
    }
    let label = match (selected, label) {
        (Some(_), Some(label)) => v.defaults_label(label),
        _ => None,
    };
    let defaults_dir = match (selected, defaults_dir) {
        (Some(_), Some(dir)) => v.require_dir("defaults", dir).then(|| dir.to_path_buf()),
        _ => None,
    };

    let specs = if root_exists {
        v.container_specs(root, selected)
    } else {
        Vec::new()
    };

    let mut plans = Vec::with_capacity(specs.len());
    for spec in specs {
        v.require_descriptor(&spec, selected.is_some());
        let Some(metadata) = v.metadata(&spec) else {
            continue;
        };
        let Some((registry, tag, image)) = v.image(&spec, &metadata, tag_type.as_ref()) else {
            continue;
        };

        let latest = tag_type
            .as_ref()
            .is_some_and(TagType::pushes_latest)
            .then(|| {
                Reference::with_tag(
                    image.registry().to_string(),
                    image.repository().to_string(),
                    LATEST_TAG.to_string(),
                )
            });

        let defaults = match &repository {
            None => DefaultsPlan::Skip("no defaults repository is configured".into()),
            Some((url, repository)) => {
                let source = defaults_dir
                    .clone()
                    .unwrap_or_else(|| spec.defaults_dir.clone());

                if source.is_dir() {
                    DefaultsPlan::Sync(DefaultsTarget {
                        url: url.clone(),
                        repository: repository.clone(),
                        label: label.clone().unwrap_or_else(|| spec.name.clone()),
                        source,
                        branch: request.defaults_branch.clone(),
                    })
                } else {
                    DefaultsPlan::Skip(format!("{} does not exist", source.display()))
                }
            }
        };

        debug!("Planned {} as {image}", spec.name);
        plans.push(ContainerPlan {
            spec,
            metadata,
            registry,
            tag,
            image,
            latest,
            defaults,
        });
    }

    v.require_tool(request.registry_tool);
    if plans
        .iter()
        .any(|plan| matches!(plan.defaults, DefaultsPlan::Sync(_)))
    {
        v.require_tool(GIT);
    }

    let config = credentials.zip(tag_type).map(|(credentials, tag_type)| PipelineConfig {
        containers_dir: root.clone(),
        build_script,
        build_script_args: request.build_script_args.clone(),
        credentials,
        tag_type,
        fail_fast: request.fail_fast,
    });

    v.finish(config.map(|config| (config, plans)))
}

/// Validate a standalone defaults update.
///
/// # Errors
/// Returns every configuration problem found.
pub fn validate_sync(request: &SyncRequest) -> Result<SyncJob, ValidationError> {
    trace!("validate_sync({request:#?})");

    let mut v = Validator::new(request.tool_check);

    let container = v.require(CONTAINER, "container name", request.container.as_deref());
    let url = v.require(
        DEFAULTS_REPOSITORY,
        "defaults repository",
        request.defaults_repository.as_deref(),
    );
    let repository = v.repository(url.as_deref());
    let tag = v
        .require(DOCKER_TAG, "image tag", request.tag.as_deref())
        .and_then(|tag| v.check(tag.parse::<VersionTag>()));
    let label = non_empty(request.defaults_label.as_deref())
        .or(container.as_deref())
        .and_then(|label| v.defaults_label(label));
    let source_exists = v.require_dir("defaults", &request.defaults_dir);
    v.require_tool(GIT);

    let job = (|| {
        let (url, repository) = repository?;
        source_exists.then_some(())?;

        Some(SyncJob {
            container: container?,
            tag: tag?,
            target: DefaultsTarget {
                url,
                repository,
                label: label?,
                source: request.defaults_dir.clone(),
                branch: request.defaults_branch.clone(),
            },
        })
    })();

    v.finish(job)
}

/// Resolve the version tag a single container would be published with.
///
/// # Errors
/// Returns every configuration problem found.
pub fn resolve_version_tag(
    containers_dir: &Path,
    container: &str,
    ci: &CiContext,
) -> Result<VersionTag, ValidationError> {
    trace!("resolve_version_tag({}, {container})", containers_dir.display());

    let mut v = Validator::new(|_| true);

    let tag_type = v.tag_type(ci);
    let tag = if v.require_dir("container definitions", containers_dir) {
        v.check(container::find(containers_dir, container))
            .and_then(|spec| v.metadata(&spec))
            .zip(tag_type)
            .and_then(|(metadata, tag_type)| v.check(tag_type.version_tag(&metadata)))
    } else {
        None
    };

    v.finish(tag)
}
