use std::path::PathBuf;

use bon::Builder;
use container_deploy_definition::{
    ContainerSpec, Metadata, RepositoryName, TagType, VersionTag,
};
use container_deploy_process_management::drivers::types::CiContext;
use container_deploy_utils::{
    constants::DEFAULT_BRANCH,
    credentials::{Credentials, CredentialsArgs},
};
use oci_distribution::Reference;

/// Checks whether a command can be found on `PATH`.
pub type ToolCheck = fn(&'static str) -> bool;

pub(crate) fn tool_on_path(tool: &'static str) -> bool {
    container_deploy_utils::check_command_exists(tool).is_ok()
}

/// The raw inputs of a deploy run, gathered from arguments and the
/// CI environment before anything is checked.
#[derive(Debug, Clone, Builder)]
pub struct DeployRequest {
    #[builder(into)]
    pub containers_dir: PathBuf,

    /// Relative paths are taken from `containers_dir`.
    #[builder(into)]
    pub build_script: PathBuf,

    #[builder(default)]
    pub build_script_args: Vec<String>,

    /// Deploy only this container.
    #[builder(into)]
    pub container: Option<String>,

    #[builder(into)]
    pub defaults_repository: Option<String>,

    #[builder(into)]
    pub defaults_label: Option<String>,

    /// Defaults source for a single selected container.
    #[builder(into)]
    pub defaults_dir: Option<PathBuf>,

    #[builder(default = DEFAULT_BRANCH.to_string(), into)]
    pub defaults_branch: String,

    #[builder(default)]
    pub credentials: CredentialsArgs,

    pub ci: CiContext,

    /// The registry CLI that has to be installed.
    pub registry_tool: &'static str,

    #[builder(default)]
    pub fail_fast: bool,

    #[builder(default = tool_on_path as ToolCheck)]
    pub tool_check: ToolCheck,
}

/// The raw inputs of a standalone defaults update.
#[derive(Debug, Clone, Builder)]
pub struct SyncRequest {
    #[builder(into)]
    pub container: Option<String>,

    #[builder(into)]
    pub defaults_repository: Option<String>,

    #[builder(into)]
    pub defaults_label: Option<String>,

    #[builder(into)]
    pub tag: Option<String>,

    #[builder(into)]
    pub defaults_dir: PathBuf,

    #[builder(default = DEFAULT_BRANCH.to_string(), into)]
    pub defaults_branch: String,

    #[builder(default = tool_on_path as ToolCheck)]
    pub tool_check: ToolCheck,
}

/// Settings shared by every container of a validated run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub containers_dir: PathBuf,
    pub build_script: PathBuf,
    pub build_script_args: Vec<String>,
    pub credentials: Credentials,
    pub tag_type: TagType,
    pub fail_fast: bool,
}

/// A container that passed validation along with everything
/// needed to build and publish it.
#[derive(Debug, Clone)]
pub struct ContainerPlan {
    pub spec: ContainerSpec,
    pub metadata: Metadata,
    pub registry: String,
    pub tag: VersionTag,
    pub image: Reference,

    /// Set when the run moves the `latest` alias.
    pub latest: Option<Reference>,

    pub defaults: DefaultsPlan,
}

impl ContainerPlan {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.spec.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultsPlan {
    Sync(DefaultsTarget),

    /// Why the defaults are left alone.
    Skip(String),
}

/// Where and how a container's defaults are published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultsTarget {
    pub url: String,
    pub repository: RepositoryName,

    /// Directory inside the defaults repository.
    pub label: String,

    /// Local directory the defaults are copied from.
    pub source: PathBuf,

    pub branch: String,
}

/// A validated standalone defaults update.
#[derive(Debug, Clone)]
pub struct SyncJob {
    pub container: String,
    pub tag: VersionTag,
    pub target: DefaultsTarget,
}
