use std::path::Path;

use log::trace;
use miette::Result;

#[cfg(not(test))]
use container_deploy_utils::get_env_var;

#[cfg(test)]
use container_deploy_utils::test_utils::get_env_var;

use super::{
    opts::{BuildScriptOpts, CloneOpts, CreateTagOpts, LoginOpts, PushOpts, TagOpts},
    types::{CiContext, CiDriverType, CiValue},
};

/// Runs the external script that builds a container image.
pub trait BuildDriver {
    /// Runs the build script for a single container.
    ///
    /// # Errors
    /// Will error if the script can't be started or exits non-zero.
    fn build(&self, opts: &BuildScriptOpts) -> Result<()>;
}

/// Allows agnostic login, tagging, and pushing
/// against an image registry.
pub trait RegistryDriver {
    /// Runs the login logic for the driver.
    ///
    /// # Errors
    /// Will error if login fails.
    fn login(&self, opts: &LoginOpts) -> Result<()>;

    /// Runs the tag logic for the driver.
    ///
    /// # Errors
    /// Will error if the tagging fails.
    fn tag(&self, opts: &TagOpts) -> Result<()>;

    /// Runs the push logic for the driver
    ///
    /// # Errors
    /// Will error if the push fails.
    fn push(&self, opts: &PushOpts) -> Result<()>;
}

/// The version control operations used to publish defaults.
///
/// Every operation other than `clone_repo` works on an existing
/// clone at `repo` and talks to its `origin` remote.
pub trait VcsDriver {
    /// # Errors
    /// Will error if the clone fails.
    fn clone_repo(&self, opts: &CloneOpts) -> Result<()>;

    /// Stage `path`, including deletions.
    ///
    /// # Errors
    /// Will error if staging fails.
    fn add(&self, repo: &Path, path: &str) -> Result<()>;

    /// # Errors
    /// Will error if the index can't be compared.
    fn has_staged_changes(&self, repo: &Path) -> Result<bool>;

    /// # Errors
    /// Will error if the commit fails.
    fn commit(&self, repo: &Path, message: &str) -> Result<()>;

    /// # Errors
    /// Will error if the push is rejected.
    fn push_branch(&self, repo: &Path, branch: &str) -> Result<()>;

    /// Whether `tag` is on the remote.
    ///
    /// # Errors
    /// Will error if the remote's tags can't be listed.
    fn tag_exists(&self, repo: &Path, tag: &str) -> Result<bool>;

    /// Deletes `tag` from the clone. A tag the clone never
    /// fetched is left alone.
    ///
    /// # Errors
    /// Will error if the local tag can't be deleted.
    fn delete_tag(&self, repo: &Path, tag: &str) -> Result<()>;

    /// # Errors
    /// Will error if the remote rejects the deletion.
    fn delete_remote_tag(&self, repo: &Path, tag: &str) -> Result<()>;

    /// # Errors
    /// Will error if the tag can't be created.
    fn create_tag(&self, opts: &CreateTagOpts) -> Result<()>;

    /// # Errors
    /// Will error if the remote rejects the tag.
    fn push_tag(&self, repo: &Path, tag: &str) -> Result<()>;
}

/// Reads the event that triggered a run from a CI system's
/// environment variables.
pub trait CiDriver {
    const DRIVER: CiDriverType;

    /// Variable holding the triggering event.
    const EVENT_TYPE: &'static str;

    /// Event value that marks a pull request.
    const PULL_REQUEST_EVENT: &'static str;

    /// Variable holding a pull request's source branch.
    const PULL_REQUEST_BRANCH: &'static str;

    /// Variable holding the incrementing build number.
    const BUILD_NUMBER: &'static str;

    fn context() -> CiContext {
        trace!("{:?}::context()", Self::DRIVER);

        let read = |var: &'static str| {
            CiValue::new(
                var,
                get_env_var(var)
                    .inspect(|v| trace!("{var}={v}"))
                    .ok()
                    .map(|v| v.trim().to_string()),
            )
        };

        CiContext::builder()
            .driver(Self::DRIVER)
            .event_type(read(Self::EVENT_TYPE))
            .pull_request_event(Self::PULL_REQUEST_EVENT)
            .pull_request_branch(read(Self::PULL_REQUEST_BRANCH))
            .build_number(read(Self::BUILD_NUMBER))
            .build()
    }
}
