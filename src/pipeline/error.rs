use std::path::PathBuf;

use container_deploy_definition::{
    DiscoveryError, MetadataError, RepositoryUrlError, TagError, VersionTagError,
};
use miette::Diagnostic;
use thiserror::Error;

/// A single problem found while checking a run's configuration.
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("Missing required value {var} ({what})")]
    #[diagnostic(help("Set the {var} environment variable or pass the matching option"))]
    MissingEnvVar {
        var: &'static str,
        what: &'static str,
    },

    #[error("The {what} directory {} does not exist", .path.display())]
    #[diagnostic()]
    MissingDirectory { what: &'static str, path: PathBuf },

    #[error("The {what} {} does not exist", .path.display())]
    #[diagnostic()]
    MissingFile { what: &'static str, path: PathBuf },

    #[error("The build script {} is not executable", .path.display())]
    #[diagnostic(help("Make it executable with `chmod +x`"))]
    BuildScriptNotExecutable { path: PathBuf },

    #[error("Image reference {reference} for container {container} is invalid: {reason}")]
    #[diagnostic(help("Check the registry host and repository in the container's metadata"))]
    InvalidImageReference {
        container: String,
        reference: String,
        reason: String,
    },

    #[error("Defaults label {label:?} must be a relative path inside the defaults repository")]
    #[diagnostic()]
    InvalidDefaultsLabel { label: String },

    #[error("Required command {tool} was not found on PATH")]
    #[diagnostic(help("Install {tool} or select another driver"))]
    MissingTool { tool: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    RepositoryUrl(#[from] RepositoryUrlError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Tag(#[from] TagError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    VersionTag(#[from] VersionTagError),
}

/// Every configuration problem found for a run. Nothing has been
/// built, pushed, or cloned when this is returned.
#[derive(Error, Diagnostic, Debug)]
#[error("Found {} configuration problem(s), nothing was deployed", .errors.len())]
#[diagnostic(help("Fix the problems listed above and run again"))]
pub struct ValidationError {
    #[related]
    pub errors: Vec<ConfigError>,
}

impl ValidationError {
    /// Whether any problem names the given variable.
    #[must_use]
    pub fn names_var(&self, var: &str) -> bool {
        self.errors
            .iter()
            .any(|err| matches!(err, ConfigError::MissingEnvVar { var: v, .. } if *v == var))
    }
}
