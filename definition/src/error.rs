use std::{io, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum MetadataError {
    #[error("Failed to read metadata file {}", .path.display())]
    #[diagnostic()]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Metadata key {key} is missing from {}", .path.display())]
    #[diagnostic(help("Add a line like `export {key}=\"...\"` to the metadata file"))]
    MissingKey { key: &'static str, path: PathBuf },
}

#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
#[error("Unrecognized repository URL {url}")]
#[diagnostic(help(
    "Use either the SSH form `git@host:owner/repo.git` or the HTTPS form `https://host/owner/repo.git`"
))]
pub struct RepositoryUrlError {
    pub url: String,
}

#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum VersionTagError {
    #[error("Version tag is empty")]
    #[diagnostic()]
    Empty,

    #[error("Version tag {tag} is not a valid image tag")]
    #[diagnostic(help(
        "Image tags may only contain letters, digits, `_`, `.`, and `-`, must not start with `.` or `-`, and are limited to 128 characters"
    ))]
    Invalid { tag: String },
}

#[derive(Error, Diagnostic, Debug)]
pub enum DiscoveryError {
    #[error("Failed to read container definitions in {}", .path.display())]
    #[diagnostic()]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Container {name} was not found, expected {}", .expected.display())]
    #[diagnostic(help("Check the container name or the container definitions directory"))]
    NotFound { name: String, expected: PathBuf },

    #[error("No containers were found in {}", .path.display())]
    #[diagnostic()]
    Empty { path: PathBuf },
}

#[derive(Error, Diagnostic, Debug)]
pub enum TagError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Version(#[from] VersionTagError),
}
