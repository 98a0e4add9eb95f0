//! Parsing of the shell style `docker_metadata.sh` files.
//!
//! Only lines shaped like `export KEY="VALUE"` are read. Every other
//! line is skipped without complaint, so a typo in a metadata file
//! shows up later as a missing key rather than a parse error. The
//! typed accessors below exist to turn that into an error naming the
//! key and the file.
//!
//! Values are taken literally: every `"` on the line is dropped and
//! nothing is unescaped, so a value containing a quote does not
//! survive the trip. A value may contain `=` since only the first one
//! separates the key.

use std::{
    fs,
    path::{Path, PathBuf},
};

use container_deploy_utils::constants::{
    DOCKER_MINOR_VERSION, DOCKER_REGISTRY_HOST, DOCKER_REPOSITORY, DOCKER_REPOSITORY_PREFIX,
};
use indexmap::IndexMap;
use lazy_regex::regex_is_match;
use log::{debug, trace};

use crate::{ContainerLayout, ContainerSpec, MetadataError};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metadata {
    entries: IndexMap<String, String>,
    source: PathBuf,
}

impl Metadata {
    /// Parse the contents of a metadata file.
    #[must_use]
    pub fn parse(contents: &str) -> Self {
        let entries = contents
            .lines()
            .filter_map(parse_line)
            .fold(IndexMap::new(), |mut entries, (key, value)| {
                entries.insert(key, value);
                entries
            });

        Self {
            entries,
            source: PathBuf::new(),
        }
    }

    /// Read and parse a metadata file.
    ///
    /// # Errors
    /// Will error if the file cannot be read.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MetadataError> {
        let path = path.as_ref();
        trace!("Metadata::from_file({})", path.display());

        let contents = fs::read_to_string(path).map_err(|source| MetadataError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let metadata = Self {
            source: path.to_path_buf(),
            ..Self::parse(&contents)
        };
        debug!("Metadata for {}: {:?}", path.display(), metadata.entries);

        Ok(metadata)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The file this metadata was read from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Retrieve a key that has to be present and non-empty.
    ///
    /// # Errors
    /// Will error naming the key and file if it's missing.
    pub fn require(&self, key: &'static str) -> Result<&str, MetadataError> {
        self.get(key)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| MetadataError::MissingKey {
                key,
                path: self.source.clone(),
            })
    }

    /// The host of the registry images are pushed to.
    ///
    /// # Errors
    /// Will error if `DOCKER_REGISTRY_HOST` is missing.
    pub fn registry_host(&self) -> Result<&str, MetadataError> {
        self.require(DOCKER_REGISTRY_HOST)
    }

    /// The minor version that patch increments are appended to.
    ///
    /// # Errors
    /// Will error if `DOCKER_MINOR_VERSION` is missing.
    pub fn minor_version(&self) -> Result<&str, MetadataError> {
        self.require(DOCKER_MINOR_VERSION)
    }

    /// The repository path for a container's image.
    ///
    /// Flat layouts share one metadata file, so the repository is
    /// `DOCKER_REPOSITORY_PREFIX/<name>`. Nested layouts use
    /// `DOCKER_REPOSITORY` and fall back to the prefix form.
    ///
    /// # Errors
    /// Will error if the keys needed for the layout are missing.
    pub fn repository_for(&self, spec: &ContainerSpec) -> Result<String, MetadataError> {
        let prefixed = || {
            self.require(DOCKER_REPOSITORY_PREFIX)
                .map(|prefix| format!("{}/{}", prefix.trim_end_matches('/'), spec.name))
        };

        match spec.layout {
            ContainerLayout::Flat => prefixed(),
            ContainerLayout::Nested => match self.require(DOCKER_REPOSITORY) {
                Ok(repository) => Ok(repository.to_string()),
                Err(missing) => prefixed().map_err(|_| missing),
            },
        }
    }
}

fn parse_line(line: &str) -> Option<(String, String)> {
    if !regex_is_match!(r#"^\s*export\s+[^="]+="[^\n]*"\s*$"#, line) {
        return None;
    }

    let stripped = line
        .trim_start()
        .trim_start_matches("export")
        .replace('"', "");
    let (key, value) = stripped.trim().split_once('=')?;
    let key = key.trim();

    if key.is_empty() {
        None
    } else {
        Some((key.to_string(), value.trim().to_string()))
    }
}
