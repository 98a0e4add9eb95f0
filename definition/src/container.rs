use std::{
    fs,
    path::{Path, PathBuf},
};

use container_deploy_utils::constants::{
    DEFAULTS_PATH, DESCRIPTOR_EXTENSION, METADATA_FILE, NESTED_DESCRIPTOR_FILE,
};
use log::{debug, trace};

use crate::DiscoveryError;

/// How the container definitions directory is organized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerLayout {
    /// One directory per container holding its own metadata file.
    Nested,

    /// A single shared metadata file and one descriptor per container.
    Flat,
}

impl ContainerLayout {
    /// The root is flat when it holds the metadata file itself.
    #[must_use]
    pub fn detect(root: &Path) -> Self {
        if root.join(METADATA_FILE).is_file() {
            Self::Flat
        } else {
            Self::Nested
        }
    }
}

/// A container found in the definitions directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,

    /// Path to the metadata file for this container.
    pub metadata: PathBuf,

    /// Where the build tool descriptor lives. It may not exist.
    pub descriptor: PathBuf,

    pub layout: ContainerLayout,

    /// Where this container's defaults would come from. It may not exist.
    pub defaults_dir: PathBuf,
}

impl ContainerSpec {
    /// A container living in its own directory `dir`.
    pub fn nested<S, P>(name: S, dir: P) -> Self
    where
        S: Into<String>,
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();

        Self {
            name: name.into(),
            metadata: dir.join(METADATA_FILE),
            descriptor: dir.join(NESTED_DESCRIPTOR_FILE),
            layout: ContainerLayout::Nested,
            defaults_dir: dir.join(DEFAULTS_PATH),
        }
    }

    /// A container described by `<root>/<name>.json`.
    pub fn flat<S, P>(name: S, root: P) -> Self
    where
        S: Into<String>,
        P: AsRef<Path>,
    {
        let name = name.into();
        let root = root.as_ref();

        Self {
            metadata: root.join(METADATA_FILE),
            descriptor: root.join(format!("{name}.{DESCRIPTOR_EXTENSION}")),
            layout: ContainerLayout::Flat,
            defaults_dir: root.join(DEFAULTS_PATH).join(&name),
            name,
        }
    }

    #[must_use]
    pub fn has_descriptor(&self) -> bool {
        self.descriptor.is_file()
    }

    #[must_use]
    pub fn has_defaults(&self) -> bool {
        self.defaults_dir.is_dir()
    }
}

/// Find every container in the definitions directory, sorted by name.
///
/// # Errors
/// Will error if the directory can't be read or holds no containers.
pub fn discover<P: AsRef<Path>>(root: P) -> Result<Vec<ContainerSpec>, DiscoveryError> {
    let root = root.as_ref();
    trace!("discover({})", root.display());

    let layout = ContainerLayout::detect(root);
    let read_err = |source| DiscoveryError::ReadDir {
        path: root.to_path_buf(),
        source,
    };

    let mut containers = Vec::new();
    for entry in fs::read_dir(root).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();

        let spec = match layout {
            ContainerLayout::Nested if path.is_dir() => file_name(&path)
                .filter(|name| is_container_name(name))
                .map(|name| ContainerSpec::nested(name, &path)),
            ContainerLayout::Flat
                if path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext == DESCRIPTOR_EXTENSION) =>
            {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .filter(|name| is_container_name(name))
                    .map(|name| ContainerSpec::flat(name, root))
            }
            _ => None,
        };

        if let Some(spec) = spec {
            containers.push(spec);
        }
    }

    if containers.is_empty() {
        return Err(DiscoveryError::Empty {
            path: root.to_path_buf(),
        });
    }

    containers.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(
        "Found {:?} containers in {}: {:?}",
        layout,
        root.display(),
        containers.iter().map(|c| &c.name).collect::<Vec<_>>()
    );

    Ok(containers)
}

/// Look up a single container by name.
///
/// # Errors
/// Will error if the container doesn't exist for the detected layout.
pub fn find<P: AsRef<Path>>(root: P, name: &str) -> Result<ContainerSpec, DiscoveryError> {
    let root = root.as_ref();
    trace!("find({}, {name})", root.display());

    let (spec, expected) = match ContainerLayout::detect(root) {
        ContainerLayout::Nested => {
            let dir = root.join(name);
            (
                (is_container_name(name) && dir.is_dir()).then(|| ContainerSpec::nested(name, &dir)),
                dir,
            )
        }
        ContainerLayout::Flat => {
            let spec = ContainerSpec::flat(name, root);
            let expected = spec.descriptor.clone();
            (
                (is_container_name(name) && expected.is_file()).then_some(spec),
                expected,
            )
        }
    };

    spec.ok_or_else(|| DiscoveryError::NotFound {
        name: name.to_string(),
        expected,
    })
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

fn is_container_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name != DEFAULTS_PATH
        && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod test {
    use std::{fs, path::Path};

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use crate::DiscoveryError;

    use super::{discover, find, ContainerLayout};

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn nested_root() -> TempDir {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("web/docker_metadata.sh"));
        touch(&dir.path().join("web/defaults/app.conf"));
        touch(&dir.path().join("api/docker_metadata.sh"));
        touch(&dir.path().join("api/packer.json"));
        touch(&dir.path().join(".git/HEAD"));
        touch(&dir.path().join("defaults/shared.conf"));
        touch(&dir.path().join("README.md"));
        dir
    }

    fn flat_root() -> TempDir {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("docker_metadata.sh"));
        touch(&dir.path().join("worker.json"));
        touch(&dir.path().join("api.json"));
        touch(&dir.path().join(".hidden.json"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("defaults/api/app.conf"));
        dir
    }

    #[test]
    fn discovers_nested_containers_sorted() {
        let dir = nested_root();

        let containers = discover(dir.path()).unwrap();

        let names: Vec<_> = containers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["api", "web"]);

        let api = &containers[0];
        assert_eq!(api.layout, ContainerLayout::Nested);
        assert_eq!(api.metadata, dir.path().join("api/docker_metadata.sh"));
        assert_eq!(api.descriptor, dir.path().join("api/packer.json"));
        assert!(api.has_descriptor());
        assert!(!api.has_defaults());

        let web = &containers[1];
        assert_eq!(web.descriptor, dir.path().join("web/packer.json"));
        assert!(!web.has_descriptor());
        assert!(web.has_defaults());
    }

    #[test]
    fn discovers_flat_containers_sorted() {
        let dir = flat_root();

        let containers = discover(dir.path()).unwrap();

        let names: Vec<_> = containers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["api", "worker"]);

        let api = &containers[0];
        assert_eq!(api.layout, ContainerLayout::Flat);
        assert_eq!(api.metadata, dir.path().join("docker_metadata.sh"));
        assert_eq!(api.descriptor, dir.path().join("api.json"));
        assert_eq!(api.defaults_dir, dir.path().join("defaults/api"));
        assert!(api.has_defaults());
        assert!(!containers[1].has_defaults());
    }

    #[test]
    fn empty_root_is_an_error() {
        let dir = TempDir::new().unwrap();

        assert!(matches!(
            discover(dir.path()).unwrap_err(),
            DiscoveryError::Empty { .. }
        ));
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();

        assert!(matches!(
            discover(dir.path().join("nope")).unwrap_err(),
            DiscoveryError::ReadDir { .. }
        ));
    }

    #[test]
    fn finds_single_container() {
        let nested = nested_root();
        let flat = flat_root();

        assert_eq!(find(nested.path(), "web").unwrap().name, "web");
        assert_eq!(
            find(flat.path(), "worker").unwrap().descriptor,
            flat.path().join("worker.json")
        );
    }

    #[test]
    fn missing_container_names_expected_path() {
        let nested = nested_root();
        let flat = flat_root();

        let err = find(nested.path(), "db").unwrap_err();
        assert!(matches!(
            err,
            DiscoveryError::NotFound { ref expected, .. } if expected == &nested.path().join("db")
        ));

        let err = find(flat.path(), "db").unwrap_err();
        assert!(matches!(
            err,
            DiscoveryError::NotFound { ref expected, .. } if expected == &flat.path().join("db.json")
        ));

        assert!(find(nested.path(), "defaults").is_err());
        assert!(find(nested.path(), "../web").is_err());
    }
}
