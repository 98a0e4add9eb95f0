pub mod command_output;
pub mod constants;
pub mod credentials;
mod macros;
pub mod secret;

#[cfg(any(test, feature = "test"))]
pub mod test_utils;

use std::{env, path::Path};

use log::trace;
use miette::{miette, IntoDiagnostic, Result};

pub use command_output::*;

/// Checks for the existance of a given command.
///
/// # Errors
/// Will error if the command doesn't exist.
pub fn check_command_exists(command: &str) -> Result<()> {
    trace!("check_command_exists({command})");

    which::which(command)
        .map(|path| trace!("Command {command} found at {}", path.display()))
        .map_err(|_| miette!("Command {command} doesn't exist and is required to deploy"))
}

/// Retrieves an env variable, treating an empty
/// value the same as an unset one.
///
/// # Errors
/// Will error if the env variable is unset or empty.
pub fn get_env_var<S>(key: S) -> Result<String>
where
    S: AsRef<str>,
{
    fn inner(key: &str) -> Result<String> {
        env::var(key)
            .into_diagnostic()
            .and_then(|value| {
                if value.trim().is_empty() {
                    Err(miette!("Env var '{key}' is empty"))
                } else {
                    Ok(value)
                }
            })
            .map_err(|_| miette!("Failed to retrieve env var '{key}'"))
    }
    inner(key.as_ref())
}

/// Checks whether a path points to a file the
/// current user is able to execute.
#[must_use]
pub fn is_executable(path: &Path) -> bool {
    trace!("is_executable({})", path.display());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        path.metadata()
            .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
    }

    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use tempfile::TempDir;

    use super::is_executable;

    #[test]
    fn missing_file_is_not_executable() {
        let dir = TempDir::new().unwrap();

        assert!(!is_executable(&dir.path().join("build.sh")));
    }

    #[test]
    fn directory_is_not_executable() {
        let dir = TempDir::new().unwrap();

        assert!(!is_executable(dir.path()));
    }

    #[cfg(unix)]
    #[test]
    fn executable_bit_is_respected() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let script = dir.path().join("build.sh");
        fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();

        fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).unwrap();
        assert!(!is_executable(&script));

        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(is_executable(&script));
    }
}
