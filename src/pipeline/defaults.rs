use std::{fs, path::Path};

use colored::Colorize;
use container_deploy_definition::VersionTag;
use container_deploy_process_management::drivers::{
    opts::{CloneOpts, CreateTagOpts},
    VcsDriver,
};
use log::{debug, info, trace, warn};
use miette::{Context, IntoDiagnostic, Result};
use tempfile::TempDir;

use super::config::DefaultsTarget;

/// Publishes a container's defaults into the shared defaults
/// repository and tags the commit with the image version.
pub struct DefaultsSynchronizer<'a, D> {
    driver: &'a D,
}

impl<'a, D: VcsDriver> DefaultsSynchronizer<'a, D> {
    pub const fn new(driver: &'a D) -> Self {
        Self { driver }
    }

    /// Copy `target.source` over `<label>` in a fresh clone, commit
    /// and push it, then point `<container>/<tag>` at the result.
    ///
    /// Running this twice for the same container and tag leaves a
    /// single tag on the remote.
    ///
    /// # Errors
    /// Will error if any git operation or file copy fails.
    pub fn sync(&self, container: &str, tag: &VersionTag, target: &DefaultsTarget) -> Result<()> {
        trace!("DefaultsSynchronizer::sync({container}, {tag}, {target:?})");

        let workspace = TempDir::new()
            .into_diagnostic()
            .wrap_err("Failed to create a workspace for the defaults repository")?;
        let clone = workspace.path().join(target.repository.repo());

        info!(
            "Cloning {} ({}) into {}",
            target.repository.to_string().bold(),
            target.branch,
            clone.display()
        );
        self.driver.clone_repo(
            &CloneOpts::builder()
                .url(&target.url)
                .branch(&target.branch)
                .dest(&clone)
                .build(),
        )?;

        let dest = clone.join(&target.label);
        if dest.exists() {
            debug!("Removing previous defaults in {}", dest.display());
            fs::remove_dir_all(&dest)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to remove {}", dest.display()))?;
        }
        copy_dir_recursive(&target.source, &dest).wrap_err_with(|| {
            format!(
                "Failed to copy defaults from {} to {}",
                target.source.display(),
                dest.display()
            )
        })?;

        let message = format!(
            "Updating [ {} ] defaults. Triggered by Docker build [ {tag} ]",
            target.label
        );

        self.driver.add(&clone, &target.label)?;
        if self.driver.has_staged_changes(&clone)? {
            self.driver.commit(&clone, &message)?;
            self.driver.push_branch(&clone, &target.branch)?;
        } else {
            info!(
                "Defaults for {} are unchanged, nothing to commit",
                target.label
            );
        }

        self.retag(&clone, &format!("{container}/{tag}"), &message)?;
        info!("Published defaults for {}", container.bold().green());
        Ok(())
    }

    fn retag(&self, clone: &Path, tag: &str, message: &str) -> Result<()> {
        if self.driver.tag_exists(clone, tag)? {
            warn!("Git tag {tag} already exists, overwriting it");
            self.driver.delete_tag(clone, tag)?;
            self.driver.delete_remote_tag(clone, tag)?;
        }

        self.driver.create_tag(
            &CreateTagOpts::builder()
                .repo(clone)
                .tag(tag)
                .message(message)
                .build(),
        )?;
        self.driver.push_tag(clone, tag)
    }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).into_diagnostic()?;

    for entry in fs::read_dir(src).into_diagnostic()? {
        let entry = entry.into_diagnostic()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            trace!("{} -> {}", src_path.display(), dst_path.display());
            fs::copy(&src_path, &dst_path).into_diagnostic()?;
        }
    }
    Ok(())
}
