use std::{path::Path, process::Command, time::Duration};

use container_deploy_utils::{
    cmd,
    constants::GIT_REMOTE,
    CommandExt, CommandOutput,
};
use log::{debug, info, trace};
use miette::{bail, IntoDiagnostic, Result};

use super::{
    opts::{CloneOpts, CreateTagOpts},
    VcsDriver,
};

#[derive(Debug, Default)]
pub struct GitDriver {
    timeout: Option<Duration>,
}

impl GitDriver {
    #[must_use]
    pub const fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    fn run(&self, mut command: Command, action: &str) -> Result<CommandOutput> {
        debug!("{command:?}");
        let output = command.output_with_timeout(self.timeout).into_diagnostic()?;

        if !output.success {
            bail!("Failed to {action}: {}", output.stderr.trim());
        }
        Ok(output)
    }
}

fn git(repo: &Path) -> Command {
    cmd!("git", "-C", repo)
}

impl VcsDriver for GitDriver {
    fn clone_repo(&self, opts: &CloneOpts) -> Result<()> {
        trace!("GitDriver::clone_repo({opts:?})");

        self.run(
            cmd!(
                "git",
                "clone",
                "--branch",
                opts.branch,
                opts.url,
                opts.dest,
            ),
            &format!("clone {}", opts.url),
        )?;
        info!("Cloned {} into {}", opts.url, opts.dest.display());
        Ok(())
    }

    fn add(&self, repo: &Path, path: &str) -> Result<()> {
        trace!("GitDriver::add({}, {path})", repo.display());

        let mut command = git(repo);
        cmd!(command, "add", "--all", "--", path);
        self.run(command, &format!("stage {path}"))?;
        Ok(())
    }

    fn has_staged_changes(&self, repo: &Path) -> Result<bool> {
        trace!("GitDriver::has_staged_changes({})", repo.display());

        let mut command = git(repo);
        cmd!(command, "diff", "--cached", "--name-only");
        let output = self.run(command, "list staged changes")?;
        Ok(!output.stdout.trim().is_empty())
    }

    fn commit(&self, repo: &Path, message: &str) -> Result<()> {
        trace!("GitDriver::commit({}, {message})", repo.display());

        let mut command = git(repo);
        cmd!(command, "commit", "-m", message);
        self.run(command, "commit")?;
        Ok(())
    }

    fn push_branch(&self, repo: &Path, branch: &str) -> Result<()> {
        trace!("GitDriver::push_branch({}, {branch})", repo.display());

        let mut command = git(repo);
        cmd!(command, "push", GIT_REMOTE, branch);
        self.run(command, &format!("push branch {branch}"))?;
        info!("Pushed {branch} to {GIT_REMOTE}");
        Ok(())
    }

    fn tag_exists(&self, repo: &Path, tag: &str) -> Result<bool> {
        trace!("GitDriver::tag_exists({}, {tag})", repo.display());

        let reference = format!("refs/tags/{tag}");
        let mut command = git(repo);
        cmd!(command, "ls-remote", "--tags", GIT_REMOTE, &reference);
        let output = self.run(command, "list remote tags")?;
        Ok(output
            .stdout
            .lines()
            .filter_map(|line| line.split_whitespace().nth(1))
            .any(|name| name == reference))
    }

    fn delete_tag(&self, repo: &Path, tag: &str) -> Result<()> {
        trace!("GitDriver::delete_tag({}, {tag})", repo.display());

        let mut command = git(repo);
        cmd!(command, "tag", "--list", tag);
        let output = self.run(command, "list tags")?;
        if !output.stdout.lines().any(|line| line.trim() == tag) {
            debug!("Tag {tag} is not in the clone, nothing to delete locally");
            return Ok(());
        }

        let mut command = git(repo);
        cmd!(command, "tag", "-d", tag);
        self.run(command, &format!("delete tag {tag}"))?;
        Ok(())
    }

    fn delete_remote_tag(&self, repo: &Path, tag: &str) -> Result<()> {
        trace!("GitDriver::delete_remote_tag({}, {tag})", repo.display());

        let mut command = git(repo);
        cmd!(command, "push", GIT_REMOTE, format!(":refs/tags/{tag}"));
        self.run(command, &format!("delete remote tag {tag}"))?;
        Ok(())
    }

    fn create_tag(&self, opts: &CreateTagOpts) -> Result<()> {
        trace!("GitDriver::create_tag({opts:?})");

        let mut command = git(opts.repo);
        cmd!(command, "tag", "-a", opts.tag, "-m", opts.message);
        self.run(command, &format!("create tag {}", opts.tag))?;
        Ok(())
    }

    fn push_tag(&self, repo: &Path, tag: &str) -> Result<()> {
        trace!("GitDriver::push_tag({}, {tag})", repo.display());

        let mut command = git(repo);
        cmd!(command, "push", GIT_REMOTE, format!("refs/tags/{tag}"));
        self.run(command, &format!("push tag {tag}"))?;
        info!("Pushed tag {tag} to {GIT_REMOTE}");
        Ok(())
    }
}
