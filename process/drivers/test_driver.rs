//! An in-memory stand-in for every side-effecting driver.
//!
//! Calls are recorded in order. A failure predicate can make any
//! recorded call fail, and tags are tracked in a local and a remote
//! set so the retagging protocol can be checked across runs.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use log::trace;
use miette::{bail, IntoDiagnostic, Result};

use super::{
    opts::{BuildScriptOpts, CloneOpts, CreateTagOpts, LoginOpts, PushOpts, TagOpts},
    BuildDriver, RegistryDriver, VcsDriver,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    Build {
        container: String,
        tag: String,
        args: Vec<String>,
    },
    Login {
        registry: String,
        username: String,
    },
    Tag {
        src: String,
        dest: String,
    },
    Push {
        image: String,
    },
    Clone {
        url: String,
        branch: String,
        dest: PathBuf,
    },
    Add {
        path: String,
    },
    Commit {
        message: String,
    },
    PushBranch {
        branch: String,
    },
    DeleteTag {
        tag: String,
    },
    DeleteRemoteTag {
        tag: String,
    },
    CreateTag {
        tag: String,
        message: String,
    },
    PushTag {
        tag: String,
    },
}

type FailWhen = Box<dyn Fn(&DriverCall) -> bool>;

pub struct TestDriver {
    calls: RefCell<Vec<DriverCall>>,
    local_tags: RefCell<BTreeSet<String>>,
    remote_tags: RefCell<BTreeSet<String>>,
    staged_changes: Cell<bool>,
    fetch_tags: Cell<bool>,
    fail_when: Option<FailWhen>,
}

impl Default for TestDriver {
    fn default() -> Self {
        Self {
            calls: RefCell::default(),
            local_tags: RefCell::default(),
            remote_tags: RefCell::default(),
            staged_changes: Cell::new(true),
            fetch_tags: Cell::new(true),
            fail_when: None,
        }
    }
}

impl TestDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call matching `predicate` after recording it.
    #[must_use]
    pub fn fail_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&DriverCall) -> bool + 'static,
    {
        self.fail_when = Some(Box::new(predicate));
        self
    }

    #[must_use]
    pub fn with_remote_tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remote_tags
            .borrow_mut()
            .extend(tags.into_iter().map(Into::into));
        self
    }

    /// Whether a commit would have anything to record.
    #[must_use]
    pub fn with_staged_changes(self, staged: bool) -> Self {
        self.staged_changes.set(staged);
        self
    }

    /// Clones come back without the remote's tags.
    #[must_use]
    pub fn without_tag_fetch(self) -> Self {
        self.fetch_tags.set(false);
        self
    }

    #[must_use]
    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.borrow().clone()
    }

    #[must_use]
    pub fn remote_tags(&self) -> BTreeSet<String> {
        self.remote_tags.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: DriverCall) -> Result<()> {
        trace!("TestDriver::record({call:?})");

        let fail = self.fail_when.as_ref().is_some_and(|fail| fail(&call));
        self.calls.borrow_mut().push(call.clone());

        if fail {
            bail!("Injected failure for {call:?}");
        }
        Ok(())
    }
}

impl BuildDriver for TestDriver {
    fn build(&self, opts: &BuildScriptOpts) -> Result<()> {
        self.record(DriverCall::Build {
            container: opts.container.to_string(),
            tag: opts.tag.to_string(),
            args: opts.args.to_vec(),
        })
    }
}

impl RegistryDriver for TestDriver {
    fn login(&self, opts: &LoginOpts) -> Result<()> {
        self.record(DriverCall::Login {
            registry: opts.registry.to_string(),
            username: opts.credentials.username.clone(),
        })
    }

    fn tag(&self, opts: &TagOpts) -> Result<()> {
        self.record(DriverCall::Tag {
            src: opts.src_image.whole(),
            dest: opts.dest_image.whole(),
        })
    }

    fn push(&self, opts: &PushOpts) -> Result<()> {
        self.record(DriverCall::Push {
            image: opts.image.whole(),
        })
    }
}

impl VcsDriver for TestDriver {
    fn clone_repo(&self, opts: &CloneOpts) -> Result<()> {
        self.record(DriverCall::Clone {
            url: opts.url.to_string(),
            branch: opts.branch.to_string(),
            dest: opts.dest.to_path_buf(),
        })?;

        fs::create_dir_all(opts.dest).into_diagnostic()?;
        if self.fetch_tags.get() {
            self.local_tags
                .borrow_mut()
                .clone_from(&self.remote_tags.borrow());
        }
        Ok(())
    }

    fn add(&self, _repo: &Path, path: &str) -> Result<()> {
        self.record(DriverCall::Add {
            path: path.to_string(),
        })
    }

    fn has_staged_changes(&self, _repo: &Path) -> Result<bool> {
        Ok(self.staged_changes.get())
    }

    fn commit(&self, _repo: &Path, message: &str) -> Result<()> {
        self.record(DriverCall::Commit {
            message: message.to_string(),
        })
    }

    fn push_branch(&self, _repo: &Path, branch: &str) -> Result<()> {
        self.record(DriverCall::PushBranch {
            branch: branch.to_string(),
        })
    }

    fn tag_exists(&self, _repo: &Path, tag: &str) -> Result<bool> {
        Ok(self.remote_tags.borrow().contains(tag))
    }

    fn delete_tag(&self, _repo: &Path, tag: &str) -> Result<()> {
        self.record(DriverCall::DeleteTag {
            tag: tag.to_string(),
        })?;

        self.local_tags.borrow_mut().remove(tag);
        Ok(())
    }

    fn delete_remote_tag(&self, _repo: &Path, tag: &str) -> Result<()> {
        self.record(DriverCall::DeleteRemoteTag {
            tag: tag.to_string(),
        })?;

        self.remote_tags.borrow_mut().remove(tag);
        Ok(())
    }

    fn create_tag(&self, opts: &CreateTagOpts) -> Result<()> {
        self.record(DriverCall::CreateTag {
            tag: opts.tag.to_string(),
            message: opts.message.to_string(),
        })?;

        if !self.local_tags.borrow_mut().insert(opts.tag.to_string()) {
            bail!("tag '{}' already exists", opts.tag);
        }
        Ok(())
    }

    fn push_tag(&self, _repo: &Path, tag: &str) -> Result<()> {
        self.record(DriverCall::PushTag {
            tag: tag.to_string(),
        })?;

        if !self.local_tags.borrow().contains(tag) {
            bail!("src refspec {tag} does not match any");
        }
        if !self.remote_tags.borrow_mut().insert(tag.to_string()) {
            bail!("tag {tag} already exists in the remote");
        }
        Ok(())
    }
}
