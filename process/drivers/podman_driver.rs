use std::time::Duration;

use container_deploy_utils::{cmd, CommandExt};
use log::{debug, info, trace};
use miette::{bail, IntoDiagnostic, Result};

use super::{
    opts::{LoginOpts, PushOpts, TagOpts},
    RegistryDriver,
};

#[derive(Debug, Default)]
pub struct PodmanDriver {
    timeout: Option<Duration>,
}

impl PodmanDriver {
    #[must_use]
    pub const fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl RegistryDriver for PodmanDriver {
    fn login(&self, opts: &LoginOpts) -> Result<()> {
        trace!("PodmanDriver::login({opts:?})");

        let LoginOpts {
            registry,
            credentials,
        } = opts;

        debug!("podman login -u {} --password-stdin {registry}", credentials.username);
        let output = cmd!(
            "podman",
            "login",
            "-u",
            &credentials.username,
            "--password-stdin",
            registry,
        )
        .output_with_stdin(credentials.password.value(), self.timeout)
        .into_diagnostic()?;

        if output.success {
            info!("Logged into {registry}");
        } else {
            bail!("Failed to login for podman: {}", output.stderr.trim());
        }
        Ok(())
    }

    fn tag(&self, opts: &TagOpts) -> Result<()> {
        trace!("PodmanDriver::tag({opts:?})");

        let src_image = opts.src_image.whole();
        let dest_image = opts.dest_image.whole();

        debug!("podman tag {src_image} {dest_image}");
        let output = cmd!("podman", "tag", &src_image, &dest_image)
            .output_with_timeout(self.timeout)
            .into_diagnostic()?;

        if output.success {
            info!("Successfully tagged {dest_image}!");
        } else {
            bail!(
                "Failed to tag image {dest_image}: {}",
                output.stderr.trim()
            );
        }
        Ok(())
    }

    fn push(&self, opts: &PushOpts) -> Result<()> {
        trace!("PodmanDriver::push({opts:?})");

        let image = opts.image.whole();

        debug!("podman push {image}");
        let output = cmd!("podman", "push", &image)
            .output_with_timeout(self.timeout)
            .into_diagnostic()?;

        if output.success {
            info!("Successfully pushed {image}!");
        } else {
            bail!("Failed to push image {image}: {}", output.stderr.trim());
        }
        Ok(())
    }
}
