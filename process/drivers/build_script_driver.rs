use container_deploy_utils::cmd;
use log::{debug, info, trace};
use miette::{bail, IntoDiagnostic, Result, WrapErr};

use crate::logging::CommandLogging;

use super::{opts::BuildScriptOpts, BuildDriver};

#[derive(Debug)]
pub struct BuildScriptDriver;

impl BuildDriver for BuildScriptDriver {
    fn build(&self, opts: &BuildScriptOpts) -> Result<()> {
        trace!("BuildScriptDriver::build({opts:#?})");

        let mut command = cmd!(opts.script);
        cmd!(
            command,
            "-t",
            opts.tag,
            "-u",
            &opts.credentials.username,
            "-p",
            opts.credentials.password.value(),
        );
        command.args(opts.args).arg(opts.container);
        command.current_dir(opts.working_dir);

        debug!(
            "{} -t {} -u {} -p [MASKED] {}{}",
            opts.script.display(),
            opts.tag,
            opts.credentials.username,
            opts.args
                .iter()
                .map(|arg| format!("{arg} "))
                .collect::<String>(),
            opts.container,
        );

        let status = command
            .message_status(opts.container, format!("Building {}", opts.container))
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to run build script {}", opts.script.display()))?;

        if status.success() {
            info!("Successfully built {}:{}", opts.container, opts.tag);
        } else {
            bail!(
                "Build script failed for {} with {status}",
                opts.container
            );
        }
        Ok(())
    }
}
