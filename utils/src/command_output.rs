use std::{
    io::{Error, ErrorKind, Result, Write},
    process::{Command, Stdio},
    time::Duration,
};

use log::trace;
use process_control::{ChildExt, Control};

/// The captured result of running a command to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

pub trait CommandExt {
    /// Runs the command capturing stdout/stderr, killing it
    /// if it runs past the time limit.
    ///
    /// # Errors
    /// Will error if the process could not be spawned or
    /// if it timed out.
    fn output_with_timeout(&mut self, timeout: Option<Duration>) -> Result<CommandOutput>;

    /// Same as `output_with_timeout` but writes `input` to the
    /// process's stdin before waiting on it.
    ///
    /// # Errors
    /// Will error if the process could not be spawned, its stdin
    /// could not be written, or it timed out.
    fn output_with_stdin(
        &mut self,
        input: &str,
        timeout: Option<Duration>,
    ) -> Result<CommandOutput>;
}

impl CommandExt for Command {
    fn output_with_timeout(&mut self, timeout: Option<Duration>) -> Result<CommandOutput> {
        self.stdin(Stdio::null());
        run_controlled(self, None, timeout)
    }

    fn output_with_stdin(
        &mut self,
        input: &str,
        timeout: Option<Duration>,
    ) -> Result<CommandOutput> {
        self.stdin(Stdio::piped());
        run_controlled(self, Some(input), timeout)
    }
}

fn run_controlled(
    command: &mut Command,
    input: Option<&str>,
    timeout: Option<Duration>,
) -> Result<CommandOutput> {
    let mut child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(input) = input {
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::new(ErrorKind::BrokenPipe, "Child stdin was not piped"))?;
        stdin.write_all(input.as_bytes())?;
        drop(stdin);
    }

    let control = child.controlled_with_output().terminate_for_timeout();
    let control = match timeout {
        Some(limit) => control.time_limit(limit),
        None => control,
    };

    let output = control.wait()?.ok_or_else(|| {
        Error::new(
            ErrorKind::TimedOut,
            format!(
                "Command timed out after {}s",
                timeout.map_or(0, |limit| limit.as_secs())
            ),
        )
    })?;
    trace!("Command exited with {:?}", output.status);

    Ok(CommandOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(all(test, unix))]
mod test {
    use std::{io::ErrorKind, process::Command, time::Duration};

    use super::CommandExt;

    #[test]
    fn captures_output() {
        let output = Command::new("sh")
            .args(["-c", "echo out; echo err >&2"])
            .output_with_timeout(None)
            .unwrap();

        assert!(output.success);
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[test]
    fn reports_failure_status() {
        let output = Command::new("sh")
            .args(["-c", "exit 3"])
            .output_with_timeout(None)
            .unwrap();

        assert!(!output.success);
    }

    #[test]
    fn writes_stdin() {
        let output = Command::new("cat")
            .output_with_stdin("s3cret", Some(Duration::from_secs(10)))
            .unwrap();

        assert_eq!(output.stdout, "s3cret");
    }

    #[test]
    fn times_out() {
        let err = Command::new("sleep")
            .arg("5")
            .output_with_timeout(Some(Duration::from_millis(100)))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TimedOut);
    }
}
