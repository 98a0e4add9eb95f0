use std::{
    borrow::Cow,
    fs::OpenOptions,
    io::{BufRead, BufReader, Result, Write as IoWrite},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
    sync::{LazyLock, RwLock},
    thread,
    time::Duration,
};

use chrono::Local;
use colored::{control::ShouldColorize, ColoredString, Colorize};
use container_deploy_utils::{constants::LOG_DIR, get_env_var};
use indicatif::{MultiProgress, ProgressBar};
use indicatif_log_bridge::LogWrapper;
use log::{warn, Level, LevelFilter, Record};
use log4rs::{
    append::{
        console::ConsoleAppender,
        rolling_file::{
            policy::compound::{
                roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger, CompoundPolicy,
            },
            RollingFileAppender,
        },
    },
    config::{Appender, Root},
    encode::{pattern::PatternEncoder, Encode, Write},
    Config, Logger as L4RSLogger,
};
use miette::{IntoDiagnostic, WrapErr};
use nu_ansi_term::Color;
use private::Private;
use rand::Rng;

mod private {
    pub trait Private {}
}

impl Private for Command {}

static MULTI_PROGRESS: LazyLock<MultiProgress> = LazyLock::new(MultiProgress::new);
static SELECTED_LOG_DIR: LazyLock<RwLock<Option<PathBuf>>> = LazyLock::new(|| RwLock::new(None));

#[derive(Debug, Clone)]
pub struct Logger {
    level: LevelFilter,
    log_dir: Option<PathBuf>,
}

impl Logger {
    const TRIGGER_FILE_SIZE: u64 = 10 * 1024;
    const ARCHIVE_FILENAME_PATTERN: &'static str = "container-deploy.{}.log";
    const LOG_FILENAME: &'static str = "container-deploy.log";
    const LOG_FILE_COUNT: u32 = 4;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn filter_level(&mut self, filter_level: LevelFilter) -> &mut Self {
        self.level = filter_level;
        self
    }

    pub fn log_out_dir<P>(&mut self, path: Option<P>) -> &mut Self
    where
        P: AsRef<Path>,
    {
        self.log_dir = path.map(|p| p.as_ref().to_path_buf());
        self
    }

    /// Initializes logging for the application.
    ///
    /// Logs go to stderr and, when a log directory is available,
    /// to a rolling log file. Without `$HOME` or an explicit log
    /// directory only stderr is used.
    ///
    /// # Errors
    /// Will error if the logger was already initialized.
    pub fn init(&self) -> miette::Result<()> {
        let log_dir = self.log_dir.clone().or_else(|| {
            get_env_var("HOME")
                .ok()
                .map(|home| Path::new(&home).join(LOG_DIR))
        });

        let stderr = ConsoleAppender::builder()
            .encoder(Box::new(CustomPatternEncoder))
            .target(log4rs::append::console::Target::Stderr)
            .tty_only(true)
            .build();

        let config =
            Config::builder().appender(Appender::builder().build("stderr", Box::new(stderr)));
        let mut root = Root::builder().appender("stderr");

        let config = match log_dir.as_deref().map(Self::file_appender) {
            Some(Ok(file_appender)) => {
                if let Ok(mut lock) = SELECTED_LOG_DIR.write() {
                    *lock = log_dir.clone();
                }
                root = root.appender("file");
                config.appender(Appender::builder().build("file", Box::new(file_appender)))
            }
            Some(Err(e)) => {
                eprintln!("Cannot create logs directory:\n{e}");
                config
            }
            None => config,
        }
        .build(root.build(self.level))
        .into_diagnostic()
        .wrap_err("Logger config should build")?;

        let logger = L4RSLogger::new(config);

        LogWrapper::new(MULTI_PROGRESS.clone(), logger)
            .try_init()
            .into_diagnostic()
            .wrap_err("Failed to initialize logger")
    }

    fn file_appender(log_dir: &Path) -> anyhow::Result<RollingFileAppender> {
        let log_archive_pattern =
            format!("{}/{}", log_dir.display(), Self::ARCHIVE_FILENAME_PATTERN);
        let window_roller =
            FixedWindowRoller::builder().build(&log_archive_pattern, Self::LOG_FILE_COUNT)?;

        Ok(RollingFileAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{d} - {l} - {m}{n}")))
            .build(
                log_dir.join(Self::LOG_FILENAME),
                Box::new(CompoundPolicy::new(
                    Box::new(SizeTrigger::new(Self::TRIGGER_FILE_SIZE)),
                    Box::new(window_roller),
                )),
            )?)
    }

    pub fn multi_progress() -> MultiProgress {
        MULTI_PROGRESS.clone()
    }

    fn log_dir() -> Option<PathBuf> {
        SELECTED_LOG_DIR.read().ok().and_then(|lock| lock.clone())
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            log_dir: None,
        }
    }
}

trait ColoredLevel {
    fn colored(&self) -> ColoredString;
}

impl ColoredLevel for Level {
    fn colored(&self) -> ColoredString {
        match self {
            Self::Error => Self::Error.as_str().red(),
            Self::Warn => Self::Warn.as_str().yellow(),
            Self::Info => Self::Info.as_str().green(),
            Self::Debug => Self::Debug.as_str().blue(),
            Self::Trace => Self::Trace.as_str().cyan(),
        }
    }
}

pub trait CommandLogging: Private {
    /// Prints each line of stdout/stderr with a colored header
    /// and a progress spinner. When file logging is active the raw
    /// output is also appended to `<log dir>/<header>.log`.
    ///
    /// # Errors
    /// Will error if there was an issue executing the process.
    fn message_status<S, D>(self, header: S, message: D) -> Result<ExitStatus>
    where
        S: AsRef<str>,
        D: Into<Cow<'static, str>>;
}

impl CommandLogging for Command {
    fn message_status<S, D>(self, header: S, message: D) -> Result<ExitStatus>
    where
        S: AsRef<str>,
        D: Into<Cow<'static, str>>,
    {
        fn inner(
            mut command: Command,
            header: &str,
            message: Cow<'static, str>,
        ) -> Result<ExitStatus> {
            let ansi_color = gen_random_ansi_color();
            let colored_header = color_str(header, ansi_color);
            let (reader, writer) = os_pipe::pipe()?;

            command
                .stdout(writer.try_clone()?)
                .stderr(writer)
                .stdin(Stdio::null());

            let log_file = Logger::log_dir()
                .map(|dir| dir.join(format!("{}.log", header.replace(['/', ':', '.'], "_"))))
                .and_then(|path| {
                    OpenOptions::new()
                        .create(true)
                        .append(true)
                        .open(&path)
                        .inspect_err(|e| warn!("Failed to open log {}: {e}", path.display()))
                        .ok()
                });

            let progress =
                Logger::multi_progress().add(ProgressBar::new_spinner().with_message(message));
            progress.enable_steady_tick(Duration::from_millis(100));

            let mut child = command.spawn()?;

            // The writer ends live in `command`, so it has to go before
            // the reader can see EOF.
            drop(command);

            let reader = BufReader::new(reader);
            let printer = thread::spawn(move || {
                let mp = Logger::multi_progress();
                reader.lines().map_while(Result::ok).for_each(|line| {
                    let text = format!("{log_prefix} {line}", log_prefix = log_header(&colored_header));
                    if mp.is_hidden() || mp.println(&text).is_err() {
                        eprintln!("{text}");
                    }
                    if let Some(mut file) = log_file.as_ref() {
                        if let Err(e) = writeln!(file, "{line}") {
                            warn!("Failed to write command log: {e}");
                        }
                    }
                });
            });

            let status = child.wait()?;
            let _ = printer.join();

            progress.finish();
            Logger::multi_progress().remove(&progress);

            Ok(status)
        }
        inner(self, header.as_ref(), message.into())
    }
}

#[derive(Debug)]
struct CustomPatternEncoder;

impl Encode for CustomPatternEncoder {
    fn encode(&self, w: &mut dyn Write, record: &Record) -> anyhow::Result<()> {
        let prefix = match log::max_level() {
            LevelFilter::Off => return Ok(()),
            LevelFilter::Error | LevelFilter::Warn | LevelFilter::Info => log_header(format!(
                "{level:width$}",
                level = record.level().colored(),
                width = 5,
            )),
            LevelFilter::Debug => log_header(format!(
                "{level:>width$}",
                level = record.level().colored(),
                width = 5,
            )),
            LevelFilter::Trace => log_header(format!(
                "{level:width$} {module}:{line}",
                level = record.level().colored(),
                width = 5,
                module = record.module_path().unwrap_or_default().bright_yellow(),
                line = record
                    .line()
                    .map_or_else(String::new, |l| l.to_string())
                    .bright_green(),
            )),
        };

        Ok(writeln!(w, "{prefix} {args}", args = record.args())?)
    }
}

/// Keeps log lines and streamed command output looking alike.
fn log_header<T>(text: T) -> String
where
    T: AsRef<str>,
{
    fn inner(text: &str) -> String {
        match log::max_level() {
            LevelFilter::Error | LevelFilter::Warn | LevelFilter::Info => {
                format!("{text} {sep}", sep = "=>".bold())
            }
            LevelFilter::Debug | LevelFilter::Trace => format!(
                "[{time} {text}] {sep}",
                time = Local::now().format("%H:%M:%S"),
                sep = "=>".bold(),
            ),
            LevelFilter::Off => String::new(),
        }
    }
    inner(text.as_ref())
}

#[must_use]
pub fn gen_random_ansi_color() -> u8 {
    // ANSI extended color range
    // https://www.ditig.com/publications/256-colors-cheat-sheet
    const LOW_END: u8 = 21; // Blue1 #0000ff
    const HIGH_END: u8 = 230; // Cornsilk1 #ffffd7

    rand::rng().random_range(LOW_END..=HIGH_END)
}

pub fn color_str<T>(text: T, ansi_color: u8) -> String
where
    T: AsRef<str>,
{
    if ShouldColorize::from_env().should_colorize() {
        Color::Fixed(ansi_color)
            .paint(text.as_ref().to_string())
            .to_string()
    } else {
        text.as_ref().to_string()
    }
}

#[cfg(all(test, unix))]
mod test {
    use std::process::Command;

    use super::{color_str, gen_random_ansi_color, CommandLogging};

    #[test]
    fn message_status_reports_exit_status() {
        let mut ok_cmd = Command::new("sh");
        ok_cmd.args(["-c", "echo building; echo warning >&2"]);
        let ok = ok_cmd.message_status("web", "Building web").unwrap();
        let mut failed_cmd = Command::new("sh");
        failed_cmd.args(["-c", "exit 2"]);
        let failed = failed_cmd.message_status("web", "Building web").unwrap();

        assert!(ok.success());
        assert!(!failed.success());
    }

    #[test]
    fn random_color_is_in_range() {
        for _ in 0..100 {
            assert!((21..=230).contains(&gen_random_ansi_color()));
        }
    }

    #[test]
    fn color_str_keeps_text() {
        assert!(color_str("web", 100).contains("web"));
    }
}
