#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use log::{info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use exifsrt::app_config::{Config, LogLevel};
use exifsrt::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for exifsrt
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// exifsrt - camera metadata to SRT subtitles
///
/// Runs ExifTool on every video file in a directory and writes the recording
/// time, exposure and GPS data next to each video as an .srt file.
#[derive(Parser, Debug)]
#[command(name = "exifsrt")]
#[command(version)]
#[command(about = "Convert embedded camera metadata to SRT subtitle sidecars")]
#[command(long_about = "exifsrt runs ExifTool on each video file in a directory and writes the
embedded camera metadata (recording time, exposure, gain, GPS) to a subtitle
file with the same name and the .srt extension.

EXAMPLES:
    exifsrt                                   # Convert videos in the current directory
    exifsrt /media/card/PRIVATE/AVCHD -r      # Walk subdirectories too
    exifsrt --tool-path /opt/exiftool/exiftool
    exifsrt -s                                # Keep existing .srt files
    exifsrt completions bash > exifsrt.bash   # Generate bash completions

CONFIGURATION:
    Settings are read from exifsrt.json when it exists. Command line options
    override the file. The tool location can also be set with EXIFSRT_TOOL_PATH.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory containing the video files
    #[arg(value_name = "DIR", default_value = ".")]
    input_dir: PathBuf,

    /// Location of the metadata extraction tool
    #[arg(long, env = "EXIFSRT_TOOL_PATH", value_name = "PATH")]
    tool_path: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long = "config", value_name = "FILE", default_value = "exifsrt.json")]
    config_path: PathBuf,

    /// Seconds to wait for the tool on one file (0 = no limit)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Process subdirectories as well
    #[arg(short, long)]
    recursive: bool,

    /// Leave videos whose .srt already exists untouched
    #[arg(short, long)]
    skip_existing: bool,

    /// Comma separated list of video extensions (e.g. "mts,mp4")
    #[arg(long, value_name = "LIST")]
    extensions: Option<String>,

    /// Charset of file names passed to the tool (e.g. "cp1251")
    #[arg(long, value_name = "CHARSET")]
    charset: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

// @struct: Custom logger implementation, filtering on the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, tag) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", colour, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "exifsrt", &mut std::io::stdout());
        return Ok(());
    }

    let config = resolve_config(&cli)?;
    log::set_max_level(config.log_level.to_level_filter());

    info!("Using metadata tool: {}", config.tool_path.display());

    let controller = Controller::with_config(config)?;
    let summary = controller.run_folder(&cli.input_dir).await?;

    if summary.failed > 0 {
        info!("{} of {} file(s) failed, see errors above", summary.failed, summary.total());
    }

    Ok(())
}

// Config file first, then command line and environment on top
fn resolve_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_default(&cli.config_path)?;

    if let Some(tool_path) = &cli.tool_path {
        config.tool_path = tool_path.clone();
    }

    if let Some(timeout) = cli.timeout {
        config.tool_timeout_secs = timeout;
    }

    if cli.recursive {
        config.recursive = true;
    }

    if cli.skip_existing {
        config.skip_existing = true;
    }

    if let Some(extensions) = &cli.extensions {
        config.extensions = Config::parse_extension_list(extensions);
    }

    if let Some(charset) = &cli.charset {
        config.filename_charset = Some(charset.clone());
    }

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    if cli.no_progress {
        config.show_progress = false;
    }

    Ok(config)
}
