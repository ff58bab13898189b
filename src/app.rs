//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to the appropriate
//! command handlers.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process;

use crate::capture::camera::FacingMode;
use crate::commands;
use crate::logging;

/// Terminal perception demos: face overlay, live transcription, and audio
/// recording with a spectrum visualizer.
#[derive(Parser)]
#[command(name = "percept")]
#[command(version)]
#[command(about = "Terminal perception demos: face overlay, live transcription, audio recording")]
#[command(
    long_about = "Terminal perception demos.\n\n\
    percept overlay     Face detection overlay with distance and eye/mouth readouts\n\
    percept transcribe  Live speech-to-text with interim results\n\
    percept record      Audio recording with a frequency-bar visualizer and MP3 export\n\n\
    EXAMPLES:\n\
        # Run the face overlay from recorded observations\n\
        $ percept overlay --replay faces.jsonl\n\n\
        # Transcribe and pipe to other commands\n\
        $ percept transcribe | wc -w\n\n\
        # Record and export as MP3 at 2x gain\n\
        $ percept record --mp3 --gain 2.0"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/percept/percept.toml\n    Logs:               ~/.local/state/percept/percept.log.*"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Face detection overlay demo
    ///
    /// Draws a bounding box per detected face with a distance estimate and
    /// eye/mouth openness labels. Press 'f' to switch camera facing,
    /// Escape/q to quit.
    #[command(visible_alias = "o")]
    Overlay {
        /// Initial camera facing (overrides the config file)
        #[arg(long, value_enum)]
        facing: Option<FacingMode>,

        /// Observation replay file (JSON Lines, one frame per line)
        #[arg(long, value_name = "FILE")]
        replay: Option<PathBuf>,
    },

    /// Live speech transcription
    ///
    /// Continuous interim-result recognition in the configured language.
    /// The displayed transcript is rebuilt on every recognition event and
    /// the final transcript is printed to stdout on stop.
    #[command(visible_alias = "t")]
    Transcribe,

    /// Record audio with real-time visualization
    ///
    /// Press Enter to save, Space to pause/resume, +/- to adjust gain,
    /// Escape/q to cancel. The recording is exported under a fixed filename
    /// in the working directory.
    #[command(visible_alias = "r")]
    Record {
        /// Re-encode the recording to MP3 through ffmpeg
        #[arg(long)]
        mp3: bool,

        /// Initial gain multiplier (overrides the config file)
        #[arg(long, value_name = "X")]
        gain: Option<f32>,
    },

    /// Open configuration file in your preferred editor
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    Logs,

    /// Generate shell completion script
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Commands that don't need logging setup.
    match &cli.command {
        Commands::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "percept", &mut io::stdout());
            return Ok(());
        }
        Commands::ListDevices => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Commands::Logs => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    logging::init_logging()?;

    match cli.command {
        Commands::Overlay { facing, replay } => {
            commands::handle_overlay(facing, replay).await?;
        }
        Commands::Transcribe => {
            commands::handle_transcribe().await?;
        }
        Commands::Record { mp3, gain } => {
            commands::handle_record(mp3, gain).await?;
        }
        Commands::Config => {
            commands::handle_config()?;
        }
        Commands::Completions { .. } | Commands::ListDevices | Commands::Logs => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
