use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "expset")]
#[command(about = "Export settings and encoder/muxer queries", long_about = None)]
pub struct Cli {
    /// Registry snapshot (TOML) to query instead of the built-in one
    #[arg(long, value_name = "FILE", global = true)]
    pub registry: Option<PathBuf>,

    /// Query the live GStreamer registry
    #[cfg(feature = "gstreamer")]
    #[arg(long, global = true, conflicts_with = "registry")]
    pub gstreamer: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StreamKind {
    Video,
    Audio,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available muxers
    Muxers,

    /// List available encoders
    Encoders {
        #[arg(long, value_enum, default_value_t = StreamKind::Video)]
        kind: StreamKind,
    },

    /// Show the encoders a muxer can take, and whether it accepts raw streams
    Compatible {
        /// Muxer factory name
        muxer: String,
    },

    /// Intersect caps with an element's sink templates
    SinkCaps {
        /// Element factory name
        element: String,

        /// Caps in text form, e.g. "audio/x-raw-int, rate=44100"
        caps: String,
    },

    /// Show (and optionally modify or save) export settings
    Settings(SettingsArgs),

    /// Show the per-user plugin directories
    Paths {
        /// Create missing directories
        #[arg(long)]
        create: bool,
    },

    /// Show global settings and save advanced mode to the user config file
    /// (file support always follows PITIVI_FILE_SUPPORT)
    InitConfig,
}

#[derive(clap::Args, Debug, Default)]
pub struct SettingsArgs {
    /// Load settings from a JSON file first
    #[arg(long, value_name = "FILE")]
    pub load: Option<PathBuf>,

    /// Write the resulting settings to a JSON file
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Framerate as NUM/DENOM
    #[arg(long, value_name = "NUM/DENOM")]
    pub framerate: Option<String>,

    /// Pixel aspect ratio as NUM/DENOM
    #[arg(long, value_name = "NUM/DENOM")]
    pub par: Option<String>,

    #[arg(long)]
    pub channels: Option<u32>,

    #[arg(long)]
    pub rate: Option<u32>,

    #[arg(long)]
    pub depth: Option<u32>,

    #[arg(long)]
    pub muxer: Option<String>,

    #[arg(long)]
    pub video_encoder: Option<String>,

    #[arg(long)]
    pub audio_encoder: Option<String>,
}

pub fn parse() -> Cli {
    Cli::parse()
}
