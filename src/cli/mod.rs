//! CLI Module
//!
//! Command-line interface for inspecting configurations and running
//! substitutions against JSON scene descriptions.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// FaceLink - character model substitution with blend shape sync
#[derive(Parser, Debug)]
#[command(name = "facelink")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a passthrough blend shape configuration
    #[command(name = "init-config")]
    InitConfig {
        /// Destination file
        path: PathBuf,
    },

    /// Parse a blend shape configuration and print a summary
    #[command(name = "check-config")]
    CheckConfig {
        /// Configuration file
        path: PathBuf,
    },

    /// Substitute a replacement model into a host scene
    #[command(name = "substitute")]
    Substitute {
        /// Host scene description (JSON)
        #[arg(long)]
        host: PathBuf,

        /// Replacement scene description (JSON)
        #[arg(long)]
        replacement: PathBuf,

        /// Blend shape configuration (passthrough when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Frames to synchronize after substitution
        #[arg(short, long, default_value_t = 1)]
        frames: usize,
    },
}
