use crate::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "carousel", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file to load instead of the per-user one
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Unix socket to listen on (overrides the config file)
    #[arg(short = 's', long)]
    pub socket: Option<PathBuf>,

    /// Frame rate of the animation loop (overrides the config file)
    #[arg(long)]
    pub fps: Option<u32>,

    /// Print the bundled default config and exit
    #[arg(long)]
    pub print_default_config: bool,

    /// Write a PNG of every changed frame into this directory
    #[cfg(feature = "snapshot")]
    #[arg(long)]
    pub snapshot_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Send one command line to a running daemon, e.g. `send scroll 1`
    Send {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Write the default config file if none exists yet
    Init,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            socket_path: self.socket.clone(),
            fps: self.fps,
        }
    }
}

/// Command-line values that win over the config file, on reload too.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub socket_path: Option<PathBuf>,
    pub fps: Option<u32>,
}

impl Overrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(socket_path) = &self.socket_path {
            config.socket_path = socket_path.clone();
        }
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
    }
}
