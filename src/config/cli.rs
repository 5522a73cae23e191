use std::path::PathBuf;

use clap::{Parser, Subcommand};

// Define command-line arguments
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the queue configuration YAML file.
    #[arg(short = 'c', long, default_value = "config/queue.yaml", global = true)]
    pub config: PathBuf,

    /// Optional: Port for the Prometheus metrics HTTP endpoint
    #[arg(long, global = true)]
    pub metrics_port: Option<u16>,

    /// Validate the queue configuration and exit
    #[arg(long, global = true)]
    pub validate_config: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Drain the queue and write each message body as a line to stdout
    Drain {
        /// Buffer size of the channel between the queue and stdout
        #[arg(long, default_value_t = 64)]
        buffer: usize,
    },
    /// Read lines from stdin and publish each one to the queue
    Publish {
        /// Buffer size of the channel between stdin and the queue
        #[arg(long, default_value_t = 64)]
        buffer: usize,
    },
}
