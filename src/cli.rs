use crate::app::App;
use crate::config::Config;
use crate::error::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gover")]
#[command(about = "Use any Go version as the main one", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(skip)]
    config: Config,
}

#[derive(Subcommand)]
enum Commands {
    /// Switch the current Go version (it will be installed if not already present)
    Use {
        /// Version to switch to (e.g. 1.18, 1.20rc1, tip), or "main" for
        /// the pristine toolchain
        version: String,
    },

    /// Print the list of installed Go versions
    #[command(alias = "list")]
    Ls {
        /// Print available versions from go.dev as well
        #[arg(short, long)]
        all: bool,

        /// Print only versions starting with this prefix, or "latest" for
        /// the latest patch of each release
        #[arg(long, value_name = "prefix|latest")]
        only: Option<String>,
    },

    /// Remove the specified Go version (both the binary and the SDK)
    #[command(alias = "remove")]
    Rm {
        /// Version to remove
        version: String,
    },
}

impl Cli {
    pub fn new(config: Config) -> Self {
        let mut cli = Self::parse();
        cli.config = config;
        cli
    }

    pub async fn run(self) -> Result<()> {
        let mut app = App::new(&self.config)?;

        match self.command {
            Commands::Use { ref version } => app.use_version(version).await,
            Commands::Ls { all, ref only } => app.list(all, only.as_deref()).await,
            Commands::Rm { ref version } => app.remove(version).await,
        }
    }
}
