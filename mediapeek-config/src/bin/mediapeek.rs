use std::path::PathBuf;

use anyhow::{Result, ensure};
use clap::{Parser, Subcommand, ValueEnum};
use mediapeek_config::{ConfigLoad, ConfigLoader, cli};
use mediapeek_core::title::TitleKind;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "mediapeek",
    version,
    about = "Inspect remote media from a bounded prefix"
)]
struct Cli {
    /// Configuration file (defaults to ./mediapeek.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the leading bytes of a URL and report the resolved filename
    Fetch {
        url: String,
        /// Override the configured safe limit
        #[arg(long)]
        max_bytes: Option<usize>,
        /// Write the fetched prefix to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the first entry name of a local ZIP or TAR file
    ArchiveName {
        file: PathBuf,
        #[arg(long)]
        max_bytes: Option<usize>,
    },
    /// Strip codec, language and layout noise from a track title
    CleanTitle {
        #[arg(long, value_enum, default_value = "audio")]
        kind: KindArg,
        #[arg(long)]
        title: String,
        #[arg(long)]
        language: Option<String>,
        /// JSON object holding the track's report fields
        #[arg(long)]
        track: Option<PathBuf>,
    },
    /// Format a channel count and position list as a layout label
    Channels {
        count: String,
        #[arg(default_value = "")]
        positions: String,
    },
    /// Render a JSON report in the text layout
    Render {
        report: PathBuf,
        /// One cleaned line per audio and subtitle track instead
        #[arg(long)]
        summary: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Audio,
    Subtitle,
}

impl From<KindArg> for TitleKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Audio => TitleKind::Audio,
            KindArg::Subtitle => TitleKind::Subtitle,
        }
    }
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn limit_override(max_bytes: Option<usize>, configured: usize) -> Result<usize> {
    match max_bytes {
        Some(limit) => {
            ensure!(limit > 0, "--max-bytes must be greater than zero");
            Ok(limit)
        }
        None => Ok(configured),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.config {
        loader = loader.with_config_path(path);
    }
    let ConfigLoad {
        mut config,
        config_present,
    } = loader.load()?;

    init_tracing(&config.logging.level);
    if !config_present {
        debug!("no configuration file found, using environment and defaults");
    }

    match cli.command {
        Command::Fetch {
            url,
            max_bytes,
            out,
        } => {
            config.fetch.max_bytes =
                limit_override(max_bytes, config.fetch.max_bytes)?;
            println!("{}", cli::fetch(&config, &url, out.as_deref()).await?);
        }
        Command::ArchiveName { file, max_bytes } => {
            let limit = limit_override(max_bytes, config.fetch.max_bytes)?;
            match cli::archive_name(&file, limit).await? {
                Some(name) => println!("{name}"),
                None => println!("(none)"),
            }
        }
        Command::CleanTitle {
            kind,
            title,
            language,
            track,
        } => {
            let cleaned = cli::clean_title_command(
                kind.into(),
                &title,
                language.as_deref(),
                track.as_deref(),
            )?;
            println!("{cleaned}");
        }
        Command::Channels { count, positions } => {
            println!("{}", cli::channels(&count, &positions));
        }
        Command::Render { report, summary } => {
            print!("{}", cli::render(&report, summary)?);
        }
    }

    Ok(())
}
