use clap::{Parser, Subcommand, ValueEnum};
use recovery_rag::Result;
use recovery_rag::commands::{
    SearchOverrides, ask, configure, search, show_status, show_today, similar,
};
use recovery_rag::search::SourceLabel;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "recovery-rag")]
#[command(about = "Semantic search over the AA Big Book and Daily Reflections")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Collection to restrict a search to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceArg {
    BigBook,
    Reflections,
}

impl From<SourceArg> for SourceLabel {
    fn from(source: SourceArg) -> Self {
        match source {
            SourceArg::BigBook => Self::BigBook,
            SourceArg::Reflections => Self::DailyReflection,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create the configuration file if missing and print it
    Config {
        /// Only show the current configuration
        #[arg(long)]
        show: bool,
    },
    /// Search both collections and print the ranked passages
    Search {
        query: String,
        /// Only search one collection
        #[arg(long, value_enum)]
        source: Option<SourceArg>,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
        /// Minimum similarity score between 0 and 1
        #[arg(long)]
        min_score: Option<f32>,
        /// Print results and source health as JSON
        #[arg(long)]
        json: bool,
    },
    /// Prepare a grounded answer: citations plus the LLM prompt
    Ask {
        query: String,
        /// JSON file with earlier messages, e.g. [{"role": "user", "content": "..."}]
        #[arg(long)]
        history: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        min_score: Option<f32>,
        #[arg(long)]
        json: bool,
    },
    /// Show today's Daily Reflection
    Today {
        #[arg(long)]
        json: bool,
    },
    /// Find reflections similar to the one for a date (MM-DD)
    Similar {
        date: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Show configuration and index status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            configure(show)?;
        }
        Commands::Search {
            query,
            source,
            limit,
            min_score,
            json,
        } => {
            search(
                &query,
                source.map(SourceLabel::from),
                SearchOverrides { limit, min_score },
                json,
            )
            .await?;
        }
        Commands::Ask {
            query,
            history,
            limit,
            min_score,
            json,
        } => {
            ask(
                &query,
                history.as_deref(),
                SearchOverrides { limit, min_score },
                json,
            )
            .await?;
        }
        Commands::Today { json } => {
            show_today(json).await?;
        }
        Commands::Similar { date, limit, json } => {
            similar(&date, limit, json).await?;
        }
        Commands::Status => {
            show_status().await?;
        }
    }

    Ok(())
}
