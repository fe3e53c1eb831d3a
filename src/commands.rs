use anyhow::{Context, Result};
use chrono::Local;
use console::style;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::chat::{ChatPipeline, ChatReply};
use crate::citations::{Citation, format_citations};
use crate::config::{
    API_KEY_ENV_VAR, Config, ConfigError, SearchConfig, get_config_dir, show_config,
};
use crate::database::{LanceVectorStore, VectorIndex};
use crate::dates::DateKey;
use crate::embeddings::{Embedder, OpenAiClient};
use crate::prompt::ChatMessage;
use crate::search::{
    CombinedSearch, SearchOptions, SearchResult, SourceHealth, SourceLabel, SourceStatus,
};

/// Overrides for the configured search options
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOverrides {
    pub limit: Option<usize>,
    pub min_score: Option<f32>,
}

impl SearchOverrides {
    /// Merge the overrides into the configured options, with the same bounds as the config file
    #[inline]
    pub fn apply(&self, config: &Config) -> Result<SearchOptions, ConfigError> {
        let merged = SearchConfig {
            limit: self.limit.unwrap_or(config.search.limit),
            min_score: self.min_score.unwrap_or(config.search.min_score),
            ..config.search.clone()
        };
        merged.validate()?;
        Ok(merged.options())
    }
}

#[inline]
pub fn load_config() -> Result<Config> {
    let config_dir = get_config_dir()?;
    Config::load(config_dir)
}

/// Write a default configuration if none exists, then print it
#[inline]
pub fn configure(show: bool) -> Result<()> {
    let config = load_config()?;

    if !show && !config.config_file_path().exists() {
        config.save()?;
        println!(
            "Created configuration file: {}",
            config.config_file_path().display()
        );
    }

    show_config(&config);
    Ok(())
}

async fn open_search(config: &Config) -> Result<CombinedSearch> {
    let embedder: Arc<dyn Embedder> = Arc::new(
        OpenAiClient::new(&config.openai).context("Failed to create embedding client")?,
    );
    let store: Arc<dyn VectorIndex> = Arc::new(
        LanceVectorStore::new(config)
            .await
            .context("Failed to open vector store")?,
    );
    Ok(CombinedSearch::from_config(embedder, store, &config.search))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn print_results(results: &[SearchResult]) {
    for (i, citation) in format_citations(results).iter().enumerate() {
        print_citation(i + 1, citation);
    }
}

fn print_citation(position: usize, citation: &Citation) {
    println!(
        "{}. {} {}",
        position,
        style(&citation.reference).bold(),
        style(format!("({})", citation.score_percentage)).dim()
    );
    if let Some(url) = &citation.url {
        println!("   {}", style(url).cyan());
    }
    println!("   {}", citation.text.replace('\n', " "));
    println!();
}

fn print_degraded_sources(sources: &[SourceStatus]) {
    for status in sources {
        if let SourceHealth::Degraded(reason) = &status.health {
            eprintln!(
                "{} {} unavailable: {}",
                style("⚠️").yellow(),
                status.source,
                reason
            );
        }
    }
}

/// Search both sources, or only `source`, and print the ranked results
#[inline]
pub async fn search(
    query: &str,
    source: Option<SourceLabel>,
    overrides: SearchOverrides,
    json: bool,
) -> Result<()> {
    let config = load_config()?;
    let options = overrides.apply(&config)?;
    let search = open_search(&config).await?;

    info!("Searching for: {}", query);
    let results = match source {
        Some(source) => {
            let results = search.search_source(source, query, &options).await?;
            if json {
                return print_json(&results);
            }
            results
        }
        None => {
            let outcome = search.search_with_health(query, &options).await?;
            if json {
                return print_json(&outcome);
            }
            print_degraded_sources(&outcome.sources);
            outcome.results
        }
    };

    if results.is_empty() {
        println!("No passages scored above {}", options.min_score);
        return Ok(());
    }

    print_results(&results);
    Ok(())
}

fn load_history(path: &Path) -> Result<Vec<ChatMessage>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse history file: {}", path.display()))
}

/// Prepare an answer: either a direct reply or citations plus the grounded prompt
#[inline]
pub async fn ask(
    query: &str,
    history: Option<&Path>,
    overrides: SearchOverrides,
    json: bool,
) -> Result<()> {
    let config = load_config()?;
    let options = overrides.apply(&config)?;
    let history = history.map(load_history).transpose()?.unwrap_or_default();

    let pipeline = ChatPipeline::new(open_search(&config).await?, options);
    let reply = pipeline
        .prepare(query, &history, Local::now().date_naive())
        .await?;

    if json {
        return print_json(&reply);
    }

    match &reply {
        ChatReply::Prompt(prepared) => {
            print_degraded_sources(&prepared.sources);
            println!("{}", style("Sources:").bold().yellow());
            for (i, citation) in prepared.citations.iter().enumerate() {
                print_citation(i + 1, citation);
            }
            println!("{}", style("Prompt:").bold().yellow());
            println!("{}", prepared.prompt);
        }
        ChatReply::NoResults { sources, .. } => {
            print_degraded_sources(sources);
            println!("{}", reply.direct_response().unwrap_or_default());
        }
        ChatReply::Reflection { .. } | ChatReply::ReflectionNotFound { .. } => {
            println!("{}", reply.direct_response().unwrap_or_default());
        }
    }

    Ok(())
}

/// Print today's reflection
#[inline]
pub async fn show_today(json: bool) -> Result<()> {
    let config = load_config()?;
    let search = open_search(&config).await?;
    let key = DateKey::today();

    let Some(reflection) = search.find_reflection(key).await? else {
        println!("No reflection stored for {}", key.display_name());
        return Ok(());
    };

    if json {
        return print_json(&reflection);
    }

    println!(
        "{}",
        style(format!("{} - {}", key.display_name(), reflection.title())).bold()
    );
    println!();
    println!("\"{}\"", reflection.quote());
    if let Some(reference) = &reflection.reference {
        println!("{}", style(reference).dim());
    }
    println!();
    println!("{}", reflection.comment());
    Ok(())
}

/// Print reflections closest in meaning to the one for `date`
#[inline]
pub async fn similar(date: &str, limit: Option<usize>, json: bool) -> Result<()> {
    let key: DateKey = date.parse()?;
    let config = load_config()?;
    let overrides = SearchOverrides {
        limit,
        min_score: None,
    };
    let options = overrides.apply(&config)?;
    let search = open_search(&config).await?;

    let results = search.similar_reflections(key, &options).await?;

    if json {
        return print_json(&results);
    }

    if results.is_empty() {
        println!("No reflections similar to {}", key.display_name());
        return Ok(());
    }

    println!(
        "{}",
        style(format!("Reflections similar to {}:", key.display_name())).bold()
    );
    println!();
    print_results(&results);
    Ok(())
}

/// Show configuration health and per-index document counts
#[inline]
pub async fn show_status() -> Result<()> {
    let config = load_config().unwrap_or_else(|e| {
        warn!("Using default configuration: {}", e);
        Config::default()
    });

    println!("📊 Recovery RAG Status Report");
    println!("{}", "=".repeat(50));
    println!();

    println!("🤖 Embedding Service:");
    match config.openai.embeddings_url() {
        Ok(url) => println!("   📡 Endpoint: {}", url),
        Err(e) => println!("   ❌ Endpoint: {}", e),
    }
    println!(
        "   📋 Model: {} ({} dimensions)",
        config.openai.model, config.openai.dimension
    );
    if config.openai.resolve_api_key().is_some() {
        println!("   ✅ API key configured");
    } else {
        println!(
            "   ❌ API key missing (set it in the config file or {})",
            API_KEY_ENV_VAR
        );
    }

    println!();
    println!("🔍 Vector Database Status:");
    let store = match LanceVectorStore::new(&config).await {
        Ok(store) => {
            println!(
                "   ✅ LanceDB: Connected ({})",
                config.vector_database_path().display()
            );
            store
        }
        Err(e) => {
            println!("   ❌ LanceDB: Failed to connect - {}", e);
            return Ok(());
        }
    };

    for (label, index) in [
        ("Big Book", &config.search.big_book_index),
        ("Daily Reflections", &config.search.reflections_index),
    ] {
        match store.count_documents(index).await {
            Ok(count) => println!("   📊 {} ({}): {} documents", label, index, count),
            Err(e) => println!("   ⚠️  {} ({}): {}", label, index, e),
        }
    }

    Ok(())
}
