use console::style;

use super::Config;

/// Print the effective configuration to stderr
#[inline]
pub fn show_config(config: &Config) {
    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("OpenAI Settings:").bold().yellow());
    match config.openai.embeddings_url() {
        Ok(url) => eprintln!("  Endpoint: {}", style(url).cyan()),
        Err(e) => eprintln!("  Endpoint: {} ({})", style("Invalid").red(), e),
    }
    eprintln!("  Model: {}", style(&config.openai.model).cyan());
    eprintln!("  Dimension: {}", style(config.openai.dimension).cyan());
    eprintln!("  Timeout: {}s", style(config.openai.timeout_secs).cyan());
    eprintln!("  Retry Attempts: {}", style(config.openai.retry_attempts).cyan());
    let key_status = if config.openai.resolve_api_key().is_some() {
        style("configured").green()
    } else {
        style("missing").red()
    };
    eprintln!("  API Key: {key_status}");

    eprintln!();
    eprintln!("{}", style("Search Settings:").bold().yellow());
    eprintln!("  Result Limit: {}", style(config.search.limit).cyan());
    eprintln!("  Minimum Score: {}", style(config.search.min_score).cyan());
    eprintln!(
        "  Source Timeout: {}ms",
        style(config.search.source_timeout_ms).cyan()
    );
    eprintln!(
        "  Big Book Index: {}",
        style(&config.search.big_book_index).cyan()
    );
    eprintln!(
        "  Reflections Index: {}",
        style(&config.search.reflections_index).cyan()
    );

    eprintln!();
    eprintln!(
        "Vector store: {}",
        style(config.vector_database_path().display()).dim()
    );
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );
}
