//! Command handlers for CLI operations

use anyhow::{Context as _, Result, bail};
use console::Term;
use dialoguer::Confirm;
use inquisitor_cache::{CacheService, JsonFileBackend};
use inquisitor_cli::{AnswerSource, Inquisitor, OutputFormatter};
use inquisitor_core::InquisitorConfig;
use inquisitor_providers::{OpenAiSynthesizer, SerpApiSearch};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::cli::{Cli, Commands};
use crate::interactive::run_interactive;
use crate::utils::{load_config, masked, resolve_cache_dir};

/// Settings shared by every command, merged from the config file and flags.
pub struct Session {
    pub config: InquisitorConfig,
    pub formatter: OutputFormatter,
    pub cache_dir: PathBuf,
    pub term: Term,
}

impl Session {
    /// Loads configuration and applies command-line overrides.
    ///
    /// # Errors
    /// Returns an error if the cache directory cannot be determined
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = load_config();
        if let Some(results) = cli.results {
            config.search.num_results = results;
        }
        if let Some(threshold) = cli.threshold {
            config.cache.similarity_threshold = threshold;
        }
        if cli.no_cache {
            config.cache.enabled = false;
        }
        let cache_dir = resolve_cache_dir(cli.cache_dir.clone(), &config)?;

        Ok(Self {
            config,
            formatter: OutputFormatter::new(!cli.no_color),
            cache_dir,
            term: Term::stdout(),
        })
    }

    /// Opens the cache and reports a corrupt or unreadable cache file.
    ///
    /// # Errors
    /// Returns an error if the warning cannot be written
    pub fn open_cache(&self) -> Result<CacheService> {
        let mut cache = CacheService::new(JsonFileBackend::in_directory(&self.cache_dir));
        if let Some(warning) = cache.take_load_warning() {
            self.term.write_line(
                &self
                    .formatter
                    .format_warning(&format!("Cache could not be read, starting empty: {warning}")),
            )?;
        }
        Ok(cache)
    }

    /// Builds the answer pipeline from configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn build_inquisitor(&self) -> Result<Inquisitor> {
        let cache = self
            .config
            .cache
            .enabled
            .then(|| CacheService::new(JsonFileBackend::in_directory(&self.cache_dir)));
        let search = SerpApiSearch::new(&self.config.search, self.config.serpapi_key())?;
        let synthesizer = OpenAiSynthesizer::new(&self.config.llm, self.config.openai_key());

        Ok(Inquisitor::new(cache, Box::new(search), Box::new(synthesizer))
            .with_num_results(self.config.search.num_results)
            .with_similarity_threshold(self.config.cache.similarity_threshold))
    }
}

/// Runs the command selected on the command line.
///
/// # Errors
/// Returns an error if both a question and a subcommand are given, or the
/// command fails
pub async fn dispatch(cli: Cli) -> Result<ExitCode> {
    if let (Some(query), Some(_)) = (&cli.query, &cli.command) {
        bail!("Unexpected question {query:?} before a subcommand; quote the whole question or drop the subcommand");
    }
    let session = Session::from_cli(&cli)?;

    match cli.command {
        Some(Commands::Recent { count }) => {
            let mut cache = session.open_cache()?;
            let count = count.unwrap_or(session.config.cache.recent_count);
            show_recent(&session, &mut cache, count)?;
        }
        Some(Commands::Search {
            query,
            threshold,
            max,
        }) => {
            let mut cache = session.open_cache()?;
            let threshold = threshold.unwrap_or(session.config.cache.similarity_threshold);
            let max = max.unwrap_or(session.config.cache.max_similar_results);
            show_similar(&session, &mut cache, &query, threshold, max)?;
        }
        Some(Commands::Find { pattern, max }) => {
            let mut cache = session.open_cache()?;
            show_matches(&session, &mut cache, &pattern, max)?;
        }
        Some(Commands::Stats) => {
            let mut cache = session.open_cache()?;
            show_stats(&session, &mut cache)?;
        }
        Some(Commands::Clear { yes }) => {
            let mut cache = session.open_cache()?;
            clear_cache(&session, &mut cache, yes)?;
        }
        Some(Commands::Config { full }) => show_config(&session, full)?,
        None => {
            let mut inquisitor = session.build_inquisitor()?;
            if let Some(query) = cli.query {
                let answered = answer_question(&session, &mut inquisitor, &query).await?;
                return Ok(if answered {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                });
            }
            run_interactive(&session, &mut inquisitor).await?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Answers one question and prints it. Returns `false` if it failed.
///
/// # Errors
/// Returns an error only if the terminal cannot be written
pub async fn answer_question(
    session: &Session,
    inquisitor: &mut Inquisitor,
    question: &str,
) -> Result<bool> {
    let formatter = &session.formatter;
    let term = &session.term;
    term.write_line(&formatter.format_status("Researching"))?;

    let answer = match inquisitor.answer(question).await {
        Ok(answer) => answer,
        Err(error) => {
            tracing::debug!("question failed: {error:?}");
            term.write_line(&formatter.format_error(&format!("Failed to process query: {error:#}")))?;
            return Ok(false);
        }
    };

    for notice in &answer.notices {
        term.write_line(&formatter.format_warning(notice))?;
    }
    if let Some(line) = formatter.format_answer_source(&answer.source) {
        term.write_line(&line)?;
    }
    if answer.source == AnswerSource::Fresh {
        term.write_line(
            &formatter.format_success(&format!("Found {} results", answer.results.len())),
        )?;
        term.write_line(&formatter.format_success("Answer generated"))?;
    }
    term.write_line("")?;
    term.write_line(&formatter.format_response(&answer.text, &answer.results))?;
    Ok(true)
}

/// Prints the `count` most recent entries.
///
/// # Errors
/// Returns an error if the terminal cannot be written
pub fn show_recent(session: &Session, cache: &mut CacheService, count: usize) -> Result<()> {
    let entries = cache.get_recent_entries(count);
    session
        .term
        .write_line(&session.formatter.format_recent(&entries))?;
    Ok(())
}

/// Prints cached questions similar to `query`.
///
/// # Errors
/// Returns an error if the arguments are out of range or the terminal cannot
/// be written
pub fn show_similar(
    session: &Session,
    cache: &mut CacheService,
    query: &str,
    threshold: f64,
    max: usize,
) -> Result<()> {
    let matches = cache.find_similar_questions(query, threshold, max)?;
    session
        .term
        .write_line(&session.formatter.format_similar(query, &matches))?;
    Ok(())
}

/// Prints cached entries mentioning `pattern`.
///
/// # Errors
/// Returns an error if `max` is zero or the terminal cannot be written
pub fn show_matches(
    session: &Session,
    cache: &mut CacheService,
    pattern: &str,
    max: usize,
) -> Result<()> {
    let entries = cache.search_cache(pattern, max)?;
    session
        .term
        .write_line(&session.formatter.format_search_hits(pattern, &entries))?;
    Ok(())
}

/// Prints cache statistics.
///
/// # Errors
/// Returns an error if the cache size cannot be read or the terminal cannot
/// be written
pub fn show_stats(session: &Session, cache: &mut CacheService) -> Result<()> {
    let stats = cache.get_cache_stats()?;
    session.term.write_line(
        &session
            .formatter
            .format_stats(&stats, cache.backend().path()),
    )?;
    Ok(())
}

/// Deletes every entry, asking first unless `skip_confirm` is set or there is
/// nothing to lose.
///
/// The empty collection is always written, so an unreadable cache file is
/// replaced even when no entries were loaded.
///
/// # Errors
/// Returns an error if the prompt or the write fails
pub fn clear_cache(session: &Session, cache: &mut CacheService, skip_confirm: bool) -> Result<()> {
    let count = cache.len();
    if count > 0 && !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete all {count} cached answers?"))
            .default(false)
            .interact()
            .context("Confirmation required; pass --yes to clear without asking")?;
        if !confirmed {
            session
                .term
                .write_line(&session.formatter.format_info("Cache left unchanged"))?;
            return Ok(());
        }
    }

    cache.clear_cache()?;
    let message = if count == 0 {
        "The cache is already empty".to_owned()
    } else {
        format!("Removed {count} cached answers")
    };
    session
        .term
        .write_line(&session.formatter.format_success(&message))?;
    Ok(())
}

/// Prints the effective configuration with API keys masked.
///
/// # Errors
/// Returns an error if the configuration cannot be serialized or the terminal
/// cannot be written
pub fn show_config(session: &Session, full: bool) -> Result<()> {
    let term = &session.term;
    let config = masked(&session.config);

    if full {
        term.write_line(&toml::to_string_pretty(&config)?)?;
        return Ok(());
    }

    let key_state = |key: Option<String>| if key.is_some() { "set" } else { "not set" };
    term.write_line(&session.formatter.format_header("Configuration"))?;
    term.write_line(&format!(
        "  Config file:       {}",
        InquisitorConfig::config_path()?.display()
    ))?;
    term.write_line(&format!("  Cache directory:   {}", session.cache_dir.display()))?;
    term.write_line(&format!("  Cache enabled:     {}", config.cache.enabled))?;
    term.write_line(&format!(
        "  Similarity:        {:.2}",
        config.cache.similarity_threshold
    ))?;
    term.write_line(&format!("  Search results:    {}", config.search.num_results))?;
    term.write_line(&format!("  Model:             {}", config.llm.model))?;
    term.write_line(&format!(
        "  SerpAPI key:       {}",
        key_state(session.config.serpapi_key())
    ))?;
    term.write_line(&format!(
        "  OpenAI key:        {}",
        key_state(session.config.openai_key())
    ))?;
    Ok(())
}
