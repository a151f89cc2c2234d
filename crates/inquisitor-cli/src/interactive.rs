//! Question loop reading from stdin.

use anyhow::Result;
use inquisitor_cli::Inquisitor;
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, BufReader, stdin};

use crate::handlers::{
    Session, answer_question, clear_cache, show_matches, show_recent, show_similar, show_stats,
};

/// Entries listed by `:find` in interactive mode.
const FIND_LIMIT: usize = 10;

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Input<'line> {
    Blank,
    Quit,
    Help,
    Recent,
    Stats,
    Clear,
    Similar(&'line str),
    Find(&'line str),
    Unknown(&'line str),
    Question(&'line str),
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Blank;
    }
    if matches!(line.to_lowercase().as_str(), "quit" | "exit" | "q") {
        return Input::Quit;
    }
    let Some(command) = line.strip_prefix(':') else {
        return Input::Question(line);
    };

    let (name, argument) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, rest)| (name, rest.trim()));
    match (name, argument) {
        ("help", _) => Input::Help,
        ("recent", _) => Input::Recent,
        ("stats", _) => Input::Stats,
        ("clear", _) => Input::Clear,
        ("search", term) if !term.is_empty() => Input::Similar(term),
        ("find", term) if !term.is_empty() => Input::Find(term),
        _ => Input::Unknown(line),
    }
}

const HELP: &str = "Commands:
  :recent          Recently cached questions
  :search <text>   Cached questions similar to <text>
  :find <text>     Cached entries containing <text>
  :stats           Cache statistics
  :clear           Delete every cached answer
  quit, exit, q    Leave";

/// Reads questions from stdin until `quit` or end of input.
///
/// # Errors
/// Returns an error if stdin cannot be read or the terminal cannot be written
pub async fn run_interactive(session: &Session, inquisitor: &mut Inquisitor) -> Result<()> {
    run_with_input(session, inquisitor, BufReader::new(stdin())).await
}

async fn run_with_input<R: AsyncBufRead + Unpin>(
    session: &Session,
    inquisitor: &mut Inquisitor,
    input: R,
) -> Result<()> {
    let term = &session.term;
    let formatter = &session.formatter;

    term.write_line(&formatter.format_success("Welcome to Inquisitor! Ask me anything."))?;
    term.write_line("Type 'quit', 'exit', or press Ctrl+C to exit. Type ':help' for cache commands.\n")?;

    let mut lines = input.lines();
    loop {
        term.write_str("❓ Your question: ")?;
        term.flush()?;

        let Some(line) = lines.next_line().await? else {
            term.write_line("")?;
            break;
        };

        match parse_input(&line) {
            Input::Blank => {}
            Input::Quit => break,
            Input::Help => term.write_line(HELP)?,
            Input::Question(question) => {
                term.write_line("")?;
                if answer_question(session, inquisitor, question).await? {
                    term.write_line(&format!("\n{}\n", formatter.format_separator()))?;
                }
            }
            Input::Unknown(command) => term.write_line(
                &formatter.format_error(&format!("Unknown command `{command}`, try :help")),
            )?,
            cache_command => {
                let Some(cache) = inquisitor.cache_mut() else {
                    term.write_line(&formatter.format_info("Caching is disabled"))?;
                    continue;
                };
                let outcome = match cache_command {
                    Input::Recent => show_recent(session, cache, session.config.cache.recent_count),
                    Input::Stats => show_stats(session, cache),
                    Input::Clear => clear_cache(session, cache, false),
                    Input::Similar(query) => show_similar(
                        session,
                        cache,
                        query,
                        session.config.cache.similarity_threshold,
                        session.config.cache.max_similar_results,
                    ),
                    Input::Find(pattern) => show_matches(session, cache, pattern, FIND_LIMIT),
                    _ => Ok(()),
                };
                if let Err(error) = outcome {
                    term.write_line(&formatter.format_error(&format!("{error:#}")))?;
                }
            }
        }
    }

    term.write_line(&formatter.format_success("Goodbye!"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use console::Term;
    use inquisitor_cli::OutputFormatter;
    use inquisitor_core::{InquisitorConfig, SearchResult};
    use inquisitor_providers::{MockSearch, MockSynthesizer};
    use std::path::PathBuf;

    fn session() -> Session {
        Session {
            config: InquisitorConfig::default(),
            formatter: OutputFormatter::new(false),
            cache_dir: PathBuf::from("unused"),
            term: Term::stdout(),
        }
    }

    #[tokio::test]
    async fn test_loop_answers_until_quit() {
        let search = MockSearch::new(vec![SearchResult::new(
            "Rust",
            "https://www.rust-lang.org",
            "A language empowering everyone.",
        )]);
        let synthesizer = MockSynthesizer::new("Rust is a language [1].");
        let mut inquisitor: Inquisitor = Inquisitor::new(
            None,
            Box::new(search.clone()),
            Box::new(synthesizer.clone()),
        );

        let input: &[u8] = b"What is Rust?\n\n:stats\nquit\nWhat is Go?\n";
        run_with_input(&session(), &mut inquisitor, input).await.unwrap();

        assert_eq!(search.get_call_history(), vec!["What is Rust?".to_owned()]);
        assert_eq!(synthesizer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_loop_ends_at_end_of_input() {
        let search = MockSearch::new(Vec::new());
        let mut inquisitor: Inquisitor = Inquisitor::new(
            None,
            Box::new(search.clone()),
            Box::new(MockSynthesizer::new("unused")),
        );

        let input: &[u8] = b":help\n:bogus";
        run_with_input(&session(), &mut inquisitor, input).await.unwrap();
        assert_eq!(search.call_count(), 0);
    }

    #[test]
    fn test_quit_words() {
        for word in ["quit", "EXIT", " q "] {
            assert_eq!(parse_input(word), Input::Quit);
        }
    }

    #[test]
    fn test_questions_and_blanks() {
        assert_eq!(parse_input("   \n"), Input::Blank);
        assert_eq!(
            parse_input("What is Rust?\n"),
            Input::Question("What is Rust?")
        );
    }

    #[test]
    fn test_cache_commands() {
        assert_eq!(parse_input(":recent"), Input::Recent);
        assert_eq!(parse_input(":stats\n"), Input::Stats);
        assert_eq!(
            parse_input(":search  capital of France "),
            Input::Similar("capital of France")
        );
        assert_eq!(parse_input(":find paris"), Input::Find("paris"));
    }

    #[test]
    fn test_commands_missing_arguments() {
        assert_eq!(parse_input(":search"), Input::Unknown(":search"));
        assert_eq!(parse_input(":bogus"), Input::Unknown(":bogus"));
    }
}
