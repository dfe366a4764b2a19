//! Command-line front-end for cardmark.
//!
//! - `cardmark render` renders one card from `--text`, a file, or stdin
//! - `cardmark batch` renders a page of search results (JSON)

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use cardmark::models::{decode_entities, tag_name};
use cardmark::{
    CardPage, CardRenderer, ConfigError, FinalMarkup, Fragment, HighlightSpec, RenderConfig,
    TruncationBudget,
};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "cardmark", version, about = "Render search result cards with highlights")]
pub struct Cli {
    /// TOML render configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render a single card
    Render(RenderArgs),
    /// Render a page of search results
    Batch(BatchArgs),
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Card text (markdown)
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Read card text from a file; stdin is used when neither is given
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Phrase to highlight, repeatable
    #[arg(short = 'H', long = "highlight")]
    pub highlights: Vec<String>,

    /// Word budget for the preview
    #[arg(long)]
    pub words: Option<usize>,

    /// Smallest budget tried before keeping the full text
    #[arg(long)]
    pub floor: Option<usize>,

    /// Render the full text without truncation
    #[arg(long)]
    pub full: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// JSON page of records (`{"cards": [...], "totalCount": n}`); stdin when omitted
    pub input: Option<PathBuf>,

    /// Render full texts instead of previews
    #[arg(long)]
    pub full: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// HTML fragment
    Html,
    /// Segment list as JSON
    Json,
    /// Plain text with ANSI highlights
    Terminal,
}

// =============================================================================
// Errors
// =============================================================================

/// CLI errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Input file or stdin could not be read
    #[error("failed to read {what}: {source}")]
    Read {
        what: String,
        #[source]
        source: io::Error,
    },
    /// Output could not be written
    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// =============================================================================
// Commands
// =============================================================================

/// Execute a parsed command line.
pub fn run(cli: &Cli, input: &mut dyn Read, out: &mut dyn Write) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    tracing::debug!(?config, "loaded render configuration");
    let renderer = CardRenderer::new(config);

    match &cli.command {
        Command::Render(args) => run_render(&renderer, args, input, out),
        Command::Batch(args) => run_batch(&renderer, args, input, out),
    }
}

fn run_render(
    renderer: &CardRenderer,
    args: &RenderArgs,
    input: &mut dyn Read,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let text = match (&args.text, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => read_file(path)?,
        (None, None) => read_input(input)?,
    };

    let spec = highlight_spec(&args.highlights);
    let markup = if args.full {
        renderer.render_full(&text, &spec)
    } else {
        let defaults = renderer.config().truncation;
        let budget = TruncationBudget::new(
            args.words.unwrap_or(defaults.words),
            args.floor.unwrap_or(defaults.floor),
        )?;
        renderer.render(&text, &spec, Some(&budget))
    };

    match args.format {
        OutputFormat::Html => writeln!(out, "{}", markup.to_html())?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&markup)?)?,
        OutputFormat::Terminal => writeln!(out, "{}", to_terminal(&markup))?,
    }
    Ok(())
}

/// Rendered card in JSON batch output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderedCard<'a> {
    author: &'a str,
    username: Option<&'a str>,
    full_name: Option<&'a str>,
    markup: FinalMarkup,
}

fn run_batch(
    renderer: &CardRenderer,
    args: &BatchArgs,
    input: &mut dyn Read,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let source = match &args.input {
        Some(path) => read_file(path)?,
        None => read_input(input)?,
    };
    let page: CardPage = serde_json::from_str(&source)?;
    let preview = !args.full;

    match args.format {
        OutputFormat::Json => {
            let cards: Vec<RenderedCard<'_>> = page
                .cards
                .iter()
                .map(|card| RenderedCard {
                    author: &card.author,
                    username: card.username(),
                    full_name: card.full_name(),
                    markup: renderer.render_record(card, preview),
                })
                .collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&cards)?)?;
        }
        OutputFormat::Html => {
            for card in &page.cards {
                let markup = renderer.render_record(card, preview);
                writeln!(out, "<article class=\"card\">")?;
                if let Some(header) = author_header(card.username(), card.full_name()) {
                    writeln!(out, "<h3>{}</h3>", escape_html(&header))?;
                }
                writeln!(out, "{}", markup.to_html().trim_end())?;
                writeln!(out, "</article>")?;
            }
        }
        OutputFormat::Terminal => {
            for card in &page.cards {
                let markup = renderer.render_record(card, preview);
                if let Some(header) = author_header(card.username(), card.full_name()) {
                    writeln!(out, "\x1b[1m{}\x1b[0m", header)?;
                }
                writeln!(out, "{}", to_terminal(&markup))?;
                writeln!(out, "---")?;
            }
            writeln!(out, "{} of {} results", page.cards.len(), page.total_count)?;
        }
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        what: path.display().to_string(),
        source,
    })
}

fn read_input(input: &mut dyn Read) -> Result<String, CliError> {
    let mut buf = String::new();
    input
        .read_to_string(&mut buf)
        .map_err(|source| CliError::Read {
            what: "stdin".to_string(),
            source,
        })?;
    Ok(buf)
}

/// Zero phrases mean no highlighting, one is a phrase, more form a list.
pub fn highlight_spec(phrases: &[String]) -> HighlightSpec {
    match phrases {
        [] => HighlightSpec::Absent,
        [single] => HighlightSpec::Phrase(single.clone()),
        many => HighlightSpec::List(many.to_vec()),
    }
}

fn author_header(username: Option<&str>, full_name: Option<&str>) -> Option<String> {
    match (username, full_name) {
        (Some(user), Some(name)) => Some(format!("@{} ({})", user, name)),
        (Some(user), None) => Some(format!("@{}", user)),
        (None, Some(name)) => Some(name.to_string()),
        (None, None) => None,
    }
}

// =============================================================================
// Terminal Output
// =============================================================================

const ANSI_HIGHLIGHT: &str = "\x1b[1;33m";
const ANSI_RESET: &str = "\x1b[0m";

/// Render fragments as terminal text.
///
/// Highlights become bold yellow, list items get a bullet, block ends and
/// `<br>` become line breaks.
pub fn to_terminal(markup: &FinalMarkup) -> String {
    let mut out = String::new();
    for fragment in markup.fragments() {
        match fragment {
            Fragment::Text(text) => out.push_str(&decode_entities(text)),
            Fragment::Highlighted(text) => {
                out.push_str(ANSI_HIGHLIGHT);
                out.push_str(&decode_entities(text));
                out.push_str(ANSI_RESET);
            }
            Fragment::RawTag(tag) => {
                let name = tag_name(tag);
                let closing = tag.starts_with("</");
                match name.as_str() {
                    "li" if !closing => out.push_str("• "),
                    "br" => push_line_break(&mut out),
                    "p" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote"
                    | "pre" | "tr"
                        if closing =>
                    {
                        push_line_break(&mut out)
                    }
                    _ => {}
                }
            }
        }
    }

    let mut lines: Vec<&str> = out.lines().map(str::trim_end).collect();
    lines.retain(|line| !line.is_empty());
    lines.join("\n")
}

fn push_line_break(out: &mut String) {
    if !out.ends_with('\n') {
        out.push('\n');
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
