//! Command-line front end: reads document HTML, writes Markdown.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blockdown::{ConversionOptions, MathDelimiters, convert_html};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "blockdown", version, about = "Convert block-structured document HTML to Markdown")]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Input HTML file. Reads stdin when absent or `-`.
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Write Markdown to this file instead of stdout.
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// JSON file with conversion options; flags below override it.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit `{page-id}` markers before every page container.
    #[arg(long)]
    paginate: bool,

    /// Separator printed after each page marker.
    #[arg(long, value_name = "TEXT")]
    page_separator: Option<String>,

    /// Inline math delimiters as OPEN,CLOSE.
    #[arg(long, value_name = "OPEN,CLOSE", value_parser = parse_delimiters)]
    inline_math_delimiters: Option<MathDelimiters>,

    /// Display math delimiters as OPEN,CLOSE.
    #[arg(long, value_name = "OPEN,CLOSE", value_parser = parse_delimiters)]
    block_math_delimiters: Option<MathDelimiters>,

    /// Keep tables as raw HTML.
    #[arg(long)]
    html_tables: bool,

    /// Leave `$` unescaped.
    #[arg(long)]
    no_escape_dollars: bool,

    /// Leave `*` unescaped.
    #[arg(long)]
    no_escape_asterisks: bool,

    /// Escape `_`.
    #[arg(long)]
    escape_underscores: bool,

    /// Escape other Markdown punctuation.
    #[arg(long)]
    escape_misc: bool,

    /// Log conversion details to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_delimiters(value: &str) -> std::result::Result<MathDelimiters, String> {
    MathDelimiters::parse(value).map_err(|err| err.to_string())
}

impl Cli {
    fn options(&self) -> Result<ConversionOptions> {
        let mut options = match &self.config {
            Some(path) => load_config(path)?,
            None => ConversionOptions::default(),
        };

        if self.paginate {
            options.paginate_output = true;
        }
        if let Some(separator) = &self.page_separator {
            options.page_separator.clone_from(separator);
        }
        if let Some(delimiters) = &self.inline_math_delimiters {
            options.inline_math_delimiters = delimiters.clone();
        }
        if let Some(delimiters) = &self.block_math_delimiters {
            options.block_math_delimiters = delimiters.clone();
        }
        if self.html_tables {
            options.html_tables_in_markdown = true;
        }
        if self.no_escape_dollars {
            options.escape_dollars = false;
        }
        if self.no_escape_asterisks {
            options.escape_asterisks = false;
        }
        if self.escape_underscores {
            options.escape_underscores = true;
        }
        if self.escape_misc {
            options.escape_misc = true;
        }

        Ok(options)
    }
}

fn load_config(path: &Path) -> Result<ConversionOptions> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid config file {}", path.display()))
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).with_context(|| format!("Failed to read input file {}", path.display()))
        }
        _ => {
            let mut html = String::new();
            io::stdin()
                .read_to_string(&mut html)
                .context("Failed to read from stdin")?;
            Ok(html)
        }
    }
}

/// Converted documents end without a newline unless pagination padded them;
/// only the unpadded ones get a final newline.
fn write_output(output: Option<&Path>, markdown: &str) -> Result<()> {
    let mut text = markdown.to_string();
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }

    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write output file {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes()).context("Failed to write to stdout")?;
            stdout.flush().context("Failed to flush stdout")
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let options = cli.options()?;
    let html = read_input(cli.input.as_deref())?;
    log::debug!("read {} bytes of HTML", html.len());

    let markdown = convert_html(&html, &options).context("Failed to convert HTML")?;
    write_output(cli.output.as_deref(), &markdown)
}
