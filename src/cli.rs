use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::serpapi::Locale;

/// Typical number of related questions SerpApi returns per expansion.
const TYPICAL_FAN_OUT: u64 = 4;
/// Depth from which the run asks before spending API credits.
const CONFIRM_FROM_DEPTH: u32 = 3;

#[derive(Parser, Debug)]
#[command(name = "paa-tree")]
#[command(about = "Expand Google \"People Also Ask\" questions into a labeled tree via SerpApi")]
#[command(version)]
pub struct Args {
    /// Seed search query (multiple words are joined with spaces)
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Levels of questions to collect (1 = root questions only)
    #[arg(short, long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    pub depth: u32,

    /// Bypass SerpApi's result cache
    #[arg(long)]
    pub fresh: bool,

    /// Also print the tree to stdout as a labeled outline
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    /// Directory the JSON result is written to
    #[arg(short, long, default_value = "results")]
    pub out_dir: PathBuf,

    /// Print the JSON result to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,

    /// Skip the confirmation prompt for deep runs
    #[arg(short, long)]
    pub yes: bool,

    /// Interface language passed to Google (e.g. "en", "de")
    #[arg(long)]
    pub hl: Option<String>,

    /// Country passed to Google (e.g. "us", "at")
    #[arg(long)]
    pub gl: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Outline,
}

/// Where the outline is printed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutlineTarget {
    Stdout,
    /// stdout already carries the JSON document.
    Stderr,
}

impl Args {
    pub fn query_text(&self) -> String {
        self.query.join(" ").trim().to_string()
    }

    pub fn locale(&self) -> Locale {
        Locale {
            hl: self.hl.clone(),
            gl: self.gl.clone(),
        }
    }

    pub fn outline_target(&self) -> Option<OutlineTarget> {
        match (self.format, self.stdout) {
            (Format::Json, _) => None,
            (Format::Outline, false) => Some(OutlineTarget::Stdout),
            (Format::Outline, true) => Some(OutlineTarget::Stderr),
        }
    }

    pub fn needs_confirmation(&self) -> bool {
        self.depth >= CONFIRM_FROM_DEPTH && !self.yes
    }
}

/// Upper estimate of SerpApi calls for a run: the seed search plus one call per
/// expandable node on every level above the last.
pub fn worst_case_calls(depth: u32) -> u64 {
    let mut total = 0u64;
    let mut level_calls = 1u64;
    for _ in 0..depth {
        total = total.saturating_add(level_calls);
        if total == u64::MAX {
            break;
        }
        level_calls = level_calls.saturating_mul(TYPICAL_FAN_OUT);
    }
    total
}

/// Asks a yes/no question; anything but `y`/`yes` counts as no.
pub fn confirm(prompt: &str, mut input: impl BufRead, mut out: impl Write) -> io::Result<bool> {
    write!(out, "{prompt} [y/N] ")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}
