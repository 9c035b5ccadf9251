use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use url::Url;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProgressMode {
    /// Enable progress UI when stderr is a TTY.
    Auto,
    /// Always enable progress UI (even when piped).
    Always,
    /// Never show progress UI.
    Never,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Quiz page HTML file to enhance.
    #[arg(long, required_unless_present = "url", conflicts_with = "url")]
    pub input: Option<PathBuf>,

    /// Fetch the quiz page from this URL instead of reading `--input`.
    #[arg(long)]
    pub url: Option<Url>,

    /// Output HTML path. Defaults to `<input>.enhanced.html` (or `quiz.enhanced.html` for `--url`).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// JSON file with enhancer options (check delay, labels).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON replay script: checker responses plus user steps to run against the page.
    ///
    /// Without a script the page is only enhanced; questions are never checked.
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Delay in milliseconds between a question check and revealing its feedback.
    /// Overrides the config file.
    #[arg(long)]
    pub check_delay_ms: Option<u64>,

    /// HTTP User-Agent used for `--url`.
    #[arg(long, default_value = "quiz-page-enhancer/0.1")]
    pub user_agent: String,

    /// Progress display: `auto`, `always`, or `never`.
    #[arg(long, value_enum, default_value = "auto")]
    pub progress: ProgressMode,
}

impl Args {
    pub fn out_path(&self) -> PathBuf {
        if let Some(out) = &self.out {
            return out.clone();
        }
        match &self.input {
            Some(input) => input.with_extension("enhanced.html"),
            None => PathBuf::from("quiz.enhanced.html"),
        }
    }
}
