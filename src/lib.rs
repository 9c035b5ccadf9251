mod checker;
mod cli;
mod config;
mod dom;
mod enhancer;
mod events;
mod feedback;
mod fetcher;
mod progress;
mod quiz;
mod replay;
mod scheduler;
mod session;
mod status;
mod theme;
mod toolbar;

use std::path::Path;

use anyhow::Context as _;
use cli::Args;
use fetcher::PageFetcher;

pub use checker::{AnswerChecker, MissingChecker};
pub use cli::{Args as CliArgs, ProgressMode};
pub use config::{DEFAULT_CHECK_DELAY_MS, EnhancerOptions, Labels};
pub use dom::{Dom, Effect, ScrollBehavior, ScrollBlock};
pub use enhancer::{CheckAllOutcome, QuizPageEnhancer};
pub use events::{KeyEvent, KeyOutcome, Listener, Listeners, Shortcut};
pub use feedback::{ChangeKind, FeedbackBatch, FeedbackBus, FeedbackSubscriber};
pub use progress::ProgressSnapshot;
pub use quiz::{CheckButton, Ordinal, QuestionHandles, QuestionMap};
pub use replay::{ReplayScript, Response, ScriptedChecker, Step};
pub use scheduler::{Scheduler, Task};
pub use session::Session;
pub use theme::ThemeToggle;
pub use toolbar::Toolbar;

/// Read-side DOM helpers.
pub mod query {
    pub use crate::dom::{attr, classes, has_class, query, query_all, style, text};
}

pub async fn run(args: Args) -> anyhow::Result<()> {
    use std::io::IsTerminal as _;

    let progress_enabled = match args.progress {
        ProgressMode::Always => true,
        ProgressMode::Never => false,
        ProgressMode::Auto => std::io::stderr().is_terminal(),
    };
    let status = status::Status::new(progress_enabled);

    let mut options = match &args.config {
        Some(path) => EnhancerOptions::load(path)?,
        None => EnhancerOptions::default(),
    };
    if let Some(ms) = args.check_delay_ms {
        options.check_delay_ms = ms;
    }

    status.set_stage("loading page");
    let html = load_page(&args).await?;

    let script = match &args.replay {
        Some(path) => ReplayScript::load(path)?,
        None => ReplayScript::default(),
    };

    status.set_stage("enhancing");
    let mut session = Session::load(&html, ScriptedChecker::new(script.responses.clone()), options)?;

    if !script.steps.is_empty() {
        status.set_stage("replaying");
        replay::play(&mut session, &script.steps).context("replay")?;
    }

    status.set_stage("writing output");
    let out_path = args.out_path();
    write_output(&out_path, &session.to_html()?)?;

    let snapshot = session.progress();
    tracing::info!(
        out = %out_path.display(),
        questions = snapshot.total,
        answered = snapshot.answered,
        done = snapshot.done_count(),
        percent = snapshot.percent,
        checks = session.checker().calls().len(),
        "enhanced quiz page written"
    );
    status.finish(format!("{}% answered", snapshot.percent));
    Ok(())
}

async fn load_page(args: &Args) -> anyhow::Result<String> {
    if let Some(url) = &args.url {
        let fetcher = PageFetcher::new(&args.user_agent)?;
        return fetcher.get_page(url.clone()).await;
    }
    let input = args
        .input
        .as_ref()
        .context("either --input or --url is required")?;
    std::fs::read_to_string(input).with_context(|| format!("read {}", input.display()))
}

fn write_output(path: &Path, html: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    std::fs::write(path, html).with_context(|| format!("write {}", path.display()))
}
