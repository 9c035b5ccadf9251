//! Scripted user sessions for the CLI.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;

use crate::checker::AnswerChecker;
use crate::dom::Dom;
use crate::events::KeyEvent;
use crate::quiz::{FEEDBACK_CLASS, Ordinal};
use crate::session::Session;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplayScript {
    /// What the scripted checker writes for each ordinal.
    #[serde(default)]
    pub responses: BTreeMap<usize, Response>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Response {
    Answer {
        text: String,
        #[serde(default = "default_feedback_class")]
        class: String,
    },
    Fail {
        #[serde(default)]
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Click {
        selector: String,
    },
    Focus {
        selector: String,
    },
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        alt: bool,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        meta: bool,
    },
    Wait {
        ms: u64,
    },
    /// The page writes a verdict into `#feedback<ordinal>` on its own.
    Feedback {
        ordinal: usize,
        text: String,
        #[serde(default)]
        class: Option<String>,
    },
}

fn default_feedback_class() -> String {
    FEEDBACK_CLASS.to_string()
}

impl ReplayScript {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))
    }
}

/// Checker driven by a fixed table of responses. Records every call.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChecker {
    responses: BTreeMap<usize, Response>,
    calls: Vec<Ordinal>,
}

impl ScriptedChecker {
    pub fn new(responses: BTreeMap<usize, Response>) -> Self {
        Self {
            responses,
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[Ordinal] {
        &self.calls
    }
}

impl AnswerChecker for ScriptedChecker {
    fn check_answer(&mut self, dom: &mut Dom, ordinal: Ordinal) -> anyhow::Result<()> {
        self.calls.push(ordinal);
        match self.responses.get(&ordinal.get()) {
            Some(Response::Answer { text, class }) => {
                write_feedback(dom, ordinal, text, class);
                Ok(())
            }
            Some(Response::Fail { message }) => {
                anyhow::bail!("check {ordinal} failed: {message}")
            }
            None => Ok(()),
        }
    }
}

fn write_feedback(dom: &mut Dom, ordinal: Ordinal, text: &str, class: &str) {
    let Some(node) = dom.by_id(&ordinal.feedback_id()) else {
        tracing::debug!(ordinal = ordinal.get(), "no feedback container to write");
        return;
    };
    dom.set_text(&node, text);
    dom.set_attr(&node, "class", class);
}

/// Runs the steps in order, then lets pending timers fire.
pub fn play<C: AnswerChecker>(session: &mut Session<C>, steps: &[Step]) -> anyhow::Result<()> {
    for (index, step) in steps.iter().enumerate() {
        tracing::debug!(step = index + 1, ?step, "replay");
        match step {
            Step::Click { selector } => session
                .click_selector(selector)
                .with_context(|| format!("step {}: click", index + 1))?,
            Step::Focus { selector } => session
                .focus_selector(selector)
                .with_context(|| format!("step {}: focus", index + 1))?,
            Step::Key {
                key,
                ctrl,
                alt,
                shift,
                meta,
            } => {
                let outcome = session.key_down(&KeyEvent {
                    key: key.clone(),
                    ctrl: *ctrl,
                    alt: *alt,
                    shift: *shift,
                    meta: *meta,
                });
                tracing::debug!(default_prevented = outcome.default_prevented, "key handled");
            }
            Step::Wait { ms } => session.advance_time(Duration::from_millis(*ms)),
            Step::Feedback {
                ordinal,
                text,
                class,
            } => {
                let ordinal = Ordinal::new(*ordinal)
                    .with_context(|| format!("step {}: ordinals start at 1", index + 1))?;
                let class = class.clone().unwrap_or_else(default_feedback_class);
                session.update_dom(|dom| write_feedback(dom, ordinal, text, &class));
            }
        }
    }
    session.flush_timers();
    Ok(())
}
