//! Event loop for an enhanced page.
//!
//! A `Session` stands in for the browser's UI thread: every public entry point runs its handlers
//! to completion, then delivers queued feedback changes before returning.

use std::time::Duration;

use anyhow::Context as _;
use kuchiki::NodeRef;

use crate::checker::AnswerChecker;
use crate::config::EnhancerOptions;
use crate::dom::Dom;
use crate::enhancer::QuizPageEnhancer;
use crate::events::{KeyEvent, KeyOutcome, Listener, Listeners, Shortcut};
use crate::feedback::FeedbackSubscriber as _;
use crate::progress::ProgressSnapshot;
use crate::quiz::{self, Ordinal};
use crate::scheduler::{Scheduler, Task};
use crate::theme::ThemeToggle;

/// Guards against subscribers that keep writing to watched elements.
const MAX_CHECKPOINT_ROUNDS: usize = 64;

pub struct Session<C> {
    dom: Dom,
    enhancer: QuizPageEnhancer,
    theme: Option<ThemeToggle>,
    listeners: Listeners,
    scheduler: Scheduler,
    checker: C,
}

impl<C: AnswerChecker> Session<C> {
    pub fn load(html: &str, checker: C, options: EnhancerOptions) -> anyhow::Result<Self> {
        Self::new(Dom::parse(html), checker, options)
    }

    /// Attaches both components to an already parsed page.
    pub fn new(mut dom: Dom, checker: C, options: EnhancerOptions) -> anyhow::Result<Self> {
        let mut listeners = Listeners::default();
        let enhancer = QuizPageEnhancer::attach(&mut dom, options, &mut listeners)
            .context("attach quiz page enhancer")?;
        let theme = ThemeToggle::attach(&dom, &mut listeners);
        let mut session = Self {
            dom,
            enhancer,
            theme,
            listeners,
            scheduler: Scheduler::default(),
            checker,
        };
        session.checkpoint();
        Ok(session)
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn enhancer(&self) -> &QuizPageEnhancer {
        &self.enhancer
    }

    pub fn theme(&self) -> Option<&ThemeToggle> {
        self.theme.as_ref()
    }

    pub fn checker(&self) -> &C {
        &self.checker
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.enhancer.measure(&self.dom)
    }

    pub fn to_html(&self) -> anyhow::Result<String> {
        self.dom.to_html()
    }

    /// Lets the host page write to the DOM directly, like a script outside the enhancer.
    pub fn update_dom<R>(&mut self, f: impl FnOnce(&mut Dom) -> R) -> R {
        let out = f(&mut self.dom);
        self.checkpoint();
        out
    }

    pub fn click(&mut self, target: &NodeRef) {
        self.dispatch_click(target);
        self.checkpoint();
    }

    pub fn click_selector(&mut self, selector: &str) -> anyhow::Result<()> {
        let target = self
            .dom
            .query(selector)
            .with_context(|| format!("no element matches {selector}"))?;
        self.click(&target);
        Ok(())
    }

    pub fn focus(&mut self, target: &NodeRef) {
        self.dom.focus(target);
        self.checkpoint();
    }

    pub fn focus_selector(&mut self, selector: &str) -> anyhow::Result<()> {
        let target = self
            .dom
            .query(selector)
            .with_context(|| format!("no element matches {selector}"))?;
        self.focus(&target);
        Ok(())
    }

    pub fn key_down(&mut self, event: &KeyEvent) -> KeyOutcome {
        let mut outcome = KeyOutcome::default();
        for shortcut in Shortcut::matching(event) {
            if shortcut.prevents_default() {
                outcome.default_prevented = true;
            }
            match shortcut {
                Shortcut::CheckFocused => {
                    if let Some(button) = self.enhancer.focused_check_button(&self.dom) {
                        self.dispatch_click(&button);
                    }
                }
                Shortcut::CheckAll => {
                    let button = self.enhancer.toolbar().check_all.clone();
                    self.dispatch_click(&button);
                }
            }
        }
        self.checkpoint();
        outcome
    }

    /// Moves the virtual clock forward, running timers that fall due on the way.
    pub fn advance_time(&mut self, delta: Duration) {
        let target = self.scheduler.now() + delta;
        while let Some(task) = self.scheduler.pop_due(target) {
            self.run_task(task);
            self.checkpoint();
        }
        self.scheduler.advance_to(target);
    }

    /// Runs every pending timer.
    pub fn flush_timers(&mut self) {
        if let Some(horizon) = self.scheduler.horizon() {
            let now = self.scheduler.now();
            self.advance_time(horizon.saturating_sub(now));
        }
    }

    fn dispatch_click(&mut self, target: &NodeRef) {
        let path: Vec<NodeRef> = target.inclusive_ancestors().collect();
        for node in &path {
            // Inline handlers were registered by the page's markup, before any listener.
            if let Some(ordinal) = quiz::inline_check_target(node) {
                if let Err(err) = self.checker.check_answer(&mut self.dom, ordinal) {
                    tracing::warn!(ordinal = ordinal.get(), error = %err, "uncaught error in page checker");
                }
            }
            for listener in self.listeners.on(node) {
                self.run_listener(listener);
            }
        }
    }

    fn run_listener(&mut self, listener: Listener) {
        match listener {
            Listener::JumpTo(ordinal) => self.enhancer.jump_to(&mut self.dom, ordinal),
            Listener::ToggleCollapse(ordinal) => {
                self.enhancer.toggle_collapse(&mut self.dom, ordinal);
            }
            Listener::CheckAll => {
                let outcome = self.enhancer.check_all(&mut self.dom, &mut self.checker);
                tracing::debug!(
                    checked = outcome.checked,
                    failed = outcome.failed.len(),
                    "checked all questions"
                );
            }
            Listener::Reset => {
                self.enhancer.reset(&mut self.dom);
            }
            Listener::RevealAfterCheck(ordinal) => self.schedule_reveal(ordinal),
            Listener::ToggleTheme => {
                if let Some(theme) = &self.theme {
                    theme.toggle(&mut self.dom);
                }
            }
        }
    }

    fn schedule_reveal(&mut self, ordinal: Ordinal) {
        let delay = self.enhancer.check_delay();
        self.scheduler.schedule(delay, Task::RevealFeedback(ordinal));
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::RevealFeedback(ordinal) => {
                self.enhancer.reveal_feedback(&mut self.dom, ordinal);
            }
        }
    }

    fn checkpoint(&mut self) {
        for _ in 0..MAX_CHECKPOINT_ROUNDS {
            let batches = self.dom.take_feedback_batches();
            if batches.is_empty() {
                return;
            }
            for batch in &batches {
                self.enhancer.feedback_changed(&mut self.dom, batch);
            }
        }
        tracing::warn!("feedback changes kept arriving; deferring the rest");
    }
}
