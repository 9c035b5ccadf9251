//! Toolbar, quick navigation, collapse toggles and bulk actions for a quiz page.

use std::time::Duration;

use kuchiki::NodeRef;

use crate::checker::AnswerChecker;
use crate::config::{EnhancerOptions, Labels};
use crate::dom::{self, Dom, ScrollBehavior, ScrollBlock};
use crate::events::{Listener, Listeners};
use crate::feedback::{FeedbackBatch, FeedbackSubscriber};
use crate::progress::{self, ProgressSnapshot};
use crate::quiz::{CONTROLS_SELECTOR, FEEDBACK_CONTAINER_SELECTOR, Ordinal, QuestionHandles, QuestionMap};
use crate::toolbar::{self, CHECK_MARKER_CLASS, COLLAPSED_CLASS, Toolbar};

const COLLAPSED_OPACITY: &str = "0.55";
const EXPANDED_OPACITY: &str = "1";

/// Elements the enhancer added to one question.
#[derive(Clone)]
struct QuestionWidgets {
    marker: NodeRef,
    collapse: Option<NodeRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckAllOutcome {
    pub checked: usize,
    pub failed: Vec<Ordinal>,
}

pub struct QuizPageEnhancer {
    options: EnhancerOptions,
    toolbar: Toolbar,
    questions: QuestionMap,
    widgets: Vec<QuestionWidgets>,
    markers: Vec<NodeRef>,
}

impl QuizPageEnhancer {
    /// Augments the page and binds click behavior into `listeners`.
    ///
    /// Elements a question lacks (title, check button, controls, input) only disable the
    /// matching feature. Errors come from building the enhancer's own markup.
    pub fn attach(
        dom: &mut Dom,
        options: EnhancerOptions,
        listeners: &mut Listeners,
    ) -> anyhow::Result<Self> {
        let toolbar = Toolbar::build(&options.labels)?;
        toolbar.mount(dom);
        listeners.add(toolbar.check_all.clone(), Listener::CheckAll);
        listeners.add(toolbar.reset.clone(), Listener::Reset);

        let questions = QuestionMap::scan(dom);
        let mut widgets = Vec::with_capacity(questions.len());
        for question in questions.iter() {
            let marker = toolbar::quick_nav_marker(question.ordinal)?;
            dom.append(&toolbar.quicklist, &marker);
            listeners.add(marker.clone(), Listener::JumpTo(question.ordinal));

            let collapse = match question.title {
                Some(_) => {
                    let button = toolbar::collapse_button(&options.labels)?;
                    let controls = ensure_controls(dom, question)?;
                    dom.append(&controls, &button);
                    listeners.add(button.clone(), Listener::ToggleCollapse(question.ordinal));
                    Some(button)
                }
                None => None,
            };

            // Marked whether or not the block has a title: a title-less question still
            // gets the tooltip and the delayed reveal.
            if let Some(check) = &question.check_button {
                dom.set_attr(&check.node, "title", &options.labels.check_hint);
                dom.add_class(&check.node, CHECK_MARKER_CLASS);
                listeners.add(check.node.clone(), Listener::RevealAfterCheck(question.ordinal));
            }

            widgets.push(QuestionWidgets { marker, collapse });
        }

        for container in dom.query_all(FEEDBACK_CONTAINER_SELECTOR) {
            dom.watch_feedback(&container);
        }

        label_answer_fields(dom, &options.labels);

        let markers = widgets.iter().map(|w| w.marker.clone()).collect();
        let enhancer = Self {
            options,
            toolbar,
            questions,
            widgets,
            markers,
        };
        let snapshot = enhancer.update_progress(dom);
        tracing::debug!(
            questions = enhancer.total(),
            watched = dom.watched_feedback(),
            percent = snapshot.percent,
            "quiz page enhanced"
        );
        Ok(enhancer)
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn questions(&self) -> &QuestionMap {
        &self.questions
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn options(&self) -> &EnhancerOptions {
        &self.options
    }

    pub fn check_delay(&self) -> Duration {
        self.options.check_delay()
    }

    pub fn quick_nav_marker(&self, ordinal: Ordinal) -> Option<&NodeRef> {
        self.widgets.get(ordinal.index()).map(|w| &w.marker)
    }

    pub fn collapse_button(&self, ordinal: Ordinal) -> Option<&NodeRef> {
        self.widgets.get(ordinal.index())?.collapse.as_ref()
    }

    pub fn measure(&self, dom: &Dom) -> ProgressSnapshot {
        progress::measure(dom, &self.questions)
    }

    pub fn update_progress(&self, dom: &mut Dom) -> ProgressSnapshot {
        let snapshot = self.measure(dom);
        progress::render(dom, &snapshot, &self.toolbar.fill, &self.markers);
        snapshot
    }

    /// Runs the checker for every ordinal in ascending order. A failing ordinal does not stop
    /// the others. Progress is refreshed once, after the last call.
    pub fn check_all<C>(&self, dom: &mut Dom, checker: &mut C) -> CheckAllOutcome
    where
        C: AnswerChecker + ?Sized,
    {
        let mut outcome = CheckAllOutcome::default();
        for ordinal in self.questions.ordinals() {
            outcome.checked += 1;
            if let Err(err) = checker.check_answer(dom, ordinal) {
                tracing::debug!(ordinal = ordinal.get(), error = %err, "answer check failed");
                outcome.failed.push(ordinal);
            }
        }
        self.update_progress(dom);
        outcome
    }

    /// Clears text and classes of every `#feedback<N>`.
    pub fn reset(&self, dom: &mut Dom) -> ProgressSnapshot {
        for question in self.questions.iter() {
            if let Some(feedback) = &question.feedback {
                dom.set_text(feedback, "");
                dom.clear_classes(feedback);
            }
        }
        self.update_progress(dom)
    }

    pub fn jump_to(&self, dom: &mut Dom, ordinal: Ordinal) {
        let Some(question) = self.questions.get(ordinal) else { return };
        dom.scroll_into_view(&question.block, ScrollBehavior::Smooth, ScrollBlock::Center);
        if let Some(input) = &question.input {
            dom.focus(input);
        }
    }

    /// Flips the collapsed look of a question. Returns the new state, or `None` when the
    /// question has no toggle.
    pub fn toggle_collapse(&self, dom: &mut Dom, ordinal: Ordinal) -> Option<bool> {
        let question = self.questions.get(ordinal)?;
        let button = self.collapse_button(ordinal)?;
        let collapsed = dom.toggle_class(&question.block, COLLAPSED_CLASS);
        let labels = &self.options.labels;
        if collapsed {
            dom.set_style(&question.block, "opacity", COLLAPSED_OPACITY);
            dom.set_text(button, &labels.show);
        } else {
            dom.set_style(&question.block, "opacity", EXPANDED_OPACITY);
            dom.set_text(button, &labels.hide);
        }
        Some(collapsed)
    }

    pub fn is_collapsed(&self, ordinal: Ordinal) -> bool {
        self.questions
            .get(ordinal)
            .is_some_and(|q| dom::has_class(&q.block, COLLAPSED_CLASS))
    }

    /// Deferred half of a per-question check: bring the feedback into view, then refresh.
    pub fn reveal_feedback(&self, dom: &mut Dom, ordinal: Ordinal) -> ProgressSnapshot {
        if let Some(target) = self.questions.get(ordinal).and_then(|q| q.reveal_target.as_ref()) {
            dom.scroll_into_view(target, ScrollBehavior::Smooth, ScrollBlock::Center);
        }
        self.update_progress(dom)
    }

    /// Check button of the question that holds focus.
    pub fn focused_check_button(&self, dom: &Dom) -> Option<NodeRef> {
        let focused = dom.focused()?;
        let question = self.questions.containing(focused)?;
        question.check_button.as_ref().map(|b| b.node.clone())
    }
}

impl FeedbackSubscriber for QuizPageEnhancer {
    fn feedback_changed(&self, dom: &mut Dom, batch: &FeedbackBatch) {
        tracing::trace!(
            target_id = dom::attr(&batch.target, "id").unwrap_or_default(),
            changes = batch.kinds.len(),
            "feedback changed"
        );
        self.update_progress(dom);
    }
}

/// The question's `.controls` container, created next to the answer area when missing.
fn ensure_controls(dom: &mut Dom, question: &QuestionHandles) -> anyhow::Result<NodeRef> {
    if let Some(existing) = dom::query(&question.block, CONTROLS_SELECTOR) {
        return Ok(existing);
    }
    let controls = toolbar::controls_container()?;
    let parent = question
        .answer_area
        .as_ref()
        .and_then(|area| area.parent())
        .unwrap_or_else(|| question.block.clone());
    dom.append(&parent, &controls);
    Ok(controls)
}

fn label_answer_fields(dom: &mut Dom, labels: &Labels) {
    for (index, area) in dom.query_all("textarea").iter().enumerate() {
        let number = index + 1;
        if dom::attr(area, "id").is_none_or(|id| id.is_empty()) {
            dom.set_attr(area, "id", &format!("text-enh-{number}"));
        }
        dom.set_attr(area, "aria-label", &format!("{} {number}", labels.answer_field));
    }
}
