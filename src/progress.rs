//! Completion progress derived from the feedback containers.
//!
//! Two measures are kept apart on purpose. The percentage counts `.feedback` containers that
//! hold text and are not marked `error`. A quick-nav marker is `done` when its container merely
//! carries the `feedback` class, so an erroneous answer still marks its question as visited.

use kuchiki::NodeRef;

use crate::dom::{self, Dom};
use crate::quiz::{ERROR_CLASS, FEEDBACK_CLASS, QuestionMap};
use crate::toolbar::DONE_CLASS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub answered: usize,
    pub total: usize,
    pub percent: u32,
    /// Per ordinal, in order.
    pub done: Vec<bool>,
}

impl ProgressSnapshot {
    pub fn done_count(&self) -> usize {
        self.done.iter().filter(|d| **d).count()
    }
}

pub fn percent(answered: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (answered as f64 / total as f64 * 100.0).round() as u32
}

pub fn is_answered(node: &NodeRef) -> bool {
    !dom::text(node).trim().is_empty() && !dom::has_class(node, ERROR_CLASS)
}

pub fn measure(dom: &Dom, questions: &QuestionMap) -> ProgressSnapshot {
    let answered = dom
        .query_all(&format!(".{FEEDBACK_CLASS}"))
        .iter()
        .filter(|node| is_answered(node))
        .count();
    let total = questions.len();
    let done = questions
        .iter()
        .map(|q| {
            q.feedback
                .as_ref()
                .is_some_and(|f| dom::has_class(f, FEEDBACK_CLASS))
        })
        .collect();
    ProgressSnapshot {
        answered,
        total,
        percent: percent(answered, total),
        done,
    }
}

/// Writes a snapshot into the progress fill and the quick-nav markers.
pub fn render(dom: &mut Dom, snapshot: &ProgressSnapshot, fill: &NodeRef, markers: &[NodeRef]) {
    dom.set_style(fill, "width", &format!("{}%", snapshot.percent));
    for (marker, done) in markers.iter().zip(&snapshot.done) {
        if *done {
            dom.add_class(marker, DONE_CLASS);
        } else {
            dom.remove_class(marker, DONE_CLASS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_and_guards_zero() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(0, 3), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn errored_feedback_is_done_but_not_answered() {
        let dom = Dom::parse(
            r#"
            <div class="question"><div id="feedback1" class="feedback correct">Doğru</div></div>
            <div class="question"><div id="feedback2" class="feedback error">Yanlış</div></div>
            <div class="question"><div id="feedback3"></div></div>
            "#,
        );
        let questions = QuestionMap::scan(&dom);
        let snapshot = measure(&dom, &questions);
        assert_eq!(snapshot.answered, 1);
        assert_eq!(snapshot.percent, 33);
        assert_eq!(snapshot.done, vec![true, true, false]);
        assert_eq!(snapshot.done_count(), 2);
    }

    #[test]
    fn whitespace_only_text_is_not_an_answer() {
        let dom = Dom::parse(r#"<div class="question"><div id="feedback1" class="feedback">  </div></div>"#);
        let questions = QuestionMap::scan(&dom);
        let snapshot = measure(&dom, &questions);
        assert_eq!(snapshot.answered, 0);
        assert_eq!(snapshot.done, vec![true]);
    }
}
