use std::fmt;
use std::num::NonZeroUsize;
use std::sync::LazyLock;

use kuchiki::NodeRef;

use crate::dom::{self, Dom};

pub const QUESTION_SELECTOR: &str = ".question";
pub const TITLE_SELECTOR: &str = "p";
pub const INPUT_SELECTOR: &str = r#"textarea, input[type="radio"]"#;
pub const ANSWER_AREA_SELECTOR: &str = "textarea, .multiple-choice";
pub const CHECK_BUTTON_SELECTOR: &str = r#"button[onclick^="checkAnswer"]"#;
pub const CONTROLS_SELECTOR: &str = ".controls";
pub const FEEDBACK_ID_PREFIX: &str = "feedback";
pub const FEEDBACK_CONTAINER_SELECTOR: &str = r#"[id^="feedback"]"#;
pub const FEEDBACK_CLASS: &str = "feedback";
pub const ERROR_CLASS: &str = "error";

static INLINE_CHECK: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^\s*checkAnswer\s*\(\s*(\d+)\s*\)").expect("inline handler regex")
});

/// 1-based position of a question block in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ordinal(NonZeroUsize);

impl Ordinal {
    pub fn new(n: usize) -> Option<Self> {
        NonZeroUsize::new(n).map(Self)
    }

    pub fn from_index(index: usize) -> Self {
        Self(NonZeroUsize::MIN.saturating_add(index))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }

    pub fn index(self) -> usize {
        self.0.get() - 1
    }

    /// Id of the feedback container the host page gives this question.
    pub fn feedback_id(self) -> String {
        format!("{FEEDBACK_ID_PREFIX}{}", self.0)
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone)]
pub struct CheckButton {
    pub node: NodeRef,
    /// Ordinal parsed from the inline `checkAnswer(<n>)` handler.
    pub target: Option<Ordinal>,
}

#[derive(Clone)]
pub struct QuestionHandles {
    pub ordinal: Ordinal,
    pub block: NodeRef,
    pub title: Option<NodeRef>,
    pub input: Option<NodeRef>,
    pub answer_area: Option<NodeRef>,
    pub check_button: Option<CheckButton>,
    /// `#feedback<N>`, looked up page-wide.
    pub feedback: Option<NodeRef>,
    /// First feedback container inside the block, scrolled to after a check.
    pub reveal_target: Option<NodeRef>,
}

#[derive(Default)]
pub struct QuestionMap {
    questions: Vec<QuestionHandles>,
    blocks: Vec<NodeRef>,
}

impl QuestionMap {
    pub fn scan(dom: &Dom) -> Self {
        let blocks = dom.query_all(QUESTION_SELECTOR);
        let questions = blocks
            .iter()
            .enumerate()
            .map(|(index, block)| {
                let ordinal = Ordinal::from_index(index);
                QuestionHandles {
                    ordinal,
                    block: block.clone(),
                    title: dom::query(block, TITLE_SELECTOR),
                    input: dom::query(block, INPUT_SELECTOR),
                    answer_area: dom::query(block, ANSWER_AREA_SELECTOR),
                    check_button: dom::query(block, CHECK_BUTTON_SELECTOR).map(|node| CheckButton {
                        target: inline_check_target(&node),
                        node,
                    }),
                    feedback: dom.by_id(&ordinal.feedback_id()),
                    reveal_target: dom::query(block, FEEDBACK_CONTAINER_SELECTOR),
                }
            })
            .collect();
        Self { questions, blocks }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, ordinal: Ordinal) -> Option<&QuestionHandles> {
        self.questions.get(ordinal.index())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuestionHandles> {
        self.questions.iter()
    }

    pub fn ordinals(&self) -> impl Iterator<Item = Ordinal> + '_ {
        self.questions.iter().map(|q| q.ordinal)
    }

    /// Question whose block is the nearest question ancestor of `node`.
    pub fn containing(&self, node: &NodeRef) -> Option<&QuestionHandles> {
        let block = dom::closest(node, &self.blocks)?;
        self.questions.iter().find(|q| q.block == *block)
    }
}

/// Parses an inline `onclick="checkAnswer(<n>)"` handler.
pub fn inline_check_target(node: &NodeRef) -> Option<Ordinal> {
    let onclick = dom::attr(node, "onclick")?;
    let caps = INLINE_CHECK.captures(&onclick)?;
    caps.get(1)?.as_str().parse().ok().and_then(Ordinal::new)
}
