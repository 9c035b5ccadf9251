use kuchiki::NodeRef;

use crate::quiz::Ordinal;

/// Behavior bound to an element's click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listener {
    JumpTo(Ordinal),
    ToggleCollapse(Ordinal),
    CheckAll,
    Reset,
    /// Reveal the question's feedback once the checker had time to fill it.
    RevealAfterCheck(Ordinal),
    ToggleTheme,
}

#[derive(Default)]
pub struct Listeners {
    bindings: Vec<(NodeRef, Listener)>,
}

impl Listeners {
    pub fn add(&mut self, node: NodeRef, listener: Listener) {
        self.bindings.push((node, listener));
    }

    /// Listeners registered on `node`, in registration order.
    pub fn on(&self, node: &NodeRef) -> Vec<Listener> {
        self.bindings
            .iter()
            .filter(|(bound, _)| bound == node)
            .map(|(_, listener)| *listener)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    pub default_prevented: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Ctrl+Enter: click the check button of the question holding focus.
    CheckFocused,
    /// Alt+A: check every question.
    CheckAll,
}

impl Shortcut {
    /// Every shortcut the event triggers. The combinations are tested independently.
    pub fn matching(event: &KeyEvent) -> Vec<Shortcut> {
        let mut hits = Vec::new();
        if event.ctrl && event.key == "Enter" {
            hits.push(Shortcut::CheckFocused);
        }
        if event.alt && event.key.eq_ignore_ascii_case("a") {
            hits.push(Shortcut::CheckAll);
        }
        hits
    }

    pub fn prevents_default(self) -> bool {
        matches!(self, Shortcut::CheckAll)
    }
}
