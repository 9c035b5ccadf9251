//! Change notifications for feedback elements.
//!
//! The host page writes answer feedback into `#feedback<N>` containers. Writes made through
//! [`crate::dom::Dom`] to a watched container are queued here and handed to a
//! [`FeedbackSubscriber`] at the next checkpoint, one batch per container.

use kuchiki::NodeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Children were added or removed (text replaced).
    ChildList,
    /// An attribute, usually `class`, was written.
    Attributes,
}

#[derive(Clone)]
pub struct FeedbackBatch {
    pub target: NodeRef,
    pub kinds: Vec<ChangeKind>,
}

pub trait FeedbackSubscriber {
    fn feedback_changed(&self, dom: &mut crate::dom::Dom, batch: &FeedbackBatch);
}

#[derive(Default)]
pub struct FeedbackBus {
    watched: Vec<NodeRef>,
    pending: Vec<FeedbackBatch>,
}

impl FeedbackBus {
    pub fn watch(&mut self, node: &NodeRef) {
        if !self.is_watched(node) {
            self.watched.push(node.clone());
        }
    }

    pub fn is_watched(&self, node: &NodeRef) -> bool {
        self.watched.iter().any(|w| w == node)
    }

    pub fn watched(&self) -> usize {
        self.watched.len()
    }

    pub fn publish(&mut self, node: &NodeRef, kind: ChangeKind) {
        if !self.is_watched(node) {
            return;
        }
        match self.pending.iter_mut().find(|b| b.target == *node) {
            Some(batch) => batch.kinds.push(kind),
            None => self.pending.push(FeedbackBatch {
                target: node.clone(),
                kinds: vec![kind],
            }),
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn take_batches(&mut self) -> Vec<FeedbackBatch> {
        std::mem::take(&mut self.pending)
    }
}
