//! DOM access for the enhancer.
//!
//! Reads are free functions over [`NodeRef`]. Writes go through [`Dom`] so that changes to
//! watched feedback elements reach the [`FeedbackBus`], and so that scrolling and focus, which
//! have no visual effect on an in-memory tree, are recorded as [`Effect`]s.

use anyhow::{Context as _, anyhow};
use kuchiki::NodeRef;
use kuchiki::traits::{NodeIterator as _, TendrilSink as _};
use maud::Markup;

use crate::feedback::{ChangeKind, FeedbackBatch, FeedbackBus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    Start,
    Center,
    End,
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

/// Viewport side effects that a browser would perform.
#[derive(Clone, PartialEq)]
pub enum Effect {
    ScrollIntoView {
        target: NodeRef,
        behavior: ScrollBehavior,
        block: ScrollBlock,
    },
    Focus(NodeRef),
}

impl Effect {
    pub fn target(&self) -> &NodeRef {
        match self {
            Effect::ScrollIntoView { target, .. } => target,
            Effect::Focus(target) => target,
        }
    }
}

pub struct Dom {
    document: NodeRef,
    feedback: FeedbackBus,
    effects: Vec<Effect>,
    focused: Option<NodeRef>,
}

impl Dom {
    pub fn parse(html: &str) -> Self {
        Self::from_document(kuchiki::parse_html().one(html))
    }

    pub fn from_document(document: NodeRef) -> Self {
        Self {
            document,
            feedback: FeedbackBus::default(),
            effects: Vec::new(),
            focused: None,
        }
    }

    pub fn document(&self) -> &NodeRef {
        &self.document
    }

    /// The `<html>` element.
    pub fn root(&self) -> Option<NodeRef> {
        query(&self.document, "html")
    }

    pub fn body(&self) -> Option<NodeRef> {
        query(&self.document, "body")
    }

    pub fn query(&self, selector: &str) -> Option<NodeRef> {
        query(&self.document, selector)
    }

    pub fn query_all(&self, selector: &str) -> Vec<NodeRef> {
        query_all(&self.document, selector)
    }

    /// Looks an element up by its `id` attribute without going through a selector, so any id
    /// string is accepted.
    pub fn by_id(&self, id: &str) -> Option<NodeRef> {
        self.document
            .descendants()
            .elements()
            .find(|el| el.attributes.borrow().get("id") == Some(id))
            .map(|el| el.as_node().clone())
    }

    pub fn focused(&self) -> Option<&NodeRef> {
        self.focused.as_ref()
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn set_text(&mut self, node: &NodeRef, text: &str) {
        let children: Vec<NodeRef> = node.children().collect();
        let removed = !children.is_empty();
        for child in children {
            child.detach();
        }
        if !text.is_empty() {
            node.append(NodeRef::new_text(text));
        }
        if removed || !text.is_empty() {
            self.feedback.publish(node, ChangeKind::ChildList);
        }
    }

    pub fn append(&mut self, parent: &NodeRef, child: &NodeRef) {
        parent.append(child.clone());
        self.feedback.publish(parent, ChangeKind::ChildList);
    }

    pub fn set_attr(&mut self, node: &NodeRef, name: &str, value: &str) {
        let Some(el) = node.as_element() else { return };
        el.attributes.borrow_mut().insert(name, value.to_string());
        self.feedback.publish(node, ChangeKind::Attributes);
    }

    pub fn remove_attr(&mut self, node: &NodeRef, name: &str) {
        let Some(el) = node.as_element() else { return };
        let removed = el.attributes.borrow_mut().remove(name);
        if removed.is_some() {
            self.feedback.publish(node, ChangeKind::Attributes);
        }
    }

    pub fn add_class(&mut self, node: &NodeRef, class: &str) {
        let mut list = classes(node);
        if !list.iter().any(|c| c == class) {
            list.push(class.to_string());
        }
        self.set_attr(node, "class", &list.join(" "));
    }

    pub fn remove_class(&mut self, node: &NodeRef, class: &str) {
        if node.as_element().is_none() {
            return;
        }
        let mut list = classes(node);
        list.retain(|c| c != class);
        self.set_attr(node, "class", &list.join(" "));
    }

    /// Returns whether the class is present afterwards.
    pub fn toggle_class(&mut self, node: &NodeRef, class: &str) -> bool {
        if has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            true
        }
    }

    /// Equivalent of assigning an empty `className`.
    pub fn clear_classes(&mut self, node: &NodeRef) {
        self.set_attr(node, "class", "");
    }

    /// Sets one inline style declaration, keeping the others.
    pub fn set_style(&mut self, node: &NodeRef, property: &str, value: &str) {
        let current = attr(node, "style").unwrap_or_default();
        let mut declarations: Vec<(String, String)> = current
            .split(';')
            .filter_map(|decl| {
                let (name, val) = decl.split_once(':')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some((name.to_string(), val.trim().to_string()))
            })
            .collect();
        match declarations
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
        {
            Some(decl) => decl.1 = value.to_string(),
            None => declarations.push((property.to_string(), value.to_string())),
        }
        let style = declarations
            .iter()
            .map(|(name, val)| format!("{name}: {val};"))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(node, "style", &style);
    }

    pub fn scroll_into_view(&mut self, node: &NodeRef, behavior: ScrollBehavior, block: ScrollBlock) {
        self.effects.push(Effect::ScrollIntoView {
            target: node.clone(),
            behavior,
            block,
        });
    }

    pub fn focus(&mut self, node: &NodeRef) {
        self.focused = Some(node.clone());
        self.effects.push(Effect::Focus(node.clone()));
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    pub fn watch_feedback(&mut self, node: &NodeRef) {
        self.feedback.watch(node);
    }

    pub fn watched_feedback(&self) -> usize {
        self.feedback.watched()
    }

    pub fn take_feedback_batches(&mut self) -> Vec<FeedbackBatch> {
        self.feedback.take_batches()
    }

    pub fn to_html(&self) -> anyhow::Result<String> {
        let mut out = Vec::new();
        self.document
            .serialize(&mut out)
            .context("serialize document")?;
        String::from_utf8(out).context("serialized document not utf-8")
    }
}

/// Parses rendered markup and returns its first element, detached and ready to insert.
pub fn fragment(markup: Markup) -> anyhow::Result<NodeRef> {
    let doc = kuchiki::parse_html().one(markup.into_string());
    let body = doc
        .select_first("body")
        .map_err(|()| anyhow!("parsed fragment has no body"))?;
    let node = body
        .as_node()
        .children()
        .find(|child| child.as_element().is_some())
        .context("markup produced no element")?;
    node.detach();
    Ok(node)
}

pub fn query(scope: &NodeRef, selector: &str) -> Option<NodeRef> {
    scope
        .select_first(selector)
        .ok()
        .map(|el| el.as_node().clone())
}

pub fn query_all(scope: &NodeRef, selector: &str) -> Vec<NodeRef> {
    match scope.select(selector) {
        Ok(nodes) => nodes.map(|el| el.as_node().clone()).collect(),
        Err(()) => {
            tracing::debug!(selector, "invalid selector");
            Vec::new()
        }
    }
}

pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    node.as_element()
        .and_then(|el| el.attributes.borrow().get(name).map(|v| v.to_string()))
}

pub fn text(node: &NodeRef) -> String {
    node.text_contents()
}

pub fn classes(node: &NodeRef) -> Vec<String> {
    attr(node, "class")
        .map(|v| v.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

pub fn has_class(node: &NodeRef, class: &str) -> bool {
    attr(node, "class")
        .map(|v| v.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

pub fn style(node: &NodeRef, property: &str) -> Option<String> {
    let style = attr(node, "style")?;
    style.split(';').find_map(|decl| {
        let (name, val) = decl.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case(property)
            .then(|| val.trim().to_string())
    })
}

/// Nearest inclusive ancestor that is one of `candidates`.
pub fn closest<'a>(node: &NodeRef, candidates: &'a [NodeRef]) -> Option<&'a NodeRef> {
    node.inclusive_ancestors()
        .find_map(|ancestor| candidates.iter().find(|c| **c == ancestor))
}
