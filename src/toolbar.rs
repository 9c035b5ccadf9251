use anyhow::Context as _;
use kuchiki::NodeRef;
use maud::{Markup, html};

use crate::config::Labels;
use crate::dom::{self, Dom};
use crate::quiz::Ordinal;

pub const TOOLBAR_ID: &str = "kc-toolbar";
pub const QUICK_NAV_CLASS: &str = "kq";
pub const DONE_CLASS: &str = "done";
pub const COLLAPSED_CLASS: &str = "collapsed";
pub const CHECK_MARKER_CLASS: &str = "kc-check-btn";

/// Handles into the injected toolbar.
#[derive(Clone)]
pub struct Toolbar {
    pub root: NodeRef,
    pub fill: NodeRef,
    pub check_all: NodeRef,
    pub reset: NodeRef,
    pub quicklist: NodeRef,
}

impl Toolbar {
    pub fn build(labels: &Labels) -> anyhow::Result<Self> {
        let root = dom::fragment(toolbar_markup(labels)).context("build toolbar")?;
        let find = |selector: &str| {
            dom::query(&root, selector).with_context(|| format!("toolbar is missing {selector}"))
        };
        Ok(Self {
            fill: find("#kc-progress > i")?,
            check_all: find("#kc-checkall")?,
            reset: find("#kc-reset")?,
            quicklist: find("#kc-quicklist")?,
            root: root.clone(),
        })
    }

    /// Appends the toolbar to `<body>`, or to the document when there is none.
    pub fn mount(&self, dom: &mut Dom) {
        let parent = dom.body().unwrap_or_else(|| dom.document().clone());
        dom.append(&parent, &self.root);
    }
}

fn toolbar_markup(labels: &Labels) -> Markup {
    html! {
        aside id=(TOOLBAR_ID) {
            h4 { (labels.toolbar_title) }
            div id="kc-progress" { i {} }
            div class="kc-actions" {
                button type="button" id="kc-checkall" title=(labels.check_all_hint) { (labels.check_all) }
                button type="button" id="kc-reset" title=(labels.reset_hint) { (labels.reset) }
            }
            div id="kc-quicklist" {}
        }
    }
}

pub fn quick_nav_marker(ordinal: Ordinal) -> anyhow::Result<NodeRef> {
    dom::fragment(html! {
        div class=(QUICK_NAV_CLASS) data-ordinal=(ordinal.get()) { (ordinal.get()) }
    })
}

pub fn collapse_button(labels: &Labels) -> anyhow::Result<NodeRef> {
    dom::fragment(html! {
        button type="button" class="kc-collapse" { (labels.hide) }
    })
}

pub fn controls_container() -> anyhow::Result<NodeRef> {
    dom::fragment(html! {
        div class="controls" {}
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toolbar_has_all_parts() {
        let toolbar = Toolbar::build(&Labels::default()).unwrap();
        assert_eq!(dom::attr(&toolbar.root, "id").as_deref(), Some(TOOLBAR_ID));
        assert_eq!(dom::text(&toolbar.check_all), "Tümünü Kontrol Et");
        assert_eq!(dom::text(&toolbar.reset), "Temizle");
        assert!(toolbar.quicklist.children().next().is_none());
        assert!(toolbar.fill.parent().is_some());
    }

    #[test]
    fn mount_appends_to_body() {
        let mut page = Dom::parse("<p>quiz</p>");
        let toolbar = Toolbar::build(&Labels::default()).unwrap();
        toolbar.mount(&mut page);
        assert!(page.by_id(TOOLBAR_ID).is_some());
        assert!(toolbar.root.parent() == page.body());
    }
}
