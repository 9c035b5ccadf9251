use kuchiki::NodeRef;

use crate::dom::{self, Dom};
use crate::events::{Listener, Listeners};

pub const TOGGLE_SELECTOR: &str = ".theme-toggle";
pub const DARK_MODE_CLASS: &str = "dark-mode";
pub const ACTIVE_CLASS: &str = "active";

/// Dark-mode switch bound to the page's `.theme-toggle` button. The choice is not persisted.
pub struct ThemeToggle {
    button: NodeRef,
    root: NodeRef,
}

impl ThemeToggle {
    /// Binds the toggle, or does nothing when the page has no toggle button.
    pub fn attach(dom: &Dom, listeners: &mut Listeners) -> Option<Self> {
        let button = dom.query(TOGGLE_SELECTOR)?;
        let root = dom.root()?;
        listeners.add(button.clone(), Listener::ToggleTheme);
        Some(Self { button, root })
    }

    pub fn button(&self) -> &NodeRef {
        &self.button
    }

    /// Returns whether dark mode is on afterwards.
    pub fn toggle(&self, dom: &mut Dom) -> bool {
        let dark = dom.toggle_class(&self.root, DARK_MODE_CLASS);
        dom.toggle_class(&self.button, ACTIVE_CLASS);
        dark
    }

    pub fn is_dark(&self) -> bool {
        dom::has_class(&self.root, DARK_MODE_CLASS)
    }
}
