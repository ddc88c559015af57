use bitflags::bitflags;

use crate::render::error::RenderError;
use crate::render::tree::{NodeId, RenderTree};

bitflags! {
    #[derive(Default)]
    pub struct KeyModifiers: u8 {
        const SHIFT   = 0b0001;
        const CONTROL = 0b0010;
        const ALT     = 0b0100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
    Insert,
    F(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

/// Backend-neutral input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Paste(String),
}

impl InputEvent {
    pub fn key(code: KeyCode) -> Self {
        InputEvent::Key(KeyEvent { code, modifiers: KeyModifiers::empty() })
    }

    pub fn char(c: char) -> Self {
        Self::key(KeyCode::Char(c))
    }

    pub fn ctrl(c: char) -> Self {
        InputEvent::Key(KeyEvent { code: KeyCode::Char(c), modifiers: KeyModifiers::CONTROL })
    }

    /// Key code, if this is a key event.
    pub fn code(&self) -> Option<KeyCode> {
        match self {
            InputEvent::Key(key) => Some(key.code),
            InputEvent::Paste(_) => None,
        }
    }

    pub fn is_ctrl(&self, c: char) -> bool {
        matches!(self, InputEvent::Key(KeyEvent { code: KeyCode::Char(k), modifiers })
            if *k == c && modifiers.contains(KeyModifiers::CONTROL))
    }
}

/// Routes input through the render tree.
///
/// An event goes to the focused node first (the root when nothing has focus)
/// and bubbles along parent links until a widget consumes it. Only the
/// consuming node is marked dirty. The dispatcher never draws.
#[derive(Debug, Default)]
pub struct InputDispatcher {
    delivered: u64,
    consumed: u64,
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events delivered and events consumed so far.
    pub fn counts(&self) -> (u64, u64) {
        (self.delivered, self.consumed)
    }

    /// Deliver one event. Returns the node that consumed it.
    pub fn dispatch(&mut self, tree: &mut RenderTree, event: &InputEvent) -> Option<NodeId> {
        self.delivered += 1;
        let start = tree
            .focused()
            .filter(|id| tree.is_visible(*id))
            .unwrap_or_else(|| tree.root());

        let mut current = Some(start);
        while let Some(id) = current {
            let consumed = tree
                .widget_mut(id)
                .map(|widget| widget.handle_input(event))
                .unwrap_or(false);
            if consumed {
                self.consumed += 1;
                tree.mark_dirty(id);
                log::trace!("Input {:?} consumed by node {}", event, id);
                return Some(id);
            }
            current = tree.parent(id);
        }
        None
    }

    /// Move focus to `id`. Old and new focus are redrawn.
    pub fn set_focus(&mut self, tree: &mut RenderTree, id: Option<NodeId>) -> Result<(), RenderError> {
        if let Some(id) = id {
            if !tree.contains(id) {
                return Err(RenderError::UnknownNode(id.index()));
            }
        }
        let previous = tree.focused();
        if previous == id {
            return Ok(());
        }
        tree.set_focused(id);
        for node in [previous, id].into_iter().flatten() {
            tree.mark_dirty(node);
        }
        Ok(())
    }

    /// Focus the next focusable node in paint order, wrapping around.
    pub fn focus_next(&mut self, tree: &mut RenderTree) -> Option<NodeId> {
        self.cycle_focus(tree, true)
    }

    pub fn focus_prev(&mut self, tree: &mut RenderTree) -> Option<NodeId> {
        self.cycle_focus(tree, false)
    }

    fn cycle_focus(&mut self, tree: &mut RenderTree, forward: bool) -> Option<NodeId> {
        let candidates = tree.focusable_nodes();
        if candidates.is_empty() {
            return None;
        }
        let position = tree.focused().and_then(|f| candidates.iter().position(|c| *c == f));
        let next = match (position, forward) {
            (None, true) => 0,
            (None, false) => candidates.len() - 1,
            (Some(i), true) => (i + 1) % candidates.len(),
            (Some(i), false) => (i + candidates.len() - 1) % candidates.len(),
        };
        let target = candidates[next];
        // candidates come from the tree, so this cannot fail
        let _ = self.set_focus(tree, Some(target));
        Some(target)
    }
}
