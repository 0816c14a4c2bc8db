//! The single interaction-state object: which widget is hovered, which is
//! held down, which window owns the active tool, and which widget is
//! receiving text input. Passed by reference into dispatch rather than
//! living in a global, so it can be exercised in isolation.
//!
//! Writers treat every `set_*` as last-writer-wins; there is exactly one
//! pointer/keyboard source per frame and no rollback.

use log::debug;

use crate::gfx::ToolId;
use crate::widget::WidgetIndex;
use crate::window::WindowIdentity;

/// A (window identity, widget index) pair — the only widget reference
/// that is safe to hold across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetRef {
    pub window: WindowIdentity,
    pub widget: WidgetIndex,
}

impl WidgetRef {
    pub const fn new(window: WindowIdentity, widget: WidgetIndex) -> Self {
        Self { window, widget }
    }
}

/// The exclusive pointer claim of one window/widget pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolTarget {
    pub owner: WidgetRef,
    pub tool: ToolId,
}

/// An in-progress text edit. Abandoned, never committed, if its owner
/// disappears.
#[derive(Debug, Clone)]
pub struct TextEdit {
    pub owner: WidgetRef,
    pub buffer: String,
    /// Caret position in bytes (always on a char boundary).
    pub cursor: usize,
    pub max_len: usize,
}

impl TextEdit {
    pub fn insert(&mut self, ch: char) {
        if self.buffer.chars().count() >= self.max_len {
            return;
        }
        self.buffer.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.buffer[..self.cursor].chars().next_back() {
            self.cursor -= prev.len_utf8();
            self.buffer.remove(self.cursor);
        }
    }

    pub fn move_cursor(&mut self, delta: i32) {
        if delta < 0 {
            if let Some(prev) = self.buffer[..self.cursor].chars().next_back() {
                self.cursor -= prev.len_utf8();
            }
        } else if let Some(next) = self.buffer[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }
}

/// Global interaction state. One instance per toolkit, owned by the
/// embedding application and lent to every dispatch call.
#[derive(Debug, Default)]
pub struct InteractionState {
    hover: Option<WidgetRef>,
    held: Option<WidgetRef>,
    tool: Option<ToolTarget>,
    edit: Option<TextEdit>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    // -- hover --------------------------------------------------------

    pub fn hover(&self) -> Option<WidgetRef> {
        self.hover
    }

    pub fn set_hover(&mut self, target: WidgetRef) {
        self.hover = Some(target);
    }

    pub fn clear_hover(&mut self) {
        self.hover = None;
    }

    pub fn hover_matches(&self, window: WindowIdentity, widget: WidgetIndex) -> bool {
        self.hover == Some(WidgetRef::new(window, widget))
    }

    // -- held ---------------------------------------------------------

    pub fn held(&self) -> Option<WidgetRef> {
        self.held
    }

    pub fn set_held(&mut self, target: WidgetRef) {
        self.held = Some(target);
    }

    pub fn clear_held(&mut self) {
        self.held = None;
    }

    pub fn held_matches(&self, window: WindowIdentity, widget: WidgetIndex) -> bool {
        self.held == Some(WidgetRef::new(window, widget))
    }

    // -- tool ---------------------------------------------------------

    pub fn tool(&self) -> Option<ToolTarget> {
        self.tool
    }

    /// Claim the pointer for `owner`. Claiming the pair that already owns
    /// the tool releases it instead and reports not-accepted — toggle-style
    /// tool buttons detect "click to cancel" through this.
    pub fn set_tool(&mut self, owner: WidgetRef, tool: ToolId) -> bool {
        if self.tool.is_some_and(|t| t.owner == owner) {
            self.tool = None;
            return false;
        }
        self.tool = Some(ToolTarget { owner, tool });
        true
    }

    /// Release the active tool, returning the cancelled target so the
    /// caller can notify its owner.
    pub fn cancel_tool(&mut self) -> Option<ToolTarget> {
        self.tool.take()
    }

    pub fn tool_matches(&self, window: WindowIdentity, widget: WidgetIndex) -> bool {
        self.tool
            .is_some_and(|t| t.owner == WidgetRef::new(window, widget))
    }

    // -- text edit ----------------------------------------------------

    pub fn edit(&self) -> Option<&TextEdit> {
        self.edit.as_ref()
    }

    pub fn edit_mut(&mut self) -> Option<&mut TextEdit> {
        self.edit.as_mut()
    }

    pub fn begin_text_edit(&mut self, owner: WidgetRef, initial: &str, max_len: usize) {
        let buffer: String = initial.chars().take(max_len).collect();
        let cursor = buffer.len();
        self.edit = Some(TextEdit {
            owner,
            buffer,
            cursor,
            max_len,
        });
    }

    pub fn end_text_edit(&mut self) -> Option<TextEdit> {
        self.edit.take()
    }

    pub fn edit_matches(&self, window: WindowIdentity, widget: WidgetIndex) -> bool {
        self.edit
            .as_ref()
            .is_some_and(|e| e.owner == WidgetRef::new(window, widget))
    }

    // -- lifecycle ----------------------------------------------------

    /// Drop every target owned by a closing window. Returns the tool
    /// target if one was cancelled, so the close path can dispatch the
    /// abort notification.
    pub fn window_closed(&mut self, window: WindowIdentity) -> Option<ToolTarget> {
        if self.hover.is_some_and(|h| h.window == window) {
            self.hover = None;
        }
        if self.held.is_some_and(|h| h.window == window) {
            self.held = None;
        }
        if self.edit.as_ref().is_some_and(|e| e.owner.window == window) {
            debug!("abandoning text edit: owner window closed");
            self.edit = None;
        }
        if self.tool.is_some_and(|t| t.owner.window == window) {
            return self.tool.take();
        }
        None
    }
}
