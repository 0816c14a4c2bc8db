//! Per-window-class event handler tables.
//!
//! Every window binds exactly one [`WindowEvents`] table at creation.
//! Every method defaults to a no-op, so a class implements only the
//! events it cares about — an absent handler slot is never an error.
//!
//! Structural changes requested while a handler runs (opening or closing
//! windows, invalidating other classes) are queued on the [`EventCtx`]
//! and applied by the shell once the current dispatch pass completes, so
//! the z-order is never spliced under an iterator.

use smallvec::SmallVec;

use crate::colour::ShadeTable;
use crate::geometry::{Rect, Size};
use crate::gfx::{CursorId, Gfx, StringId};
use crate::interaction::InteractionState;
use crate::widget::WidgetIndex;
use crate::window::{Window, WindowClass, WindowDesc, WindowIdentity};

/// Structural mutation queued during dispatch.
pub enum ShellRequest {
    Open(Box<WindowDesc>),
    Close(WindowIdentity),
    CloseClass(WindowClass),
    Invalidate(WindowIdentity),
    InvalidateClass(WindowClass),
    /// Arbitrary deferred operation against the shell (dropdown opens,
    /// tool claims spanning several windows, ...).
    Action(Box<dyn FnOnce(&mut crate::shell::Shell, &mut InteractionState)>),
}

pub(crate) type RequestQueue = SmallVec<[ShellRequest; 4]>;

/// Handler call context: the dispatched-to window, the interaction
/// state, and the deferred-request queue.
pub struct EventCtx<'a> {
    pub window: &'a mut Window,
    pub interaction: &'a mut InteractionState,
    pub screen: Size,
    /// Frame counter, advanced once per shell update.
    pub frame: u64,
    /// Shade table in effect for this pass (draw collaborator data).
    pub shades: &'a ShadeTable,
    pub(crate) requests: &'a mut RequestQueue,
}

impl EventCtx<'_> {
    /// Queue a window to open after this dispatch pass.
    pub fn open(&mut self, desc: WindowDesc) {
        self.requests.push(ShellRequest::Open(Box::new(desc)));
    }

    /// Queue a window close after this dispatch pass.
    pub fn close(&mut self, identity: WindowIdentity) {
        self.requests.push(ShellRequest::Close(identity));
    }

    /// Queue this window's own close.
    pub fn close_self(&mut self) {
        self.close(self.window.identity());
    }

    pub fn close_class(&mut self, class: WindowClass) {
        self.requests.push(ShellRequest::CloseClass(class));
    }

    /// Queue an invalidate for windows of another class.
    pub fn invalidate_class(&mut self, class: WindowClass) {
        self.requests.push(ShellRequest::InvalidateClass(class));
    }

    /// Queue an arbitrary shell operation for after this dispatch pass.
    pub fn defer(
        &mut self,
        action: impl FnOnce(&mut crate::shell::Shell, &mut InteractionState) + 'static,
    ) {
        self.requests.push(ShellRequest::Action(Box::new(action)));
    }
}

/// One method per event kind, dispatched by the shell and the input
/// router. Defaults are no-ops except `tooltip` (falls back to the
/// widget's own tooltip string) and `on_paint` (standard widget pass).
pub trait WindowEvents {
    fn on_close(&self, _ctx: &mut EventCtx) {}

    fn on_mouse_up(&self, _ctx: &mut EventCtx, _widget: WidgetIndex) {}

    fn on_resize(&self, _ctx: &mut EventCtx) {}

    fn on_mouse_down(&self, _ctx: &mut EventCtx, _widget: WidgetIndex) {}

    /// A dropdown owned by this window resolved. `item` is `None` when
    /// the dropdown closed without a selection.
    fn on_dropdown(&self, _ctx: &mut EventCtx, _widget: WidgetIndex, _item: Option<usize>) {}

    fn on_periodic_a(&self, _ctx: &mut EventCtx) {}

    /// Once per frame.
    fn on_update(&self, _ctx: &mut EventCtx) {}

    fn on_periodic_b(&self, _ctx: &mut EventCtx) {}

    fn on_periodic_c(&self, _ctx: &mut EventCtx) {}

    fn on_tool_update(&self, _ctx: &mut EventCtx, _widget: WidgetIndex, _x: i32, _y: i32) {}

    fn on_tool_down(&self, _ctx: &mut EventCtx, _widget: WidgetIndex, _x: i32, _y: i32) {}

    fn on_tool_drag(&self, _ctx: &mut EventCtx, _widget: WidgetIndex, _x: i32, _y: i32) {}

    fn on_tool_up(&self, _ctx: &mut EventCtx, _widget: WidgetIndex, _x: i32, _y: i32) {}

    /// The tool this window held was cancelled (explicitly or because
    /// the window is closing).
    fn on_tool_abort(&self, _ctx: &mut EventCtx, _widget: WidgetIndex) {}

    fn on_periodic_d(&self, _ctx: &mut EventCtx) {}

    /// Content extent of a scroll region. Feeds thumb geometry; a stale
    /// answer leaves stale thumbs.
    fn scroll_content_size(&self, _ctx: &mut EventCtx, _scroll: usize) -> Size {
        Size::default()
    }

    /// Press inside a scroll view, in content coordinates.
    fn on_scroll_mouse_down(&self, _ctx: &mut EventCtx, _scroll: usize, _x: i32, _y: i32) {}

    fn on_scroll_mouse_drag(&self, _ctx: &mut EventCtx, _scroll: usize, _x: i32, _y: i32) {}

    fn on_scroll_mouse_over(&self, _ctx: &mut EventCtx, _scroll: usize, _x: i32, _y: i32) {}

    /// A confirmed text entry for the given widget.
    fn on_text_input(&self, _ctx: &mut EventCtx, _widget: WidgetIndex, _text: &str) {}

    fn on_periodic_e(&self, _ctx: &mut EventCtx) {}

    /// Periodic per-scroll-region refresh with the region's visible
    /// screen rectangle.
    fn on_periodic_f(&self, _ctx: &mut EventCtx, _scroll: usize, _visible: Rect) {}

    /// Tooltip string for a widget. Default: the widget's own tooltip.
    fn tooltip(&self, ctx: &mut EventCtx, widget: WidgetIndex) -> Option<StringId> {
        ctx.window.widget(widget).and_then(|w| w.tooltip)
    }

    /// Cursor shape over a widget. `None` means the standard arrow.
    fn cursor(
        &self,
        _ctx: &mut EventCtx,
        _widget: WidgetIndex,
        _x: i32,
        _y: i32,
    ) -> Option<CursorId> {
        None
    }

    /// The window moved to a new position.
    fn on_moved(&self, _ctx: &mut EventCtx, _x: i32, _y: i32) {}

    /// Layout settle before paint. Runs for every visible window before
    /// any window paints.
    fn on_invalidate(&self, _ctx: &mut EventCtx) {}

    /// Paint pass. The default draws the widget array and then each
    /// scroll region's content.
    fn on_paint(&self, ctx: &mut EventCtx, gfx: &mut dyn Gfx) {
        crate::draw::draw_widgets(gfx, ctx.window, ctx.interaction, ctx.shades, ctx.frame);
        let scroll_count = ctx.window.scroll_widgets().len();
        for slot in 0..scroll_count {
            self.on_scroll_paint(ctx, gfx, slot);
        }
    }

    /// Paint the content of one scroll region, in content coordinates.
    fn on_scroll_paint(&self, _ctx: &mut EventCtx, _gfx: &mut dyn Gfx, _scroll: usize) {}
}

/// Handler table with every slot left at its default.
pub struct NoopEvents;

impl WindowEvents for NoopEvents {}
