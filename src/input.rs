//! Pointer and keyboard routing. Owns the transient gesture state
//! (window drags, thumb drags, press tracking) and turns raw input into
//! handler dispatches. Lives on the embedding application, next to the
//! shell and the interaction state.

use log::debug;

use crate::dropdown;
use crate::geometry::{Point, Size};
use crate::gfx::{CursorId, StringId};
use crate::interaction::{InteractionState, WidgetRef};
use crate::scroll::{self, BAR_SIZE, ScrollFlags, ScrollHit, TRACK_INSET};
use crate::shell::{Shell, WindowId};
use crate::widget::{WidgetIndex, WidgetKind};
use crate::window::WindowIdentity;

/// Content pixels moved per scrollbar arrow-button press.
const BUTTON_STEP: i32 = 3;
/// Content pixels moved per wheel notch.
const WHEEL_STEP: i32 = 17;
/// Hover frames before a tooltip fires.
pub const TOOLTIP_DWELL_FRAMES: u32 = 30;
/// Default capacity of an input-started text edit.
const TEXT_EDIT_LEN: usize = 32;

#[derive(Clone, Copy)]
struct WindowDrag {
    window: WindowIdentity,
    grab: Point,
}

#[derive(Clone, Copy)]
struct ResizeDrag {
    window: WindowIdentity,
    start_size: Size,
    start_cursor: Point,
}

#[derive(Clone, Copy)]
struct ThumbDrag {
    window: WindowIdentity,
    widget: WidgetIndex,
    slot: usize,
    vertical: bool,
    start_cursor: i32,
    start_offset: i32,
}

#[derive(Clone, Copy)]
struct ViewDrag {
    window: WindowIdentity,
    widget: WidgetIndex,
    slot: usize,
}

/// Gesture state for the single pointer. One per application.
#[derive(Default)]
pub struct InputRouter {
    cursor: Point,
    window_drag: Option<WindowDrag>,
    resize_drag: Option<ResizeDrag>,
    thumb_drag: Option<ThumbDrag>,
    view_drag: Option<ViewDrag>,
    /// Scroll area with a pressed button/trough, cleared on release.
    scroll_press: Option<(WindowIdentity, usize)>,
    /// Set once the active tool has seen a down event (drag routing).
    tool_dragging: bool,
    last_hover: Option<WidgetRef>,
    hover_frames: u32,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    // ------------------------------------------------------------------
    // Pointer
    // ------------------------------------------------------------------

    pub fn cursor_move(
        &mut self,
        shell: &mut Shell,
        interaction: &mut InteractionState,
        x: i32,
        y: i32,
    ) {
        self.cursor = Point::new(x, y);

        if let Some(drag) = self.window_drag {
            match shell.find_by_identity(drag.window) {
                Some(id) => {
                    let mut pos = Point::new(x - drag.grab.x, y - drag.grab.y);
                    if let Some(w) = shell.get(id) {
                        if !w.flags.contains(crate::window::WindowFlags::NO_SNAPPING) {
                            pos = snap_to_screen_edges(pos, w.size, shell.screen());
                        }
                    }
                    shell.move_to(interaction, id, pos);
                }
                None => self.window_drag = None,
            }
            return;
        }

        if let Some(drag) = self.resize_drag {
            match shell.find_by_identity(drag.window) {
                Some(id) => {
                    let size = Size::new(
                        drag.start_size.width + x - drag.start_cursor.x,
                        drag.start_size.height + y - drag.start_cursor.y,
                    );
                    shell.resize(interaction, id, size);
                }
                None => self.resize_drag = None,
            }
            return;
        }

        if let Some(drag) = self.thumb_drag {
            self.continue_thumb_drag(shell, drag, x, y);
            return;
        }

        if let Some(drag) = self.view_drag {
            if let Some(id) = shell.find_by_identity(drag.window) {
                if let Some((cx, cy)) = content_coords(shell, id, drag.widget, drag.slot, x, y) {
                    shell.dispatch_plain(interaction, id, |e, ctx| {
                        e.on_scroll_mouse_drag(ctx, drag.slot, cx, cy)
                    });
                    shell.drain_requests(interaction);
                }
            }
            return;
        }

        // Active tool: continuous update, or drag once the tool is down.
        if let Some(tool) = interaction.tool() {
            if let Some(id) = shell.find_by_identity(tool.owner.window) {
                let widget = tool.owner.widget;
                if self.tool_dragging {
                    shell.dispatch_plain(interaction, id, |e, ctx| {
                        e.on_tool_drag(ctx, widget, x, y)
                    });
                } else {
                    shell.dispatch_plain(interaction, id, |e, ctx| {
                        e.on_tool_update(ctx, widget, x, y)
                    });
                }
                shell.drain_requests(interaction);
            }
        }

        self.update_hover(shell, interaction, x, y);
    }

    fn update_hover(
        &mut self,
        shell: &mut Shell,
        interaction: &mut InteractionState,
        x: i32,
        y: i32,
    ) {
        let hit = shell.window_at(x, y).and_then(|id| {
            let window = shell.get(id)?;
            let index = window.widget_at(x - window.pos.x, y - window.pos.y)?;
            Some((id, WidgetRef::new(window.identity(), index)))
        });

        let Some((id, target)) = hit else {
            interaction.clear_hover();
            self.last_hover = None;
            self.hover_frames = 0;
            return;
        };

        interaction.set_hover(target);
        if self.last_hover != Some(target) {
            self.last_hover = Some(target);
            self.hover_frames = 0;
        }

        // Mouse-over inside a scroll view.
        let view = shell.get(id).and_then(|w| {
            let slot = w.scroll_index_of(target.widget)?;
            let bounds = w.widget(target.widget)?.bounds;
            let local = Point::new(x - w.pos.x, y - w.pos.y);
            match scroll::classify_point(bounds, &w.scrolls[slot], local.x, local.y) {
                ScrollHit::View { x: cx, y: cy } => Some((slot, cx, cy)),
                _ => None,
            }
        });
        if let Some((slot, cx, cy)) = view {
            shell.dispatch_plain(interaction, id, |e, ctx| {
                e.on_scroll_mouse_over(ctx, slot, cx, cy)
            });
            shell.drain_requests(interaction);
        }
    }

    pub fn mouse_down(
        &mut self,
        shell: &mut Shell,
        interaction: &mut InteractionState,
        x: i32,
        y: i32,
    ) {
        self.cursor = Point::new(x, y);

        if dropdown::is_open(shell) {
            let inside = shell
                .find_by_class(crate::window::WindowClass::DROPDOWN)
                .and_then(|id| shell.get(id))
                .is_some_and(|w| w.rect().contains(x, y));
            if inside {
                dropdown::set_highlighted(shell, dropdown::index_from_point(shell, x, y));
            } else {
                self.resolve_dropdown(shell, interaction, None);
            }
            return;
        }

        let Some(id) = shell.window_at(x, y) else {
            // Clicks on bare ground belong to the active tool.
            if let Some(tool) = interaction.tool() {
                if let Some(owner_id) = shell.find_by_identity(tool.owner.window) {
                    self.tool_dragging = true;
                    let widget = tool.owner.widget;
                    shell.dispatch_plain(interaction, owner_id, |e, ctx| {
                        e.on_tool_down(ctx, widget, x, y)
                    });
                    shell.drain_requests(interaction);
                }
            }
            return;
        };

        shell.bring_to_front(id);

        let Some((identity, index, kind, disabled)) = shell.get(id).and_then(|w| {
            let index = w.widget_at(x - w.pos.x, y - w.pos.y)?;
            let kind = w.widget(index)?.kind;
            Some((w.identity(), index, kind, w.is_disabled(index)))
        }) else {
            return;
        };
        let target = WidgetRef::new(identity, index);

        match kind {
            WidgetKind::Caption => {
                let Some(w) = shell.get(id) else { return };
                self.window_drag = Some(WindowDrag {
                    window: identity,
                    grab: Point::new(x - w.pos.x, y - w.pos.y),
                });
            }
            WidgetKind::ResizeGrip => {
                let Some(w) = shell.get(id) else { return };
                self.resize_drag = Some(ResizeDrag {
                    window: identity,
                    start_size: w.size,
                    start_cursor: Point::new(x, y),
                });
            }
            WidgetKind::Scroll => {
                if !disabled {
                    self.scroll_mouse_down(shell, interaction, id, identity, index, x, y);
                }
            }
            WidgetKind::TextBox => {
                if !disabled {
                    interaction.begin_text_edit(target, "", TEXT_EDIT_LEN);
                    shell.invalidate(id);
                }
            }
            WidgetKind::CloseBox
            | WidgetKind::ImgButton
            | WidgetKind::FlatButton
            | WidgetKind::Button
            | WidgetKind::Tab
            | WidgetKind::Checkbox
            | WidgetKind::Spinner
            | WidgetKind::DropdownButton => {
                if !disabled {
                    interaction.set_held(target);
                    if let Some(w) = shell.get_mut(id) {
                        w.held.insert(index);
                        w.dirty = true;
                    }
                    shell.dispatch_plain(interaction, id, |e, ctx| e.on_mouse_down(ctx, index));
                    shell.drain_requests(interaction);
                }
            }
            WidgetKind::Frame
            | WidgetKind::Label
            | WidgetKind::InsetLabel
            | WidgetKind::Groupbox
            | WidgetKind::Viewport => {}
        }
    }

    pub fn mouse_up(
        &mut self,
        shell: &mut Shell,
        interaction: &mut InteractionState,
        x: i32,
        y: i32,
    ) {
        self.cursor = Point::new(x, y);

        if self.window_drag.take().is_some() || self.resize_drag.take().is_some() {
            return;
        }

        if let Some(drag) = self.thumb_drag.take() {
            self.release_scroll_flags(shell, drag.window, drag.slot);
            return;
        }
        self.view_drag = None;

        if let Some((window, slot)) = self.scroll_press.take() {
            self.release_scroll_flags(shell, window, slot);
        }

        if self.tool_dragging {
            self.tool_dragging = false;
            if let Some(tool) = interaction.tool() {
                if let Some(id) = shell.find_by_identity(tool.owner.window) {
                    let widget = tool.owner.widget;
                    shell.dispatch_plain(interaction, id, |e, ctx| e.on_tool_up(ctx, widget, x, y));
                    shell.drain_requests(interaction);
                }
            }
            return;
        }

        if dropdown::is_open(shell) {
            let choice = dropdown::index_from_point(shell, x, y)
                .filter(|&item| dropdown::selectable(shell, item));
            // Release over the owner widget is the opening click; keep
            // the menu up and wait for the real choice.
            let over_owner = choice.is_none()
                && dropdown::owner(shell).is_some_and(|o| interaction.held() == Some(o));
            self.release_held(shell, interaction);
            if choice.is_some() || !over_owner {
                if choice.is_some() || !self.point_in_dropdown(shell, x, y) {
                    self.resolve_dropdown(shell, interaction, choice);
                }
            }
            return;
        }

        let Some(held) = interaction.held() else {
            return;
        };
        self.release_held(shell, interaction);

        let Some(id) = shell.find_by_identity(held.window) else {
            return;
        };
        let over_same = shell.get(id).is_some_and(|w| {
            w.widget_at(x - w.pos.x, y - w.pos.y) == Some(held.widget)
                && !w.is_disabled(held.widget)
        });
        if !over_same {
            return;
        }

        let kind = shell.get(id).and_then(|w| w.widget(held.widget)).map(|w| w.kind);
        if kind == Some(WidgetKind::CloseBox) {
            shell.close(interaction, id);
            return;
        }
        shell.dispatch_plain(interaction, id, |e, ctx| e.on_mouse_up(ctx, held.widget));
        shell.drain_requests(interaction);
    }

    /// Wheel scroll over a scroll widget.
    pub fn wheel(&mut self, shell: &mut Shell, x: i32, y: i32, notches: i32) {
        let Some(id) = shell.window_at(x, y) else {
            return;
        };
        let target = shell.get(id).and_then(|w| {
            let index = w.widget_at(x - w.pos.x, y - w.pos.y)?;
            let slot = w.scroll_index_of(index)?;
            let bounds = w.widget(index)?.bounds;
            Some((slot, bounds))
        });
        let Some((slot, bounds)) = target else {
            return;
        };
        if let Some(w) = shell.get_mut(id) {
            let area = &mut w.scrolls[slot];
            if area.flags.contains(ScrollFlags::V_VISIBLE) {
                area.scroll_by(bounds, 0, notches * WHEEL_STEP);
            } else {
                area.scroll_by(bounds, notches * WHEEL_STEP, 0);
            }
            scroll::update_thumbs(area, bounds);
            w.dirty = true;
        }
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    /// Printable character into the active text edit.
    pub fn text_char(&mut self, shell: &mut Shell, interaction: &mut InteractionState, ch: char) {
        if ch.is_control() {
            return;
        }
        let owner = match interaction.edit_mut() {
            Some(edit) => {
                edit.insert(ch);
                edit.owner
            }
            None => return,
        };
        self.invalidate_owner(shell, owner);
    }

    pub fn text_backspace(&mut self, shell: &mut Shell, interaction: &mut InteractionState) {
        let owner = match interaction.edit_mut() {
            Some(edit) => {
                edit.backspace();
                edit.owner
            }
            None => return,
        };
        self.invalidate_owner(shell, owner);
    }

    pub fn text_caret(&mut self, shell: &mut Shell, interaction: &mut InteractionState, delta: i32) {
        let owner = match interaction.edit_mut() {
            Some(edit) => {
                edit.move_cursor(delta);
                edit.owner
            }
            None => return,
        };
        self.invalidate_owner(shell, owner);
    }

    /// Commit the edit: the owner receives the text-input event.
    pub fn text_confirm(&mut self, shell: &mut Shell, interaction: &mut InteractionState) {
        let Some(edit) = interaction.end_text_edit() else {
            return;
        };
        if let Some(id) = shell.find_by_identity(edit.owner.window) {
            shell.invalidate(id);
            shell.dispatch_plain(interaction, id, |e, ctx| {
                e.on_text_input(ctx, edit.owner.widget, &edit.buffer)
            });
            shell.drain_requests(interaction);
        }
    }

    /// Abandon the edit without committing.
    pub fn text_abort(&mut self, shell: &mut Shell, interaction: &mut InteractionState) {
        if let Some(edit) = interaction.end_text_edit() {
            debug!("text edit abandoned");
            self.invalidate_owner(shell, edit.owner);
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Advance the hover dwell clock; returns a tooltip string the frame
    /// it becomes due.
    pub fn tooltip_tick(
        &mut self,
        shell: &mut Shell,
        interaction: &mut InteractionState,
    ) -> Option<StringId> {
        let target = interaction.hover()?;
        if self.last_hover != Some(target) {
            self.last_hover = Some(target);
            self.hover_frames = 0;
            return None;
        }
        self.hover_frames = self.hover_frames.saturating_add(1);
        if self.hover_frames != TOOLTIP_DWELL_FRAMES {
            return None;
        }
        let id = shell.find_by_identity(target.window)?;
        let result = shell
            .dispatch_plain(interaction, id, |e, ctx| e.tooltip(ctx, target.widget))
            .flatten();
        shell.drain_requests(interaction);
        result
    }

    /// Cursor shape for a screen point.
    pub fn cursor_at(
        &mut self,
        shell: &mut Shell,
        interaction: &mut InteractionState,
        x: i32,
        y: i32,
    ) -> CursorId {
        let Some(id) = shell.window_at(x, y) else {
            return CursorId::ARROW;
        };
        let Some(index) = shell
            .get(id)
            .and_then(|w| w.widget_at(x - w.pos.x, y - w.pos.y))
        else {
            return CursorId::ARROW;
        };
        let shape = shell
            .dispatch_plain(interaction, id, |e, ctx| e.cursor(ctx, index, x, y))
            .flatten();
        shell.drain_requests(interaction);
        shape.unwrap_or(CursorId::ARROW)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn invalidate_owner(&self, shell: &mut Shell, owner: WidgetRef) {
        if let Some(id) = shell.find_by_identity(owner.window) {
            shell.invalidate(id);
        }
    }

    fn release_held(&self, shell: &mut Shell, interaction: &mut InteractionState) {
        if let Some(held) = interaction.held() {
            if let Some(id) = shell.find_by_identity(held.window) {
                if let Some(w) = shell.get_mut(id) {
                    w.held.remove(held.widget);
                    w.dirty = true;
                }
            }
        }
        interaction.clear_held();
    }

    fn point_in_dropdown(&self, shell: &Shell, x: i32, y: i32) -> bool {
        shell
            .find_by_class(crate::window::WindowClass::DROPDOWN)
            .and_then(|id| shell.get(id))
            .is_some_and(|w| w.rect().contains(x, y))
    }

    /// Close the dropdown and report the outcome to its owner.
    fn resolve_dropdown(
        &mut self,
        shell: &mut Shell,
        interaction: &mut InteractionState,
        choice: Option<usize>,
    ) {
        let Some(owner) = dropdown::owner(shell) else {
            dropdown::close(shell, interaction);
            return;
        };
        let keep_open = choice.is_some() && dropdown::stays_open(shell);
        if !keep_open {
            dropdown::close(shell, interaction);
        }
        if let Some(id) = shell.find_by_identity(owner.window) {
            shell.dispatch_plain(interaction, id, |e, ctx| {
                e.on_dropdown(ctx, owner.widget, choice)
            });
            shell.drain_requests(interaction);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn scroll_mouse_down(
        &mut self,
        shell: &mut Shell,
        interaction: &mut InteractionState,
        id: WindowId,
        identity: WindowIdentity,
        index: WidgetIndex,
        x: i32,
        y: i32,
    ) {
        shell.refresh_scrolls(interaction, id);
        let Some((slot, bounds, area, local)) = shell.get(id).and_then(|w| {
            let slot = w.scroll_index_of(index)?;
            let bounds = w.widget(index)?.bounds;
            let local = Point::new(x - w.pos.x, y - w.pos.y);
            Some((slot, bounds, w.scrolls[slot], local))
        }) else {
            return;
        };

        match scroll::classify_point(bounds, &area, local.x, local.y) {
            ScrollHit::None => {}
            ScrollHit::View { x: cx, y: cy } => {
                self.view_drag = Some(ViewDrag {
                    window: identity,
                    widget: index,
                    slot,
                });
                shell.dispatch_plain(interaction, id, |e, ctx| {
                    e.on_scroll_mouse_down(ctx, slot, cx, cy)
                });
                shell.drain_requests(interaction);
            }
            ScrollHit::HThumb => {
                if let Some(w) = shell.get_mut(id) {
                    w.scrolls[slot].flags |= ScrollFlags::H_THUMB_PRESSED;
                    w.dirty = true;
                }
                self.thumb_drag = Some(ThumbDrag {
                    window: identity,
                    widget: index,
                    slot,
                    vertical: false,
                    start_cursor: x,
                    start_offset: area.offset_x,
                });
            }
            ScrollHit::VThumb => {
                if let Some(w) = shell.get_mut(id) {
                    w.scrolls[slot].flags |= ScrollFlags::V_THUMB_PRESSED;
                    w.dirty = true;
                }
                self.thumb_drag = Some(ThumbDrag {
                    window: identity,
                    widget: index,
                    slot,
                    vertical: true,
                    start_cursor: y,
                    start_offset: area.offset_y,
                });
            }
            part => {
                let Some(w) = shell.get_mut(id) else { return };
                let view = w.scrolls[slot].viewport(bounds);
                let area = &mut w.scrolls[slot];
                match part {
                    ScrollHit::HLeft => {
                        area.flags |= ScrollFlags::H_LEFT_PRESSED;
                        area.scroll_by(bounds, -BUTTON_STEP, 0);
                    }
                    ScrollHit::HRight => {
                        area.flags |= ScrollFlags::H_RIGHT_PRESSED;
                        area.scroll_by(bounds, BUTTON_STEP, 0);
                    }
                    ScrollHit::HTroughLeft => area.scroll_by(bounds, -view.width, 0),
                    ScrollHit::HTroughRight => area.scroll_by(bounds, view.width, 0),
                    ScrollHit::VUp => {
                        area.flags |= ScrollFlags::V_UP_PRESSED;
                        area.scroll_by(bounds, 0, -BUTTON_STEP);
                    }
                    ScrollHit::VDown => {
                        area.flags |= ScrollFlags::V_DOWN_PRESSED;
                        area.scroll_by(bounds, 0, BUTTON_STEP);
                    }
                    ScrollHit::VTroughUp => area.scroll_by(bounds, 0, -view.height),
                    ScrollHit::VTroughDown => area.scroll_by(bounds, 0, view.height),
                    _ => {}
                }
                scroll::update_thumbs(area, bounds);
                w.dirty = true;
                self.scroll_press = Some((identity, slot));
            }
        }
    }

    fn continue_thumb_drag(&mut self, shell: &mut Shell, drag: ThumbDrag, x: i32, y: i32) {
        let Some(id) = shell.find_by_identity(drag.window) else {
            self.thumb_drag = None;
            return;
        };
        let Some((bounds, area)) = shell
            .get(id)
            .and_then(|w| w.widget(drag.widget).map(|widget| (widget.bounds, w.scrolls[drag.slot])))
        else {
            self.thumb_drag = None;
            return;
        };

        let other_visible = if drag.vertical {
            area.flags.contains(ScrollFlags::H_VISIBLE)
        } else {
            area.flags.contains(ScrollFlags::V_VISIBLE)
        };
        let span = if drag.vertical { bounds.height } else { bounds.width };
        let track = (span - TRACK_INSET - if other_visible { BAR_SIZE } else { 0 }).max(1);
        let total = if drag.vertical {
            area.content_height
        } else {
            area.content_width
        };
        let delta_px = if drag.vertical { y } else { x } - drag.start_cursor;
        let delta = delta_px * total / track;

        if let Some(w) = shell.get_mut(id) {
            let area = &mut w.scrolls[drag.slot];
            if drag.vertical {
                area.offset_y = drag.start_offset + delta;
            } else {
                area.offset_x = drag.start_offset + delta;
            }
            area.scroll_by(bounds, 0, 0);
            scroll::update_thumbs(area, bounds);
            w.dirty = true;
        }
    }

    fn release_scroll_flags(&self, shell: &mut Shell, window: WindowIdentity, slot: usize) {
        if let Some(id) = shell.find_by_identity(window) {
            if let Some(w) = shell.get_mut(id) {
                w.scrolls[slot].clear_pressed();
                w.dirty = true;
            }
        }
    }
}

/// Pull a dragged window flush against a screen edge it nearly touches.
fn snap_to_screen_edges(pos: Point, size: Size, screen: Size) -> Point {
    const SNAP: i32 = 5;
    let mut snapped = pos;
    if pos.x.abs() < SNAP {
        snapped.x = 0;
    } else if (screen.width - (pos.x + size.width)).abs() < SNAP {
        snapped.x = screen.width - size.width;
    }
    if pos.y.abs() < SNAP {
        snapped.y = 0;
    } else if (screen.height - (pos.y + size.height)).abs() < SNAP {
        snapped.y = screen.height - size.height;
    }
    snapped
}

/// Content coordinates of a screen point inside a scroll view.
fn content_coords(
    shell: &Shell,
    id: WindowId,
    widget: WidgetIndex,
    slot: usize,
    x: i32,
    y: i32,
) -> Option<(i32, i32)> {
    let w = shell.get(id)?;
    let bounds = w.widget(widget)?.bounds;
    let area = w.scrolls[slot];
    Some((
        x - w.pos.x - bounds.x - 1 + area.offset_x,
        y - w.pos.y - bounds.y - 1 + area.offset_y,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::Colour;
    use crate::events::{EventCtx, WindowEvents};
    use crate::geometry::Rect;
    use crate::widget::Widget;
    use crate::window::{WindowClass, WindowDesc};
    use std::cell::RefCell;
    use std::rc::Rc;

    const WIDGETS: &[Widget] = &[
        Widget::new(WidgetKind::Frame, 0, Rect::new(0, 0, 240, 160)),
        Widget::new(WidgetKind::Caption, 0, Rect::new(1, 1, 238, 14)),
        Widget::new(WidgetKind::CloseBox, 0, Rect::new(227, 2, 11, 12)),
        Widget::new(WidgetKind::Button, 1, Rect::new(10, 20, 60, 14)),
        Widget::new(WidgetKind::Scroll, 1, Rect::new(10, 40, 220, 110)),
        Widget::new(WidgetKind::TextBox, 1, Rect::new(80, 20, 80, 14)),
    ];

    #[derive(Default)]
    struct EventRecord {
        calls: RefCell<Vec<String>>,
    }

    struct Recorder(Rc<EventRecord>);

    impl WindowEvents for Recorder {
        fn on_mouse_down(&self, _ctx: &mut EventCtx, widget: WidgetIndex) {
            self.0.calls.borrow_mut().push(format!("down:{widget}"));
        }
        fn on_mouse_up(&self, _ctx: &mut EventCtx, widget: WidgetIndex) {
            self.0.calls.borrow_mut().push(format!("up:{widget}"));
        }
        fn scroll_content_size(&self, _ctx: &mut EventCtx, _scroll: usize) -> Size {
            Size::new(600, 400)
        }
        fn on_scroll_mouse_down(&self, _ctx: &mut EventCtx, scroll: usize, x: i32, y: i32) {
            self.0
                .calls
                .borrow_mut()
                .push(format!("scroll-down:{scroll}:{x}:{y}"));
        }
        fn on_moved(&self, _ctx: &mut EventCtx, x: i32, y: i32) {
            self.0.calls.borrow_mut().push(format!("moved:{x}:{y}"));
        }
        fn on_text_input(&self, _ctx: &mut EventCtx, widget: WidgetIndex, text: &str) {
            self.0
                .calls
                .borrow_mut()
                .push(format!("text:{widget}:{text}"));
        }
    }

    fn setup() -> (Shell, InteractionState, InputRouter, Rc<EventRecord>, WindowId) {
        let mut shell = Shell::new(Size::new(640, 480));
        let mut interaction = InteractionState::new();
        let record = Rc::new(EventRecord::default());
        let desc = WindowDesc::new(
            WindowClass(40),
            Point::new(100, 100),
            Size::new(240, 160),
            WIDGETS,
            Rc::new(Recorder(Rc::clone(&record))),
        )
        .with_colours([Colour::SAFFRON; 6])
        .with_scroll(0, ScrollFlags::H_VISIBLE | ScrollFlags::V_VISIBLE);
        let id = shell.open(&mut interaction, desc).unwrap();
        (shell, interaction, InputRouter::new(), record, id)
    }

    #[test]
    fn click_dispatches_down_then_up() {
        let (mut shell, mut ia, mut input, record, id) = setup();
        // Button widget 3 spans (110,120)-(170,134) on screen.
        input.mouse_down(&mut shell, &mut ia, 120, 125);
        assert!(ia.held_matches(shell.get(id).unwrap().identity(), 3));
        assert!(shell.get(id).unwrap().held.contains(3));

        input.mouse_up(&mut shell, &mut ia, 121, 126);
        assert!(ia.held().is_none());
        assert!(!shell.get(id).unwrap().held.contains(3));
        assert_eq!(
            record.calls.borrow().as_slice(),
            ["down:3".to_string(), "up:3".to_string()]
        );
    }

    #[test]
    fn release_off_widget_cancels_click() {
        let (mut shell, mut ia, mut input, record, _id) = setup();
        input.mouse_down(&mut shell, &mut ia, 120, 125);
        input.mouse_up(&mut shell, &mut ia, 500, 400);
        assert_eq!(record.calls.borrow().as_slice(), ["down:3".to_string()]);
        assert!(ia.held().is_none());
    }

    #[test]
    fn caption_drag_moves_window() {
        let (mut shell, mut ia, mut input, record, id) = setup();
        input.mouse_down(&mut shell, &mut ia, 110, 105);
        input.cursor_move(&mut shell, &mut ia, 150, 135);
        assert_eq!(shell.get(id).unwrap().pos, Point::new(140, 130));
        input.mouse_up(&mut shell, &mut ia, 150, 135);
        // Further movement no longer drags.
        input.cursor_move(&mut shell, &mut ia, 200, 200);
        assert_eq!(shell.get(id).unwrap().pos, Point::new(140, 130));
        assert!(record.calls.borrow().contains(&"moved:140:130".to_string()));
    }

    #[test]
    fn window_drag_snaps_to_screen_edges() {
        let (mut shell, mut ia, mut input, _record, id) = setup();
        input.mouse_down(&mut shell, &mut ia, 110, 105);
        // Target position (3,3) is within snap range of the corner.
        input.cursor_move(&mut shell, &mut ia, 13, 8);
        assert_eq!(shell.get(id).unwrap().pos, Point::new(0, 0));
    }

    #[test]
    fn close_box_closes_on_release_over_it() {
        let (mut shell, mut ia, mut input, _record, id) = setup();
        input.mouse_down(&mut shell, &mut ia, 330, 105);
        assert!(shell.get(id).is_some());
        input.mouse_up(&mut shell, &mut ia, 330, 105);
        assert!(shell.get(id).is_none());
    }

    #[test]
    fn scroll_view_press_reports_content_coords() {
        let (mut shell, mut ia, mut input, record, _id) = setup();
        // Scroll widget 4 at screen (110,140), view origin (111,141).
        input.mouse_down(&mut shell, &mut ia, 111, 141);
        assert!(
            record
                .calls
                .borrow()
                .contains(&"scroll-down:0:0:0".to_string())
        );
    }

    #[test]
    fn scroll_arrow_press_nudges_content() {
        let (mut shell, mut ia, mut input, _record, id) = setup();
        // Horizontal left arrow: bottom strip of the scroll widget.
        let strip_y = 100 + 40 + 110 - 5;
        input.mouse_down(&mut shell, &mut ia, 112, strip_y);
        let area = shell.get(id).unwrap().scrolls[0];
        assert_eq!(area.offset_x, 0, "left arrow at origin stays clamped");
        assert!(area.flags.contains(ScrollFlags::H_LEFT_PRESSED));

        input.mouse_up(&mut shell, &mut ia, 112, strip_y);
        let area = shell.get(id).unwrap().scrolls[0];
        assert!(!area.flags.contains(ScrollFlags::H_LEFT_PRESSED));

        // Right arrow advances by the button step.
        let right_x = 110 + 220 - BAR_SIZE - 5;
        input.mouse_down(&mut shell, &mut ia, right_x, strip_y);
        let area = shell.get(id).unwrap().scrolls[0];
        assert_eq!(area.offset_x, BUTTON_STEP);
    }

    #[test]
    fn thumb_drag_scrolls_proportionally() {
        let (mut shell, mut ia, mut input, _record, id) = setup();
        shell.refresh_scrolls(&mut ia, id);
        let (t0, _t1) = shell.get(id).unwrap().scrolls[0].h_thumb;
        let strip_y = 100 + 40 + 110 - 5;
        let grab_x = 110 + t0 + 1;

        input.mouse_down(&mut shell, &mut ia, grab_x, strip_y);
        assert!(
            shell.get(id).unwrap().scrolls[0]
                .flags
                .contains(ScrollFlags::H_THUMB_PRESSED)
        );

        input.cursor_move(&mut shell, &mut ia, grab_x + 20, strip_y);
        let area = shell.get(id).unwrap().scrolls[0];
        // 20px along a 188px track of 600px content.
        assert_eq!(area.offset_x, 20 * 600 / 188);

        input.mouse_up(&mut shell, &mut ia, grab_x + 20, strip_y);
        assert!(
            !shell.get(id).unwrap().scrolls[0]
                .flags
                .contains(ScrollFlags::H_THUMB_PRESSED)
        );
    }

    #[test]
    fn text_edit_lifecycle() {
        let (mut shell, mut ia, mut input, record, id) = setup();
        // TextBox widget 5 at screen (180,120)-(260,134).
        input.mouse_down(&mut shell, &mut ia, 185, 125);
        assert!(ia.edit_matches(shell.get(id).unwrap().identity(), 5));

        input.text_char(&mut shell, &mut ia, 'h');
        input.text_char(&mut shell, &mut ia, 'i');
        input.text_char(&mut shell, &mut ia, '!');
        input.text_backspace(&mut shell, &mut ia);
        input.text_confirm(&mut shell, &mut ia);

        assert!(ia.edit().is_none());
        assert!(record.calls.borrow().contains(&"text:5:hi".to_string()));
    }

    #[test]
    fn text_abort_discards() {
        let (mut shell, mut ia, mut input, record, _id) = setup();
        input.mouse_down(&mut shell, &mut ia, 185, 125);
        input.text_char(&mut shell, &mut ia, 'x');
        input.text_abort(&mut shell, &mut ia);
        assert!(ia.edit().is_none());
        assert!(!record.calls.borrow().iter().any(|c| c.starts_with("text:")));
    }

    #[test]
    fn hover_and_tooltip_dwell() {
        let (mut shell, mut ia, mut input, _record, id) = setup();
        input.cursor_move(&mut shell, &mut ia, 120, 125);
        assert!(ia.hover_matches(shell.get(id).unwrap().identity(), 3));

        // Widget 3 carries no tooltip; dwell yields nothing.
        for _ in 0..TOOLTIP_DWELL_FRAMES + 1 {
            assert_eq!(input.tooltip_tick(&mut shell, &mut ia), None);
        }

        // Leaving all windows clears the hover.
        input.cursor_move(&mut shell, &mut ia, 5, 5);
        assert!(ia.hover().is_none());
    }

    #[test]
    fn tooltip_fires_after_dwell() {
        use crate::gfx::StringId;

        const TIPPED: &[Widget] = &[
            Widget::new(WidgetKind::Frame, 0, Rect::new(0, 0, 50, 30)),
            Widget::new(WidgetKind::Button, 1, Rect::new(5, 5, 40, 14)).with_tooltip(StringId(77)),
        ];
        let mut shell = Shell::new(Size::new(640, 480));
        let mut ia = InteractionState::new();
        let mut input = InputRouter::new();
        shell
            .open(
                &mut ia,
                WindowDesc::new(
                    WindowClass(41),
                    Point::new(0, 0),
                    Size::new(50, 30),
                    TIPPED,
                    Rc::new(crate::events::NoopEvents),
                ),
            )
            .unwrap();

        input.cursor_move(&mut shell, &mut ia, 10, 10);
        let mut fired = None;
        for _ in 0..TOOLTIP_DWELL_FRAMES + 5 {
            if let Some(tip) = input.tooltip_tick(&mut shell, &mut ia) {
                fired = Some(tip);
            }
        }
        assert_eq!(fired, Some(StringId(77)));
    }

    #[test]
    fn tool_claims_bare_ground_clicks() {
        use crate::gfx::ToolId;

        #[derive(Default)]
        struct ToolRecord(RefCell<Vec<String>>);
        struct ToolEvents(Rc<ToolRecord>);
        impl WindowEvents for ToolEvents {
            fn on_tool_down(&self, _ctx: &mut EventCtx, widget: WidgetIndex, x: i32, y: i32) {
                self.0.0.borrow_mut().push(format!("tool-down:{widget}:{x}:{y}"));
            }
            fn on_tool_drag(&self, _ctx: &mut EventCtx, _widget: WidgetIndex, x: i32, y: i32) {
                self.0.0.borrow_mut().push(format!("tool-drag:{x}:{y}"));
            }
            fn on_tool_up(&self, _ctx: &mut EventCtx, _widget: WidgetIndex, x: i32, y: i32) {
                self.0.0.borrow_mut().push(format!("tool-up:{x}:{y}"));
            }
        }

        let mut shell = Shell::new(Size::new(640, 480));
        let mut ia = InteractionState::new();
        let mut input = InputRouter::new();
        let record = Rc::new(ToolRecord::default());
        const W: &[Widget] = &[Widget::new(WidgetKind::Frame, 0, Rect::new(0, 0, 50, 30))];
        let id = shell
            .open(
                &mut ia,
                WindowDesc::new(
                    WindowClass(42),
                    Point::new(0, 0),
                    Size::new(50, 30),
                    W,
                    Rc::new(ToolEvents(Rc::clone(&record))),
                ),
            )
            .unwrap();
        let identity = shell.get(id).unwrap().identity();
        assert!(ia.set_tool(WidgetRef::new(identity, 0), ToolId(1)));

        input.mouse_down(&mut shell, &mut ia, 300, 300);
        input.cursor_move(&mut shell, &mut ia, 310, 305);
        input.mouse_up(&mut shell, &mut ia, 310, 305);

        assert_eq!(
            record.0.borrow().as_slice(),
            [
                "tool-down:0:300:300".to_string(),
                "tool-drag:310:305".to_string(),
                "tool-up:310:305".to_string(),
            ]
        );
    }
}
