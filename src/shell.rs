//! Window pool and z-order manager.
//!
//! All windows live in one arena; the z-order is a separate explicit
//! vector (back to front) in three bands: stick-to-back, ordinary,
//! stick-to-front. Every structural mutation funnels through [`Shell`] —
//! nothing else may splice the order.

use log::{debug, warn};
use slotmap::SlotMap;
use thiserror::Error;

use crate::colour::ShadeTable;
use crate::events::{EventCtx, RequestQueue, ShellRequest, WindowEvents};
use crate::geometry::{Point, Rect, Size};
use crate::interaction::InteractionState;
use crate::scroll;
use crate::widget::WidgetIndex;
use crate::window::{Window, WindowClass, WindowDesc, WindowFlags, WindowIdentity};

use std::rc::Rc;

slotmap::new_key_type! {
    /// Handle into the window pool. Stable across closes of other
    /// windows; goes stale (lookups return `None`) when its own window
    /// closes.
    pub struct WindowId;
}

/// Default concurrent-window allowance.
pub const DEFAULT_CAPACITY: usize = 12;

/// Auxiliary dispatch cadences, in frames.
const CADENCE_A: u64 = 8;
const CADENCE_B: u64 = 16;
const CADENCE_C: u64 = 32;
const CADENCE_D: u64 = 64;
const CADENCE_E: u64 = 128;
const CADENCE_F: u64 = 32;

static BUILTIN_SHADES: ShadeTable = ShadeTable::BUILTIN;

#[derive(Debug, Error)]
pub enum CreateError {
    #[error("window pool exhausted ({open} open, capacity {capacity})")]
    PoolExhausted { open: usize, capacity: usize },
}

/// The window pool, z-order and frame driver.
pub struct Shell {
    windows: SlotMap<WindowId, Window>,
    /// Back-to-front draw and hit-test order.
    z_order: Vec<WindowId>,
    capacity: usize,
    screen: Size,
    frame: u64,
    use_seq: u64,
    dirty_rects: Vec<Rect>,
    requests: RequestQueue,
}

impl Shell {
    pub fn new(screen: Size) -> Self {
        Self::with_capacity(screen, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(screen: Size, capacity: usize) -> Self {
        Self {
            windows: SlotMap::with_key(),
            z_order: Vec::new(),
            capacity: capacity.max(1),
            screen,
            frame: 0,
            use_seq: 0,
            dirty_rects: Vec::new(),
            requests: RequestQueue::new(),
        }
    }

    pub fn screen(&self) -> Size {
        self.screen
    }

    pub fn set_screen(&mut self, screen: Size) {
        self.screen = screen;
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(id)
    }

    /// Back-to-front window order.
    pub fn z_order(&self) -> &[WindowId] {
        &self.z_order
    }

    // ------------------------------------------------------------------
    // Creation / destruction
    // ------------------------------------------------------------------

    /// Open a window. At capacity the pool first evicts the least
    /// recently active window that allows it; if none does, creation
    /// fails and the caller handles the absence.
    pub fn open(
        &mut self,
        interaction: &mut InteractionState,
        desc: WindowDesc,
    ) -> Result<WindowId, CreateError> {
        let result = self.open_inner(interaction, desc);
        self.drain_requests(interaction);
        result
    }

    fn open_inner(
        &mut self,
        interaction: &mut InteractionState,
        desc: WindowDesc,
    ) -> Result<WindowId, CreateError> {
        if self.windows.len() >= self.capacity {
            self.auto_close_one(interaction);
        }
        if self.windows.len() >= self.capacity {
            warn!(
                "refusing window for class {}: pool exhausted",
                desc.class.0
            );
            return Err(CreateError::PoolExhausted {
                open: self.windows.len(),
                capacity: self.capacity,
            });
        }

        let number = match desc.number {
            Some(n) => n,
            None => self.next_number(desc.class),
        };
        let flags = desc.flags;
        self.use_seq += 1;
        let window = Window::new(desc, number, self.use_seq);
        let rect = window.rect();
        let identity = window.identity();
        let id = self.windows.insert(window);
        let at = self.insert_index(flags);
        self.z_order.insert(at, id);
        self.dirty_rects.push(rect);
        debug!(
            "opened window class {} number {}",
            identity.class.0, identity.number
        );
        Ok(id)
    }

    /// Close a window: close notification, interaction-state cleanup,
    /// slot reclaim, z-order compaction.
    pub fn close(&mut self, interaction: &mut InteractionState, id: WindowId) {
        self.close_inner(interaction, id);
        self.drain_requests(interaction);
    }

    fn close_inner(&mut self, interaction: &mut InteractionState, id: WindowId) {
        let Some(window) = self.windows.get(id) else {
            return;
        };
        let identity = window.identity();
        let rect = window.rect();

        self.dispatch(interaction, &BUILTIN_SHADES, id, |e, ctx| e.on_close(ctx));
        if let Some(cancelled) = interaction.window_closed(identity) {
            self.dispatch(interaction, &BUILTIN_SHADES, id, |e, ctx| {
                e.on_tool_abort(ctx, cancelled.owner.widget)
            });
        }

        self.windows.remove(id);
        self.z_order.retain(|&w| w != id);
        self.dirty_rects.push(rect);
        debug!(
            "closed window class {} number {}",
            identity.class.0, identity.number
        );
    }

    pub fn close_by_class(&mut self, interaction: &mut InteractionState, class: WindowClass) {
        while let Some(id) = self.find_by_class(class) {
            self.close_inner(interaction, id);
        }
        self.drain_requests(interaction);
    }

    /// Evict the least recently active window that permits it. Sticky
    /// and no-auto-close windows are never victims.
    fn auto_close_one(&mut self, interaction: &mut InteractionState) {
        let exempt =
            WindowFlags::NO_AUTO_CLOSE | WindowFlags::STICK_TO_FRONT | WindowFlags::STICK_TO_BACK;
        let victim = self
            .z_order
            .iter()
            .copied()
            .filter(|&id| {
                self.windows
                    .get(id)
                    .is_some_and(|w| !w.flags.intersects(exempt))
            })
            .min_by_key(|&id| self.windows[id].last_active);
        if let Some(id) = victim {
            debug!("auto-closing least recently used window");
            self.close_inner(interaction, id);
        }
    }

    /// Smallest unused instance number for a class.
    fn next_number(&self, class: WindowClass) -> u16 {
        let mut used: Vec<u16> = self
            .windows
            .values()
            .filter(|w| w.class() == class)
            .map(|w| w.number())
            .collect();
        used.sort_unstable();
        let mut next = 0;
        for n in used {
            if n == next {
                next += 1;
            } else if n > next {
                break;
            }
        }
        next
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Topmost window of a class.
    pub fn find_by_class(&self, class: WindowClass) -> Option<WindowId> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .find(|&id| self.windows.get(id).is_some_and(|w| w.class() == class))
    }

    pub fn find_by_identity(&self, identity: WindowIdentity) -> Option<WindowId> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .find(|&id| self.windows.get(id).is_some_and(|w| w.identity() == identity))
    }

    /// Topmost window under a screen point.
    pub fn window_at(&self, x: i32, y: i32) -> Option<WindowId> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .find(|&id| self.windows.get(id).is_some_and(|w| w.rect().contains(x, y)))
    }

    // ------------------------------------------------------------------
    // Z-order
    // ------------------------------------------------------------------

    /// Insertion slot honouring the three z bands.
    fn insert_index(&self, flags: WindowFlags) -> usize {
        if flags.contains(WindowFlags::STICK_TO_BACK) {
            // Top of the back band: behind every non-sticky window.
            self.z_order
                .iter()
                .position(|&w| {
                    self.windows
                        .get(w)
                        .is_none_or(|win| !win.flags.contains(WindowFlags::STICK_TO_BACK))
                })
                .unwrap_or(self.z_order.len())
        } else if flags.contains(WindowFlags::STICK_TO_FRONT) {
            self.z_order.len()
        } else {
            // Below the front-sticky band.
            self.z_order
                .iter()
                .position(|&w| {
                    self.windows
                        .get(w)
                        .is_some_and(|win| win.flags.contains(WindowFlags::STICK_TO_FRONT))
                })
                .unwrap_or(self.z_order.len())
        }
    }

    /// Raise a window to the top of its band and mark it active.
    pub fn bring_to_front(&mut self, id: WindowId) -> Option<WindowId> {
        let flags = self.windows.get(id)?.flags;
        self.z_order.retain(|&w| w != id);
        let at = self.insert_index(flags);
        self.z_order.insert(at, id);
        self.use_seq += 1;
        let seq = self.use_seq;
        if let Some(w) = self.windows.get_mut(id) {
            w.last_active = seq;
            w.dirty = true;
        }
        Some(id)
    }

    /// Move every window overlapping `id` directly beneath it in the
    /// z-order, preserving their relative order.
    pub fn push_others_below(&mut self, id: WindowId) {
        let Some(rect) = self.windows.get(id).map(|w| w.rect()) else {
            return;
        };
        let overlapping: Vec<WindowId> = self
            .z_order
            .iter()
            .copied()
            .filter(|&other| {
                other != id
                    && self
                        .windows
                        .get(other)
                        .is_some_and(|w| w.rect().intersects(&rect))
            })
            .collect();
        if overlapping.is_empty() {
            return;
        }
        self.z_order.retain(|w| !overlapping.contains(w));
        let at = self
            .z_order
            .iter()
            .position(|&w| w == id)
            .unwrap_or(self.z_order.len());
        for (offset, other) in overlapping.iter().enumerate() {
            self.z_order.insert(at + offset, *other);
        }
        for other in overlapping {
            self.invalidate(other);
        }
    }

    /// Slide every window overlapping `id` to its right edge, clamped to
    /// the screen.
    pub fn push_others_right(&mut self, id: WindowId) {
        let Some(rect) = self.windows.get(id).map(|w| w.rect()) else {
            return;
        };
        let others: Vec<WindowId> = self
            .z_order
            .iter()
            .copied()
            .filter(|&other| other != id)
            .collect();
        for other in others {
            let Some(w) = self.windows.get_mut(other) else {
                continue;
            };
            if !w.rect().intersects(&rect) {
                continue;
            }
            let old = w.rect();
            w.pos.x = rect.right().min(self.screen.width - w.size.width).max(0);
            w.dirty = true;
            let new = w.rect();
            self.dirty_rects.push(old);
            self.dirty_rects.push(new);
        }
    }

    // ------------------------------------------------------------------
    // Invalidation
    // ------------------------------------------------------------------

    pub fn invalidate(&mut self, id: WindowId) {
        if let Some(w) = self.windows.get_mut(id) {
            w.dirty = true;
            let rect = w.rect();
            self.dirty_rects.push(rect);
        }
    }

    pub fn invalidate_by_class(&mut self, class: WindowClass) {
        let ids: Vec<WindowId> = self
            .z_order
            .iter()
            .copied()
            .filter(|&id| self.windows.get(id).is_some_and(|w| w.class() == class))
            .collect();
        for id in ids {
            self.invalidate(id);
        }
    }

    pub fn invalidate_all(&mut self) {
        let ids: Vec<WindowId> = self.z_order.clone();
        for id in ids {
            self.invalidate(id);
        }
    }

    /// Accumulated screen regions needing a repaint. The rendering
    /// collaborator drains this once per frame.
    pub fn take_dirty_rects(&mut self) -> Vec<Rect> {
        std::mem::take(&mut self.dirty_rects)
    }

    // ------------------------------------------------------------------
    // Mutation with notification
    // ------------------------------------------------------------------

    /// Resize within the window's limits and notify it.
    pub fn resize(&mut self, interaction: &mut InteractionState, id: WindowId, size: Size) {
        let changed = match self.windows.get_mut(id) {
            Some(w) => {
                let clamped = w.clamp_size(size);
                if clamped == w.size {
                    false
                } else {
                    let old = w.rect();
                    w.size = clamped;
                    w.dirty = true;
                    let new = w.rect();
                    self.dirty_rects.push(old);
                    self.dirty_rects.push(new);
                    true
                }
            }
            None => false,
        };
        if changed {
            self.dispatch(interaction, &BUILTIN_SHADES, id, |e, ctx| e.on_resize(ctx));
            self.drain_requests(interaction);
        }
    }

    /// Move a window and notify it.
    pub fn move_to(&mut self, interaction: &mut InteractionState, id: WindowId, pos: Point) {
        let moved = match self.windows.get_mut(id) {
            Some(w) => {
                if w.pos == pos {
                    false
                } else {
                    let old = w.rect();
                    w.pos = pos;
                    w.dirty = true;
                    let new = w.rect();
                    self.dirty_rects.push(old);
                    self.dirty_rects.push(new);
                    true
                }
            }
            None => false,
        };
        if moved {
            self.dispatch(interaction, &BUILTIN_SHADES, id, |e, ctx| {
                let (x, y) = (ctx.window.pos.x, ctx.window.pos.y);
                e.on_moved(ctx, x, y)
            });
            self.drain_requests(interaction);
        }
    }

    /// Swap a window's handler table (page changes). The swap forces an
    /// immediate invalidate pass on the window.
    pub fn set_events(
        &mut self,
        interaction: &mut InteractionState,
        id: WindowId,
        events: Rc<dyn WindowEvents>,
    ) {
        let Some(w) = self.windows.get_mut(id) else {
            return;
        };
        w.events = events;
        self.invalidate(id);
        self.dispatch(interaction, &BUILTIN_SHADES, id, |e, ctx| {
            e.on_invalidate(ctx)
        });
        self.drain_requests(interaction);
    }

    /// Release the active tool, notifying its owner.
    pub fn cancel_tool(&mut self, interaction: &mut InteractionState) {
        if let Some(target) = interaction.cancel_tool() {
            if let Some(id) = self.find_by_identity(target.owner.window) {
                self.dispatch(interaction, &BUILTIN_SHADES, id, |e, ctx| {
                    e.on_tool_abort(ctx, target.owner.widget)
                });
            }
            self.drain_requests(interaction);
        }
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Run one handler against one window. Returns `None` for stale ids.
    pub(crate) fn dispatch<R>(
        &mut self,
        interaction: &mut InteractionState,
        shades: &ShadeTable,
        id: WindowId,
        f: impl FnOnce(&dyn WindowEvents, &mut EventCtx) -> R,
    ) -> Option<R> {
        let screen = self.screen;
        let frame = self.frame;
        let window = self.windows.get_mut(id)?;
        let events = Rc::clone(&window.events);
        let mut ctx = EventCtx {
            window,
            interaction,
            screen,
            frame,
            shades,
            requests: &mut self.requests,
        };
        Some(f(events.as_ref(), &mut ctx))
    }

    /// Dispatch helper without a shade table (non-paint events).
    pub(crate) fn dispatch_plain<R>(
        &mut self,
        interaction: &mut InteractionState,
        id: WindowId,
        f: impl FnOnce(&dyn WindowEvents, &mut EventCtx) -> R,
    ) -> Option<R> {
        self.dispatch(interaction, &BUILTIN_SHADES, id, f)
    }

    /// Apply queued structural requests. Handlers triggered here may
    /// queue more; processing is bounded.
    pub(crate) fn drain_requests(&mut self, interaction: &mut InteractionState) {
        let mut rounds = 0;
        while !self.requests.is_empty() {
            if rounds >= 8 {
                warn!("deferred window requests still queued after 8 rounds; dropping them");
                self.requests.clear();
                break;
            }
            rounds += 1;
            let batch: RequestQueue = std::mem::take(&mut self.requests);
            for request in batch {
                match request {
                    ShellRequest::Open(desc) => {
                        let _ = self.open_inner(interaction, *desc);
                    }
                    ShellRequest::Close(identity) => {
                        if let Some(id) = self.find_by_identity(identity) {
                            self.close_inner(interaction, id);
                        }
                    }
                    ShellRequest::CloseClass(class) => {
                        while let Some(id) = self.find_by_class(class) {
                            self.close_inner(interaction, id);
                        }
                    }
                    ShellRequest::Invalidate(identity) => {
                        if let Some(id) = self.find_by_identity(identity) {
                            self.invalidate(id);
                        }
                    }
                    ShellRequest::InvalidateClass(class) => {
                        self.invalidate_by_class(class);
                    }
                    ShellRequest::Action(action) => {
                        action(self, interaction);
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Frame driving
    // ------------------------------------------------------------------

    /// Per-frame update tick: the update event for every window plus the
    /// auxiliary cadence slots.
    pub fn update(&mut self, interaction: &mut InteractionState) {
        self.frame += 1;
        let frame = self.frame;
        let order: Vec<WindowId> = self.z_order.clone();
        for &id in &order {
            if frame.is_multiple_of(CADENCE_A) {
                self.dispatch_plain(interaction, id, |e, ctx| e.on_periodic_a(ctx));
            }
            self.dispatch_plain(interaction, id, |e, ctx| e.on_update(ctx));
            if frame.is_multiple_of(CADENCE_B) {
                self.dispatch_plain(interaction, id, |e, ctx| e.on_periodic_b(ctx));
            }
            if frame.is_multiple_of(CADENCE_C) {
                self.dispatch_plain(interaction, id, |e, ctx| e.on_periodic_c(ctx));
            }
            if frame.is_multiple_of(CADENCE_D) {
                self.dispatch_plain(interaction, id, |e, ctx| e.on_periodic_d(ctx));
            }
            if frame.is_multiple_of(CADENCE_E) {
                self.dispatch_plain(interaction, id, |e, ctx| e.on_periodic_e(ctx));
            }
            if frame.is_multiple_of(CADENCE_F) {
                let regions: Vec<(usize, Rect)> = match self.windows.get(id) {
                    Some(w) => w
                        .scroll_widgets()
                        .iter()
                        .enumerate()
                        .filter_map(|(slot, &wi)| {
                            w.widget(wi)
                                .map(|widget| (slot, widget.bounds.translated(w.pos.x, w.pos.y)))
                        })
                        .collect(),
                    None => Vec::new(),
                };
                for (slot, visible) in regions {
                    self.dispatch_plain(interaction, id, |e, ctx| {
                        e.on_periodic_f(ctx, slot, visible)
                    });
                }
            }
        }
        self.drain_requests(interaction);
    }

    /// Pull fresh content extents for every scroll region of a window
    /// and recompute thumb geometry.
    pub fn refresh_scrolls(&mut self, interaction: &mut InteractionState, id: WindowId) {
        let regions: Vec<(usize, WidgetIndex, Rect)> = match self.windows.get(id) {
            Some(w) => w
                .scroll_widgets()
                .iter()
                .enumerate()
                .filter_map(|(slot, &wi)| w.widget(wi).map(|widget| (slot, wi, widget.bounds)))
                .collect(),
            None => return,
        };
        for (slot, _wi, bounds) in regions {
            let content = self
                .dispatch_plain(interaction, id, |e, ctx| e.scroll_content_size(ctx, slot))
                .unwrap_or_default();
            if let Some(w) = self.windows.get_mut(id) {
                let area = &mut w.scrolls[slot];
                area.content_width = content.width;
                area.content_height = content.height;
                // Re-clamp offsets against the fresh extents.
                area.scroll_by(bounds, 0, 0);
                scroll::update_thumbs(area, bounds);
            }
        }
    }

    /// Full redraw pass: every window's invalidate runs before any
    /// window paints, then paint back-to-front.
    pub fn draw(
        &mut self,
        interaction: &mut InteractionState,
        gfx: &mut dyn crate::gfx::Gfx,
        shades: &ShadeTable,
    ) {
        let order: Vec<WindowId> = self.z_order.clone();
        for &id in &order {
            self.refresh_scrolls(interaction, id);
            self.dispatch(interaction, shades, id, |e, ctx| e.on_invalidate(ctx));
        }
        for &id in &order {
            self.dispatch(interaction, shades, id, |e, ctx| e.on_paint(ctx, gfx));
            if let Some(w) = self.windows.get_mut(id) {
                w.dirty = false;
            }
        }
        self.drain_requests(interaction);
    }
}
