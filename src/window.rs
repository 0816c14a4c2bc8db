use std::borrow::Cow;
use std::rc::Rc;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::colour::Colour;
use crate::dropdown::DropdownData;
use crate::events::WindowEvents;
use crate::geometry::{Point, Rect, Size};
use crate::scroll::{ScrollArea, ScrollFlags};
use crate::widget::{MAX_WIDGETS, Widget, WidgetIndex, WidgetKind, WidgetSet};

/// Scroll regions available per window.
pub const MAX_SCROLLS: usize = 3;

/// Coarse window-kind tag. Content modules claim their own values;
/// the toolkit reserves the high ones for windows it opens itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowClass(pub u8);

impl WindowClass {
    /// Transient dropdown menus opened by the dropdown controller.
    pub const DROPDOWN: WindowClass = WindowClass(250);
    /// Transient tooltip bubbles.
    pub const TOOLTIP: WindowClass = WindowClass(251);
}

/// Stable weak reference to an open window: classification plus instance
/// number. Safe to retain across frames; must be re-validated by lookup
/// before each use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowIdentity {
    pub class: WindowClass,
    pub number: u16,
}

impl WindowIdentity {
    pub const fn new(class: WindowClass, number: u16) -> Self {
        Self { class, number }
    }
}

bitflags::bitflags! {
    /// Behaviour flags, independently togglable at creation and later.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct WindowFlags: u32 {
        const RESIZABLE = 1 << 0;
        const TRANSPARENT = 1 << 1;
        /// Stays above ordinary windows.
        const STICK_TO_FRONT = 1 << 2;
        /// Stays behind ordinary windows.
        const STICK_TO_BACK = 1 << 3;
        /// Exempt from the pool's eviction policy.
        const NO_AUTO_CLOSE = 1 << 4;
        /// Window paints no backdrop of its own.
        const NO_BACKGROUND = 1 << 5;
        /// Excluded from edge snapping while dragged.
        const NO_SNAPPING = 1 << 6;
    }
}

/// Class-specific scratch state carried inside the window record.
#[derive(Debug, Clone, Default)]
pub enum WindowData {
    #[default]
    None,
    /// World-viewport windows remember what they are looking at.
    Viewport { focus_x: i32, focus_y: i32, zoom: u8 },
    /// List windows track highlight and selection rows.
    List {
        highlight: Option<usize>,
        selected: Option<usize>,
    },
    /// The dropdown controller's layout and items.
    Dropdown(DropdownData),
    /// A few free integers for classes with small needs.
    Scratch([i32; 4]),
}

/// Everything needed to open a window. Widget arrays are usually
/// `'static` class-level tables; a window clones its own copy only when
/// it mutates them.
pub struct WindowDesc {
    pub class: WindowClass,
    /// Explicit instance number; assigned automatically when `None`.
    pub number: Option<u16>,
    pub pos: Point,
    pub size: Size,
    pub min_size: Option<Size>,
    pub max_size: Option<Size>,
    pub flags: WindowFlags,
    pub colours: [Colour; 6],
    pub widgets: Cow<'static, [Widget]>,
    pub scroll_flags: [ScrollFlags; MAX_SCROLLS],
    pub data: WindowData,
    pub events: Rc<dyn WindowEvents>,
}

impl WindowDesc {
    pub fn new(
        class: WindowClass,
        pos: Point,
        size: Size,
        widgets: impl Into<Cow<'static, [Widget]>>,
        events: Rc<dyn WindowEvents>,
    ) -> Self {
        Self {
            class,
            number: None,
            pos,
            size,
            min_size: None,
            max_size: None,
            flags: WindowFlags::empty(),
            colours: [Colour::GREY; 6],
            widgets: widgets.into(),
            scroll_flags: [ScrollFlags::empty(); MAX_SCROLLS],
            data: WindowData::None,
            events,
        }
    }

    pub fn with_flags(mut self, flags: WindowFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_colours(mut self, colours: [Colour; 6]) -> Self {
        self.colours = colours;
        self
    }

    pub fn with_number(mut self, number: u16) -> Self {
        self.number = Some(number);
        self
    }

    pub fn with_size_limits(mut self, min: Size, max: Size) -> Self {
        self.min_size = Some(min);
        self.max_size = Some(max);
        self
    }

    pub fn with_scroll(mut self, index: usize, flags: ScrollFlags) -> Self {
        if index < MAX_SCROLLS {
            self.scroll_flags[index] = flags;
        }
        self
    }

    pub fn with_data(mut self, data: WindowData) -> Self {
        self.data = data;
        self
    }
}

/// One open window. Lives in the pool; addressed by handle, identified
/// across frames by [`WindowIdentity`].
pub struct Window {
    identity: WindowIdentity,
    pub pos: Point,
    pub size: Size,
    pub min_size: Size,
    pub max_size: Size,
    pub flags: WindowFlags,
    pub colours: [Colour; 6],
    widgets: Cow<'static, [Widget]>,
    pub enabled: WidgetSet,
    pub disabled: WidgetSet,
    pub pressed: WidgetSet,
    pub held: WidgetSet,
    pub scrolls: [ScrollArea; MAX_SCROLLS],
    pub data: WindowData,
    pub dirty: bool,
    pub(crate) last_active: u64,
    pub(crate) events: Rc<dyn WindowEvents>,
}

impl Window {
    pub(crate) fn new(desc: WindowDesc, number: u16, seq: u64) -> Self {
        if desc.widgets.len() > MAX_WIDGETS {
            warn!(
                "window class {} has {} widgets; bit-sets cover the first {}",
                desc.class.0,
                desc.widgets.len(),
                MAX_WIDGETS
            );
        }
        debug_assert!(desc.widgets.len() <= MAX_WIDGETS);

        let mut scrolls = [ScrollArea::EMPTY; MAX_SCROLLS];
        for (area, flags) in scrolls.iter_mut().zip(desc.scroll_flags) {
            *area = ScrollArea::with_flags(flags);
        }

        Self {
            identity: WindowIdentity::new(desc.class, number),
            pos: desc.pos,
            size: desc.size,
            min_size: desc.min_size.unwrap_or(desc.size),
            max_size: desc.max_size.unwrap_or(desc.size),
            flags: desc.flags,
            colours: desc.colours,
            enabled: WidgetSet::all_below(desc.widgets.len()),
            disabled: WidgetSet::EMPTY,
            pressed: WidgetSet::EMPTY,
            held: WidgetSet::EMPTY,
            widgets: desc.widgets,
            scrolls,
            data: desc.data,
            dirty: true,
            last_active: seq,
            events: desc.events,
        }
    }

    pub fn identity(&self) -> WindowIdentity {
        self.identity
    }

    pub fn class(&self) -> WindowClass {
        self.identity.class
    }

    pub fn number(&self) -> u16 {
        self.identity.number
    }

    pub fn rect(&self) -> Rect {
        Rect::at(self.pos, self.size)
    }

    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    // -- widgets ------------------------------------------------------

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    /// Mutable access clones the class-shared array into this window on
    /// first use.
    pub fn widgets_mut(&mut self) -> &mut [Widget] {
        self.dirty = true;
        self.widgets.to_mut()
    }

    pub fn widget(&self, index: WidgetIndex) -> Option<&Widget> {
        self.widgets.get(index)
    }

    /// Topmost widget under a window-local point. Later array entries
    /// draw on top, so the scan runs back-to-front.
    pub fn widget_at(&self, x: i32, y: i32) -> Option<WidgetIndex> {
        self.widgets
            .iter()
            .enumerate()
            .rev()
            .find(|(_, w)| w.bounds.contains(x, y))
            .map(|(i, _)| i)
    }

    pub fn is_enabled(&self, index: WidgetIndex) -> bool {
        self.enabled.contains(index)
    }

    pub fn is_disabled(&self, index: WidgetIndex) -> bool {
        self.disabled.contains(index)
    }

    pub fn is_pressed(&self, index: WidgetIndex) -> bool {
        self.pressed.contains(index)
    }

    pub fn set_enabled(&mut self, index: WidgetIndex, on: bool) {
        self.enabled.set(index, on);
        self.dirty = true;
    }

    pub fn set_disabled(&mut self, index: WidgetIndex, on: bool) {
        self.disabled.set(index, on);
        self.dirty = true;
    }

    pub fn set_pressed(&mut self, index: WidgetIndex, on: bool) {
        self.pressed.set(index, on);
        self.dirty = true;
    }

    // -- scroll regions -----------------------------------------------

    /// Scroll-region slot of a scroll widget: the count of scroll widgets
    /// preceding it in the array. `None` for non-scroll widgets.
    pub fn scroll_index_of(&self, index: WidgetIndex) -> Option<usize> {
        match self.widgets.get(index) {
            Some(w) if w.kind == WidgetKind::Scroll => {}
            _ => return None,
        }
        let slot = self.widgets[..index]
            .iter()
            .filter(|w| w.kind == WidgetKind::Scroll)
            .count();
        debug_assert!(slot < MAX_SCROLLS, "window exceeds {MAX_SCROLLS} scroll regions");
        (slot < MAX_SCROLLS).then_some(slot)
    }

    /// Widget indices of every scroll widget, in array order.
    pub fn scroll_widgets(&self) -> Vec<WidgetIndex> {
        self.widgets
            .iter()
            .enumerate()
            .filter(|(_, w)| w.kind == WidgetKind::Scroll)
            .take(MAX_SCROLLS)
            .map(|(i, _)| i)
            .collect()
    }

    // -- sizing -------------------------------------------------------

    /// Clamp a requested size into this window's limits.
    pub fn clamp_size(&self, size: Size) -> Size {
        Size::new(
            size.width.clamp(self.min_size.width, self.max_size.width),
            size.height.clamp(self.min_size.height, self.max_size.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoopEvents;

    const WIDGETS: &[Widget] = &[
        Widget::new(WidgetKind::Frame, 0, Rect::new(0, 0, 100, 80)),
        Widget::new(WidgetKind::Caption, 0, Rect::new(1, 1, 98, 14)),
        Widget::new(WidgetKind::Scroll, 1, Rect::new(4, 20, 60, 50)),
        Widget::new(WidgetKind::Scroll, 1, Rect::new(66, 20, 30, 50)),
    ];

    fn window() -> Window {
        let desc = WindowDesc::new(
            WindowClass(10),
            Point::new(5, 5),
            Size::new(100, 80),
            WIDGETS,
            Rc::new(NoopEvents),
        )
        .with_size_limits(Size::new(50, 40), Size::new(200, 160));
        Window::new(desc, 0, 0)
    }

    #[test]
    fn widget_at_prefers_topmost() {
        let w = window();
        // Frame covers everything, caption sits on top of it.
        assert_eq!(w.widget_at(10, 5), Some(1));
        assert_eq!(w.widget_at(10, 40), Some(2));
        assert_eq!(w.widget_at(70, 40), Some(3));
        assert_eq!(w.widget_at(0, 79), Some(0));
        assert_eq!(w.widget_at(150, 5), None);
    }

    #[test]
    fn scroll_slots_count_preceding_scroll_widgets() {
        let w = window();
        assert_eq!(w.scroll_index_of(2), Some(0));
        assert_eq!(w.scroll_index_of(3), Some(1));
        assert_eq!(w.scroll_index_of(1), None);
        assert_eq!(w.scroll_index_of(99), None);
        assert_eq!(w.scroll_widgets(), vec![2, 3]);
    }

    #[test]
    fn new_window_enables_exactly_its_widgets() {
        let w = window();
        assert!(w.is_enabled(0));
        assert!(w.is_enabled(3));
        assert!(!w.is_enabled(4));
        assert!(w.disabled.is_empty());
        assert!(w.pressed.is_empty());
    }

    #[test]
    fn clamp_size_honours_limits() {
        let w = window();
        assert_eq!(w.clamp_size(Size::new(10, 10)), Size::new(50, 40));
        assert_eq!(w.clamp_size(Size::new(500, 70)), Size::new(200, 70));
    }

    #[test]
    fn widgets_mut_copies_on_write() {
        let mut w = window();
        w.dirty = false;
        w.widgets_mut()[1].bounds.width = 50;
        assert!(w.dirty);
        assert_eq!(w.widget(1).unwrap().bounds.width, 50);
        // The shared class table is untouched.
        assert_eq!(WIDGETS[1].bounds.width, 98);
    }
}
