use crate::geometry::Rect;
use crate::gfx::{SpriteId, StringId};

/// Index of a widget within its window's widget array.
pub type WidgetIndex = usize;

/// Width of the per-window widget bit-sets, and therefore the maximum
/// widget array length a window may carry.
pub const MAX_WIDGETS: usize = 64;

/// Widget identity tag. Closed set — every widget a window can contain is
/// one of these; no trait objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    /// Window background and outer border.
    Frame,
    /// Diagonal drag grip in the bottom-right corner of resizable windows.
    ResizeGrip,
    /// Push button showing a sprite.
    ImgButton,
    /// Page selector; pressed state marks the active page.
    Tab,
    /// Borderless button; border appears on hover.
    FlatButton,
    /// Push button showing a string.
    Button,
    /// Static text, no background.
    Label,
    /// Static text on a sunken field.
    InsetLabel,
    /// Titled outline grouping related widgets.
    Groupbox,
    /// Title bar; doubles as the window drag handle.
    Caption,
    /// Toggle box with a label; the pressed bit is the checked state.
    Checkbox,
    /// Small title-bar button that closes the window.
    CloseBox,
    /// Scrollable view with horizontal and/or vertical bars.
    Scroll,
    /// Editable text field.
    TextBox,
    /// Value field with increment/decrement arrow cells.
    Spinner,
    /// Field with a pull-down arrow opening a dropdown.
    DropdownButton,
    /// Reserved area for a world viewport; content draws itself.
    Viewport,
}

/// What a widget displays. Replaces the classic -1/-2 sentinel scheme on
/// the image field with an explicit sum type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WidgetContent {
    /// Draw nothing.
    #[default]
    None,
    /// Draw only the containing control's border.
    Outline,
    Sprite(SpriteId),
    Text(StringId),
}

/// Immutable per-class widget descriptor. Bounds are window-local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub kind: WidgetKind,
    /// Index into the owning window's six-entry colour palette.
    pub colour: usize,
    pub bounds: Rect,
    pub content: WidgetContent,
    pub tooltip: Option<StringId>,
}

impl Widget {
    pub const fn new(kind: WidgetKind, colour: usize, bounds: Rect) -> Self {
        Self {
            kind,
            colour,
            bounds,
            content: WidgetContent::None,
            tooltip: None,
        }
    }

    pub const fn with_content(mut self, content: WidgetContent) -> Self {
        self.content = content;
        self
    }

    pub const fn with_tooltip(mut self, tooltip: StringId) -> Self {
        self.tooltip = Some(tooltip);
        self
    }
}

/// Fixed-width bit-set indexed by widget slot. Backs the per-window
/// enabled/disabled/pressed/held masks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidgetSet(u64);

impl WidgetSet {
    pub const EMPTY: WidgetSet = WidgetSet(0);

    /// Set containing every slot below `len`.
    pub const fn all_below(len: usize) -> WidgetSet {
        if len >= MAX_WIDGETS {
            WidgetSet(u64::MAX)
        } else {
            WidgetSet((1u64 << len) - 1)
        }
    }

    pub const fn single(index: WidgetIndex) -> WidgetSet {
        if index < MAX_WIDGETS {
            WidgetSet(1 << index)
        } else {
            WidgetSet(0)
        }
    }

    pub const fn contains(self, index: WidgetIndex) -> bool {
        index < MAX_WIDGETS && self.0 & (1 << index) != 0
    }

    pub fn insert(&mut self, index: WidgetIndex) {
        debug_assert!(index < MAX_WIDGETS, "widget index {index} out of range");
        if index < MAX_WIDGETS {
            self.0 |= 1 << index;
        }
    }

    pub fn remove(&mut self, index: WidgetIndex) {
        if index < MAX_WIDGETS {
            self.0 &= !(1 << index);
        }
    }

    pub fn set(&mut self, index: WidgetIndex, on: bool) {
        if on {
            self.insert(index);
        } else {
            self.remove(index);
        }
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn bits(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_query_bits() {
        let mut set = WidgetSet::EMPTY;
        assert!(set.is_empty());
        set.insert(0);
        set.insert(63);
        assert!(set.contains(0));
        assert!(set.contains(63));
        assert!(!set.contains(1));
        set.remove(0);
        assert!(!set.contains(0));
        assert!(set.contains(63));
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let mut set = WidgetSet::EMPTY;
        set.set(64, true);
        assert!(set.is_empty());
        assert!(!set.contains(64));
        assert!(!WidgetSet::single(64).contains(64));
    }

    #[test]
    fn all_below_masks_exactly() {
        assert_eq!(WidgetSet::all_below(0).bits(), 0);
        assert_eq!(WidgetSet::all_below(3).bits(), 0b111);
        assert_eq!(WidgetSet::all_below(64).bits(), u64::MAX);
        assert_eq!(WidgetSet::all_below(99).bits(), u64::MAX);
    }

    #[test]
    fn widget_builder_carries_content_and_tooltip() {
        const W: Widget = Widget::new(WidgetKind::Tab, 1, Rect::new(3, 17, 31, 27))
            .with_content(WidgetContent::Sprite(SpriteId(500)))
            .with_tooltip(StringId(42));
        assert_eq!(W.kind, WidgetKind::Tab);
        assert_eq!(W.content, WidgetContent::Sprite(SpriteId(500)));
        assert_eq!(W.tooltip, Some(StringId(42)));
    }
}
