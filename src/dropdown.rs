//! Dropdown controller: transient text or image-grid menus.
//!
//! A dropdown is an ordinary pooled window of [`WindowClass::DROPDOWN`];
//! its layout and items ride in the window record and become stale the
//! moment the window closes. At most one dropdown is open at a time —
//! opening a new one closes the previous.

use std::rc::Rc;

use log::warn;

use crate::colour::{COLOUR_COUNT, Colour};
use crate::events::{EventCtx, WindowEvents};
use crate::geometry::{Point, Rect, Size};
use crate::gfx::{FmtArgs, Gfx, InsetFlags, Localize, SpriteId, StringId, TextMeasure};
use crate::interaction::{InteractionState, WidgetRef};
use crate::shell::{Shell, WindowId};
use crate::widget::{Widget, WidgetKind};
use crate::window::{WindowClass, WindowData, WindowDesc, WindowFlags};

/// Item capacity of one dropdown.
pub const MAX_ITEMS: usize = 64;
/// Text row height unless a caller overrides it.
pub const DEFAULT_ROW_HEIGHT: i32 = 10;
/// Border margin added around the item grid.
const MARGIN: i32 = 3;

/// Sprite id base for colour-picker swatches: swatch `n` resolves to
/// `SWATCH_SPRITE_BASE + n` in the rendering collaborator.
pub const SWATCH_SPRITE_BASE: u32 = 0x1000;

/// One dropdown entry.
#[derive(Debug, Clone, PartialEq)]
pub enum DropdownItem {
    Text { format: StringId, args: FmtArgs },
    Image(SpriteId),
    /// Thin divider; geometrically hittable but never selectable.
    Separator,
}

impl DropdownItem {
    pub fn text(format: StringId) -> Self {
        Self::Text {
            format,
            args: FmtArgs::new(),
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, Self::Separator)
    }
}

/// Layout and state of the open dropdown, stored in its window record.
#[derive(Debug, Clone)]
pub struct DropdownData {
    pub items: Vec<DropdownItem>,
    /// Bit per item: shown with a check/selection mark.
    pub checked: u64,
    /// Bit per item: rendered greyed, not selectable.
    pub disabled: u64,
    pub highlighted: Option<usize>,
    /// The widget the dropdown belongs to; receives the choice event.
    pub owner: WidgetRef,
    pub columns: usize,
    pub rows: usize,
    pub item_width: i32,
    pub item_height: i32,
    pub image_grid: bool,
    /// Selection does not auto-close (multi-select pickers).
    pub stay_open: bool,
}

impl DropdownData {
    pub fn is_checked(&self, item: usize) -> bool {
        item < MAX_ITEMS && self.checked & (1 << item) != 0
    }

    pub fn is_disabled(&self, item: usize) -> bool {
        item < MAX_ITEMS && self.disabled & (1 << item) != 0
    }
}

// ---------------------------------------------------------------------------
// Opening
// ---------------------------------------------------------------------------

/// Open a text dropdown auto-sized to its widest formatted item.
#[allow(clippy::too_many_arguments)]
pub fn show_text(
    shell: &mut Shell,
    interaction: &mut InteractionState,
    measure: &dyn TextMeasure,
    localize: &dyn Localize,
    owner: WidgetRef,
    x: i32,
    y: i32,
    extra_y: i32,
    colour: Colour,
    stay_open: bool,
    row_height: Option<i32>,
    items: Vec<DropdownItem>,
) -> Option<WindowId> {
    let width = items
        .iter()
        .map(|item| match item {
            DropdownItem::Text { format, args } => {
                measure.string_width(&localize.format(*format, args))
            }
            _ => 0,
        })
        .max()
        .unwrap_or(0)
        + MARGIN;
    show_text_custom_width(
        shell,
        interaction,
        owner,
        x,
        y,
        extra_y,
        colour,
        stay_open,
        row_height,
        width,
        items,
    )
}

/// Open a text dropdown with an explicit total width.
#[allow(clippy::too_many_arguments)]
pub fn show_text_custom_width(
    shell: &mut Shell,
    interaction: &mut InteractionState,
    owner: WidgetRef,
    x: i32,
    y: i32,
    extra_y: i32,
    colour: Colour,
    stay_open: bool,
    row_height: Option<i32>,
    width: i32,
    items: Vec<DropdownItem>,
) -> Option<WindowId> {
    open_dropdown(
        shell,
        interaction,
        DropdownLayout {
            owner,
            x,
            y,
            extra_y,
            colour,
            stay_open,
            // The border margin comes back in the window size.
            item_width: (width - MARGIN).max(1),
            item_height: row_height.unwrap_or(DEFAULT_ROW_HEIGHT),
            columns: 1,
            image_grid: false,
        },
        items,
    )
}

/// Open an image-grid dropdown of fixed cells.
#[allow(clippy::too_many_arguments)]
pub fn show_image_grid(
    shell: &mut Shell,
    interaction: &mut InteractionState,
    owner: WidgetRef,
    x: i32,
    y: i32,
    extra_y: i32,
    colour: Colour,
    stay_open: bool,
    items: Vec<DropdownItem>,
    cell_width: i32,
    cell_height: i32,
    columns: usize,
) -> Option<WindowId> {
    open_dropdown(
        shell,
        interaction,
        DropdownLayout {
            owner,
            x,
            y,
            extra_y,
            colour,
            stay_open,
            item_width: cell_width,
            item_height: cell_height,
            columns: columns.max(1),
            image_grid: true,
        },
        items,
    )
}

/// Open the colour-swatch picker: one cell per colour allowed by
/// `available` (bit per palette colour), the selected one checked.
/// Stays open across selections.
pub fn show_colour_picker(
    shell: &mut Shell,
    interaction: &mut InteractionState,
    owner: WidgetRef,
    x: i32,
    y: i32,
    extra_y: i32,
    colour: Colour,
    selected: Colour,
    available: u32,
) -> Option<WindowId> {
    let mut items = Vec::new();
    let mut checked = 0u64;
    for index in 0..COLOUR_COUNT {
        if available & (1 << index) == 0 {
            continue;
        }
        if Colour::plain(index) == selected {
            checked |= 1 << items.len();
        }
        items.push(DropdownItem::Image(SpriteId(
            SWATCH_SPRITE_BASE + u32::from(index),
        )));
    }
    let id = show_image_grid(
        shell,
        interaction,
        owner,
        x,
        y,
        extra_y,
        colour,
        true,
        items,
        12,
        12,
        8,
    )?;
    if let Some(WindowData::Dropdown(data)) = shell.get_mut(id).map(|w| &mut w.data) {
        data.checked = checked;
    }
    Some(id)
}

/// The palette colour a picker item maps back to, given the same
/// availability mask the picker was opened with.
pub fn colour_of_picker_item(available: u32, item: usize) -> Option<Colour> {
    let mut slot = 0;
    for index in 0..COLOUR_COUNT {
        if available & (1 << index) == 0 {
            continue;
        }
        if slot == item {
            return Some(Colour::plain(index));
        }
        slot += 1;
    }
    None
}

struct DropdownLayout {
    owner: WidgetRef,
    x: i32,
    y: i32,
    extra_y: i32,
    colour: Colour,
    stay_open: bool,
    item_width: i32,
    item_height: i32,
    columns: usize,
    image_grid: bool,
}

const DROPDOWN_WIDGETS: &[Widget] = &[Widget::new(WidgetKind::Frame, 0, Rect::new(0, 0, 1, 1))];

fn open_dropdown(
    shell: &mut Shell,
    interaction: &mut InteractionState,
    layout: DropdownLayout,
    mut items: Vec<DropdownItem>,
) -> Option<WindowId> {
    close(shell, interaction);

    if items.len() > MAX_ITEMS {
        warn!("dropdown asked for {} items; keeping {}", items.len(), MAX_ITEMS);
        items.truncate(MAX_ITEMS);
    }

    let rows = if layout.image_grid {
        items.len().div_ceil(layout.columns)
    } else {
        items.len()
    };
    let size = Size::new(
        layout.columns as i32 * layout.item_width + MARGIN,
        rows as i32 * layout.item_height + MARGIN,
    );

    // Clamp inside the screen: never past the right/bottom edge, never
    // above or left of the origin.
    let screen = shell.screen();
    let pos = Point::new(
        layout.x.min(screen.width - size.width).max(0),
        (layout.y + layout.extra_y)
            .min(screen.height - size.height)
            .max(0),
    );

    let data = DropdownData {
        items,
        checked: 0,
        disabled: 0,
        highlighted: None,
        owner: layout.owner,
        columns: layout.columns,
        rows,
        item_width: layout.item_width,
        item_height: layout.item_height,
        image_grid: layout.image_grid,
        stay_open: layout.stay_open,
    };

    let desc = WindowDesc::new(
        WindowClass::DROPDOWN,
        pos,
        size,
        DROPDOWN_WIDGETS,
        Rc::new(DropdownEvents),
    )
    .with_flags(WindowFlags::STICK_TO_FRONT | WindowFlags::NO_AUTO_CLOSE)
    .with_colours([layout.colour; 6])
    .with_data(WindowData::Dropdown(data));

    match shell.open(interaction, desc) {
        Ok(id) => Some(id),
        Err(err) => {
            warn!("dropdown failed to open: {err}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Queries / lifecycle
// ---------------------------------------------------------------------------

pub fn is_open(shell: &Shell) -> bool {
    shell.find_by_class(WindowClass::DROPDOWN).is_some()
}

/// Close the open dropdown, if any.
pub fn close(shell: &mut Shell, interaction: &mut InteractionState) {
    if let Some(id) = shell.find_by_class(WindowClass::DROPDOWN) {
        shell.close(interaction, id);
    }
}

fn open_data(shell: &Shell) -> Option<(&crate::window::Window, &DropdownData)> {
    let id = shell.find_by_class(WindowClass::DROPDOWN)?;
    let window = shell.get(id)?;
    match &window.data {
        WindowData::Dropdown(data) => Some((window, data)),
        _ => None,
    }
}

/// The widget that owns the open dropdown.
pub fn owner(shell: &Shell) -> Option<WidgetRef> {
    open_data(shell).map(|(_, data)| data.owner)
}

pub fn stays_open(shell: &Shell) -> bool {
    open_data(shell).is_some_and(|(_, data)| data.stay_open)
}

/// Item under a screen point. `None` outside the grid, in the border
/// margin, or past the item count. Separators are reported when hit;
/// rejecting them is the caller's job.
pub fn index_from_point(shell: &Shell, x: i32, y: i32) -> Option<usize> {
    let (window, data) = open_data(shell)?;
    let local_x = x - window.pos.x - 1;
    let local_y = y - window.pos.y - 1;
    if local_x < 0 || local_y < 0 {
        return None;
    }
    if local_x >= data.columns as i32 * data.item_width {
        return None;
    }
    let column = (local_x / data.item_width) as usize;
    let row = (local_y / data.item_height) as usize;
    if row >= data.rows {
        return None;
    }
    let index = row * data.columns + column;
    (index < data.items.len()).then_some(index)
}

/// Whether an item may actually be chosen.
pub fn selectable(shell: &Shell, item: usize) -> bool {
    open_data(shell).is_some_and(|(_, data)| {
        data.items
            .get(item)
            .is_some_and(|entry| !entry.is_separator())
            && !data.is_disabled(item)
    })
}

/// Move the keyboard/pointer highlight.
pub fn set_highlighted(shell: &mut Shell, item: Option<usize>) {
    let Some(id) = shell.find_by_class(WindowClass::DROPDOWN) else {
        return;
    };
    if let Some(window) = shell.get_mut(id) {
        if let WindowData::Dropdown(data) = &mut window.data {
            data.highlighted = item;
        }
        window.dirty = true;
    }
}

pub fn highlighted(shell: &Shell) -> Option<usize> {
    open_data(shell).and_then(|(_, data)| data.highlighted)
}

// ---------------------------------------------------------------------------
// The dropdown's own window class
// ---------------------------------------------------------------------------

struct DropdownEvents;

impl WindowEvents for DropdownEvents {
    fn on_invalidate(&self, ctx: &mut EventCtx) {
        // The frame widget tracks the window size.
        let size = ctx.window.size;
        ctx.window.widgets_mut()[0].bounds = Rect::new(0, 0, size.width, size.height);
    }

    fn on_paint(&self, ctx: &mut EventCtx, gfx: &mut dyn Gfx) {
        crate::draw::draw_widgets(gfx, ctx.window, ctx.interaction, ctx.shades, ctx.frame);

        let origin = ctx.window.pos;
        let colour = ctx.window.colours[0];
        let WindowData::Dropdown(data) = &ctx.window.data else {
            return;
        };

        for (index, item) in data.items.iter().enumerate() {
            let row = index / data.columns;
            let column = index % data.columns;
            let cell = Rect::new(
                origin.x + 1 + column as i32 * data.item_width,
                origin.y + 1 + row as i32 * data.item_height,
                data.item_width,
                data.item_height,
            );

            if data.highlighted == Some(index) && !item.is_separator() {
                gfx.fill_rect(cell, ctx.shades.shade(colour, 5));
            }

            match item {
                DropdownItem::Separator => {
                    let mid = cell.y + cell.height / 2;
                    gfx.fill_rect(
                        Rect::new(cell.x + 1, mid - 1, cell.width - 2, 1),
                        ctx.shades.shade(colour, 2),
                    );
                    gfx.fill_rect(
                        Rect::new(cell.x + 1, mid, cell.width - 2, 1),
                        ctx.shades.shade(colour, 6),
                    );
                }
                DropdownItem::Text { format, args } => {
                    let text_colour = if data.is_disabled(index) {
                        Colour::GREY
                    } else {
                        colour
                    };
                    if data.is_checked(index) {
                        gfx.draw_text("\u{2713}", text_colour, cell.x, cell.y);
                    }
                    gfx.draw_string_left(*format, args, text_colour, cell.x + 2, cell.y);
                }
                DropdownItem::Image(sprite) => {
                    gfx.draw_sprite(*sprite, cell.x, cell.y, Some(colour));
                    if data.is_checked(index) {
                        gfx.fill_rect_inset(cell, colour, InsetFlags::FILL_NONE);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::DrawLog;
    use crate::window::WindowIdentity;

    fn setup() -> (Shell, InteractionState, WidgetRef) {
        let shell = Shell::new(Size::new(640, 480));
        let interaction = InteractionState::new();
        let owner = WidgetRef::new(WindowIdentity::new(WindowClass(30), 0), 4);
        (shell, interaction, owner)
    }

    fn text_items(n: usize) -> Vec<DropdownItem> {
        (0..n).map(|i| DropdownItem::text(StringId(i as u32))).collect()
    }

    #[test]
    fn text_dropdown_auto_sizes_to_widest_item() {
        let (mut shell, mut ia, owner) = setup();
        let mut log = DrawLog::new();
        log.define_string(StringId(0), "ab");
        log.define_string(StringId(1), "abcdef");
        log.define_string(StringId(2), "abcd");

        let id = show_text(
            &mut shell, &mut ia, &log, &log, owner, 100, 100, 12, Colour::GREY, false, None,
            text_items(3),
        )
        .unwrap();
        let window = shell.get(id).unwrap();
        // Widest item is 6 glyphs at 8px, plus the 3px margin.
        assert_eq!(window.size.width, 6 * 8 + 3);
        assert_eq!(window.size.height, 3 * DEFAULT_ROW_HEIGHT + 3);
        // Opens beneath the anchor.
        assert_eq!(window.pos, Point::new(100, 112));
    }

    #[test]
    fn placement_clamps_inside_screen() {
        let (mut shell, mut ia, owner) = setup();

        let id = show_text_custom_width(
            &mut shell, &mut ia, owner, 635, 100, 0, Colour::GREY, false, None, 50,
            text_items(2),
        )
        .unwrap();
        assert_eq!(shell.get(id).unwrap().pos.x, 640 - 50);

        let id = show_text_custom_width(
            &mut shell, &mut ia, owner, -10, -30, 0, Colour::GREY, false, None, 50,
            text_items(2),
        )
        .unwrap();
        assert_eq!(shell.get(id).unwrap().pos, Point::new(0, 0));

        let id = show_text_custom_width(
            &mut shell, &mut ia, owner, 10, 475, 0, Colour::GREY, false, None, 50,
            text_items(4),
        )
        .unwrap();
        let window = shell.get(id).unwrap();
        assert_eq!(window.pos.y, 480 - window.size.height);
    }

    #[test]
    fn image_grid_dimensions() {
        let (mut shell, mut ia, owner) = setup();
        let items: Vec<DropdownItem> =
            (0..7).map(|i| DropdownItem::Image(SpriteId(i))).collect();
        let id = show_image_grid(
            &mut shell, &mut ia, owner, 50, 50, 0, Colour::GREY, false, items, 20, 16, 3,
        )
        .unwrap();
        let window = shell.get(id).unwrap();
        // 7 items in 3 columns: 3 rows.
        assert_eq!(window.size, Size::new(3 * 20 + 3, 3 * 16 + 3));
    }

    #[test]
    fn index_from_point_grid_and_padding() {
        let (mut shell, mut ia, owner) = setup();
        let items: Vec<DropdownItem> =
            (0..7).map(|i| DropdownItem::Image(SpriteId(i))).collect();
        show_image_grid(
            &mut shell, &mut ia, owner, 50, 50, 0, Colour::GREY, false, items, 20, 16, 3,
        )
        .unwrap();

        // Window at (50,50); grid origin at (51,51).
        assert_eq!(index_from_point(&shell, 51, 51), Some(0));
        assert_eq!(index_from_point(&shell, 51 + 20, 51), Some(1));
        assert_eq!(index_from_point(&shell, 51 + 40, 51 + 16), Some(5));
        // Border margin.
        assert_eq!(index_from_point(&shell, 50, 51), None);
        // Third row only has one item: cell (1,2) is past the count.
        assert_eq!(index_from_point(&shell, 51 + 20, 51 + 32), None);
        assert_eq!(index_from_point(&shell, 51, 51 + 32), Some(6));
        // Right of the grid.
        assert_eq!(index_from_point(&shell, 51 + 60, 51), None);
    }

    #[test]
    fn separators_hit_but_not_selectable() {
        let (mut shell, mut ia, owner) = setup();
        let items = vec![
            DropdownItem::text(StringId(1)),
            DropdownItem::Separator,
            DropdownItem::text(StringId(2)),
        ];
        show_text_custom_width(
            &mut shell, &mut ia, owner, 0, 0, 0, Colour::GREY, false, None, 60, items,
        )
        .unwrap();

        let sep_y = 1 + DEFAULT_ROW_HEIGHT + 2;
        assert_eq!(index_from_point(&shell, 5, sep_y), Some(1));
        assert!(!selectable(&shell, 1));
        assert!(selectable(&shell, 0));
        assert!(selectable(&shell, 2));
    }

    #[test]
    fn disabled_items_not_selectable() {
        let (mut shell, mut ia, owner) = setup();
        let id = show_text_custom_width(
            &mut shell, &mut ia, owner, 0, 0, 0, Colour::GREY, false, None, 60,
            text_items(2),
        )
        .unwrap();
        if let Some(WindowData::Dropdown(data)) = shell.get_mut(id).map(|w| &mut w.data) {
            data.disabled = 0b10;
        }
        assert!(selectable(&shell, 0));
        assert!(!selectable(&shell, 1));
    }

    #[test]
    fn item_overflow_truncates() {
        let (mut shell, mut ia, owner) = setup();
        show_text_custom_width(
            &mut shell, &mut ia, owner, 0, 0, 0, Colour::GREY, false, None, 30,
            text_items(100),
        )
        .unwrap();
        let (_, data) = open_data(&shell).unwrap();
        assert_eq!(data.items.len(), MAX_ITEMS);
    }

    #[test]
    fn reopening_replaces_previous_dropdown() {
        let (mut shell, mut ia, owner) = setup();
        show_text_custom_width(
            &mut shell, &mut ia, owner, 0, 0, 0, Colour::GREY, false, None, 30,
            text_items(2),
        )
        .unwrap();
        show_text_custom_width(
            &mut shell, &mut ia, owner, 0, 0, 0, Colour::GREY, false, None, 30,
            text_items(5),
        )
        .unwrap();
        // Only one dropdown window exists.
        assert_eq!(shell.len(), 1);
        let (_, data) = open_data(&shell).unwrap();
        assert_eq!(data.items.len(), 5);

        close(&mut shell, &mut ia);
        assert!(!is_open(&shell));
        assert_eq!(index_from_point(&shell, 1, 1), None);
    }

    #[test]
    fn colour_picker_checks_selected_swatch() {
        let (mut shell, mut ia, owner) = setup();
        let available: u32 = (1 << 3) | (1 << 7) | (1 << 9);
        show_colour_picker(
            &mut shell, &mut ia, owner, 0, 0, 0, Colour::GREY, Colour::plain(7), available,
        )
        .unwrap();
        let (_, data) = open_data(&shell).unwrap();
        assert_eq!(data.items.len(), 3);
        assert!(data.is_checked(1));
        assert!(!data.is_checked(0));
        assert!(data.stay_open);
        assert!(stays_open(&shell));

        assert_eq!(colour_of_picker_item(available, 0), Some(Colour::plain(3)));
        assert_eq!(colour_of_picker_item(available, 2), Some(Colour::plain(9)));
        assert_eq!(colour_of_picker_item(available, 3), None);
    }
}
