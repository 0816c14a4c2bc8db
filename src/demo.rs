//! Reference content module: one window class built entirely through the
//! public toolkit surface. Used by the diagnostic binary and the
//! integration tests; real applications register their own classes the
//! same way.

use std::rc::Rc;

use crate::colour::Colour;
use crate::dropdown::{self, DropdownItem};
use crate::events::{EventCtx, WindowEvents};
use crate::geometry::{Point, Rect, Size};
use crate::gfx::{FmtArgs, Gfx, SpriteId, StringId};
use crate::interaction::{InteractionState, WidgetRef};
use crate::scroll::ScrollFlags;
use crate::shell::{CreateError, Shell, WindowId};
use crate::widget::{Widget, WidgetContent, WidgetIndex, WidgetKind};
use crate::window::{WindowClass, WindowData, WindowDesc, WindowFlags};

pub const DEMO_CLASS: WindowClass = WindowClass(1);

pub const WIDGET_FRAME: WidgetIndex = 0;
pub const WIDGET_CAPTION: WidgetIndex = 1;
pub const WIDGET_CLOSE: WidgetIndex = 2;
pub const WIDGET_TAB_GENERAL: WidgetIndex = 3;
pub const WIDGET_TAB_EXTRA: WidgetIndex = 4;
pub const WIDGET_CHECKBOX: WidgetIndex = 5;
pub const WIDGET_DROPDOWN: WidgetIndex = 6;
pub const WIDGET_SPINNER: WidgetIndex = 7;
pub const WIDGET_NAME: WidgetIndex = 8;
pub const WIDGET_LIST: WidgetIndex = 9;

const STR_TITLE: StringId = StringId(100);
const STR_CHECKBOX: StringId = StringId(101);
const STR_DROPDOWN: StringId = StringId(102);
const STR_SPINNER: StringId = StringId(103);
const STR_ROW: StringId = StringId(104);
const STR_CHOICE_BASE: u32 = 110;
const STR_TIP_CLOSE: StringId = StringId(120);

const SPR_TAB_GENERAL: SpriteId = SpriteId(200);
const SPR_TAB_EXTRA: SpriteId = SpriteId(201);

const LIST_ROWS: i32 = 30;
const LIST_ROW_HEIGHT: i32 = 10;
const CHOICE_COUNT: usize = 3;

const WIDGETS: &[Widget] = &[
    Widget::new(WidgetKind::Frame, 0, Rect::new(0, 0, 200, 150)),
    Widget::new(WidgetKind::Caption, 0, Rect::new(1, 1, 198, 14))
        .with_content(WidgetContent::Text(STR_TITLE)),
    Widget::new(WidgetKind::CloseBox, 0, Rect::new(187, 2, 11, 12))
        .with_tooltip(STR_TIP_CLOSE),
    Widget::new(WidgetKind::Tab, 1, Rect::new(3, 17, 31, 27))
        .with_content(WidgetContent::Sprite(SPR_TAB_GENERAL)),
    Widget::new(WidgetKind::Tab, 1, Rect::new(34, 17, 31, 27))
        .with_content(WidgetContent::Sprite(SPR_TAB_EXTRA)),
    Widget::new(WidgetKind::Checkbox, 1, Rect::new(6, 50, 120, 13))
        .with_content(WidgetContent::Text(STR_CHECKBOX)),
    Widget::new(WidgetKind::DropdownButton, 1, Rect::new(6, 68, 120, 14))
        .with_content(WidgetContent::Text(STR_DROPDOWN)),
    Widget::new(WidgetKind::Spinner, 1, Rect::new(6, 86, 80, 14))
        .with_content(WidgetContent::Text(STR_SPINNER)),
    Widget::new(WidgetKind::TextBox, 1, Rect::new(6, 104, 120, 14)),
    Widget::new(WidgetKind::Scroll, 1, Rect::new(130, 50, 64, 94)),
];

/// Open the demo window. The checkbox state lives in the pressed bit,
/// the dropdown choice and spinner value in the scratch block.
pub fn open_demo(
    shell: &mut Shell,
    interaction: &mut InteractionState,
) -> Result<WindowId, CreateError> {
    let desc = WindowDesc::new(
        DEMO_CLASS,
        Point::new(64, 48),
        Size::new(200, 150),
        WIDGETS,
        Rc::new(DemoEvents),
    )
    .with_flags(WindowFlags::RESIZABLE)
    .with_size_limits(Size::new(200, 150), Size::new(400, 300))
    .with_colours([
        Colour::SAFFRON,
        Colour::DARK_GREEN,
        Colour::DARK_GREEN,
        Colour::GREY,
        Colour::GREY,
        Colour::GREY,
    ])
    .with_scroll(0, ScrollFlags::V_VISIBLE)
    .with_data(WindowData::Scratch([0; 4]));
    let id = shell.open(interaction, desc)?;
    if let Some(w) = shell.get_mut(id) {
        w.set_pressed(WIDGET_TAB_GENERAL, true);
    }
    Ok(id)
}

/// The demo's dropdown choice, if one has been made.
pub fn chosen_item(shell: &Shell, id: WindowId) -> Option<usize> {
    match &shell.get(id)?.data {
        WindowData::Scratch(values) if values[0] > 0 => Some(values[0] as usize - 1),
        _ => None,
    }
}

struct DemoEvents;

impl WindowEvents for DemoEvents {
    fn on_mouse_up(&self, ctx: &mut EventCtx, widget: WidgetIndex) {
        match widget {
            WIDGET_CHECKBOX => {
                let checked = ctx.window.is_pressed(WIDGET_CHECKBOX);
                ctx.window.set_pressed(WIDGET_CHECKBOX, !checked);
            }
            WIDGET_TAB_GENERAL | WIDGET_TAB_EXTRA => {
                ctx.window.set_pressed(WIDGET_TAB_GENERAL, widget == WIDGET_TAB_GENERAL);
                ctx.window.set_pressed(WIDGET_TAB_EXTRA, widget == WIDGET_TAB_EXTRA);
            }
            _ => {}
        }
    }

    fn on_mouse_down(&self, ctx: &mut EventCtx, widget: WidgetIndex) {
        if widget != WIDGET_DROPDOWN {
            return;
        }
        let owner = WidgetRef::new(ctx.window.identity(), WIDGET_DROPDOWN);
        let Some(button) = ctx.window.widget(WIDGET_DROPDOWN) else {
            return;
        };
        let anchor = button.bounds.translated(ctx.window.pos.x, ctx.window.pos.y);
        let colour = ctx.window.colours[1];
        ctx.defer(move |shell, interaction| {
            let items = (0..CHOICE_COUNT)
                .map(|i| DropdownItem::text(StringId(STR_CHOICE_BASE + i as u32)))
                .collect();
            dropdown::show_text_custom_width(
                shell,
                interaction,
                owner,
                anchor.x,
                anchor.y,
                anchor.height,
                colour,
                false,
                None,
                anchor.width,
                items,
            );
        });
    }

    fn on_dropdown(&self, ctx: &mut EventCtx, widget: WidgetIndex, item: Option<usize>) {
        if widget != WIDGET_DROPDOWN {
            return;
        }
        if let (WindowData::Scratch(values), Some(item)) = (&mut ctx.window.data, item) {
            values[0] = item as i32 + 1;
        }
        ctx.window.invalidate();
    }

    fn on_resize(&self, ctx: &mut EventCtx) {
        // The frame and list track the window size.
        let size = ctx.window.size;
        let widgets = ctx.window.widgets_mut();
        widgets[WIDGET_FRAME].bounds = Rect::new(0, 0, size.width, size.height);
        widgets[WIDGET_LIST].bounds.width = size.width - 136;
        widgets[WIDGET_LIST].bounds.height = size.height - 56;
    }

    fn scroll_content_size(&self, _ctx: &mut EventCtx, _scroll: usize) -> Size {
        Size::new(50, LIST_ROWS * LIST_ROW_HEIGHT)
    }

    fn on_scroll_mouse_down(&self, ctx: &mut EventCtx, _scroll: usize, _x: i32, y: i32) {
        if let WindowData::Scratch(values) = &mut ctx.window.data {
            values[1] = y / LIST_ROW_HEIGHT;
        }
        ctx.window.invalidate();
    }

    fn on_scroll_paint(&self, ctx: &mut EventCtx, gfx: &mut dyn Gfx, _scroll: usize) {
        let colour = ctx.window.colours[1];
        let selected = match &ctx.window.data {
            WindowData::Scratch(values) => values[1],
            _ => -1,
        };
        for row in 0..LIST_ROWS {
            let y = row * LIST_ROW_HEIGHT;
            if row == selected {
                gfx.fill_rect(Rect::new(0, y, 50, LIST_ROW_HEIGHT), ctx.shades.shade(colour, 5));
            }
            let mut args = FmtArgs::new();
            args.push(row as u32 + 1);
            gfx.draw_string_left(STR_ROW, &args, colour, 2, y);
        }
    }

    fn on_text_input(&self, ctx: &mut EventCtx, widget: WidgetIndex, text: &str) {
        if widget == WIDGET_NAME {
            log::debug!("demo window renamed to {text:?}");
            ctx.window.invalidate();
        }
    }
}
