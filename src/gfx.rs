//! External collaborator surface: the rasterizer and the string formatter.
//!
//! The toolkit computes where things are and what state they are in; the
//! actual pixel work happens behind [`Gfx`], and string resolution behind
//! [`Localize`]. [`DrawLog`] implements both by recording operations into
//! a list, the way a draw-command buffer decouples widget logic from the
//! renderer. Tests and the diagnostic binary inspect that list.

use std::collections::HashMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::colour::Colour;
use crate::geometry::Rect;

/// Opaque localized-string identifier. The toolkit never inspects these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StringId(pub u32);

/// Opaque sprite identifier, resolved by the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteId(pub u32);

/// Opaque cursor-shape identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorId(pub u8);

impl CursorId {
    pub const ARROW: CursorId = CursorId(0);
}

/// Opaque tool identifier (shovel, bulldozer, ...). Meaning belongs to
/// content modules; the toolkit only tracks which one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolId(pub u8);

/// Argument buffer handed to the formatter alongside a [`StringId`].
pub type FmtArgs = SmallVec<[u32; 4]>;

/// Convenience constructor for argument buffers.
pub fn fmt_args(values: &[u32]) -> FmtArgs {
    SmallVec::from_slice(values)
}

bitflags! {
    /// Variants of the 3D-inset fill primitive.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct InsetFlags: u8 {
        /// Skip the border, fill only.
        const BORDER_NONE = 1 << 0;
        /// Skip the fill, border only.
        const FILL_NONE = 1 << 1;
        /// Sunken border (pressed look) instead of raised.
        const PRESSED = 1 << 2;
        /// Fill with the neutral grey ramp instead of the colour's own.
        const FILL_GREY = 1 << 3;
        /// Keep the fill at the base shade rather than lightening it.
        const DONT_LIGHTEN = 1 << 4;
    }
}

/// Text extent queries. Split from [`Gfx`] so layout-only callers (the
/// dropdown auto-sizer) can be handed a measurer without draw access.
pub trait TextMeasure {
    /// Pixel width of an already-formatted string.
    fn string_width(&self, text: &str) -> i32;
}

/// String resolution: id + argument buffer to renderable text.
pub trait Localize {
    fn format(&self, id: StringId, args: &FmtArgs) -> String;
}

/// Primitive drawing operations the rendering collaborator must provide.
pub trait Gfx: TextMeasure {
    /// Flat fill with a raw palette byte.
    fn fill_rect(&mut self, rect: Rect, palette: u8);
    /// 3D-inset box in the given colour.
    fn fill_rect_inset(&mut self, rect: Rect, colour: Colour, flags: InsetFlags);
    /// Sprite draw, optionally remapped into a colour's ramp.
    fn draw_sprite(&mut self, sprite: SpriteId, x: i32, y: i32, remap: Option<Colour>);
    /// Sprite silhouette in a flat palette byte (greyed-out passes).
    fn draw_sprite_silhouette(&mut self, sprite: SpriteId, x: i32, y: i32, palette: u8);
    fn draw_string_left(&mut self, id: StringId, args: &FmtArgs, colour: Colour, x: i32, y: i32);
    /// Draw centred on `cx`.
    fn draw_string_centred(&mut self, id: StringId, args: &FmtArgs, colour: Colour, cx: i32, y: i32);
    /// Draw left-aligned, clipped to `width` pixels.
    fn draw_string_clipped(
        &mut self,
        id: StringId,
        args: &FmtArgs,
        colour: Colour,
        x: i32,
        y: i32,
        width: i32,
    );
    /// Raw text draw, used for live edit buffers and glyph chrome.
    fn draw_text(&mut self, text: &str, colour: Colour, x: i32, y: i32);
}

// ---------------------------------------------------------------------------
// Recording implementation
// ---------------------------------------------------------------------------

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        rect: Rect,
        palette: u8,
    },
    InsetRect {
        rect: Rect,
        colour: Colour,
        flags: InsetFlags,
    },
    Sprite {
        sprite: SpriteId,
        x: i32,
        y: i32,
        remap: Option<Colour>,
    },
    Silhouette {
        sprite: SpriteId,
        x: i32,
        y: i32,
        palette: u8,
    },
    StringLeft {
        id: StringId,
        colour: Colour,
        x: i32,
        y: i32,
    },
    StringCentred {
        id: StringId,
        colour: Colour,
        cx: i32,
        y: i32,
    },
    StringClipped {
        id: StringId,
        colour: Colour,
        x: i32,
        y: i32,
        width: i32,
    },
    Text {
        text: String,
        colour: Colour,
        x: i32,
        y: i32,
    },
}

/// Collects draw calls instead of rasterizing them.
///
/// Widths are estimated from a fixed glyph width; string ids resolve
/// through an optional registry so tests can control formatted text.
pub struct DrawLog {
    pub ops: Vec<DrawOp>,
    pub glyph_width: i32,
    strings: HashMap<StringId, String>,
}

impl DrawLog {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            glyph_width: 8,
            strings: HashMap::new(),
        }
    }

    /// Register the text a [`StringId`] resolves to.
    pub fn define_string(&mut self, id: StringId, text: impl Into<String>) {
        self.strings.insert(id, text.into());
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Count of recorded ops matching a predicate.
    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

impl Default for DrawLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasure for DrawLog {
    fn string_width(&self, text: &str) -> i32 {
        text.chars().count() as i32 * self.glyph_width
    }
}

impl Localize for DrawLog {
    fn format(&self, id: StringId, args: &FmtArgs) -> String {
        let base = match self.strings.get(&id) {
            Some(s) => s.clone(),
            None => format!("string-{}", id.0),
        };
        if args.is_empty() {
            base
        } else {
            let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
            format!("{} {}", base, rendered.join(" "))
        }
    }
}

impl Gfx for DrawLog {
    fn fill_rect(&mut self, rect: Rect, palette: u8) {
        self.ops.push(DrawOp::FillRect { rect, palette });
    }

    fn fill_rect_inset(&mut self, rect: Rect, colour: Colour, flags: InsetFlags) {
        self.ops.push(DrawOp::InsetRect {
            rect,
            colour,
            flags,
        });
    }

    fn draw_sprite(&mut self, sprite: SpriteId, x: i32, y: i32, remap: Option<Colour>) {
        self.ops.push(DrawOp::Sprite {
            sprite,
            x,
            y,
            remap,
        });
    }

    fn draw_sprite_silhouette(&mut self, sprite: SpriteId, x: i32, y: i32, palette: u8) {
        self.ops.push(DrawOp::Silhouette {
            sprite,
            x,
            y,
            palette,
        });
    }

    fn draw_string_left(&mut self, id: StringId, _args: &FmtArgs, colour: Colour, x: i32, y: i32) {
        self.ops.push(DrawOp::StringLeft { id, colour, x, y });
    }

    fn draw_string_centred(
        &mut self,
        id: StringId,
        _args: &FmtArgs,
        colour: Colour,
        cx: i32,
        y: i32,
    ) {
        self.ops.push(DrawOp::StringCentred { id, colour, cx, y });
    }

    fn draw_string_clipped(
        &mut self,
        id: StringId,
        _args: &FmtArgs,
        colour: Colour,
        x: i32,
        y: i32,
        width: i32,
    ) {
        self.ops.push(DrawOp::StringClipped {
            id,
            colour,
            x,
            y,
            width,
        });
    }

    fn draw_text(&mut self, text: &str, colour: Colour, x: i32, y: i32) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            colour,
            x,
            y,
        });
    }
}
