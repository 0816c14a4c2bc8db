//! Scroll geometry: thumb placement and hit classification for the two
//! scrollbars a scroll widget can carry.
//!
//! The arithmetic is integer throughout. Thumb positions use floor
//! division on purpose — the truncation is what the classic scrollbar
//! look is defined by, so it must not be "fixed" to rounded division.

use bitflags::bitflags;

use crate::geometry::{Rect, Size};

/// Thickness of a scrollbar strip.
pub const BAR_SIZE: i32 = 11;
/// Length of an arrow button within a strip.
pub const BUTTON_SIZE: i32 = 10;
/// Pixels subtracted from the widget span to get the usable track.
pub const TRACK_INSET: i32 = 21;
/// Local coordinate where the thumb range begins.
pub const THUMB_ORIGIN: i32 = 11;

bitflags! {
    /// Visibility plus per-part pressed state for one scroll area.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ScrollFlags: u16 {
        const H_VISIBLE = 1 << 0;
        const H_THUMB_PRESSED = 1 << 1;
        const H_LEFT_PRESSED = 1 << 2;
        const H_RIGHT_PRESSED = 1 << 3;
        const V_VISIBLE = 1 << 4;
        const V_THUMB_PRESSED = 1 << 5;
        const V_UP_PRESSED = 1 << 6;
        const V_DOWN_PRESSED = 1 << 7;
    }
}

/// Per-widget scroll state: visibility flags, content extents, offsets,
/// and the derived thumb bounds. Thumbs are never set directly — they are
/// recomputed from the extents by [`update_thumbs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollArea {
    pub flags: ScrollFlags,
    pub content_width: i32,
    pub content_height: i32,
    pub offset_x: i32,
    pub offset_y: i32,
    /// Horizontal thumb start/end, widget-local.
    pub h_thumb: (i32, i32),
    /// Vertical thumb start/end, widget-local.
    pub v_thumb: (i32, i32),
}

impl ScrollArea {
    pub const EMPTY: ScrollArea = ScrollArea {
        flags: ScrollFlags::empty(),
        content_width: 0,
        content_height: 0,
        offset_x: 0,
        offset_y: 0,
        h_thumb: (0, 0),
        v_thumb: (0, 0),
    };

    pub const fn with_flags(flags: ScrollFlags) -> ScrollArea {
        let mut area = ScrollArea::EMPTY;
        area.flags = flags;
        area
    }

    /// Visible content extent inside `widget`, after borders and bars.
    pub fn viewport(&self, widget: Rect) -> Size {
        let mut w = widget.width - 2;
        let mut h = widget.height - 2;
        if self.flags.contains(ScrollFlags::V_VISIBLE) {
            w -= BAR_SIZE;
        }
        if self.flags.contains(ScrollFlags::H_VISIBLE) {
            h -= BAR_SIZE;
        }
        Size::new(w.max(0), h.max(0))
    }

    /// Scroll by a delta, clamped so the view never leaves the content.
    pub fn scroll_by(&mut self, widget: Rect, dx: i32, dy: i32) {
        let view = self.viewport(widget);
        let max_x = (self.content_width - view.width).max(0);
        let max_y = (self.content_height - view.height).max(0);
        self.offset_x = (self.offset_x + dx).clamp(0, max_x);
        self.offset_y = (self.offset_y + dy).clamp(0, max_y);
    }

    pub fn clear_pressed(&mut self) {
        self.flags &= ScrollFlags::H_VISIBLE | ScrollFlags::V_VISIBLE;
    }
}

/// Where a point inside a scroll widget landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollHit {
    None,
    /// Inside the content view, in content coordinates.
    View { x: i32, y: i32 },
    HLeft,
    HTroughLeft,
    HThumb,
    HTroughRight,
    HRight,
    VUp,
    VTroughUp,
    VThumb,
    VTroughDown,
    VDown,
}

/// Thumb bounds along one axis.
///
/// `track` is the usable track length, `left` the content offset,
/// `visible` the visible content extent and `total` the full content
/// extent. Both results lie in `[THUMB_ORIGIN, track + 10]` and are
/// monotonic in `left`.
pub fn thumb_span(track: i32, left: i32, visible: i32, total: i32) -> (i32, i32) {
    let track = track.max(0);
    if total <= 0 {
        return (THUMB_ORIGIN, THUMB_ORIGIN);
    }
    let start = THUMB_ORIGIN + left * track / total;
    let mut end = THUMB_ORIGIN + (left + visible) * track / total;
    let limit = track + 10;
    if end > limit {
        end = limit;
    }
    if end < start {
        end = start;
    }
    (start, end)
}

/// Recompute both thumbs for `area` from its extents and the widget
/// rectangle. Call after the content-size query and before drawing or
/// hit-testing the bars; stale thumbs misclassify trough clicks.
pub fn update_thumbs(area: &mut ScrollArea, widget: Rect) {
    let h = area.flags.contains(ScrollFlags::H_VISIBLE);
    let v = area.flags.contains(ScrollFlags::V_VISIBLE);
    let view = area.viewport(widget);

    area.h_thumb = if h {
        let mut track = widget.width - TRACK_INSET;
        if v {
            track -= BAR_SIZE;
        }
        thumb_span(track, area.offset_x, view.width, area.content_width)
    } else {
        (0, 0)
    };

    area.v_thumb = if v {
        let mut track = widget.height - TRACK_INSET;
        if h {
            track -= BAR_SIZE;
        }
        thumb_span(track, area.offset_y, view.height, area.content_height)
    } else {
        (0, 0)
    };
}

/// Classify a window-local point within a scroll widget.
///
/// Calling this with a point outside the widget bounds is a precondition
/// violation; release builds answer [`ScrollHit::None`].
pub fn classify_point(widget: Rect, area: &ScrollArea, x: i32, y: i32) -> ScrollHit {
    debug_assert!(
        widget.contains(x, y),
        "scroll hit query outside widget bounds"
    );
    if !widget.contains(x, y) {
        return ScrollHit::None;
    }

    let h = area.flags.contains(ScrollFlags::H_VISIBLE);
    let v = area.flags.contains(ScrollFlags::V_VISIBLE);

    if h && y >= widget.bottom() - BAR_SIZE {
        // Corner square shared with the vertical bar belongs to neither.
        if v && x >= widget.right() - BAR_SIZE {
            return ScrollHit::None;
        }
        let rel = x - widget.x;
        if rel < BUTTON_SIZE {
            return ScrollHit::HLeft;
        }
        let strip = widget.width - if v { BAR_SIZE } else { 0 };
        if rel >= strip - BUTTON_SIZE {
            return ScrollHit::HRight;
        }
        let (t0, t1) = area.h_thumb;
        return if rel < t0 {
            ScrollHit::HTroughLeft
        } else if rel > t1 {
            ScrollHit::HTroughRight
        } else {
            ScrollHit::HThumb
        };
    }

    if v && x >= widget.right() - BAR_SIZE {
        let rel = y - widget.y;
        if rel < BUTTON_SIZE {
            return ScrollHit::VUp;
        }
        let strip = widget.height - if h { BAR_SIZE } else { 0 };
        if rel >= strip - BUTTON_SIZE {
            return ScrollHit::VDown;
        }
        let (t0, t1) = area.v_thumb;
        return if rel < t0 {
            ScrollHit::VTroughUp
        } else if rel > t1 {
            ScrollHit::VTroughDown
        } else {
            ScrollHit::VThumb
        };
    }

    // Content view. Skip the 1px border; a point exactly on it is no hit.
    let cx = x - widget.x - 1;
    let cy = y - widget.y - 1;
    if cx < 0 || cy < 0 {
        return ScrollHit::None;
    }
    ScrollHit::View {
        x: cx + area.offset_x,
        y: cy + area.offset_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area_hv(content_w: i32, content_h: i32) -> ScrollArea {
        let mut area = ScrollArea::with_flags(ScrollFlags::H_VISIBLE | ScrollFlags::V_VISIBLE);
        area.content_width = content_w;
        area.content_height = content_h;
        area
    }

    #[test]
    fn thumb_span_worked_example() {
        // Widget width 200, no vertical bar: track = 179. Content 400,
        // offset 100, visible 50.
        assert_eq!(thumb_span(179, 100, 50, 400), (55, 78));
    }

    #[test]
    fn thumb_span_zero_content() {
        assert_eq!(thumb_span(179, 0, 50, 0), (THUMB_ORIGIN, THUMB_ORIGIN));
    }

    #[test]
    fn thumb_span_full_content_clamps_to_track_end() {
        let (start, end) = thumb_span(179, 0, 400, 400);
        assert_eq!(start, THUMB_ORIGIN);
        assert_eq!(end, 189);
    }

    #[test]
    fn thumb_span_is_monotonic_and_bounded() {
        let track = 147;
        let total = 1000;
        let visible = 220;
        let mut prev = (0, 0);
        for left in 0..=(total - visible) {
            let (start, end) = thumb_span(track, left, visible, total);
            assert!(start <= end, "start {start} > end {end} at left {left}");
            assert!(start >= THUMB_ORIGIN);
            assert!(end <= track + 10);
            if left > 0 {
                assert!(start >= prev.0, "start regressed at left {left}");
                assert!(end >= prev.1, "end regressed at left {left}");
            }
            prev = (start, end);
        }
    }

    #[test]
    fn update_thumbs_narrows_track_for_crossing_bar() {
        let widget = Rect::new(0, 0, 200, 100);
        let mut both = area_hv(400, 400);
        update_thumbs(&mut both, widget);

        let mut h_only = ScrollArea::with_flags(ScrollFlags::H_VISIBLE);
        h_only.content_width = 400;
        update_thumbs(&mut h_only, widget);

        // The vertical bar steals 11px of horizontal track.
        assert!(both.h_thumb.1 < h_only.h_thumb.1);
        assert_eq!(h_only.h_thumb, thumb_span(179, 0, 198, 400));
        assert_eq!(both.h_thumb, thumb_span(168, 0, 187, 400));
    }

    #[test]
    fn classify_buttons_and_troughs() {
        let widget = Rect::new(0, 0, 200, 100);
        let mut area = area_hv(400, 400);
        area.offset_x = 100;
        area.offset_y = 100;
        update_thumbs(&mut area, widget);

        let strip_y = widget.bottom() - 1;
        assert_eq!(classify_point(widget, &area, 0, strip_y), ScrollHit::HLeft);
        assert_eq!(classify_point(widget, &area, 9, strip_y), ScrollHit::HLeft);
        // Last 10px of the strip (before the vertical-bar corner).
        assert_eq!(
            classify_point(widget, &area, 188, strip_y),
            ScrollHit::HRight
        );
        // Corner shared with the vertical bar hits nothing.
        assert_eq!(classify_point(widget, &area, 195, strip_y), ScrollHit::None);

        let (t0, t1) = area.h_thumb;
        assert_eq!(
            classify_point(widget, &area, t0 - 1, strip_y),
            ScrollHit::HTroughLeft
        );
        assert_eq!(classify_point(widget, &area, t0, strip_y), ScrollHit::HThumb);
        assert_eq!(classify_point(widget, &area, t1, strip_y), ScrollHit::HThumb);
        assert_eq!(
            classify_point(widget, &area, t1 + 1, strip_y),
            ScrollHit::HTroughRight
        );

        let strip_x = widget.right() - 1;
        assert_eq!(classify_point(widget, &area, strip_x, 0), ScrollHit::VUp);
        assert_eq!(classify_point(widget, &area, strip_x, 79), ScrollHit::VDown);
    }

    #[test]
    fn classify_view_converts_to_content_coordinates() {
        let widget = Rect::new(10, 20, 200, 100);
        let mut area = area_hv(400, 400);
        area.offset_x = 30;
        area.offset_y = 40;
        update_thumbs(&mut area, widget);

        // Border pixel is no hit.
        assert_eq!(classify_point(widget, &area, 10, 50), ScrollHit::None);
        assert_eq!(classify_point(widget, &area, 50, 20), ScrollHit::None);
        // One past the border maps to content origin plus offset.
        assert_eq!(
            classify_point(widget, &area, 11, 21),
            ScrollHit::View { x: 30, y: 40 }
        );
        assert_eq!(
            classify_point(widget, &area, 60, 50),
            ScrollHit::View { x: 79, y: 69 }
        );
    }

    #[test]
    fn every_inside_point_classifies() {
        let widget = Rect::new(0, 0, 80, 60);
        let mut area = area_hv(300, 300);
        update_thumbs(&mut area, widget);

        let mut views = 0;
        let mut parts = 0;
        let mut none = 0;
        for y in 0..60 {
            for x in 0..80 {
                match classify_point(widget, &area, x, y) {
                    ScrollHit::View { .. } => views += 1,
                    ScrollHit::None => none += 1,
                    _ => parts += 1,
                }
            }
        }
        assert!(views > 0);
        assert!(parts > 0);
        // None only on the view-region border lines and the shared corner.
        let border = (60 - BAR_SIZE) + (80 - BAR_SIZE) - 1;
        let corner = BAR_SIZE * BAR_SIZE;
        assert_eq!(none, (border + corner) as usize);
    }

    #[test]
    fn scroll_by_clamps_to_content() {
        let widget = Rect::new(0, 0, 100, 100);
        let mut area = area_hv(300, 150);
        area.scroll_by(widget, -50, 20);
        assert_eq!(area.offset_x, 0);
        assert_eq!(area.offset_y, 20);
        area.scroll_by(widget, 1000, 1000);
        let view = area.viewport(widget);
        assert_eq!(area.offset_x, 300 - view.width);
        assert_eq!(area.offset_y, 150 - view.height);
    }

    #[test]
    fn clear_pressed_keeps_visibility() {
        let mut area = ScrollArea::with_flags(
            ScrollFlags::H_VISIBLE | ScrollFlags::V_VISIBLE | ScrollFlags::H_THUMB_PRESSED,
        );
        area.clear_pressed();
        assert_eq!(
            area.flags,
            ScrollFlags::H_VISIBLE | ScrollFlags::V_VISIBLE
        );
    }
}
