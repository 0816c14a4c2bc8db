//! Retained-mode windowing and widget toolkit core.
//!
//! A fixed pool of windows with an explicit z-order ([`shell`]), a
//! per-window-class handler table ([`events`]), a fixed widget catalogue
//! rendered through an injected drawing collaborator ([`widget`],
//! [`draw`], [`gfx`]), pixel-exact scrollbar geometry ([`scroll`]),
//! modal dropdown menus ([`dropdown`]), and a single interaction-state
//! object threaded through every dispatch ([`interaction`]).
//!
//! Rasterization, string formatting and all window content stay outside:
//! content modules supply widget arrays and handler tables, a renderer
//! supplies the [`gfx::Gfx`] primitives.

pub mod colour;
pub mod demo;
pub mod draw;
pub mod dropdown;
pub mod events;
pub mod geometry;
pub mod gfx;
pub mod input;
pub mod interaction;
pub mod scroll;
pub mod shell;
pub mod widget;
pub mod window;

pub use events::{EventCtx, WindowEvents};
pub use geometry::{Point, Rect, Size};
pub use interaction::{InteractionState, WidgetRef};
pub use shell::{CreateError, Shell, WindowId};
pub use widget::{Widget, WidgetContent, WidgetIndex, WidgetKind, WidgetSet};
pub use window::{Window, WindowClass, WindowDesc, WindowFlags, WindowIdentity};
