//! Diagnostic tool for the windowing toolkit. Opens the demo window
//! headlessly, synthesises a short input session, runs a frame, and
//! dumps the recorded draw log.
//!
//! Usage: cargo run --bin widget_diag

use casement::colour::ShadeTable;
use casement::demo::{self, WIDGET_CHECKBOX};
use casement::geometry::Size;
use casement::gfx::DrawLog;
use casement::input::InputRouter;
use casement::interaction::InteractionState;
use casement::shell::Shell;

fn main() {
    env_logger::init();

    let mut shell = Shell::new(Size::new(640, 480));
    let mut interaction = InteractionState::new();
    let mut input = InputRouter::new();

    let id = match demo::open_demo(&mut shell, &mut interaction) {
        Ok(id) => id,
        Err(err) => {
            eprintln!("demo window failed to open: {err}");
            return;
        }
    };

    // Click the checkbox.
    let click = shell
        .get(id)
        .and_then(|w| {
            w.widget(WIDGET_CHECKBOX)
                .map(|widget| widget.bounds.translated(w.pos.x, w.pos.y))
        })
        .map(|b| (b.x + b.width / 2, b.y + b.height / 2));
    if let Some((x, y)) = click {
        input.cursor_move(&mut shell, &mut interaction, x, y);
        input.mouse_down(&mut shell, &mut interaction, x, y);
        input.mouse_up(&mut shell, &mut interaction, x, y);
    }

    shell.update(&mut interaction);

    let mut log = DrawLog::new();
    shell.draw(&mut interaction, &mut log, &ShadeTable::BUILTIN);

    println!("windows open: {}", shell.len());
    println!(
        "checkbox checked: {}",
        shell.get(id).is_some_and(|w| w.is_pressed(WIDGET_CHECKBOX))
    );
    println!("dirty rects this frame: {}", shell.take_dirty_rects().len());
    println!("draw ops: {}", log.ops.len());
    for op in log.ops.iter().take(48) {
        println!("  {op:?}");
    }
    if log.ops.len() > 48 {
        println!("  ... {} more", log.ops.len() - 48);
    }
}
