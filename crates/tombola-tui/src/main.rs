#![forbid(unsafe_code)]

//! Tombola: a wheel of choices for the terminal.
//!
//! The frame loop polls input with a frame-interval timeout, feeds
//! measured elapsed time into the engine, and redraws only when
//! something changed.

mod app;
mod companion;
mod terminal;
mod theme;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::size;

use tombola_runtime::storage::{FileStore, Storage};

use crate::app::App;
use crate::terminal::TerminalGuard;

/// Input poll timeout; also the frame cadence (~30 fps).
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

fn main() -> io::Result<()> {
    init_tracing();

    let storage = Storage::new(Box::new(FileStore::default_location()));
    let mut app = App::new(storage);

    terminal::install_panic_hook();
    let guard = TerminalGuard::enter()?;
    let result = run(&mut app);
    drop(guard);

    app.on_exit();
    result
}

fn run(app: &mut App) -> io::Result<()> {
    let mut out = io::stdout();
    let mut last = Instant::now();

    while app.running {
        if event::poll(FRAME_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => app.handle_key(key),
                Event::Resize(_, _) => app.mark_dirty(),
                _ => {}
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last);
        last = now;
        app.tick(dt, now);

        if app.take_dirty() {
            let bell = app.take_bell();
            let (cols, rows) = size()?;
            ui::draw(&mut out, app, bell, cols, rows)?;
        }
    }
    Ok(())
}

/// Log to a file when `TOMBOLA_LOG` is set (e.g. `TOMBOLA_LOG=debug`).
/// Writing logs to stdout would corrupt the alternate screen.
fn init_tracing() {
    let Ok(filter) = std::env::var("TOMBOLA_LOG") else {
        return;
    };
    let Ok(file) = std::fs::File::create("tombola.log") else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
}
