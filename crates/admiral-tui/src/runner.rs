//! Main TUI runner - entry point and event loop

use tokio::sync::mpsc;

use admiral_app::message::Message;
use admiral_app::Engine;
use admiral_core::prelude::*;

use crate::{event, render, terminal};

/// Run the TUI application around a prepared engine.
pub async fn run(mut engine: Engine) -> Result<()> {
    // Install panic hook for terminal restoration
    terminal::install_panic_hook();

    // SIGINT outside the key loop (e.g. while redrawing) still quits
    spawn_signal_handler(engine.msg_tx.clone());

    let mut term = ratatui::init();

    // Kick off the connect task; views stay gated until it reports ready
    engine.start();

    let result = run_loop(&mut term, &mut engine);

    engine.shutdown();
    ratatui::restore();
    result
}

/// Send `Message::Quit` when Ctrl+C arrives as a signal.
fn spawn_signal_handler(msg_tx: mpsc::Sender<Message>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = msg_tx.send(Message::Quit).await;
        }
    });
}

/// Main event loop: drain messages, render, poll the terminal.
fn run_loop(terminal: &mut ratatui::DefaultTerminal, engine: &mut Engine) -> Result<()> {
    while !engine.should_quit() {
        // Process messages from background tasks (refreshes, results, bus)
        while let Some(msg) = engine.try_recv() {
            engine.process_message(msg);
        }

        // Render
        terminal.draw(|frame| render::view(frame, &engine.state))?;

        // Handle terminal events (50ms poll; timeouts become ticks)
        if let Some(message) = event::poll()? {
            engine.process_message(message);
        }
    }

    info!("quit requested, leaving event loop");
    Ok(())
}
