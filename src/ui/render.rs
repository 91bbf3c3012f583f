mod dashboard;
mod frame;
mod panels;
mod theme;

use tokio::sync::watch;

use crate::shutdown::ShutdownSender;

use super::model::UiData;

pub use dashboard::{Ui, UiActions, UiTerminal};
pub use frame::draw_frame;

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        Ui::cleanup();
    }
}

/// Redraws whenever `ui_tx` publishes a new frame, until shutdown.
#[must_use]
pub fn setup_render_ui(
    shutdown_tx: &ShutdownSender,
    ui_tx: &watch::Sender<UiData>,
) -> tokio::task::JoinHandle<()> {
    let mut ui_rx = ui_tx.subscribe();
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        let mut terminal = match Ui::setup_terminal() {
            Ok(terminal) => terminal,
            Err(err) => {
                eprintln!("Failed to setup terminal: {}", err);
                return;
            }
        };
        let _guard = TerminalGuard;

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                res = ui_rx.changed() => {
                    if res.is_err() {
                        break;
                    }
                    let data = ui_rx.borrow_and_update().clone();
                    Ui::render(&mut terminal, &data);
                }
            }
        }
    })
}
