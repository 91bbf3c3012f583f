use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use tokio::sync::watch;

use crate::error::AppResult;
use crate::replay::ReplayController;
use crate::shutdown::{shutdown_channel, spawn_ctrl_c_handler};
use crate::ui::{UiData, setup_render_ui};

use super::keys::{apply_command, command_for_key};

/// Host frame cadence; the clock itself coalesces frames below its minimum
/// tick.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// Non-blocking poll interval for keyboard events.
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(0);

/// Runs the interactive terminal player until the operator quits.
pub(crate) async fn run_player(
    mut controller: ReplayController,
    step: Duration,
    no_color: bool,
) -> AppResult<()> {
    let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
    let ctrl_c_handle = spawn_ctrl_c_handler(&shutdown_tx);
    let (ui_tx, _) = watch::channel(UiData::from_controller(&controller, no_color));
    let render_ui_handle = setup_render_ui(&shutdown_tx, &ui_tx);

    controller.play();
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = async {
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = frames.tick() => {}
            }

            let mut keep_running = true;
            while keep_running && event::poll(EVENT_POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()?
                    && let Some(command) = command_for_key(key)
                {
                    keep_running = apply_command(&mut controller, command, step);
                }
            }
            if !keep_running {
                break;
            }

            controller.tick(Instant::now());
            ui_tx.send_replace(UiData::from_controller(&controller, no_color));
        }
        Ok::<(), crate::error::AppError>(())
    }
    .await;

    drop(shutdown_tx.send(()));
    ctrl_c_handle.abort();
    if let Err(err) = render_ui_handle.await {
        eprintln!("Player UI task failed: {}", err);
    }
    result
}
