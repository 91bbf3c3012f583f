use tokio::sync::broadcast;

pub type ShutdownSender = broadcast::Sender<()>;
pub type ShutdownReceiver = broadcast::Receiver<()>;

#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    broadcast::channel(4)
}

/// Broadcasts shutdown on Ctrl+C. Raw-mode terminals deliver Ctrl+C as a key
/// press instead, which the key reader handles.
pub fn spawn_ctrl_c_handler(shutdown_tx: &ShutdownSender) -> tokio::task::JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C; stopping.");
            shutdown_tx.send(()).ok();
        }
    })
}
