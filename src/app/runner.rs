use std::io::{self, IsTerminal};
use std::sync::Arc;

use crate::args::ReplayArgs;
use crate::error::{AppError, AppResult, ValidationError};
use crate::replay::ReplayController;
use crate::source::{DataSource, OpenF1Source, RecordedSource};

use super::headless::run_headless;
use super::player::run_player;

pub(crate) async fn run_replay(args: &ReplayArgs) -> AppResult<()> {
    let (source, session_key) = build_source(args)?;
    let mut controller = ReplayController::load(source, session_key, args.replay_config()).await?;
    prepare(&mut controller, args);

    if args.no_ui || !io::stdout().is_terminal() {
        return run_headless(controller).await;
    }
    run_player(controller, args.step, args.no_color).await
}

pub(super) fn build_source(args: &ReplayArgs) -> AppResult<(Arc<dyn DataSource>, u32)> {
    match (args.data_dir.as_ref(), args.session_key) {
        (Some(_), Some(_)) => Err(AppError::validation(
            ValidationError::SessionKeyDataDirConflict,
        )),
        (Some(dir), None) => {
            let recorded = RecordedSource::load_dir(dir)?;
            let session_key = recorded.session().session_key;
            tracing::info!("Replaying recording {}.", dir.display());
            Ok((Arc::new(recorded), session_key))
        }
        (None, Some(session_key)) => {
            let source = OpenF1Source::new(&args.base_url, args.timeout)?;
            Ok((Arc::new(source), session_key))
        }
        (None, None) => {
            tracing::error!("Missing session (set --session-key or --data-dir).");
            Err(AppError::validation(ValidationError::MissingSession))
        }
    }
}

/// Applies the start offset, speed, and focus requested on the command line.
pub(super) fn prepare(controller: &mut ReplayController, args: &ReplayArgs) {
    controller.set_speed(args.speed);
    if !args.start.is_zero() {
        let start_ms = u64::try_from(args.start.as_millis()).unwrap_or(u64::MAX);
        controller.seek(controller.session().start_ms.saturating_add(start_ms));
    }
    if let Some(driver_number) = args.focus {
        if controller.session().driver(driver_number).is_none()
            && !controller.session().drivers.is_empty()
        {
            tracing::warn!("Driver {} is not listed for this session.", driver_number);
        }
        controller.select_focus(Some(driver_number));
    }
}
