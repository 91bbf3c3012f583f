use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::replay::ReplayController;

/// Operator actions the player understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayerCommand {
    TogglePlay,
    StepBack,
    StepForward,
    SeekStart,
    SeekEnd,
    Faster,
    Slower,
    NextFocus,
    PreviousFocus,
    ClearFocus,
    Quit,
}

pub(crate) fn command_for_key(key: KeyEvent) -> Option<PlayerCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(PlayerCommand::Quit);
    }
    match key.code {
        KeyCode::Char(' ') => Some(PlayerCommand::TogglePlay),
        KeyCode::Left | KeyCode::Char('h') => Some(PlayerCommand::StepBack),
        KeyCode::Right | KeyCode::Char('l') => Some(PlayerCommand::StepForward),
        KeyCode::Home => Some(PlayerCommand::SeekStart),
        KeyCode::End => Some(PlayerCommand::SeekEnd),
        KeyCode::Char('+' | '=') | KeyCode::Up => Some(PlayerCommand::Faster),
        KeyCode::Char('-') | KeyCode::Down => Some(PlayerCommand::Slower),
        KeyCode::Char('f') | KeyCode::Tab => Some(PlayerCommand::NextFocus),
        KeyCode::Char('F') | KeyCode::BackTab => Some(PlayerCommand::PreviousFocus),
        KeyCode::Char('n') => Some(PlayerCommand::ClearFocus),
        KeyCode::Char('q') | KeyCode::Esc => Some(PlayerCommand::Quit),
        KeyCode::Backspace
        | KeyCode::Enter
        | KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::Delete
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Char(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => None,
    }
}

/// Applies one command; returns `false` when the player should stop.
pub(crate) fn apply_command(
    controller: &mut ReplayController,
    command: PlayerCommand,
    step: Duration,
) -> bool {
    match command {
        PlayerCommand::TogglePlay => {
            controller.toggle();
        }
        PlayerCommand::StepBack => {
            controller.step(step, false);
        }
        PlayerCommand::StepForward => {
            controller.step(step, true);
        }
        PlayerCommand::SeekStart => {
            controller.seek(controller.session().start_ms);
        }
        PlayerCommand::SeekEnd => {
            controller.seek(controller.session().end_ms);
        }
        PlayerCommand::Faster => {
            controller.cycle_speed(true);
        }
        PlayerCommand::Slower => {
            controller.cycle_speed(false);
        }
        PlayerCommand::NextFocus => {
            controller.cycle_focus(true);
        }
        PlayerCommand::PreviousFocus => {
            controller.cycle_focus(false);
        }
        PlayerCommand::ClearFocus => controller.select_focus(None),
        PlayerCommand::Quit => return false,
    }
    true
}
