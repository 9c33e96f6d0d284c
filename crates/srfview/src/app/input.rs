//! Key-event dispatch for the viewer window.
//!
//! The dispatcher is a pure mapping from a key press to a state mutation and
//! a redraw decision; the mapping is intentionally asymmetric. Navigation
//! and axis toggles repaint immediately, while direction, overlay mode and
//! step size only become visible on the next navigation key.

use crate::app::plot::{PlotExtent, RedrawRequested};
use crate::app::snapshot::SnapshotRequested;
use crate::lib::viewer::ViewerState;
use bevy::prelude::*;
use bevy_egui::EguiContexts;

pub struct ViewerInputPlugin;

impl Plugin for ViewerInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, dispatch_key_input);
    }
}

/// Everything a single key press can do to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerCommand {
    /// Step by the current step size in the travel direction.
    Advance,
    JumpFirst,
    JumpLast,
    ToggleAspect,
    ToggleBounds,
    ToggleDirection,
    ToggleCumulative,
    /// Use a step size of `2^n` surfaces.
    SetStepExponent(u32),
    SaveSnapshot,
    Quit,
}

impl ViewerCommand {
    /// Whether the command repaints immediately. Direction, overlay mode and
    /// step size changes only take effect on the next navigation key.
    pub fn triggers_redraw(self) -> bool {
        matches!(
            self,
            ViewerCommand::Advance
                | ViewerCommand::JumpFirst
                | ViewerCommand::JumpLast
                | ViewerCommand::ToggleAspect
                | ViewerCommand::ToggleBounds
        )
    }
}

/// The complete key binding table. Anything not listed here is ignored.
pub fn command_for_key(key: KeyCode) -> Option<ViewerCommand> {
    let command = match key {
        KeyCode::Space => ViewerCommand::Advance,
        KeyCode::KeyF => ViewerCommand::JumpFirst,
        KeyCode::KeyL => ViewerCommand::JumpLast,
        KeyCode::KeyA => ViewerCommand::ToggleAspect,
        KeyCode::KeyB => ViewerCommand::ToggleBounds,
        KeyCode::KeyR => ViewerCommand::ToggleDirection,
        KeyCode::KeyD => ViewerCommand::ToggleCumulative,
        KeyCode::KeyS => ViewerCommand::SaveSnapshot,
        KeyCode::KeyQ => ViewerCommand::Quit,
        KeyCode::Digit0 | KeyCode::Numpad0 => ViewerCommand::SetStepExponent(0),
        KeyCode::Digit1 | KeyCode::Numpad1 => ViewerCommand::SetStepExponent(1),
        KeyCode::Digit2 | KeyCode::Numpad2 => ViewerCommand::SetStepExponent(2),
        KeyCode::Digit3 | KeyCode::Numpad3 => ViewerCommand::SetStepExponent(3),
        KeyCode::Digit4 | KeyCode::Numpad4 => ViewerCommand::SetStepExponent(4),
        KeyCode::Digit5 | KeyCode::Numpad5 => ViewerCommand::SetStepExponent(5),
        KeyCode::Digit6 | KeyCode::Numpad6 => ViewerCommand::SetStepExponent(6),
        KeyCode::Digit7 | KeyCode::Numpad7 => ViewerCommand::SetStepExponent(7),
        KeyCode::Digit8 | KeyCode::Numpad8 => ViewerCommand::SetStepExponent(8),
        KeyCode::Digit9 | KeyCode::Numpad9 => ViewerCommand::SetStepExponent(9),
        _ => return None,
    };
    Some(command)
}

/// System that turns key presses into state mutations and follow-up messages.
pub fn dispatch_key_input(
    mut contexts: EguiContexts,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<ViewerState>,
    extent: Res<PlotExtent>,
    mut redraws: MessageWriter<RedrawRequested>,
    mut snapshots: MessageWriter<SnapshotRequested>,
    mut exit: MessageWriter<AppExit>,
) {
    // Don't fight egui widgets for the keyboard.
    if let Ok(ctx) = contexts.ctx_mut() {
        if ctx.wants_keyboard_input() {
            return;
        }
    }

    for key in keyboard.get_just_pressed() {
        let Some(command) = command_for_key(*key) else {
            continue;
        };

        match command {
            ViewerCommand::Advance => state.advance(),
            ViewerCommand::JumpFirst => state.jump_first(),
            ViewerCommand::JumpLast => state.jump_last(),
            ViewerCommand::ToggleAspect => state.toggle_aspect(),
            ViewerCommand::ToggleBounds => state.toggle_bounds((extent.y_min, extent.y_max)),
            ViewerCommand::ToggleDirection => state.toggle_direction(),
            ViewerCommand::ToggleCumulative => state.toggle_cumulative(),
            ViewerCommand::SetStepExponent(exponent) => state.set_step_exponent(exponent),
            ViewerCommand::SaveSnapshot => {
                snapshots.write(SnapshotRequested);
            }
            ViewerCommand::Quit => {
                exit.write(AppExit::Success);
            }
        }

        if command.triggers_redraw() {
            redraws.write(RedrawRequested);
        }
    }
}
