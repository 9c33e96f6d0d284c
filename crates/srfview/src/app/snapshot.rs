//! On-demand PNG export of the current view.
//!
//! A [`SnapshotRequested`] message makes the next rendered frame of the
//! primary window land on disk next to the source file, with the extension
//! swapped for `.png`. Export failures are reported and never end the
//! session.

use crate::lib::viewer::ViewerState;
use bevy::prelude::*;
use bevy::render::view::screenshot::{Screenshot, ScreenshotCaptured};
use std::path::{Path, PathBuf};

/// Emitted by the input dispatcher when the user asks for a snapshot.
#[derive(Message)]
pub struct SnapshotRequested;

pub struct SnapshotPlugin;

impl Plugin for SnapshotPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SnapshotRequested>()
            .add_systems(Update, trigger_snapshots);
    }
}

/// The snapshot keeps the source file's base name: `trench.srf` →
/// `trench.png`.
pub fn snapshot_path(source: &Path) -> PathBuf {
    source.with_extension("png")
}

fn trigger_snapshots(
    mut commands: Commands,
    mut requests: MessageReader<SnapshotRequested>,
    state: Res<ViewerState>,
) {
    for _ in requests.read() {
        let path = snapshot_path(state.source_path());
        info!("Saving snapshot to {:?}", path);
        commands
            .spawn(Screenshot::primary_window())
            .observe(save_captured(path));
    }
}

/// Observer that writes a captured screenshot to `path`.
fn save_captured(path: PathBuf) -> impl FnMut(On<ScreenshotCaptured>) {
    move |captured: On<ScreenshotCaptured>| {
        let image = captured.event().image.clone();
        match image.try_into_dynamic() {
            Ok(image) => {
                if let Err(err) = image.save(&path) {
                    error!("Failed to write snapshot {:?}: {}", path, err);
                } else {
                    info!("Snapshot written to {:?}", path);
                }
            }
            Err(err) => error!("Failed to convert screenshot for {:?}: {}", path, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_keeps_the_base_name() {
        assert_eq!(
            snapshot_path(Path::new("trench.srf")),
            PathBuf::from("trench.png")
        );
        assert_eq!(
            snapshot_path(Path::new("trench.srf_save")),
            PathBuf::from("trench.png")
        );
        assert_eq!(
            snapshot_path(Path::new("runs/etch_100.srf")),
            PathBuf::from("runs/etch_100.png")
        );
    }
}
