use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use std::path::PathBuf;

use srfview::app::cli::{Args, DEFAULT_SURFACE_FILE};
use srfview::app::input::ViewerInputPlugin;
use srfview::app::plot::PlotPanelPlugin;
use srfview::app::snapshot::SnapshotPlugin;
use srfview::lib::srf::FrameSet;
use srfview::lib::viewer::ViewerState;

fn main() {
    // Parse command line arguments
    let args = Args::parse_args();

    let path = match args.path {
        Some(path) => path,
        None => {
            eprintln!("srfview: no file specified, using default '{DEFAULT_SURFACE_FILE}'");
            PathBuf::from(DEFAULT_SURFACE_FILE)
        }
    };

    // A malformed file must abort before any window opens.
    let frames = match FrameSet::parse(&path) {
        Ok(frames) => frames,
        Err(err) => {
            eprintln!("srfview: {err}");
            std::process::exit(1);
        }
    };

    let reference = match args.reference.as_deref() {
        Some(reference_path) => match FrameSet::parse(reference_path) {
            Ok(frames) => Some(frames),
            Err(err) => {
                eprintln!("srfview: {err}");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Surfaces: 2D-Plot".to_string(),
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    level: log_level,
                    ..default()
                }),
        )
        .insert_resource(ViewerState::new(path, frames, reference))
        .add_plugins((PlotPanelPlugin, ViewerInputPlugin, SnapshotPlugin))
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
