//! Navigation and rendering-mode state for one viewing session.
//!
//! The state is created once after parsing and lives as a single Bevy
//! resource. The input dispatcher is the only writer of the navigation
//! fields; the plot panel owns the drawn epoch via [`ViewerState::refresh_epoch`].

use crate::lib::srf::{Frame, FrameSet};
use bevy::prelude::*;
use std::path::{Path, PathBuf};

/// Direction of travel through the sequence when advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// Aspect-ratio handling of the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectMode {
    /// Width and height scale independently to fill the panel.
    Auto,
    /// One nanometer maps to the same number of pixels on both axes.
    Equal,
}

/// Y-axis extent handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundsMode {
    /// Fit the y axis to the drawn data on every redraw.
    Auto,
    /// Hold the extent captured at the moment bounds were frozen.
    Fixed { y_min: f64, y_max: f64 },
}

/// Resource holding the complete render-affecting session state.
#[derive(Resource)]
pub struct ViewerState {
    source_path: PathBuf,
    frames: FrameSet,
    reference: Option<FrameSet>,
    /// Index of the current surface, always within `0..frame_count()`.
    pub current_index: usize,
    pub direction: Direction,
    /// Surfaces skipped per advance; a power of two, at least 1.
    pub step_size: usize,
    /// When set, visited surfaces stay overlaid until the next clearing redraw.
    pub cumulative: bool,
    pub aspect: AspectMode,
    pub bounds: BoundsMode,
    drawn: Vec<usize>,
}

impl ViewerState {
    pub fn new(source_path: PathBuf, frames: FrameSet, reference: Option<FrameSet>) -> Self {
        debug_assert!(!frames.is_empty());
        Self {
            source_path,
            frames,
            reference,
            current_index: 0,
            direction: Direction::Forward,
            step_size: 1,
            cumulative: false,
            aspect: AspectMode::Auto,
            bounds: BoundsMode::Auto,
            drawn: Vec::new(),
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn frames(&self) -> &FrameSet {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.frame_count()
    }

    pub fn current_frame(&self) -> &Frame {
        &self.frames.frames()[self.current_index]
    }

    /// The saved-reference frame shown alongside the current surface, if a
    /// reference set was loaded. Navigation tracks the primary set; the
    /// reference index is clamped to its own length.
    pub fn reference_frame(&self) -> Option<&Frame> {
        let reference = self.reference.as_ref()?;
        reference.get(self.current_index.min(reference.frame_count() - 1))
    }

    /// Indices drawn in the current display epoch, in draw order. The order
    /// doubles as legend order and color assignment.
    pub fn drawn_indices(&self) -> &[usize] {
        &self.drawn
    }

    /// Step to the next surface in the travel direction.
    ///
    /// Overshooting either end resets to the boundary index; the excess is
    /// discarded rather than wrapped modulo the length.
    pub fn advance(&mut self) {
        match self.direction {
            Direction::Forward => {
                let next = self.current_index + self.step_size;
                self.current_index = if next >= self.frame_count() { 0 } else { next };
            }
            Direction::Backward => {
                self.current_index = match self.current_index.checked_sub(self.step_size) {
                    Some(index) => index,
                    None => self.frame_count() - 1,
                };
            }
        }
    }

    pub fn jump_first(&mut self) {
        self.current_index = 0;
    }

    pub fn jump_last(&mut self) {
        self.current_index = self.frame_count() - 1;
    }

    /// Step size becomes `2^exponent` surfaces per advance.
    pub fn set_step_exponent(&mut self, exponent: u32) {
        self.step_size = 1 << exponent;
    }

    pub fn toggle_direction(&mut self) {
        self.direction = self.direction.reversed();
    }

    /// Flips overlay mode. Clearing is deliberately not done here: the
    /// already-drawn surfaces stay on screen until the next redraw runs
    /// [`Self::refresh_epoch`] with `cumulative == false`.
    pub fn toggle_cumulative(&mut self) {
        self.cumulative = !self.cumulative;
    }

    pub fn toggle_aspect(&mut self) {
        self.aspect = match self.aspect {
            AspectMode::Auto => AspectMode::Equal,
            AspectMode::Equal => AspectMode::Auto,
        };
    }

    /// Flip between automatic and frozen y bounds. Freezing captures
    /// `current_extent`, the y range the plot is displaying right now.
    pub fn toggle_bounds(&mut self, current_extent: (f64, f64)) {
        self.bounds = match self.bounds {
            BoundsMode::Auto => BoundsMode::Fixed {
                y_min: current_extent.0,
                y_max: current_extent.1,
            },
            BoundsMode::Fixed { .. } => BoundsMode::Auto,
        };
    }

    /// Bring the drawn epoch up to date for a redraw.
    ///
    /// Outside cumulative mode every redraw starts from a cleared surface,
    /// so the epoch collapses to the current index. In cumulative mode the
    /// current index joins the epoch unless it is already on screen, which
    /// keeps repeated visits from duplicating curves or legend entries.
    pub fn refresh_epoch(&mut self) {
        if !self.cumulative {
            self.drawn.clear();
        }
        if !self.drawn.contains(&self.current_index) {
            self.drawn.push(self.current_index);
        }
    }
}
