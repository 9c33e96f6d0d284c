//! Parsing of the `.srf` surface-sequence text format.
//!
//! A file holds one or more recorded surfaces. Each surface starts with a
//! header line followed by one data line per point:
//!
//! ```text
//! surface: <time> <npoints> x-positions y-positions
//! <x0> <y0>
//! <x1> <y1>
//! ...
//! surface: <time2> <npoints2> x-positions y-positions
//! ...
//! ```
//!
//! Coordinates are nanometers, `time` is seconds. Two extensions are
//! recognised: `.srf` for a live sequence and `.srf_save` for a saved
//! reference; both parse identically. Concatenating surfaces in one file is
//! how a full time series (or a before/after pair) is represented.

use bevy::math::DVec2;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Recognised surface file extensions.
pub const SURFACE_EXTENSIONS: [&str; 2] = ["srf", "srf_save"];

const HEADER_MARKER: &str = "surface:";

/// Errors raised while reading a surface file.
///
/// All variants are fatal for the session: a malformed file never produces
/// a partial frame set. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum SrfError {
    #[error("unsupported file extension for {path:?}: expected .srf or .srf_save")]
    UnsupportedExtension { path: PathBuf },

    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path:?}:{line}: malformed surface header (expected `surface: <time> <npoints> ...`)")]
    MalformedHeader { path: PathBuf, line: usize },

    #[error("{path:?}:{line}: malformed data line (expected `<x> <y>`)")]
    MalformedPoint { path: PathBuf, line: usize },

    #[error("{path:?}:{line}: point data before the first surface header")]
    DataBeforeHeader { path: PathBuf, line: usize },

    #[error("{path:?}:{line}: surface declares {declared} points but {found} were found")]
    PointCountMismatch {
        path: PathBuf,
        line: usize,
        declared: usize,
        found: usize,
    },

    #[error("{path:?}: file contains no surfaces")]
    EmptyFile { path: PathBuf },
}

/// One recorded surface: a timestamp and the ordered points of its curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Simulation time in seconds.
    pub time: f64,
    /// Curve points in nanometers; the order defines the curve path.
    pub points: Vec<DVec2>,
}

impl Frame {
    /// Legend/status label, e.g. `t = 2.5s`.
    pub fn label(&self) -> String {
        format!("t = {:?}s", self.time)
    }

    /// Minimum and maximum x coordinate, if the frame has any points.
    pub fn x_bounds(&self) -> Option<(f64, f64)> {
        fold_bounds(self.points.iter().map(|p| p.x))
    }

    /// Minimum and maximum y coordinate, if the frame has any points.
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        fold_bounds(self.points.iter().map(|p| p.y))
    }
}

fn fold_bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, value| match acc {
        None => Some((value, value)),
        Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
    })
}

/// The ordered, non-empty sequence of all frames parsed from one file.
///
/// Immutable after construction.
#[derive(Debug, Clone)]
pub struct FrameSet {
    frames: Vec<Frame>,
}

impl FrameSet {
    /// Read a complete frame set from a `.srf` / `.srf_save` file.
    pub fn parse(path: &Path) -> Result<Self, SrfError> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        if !SURFACE_EXTENSIONS.contains(&extension) {
            return Err(SrfError::UnsupportedExtension {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path).map_err(|source| SrfError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_lines(BufReader::new(file), path)
    }

    /// Build a frame set from already-parsed frames. `frames` must not be
    /// empty; the parser upholds this for file input.
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        debug_assert!(!frames.is_empty());
        Self { frames }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    fn parse_lines(reader: impl BufRead, path: &Path) -> Result<Self, SrfError> {
        // Surface currently being filled, until its header count is met.
        struct Pending {
            time: f64,
            declared: usize,
            points: Vec<DVec2>,
            header_line: usize,
        }

        fn finish(pending: Pending, path: &Path) -> Result<Frame, SrfError> {
            if pending.points.len() != pending.declared {
                return Err(SrfError::PointCountMismatch {
                    path: path.to_path_buf(),
                    line: pending.header_line,
                    declared: pending.declared,
                    found: pending.points.len(),
                });
            }
            Ok(Frame {
                time: pending.time,
                points: pending.points,
            })
        }

        let mut frames = Vec::new();
        let mut pending: Option<Pending> = None;

        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line = line.map_err(|source| SrfError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if trimmed.starts_with(HEADER_MARKER) {
                if let Some(done) = pending.take() {
                    frames.push(finish(done, path)?);
                }

                let mut fields = trimmed.split_whitespace();
                let malformed = || SrfError::MalformedHeader {
                    path: path.to_path_buf(),
                    line: line_number,
                };
                if fields.next() != Some(HEADER_MARKER) {
                    return Err(malformed());
                }
                let time = fields
                    .next()
                    .and_then(|f| f.parse::<f64>().ok())
                    .ok_or_else(malformed)?;
                let declared = fields
                    .next()
                    .and_then(|f| f.parse::<usize>().ok())
                    .ok_or_else(malformed)?;
                // Remaining header fields ("x-positions y-positions") are
                // descriptive only.

                pending = Some(Pending {
                    time,
                    declared,
                    // The declared count is untrusted input; cap the
                    // preallocation and let the mismatch check do the rest.
                    points: Vec::with_capacity(declared.min(1 << 16)),
                    header_line: line_number,
                });
            } else {
                let Some(current) = pending.as_mut() else {
                    return Err(SrfError::DataBeforeHeader {
                        path: path.to_path_buf(),
                        line: line_number,
                    });
                };
                if current.points.len() == current.declared {
                    return Err(SrfError::PointCountMismatch {
                        path: path.to_path_buf(),
                        line: current.header_line,
                        declared: current.declared,
                        found: current.declared + 1,
                    });
                }

                let mut fields = trimmed.split_whitespace();
                let malformed = || SrfError::MalformedPoint {
                    path: path.to_path_buf(),
                    line: line_number,
                };
                let x = fields
                    .next()
                    .and_then(|f| f.parse::<f64>().ok())
                    .ok_or_else(malformed)?;
                let y = fields
                    .next()
                    .and_then(|f| f.parse::<f64>().ok())
                    .ok_or_else(malformed)?;
                current.points.push(DVec2::new(x, y));
            }
        }

        if let Some(done) = pending.take() {
            frames.push(finish(done, path)?);
        }

        if frames.is_empty() {
            return Err(SrfError::EmptyFile {
                path: path.to_path_buf(),
            });
        }

        Ok(Self { frames })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_srf(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parses_concatenated_surfaces() {
        let dir = TempDir::new().unwrap();
        let path = write_srf(
            &dir,
            "trench.srf",
            "surface: 0.0 2 x-positions y-positions\n\
             0.0 0.0\n\
             1.0 1.0\n\
             surface: 5.0 2 x-positions y-positions\n\
             0.0 2.0\n\
             1.0 3.0\n",
        );

        let set = FrameSet::parse(&path).unwrap();
        assert_eq!(set.frame_count(), 2);

        let first = set.get(0).unwrap();
        assert_eq!(first.time, 0.0);
        assert_eq!(first.points, vec![DVec2::new(0.0, 0.0), DVec2::new(1.0, 1.0)]);

        let second = set.get(1).unwrap();
        assert_eq!(second.time, 5.0);
        assert_eq!(second.points, vec![DVec2::new(0.0, 2.0), DVec2::new(1.0, 3.0)]);
    }

    #[test]
    fn every_frame_matches_its_declared_count() {
        let dir = TempDir::new().unwrap();
        let mut contents = String::new();
        for i in 0..5 {
            contents.push_str(&format!("surface: {}.0 {} x-positions y-positions\n", i, i + 1));
            for j in 0..=i {
                contents.push_str(&format!("{}.0 {}.0\n", j, j));
            }
        }
        let path = write_srf(&dir, "series.srf", &contents);

        let set = FrameSet::parse(&path).unwrap();
        assert_eq!(set.frame_count(), 5);
        for (i, frame) in set.frames().iter().enumerate() {
            assert_eq!(frame.points.len(), i + 1);
        }
    }

    #[test]
    fn accepts_the_saved_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_srf(
            &dir,
            "trench.srf_save",
            "surface: 1.0 1 x-positions y-positions\n0.5 0.5\n",
        );
        assert_eq!(FrameSet::parse(&path).unwrap().frame_count(), 1);
    }

    #[test]
    fn rejects_unknown_extensions() {
        let dir = TempDir::new().unwrap();
        let path = write_srf(&dir, "trench.txt", "surface: 0.0 0\n");
        assert!(matches!(
            FrameSet::parse(&path),
            Err(SrfError::UnsupportedExtension { .. })
        ));
    }

    #[test]
    fn rejects_too_few_points_at_eof() {
        let dir = TempDir::new().unwrap();
        let path = write_srf(
            &dir,
            "short.srf",
            "surface: 0.0 3 x-positions y-positions\n0.0 0.0\n1.0 1.0\n",
        );
        assert!(matches!(
            FrameSet::parse(&path),
            Err(SrfError::PointCountMismatch {
                declared: 3,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn rejects_too_few_points_before_next_header() {
        let dir = TempDir::new().unwrap();
        let path = write_srf(
            &dir,
            "short.srf",
            "surface: 0.0 3 x-positions y-positions\n\
             0.0 0.0\n\
             1.0 1.0\n\
             surface: 1.0 1 x-positions y-positions\n\
             0.0 0.0\n",
        );
        assert!(matches!(
            FrameSet::parse(&path),
            Err(SrfError::PointCountMismatch {
                declared: 3,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn rejects_surplus_points() {
        let dir = TempDir::new().unwrap();
        let path = write_srf(
            &dir,
            "long.srf",
            "surface: 0.0 1 x-positions y-positions\n0.0 0.0\n1.0 1.0\n",
        );
        assert!(matches!(
            FrameSet::parse(&path),
            Err(SrfError::PointCountMismatch {
                declared: 1,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn rejects_non_numeric_coordinates() {
        let dir = TempDir::new().unwrap();
        let path = write_srf(
            &dir,
            "bad.srf",
            "surface: 0.0 1 x-positions y-positions\n0.0 abc\n",
        );
        assert!(matches!(
            FrameSet::parse(&path),
            Err(SrfError::MalformedPoint { line: 2, .. })
        ));
    }

    #[test]
    fn rejects_malformed_headers() {
        let dir = TempDir::new().unwrap();
        let path = write_srf(&dir, "bad.srf", "surface: nineteen 2\n0.0 0.0\n1.0 1.0\n");
        assert!(matches!(
            FrameSet::parse(&path),
            Err(SrfError::MalformedHeader { line: 1, .. })
        ));
    }

    #[test]
    fn rejects_data_before_the_first_header() {
        let dir = TempDir::new().unwrap();
        let path = write_srf(&dir, "bad.srf", "0.0 0.0\n");
        assert!(matches!(
            FrameSet::parse(&path),
            Err(SrfError::DataBeforeHeader { line: 1, .. })
        ));
    }

    #[test]
    fn rejects_files_without_surfaces() {
        let dir = TempDir::new().unwrap();
        let path = write_srf(&dir, "empty.srf", "");
        assert!(matches!(FrameSet::parse(&path), Err(SrfError::EmptyFile { .. })));
    }

    #[test]
    fn accepts_zero_point_surfaces() {
        let dir = TempDir::new().unwrap();
        let path = write_srf(
            &dir,
            "flat.srf",
            "surface: 0.0 0 x-positions y-positions\nsurface: 1.0 1 x-positions y-positions\n2.0 2.0\n",
        );
        let set = FrameSet::parse(&path).unwrap();
        assert_eq!(set.frame_count(), 2);
        assert!(set.get(0).unwrap().points.is_empty());
    }

    #[test]
    fn labels_keep_a_decimal_point() {
        let frame = Frame {
            time: 0.0,
            points: Vec::new(),
        };
        assert_eq!(frame.label(), "t = 0.0s");

        let frame = Frame {
            time: 2.5,
            points: Vec::new(),
        };
        assert_eq!(frame.label(), "t = 2.5s");
    }

    #[test]
    fn frame_bounds_cover_all_points() {
        let frame = Frame {
            time: 0.0,
            points: vec![
                DVec2::new(-1.0, 4.0),
                DVec2::new(3.0, -2.0),
                DVec2::new(0.5, 0.5),
            ],
        };
        assert_eq!(frame.x_bounds(), Some((-1.0, 3.0)));
        assert_eq!(frame.y_bounds(), Some((-2.0, 4.0)));
        assert_eq!(Frame { time: 0.0, points: Vec::new() }.x_bounds(), None);
    }
}
