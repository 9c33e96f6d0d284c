//! Pure plotting math: data bounds, tick placement and the data-to-screen
//! mapping used by the plot panel.

use crate::lib::srf::Frame;
use bevy_egui::egui;

/// Axis-aligned data-space rectangle the plot displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DataBounds {
    /// Smallest bounds covering every point of `frames`, or `None` when no
    /// frame contributes any point.
    pub fn covering<'a>(frames: impl Iterator<Item = &'a Frame>) -> Option<Self> {
        let mut bounds: Option<Self> = None;
        for frame in frames {
            let (Some((x_lo, x_hi)), Some((y_lo, y_hi))) = (frame.x_bounds(), frame.y_bounds())
            else {
                continue;
            };
            bounds = Some(match bounds {
                None => Self {
                    x_min: x_lo,
                    x_max: x_hi,
                    y_min: y_lo,
                    y_max: y_hi,
                },
                Some(b) => Self {
                    x_min: b.x_min.min(x_lo),
                    x_max: b.x_max.max(x_hi),
                    y_min: b.y_min.min(y_lo),
                    y_max: b.y_max.max(y_hi),
                },
            });
        }
        bounds
    }

    pub fn x_span(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn y_span(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Give degenerate axes a visible span so the mapping stays finite.
    pub fn ensure_nonzero(&mut self) {
        if self.x_span() <= 0.0 {
            self.x_min -= 0.5;
            self.x_max += 0.5;
        }
        if self.y_span() <= 0.0 {
            self.y_min -= 0.5;
            self.y_max += 0.5;
        }
    }

    /// Expand both axes by `fraction` of their span on each side.
    pub fn pad(&mut self, fraction: f64) {
        let dx = self.x_span() * fraction;
        let dy = self.y_span() * fraction;
        self.x_min -= dx;
        self.x_max += dx;
        self.y_min -= dy;
        self.y_max += dy;
    }

    /// Replace the y extent, keeping x untouched.
    pub fn set_y(&mut self, y_min: f64, y_max: f64) {
        self.y_min = y_min;
        self.y_max = y_max;
    }

    /// Widen the cheaper axis around its center until one data unit maps to
    /// the same number of pixels horizontally and vertically.
    pub fn equalize_aspect(&mut self, screen_width: f32, screen_height: f32) {
        if screen_width <= 0.0 || screen_height <= 0.0 {
            return;
        }
        let per_px_x = self.x_span() / screen_width as f64;
        let per_px_y = self.y_span() / screen_height as f64;
        let per_px = per_px_x.max(per_px_y);

        let grow_x = (per_px * screen_width as f64 - self.x_span()) / 2.0;
        let grow_y = (per_px * screen_height as f64 - self.y_span()) / 2.0;
        self.x_min -= grow_x;
        self.x_max += grow_x;
        self.y_min -= grow_y;
        self.y_max += grow_y;
    }
}

/// Maps data-space coordinates into a screen rectangle. Data y grows upward,
/// screen y downward.
pub struct PlotMapper {
    bounds: DataBounds,
    rect: egui::Rect,
}

impl PlotMapper {
    pub fn new(bounds: DataBounds, rect: egui::Rect) -> Self {
        Self { bounds, rect }
    }

    pub fn to_screen(&self, x: f64, y: f64) -> egui::Pos2 {
        let tx = (x - self.bounds.x_min) / self.bounds.x_span();
        let ty = (y - self.bounds.y_min) / self.bounds.y_span();
        egui::pos2(
            self.rect.left() + tx as f32 * self.rect.width(),
            self.rect.bottom() - ty as f32 * self.rect.height(),
        )
    }
}

/// A "nice" tick spacing (1, 2 or 5 times a power of ten) yielding roughly
/// `target` ticks over `span`.
pub fn tick_step(span: f64, target: usize) -> f64 {
    let raw = span / target.max(1) as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized < 1.5 {
        1.0
    } else if normalized < 3.5 {
        2.0
    } else if normalized < 7.5 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Tick positions covering `[min, max]` at multiples of `step`.
pub fn ticks(min: f64, max: f64, step: f64) -> Vec<f64> {
    let mut out = Vec::new();
    if step <= 0.0 || !step.is_finite() {
        return out;
    }
    let mut value = (min / step).ceil() * step;
    while value <= max + step * 1e-9 {
        // Snap float noise so the zero tick prints as 0.
        out.push(if value.abs() < step * 1e-9 { 0.0 } else { value });
        value += step;
    }
    out
}

/// Format a tick value with just enough decimals for `step`-spaced ticks.
pub fn tick_label(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10().floor()) as usize
    };
    format!("{:.*}", decimals.min(9), value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::DVec2;

    fn frame(points: &[(f64, f64)]) -> Frame {
        Frame {
            time: 0.0,
            points: points.iter().map(|&(x, y)| DVec2::new(x, y)).collect(),
        }
    }

    #[test]
    fn covering_spans_all_frames() {
        let a = frame(&[(0.0, 0.0), (2.0, 1.0)]);
        let b = frame(&[(-1.0, 3.0)]);
        let bounds = DataBounds::covering([&a, &b].into_iter()).unwrap();
        assert_eq!(bounds.x_min, -1.0);
        assert_eq!(bounds.x_max, 2.0);
        assert_eq!(bounds.y_min, 0.0);
        assert_eq!(bounds.y_max, 3.0);
    }

    #[test]
    fn covering_skips_empty_frames() {
        let empty = frame(&[]);
        assert!(DataBounds::covering([&empty].into_iter()).is_none());

        let a = frame(&[(1.0, 1.0)]);
        let bounds = DataBounds::covering([&empty, &a].into_iter()).unwrap();
        assert_eq!(bounds.x_min, 1.0);
        assert_eq!(bounds.x_max, 1.0);
    }

    #[test]
    fn degenerate_spans_get_a_visible_extent() {
        let mut bounds = DataBounds {
            x_min: 2.0,
            x_max: 2.0,
            y_min: -1.0,
            y_max: 1.0,
        };
        bounds.ensure_nonzero();
        assert_eq!(bounds.x_min, 1.5);
        assert_eq!(bounds.x_max, 2.5);
        assert_eq!(bounds.y_min, -1.0);
        assert_eq!(bounds.y_max, 1.0);
    }

    #[test]
    fn equal_aspect_grows_the_cheaper_axis() {
        // 10x10 data in a 200x100 px rect: y is the limiting axis at
        // 0.1 nm/px, so x must widen to 20 nm centered on the old span.
        let mut bounds = DataBounds {
            x_min: 0.0,
            x_max: 10.0,
            y_min: 0.0,
            y_max: 10.0,
        };
        bounds.equalize_aspect(200.0, 100.0);
        assert_eq!(bounds.x_min, -5.0);
        assert_eq!(bounds.x_max, 15.0);
        assert_eq!(bounds.y_min, 0.0);
        assert_eq!(bounds.y_max, 10.0);

        let per_px_x = bounds.x_span() / 200.0;
        let per_px_y = bounds.y_span() / 100.0;
        assert!((per_px_x - per_px_y).abs() < 1e-12);
    }

    #[test]
    fn mapper_flips_the_y_axis() {
        let bounds = DataBounds {
            x_min: 0.0,
            x_max: 10.0,
            y_min: 0.0,
            y_max: 10.0,
        };
        let rect = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(100.0, 200.0));
        let mapper = PlotMapper::new(bounds, rect);

        assert_eq!(mapper.to_screen(0.0, 0.0), egui::pos2(0.0, 200.0));
        assert_eq!(mapper.to_screen(10.0, 10.0), egui::pos2(100.0, 0.0));
        assert_eq!(mapper.to_screen(5.0, 5.0), egui::pos2(50.0, 100.0));
    }

    #[test]
    fn tick_steps_are_nice_numbers() {
        assert_eq!(tick_step(10.0, 5), 2.0);
        assert_eq!(tick_step(7.0, 5), 1.0);
        assert_eq!(tick_step(100.0, 4), 20.0);
        assert!((tick_step(1.0, 5) - 0.2).abs() < 1e-12);
        assert!((tick_step(0.05, 5) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn ticks_cover_the_range_inclusively() {
        assert_eq!(ticks(0.0, 10.0, 2.0), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(ticks(-1.0, 1.0, 1.0), vec![-1.0, 0.0, 1.0]);
        assert_eq!(ticks(0.3, 0.9, 0.5), vec![0.5]);
        assert!(ticks(0.0, 1.0, 0.0).is_empty());
    }

    #[test]
    fn tick_labels_match_the_step_resolution() {
        assert_eq!(tick_label(4.0, 2.0), "4");
        assert_eq!(tick_label(0.4, 0.2), "0.4");
        assert_eq!(tick_label(0.05, 0.01), "0.05");
        assert_eq!(tick_label(-2.5, 0.5), "-2.5");
    }
}
