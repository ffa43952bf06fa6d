//! Viewport transform, screen/image coordinate mappings, and the debounce
//! state machine that schedules the boundary ray-collision passes.
//!
//! Three 2D coordinate spaces are in play:
//! - *current window*: [0,1]^2 over the visible viewport after pan/zoom
//! - *initial window*: [0,1]^2 over the home view (no pan/zoom)
//! - *image*: [0,1]^2 over the photograph, aspect-corrected against the
//!   viewport so the photograph letterboxes rather than stretches

use glam::Vec2;

use crate::collision::RayMarchMode;

/// Pan/zoom state pushed in by the viewer on every viewport event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    /// Magnification relative to the home view (1.0 = home)
    pub zoom: f32,
    /// Center of the visible region in initial-window coordinates
    pub center_shift: Vec2,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        // Identity: current window equals initial window
        Self {
            zoom: 1.0,
            center_shift: Vec2::splat(0.5),
        }
    }
}

impl ViewportTransform {
    /// Map a current-window point back into the initial window
    #[inline]
    pub fn current_to_initial(&self, point: Vec2) -> Vec2 {
        self.center_shift + (point - 0.5) / self.zoom
    }
}

/// Aspect-aware mapping between window and photograph coordinates
#[derive(Debug, Clone, Copy)]
pub struct ScreenMapping {
    /// Viewport size in logical pixels
    pub screen_resolution: Vec2,
    /// Photograph size in pixels
    pub image_size: Vec2,
    pub viewport: ViewportTransform,
}

impl ScreenMapping {
    pub fn new(screen_resolution: Vec2, image_size: Vec2) -> Self {
        Self {
            screen_resolution,
            image_size,
            viewport: ViewportTransform::default(),
        }
    }

    #[inline]
    fn aspect_ratio(&self) -> f32 {
        let image_ratio = self.image_size.x / self.image_size.y;
        let display_ratio = self.screen_resolution.x / self.screen_resolution.y;
        display_ratio / image_ratio
    }

    /// Map an initial-window point into image coordinates
    #[inline]
    pub fn initial_to_image(&self, point: Vec2) -> Vec2 {
        let ratio = self.aspect_ratio();
        if ratio > 1.0 {
            Vec2::new((point.x - 0.5) * ratio + 0.5, point.y)
        } else {
            Vec2::new(point.x, (point.y - 0.5) / ratio + 0.5)
        }
    }

    /// Map a window-space direction into image space (no translation)
    #[inline]
    pub fn window_to_image_vector(&self, vector: Vec2) -> Vec2 {
        let image_ratio = self.image_size.x / self.image_size.y;
        let display_ratio = self.screen_resolution.x / self.screen_resolution.y;
        Vec2::new(vector.x * image_ratio / display_ratio, vector.y)
    }

    /// Map an image point back to current-window coordinates
    #[inline]
    pub fn image_to_current(&self, point: Vec2) -> Vec2 {
        let ratio = self.aspect_ratio();
        let point = if ratio > 1.0 {
            Vec2::new((point.x - 0.5) / ratio + 0.5, point.y)
        } else {
            Vec2::new(point.x, (point.y - 0.5) * ratio + 0.5)
        };
        (point - self.viewport.center_shift) * self.viewport.zoom + Vec2::splat(0.5)
    }

    /// Full chain: current window -> initial window -> image
    #[inline]
    pub fn current_to_image(&self, point: Vec2) -> Vec2 {
        self.initial_to_image(self.viewport.current_to_initial(point))
    }

    /// True when a normalized coordinate falls outside [0,1]^2
    #[inline]
    pub fn out_of_range(coord: Vec2) -> bool {
        (coord.x - 0.5).abs() > 0.5 || (coord.y - 0.5).abs() > 0.5
    }
}

/// Debounce phases for the coarse/fine boundary-search scheduling
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebouncePhase {
    /// Nothing pending
    Idle,
    /// A viewport change arrived since the last tick; a coarse pass is due
    Panning { deadline: f64 },
    /// Coarse results are live; the fine pass fires at `deadline` unless
    /// another change restarts the timer
    Settling { deadline: f64 },
    /// Fine results are live
    Settled,
}

/// Explicit timer state machine replacing a cancel/reschedule callback.
///
/// Exactly one ray-march variant is selected per tick: coarse on every tick
/// while the viewport keeps changing, fine once it has been quiet for the
/// settle delay.
#[derive(Debug, Clone)]
pub struct ViewportDebounce {
    phase: DebouncePhase,
    settle_delay: f64,
}

impl ViewportDebounce {
    pub fn new(settle_delay: f64) -> Self {
        // Start due for a fine pass so the first frame has boundary data
        Self {
            phase: DebouncePhase::Settling {
                deadline: f64::NEG_INFINITY,
            },
            settle_delay,
        }
    }

    pub fn phase(&self) -> DebouncePhase {
        self.phase
    }

    /// A pan/zoom event arrived: restart the settle timer
    pub fn on_viewport_change(&mut self, now: f64) {
        self.phase = DebouncePhase::Panning {
            deadline: now + self.settle_delay,
        };
    }

    /// Advance the machine one tick and select the pass to run, if any
    pub fn tick(&mut self, now: f64) -> Option<RayMarchMode> {
        match self.phase {
            DebouncePhase::Panning { deadline } => {
                self.phase = DebouncePhase::Settling { deadline };
                Some(RayMarchMode::Coarse)
            }
            DebouncePhase::Settling { deadline } if now >= deadline => {
                self.phase = DebouncePhase::Settled;
                Some(RayMarchMode::Fine)
            }
            DebouncePhase::Settling { .. } => None,
            DebouncePhase::Settled => {
                self.phase = DebouncePhase::Idle;
                None
            }
            DebouncePhase::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_viewport_maps_through() {
        let viewport = ViewportTransform::default();
        let p = Vec2::new(0.3, 0.7);
        assert!((viewport.current_to_initial(p) - p).length() < 1e-6);
    }

    #[test]
    fn test_zoom_expands_around_center_shift() {
        let viewport = ViewportTransform {
            zoom: 2.0,
            center_shift: Vec2::new(0.25, 0.25),
        };
        // The window center lands on the shift target
        let center = viewport.current_to_initial(Vec2::splat(0.5));
        assert!((center - Vec2::new(0.25, 0.25)).length() < 1e-6);
    }

    #[test]
    fn test_image_roundtrip_with_identity_viewport() {
        let mapping = ScreenMapping::new(Vec2::new(1280.0, 720.0), Vec2::new(1000.0, 800.0));
        let p = Vec2::new(0.4, 0.6);
        let image = mapping.initial_to_image(p);
        let back = mapping.image_to_current(image);
        assert!((back - p).length() < 1e-5);
    }

    #[test]
    fn test_square_image_on_wide_screen_maps_x() {
        // Wide display, square image: x compresses, y passes through
        let mapping = ScreenMapping::new(Vec2::new(2000.0, 1000.0), Vec2::new(500.0, 500.0));
        let image = mapping.initial_to_image(Vec2::new(0.5, 0.3));
        assert!((image.x - 0.5).abs() < 1e-6);
        assert!((image.y - 0.3).abs() < 1e-6);
        let edge = mapping.initial_to_image(Vec2::new(0.0, 0.5));
        assert!(edge.x < 0.0, "screen edge falls outside the square image");
    }

    #[test]
    fn test_debounce_coarse_while_panning_then_fine() {
        let mut debounce = ViewportDebounce::new(0.2);
        // Initial state owes a fine pass
        assert_eq!(debounce.tick(0.0), Some(RayMarchMode::Fine));
        assert_eq!(debounce.tick(0.016), None);

        debounce.on_viewport_change(1.0);
        assert_eq!(debounce.tick(1.0), Some(RayMarchMode::Coarse));
        // Still settling
        assert_eq!(debounce.tick(1.1), None);
        // Another change restarts the timer and re-runs coarse
        debounce.on_viewport_change(1.15);
        assert_eq!(debounce.tick(1.15), Some(RayMarchMode::Coarse));
        assert_eq!(debounce.tick(1.3), None);
        // Quiet past the delay: one fine pass, then nothing
        assert_eq!(debounce.tick(1.36), Some(RayMarchMode::Fine));
        assert_eq!(debounce.tick(1.4), None);
        assert_eq!(debounce.tick(2.0), None);
    }
}
