//! Rendering and recording configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Viewport width (logical pixels)
    pub viewport_width: u32,

    /// Viewport height (logical pixels)
    pub viewport_height: u32,

    /// Device pixels per logical pixel (1.0 for headless rendering)
    pub device_pixel_ratio: f32,

    /// Quiet time after the last pan/zoom before the fine boundary search
    /// runs (seconds)
    pub collision_settle_delay_s: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1280,
            viewport_height: 720,
            device_pixel_ratio: 1.0,
            collision_settle_delay_s: 0.2,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.viewport_width as f32 / self.viewport_height as f32
    }

    /// Viewport size in device pixels
    pub fn device_size(&self) -> (u32, u32) {
        (
            (self.viewport_width as f32 * self.device_pixel_ratio) as u32,
            (self.viewport_height as f32 * self.device_pixel_ratio) as u32,
        )
    }
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds)
    pub duration_secs: f32,

    /// Output directory for frames
    pub output_dir: String,

    /// Frame rate (FPS)
    pub fps: u32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            output_dir: "recording".to_string(),
            fps: 60,
        }
    }

    /// Total number of frames to capture
    pub fn total_frames(&self) -> usize {
        (self.duration_secs * self.fps as f32).ceil() as usize
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> String {
        format!("{}/frames", self.output_dir)
    }
}
