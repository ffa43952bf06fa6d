//! Command-line argument parsing.

use clap::Parser;

use crate::params::{CameraParams, RecordingConfig, RenderConfig, WaveParams};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Stillwave")]
#[command(about = "Animated ocean surface composited into a still photograph", long_about = None)]
pub struct Args {
    /// Water mask image (single channel, white = water)
    #[arg(long, value_name = "PATH")]
    pub mask: String,

    /// Source photograph path pattern; `{}` is the 1-based frame index
    #[arg(long, value_name = "PATTERN")]
    pub source: String,

    /// Reflection texture path pattern; defaults to the source pattern
    #[arg(long, value_name = "PATTERN")]
    pub reflection: Option<String>,

    /// Number of photographs in each sequence (1-8)
    #[arg(long, value_name = "COUNT", default_value = "1")]
    pub frames: usize,

    /// Seconds of animation to render
    #[arg(long, value_name = "SECONDS", default_value = "2.0")]
    pub duration: f32,

    /// Output frame rate
    #[arg(long, value_name = "FPS", default_value = "30")]
    pub fps: u32,

    /// Output directory for rendered frames
    #[arg(long, value_name = "DIR", default_value = "recording")]
    pub output: String,

    /// Viewport size as WIDTHxHEIGHT
    #[arg(long, value_name = "WxH", default_value = "1280x720")]
    pub viewport: String,

    /// Wind speed (m/s)
    #[arg(long, value_name = "M_PER_S", default_value = "10.0")]
    pub wind_speed: f32,

    /// Wind direction (degrees)
    #[arg(long, value_name = "DEGREES", default_value = "0.0")]
    pub wind_direction: f32,

    /// Wave choppiness (0-3)
    #[arg(long, default_value = "1.0")]
    pub choppiness: f32,

    /// Simulated patch size (meters, 32-2048)
    #[arg(long, value_name = "METERS", default_value = "256.0")]
    pub domain_size: f32,

    /// Simulation grid resolution (power of two)
    #[arg(long, default_value = "1024")]
    pub resolution: usize,

    /// Playback speed multiplier
    #[arg(long, default_value = "1.0")]
    pub playback_speed: f32,

    /// Camera height above the water (meters)
    #[arg(long, value_name = "METERS", default_value = "15.0")]
    pub camera_height: f32,

    /// Camera pitch from straight down (degrees, 90 = horizontal)
    #[arg(long, value_name = "DEGREES", default_value = "80.0")]
    pub camera_angle: f32,

    /// Vertical field of view (degrees)
    #[arg(long, value_name = "DEGREES", default_value = "60.0")]
    pub camera_fov: f32,

    /// Beach ball radius in meters (0 disables the spheres)
    #[arg(long, value_name = "METERS", default_value = "0.0")]
    pub sphere_radius: f32,

    /// Time-lapse index into the photograph sequence (1-based, fractional
    /// values cross-fade)
    #[arg(long, value_name = "INDEX", default_value = "1.0")]
    pub timelapse: f32,
}

impl Args {
    pub fn wave_params(&self) -> WaveParams {
        WaveParams {
            wind_speed_m_per_s: self.wind_speed,
            wind_direction_deg: self.wind_direction,
            choppiness: self.choppiness,
            domain_size_m: self.domain_size,
            resolution: self.resolution,
            playback_speed: self.playback_speed,
            ..WaveParams::default()
        }
    }

    pub fn camera_params(&self) -> CameraParams {
        CameraParams {
            height_m: self.camera_height,
            angle_deg: self.camera_angle,
            fov_deg: self.camera_fov,
            ..CameraParams::default()
        }
    }

    pub fn render_config(&self) -> Result<RenderConfig, String> {
        let (width, height) = self
            .viewport
            .split_once('x')
            .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)))
            .ok_or_else(|| format!("invalid viewport '{}', expected WIDTHxHEIGHT", self.viewport))?;
        Ok(RenderConfig {
            viewport_width: width,
            viewport_height: height,
            ..RenderConfig::default()
        })
    }

    /// Recording configuration, with the output directories created
    pub fn recording_config(&self) -> std::io::Result<RecordingConfig> {
        let config = RecordingConfig {
            duration_secs: self.duration,
            output_dir: self.output.clone(),
            fps: self.fps,
        };
        std::fs::create_dir_all(config.frames_dir())?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_parsing() {
        let args = Args::parse_from(["stillwave", "--mask", "m.png", "--source", "org{}.jpg"]);
        let config = args.render_config().unwrap();
        assert_eq!(config.viewport_width, 1280);
        assert_eq!(config.viewport_height, 720);
    }

    #[test]
    fn test_bad_viewport_rejected() {
        let args = Args::parse_from([
            "stillwave",
            "--mask",
            "m.png",
            "--source",
            "org{}.jpg",
            "--viewport",
            "wide",
        ]);
        assert!(args.render_config().is_err());
    }
}
