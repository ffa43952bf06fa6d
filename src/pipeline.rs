//! The owned pipeline context: every grid buffer, the pass schedule, and the
//! external interface the viewer drives.
//!
//! Passes form a DAG, not a pipeline with feedback: the only cycle is the
//! phase field's explicit ping/pong pair inside the wave simulation. The
//! host calls [`Pipeline::advance`] once per animation tick; passes are
//! issued in dependency order and no pass starts before its upstream buffer
//! is fully written.

use glam::Vec2;

use crate::camera::Camera;
use crate::collision::{self, filter};
use crate::compositor::{self, CompositorInputs};
use crate::field::Field;
use crate::ocean::WaveSimulation;
use crate::params::{
    CameraParams, ConfigError, LightingParams, RenderConfig, WaveParams,
};
use crate::photo::PhotoSet;
use crate::scene::{scatter_spheres, Sphere};
use crate::viewport::{ScreenMapping, ViewportDebounce, ViewportTransform};

pub struct Pipeline {
    waves: WaveSimulation,
    photos: PhotoSet,
    mapping: ScreenMapping,
    debounce: ViewportDebounce,
    camera_params: CameraParams,
    camera: Camera,
    lighting: LightingParams,
    spheres: Vec<Sphere>,
    render_config: RenderConfig,
    /// Sparse boundary pairs, one ray slot per logical pixel
    collision: Field,
    /// Filtered per-pixel reflection coordinates, device resolution
    filtered_collision: Field,
    /// Composited RGBA output, device resolution
    frame_buffer: Field,
    /// 0-based fractional index into the photograph sequences
    time_lapse: f32,
}

impl Pipeline {
    pub fn new(
        wave_params: WaveParams,
        camera_params: CameraParams,
        lighting: LightingParams,
        render_config: RenderConfig,
        photos: PhotoSet,
    ) -> Result<Self, ConfigError> {
        let waves = WaveSimulation::new(wave_params)?;
        let camera = Camera::new(&camera_params, render_config.aspect_ratio());
        let mapping = ScreenMapping::new(
            Vec2::new(
                render_config.viewport_width as f32,
                render_config.viewport_height as f32,
            ),
            photos.image_size(),
        );

        let (device_width, device_height) = render_config.device_size();
        Ok(Self {
            waves,
            photos,
            mapping,
            debounce: ViewportDebounce::new(render_config.collision_settle_delay_s),
            camera_params,
            camera,
            lighting,
            spheres: Vec::new(),
            collision: Field::new(
                render_config.viewport_width as usize,
                render_config.viewport_height as usize,
                4,
            ),
            filtered_collision: Field::new(device_width as usize, device_height as usize, 4),
            frame_buffer: Field::new(device_width as usize, device_height as usize, 4),
            render_config,
            time_lapse: 0.0,
        })
    }

    /// Viewer pushed a pan/zoom event: update the transform and restart the
    /// settle timer
    pub fn on_viewport_change(&mut self, zoom: f32, center_shift: Vec2, now: f64) {
        self.mapping.viewport = ViewportTransform { zoom, center_shift };
        self.debounce.on_viewport_change(now);
    }

    /// Camera calibration pushed once per frame by the render-loop driver
    pub fn set_camera(&mut self, params: CameraParams) {
        self.camera_params = params;
        self.camera = Camera::new(&self.camera_params, self.render_config.aspect_ratio());
    }

    pub fn set_lighting(&mut self, lighting: LightingParams) {
        self.lighting = lighting;
    }

    pub fn set_wind(&mut self, speed_m_per_s: f32, direction_deg: f32) {
        self.waves.set_wind(speed_m_per_s, direction_deg);
    }

    pub fn set_choppiness(&mut self, choppiness: f32) -> Result<(), ConfigError> {
        self.waves.set_choppiness(choppiness)
    }

    pub fn set_domain_size(&mut self, size_m: f32) -> Result<(), ConfigError> {
        self.waves.set_domain_size(size_m)
    }

    pub fn set_playback_speed(&mut self, speed: f32) {
        self.waves.set_playback_speed(speed);
    }

    /// Select the 1-based photograph index to show; fractional values
    /// cross-fade between adjacent frames
    pub fn set_time_lapse_index(&mut self, index: f32) -> Result<(), ConfigError> {
        let count = self.photos.sequence_len();
        if !(1.0..=count as f32).contains(&index) {
            return Err(ConfigError::FrameIndexOutOfRange { got: index, count });
        }
        self.time_lapse = index - 1.0;
        Ok(())
    }

    /// Swap the active photograph set, dropping the previous one. Boundary
    /// data is stale afterwards, so the fine search is rescheduled.
    pub fn set_photos(&mut self, photos: PhotoSet) {
        log::info!(
            "photograph set replaced: {} frame(s)",
            photos.sequence_len()
        );
        self.mapping.image_size = photos.image_size();
        self.photos = photos;
        self.time_lapse = 0.0;
        self.debounce = ViewportDebounce::new(self.render_config.collision_settle_delay_s);
    }

    pub fn set_spheres(&mut self, spheres: Vec<Sphere>) {
        self.spheres = spheres;
    }

    /// Scatter the beach-ball fleet with the given radius
    pub fn scatter_spheres(&mut self, radius: f32, seed: u64) {
        self.spheres = scatter_spheres(radius, seed);
    }

    /// Resize the viewport, reallocating the screen-sized buffers
    pub fn resize_viewport(&mut self, width: u32, height: u32) {
        self.render_config.viewport_width = width;
        self.render_config.viewport_height = height;
        self.mapping.screen_resolution = Vec2::new(width as f32, height as f32);
        self.camera = Camera::new(&self.camera_params, self.render_config.aspect_ratio());

        let (device_width, device_height) = self.render_config.device_size();
        self.collision = Field::new(width as usize, height as usize, 4);
        self.filtered_collision = Field::new(device_width as usize, device_height as usize, 4);
        self.frame_buffer = Field::new(device_width as usize, device_height as usize, 4);
        self.debounce = ViewportDebounce::new(self.render_config.collision_settle_delay_s);
    }

    /// Run one animation tick: the debounce-selected boundary search (at
    /// most one variant per tick), the spectral wave passes, and the
    /// collision filter.
    pub fn advance(&mut self, now: f64, dt: f32) {
        if let Some(mode) = self.debounce.tick(now) {
            collision::solve(self.photos.mask(), &self.mapping, mode, &mut self.collision);
        }

        self.waves.step(dt);

        let inputs = filter::FilterInputs {
            collision: &self.collision,
            displacement: self.waves.displacement(),
            normals: self.waves.normals(),
            mask: self.photos.mask(),
            mapping: &self.mapping,
            camera: &self.camera,
            domain_size: self.waves.params().domain_size_m,
            device_pixel_ratio: self.render_config.device_pixel_ratio,
        };
        filter::filter(&inputs, &mut self.filtered_collision);
    }

    /// Composite the current state into the frame buffer and return it
    pub fn composite(&mut self) -> &Field {
        let inputs = CompositorInputs {
            displacement: self.waves.displacement(),
            normals: self.waves.normals(),
            collision: &self.filtered_collision,
            photos: &self.photos,
            mapping: &self.mapping,
            camera: &self.camera,
            lighting: &self.lighting,
            spheres: &self.spheres,
            domain_size: self.waves.params().domain_size_m,
            time_lapse: self.time_lapse,
            device_pixel_ratio: self.render_config.device_pixel_ratio,
        };
        compositor::render(&inputs, &mut self.frame_buffer);
        &self.frame_buffer
    }

    /// Spatial displacement field (dx, height, dz)
    pub fn displacement(&self) -> &Field {
        self.waves.displacement()
    }

    /// Surface normal field
    pub fn normals(&self) -> &Field {
        self.waves.normals()
    }

    pub fn waves(&self) -> &WaveSimulation {
        &self.waves
    }

    pub fn photos(&self) -> &PhotoSet {
        &self.photos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::PhotoSet;

    fn tiny_pipeline() -> Pipeline {
        let mask = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            16,
            16,
            image::Rgb([255, 255, 255]),
        ));
        let photo = image::RgbImage::from_pixel(16, 16, image::Rgb([120, 140, 160]));
        let photos = PhotoSet::from_images(mask, vec![photo.clone()], vec![photo]).unwrap();

        let wave_params = WaveParams {
            resolution: 16,
            ..WaveParams::default()
        };
        let render_config = RenderConfig {
            viewport_width: 32,
            viewport_height: 32,
            ..RenderConfig::default()
        };
        Pipeline::new(
            wave_params,
            CameraParams::default(),
            LightingParams::default(),
            render_config,
            photos,
        )
        .unwrap()
    }

    #[test]
    fn test_advance_and_composite_produce_finite_frame() {
        let mut pipeline = tiny_pipeline();
        pipeline.advance(0.0, 1.0 / 60.0);
        pipeline.advance(1.0 / 60.0, 1.0 / 60.0);
        let frame = pipeline.composite();
        assert_eq!(frame.width(), 32);
        assert!(frame.data().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_time_lapse_index_validation() {
        let mut pipeline = tiny_pipeline();
        assert!(pipeline.set_time_lapse_index(1.0).is_ok());
        assert!(matches!(
            pipeline.set_time_lapse_index(0.5),
            Err(ConfigError::FrameIndexOutOfRange { .. })
        ));
        assert!(pipeline.set_time_lapse_index(2.0).is_err());
    }

    #[test]
    fn test_viewport_change_schedules_coarse_pass() {
        use crate::viewport::DebouncePhase;
        let mut pipeline = tiny_pipeline();
        pipeline.advance(0.0, 1.0 / 60.0);
        pipeline.on_viewport_change(2.0, Vec2::new(0.4, 0.5), 1.0);
        assert!(matches!(
            pipeline.debounce.phase(),
            DebouncePhase::Panning { .. }
        ));
        pipeline.advance(1.0, 1.0 / 60.0);
        assert!(matches!(
            pipeline.debounce.phase(),
            DebouncePhase::Settling { .. }
        ));
    }
}
