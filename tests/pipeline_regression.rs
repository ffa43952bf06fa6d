//! Wave Pipeline Regression Tests
//!
//! End-to-end checks on the simulation statistics and the composited frame:
//! the wave field must conserve mean height, its energy must scale sanely
//! with wind, and a full pipeline run over a synthetic photograph set must
//! stay finite and respect the mask.
//!
//! # Running tests
//! ```bash
//! cargo test --test pipeline_regression
//! ```

use stillwave::ocean::WaveSimulation;
use stillwave::params::{CameraParams, LightingParams, RenderConfig, WaveParams};
use stillwave::photo::PhotoSet;
use stillwave::pipeline::Pipeline;

// ==================== HELPER FUNCTIONS ====================

/// Mean and variance of the height channel of the displacement field
fn height_stats(sim: &WaveSimulation) -> (f64, f64) {
    let field = sim.displacement();
    let resolution = field.resolution();
    let cells = (resolution * resolution) as f64;

    let mut mean = 0.0f64;
    for y in 0..resolution {
        for x in 0..resolution {
            mean += field.fetch(x, y).y as f64;
        }
    }
    mean /= cells;

    let mut variance = 0.0f64;
    for y in 0..resolution {
        for x in 0..resolution {
            let h = field.fetch(x, y).y as f64;
            variance += (h - mean) * (h - mean);
        }
    }
    variance /= cells;

    (mean, variance)
}

fn run_one_second(wind_speed: f32) -> WaveSimulation {
    let params = WaveParams {
        wind_speed_m_per_s: wind_speed,
        wind_direction_deg: 0.0,
        choppiness: 1.0,
        domain_size_m: 256.0,
        // Scaled-down power of two so the suite stays fast; the statistics
        // below are resolution-relative
        resolution: 64,
        ..WaveParams::default()
    };
    let mut sim = WaveSimulation::new(params).unwrap();
    for _ in 0..60 {
        sim.step(1.0 / 60.0);
    }
    sim
}

/// Synthetic photograph set: water in the lower half of the image
fn synthetic_photos() -> PhotoSet {
    let size = 64u32;
    let mask = image::DynamicImage::ImageRgb8(image::RgbImage::from_fn(size, size, |_, y| {
        // Image rows count from the top; the bottom half is water
        if y >= size / 2 {
            image::Rgb([255, 255, 255])
        } else {
            image::Rgb([0, 0, 0])
        }
    }));
    let photo = image::RgbImage::from_fn(size, size, |x, y| {
        image::Rgb([(4 * x) as u8, (4 * y) as u8, 128])
    });
    PhotoSet::from_images(mask, vec![photo.clone()], vec![photo]).unwrap()
}

// ==================== TESTS ====================

#[test]
fn test_mean_height_conserved_after_one_second() {
    let sim = run_one_second(10.0);
    let (mean, _) = height_stats(&sim);
    // The spectrum carries no DC term, so the surface oscillates around zero
    assert!(
        mean.abs() < 1e-2,
        "mean height {mean} drifted away from zero"
    );
}

#[test]
fn test_wave_energy_scales_with_wind() {
    let calm = run_one_second(5.0);
    let stormy = run_one_second(20.0);
    let (_, calm_variance) = height_stats(&calm);
    let (_, stormy_variance) = height_stats(&stormy);

    assert!(calm_variance > 0.0, "calm sea is unexpectedly flat");
    assert!(
        stormy_variance > calm_variance,
        "stronger wind must carry more energy ({stormy_variance} <= {calm_variance})"
    );
}

#[test]
fn test_displacement_bounded_by_wind() {
    let sim = run_one_second(10.0);
    // A 10 m/s sea on a 256 m patch stays well under a few meters of height
    for value in sim.displacement().data() {
        assert!(value.is_finite());
        assert!(value.abs() < 50.0, "displacement {value} exploded");
    }
}

#[test]
fn test_full_pipeline_composites_masked_frame() {
    let photos = synthetic_photos();
    let wave_params = WaveParams {
        resolution: 32,
        ..WaveParams::default()
    };
    let render_config = RenderConfig {
        viewport_width: 64,
        viewport_height: 64,
        ..RenderConfig::default()
    };
    let mut pipeline = Pipeline::new(
        wave_params,
        CameraParams::default(),
        LightingParams::default(),
        render_config,
        photos,
    )
    .unwrap();

    // First tick runs the fine boundary search; a couple more move the waves
    for frame in 0..3 {
        pipeline.advance(frame as f64 / 60.0, 1.0 / 60.0);
    }
    let frame = pipeline.composite();

    assert!(frame.data().iter().all(|v| v.is_finite()));

    // The dry upper half of the photograph must pass through untouched
    let width = frame.width();
    let height = frame.height();
    assert_eq!((width, height), (64, 64));
    let reference = synthetic_photos();
    let top_row = height - 4;
    for x in 0..width {
        let uv = glam::Vec2::new(
            (x as f32 + 0.5) / width as f32,
            (top_row as f32 + 0.5) / height as f32,
        );
        let want = reference.sources().sample_interpolated(0.0, uv);
        let got = frame.fetch(x, top_row).truncate();
        assert!(
            (got - want).length() < 1e-3,
            "dry pixel {x} altered: got {got}, want {want}"
        );
    }
}
