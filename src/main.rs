//! Stillwave - animated ocean surfaces composited into still photographs
//!
//! Headless renderer: loads a photograph set (mask + image sequences), runs
//! the simulation pipeline, and writes composited PNG frames.

use clap::Parser;

use stillwave::cli::Args;
use stillwave::compositor::frame_to_rgba8;
use stillwave::params::LightingParams;
use stillwave::photo::PhotoSet;
use stillwave::pipeline::Pipeline;

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(error) = run(args) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let reflection_pattern = args.reflection.clone().unwrap_or_else(|| args.source.clone());
    let photos = PhotoSet::load(&args.mask, &args.source, &reflection_pattern, args.frames)?;

    let render_config = args.render_config()?;
    let recording = args.recording_config()?;

    let mut pipeline = Pipeline::new(
        args.wave_params(),
        args.camera_params(),
        LightingParams::default(),
        render_config,
        photos,
    )?;
    pipeline.set_time_lapse_index(args.timelapse)?;
    if args.sphere_radius > 0.0 {
        pipeline.scatter_spheres(args.sphere_radius, 352);
    }

    let total_frames = recording.total_frames();
    let dt = 1.0 / recording.fps as f32;
    log::info!(
        "rendering {total_frames} frames at {} fps into {}",
        recording.fps,
        recording.frames_dir()
    );

    for frame_num in 0..total_frames {
        let now = frame_num as f64 * dt as f64;
        pipeline.advance(now, dt);
        let frame = pipeline.composite();

        let frame_path = format!("{}/frame_{:05}.png", recording.frames_dir(), frame_num);
        image::save_buffer(
            &frame_path,
            &frame_to_rgba8(frame),
            frame.width() as u32,
            frame.height() as u32,
            image::ExtendedColorType::Rgba8,
        )?;
    }

    println!(
        "Rendered {} frames ({}s at {} fps) to {}",
        total_frames, args.duration, recording.fps, recording.frames_dir()
    );
    Ok(())
}
