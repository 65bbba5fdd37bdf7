use anyhow::Context;
use clap::Parser;
use face_insight::config::AnalyzerArgs;
use face_insight::overlay::draw_face;
use face_insight::{
    downscale, DeepFaceClient, Display, FaceAnalysis, FaceAnalyzer, HighguiWindow, ScaleFactors,
    OVERLAY_ACTIONS,
};
use log::info;
use opencv::prelude::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Analyze a still image and show the overlay")]
struct Args {
    /// Image to analyze.
    image: PathBuf,

    /// Scale applied before analysis, in (0, 1].
    #[clap(long, default_value_t = 1.0)]
    resize_factor: f64,

    #[command(flatten)]
    analyzer: AnalyzerArgs,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Args = Args::parse();

    let path = args.image.to_string_lossy();
    let mut frame = opencv::imgcodecs::imread_def(&path)?;
    if frame.size()?.width == 0 {
        anyhow::bail!("Could not read image {}", path);
    }

    let small = downscale(&frame, args.resize_factor)?;
    let scale = ScaleFactors::of(&frame, &small)?;

    let mut analyzer = DeepFaceClient::new(args.analyzer.deepface_config()?)?;
    let faces = analyzer
        .analyze(&small, &OVERLAY_ACTIONS)
        .context("Analysis failed")?;

    for face in &faces {
        info!(
            "{} | {} | {} region {:?}",
            face.gender_label(),
            face.age_label(),
            face.emotion_label(),
            face.region
        );
    }

    if let Some(face) = FaceAnalysis::primary(&faces) {
        draw_face(&mut frame, face, scale)?;
    } else {
        info!("No face found");
    }

    let mut window = HighguiWindow::new("face-insight")?;
    window.show(&frame)?;
    window.wait_for_key()?;
    window.close()?;
    Ok(())
}
