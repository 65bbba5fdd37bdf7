use clap::Parser;
use face_insight::config::{AnalyzerArgs, OverlayArgs};
use face_insight::{
    install_ctrl_c, CameraSource, DeepFaceClient, HighguiWindow, OverlayLoop, StopFlag,
};
use log::info;

#[derive(Parser, Debug)]
#[command(about = "Webcam preview with face age, gender and emotion overlay")]
struct Args {
    #[command(flatten)]
    overlay: OverlayArgs,

    #[command(flatten)]
    analyzer: AnalyzerArgs,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Args = Args::parse();

    let settings = args.overlay.loop_settings()?;
    let analyzer = DeepFaceClient::new(args.analyzer.deepface_config()?)?;
    info!("Sending frames to {}", analyzer.endpoint());

    let camera = CameraSource::open(args.overlay.camera)?;

    let stop = StopFlag::default();
    install_ctrl_c(stop.clone())?;

    let window = HighguiWindow::new(&args.overlay.window)?;
    let mut overlay = OverlayLoop::new(settings, analyzer, stop);
    let summary = overlay.run(camera, window)?;
    info!(
        "Rendered {} frames, {} analyses ({} failed)",
        summary.frames, summary.analyses, summary.failures
    );
    Ok(())
}
