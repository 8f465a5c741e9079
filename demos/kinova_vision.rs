use tokio::fs::File;

use contact_explore::{
    config::ExploreConfig,
    vision::{run_viewer, Bgr24, Gray16Le, PngSink, RawVideoSource},
    Result,
};

/// Show the color and depth streams of the arm camera side by side.
///
/// The RTSP streams are decoded outside, e.g.
///     ffmpeg -i rtsp://192.168.1.10/color -f rawvideo -pix_fmt bgr24 color.raw
///     ffmpeg -i rtsp://192.168.1.10/depth -f rawvideo -pix_fmt gray16le depth.raw
/// with named pipes for live viewing.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let vision = ExploreConfig::load_or_default().vision;
    log::info!("color stream {}, depth stream {}", vision.color_url, vision.depth_url);

    let [cw, ch] = vision.color_size;
    let [dw, dh] = vision.depth_size;
    let mut color =
        RawVideoSource::<File, Bgr24>::open("color", &vision.color_input, cw, ch).await?;
    let mut depth =
        RawVideoSource::<File, Gray16Le>::open("depth", &vision.depth_input, dw, dh).await?;
    let mut sink = PngSink::new(&vision.output);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let stats = run_viewer(&mut color, &mut depth, &mut sink, vision.depth_alpha, shutdown).await?;
    println!("{} frames shown ({:?})", stats.frames, stats.exit);
    Ok(())
}
