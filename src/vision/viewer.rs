use std::future::Future;

use crate::{
    error::Result,
    types::Float,
    vision::{
        frame::{compose, ColorFrame, DepthFrame},
        source::{FrameSink, FrameSource},
    },
};

/// Why the viewer loop stopped
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ViewerExit {
    Interrupted,
    StreamEnded,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ViewerStats {
    pub frames: usize,
    pub exit: ViewerExit,
}

/// Show color and colorized depth side by side until either stream ends or
/// `shutdown` resolves. Both sources are released when the loop exits, also
/// when it fails.
pub async fn run_viewer<C, D, S, F>(
    color: &mut C,
    depth: &mut D,
    sink: &mut S,
    depth_alpha: Float,
    shutdown: F,
) -> Result<ViewerStats>
where
    C: FrameSource<Frame = ColorFrame>,
    D: FrameSource<Frame = DepthFrame>,
    S: FrameSink,
    F: Future<Output = ()>,
{
    let result = view_frames(color, depth, sink, depth_alpha, shutdown).await;
    color.release();
    depth.release();
    match &result {
        Ok(stats) => log::info!("viewer stopped ({:?}) after {} frames", stats.exit, stats.frames),
        Err(e) => log::error!("viewer failed: {}", e),
    }
    result
}

async fn view_frames<C, D, S, F>(
    color: &mut C,
    depth: &mut D,
    sink: &mut S,
    depth_alpha: Float,
    shutdown: F,
) -> Result<ViewerStats>
where
    C: FrameSource<Frame = ColorFrame>,
    D: FrameSource<Frame = DepthFrame>,
    S: FrameSink,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut frames = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                return Ok(ViewerStats { frames, exit: ViewerExit::Interrupted });
            }
            pair = read_pair(color, depth) => {
                let Some((color_frame, depth_frame)) = pair? else {
                    return Ok(ViewerStats { frames, exit: ViewerExit::StreamEnded });
                };
                let image = compose(&color_frame, &depth_frame, depth_alpha)?;
                sink.show(&image)?;
                frames += 1;
            }
        }
    }
}

async fn read_pair<C, D>(color: &mut C, depth: &mut D) -> Result<Option<(ColorFrame, DepthFrame)>>
where
    C: FrameSource<Frame = ColorFrame>,
    D: FrameSource<Frame = DepthFrame>,
{
    let color_frame = color.read().await?;
    let depth_frame = depth.read().await?;
    Ok(color_frame.zip(depth_frame))
}

#[cfg(test)]
mod viewer_tests {
    use tokio::io::DuplexStream;

    use crate::{
        error::Error,
        vision::source::{Bgr24, Gray16Le, RawVideoSource},
    };

    use super::*;

    #[derive(Default)]
    struct CollectSink {
        frames: Vec<ColorFrame>,
        fail: bool,
    }

    impl FrameSink for CollectSink {
        fn show(&mut self, frame: &ColorFrame) -> Result<()> {
            if self.fail {
                return Err(Error::Plot("display closed".to_string()));
            }
            self.frames.push(frame.clone());
            Ok(())
        }
    }

    // 4x2 color and 2x1 depth, two frames each
    static COLOR: [u8; 48] = [60; 48];
    static DEPTH: [u8; 8] = [0, 0, 255, 0, 0, 0, 255, 0];

    fn color_source(bytes: &'static [u8]) -> RawVideoSource<&'static [u8], Bgr24> {
        RawVideoSource::new("color", bytes, 4, 2)
    }

    fn depth_source(bytes: &'static [u8]) -> RawVideoSource<&'static [u8], Gray16Le> {
        RawVideoSource::new("depth", bytes, 2, 1)
    }

    #[tokio::test]
    async fn releases_sources_at_end_of_stream() {
        // Arrange
        let mut color = color_source(&COLOR);
        let mut depth = depth_source(&DEPTH);
        let mut sink = CollectSink::default();

        // Act
        let stats = run_viewer(&mut color, &mut depth, &mut sink, 1., std::future::pending())
            .await
            .unwrap();

        // Assert
        assert_eq!(
            stats,
            ViewerStats {
                frames: 2,
                exit: ViewerExit::StreamEnded
            }
        );
        assert!(color.is_released());
        assert!(depth.is_released());
        assert_eq!(sink.frames.len(), 2);
        let image = &sink.frames[0];
        assert_eq!(image.shape(), (1, 4, 3));
        assert_eq!(image.pixel(0, 0), &[60, 60, 60]);
        assert_eq!(image.pixel(2, 0), &[128, 0, 0]);
        assert_eq!(image.pixel(3, 0), &[0, 0, 128]);
    }

    #[tokio::test]
    async fn releases_sources_on_shutdown() {
        // Arrange: streams that never deliver a byte
        let (color_reader, _color_writer) = tokio::io::duplex(64);
        let (depth_reader, _depth_writer) = tokio::io::duplex(64);
        let mut color = RawVideoSource::<DuplexStream, Bgr24>::new("color", color_reader, 4, 2);
        let mut depth = RawVideoSource::<DuplexStream, Gray16Le>::new("depth", depth_reader, 2, 1);
        let mut sink = CollectSink::default();

        // Act
        let stats = run_viewer(&mut color, &mut depth, &mut sink, 1., async {})
            .await
            .unwrap();

        // Assert
        assert_eq!(stats.exit, ViewerExit::Interrupted);
        assert_eq!(stats.frames, 0);
        assert!(color.is_released());
        assert!(depth.is_released());
    }

    #[tokio::test]
    async fn releases_sources_on_error() {
        let mut color = color_source(&COLOR);
        let mut depth = depth_source(&DEPTH);
        let mut sink = CollectSink {
            fail: true,
            ..Default::default()
        };

        let result =
            run_viewer(&mut color, &mut depth, &mut sink, 1., std::future::pending()).await;

        assert!(matches!(result, Err(Error::Plot(_))));
        assert!(color.is_released());
        assert!(depth.is_released());
    }

    #[tokio::test]
    async fn shorter_stream_ends_the_loop() {
        let mut color = color_source(&COLOR[..24]);
        let mut depth = depth_source(&DEPTH);
        let mut sink = CollectSink::default();

        let stats = run_viewer(&mut color, &mut depth, &mut sink, 1., std::future::pending())
            .await
            .unwrap();

        assert_eq!(stats.frames, 1);
        assert_eq!(stats.exit, ViewerExit::StreamEnded);
    }
}
