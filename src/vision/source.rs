//! Frame sources and sinks of the viewer.
//!
//! Streams arrive as raw fixed-size frames, for instance from an ffmpeg
//! process decoding the camera's RTSP stream to `bgr24` or `gray16le`.

use std::{
    marker::PhantomData,
    path::{Path, PathBuf},
};

use plotters::prelude::*;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{
    error::{Error, Result},
    plot::plot_err,
    vision::frame::{ColorFrame, Frame},
};

/// Anything that yields frames until its stream ends
#[allow(async_fn_in_trait)]
pub trait FrameSource {
    type Frame;

    /// Next frame, or None once the stream has ended
    async fn read(&mut self) -> Result<Option<Self::Frame>>;

    /// Close the underlying stream. Further reads fail.
    fn release(&mut self);

    fn is_released(&self) -> bool;
}

/// Pixel layout of a raw video stream
pub trait RawFormat {
    type Pixel: Copy;
    const CHANNELS: usize;
    const BYTES_PER_PIXEL: usize;

    fn decode(bytes: &[u8]) -> Vec<Self::Pixel>;
}

/// 8-bit blue, green, red
#[derive(Clone, Copy, Debug)]
pub struct Bgr24;

impl RawFormat for Bgr24 {
    type Pixel = u8;
    const CHANNELS: usize = 3;
    const BYTES_PER_PIXEL: usize = 3;

    fn decode(bytes: &[u8]) -> Vec<u8> {
        bytes.to_vec()
    }
}

/// 16-bit little endian gray, the depth stream layout
#[derive(Clone, Copy, Debug)]
pub struct Gray16Le;

impl RawFormat for Gray16Le {
    type Pixel = u16;
    const CHANNELS: usize = 1;
    const BYTES_PER_PIXEL: usize = 2;

    fn decode(bytes: &[u8]) -> Vec<u16> {
        bytes
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
            .collect()
    }
}

/// Reads raw frames of a fixed resolution from an async byte stream
pub struct RawVideoSource<R, F> {
    name: String,
    reader: Option<R>,
    width: usize,
    height: usize,
    frames_read: usize,
    format: PhantomData<F>,
}

impl<R: AsyncRead + Unpin, F: RawFormat> RawVideoSource<R, F> {
    pub fn new(name: &str, reader: R, width: usize, height: usize) -> Self {
        RawVideoSource {
            name: name.to_string(),
            reader: Some(reader),
            width,
            height,
            frames_read: 0,
            format: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    fn frame_bytes(&self) -> usize {
        self.width * self.height * F::BYTES_PER_PIXEL
    }
}

impl<F: RawFormat> RawVideoSource<tokio::fs::File, F> {
    /// Open a raw stream stored in a file or a named pipe
    pub async fn open(name: &str, path: &Path, width: usize, height: usize) -> Result<Self> {
        let file = tokio::fs::File::open(path).await.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("opened {} stream from {}", name, path.display());
        Ok(Self::new(name, file, width, height))
    }
}

impl<R: AsyncRead + Unpin, F: RawFormat> FrameSource for RawVideoSource<R, F> {
    type Frame = Frame<F::Pixel>;

    async fn read(&mut self) -> Result<Option<Self::Frame>> {
        let mut buf = vec![0u8; self.frame_bytes()];
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| Error::Released(self.name.clone()))?;

        match reader.read_exact(&mut buf).await {
            Ok(_) => {
                self.frames_read += 1;
                Frame::new(self.width, self.height, F::CHANNELS, F::decode(&buf)).map(Some)
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                log::info!("{} stream ended after {} frames", self.name, self.frames_read);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn release(&mut self) {
        if self.reader.take().is_some() {
            log::debug!("released {} stream", self.name);
        }
    }

    fn is_released(&self) -> bool {
        self.reader.is_none()
    }
}

/// Destination of composed frames
pub trait FrameSink {
    fn show(&mut self, frame: &ColorFrame) -> Result<()>;
}

/// Overwrites a PNG file with every frame shown
#[derive(Clone, Debug)]
pub struct PngSink {
    path: PathBuf,
    frames_written: usize,
}

impl PngSink {
    pub fn new(path: &Path) -> Self {
        PngSink {
            path: path.to_path_buf(),
            frames_written: 0,
        }
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }
}

impl FrameSink for PngSink {
    fn show(&mut self, frame: &ColorFrame) -> Result<()> {
        if frame.channels() != 3 || frame.width() == 0 || frame.height() == 0 {
            return Err(Error::FrameShape(format!(
                "cannot write {:?} as a color image",
                frame.shape()
            )));
        }
        let root = BitMapBackend::new(&self.path, (frame.width() as u32, frame.height() as u32))
            .into_drawing_area();
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                let bgr = frame.pixel(x, y);
                root.draw_pixel((x as i32, y as i32), &RGBColor(bgr[2], bgr[1], bgr[0]))
                    .map_err(plot_err)?;
            }
        }
        root.present().map_err(plot_err)?;
        self.frames_written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod source_tests {
    use super::*;

    #[tokio::test]
    async fn reads_frames_until_end_of_stream() {
        // Arrange: two 2x1 depth frames and a trailing partial frame
        let bytes: &[u8] = &[1, 0, 0, 1, 2, 0, 255, 255, 9];
        let mut source = RawVideoSource::<_, Gray16Le>::new("depth", bytes, 2, 1);

        // Act
        let first = source.read().await.unwrap().unwrap();
        let second = source.read().await.unwrap().unwrap();
        let end = source.read().await.unwrap();

        // Assert
        assert_eq!(first.data(), &[1, 256]);
        assert_eq!(second.data(), &[2, 65535]);
        assert!(end.is_none());
        assert_eq!(source.frames_read(), 2);
    }

    #[tokio::test]
    async fn color_frames_keep_bgr_order() {
        let bytes: &[u8] = &[10, 20, 30, 40, 50, 60];
        let mut source = RawVideoSource::<_, Bgr24>::new("color", bytes, 2, 1);
        let frame = source.read().await.unwrap().unwrap();
        assert_eq!(frame.shape(), (1, 2, 3));
        assert_eq!(frame.pixel(1, 0), &[40, 50, 60]);
    }

    #[tokio::test]
    async fn read_after_release_fails() {
        let bytes: &[u8] = &[0; 12];
        let mut source = RawVideoSource::<_, Bgr24>::new("color", bytes, 2, 2);
        source.release();
        assert!(source.is_released());
        assert!(matches!(source.read().await, Err(Error::Released(name)) if name == "color"));
    }

    #[tokio::test]
    async fn open_missing_file_fails() {
        let path = std::env::temp_dir().join("contact_explore_no_such_stream.raw");
        let result = RawVideoSource::<tokio::fs::File, Gray16Le>::open("depth", &path, 2, 2).await;
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn png_sink_rejects_gray_frames() {
        let mut sink = PngSink::new(&std::env::temp_dir().join("contact_explore_gray.png"));
        let gray = Frame::filled(2, 2, 1, 0u8);
        assert!(matches!(sink.show(&gray), Err(Error::FrameShape(_))));
        assert_eq!(sink.frames_written(), 0);
    }

    #[test]
    fn png_sink_writes_color_frames() {
        // Arrange
        let path = std::env::temp_dir().join("contact_explore_sink.png");
        let _ = std::fs::remove_file(&path);
        let mut sink = PngSink::new(&path);
        let frame = Frame::new(2, 1, 3, vec![255u8, 0, 0, 0, 0, 255]).unwrap();

        // Act
        sink.show(&frame).unwrap();
        sink.show(&frame).unwrap();

        // Assert
        assert!(path.exists());
        assert_eq!(sink.frames_written(), 2);
        std::fs::remove_file(&path).unwrap();
    }
}
