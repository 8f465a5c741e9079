//! Interleaved image buffers and the pixel operations of the depth viewer.

use crate::{
    error::{Error, Result},
    types::Float,
};

/// Row-major image with interleaved channels
#[derive(Clone, PartialEq, Debug)]
pub struct Frame<T> {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<T>,
}

/// 8-bit color image in BGR order
pub type ColorFrame = Frame<u8>;
/// 8-bit single channel image
pub type GrayFrame = Frame<u8>;
/// 16-bit depth image
pub type DepthFrame = Frame<u16>;

impl<T: Copy> Frame<T> {
    pub fn new(width: usize, height: usize, channels: usize, data: Vec<T>) -> Result<Self> {
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(Error::FrameShape(format!(
                "{}x{}x{} frame needs {} values, got {}",
                height,
                width,
                channels,
                expected,
                data.len()
            )));
        }
        Ok(Frame {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn filled(width: usize, height: usize, channels: usize, value: T) -> Self {
        Frame {
            width,
            height,
            channels,
            data: vec![value; width * height * channels],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// (height, width, channels)
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Channel values of the pixel at column x, row y
    pub fn pixel(&self, x: usize, y: usize) -> &[T] {
        let start = (y * self.width + x) * self.channels;
        &self.data[start..start + self.channels]
    }

    fn row(&self, y: usize) -> &[T] {
        let stride = self.width * self.channels;
        &self.data[y * stride..(y + 1) * stride]
    }
}

/// Scale, take the absolute value and saturate to 8 bits:
///     dst = saturate_u8(round(|alpha * src + beta|))
pub fn convert_scale_abs(src: &DepthFrame, alpha: Float, beta: Float) -> GrayFrame {
    let data = src
        .data
        .iter()
        .map(|&v| saturate_u8((alpha * v as Float + beta).abs()))
        .collect();
    Frame {
        width: src.width,
        height: src.height,
        channels: src.channels,
        data,
    }
}

fn saturate_u8(v: Float) -> u8 {
    v.round_ties_even().clamp(0., 255.) as u8
}

/// JET color of a gray level, as (b, g, r)
pub fn jet(level: u8) -> [u8; 3] {
    let v = level as Float / 255.;
    let channel = |center: Float| saturate_u8(255. * (1.5 - (4. * v - center).abs()).clamp(0., 1.));
    [channel(1.), channel(2.), channel(3.)]
}

/// Map a gray image through the JET colormap, dark blue for 0 and dark red
/// for 255. Multi-channel input uses its first channel.
pub fn apply_colormap_jet(gray: &GrayFrame) -> ColorFrame {
    let lut: Vec<[u8; 3]> = (0..=255u8).map(jet).collect();
    let mut data = Vec::with_capacity(gray.width * gray.height * 3);
    for pixel in gray.data.chunks_exact(gray.channels.max(1)) {
        data.extend_from_slice(&lut[pixel[0] as usize]);
    }
    Frame {
        width: gray.width,
        height: gray.height,
        channels: 3,
        data,
    }
}

/// Source pixels and their weights covering each destination pixel of a
/// resized axis
fn area_weights(src_len: usize, dst_len: usize) -> Vec<Vec<(usize, Float)>> {
    let scale = src_len as Float / dst_len as Float;
    (0..dst_len)
        .map(|i| {
            let start = i as Float * scale;
            let end = start + scale;
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src_len);
            (first..last)
                .filter_map(|j| {
                    let overlap = (end.min(j as Float + 1.) - start.max(j as Float)).max(0.);
                    (overlap > 0.).then(|| (j, overlap / scale))
                })
                .collect()
        })
        .collect()
}

/// Resize by averaging the source area under each destination pixel
pub fn resize_area(src: &ColorFrame, width: usize, height: usize) -> Result<ColorFrame> {
    if width == 0 || height == 0 || src.width == 0 || src.height == 0 {
        return Err(Error::FrameShape(format!(
            "cannot resize {}x{} to {}x{}",
            src.height, src.width, height, width
        )));
    }
    let xw = area_weights(src.width, width);
    let yw = area_weights(src.height, height);
    let c = src.channels;

    let mut data = Vec::with_capacity(width * height * c);
    let mut acc = vec![0.; c];
    for ys in yw.iter() {
        for xs in xw.iter() {
            acc.iter_mut().for_each(|a| *a = 0.);
            for &(sy, wy) in ys {
                for &(sx, wx) in xs {
                    let w = wy * wx;
                    for (a, &v) in acc.iter_mut().zip(src.pixel(sx, sy)) {
                        *a += w * v as Float;
                    }
                }
            }
            data.extend(acc.iter().map(|&a| saturate_u8(a)));
        }
    }
    Frame::new(width, height, c, data)
}

/// Place two images side by side
pub fn hstack<T: Copy>(left: &Frame<T>, right: &Frame<T>) -> Result<Frame<T>> {
    if left.height != right.height || left.channels != right.channels {
        return Err(Error::FrameShape(format!(
            "cannot stack {:?} next to {:?}",
            left.shape(),
            right.shape()
        )));
    }
    let mut data = Vec::with_capacity(left.data.len() + right.data.len());
    for y in 0..left.height {
        data.extend_from_slice(left.row(y));
        data.extend_from_slice(right.row(y));
    }
    Frame::new(left.width + right.width, left.height, left.channels, data)
}

/// Color image next to the colorized depth image. The color image is
/// resized to the depth resolution when their shapes differ.
pub fn compose(color: &ColorFrame, depth: &DepthFrame, alpha: Float) -> Result<ColorFrame> {
    let depth_colormap = apply_colormap_jet(&convert_scale_abs(depth, alpha, 0.));
    if color.shape() != depth_colormap.shape() {
        let resized = resize_area(color, depth_colormap.width, depth_colormap.height)?;
        hstack(&resized, &depth_colormap)
    } else {
        hstack(color, &depth_colormap)
    }
}
