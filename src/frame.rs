//! Owned pixel buffers: `Frame` for RGB8 video frames and `Mask` for
//! per-pixel coverage/probability in [0, 1].

pub type Rgb8 = [u8; 3];

#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // tightly packed rgb8, row major
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0])
    }

    pub fn filled(width: u32, height: u32, rgb: Rgb8) -> Self {
        let mut data = vec![0u8; width as usize * height as usize * 3];
        for px in data.chunks_exact_mut(3) {
            px.copy_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_rgb_image(img: &image::RgbImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            data: img.as_raw().clone(),
        }
    }

    pub fn to_rgb_image(&self) -> image::RgbImage {
        image::RgbImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| image::RgbImage::new(self.width, self.height))
    }

    #[inline]
    fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb8 {
        let i = self.idx(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: Rgb8) {
        let i = self.idx(x, y);
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Rec.601 luma of one pixel, 0..=255.
    #[inline]
    pub fn luminance(&self, x: u32, y: u32) -> u8 {
        let [r, g, b] = self.pixel(x, y);
        ((0.299 * f32::from(r)) + (0.587 * f32::from(g)) + (0.114 * f32::from(b))).round() as u8
    }

    /// Bilinear sample at a fractional position. `None` outside the
    /// buffer; neighbor taps clamp at the edges.
    pub fn sample_bilinear(&self, x: f64, y: f64) -> Option<[f64; 3]> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let max_x = f64::from(self.width - 1);
        let max_y = f64::from(self.height - 1);
        if x < -0.5 || y < -0.5 || x > max_x + 0.5 || y > max_y + 0.5 {
            return None;
        }

        let xc = x.clamp(0.0, max_x);
        let yc = y.clamp(0.0, max_y);
        let x0 = xc.floor() as u32;
        let y0 = yc.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = xc - f64::from(x0);
        let fy = yc - f64::from(y0);

        let p00 = self.pixel(x0, y0);
        let p10 = self.pixel(x1, y0);
        let p01 = self.pixel(x0, y1);
        let p11 = self.pixel(x1, y1);

        let mut out = [0.0f64; 3];
        for c in 0..3 {
            let top = f64::from(p00[c]) * (1.0 - fx) + f64::from(p10[c]) * fx;
            let bot = f64::from(p01[c]) * (1.0 - fx) + f64::from(p11[c]) * fx;
            out[c] = top * (1.0 - fy) + bot * fy;
        }
        Some(out)
    }

    pub fn resize_bilinear(&self, width: u32, height: u32) -> Frame {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let mut out = Frame::new(width, height);
        if width == 0 || height == 0 || self.width == 0 || self.height == 0 {
            return out;
        }
        let sx = f64::from(self.width) / f64::from(width);
        let sy = f64::from(self.height) / f64::from(height);
        for y in 0..height {
            for x in 0..width {
                let src_x = (f64::from(x) + 0.5) * sx - 0.5;
                let src_y = (f64::from(y) + 0.5) * sy - 0.5;
                if let Some(px) = self.sample_bilinear(src_x, src_y) {
                    out.set_pixel(
                        x,
                        y,
                        [
                            px[0].round().clamp(0.0, 255.0) as u8,
                            px[1].round().clamp(0.0, 255.0) as u8,
                            px[2].round().clamp(0.0, 255.0) as u8,
                        ],
                    );
                }
            }
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>, // [0, 1], row major
}

impl Mask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    pub fn filled(width: u32, height: u32, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value.clamp(0.0, 1.0); width as usize * height as usize],
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        self.data[y as usize * self.width as usize + x as usize] = value.clamp(0.0, 1.0);
    }

    /// Rasterizes a filled disc, setting covered pixels to 1.
    pub fn fill_disc(&mut self, cx: f64, cy: f64, radius: f64) {
        if radius <= 0.0 {
            return;
        }
        let r2 = radius * radius;
        let x0 = ((cx - radius).floor().max(0.0)) as u32;
        let y0 = ((cy - radius).floor().max(0.0)) as u32;
        let x1 = ((cx + radius).ceil() as i64).clamp(0, i64::from(self.width)) as u32;
        let y1 = ((cy + radius).ceil() as i64).clamp(0, i64::from(self.height)) as u32;
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = f64::from(x) + 0.5 - cx;
                let dy = f64::from(y) + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.set(x, y, 1.0);
                }
            }
        }
    }

    /// Binary mask from frame luma: 1 where luma exceeds `threshold`.
    pub fn from_luminance_threshold(frame: &Frame, threshold: u8) -> Self {
        let mut mask = Mask::new(frame.width, frame.height);
        for y in 0..frame.height {
            for x in 0..frame.width {
                if frame.luminance(x, y) > threshold {
                    mask.set(x, y, 1.0);
                }
            }
        }
        mask
    }

    /// Elementwise minimum; both masks must share dimensions.
    pub fn intersected(&self, other: &Mask) -> Mask {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        let mut out = self.clone();
        for (a, b) in out.data.iter_mut().zip(other.data.iter()) {
            *a = a.min(*b);
        }
        out
    }

    /// 0/1 mask from a probability mask at `threshold`.
    pub fn binarized(&self, threshold: f32) -> Mask {
        let mut out = self.clone();
        for v in out.data.iter_mut() {
            *v = if *v > threshold { 1.0 } else { 0.0 };
        }
        out
    }

    pub fn resize_nearest(&self, width: u32, height: u32) -> Mask {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let mut out = Mask::new(width, height);
        if width == 0 || height == 0 || self.width == 0 || self.height == 0 {
            return out;
        }
        for y in 0..height {
            for x in 0..width {
                let sx = (u64::from(x) * u64::from(self.width) / u64::from(width))
                    .min(u64::from(self.width - 1)) as u32;
                let sy = (u64::from(y) * u64::from(self.height) / u64::from(height))
                    .min(u64::from(self.height - 1)) as u32;
                out.set(x, y, self.get(sx, sy));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_frame_has_uniform_pixels() {
        let f = Frame::filled(3, 2, [10, 20, 30]);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(f.pixel(x, y), [10, 20, 30]);
            }
        }
    }

    #[test]
    fn bilinear_sample_interpolates_midpoint() {
        let mut f = Frame::new(2, 1);
        f.set_pixel(0, 0, [0, 0, 0]);
        f.set_pixel(1, 0, [100, 200, 50]);
        let s = f.sample_bilinear(0.5, 0.0).unwrap();
        assert!((s[0] - 50.0).abs() < 1e-9);
        assert!((s[1] - 100.0).abs() < 1e-9);
        assert!((s[2] - 25.0).abs() < 1e-9);
    }

    #[test]
    fn bilinear_sample_outside_is_none() {
        let f = Frame::new(4, 4);
        assert!(f.sample_bilinear(-2.0, 0.0).is_none());
        assert!(f.sample_bilinear(0.0, 10.0).is_none());
    }

    #[test]
    fn resize_preserves_constant_color() {
        let f = Frame::filled(8, 8, [7, 77, 177]);
        let r = f.resize_bilinear(3, 5);
        assert_eq!(r.width, 3);
        assert_eq!(r.height, 5);
        for y in 0..5 {
            for x in 0..3 {
                assert_eq!(r.pixel(x, y), [7, 77, 177]);
            }
        }
    }

    #[test]
    fn disc_fill_covers_center_not_corners() {
        let mut m = Mask::new(11, 11);
        m.fill_disc(5.5, 5.5, 3.0);
        assert_eq!(m.get(5, 5), 1.0);
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(10, 10), 0.0);
    }

    #[test]
    fn zero_radius_disc_is_empty() {
        let mut m = Mask::new(4, 4);
        m.fill_disc(2.0, 2.0, 0.0);
        assert!(m.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn luminance_threshold_splits_dark_and_bright() {
        let mut f = Frame::new(2, 1);
        f.set_pixel(0, 0, [2, 2, 2]);
        f.set_pixel(1, 0, [200, 200, 200]);
        let m = Mask::from_luminance_threshold(&f, 5);
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(1, 0), 1.0);
    }

    #[test]
    fn roundtrip_through_image_crate() {
        let mut f = Frame::new(2, 2);
        f.set_pixel(1, 0, [9, 8, 7]);
        let back = Frame::from_rgb_image(&f.to_rgb_image());
        assert_eq!(back, f);
    }
}
