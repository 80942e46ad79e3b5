//! Masked compositing over `Frame` buffers.
//!
//! Every operation here takes the background's dimensions as authoritative:
//! a foreground or mask of a different size is resized to match before
//! blending (bilinear for frames, nearest for masks). Callers never see a
//! dimension error from this module.

use std::borrow::Cow;

use crate::frame::{Frame, Mask, Rgb8};

fn fit_frame<'a>(fg: &'a Frame, width: u32, height: u32) -> Cow<'a, Frame> {
    if fg.width == width && fg.height == height {
        Cow::Borrowed(fg)
    } else {
        Cow::Owned(fg.resize_bilinear(width, height))
    }
}

fn fit_mask<'a>(mask: &'a Mask, width: u32, height: u32) -> Cow<'a, Mask> {
    if mask.width == width && mask.height == height {
        Cow::Borrowed(mask)
    } else {
        Cow::Owned(mask.resize_nearest(width, height))
    }
}

/// Binary-mask merge: foreground replaces background wherever mask > 0.
pub fn binary_merge_in_place(bg: &mut Frame, fg: &Frame, mask: &Mask) {
    let fg = fit_frame(fg, bg.width, bg.height);
    let mask = fit_mask(mask, bg.width, bg.height);
    for y in 0..bg.height {
        for x in 0..bg.width {
            if mask.get(x, y) > 0.0 {
                bg.set_pixel(x, y, fg.pixel(x, y));
            }
        }
    }
}

/// Continuous-alpha blend: `out = bg*(1-a) + fg*a` per pixel.
pub fn alpha_blend_in_place(bg: &mut Frame, fg: &Frame, alpha: &Mask) {
    let fg = fit_frame(fg, bg.width, bg.height);
    let alpha = fit_mask(alpha, bg.width, bg.height);
    for y in 0..bg.height {
        for x in 0..bg.width {
            let a = f64::from(alpha.get(x, y));
            if a <= 0.0 {
                continue;
            }
            let b = bg.pixel(x, y);
            let f = fg.pixel(x, y);
            let mut out = [0u8; 3];
            for c in 0..3 {
                let v = f64::from(b[c]) * (1.0 - a) + f64::from(f[c]) * a;
                out[c] = v.round().clamp(0.0, 255.0) as u8;
            }
            bg.set_pixel(x, y, out);
        }
    }
}

/// Blends a constant color at fixed `opacity` into masked pixels
/// (mask > 0). Used for the skin-tint effect.
pub fn tint_blend_in_place(bg: &mut Frame, tint: Rgb8, opacity: f32, mask: &Mask) {
    let opacity = f64::from(opacity.clamp(0.0, 1.0));
    let mask = fit_mask(mask, bg.width, bg.height);
    for y in 0..bg.height {
        for x in 0..bg.width {
            if mask.get(x, y) <= 0.0 {
                continue;
            }
            let b = bg.pixel(x, y);
            let mut out = [0u8; 3];
            for c in 0..3 {
                let v = f64::from(b[c]) * (1.0 - opacity) + f64::from(tint[c]) * opacity;
                out[c] = v.round().clamp(0.0, 255.0) as u8;
            }
            bg.set_pixel(x, y, out);
        }
    }
}
