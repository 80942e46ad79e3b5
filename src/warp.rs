//! Piecewise-affine triangle warping and rigid quad warping.

use kurbo::{Affine, Point};
use nalgebra::Matrix3;

use crate::{
    composite,
    error::SuitupResult,
    frame::{Frame, Mask},
    geom,
};

/// Supersampling grid per axis for triangle edge coverage.
const COVERAGE_GRID: u32 = 4;

/// Luma above this value counts as foreground when a warped layer is
/// merged by threshold. Near-black texture pixels therefore read as
/// background; that is a known limitation of the threshold mask, kept
/// deliberately.
pub const FOREGROUND_LUMA_THRESHOLD: u8 = 5;

#[inline]
fn edge(a: Point, b: Point, p: Point) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Fractional coverage of a pixel by a triangle, estimated on a
/// `COVERAGE_GRID`² subsample grid. Winding-agnostic.
fn pixel_coverage(tri: &[Point; 3], px: u32, py: u32) -> f64 {
    let orient = geom::triangle_area2(tri).signum();
    let n = COVERAGE_GRID;
    let mut inside = 0u32;
    for sy in 0..n {
        for sx in 0..n {
            let p = Point::new(
                f64::from(px) + (f64::from(sx) + 0.5) / f64::from(n),
                f64::from(py) + (f64::from(sy) + 0.5) / f64::from(n),
            );
            let e0 = edge(tri[0], tri[1], p) * orient;
            let e1 = edge(tri[1], tri[2], p) * orient;
            let e2 = edge(tri[2], tri[0], p) * orient;
            if e0 >= 0.0 && e1 >= 0.0 && e2 >= 0.0 {
                inside += 1;
            }
        }
    }
    f64::from(inside) / f64::from(n * n)
}

/// Warps one source triangle of `src` onto the destination triangle of
/// `dst`, alpha-compositing over what is already there. Work happens in
/// the two triangles' local bounding-box coordinates; output is clipped
/// to `dst` and pixels falling outside are dropped silently.
///
/// Degenerate (collinear) triangles return `DegenerateGeometry` without
/// touching `dst`; callers skip those regions for the frame.
pub fn warp_triangle(
    src: &Frame,
    dst: &mut Frame,
    src_tri: &[Point; 3],
    dst_tri: &[Point; 3],
) -> SuitupResult<()> {
    let src_rect = geom::bounding_box(src_tri);
    let dst_rect = geom::bounding_box(dst_tri);
    if src_rect.is_empty() || dst_rect.is_empty() {
        return Ok(());
    }

    let src_local: [Point; 3] = std::array::from_fn(|i| {
        Point::new(
            src_tri[i].x - src_rect.x as f64,
            src_tri[i].y - src_rect.y as f64,
        )
    });
    let dst_local: [Point; 3] = std::array::from_fn(|i| {
        Point::new(
            dst_tri[i].x - dst_rect.x as f64,
            dst_tri[i].y - dst_rect.y as f64,
        )
    });

    let map = geom::solve_affine(&src_local, &dst_local)?;
    let inv = map.inverse();

    let clip = dst_rect.clipped_to(dst.width, dst.height);
    if clip.is_empty() {
        return Ok(());
    }

    let src_max_x = f64::from(src.width.saturating_sub(1));
    let src_max_y = f64::from(src.height.saturating_sub(1));

    for gy in clip.y..clip.y + i64::from(clip.h) {
        for gx in clip.x..clip.x + i64::from(clip.w) {
            let lx = (gx - dst_rect.x) as u32;
            let ly = (gy - dst_rect.y) as u32;
            let cov = pixel_coverage(&dst_local, lx, ly);
            if cov <= 0.0 {
                continue;
            }

            let local = inv * Point::new(f64::from(lx) + 0.5, f64::from(ly) + 0.5);
            let sx = (local.x - 0.5 + src_rect.x as f64).clamp(0.0, src_max_x);
            let sy = (local.y - 0.5 + src_rect.y as f64).clamp(0.0, src_max_y);
            let Some(sample) = src.sample_bilinear(sx, sy) else {
                continue;
            };

            let (ux, uy) = (gx as u32, gy as u32);
            let under = dst.pixel(ux, uy);
            let mut out = [0u8; 3];
            for c in 0..3 {
                let v = f64::from(under[c]) * (1.0 - cov) + sample[c] * cov;
                out[c] = v.round().clamp(0.0, 255.0) as u8;
            }
            dst.set_pixel(ux, uy, out);
        }
    }
    Ok(())
}

/// Resamples the whole of `src` through a projective transform into a
/// layer the size of `dst`, then merges it by luminance threshold: any
/// warped pixel brighter than `FOREGROUND_LUMA_THRESHOLD` replaces the
/// destination pixel.
pub fn warp_quad(
    src: &Frame,
    dst: &mut Frame,
    src_quad: &[Point; 4],
    dst_quad: &[Point; 4],
) -> SuitupResult<()> {
    let h = geom::solve_perspective(src_quad, dst_quad)?;
    let layer = perspective_layer(src, &h, dst.width, dst.height)?;
    let mask = Mask::from_luminance_threshold(&layer, FOREGROUND_LUMA_THRESHOLD);
    composite::binary_merge_in_place(dst, &layer, &mask);
    Ok(())
}

/// Full-frame affine resample merged by the same luminance threshold as
/// `warp_quad`. Used for single-transform overlays (hair).
pub fn warp_affine_over(src: &Frame, dst: &mut Frame, map: Affine) -> SuitupResult<()> {
    let layer = affine_layer(src, map, dst.width, dst.height);
    let mask = Mask::from_luminance_threshold(&layer, FOREGROUND_LUMA_THRESHOLD);
    composite::binary_merge_in_place(dst, &layer, &mask);
    Ok(())
}

/// Inverse-maps every output pixel through `h⁻¹` and bilinearly samples
/// `src`; unmapped pixels stay black.
pub fn perspective_layer(
    src: &Frame,
    h: &Matrix3<f64>,
    width: u32,
    height: u32,
) -> SuitupResult<Frame> {
    let inv = geom::invert(h)?;
    let mut out = Frame::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let p = geom::project(&inv, Point::new(f64::from(x), f64::from(y)));
            if let Some(sample) = src.sample_bilinear(p.x, p.y) {
                out.set_pixel(
                    x,
                    y,
                    [
                        sample[0].round().clamp(0.0, 255.0) as u8,
                        sample[1].round().clamp(0.0, 255.0) as u8,
                        sample[2].round().clamp(0.0, 255.0) as u8,
                    ],
                );
            }
        }
    }
    Ok(out)
}

/// Affine counterpart of [`perspective_layer`].
pub fn affine_layer(src: &Frame, map: Affine, width: u32, height: u32) -> Frame {
    let inv = map.inverse();
    let mut out = Frame::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let p = inv * Point::new(f64::from(x), f64::from(y));
            if let Some(sample) = src.sample_bilinear(p.x, p.y) {
                out.set_pixel(
                    x,
                    y,
                    [
                        sample[0].round().clamp(0.0, 255.0) as u8,
                        sample[1].round().clamp(0.0, 255.0) as u8,
                        sample[2].round().clamp(0.0, 255.0) as u8,
                    ],
                );
            }
        }
    }
    out
}

/// Resamples a mask through an affine map with nearest sampling.
pub fn affine_mask_layer(mask: &Mask, map: Affine, width: u32, height: u32) -> Mask {
    let inv = map.inverse();
    let mut out = Mask::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let p = inv * Point::new(f64::from(x), f64::from(y));
            let sx = p.x.round();
            let sy = p.y.round();
            if sx >= 0.0 && sy >= 0.0 && (sx as u32) < mask.width && (sy as u32) < mask.height {
                out.set(x, y, mask.get(sx as u32, sy as u32));
            }
        }
    }
    out
}
