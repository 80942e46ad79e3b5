use kurbo::{Affine, Point};
use nalgebra::{Matrix3, SMatrix, SVector};

use crate::error::{SuitupError, SuitupResult};

/// Solutions below this determinant magnitude are treated as degenerate.
const SINGULAR_EPS: f64 = 1e-9;

/// Integer pixel rectangle covering a point set. `w`/`h` may be zero for
/// empty or collapsed input; callers skip zero-area rects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IRect {
    pub x: i64,
    pub y: i64,
    pub w: u32,
    pub h: u32,
}

impl IRect {
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Intersection with a `w × h` buffer anchored at the origin.
    pub fn clipped_to(&self, width: u32, height: u32) -> IRect {
        let x0 = self.x.clamp(0, i64::from(width));
        let y0 = self.y.clamp(0, i64::from(height));
        let x1 = (self.x + i64::from(self.w)).clamp(0, i64::from(width));
        let y1 = (self.y + i64::from(self.h)).clamp(0, i64::from(height));
        IRect {
            x: x0,
            y: y0,
            w: (x1 - x0) as u32,
            h: (y1 - y0) as u32,
        }
    }
}

pub fn bounding_box(points: &[Point]) -> IRect {
    if points.is_empty() {
        return IRect {
            x: 0,
            y: 0,
            w: 0,
            h: 0,
        };
    }

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let x = min_x.floor() as i64;
    let y = min_y.floor() as i64;
    IRect {
        x,
        y,
        w: (max_x.ceil() as i64 - x).max(0) as u32 + 1,
        h: (max_y.ceil() as i64 - y).max(0) as u32 + 1,
    }
}

/// Signed twice-area of a triangle; zero means collinear vertices.
pub fn triangle_area2(t: &[Point; 3]) -> f64 {
    (t[1].x - t[0].x) * (t[2].y - t[0].y) - (t[2].x - t[0].x) * (t[1].y - t[0].y)
}

/// The unique affine map taking `src[i]` to `dst[i]` for i = 0, 1, 2.
pub fn solve_affine(src: &[Point; 3], dst: &[Point; 3]) -> SuitupResult<Affine> {
    let det = triangle_area2(src);
    if det.abs() < SINGULAR_EPS {
        return Err(SuitupError::degenerate("collinear source triangle"));
    }
    if triangle_area2(dst).abs() < SINGULAR_EPS {
        return Err(SuitupError::degenerate("collinear destination triangle"));
    }

    let (dx1, dy1) = (src[1].x - src[0].x, src[1].y - src[0].y);
    let (dx2, dy2) = (src[2].x - src[0].x, src[2].y - src[0].y);

    let solve_row = |u0: f64, u1: f64, u2: f64| -> (f64, f64, f64) {
        let du1 = u1 - u0;
        let du2 = u2 - u0;
        let a = (du1 * dy2 - du2 * dy1) / det;
        let c = (du2 * dx1 - du1 * dx2) / det;
        let e = u0 - a * src[0].x - c * src[0].y;
        (a, c, e)
    };

    let (a, c, e) = solve_row(dst[0].x, dst[1].x, dst[2].x);
    let (b, d, f) = solve_row(dst[0].y, dst[1].y, dst[2].y);

    // kurbo coefficient order: (x, y) -> (a*x + c*y + e, b*x + d*y + f)
    Ok(Affine::new([a, b, c, d, e, f]))
}

/// The unique projective map taking `src[i]` to `dst[i]` for i = 0..4,
/// solved as the standard 8×8 homography system with h33 = 1.
pub fn solve_perspective(src: &[Point; 4], dst: &[Point; 4]) -> SuitupResult<Matrix3<f64>> {
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for i in 0..4 {
        let (x, y) = (src[i].x, src[i].y);
        let (u, v) = (dst[i].x, dst[i].y);
        let r = 2 * i;

        a[(r, 0)] = x;
        a[(r, 1)] = y;
        a[(r, 2)] = 1.0;
        a[(r, 6)] = -x * u;
        a[(r, 7)] = -y * u;
        b[r] = u;

        a[(r + 1, 3)] = x;
        a[(r + 1, 4)] = y;
        a[(r + 1, 5)] = 1.0;
        a[(r + 1, 6)] = -x * v;
        a[(r + 1, 7)] = -y * v;
        b[r + 1] = v;
    }

    let lu = a.lu();
    let h = lu
        .solve(&b)
        .ok_or_else(|| SuitupError::degenerate("singular perspective system"))?;

    Ok(Matrix3::new(
        h[0], h[1], h[2], //
        h[3], h[4], h[5], //
        h[6], h[7], 1.0,
    ))
}

/// Applies a homography to a point (homogeneous divide).
pub fn project(h: &Matrix3<f64>, p: Point) -> Point {
    let w = h[(2, 0)] * p.x + h[(2, 1)] * p.y + h[(2, 2)];
    let w = if w.abs() < SINGULAR_EPS {
        SINGULAR_EPS.copysign(w)
    } else {
        w
    };
    Point::new(
        (h[(0, 0)] * p.x + h[(0, 1)] * p.y + h[(0, 2)]) / w,
        (h[(1, 0)] * p.x + h[(1, 1)] * p.y + h[(1, 2)]) / w,
    )
}

/// Inverse of a homography, failing on singular input.
pub fn invert(h: &Matrix3<f64>) -> SuitupResult<Matrix3<f64>> {
    h.try_inverse()
        .ok_or_else(|| SuitupError::degenerate("non-invertible perspective transform"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn bounding_box_covers_fractional_points() {
        let r = bounding_box(&[pt(1.2, 3.7), pt(4.1, 0.5), pt(2.0, 2.0)]);
        assert_eq!(r.x, 1);
        assert_eq!(r.y, 0);
        assert!(r.w >= 4);
        assert!(r.h >= 4);
    }

    #[test]
    fn clipped_to_drops_offscreen_area() {
        let r = IRect {
            x: -5,
            y: 2,
            w: 10,
            h: 10,
        };
        let c = r.clipped_to(8, 8);
        assert_eq!(c.x, 0);
        assert_eq!(c.w, 5);
        assert_eq!(c.h, 6);
    }

    #[test]
    fn solve_affine_reproduces_vertices() {
        let src = [pt(0.0, 0.0), pt(10.0, 0.0), pt(0.0, 10.0)];
        let dst = [pt(5.0, 5.0), pt(25.0, 7.0), pt(3.0, 30.0)];
        let m = solve_affine(&src, &dst).unwrap();
        for i in 0..3 {
            let mapped = m * src[i];
            assert!((mapped.x - dst[i].x).abs() < 1e-9);
            assert!((mapped.y - dst[i].y).abs() < 1e-9);
        }
    }

    #[test]
    fn solve_affine_rejects_collinear() {
        let src = [pt(0.0, 0.0), pt(1.0, 1.0), pt(2.0, 2.0)];
        let dst = [pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, 1.0)];
        let err = solve_affine(&src, &dst).unwrap_err();
        assert!(err.is_degenerate());

        let err = solve_affine(&dst, &src).unwrap_err();
        assert!(err.is_degenerate());
    }

    #[test]
    fn solve_perspective_reproduces_corners() {
        let src = [pt(0.0, 0.0), pt(100.0, 0.0), pt(100.0, 80.0), pt(0.0, 80.0)];
        let dst = [
            pt(10.0, 12.0),
            pt(90.0, 5.0),
            pt(105.0, 95.0),
            pt(-3.0, 70.0),
        ];
        let h = solve_perspective(&src, &dst).unwrap();
        for i in 0..4 {
            let mapped = project(&h, src[i]);
            assert!((mapped.x - dst[i].x).abs() < 1e-6);
            assert!((mapped.y - dst[i].y).abs() < 1e-6);
        }
    }

    #[test]
    fn solve_perspective_rejects_collinear_triple() {
        let src = [pt(0.0, 0.0), pt(1.0, 0.0), pt(2.0, 0.0), pt(3.0, 0.0)];
        let dst = [pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 1.0)];
        assert!(solve_perspective(&src, &dst).unwrap_err().is_degenerate());
    }

    #[test]
    fn invert_roundtrips() {
        let src = [pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0)];
        let dst = [pt(1.0, 2.0), pt(11.0, 1.0), pt(12.0, 13.0), pt(-1.0, 11.0)];
        let h = solve_perspective(&src, &dst).unwrap();
        let inv = invert(&h).unwrap();
        let p = project(&inv, project(&h, pt(4.0, 6.0)));
        assert!((p.x - 4.0).abs() < 1e-6);
        assert!((p.y - 6.0).abs() < 1e-6);
    }
}
