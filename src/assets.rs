//! Texture assets and their fixed source-point tables.
//!
//! Textures are loaded once at startup and read-only thereafter. A
//! missing or unreadable file degrades to a generated placeholder with a
//! warning; startup never aborts over an asset.

use std::path::Path;

use kurbo::Point;

use crate::frame::{Frame, Mask};

/// A loaded raster asset, optionally carrying an alpha channel.
#[derive(Clone, Debug)]
pub struct Texture {
    pub frame: Frame,
    pub alpha: Option<Mask>,
}

impl Texture {
    pub fn width(&self) -> u32 {
        self.frame.width
    }

    pub fn height(&self) -> u32 {
        self.frame.height
    }

    /// Decodes an image file; alpha is kept when the file has it.
    pub fn load(path: &Path) -> anyhow::Result<Texture> {
        let dynimg = image::open(path)?;
        Ok(Self::from_dynamic(dynimg))
    }

    pub fn from_dynamic(dynimg: image::DynamicImage) -> Texture {
        let has_alpha = dynimg.color().has_alpha();
        let rgba = dynimg.to_rgba8();
        let (w, h) = rgba.dimensions();

        let mut frame = Frame::new(w, h);
        let mut alpha = Mask::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let px = rgba.get_pixel(x, y).0;
                frame.set_pixel(x, y, [px[0], px[1], px[2]]);
                alpha.set(x, y, f32::from(px[3]) / 255.0);
            }
        }
        Texture {
            frame,
            alpha: has_alpha.then_some(alpha),
        }
    }

    /// Loads `path`, falling back to `placeholder` on any failure.
    pub fn load_or(path: &Path, placeholder: impl FnOnce() -> Texture) -> Texture {
        match Self::load(path) {
            Ok(tex) => tex,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "asset unreadable, using placeholder");
                placeholder()
            }
        }
    }
}

/// Solid disc on black, the generic stand-in texture.
pub fn placeholder_disc(size: u32, rgb: [u8; 3]) -> Texture {
    let mut frame = Frame::new(size, size);
    let c = f64::from(size) / 2.0;
    let r2 = (f64::from(size) / 3.0).powi(2);
    for y in 0..size {
        for x in 0..size {
            let dx = f64::from(x) + 0.5 - c;
            let dy = f64::from(y) + 0.5 - c;
            if dx * dx + dy * dy <= r2 {
                frame.set_pixel(x, y, rgb);
            }
        }
    }
    Texture { frame, alpha: None }
}

/// Concentric-ring shield with a circular alpha channel.
pub fn placeholder_shield(size: u32) -> Texture {
    let mut frame = Frame::new(size, size);
    let mut alpha = Mask::new(size, size);
    let c = f64::from(size) / 2.0;
    let outer = f64::from(size) / 2.0;
    let rings: [(f64, [u8; 3]); 4] = [
        (1.0, [200, 30, 30]),
        (0.8, [230, 230, 230]),
        (0.6, [200, 30, 30]),
        (0.4, [40, 40, 180]),
    ];
    for y in 0..size {
        for x in 0..size {
            let dx = f64::from(x) + 0.5 - c;
            let dy = f64::from(y) + 0.5 - c;
            let d = (dx * dx + dy * dy).sqrt();
            if d > outer {
                continue;
            }
            alpha.set(x, y, 1.0);
            for (scale, rgb) in rings {
                if d <= outer * scale {
                    frame.set_pixel(x, y, rgb);
                }
            }
        }
    }
    Texture {
        frame,
        alpha: Some(alpha),
    }
}

/// Vertical blue gradient sized for the scrolling sky (callers pass the
/// doubled height themselves).
pub fn placeholder_sky(width: u32, height: u32) -> Texture {
    let mut frame = Frame::new(width, height);
    for y in 0..height {
        let t = f64::from(y) / f64::from(height.max(1));
        let rgb = [
            (135.0 * t) as u8,
            (100.0 + 106.0 * t) as u8,
            (180.0 + 55.0 * t) as u8,
        ];
        for x in 0..width {
            frame.set_pixel(x, y, rgb);
        }
    }
    Texture { frame, alpha: None }
}

/// Sky over a green band in the lower 30%, the launch-sequence ground.
pub fn placeholder_ground(width: u32, height: u32) -> Texture {
    let mut frame = Frame::filled(width, height, [135, 206, 235]);
    let horizon = (f64::from(height) * 0.7) as u32;
    for y in horizon..height {
        for x in 0..width {
            frame.set_pixel(x, y, [34, 139, 34]);
        }
    }
    Texture { frame, alpha: None }
}

/// Helmet source anchors as fractions of the texture size. Order matches
/// `landmarks::face::HELMET_ANCHORS`: left eye, right eye, nose, mouth,
/// chin, forehead, left side, right side.
pub fn helmet_src_points(width: u32, height: u32) -> [Point; 8] {
    let w = f64::from(width);
    let h = f64::from(height);
    [
        Point::new(w * 0.28, h * 0.45),
        Point::new(w * 0.72, h * 0.45),
        Point::new(w * 0.50, h * 0.65),
        Point::new(w * 0.50, h * 0.80),
        Point::new(w * 0.50, h * 0.95),
        Point::new(w * 0.50, h * 0.10),
        Point::new(w * 0.05, h * 0.50),
        Point::new(w * 0.95, h * 0.50),
    ]
}

/// Fixed triangulation over the eight helmet anchors.
pub const HELMET_TRIANGLES: [(usize, usize, usize); 10] = [
    (5, 0, 2),
    (5, 1, 2),
    (0, 6, 2),
    (1, 7, 2),
    (6, 4, 3),
    (7, 4, 3),
    (6, 2, 3),
    (7, 2, 3),
    (0, 2, 3),
    (1, 2, 3),
];

/// Torso panel of the suit texture: shoulders down to hips, clockwise
/// from the left shoulder.
pub fn torso_src_quad(width: u32, height: u32) -> [Point; 4] {
    let w = f64::from(width);
    let h = f64::from(height);
    [
        Point::new(w * 0.40, h * 0.15),
        Point::new(w * 0.60, h * 0.15),
        Point::new(w * 0.58, h * 0.48),
        Point::new(w * 0.42, h * 0.48),
    ]
}

/// Hair alignment triangle: inner hair edges at the temples plus the
/// hairline. Order matches `landmarks::face::HAIR_ANCHORS`.
pub fn hair_src_points(width: u32, height: u32) -> [Point; 3] {
    let w = f64::from(width);
    let h = f64::from(height);
    [
        Point::new(w * 0.30, h * 0.55),
        Point::new(w * 0.70, h * 0.55),
        Point::new(w * 0.50, h * 0.25),
    ]
}

/// All textures the effects need, owned once for the session.
#[derive(Clone, Debug)]
pub struct AssetLibrary {
    pub helmet: Texture,
    pub bodysuit: Texture,
    pub hair: Texture,
    pub shield: Texture,
    pub sky: Texture,
    pub ground: Texture,
}

impl AssetLibrary {
    /// Loads the fixed asset file set from `dir`, substituting a
    /// placeholder for each file that is missing or unreadable.
    pub fn load(dir: &Path) -> AssetLibrary {
        let mut lib = AssetLibrary {
            helmet: Texture::load_or(&dir.join("helmet.png"), || {
                placeholder_disc(300, [180, 30, 30])
            }),
            bodysuit: Texture::load_or(&dir.join("bodysuit.png"), || {
                placeholder_disc(300, [160, 40, 40])
            }),
            hair: Texture::load_or(&dir.join("hair.png"), || {
                placeholder_disc(300, [150, 40, 20])
            }),
            shield: Texture::load_or(&dir.join("shield.png"), || placeholder_shield(200)),
            sky: Texture::load_or(&dir.join("sky.png"), || placeholder_sky(640, 960)),
            ground: Texture::load_or(&dir.join("ground.png"), || placeholder_ground(640, 480)),
        };
        lib.ensure_shield_alpha();
        lib
    }

    /// Entirely generated assets; what the demo and tests run on.
    pub fn placeholders() -> AssetLibrary {
        let mut lib = AssetLibrary {
            helmet: placeholder_disc(300, [180, 30, 30]),
            bodysuit: placeholder_disc(300, [160, 40, 40]),
            hair: placeholder_disc(300, [150, 40, 20]),
            shield: placeholder_shield(200),
            sky: placeholder_sky(640, 960),
            ground: placeholder_ground(640, 480),
        };
        lib.ensure_shield_alpha();
        lib
    }

    /// The shield overlay needs an alpha channel; a flat file gets a
    /// circular one, assuming the shield art is centered and round.
    fn ensure_shield_alpha(&mut self) {
        if self.shield.alpha.is_some() {
            return;
        }
        let (w, h) = (self.shield.width(), self.shield.height());
        let mut alpha = Mask::new(w, h);
        alpha.fill_disc(
            f64::from(w) / 2.0,
            f64::from(h) / 2.0,
            f64::from(w.min(h)) / 2.0,
        );
        self.shield.alpha = Some(alpha);
    }
}
