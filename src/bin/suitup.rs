use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use suitup::{
    AssetLibrary, Detection, Frame, FrameInput, Landmark, LandmarkSet, Mask, RigConfig,
    SessionState,
    landmarks::{face, hand, pose},
};

#[derive(Parser, Debug)]
#[command(name = "suitup", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a scripted gesture session (fist, then open hand) as numbered PNGs.
    Demo(SceneArgs),
    /// Render a scripted launch/fly/land cycle as numbered PNGs.
    Flight(SceneArgs),
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Output directory for frame_NNNN.png files.
    #[arg(long)]
    out: PathBuf,

    /// Number of frames to render.
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Frame width in pixels.
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Frame height in pixels.
    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Assumed capture rate, used to derive per-frame timestamps.
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Rig config JSON. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of overlay textures (helmet.png, bodysuit.png, hair.png,
    /// shield.png, sky.png, ground.png). Missing files fall back to
    /// generated placeholders.
    #[arg(long)]
    assets: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Demo(args) => run_scene(args, demo_detection),
        Command::Flight(args) => run_scene(args, flight_detection),
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<RigConfig> {
    let Some(path) = path else {
        return Ok(RigConfig::default());
    };
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let config: RigConfig =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse config JSON")?;
    config.validate()?;
    Ok(config)
}

fn run_scene(
    args: SceneArgs,
    script: fn(frame_index: u32, total: u32) -> Detection,
) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let assets = match &args.assets {
        Some(dir) => AssetLibrary::load(dir),
        None => AssetLibrary::placeholders(),
    };

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    let mut session = SessionState::new(assets, config, args.width, args.height);
    for i in 0..args.frames {
        let input = FrameInput {
            frame: backdrop(args.width, args.height, i),
            detection: script(i, args.frames),
            now_s: f64::from(i) / args.fps,
        };
        let out = session.process_frame(&input);

        let path = args.out.join(format!("frame_{i:04}.png"));
        image::save_buffer_with_format(
            &path,
            &out.data,
            out.width,
            out.height,
            image::ColorType::Rgb8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
    }

    eprintln!("wrote {} frames to {}", args.frames, args.out.display());
    Ok(())
}

/// Synthetic camera feed: a fixed gradient with a slowly drifting band so
/// motion is visible across the rendered sequence.
fn backdrop(width: u32, height: u32, frame_index: u32) -> Frame {
    let mut frame = Frame::new(width, height);
    let band = (frame_index * 4) % height.max(1);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 200 / width.max(1)) as u8 + 20;
            let g = (y * 200 / height.max(1)) as u8 + 20;
            let b = if y.abs_diff(band) < 8 { 220 } else { 60 };
            frame.set_pixel(x, y, [r, g, b]);
        }
    }
    frame
}

/// Gesture script: a fist held from frame 10 (confirming into the green
/// reveal), then an open hand from 60% of the way through.
fn demo_detection(frame_index: u32, total: u32) -> Detection {
    let open_from = total * 3 / 5;
    let hand = if frame_index >= open_from {
        Some(scripted_hand([true, true, true, true, true]))
    } else if frame_index >= 10 {
        Some(scripted_hand([false, false, false, false, false]))
    } else {
        None
    };

    Detection {
        right_hand: hand,
        face: Some(scripted_face()),
        pose: Some(scripted_body(false)),
        segmentation: Some(person_mask()),
        ..Detection::default()
    }
}

/// Flight script: arms raised for the first 60% of the sequence, then
/// dropped so the landing sweep plays out.
fn flight_detection(frame_index: u32, total: u32) -> Detection {
    let raised = frame_index < total * 3 / 5;
    Detection {
        pose: Some(scripted_body(raised)),
        segmentation: Some(person_mask()),
        ..Detection::default()
    }
}

fn scripted_hand(extended: [bool; 5]) -> LandmarkSet {
    let wrist = Landmark::new(0.5, 0.9);
    let mut pts = vec![wrist; hand::POINT_COUNT];
    for (finger, (tip, pip)) in hand::FINGERS.iter().enumerate() {
        let angle = 1.2 + 0.18 * finger as f64;
        let (dx, dy) = (angle.cos(), -angle.sin());
        pts[*pip] = Landmark::new(wrist.x + dx * 0.12, wrist.y + dy * 0.12);
        let reach = if extended[finger] { 0.22 } else { 0.05 };
        pts[*tip] = Landmark::new(wrist.x + dx * reach, wrist.y + dy * reach);
    }
    LandmarkSet::new(pts)
}

fn scripted_body(arms_raised: bool) -> LandmarkSet {
    let mut pts = vec![Landmark::new(0.5, 0.55); pose::POINT_COUNT];
    pts[pose::LEFT_SHOULDER] = Landmark::new(0.4, 0.45);
    pts[pose::RIGHT_SHOULDER] = Landmark::new(0.6, 0.45);
    pts[pose::LEFT_HIP] = Landmark::new(0.44, 0.72);
    pts[pose::RIGHT_HIP] = Landmark::new(0.56, 0.72);
    if arms_raised {
        pts[pose::LEFT_ELBOW] = Landmark::new(0.38, 0.32);
        pts[pose::RIGHT_ELBOW] = Landmark::new(0.62, 0.32);
        pts[pose::LEFT_WRIST] = Landmark::new(0.38, 0.18);
        pts[pose::RIGHT_WRIST] = Landmark::new(0.62, 0.18);
    } else {
        pts[pose::LEFT_ELBOW] = Landmark::new(0.38, 0.58);
        pts[pose::RIGHT_ELBOW] = Landmark::new(0.62, 0.58);
        pts[pose::LEFT_WRIST] = Landmark::new(0.37, 0.7);
        pts[pose::RIGHT_WRIST] = Landmark::new(0.63, 0.7);
    }
    LandmarkSet::new(pts)
}

fn scripted_face() -> LandmarkSet {
    let mut pts = vec![Landmark::new(0.5, 0.35); face::POINT_COUNT];
    pts[face::FOREHEAD_TOP] = Landmark::new(0.5, 0.22);
    pts[face::LEFT_EYE_OUTER] = Landmark::new(0.42, 0.3);
    pts[face::RIGHT_EYE_OUTER] = Landmark::new(0.58, 0.3);
    pts[face::NOSE_TIP] = Landmark::new(0.5, 0.35);
    pts[face::UPPER_LIP] = Landmark::new(0.5, 0.4);
    pts[face::CHIN] = Landmark::new(0.5, 0.47);
    pts[face::LEFT_TEMPLE] = Landmark::new(0.4, 0.27);
    pts[face::RIGHT_TEMPLE] = Landmark::new(0.6, 0.27);
    pts[face::LEFT_EAR_EDGE] = Landmark::new(0.38, 0.34);
    pts[face::RIGHT_EAR_EDGE] = Landmark::new(0.62, 0.34);
    LandmarkSet::new(pts)
}

/// Stand-in segmentation output: a normalized-resolution disc over the
/// scripted body. Session code resizes it to the frame.
fn person_mask() -> Mask {
    let mut mask = Mask::new(160, 120);
    mask.fill_disc(80.0, 66.0, 34.0);
    mask
}
