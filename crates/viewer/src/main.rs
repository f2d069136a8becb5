use anyhow::{Context, Result};
use clap::Parser;
use pointview_filters::{UpsampleMode, MAX_PER_SEGMENT};
use pointview_io::{read_cloud, write_cloud};
use pointview_viewer::config::{parse_color, parse_triple};
use pointview_viewer::{
    run, ColorMode, MarkerSymbol, TransformPlan, ViewerConfig, ViewerState, POINT_SIZE_MAX,
    POINT_SIZE_MIN,
};
use std::path::PathBuf;

/// Load a point cloud, optionally resample it, and show it in a window.
#[derive(Parser, Debug)]
#[command(name = "pointview", version)]
struct Args {
    /// PLY, PCD, XYZRGB or TXT file
    #[arg(default_value = "model.ply")]
    path: PathBuf,

    /// Voxel edge length for centroid downsampling
    #[arg(long, value_name = "VOXEL")]
    downsample: Option<f32>,

    /// Insert K interpolated points between consecutive points
    #[arg(
        long,
        value_name = "K",
        conflicts_with = "segment_starts",
        value_parser = clap::value_parser!(u64).range(0..=MAX_PER_SEGMENT as u64)
    )]
    upsample: Option<u64>,

    /// Keep only the start point of every consecutive pair
    #[arg(long)]
    segment_starts: bool,

    #[arg(
        long,
        default_value_t = 3,
        value_parser = clap::value_parser!(u32).range(POINT_SIZE_MIN as i64..=POINT_SIZE_MAX as i64)
    )]
    point_size: u32,

    #[arg(long, value_enum, default_value_t = MarkerSymbol::Disc)]
    symbol: MarkerSymbol,

    /// Start in depth-gradient color mode
    #[arg(long)]
    gradient: bool,

    /// Gradient color at the nearest point, as R,G,B in [0, 1]
    #[arg(long, value_parser = parse_color, allow_hyphen_values = true)]
    near: Option<[f32; 3]>,

    /// Gradient color at the farthest point, as R,G,B in [0, 1]
    #[arg(long, value_parser = parse_color, allow_hyphen_values = true)]
    far: Option<[f32; 3]>,

    /// Gradient reference position as X,Y,Z (defaults to the initial camera position)
    #[arg(long, value_parser = parse_triple, allow_hyphen_values = true)]
    reference: Option<[f32; 3]>,

    /// Write the transformed cloud here before opening the window
    #[arg(long, value_name = "OUT")]
    save: Option<PathBuf>,
}

impl Args {
    fn plan(&self) -> TransformPlan {
        let upsample = if self.segment_starts {
            Some(UpsampleMode::SegmentStarts)
        } else {
            self.upsample
                .map(|k| UpsampleMode::Interpolate { per_segment: k as usize })
        };
        TransformPlan {
            downsample: self.downsample,
            upsample,
        }
    }

    fn viewer_config(&self) -> ViewerConfig {
        let defaults = ViewerConfig::default();
        ViewerConfig {
            source: self.path.display().to_string(),
            point_size: self.point_size,
            symbol: self.symbol,
            color_mode: if self.gradient {
                ColorMode::Gradient
            } else {
                ColorMode::Original
            },
            near_color: self.near.unwrap_or(defaults.near_color),
            far_color: self.far.unwrap_or(defaults.far_color),
            reference: self.reference,
            fallback_color: defaults.fallback_color,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let cloud = read_cloud(&args.path)
        .with_context(|| format!("failed to load {}", args.path.display()))?;

    let plan = args.plan();
    let cloud = if plan.is_identity() {
        cloud
    } else {
        plan.apply(&cloud).context("failed to transform point cloud")?
    };

    if let Some(out) = &args.save {
        write_cloud(out, &cloud).with_context(|| format!("failed to save {}", out.display()))?;
    }

    let state = ViewerState::new(cloud, &args.viewer_config());
    run(state)
}
