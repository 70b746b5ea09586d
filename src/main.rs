// In src/main.rs

pub mod animation;
pub mod config;
pub mod display;
pub mod font;
pub mod glyph;
pub mod grid;
pub mod viewer;

use std::path::PathBuf;

use crate::{
    animation::Stage,
    config::{Config, CONFIG},
    display::HeadlessSurface,
    font::{FontCapability, FontInfo},
    viewer::{TilingViewer, ViewerStatus},
};

use anyhow::{bail, Context};
use log::{info, warn};

/// Default length of the simulated run.
const DEFAULT_RUN_MS: u64 = 60_000;
/// Step the virtual clock advances per iteration of the driver loop.
const STEP_MS: u64 = 250;
/// Rows and columns printed on each side of the centre cell.
const CENTER_RADIUS: usize = 3;

#[derive(Debug, Default)]
struct Args {
    font_path: Option<PathBuf>,
    seed: Option<u64>,
    run_ms: Option<u64>,
    size: Option<(f64, f64)>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut parsed = Args::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--seed" => {
                    let value = args.next().context("--seed needs a value")?;
                    parsed.seed = Some(value.parse().with_context(|| format!("invalid seed '{}'", value))?);
                }
                "--run-ms" => {
                    let value = args.next().context("--run-ms needs a value")?;
                    parsed.run_ms = Some(
                        value
                            .parse()
                            .with_context(|| format!("invalid duration '{}'", value))?,
                    );
                }
                "--size" => {
                    let value = args.next().context("--size needs a value")?;
                    parsed.size = Some(parse_size(&value)?);
                }
                flag if flag.starts_with("--") => bail!("unknown option '{}'", flag),
                path => {
                    if parsed.font_path.is_some() {
                        bail!("more than one font file given");
                    }
                    parsed.font_path = Some(PathBuf::from(path));
                }
            }
        }
        Ok(parsed)
    }
}

fn parse_size(value: &str) -> anyhow::Result<(f64, f64)> {
    let (w, h) = value
        .split_once('x')
        .with_context(|| format!("size '{}' is not WxH", value))?;
    let width: f64 = w.parse().with_context(|| format!("invalid width '{}'", w))?;
    let height: f64 = h.parse().with_context(|| format!("invalid height '{}'", h))?;
    if width <= 0.0 || height <= 0.0 {
        bail!("size '{}' must be positive", value);
    }
    Ok((width, height))
}

/// Main entry point for `glyph-tiles`.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let args = Args::parse(std::env::args().skip(1))?;
    info!("Starting glyph-tiles with {:?}", args);

    let mut config: Config = (*CONFIG).clone();
    if args.seed.is_some() {
        config.animation.seed = args.seed;
    }
    if let Some((width, height)) = args.size {
        config.viewport.width = width;
        config.viewport.height = height;
    }

    let font: Box<dyn FontCapability> = match &args.font_path {
        Some(path) => Box::new(
            FontInfo::load(path).with_context(|| format!("Failed to load font description {}", path.display()))?,
        ),
        None => {
            info!("No font file given; using the built-in demo font");
            Box::new(FontInfo::demo())
        }
    };

    let surface = HeadlessSurface::new(config.viewport.width, config.viewport.height);
    let mut viewer = TilingViewer::new(&config, surface);
    viewer.load_font(font);

    let layout = *viewer.grid().layout();
    info!(
        "Grid: {}x{} cells of {:.1}x{:.1}px ({} axes, {} glyphs)",
        layout.cols,
        layout.rows,
        layout.cell_width,
        layout.cell_height,
        viewer.grid().samplers().len(),
        viewer.grid().glyphs().len()
    );

    let run_ms = args.run_ms.unwrap_or(DEFAULT_RUN_MS);
    let mut last_stage = viewer.animator().stage();
    while viewer.now() < run_ms {
        if viewer.render_pass() != ViewerStatus::Animating {
            warn!("Viewer stopped animating; ending run");
            break;
        }
        viewer.advance(STEP_MS.min(run_ms - viewer.now()));

        let stage = viewer.animator().stage();
        if stage != last_stage {
            info!("{}ms: {:?}", viewer.now(), stage);
            last_stage = stage;
        }
        if stage == Stage::Finished {
            break;
        }
    }

    let animator = viewer.animator();
    println!("font:      {}", viewer.grid().font_family());
    println!("grid:      {}x{} ({} cells)", layout.cols, layout.rows, layout.cell_count());
    println!("time:      {}ms", viewer.now());
    println!("stage:     {:?}", animator.stage());
    println!("phases:    {}", animator.visited_phases().count());
    println!("transform: {}", animator.current_transform());
    println!("updates:   {}", viewer.surface().total_cell_updates());
    if let Some(stats) = animator.scheduler().last_stats() {
        println!(
            "last run:  {} ticks (+{} carried), {} changes, busiest tick {}",
            stats.ticks,
            stats.extra_ticks,
            stats.delivered.iter().sum::<u32>(),
            stats.max_refreshed_in_tick
        );
    }
    println!();
    print!("{}", viewer.surface().render_center(CENTER_RADIUS));

    info!("glyph-tiles exited successfully.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> anyhow::Result<Args> {
        Args::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_all_options() {
        let parsed = args(&["font.json", "--seed", "7", "--run-ms", "1500", "--size", "800x600"]).unwrap();
        assert_eq!(parsed.font_path, Some(PathBuf::from("font.json")));
        assert_eq!(parsed.seed, Some(7));
        assert_eq!(parsed.run_ms, Some(1500));
        assert_eq!(parsed.size, Some((800.0, 600.0)));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(args(&["--seed"]).is_err());
        assert!(args(&["--seed", "x"]).is_err());
        assert!(args(&["--size", "800"]).is_err());
        assert!(args(&["--size", "0x600"]).is_err());
        assert!(args(&["--verbose"]).is_err());
        assert!(args(&["a.json", "b.json"]).is_err());
    }

    #[test]
    fn no_arguments_means_defaults() {
        let parsed = args(&[]).unwrap();
        assert!(parsed.font_path.is_none());
        assert!(parsed.seed.is_none());
    }
}
