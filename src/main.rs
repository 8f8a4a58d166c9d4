mod blend;
mod error;
mod horizon;
mod pad;
mod pipeline;
mod timer;
mod window;

use crate::{
    horizon::{ FixedPoints, HorizonPoint, HorizonSource },
    pipeline::{ Config, FileStore },
    window::LazyWindow,
};

use clap::Parser;

use std::path::PathBuf;

/// Blends the left/right seam of a photo and pads it to a 2:1
/// equirectangular canvas, biased by where the horizon sits.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Image to convert.
    input: PathBuf,
    /// Where to write the result. Defaults to the input's file name in the
    /// current directory.
    #[clap(short, long)]
    output: Option<PathBuf>,
    /// Horizon point as X,Y in image pixels, up to three. Skips the
    /// interactive window.
    #[clap(short, long = "point", value_name = "X,Y")]
    points: Vec<HorizonPoint>,
    /// Show the padded result before exiting.
    #[clap(long)]
    preview: bool,
}

pub fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = Config::new(args.input, args.output);
    let store = FileStore;

    let mut window = LazyWindow::default();
    let mut fixed = FixedPoints(args.points);
    let horizon: &mut dyn HorizonSource = if fixed.0.is_empty() {
        &mut window
    } else {
        &mut fixed
    };

    let outcome = pipeline::run(&config, &store, horizon).map_err(|e| e.to_string())?;
    let report = &outcome.report;
    log::info!(
        "{}x{} -> {}x{}, seam strips {}px, horizon at row {}, wrote {}",
        report.original.0, report.original.1,
        outcome.raster.width(), report.padding.target_height,
        report.strip_width, report.horizon_y, report.output.display()
    );

    if args.preview {
        window.get()
            .and_then(|w| w.show(&outcome.raster, "Padded to equirectangular (Return or Esc to close)"))
            .map_err(|e| e.to_string())?;
    }

    log::info!("Equirect: finished.");
    Ok(())
}
