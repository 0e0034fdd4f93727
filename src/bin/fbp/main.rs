mod cli;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Cli::parse();

    let mut progress = Progress::new();

    // --- Geometry and image grid ---------------------------------------------------
    progress.start("Reading configuration");
    let config   = read_config_file(&args.config)?;
    let geometry = config.geometry.build()?;
    let grid     = config.image.grid()?;
    progress.done();
    info!("{geometry}");
    let (nx, ny) = grid.dim();
    info!("Image grid: {nx} x {ny} pixels of {} x {} mm", mm_(grid.dx()), mm_(grid.dy()));

    // --- Sinogram ------------------------------------------------------------------
    progress.start("Reading sinogram");
    let sino = raw::read_2d(&args.input, geometry.dim())?;
    progress.done();

    // Before starting the potentially long computation, make sure that we can
    // write the result to the requested destination.
    if let Some(dir) = args.out.parent() { std::fs::create_dir_all(dir)? }

    // --- Reconstruction ------------------------------------------------------------
    let pool = rayon::ThreadPoolBuilder::new().num_threads(args.threads).build()?;
    let image = if args.no_filter {
        progress.start(&format!("Backprojecting every {} angle(s)", args.angle_skip));
        pool.install(|| backproject(&geometry, &grid, &sino, args.angle_skip))?
    } else {
        progress.start("Filtered backprojection");
        pool.install(|| fbp(&geometry, &grid, &sino))?
    };
    progress.done();

    // --- Output --------------------------------------------------------------------
    progress.start("Writing image");
    raw::write_2d(&image, &args.out)?;
    progress.done_with_message(&format!("Wrote {} pixels to {}", group_digits(image.len()), args.out.display()));
    Ok(())
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::error::Error;

use clap::Parser;
use env_logger::Env;
use log::info;

use units::mm_;

use tomofbp::{
    backproject::backproject,
    config::recon::read_config_file,
    fbp::fbp,
    io::raw,
    utils::{group_digits, timing::Progress},
};

use cli::Cli;
