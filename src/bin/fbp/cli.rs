/// Command line interface for `fbp` executable
#[derive(clap::Parser, Debug, Clone)]
#[clap(
    name = "fbp",
    about = "Reconstruct a 2D image from a fan-beam sinogram by filtered backprojection",
)]
pub (super) struct Cli {
    /// Raw sinogram: little-endian f32, detector bins varying fastest
    pub input: PathBuf,

    /// TOML file describing the acquisition geometry and the image grid
    #[clap(short, long, default_value = "fbp-config.toml")]
    pub config: PathBuf,

    /// Raw output image: little-endian f32, x varying fastest
    #[clap(short, long)]
    pub out: PathBuf,

    /// Backproject without cosine weighting or ramp filtering
    #[clap(long)]
    pub no_filter: bool,

    /// Use only every nth projection angle
    #[clap(long, default_value = "1", requires = "no_filter")]
    pub angle_skip: usize,

    /// Maximum number of rayon threads used in backprojection
    #[clap(short = 'j', long, default_value = "4")]
    pub threads: usize,
}

use std::path::PathBuf;
