//! Configuration file parser for FBP reconstructions
//!
//! A configuration has two tables: `[geometry]` describes the acquisition and
//! `[image]` the grid onto which it is reconstructed. Lengths and angles may be
//! given either as bare numbers (mm, degrees) or as strings carrying units,
//! which are parsed by `uom`:
//!
//! ```toml
//! [geometry]
//! kind  = "fan"
//! nb    = 128
//! d     = "1 mm"
//! dsd   = "40 cm"
//! dod   = "10 cm"
//! orbit = "360 degrees"
//! dfs   = "0 mm"
//!
//! [image]
//! n    = [64, 64]
//! size = ["128 mm", "128 mm"]
//! ```
//!
//! As with the builders, bare numbers and unit-carrying strings may not be
//! mixed within the lengths (or the angles) of one table.

use std::fs;
use std::fmt::Display;
use std::str::FromStr;
use std::path::Path;

use serde::{Deserialize, Deserializer, de};

use units::{Angle, Length, Measure};
use units::promote::promote_lengths;
use units::todo::Ratiof32;

use crate::{Error, Result};
use crate::grid::ImageGrid;
use crate::sino_geom::SinoGeom;

/// Accept either a bare number or a string with units
#[derive(Deserialize)]
#[serde(untagged)]
enum RawMeasure {
    Bare(f32),
    Text(String),
}

impl RawMeasure {
    fn parse<Q, E>(self) -> std::result::Result<Measure<Q>, E>
    where
        Q: FromStr,
        <Q as FromStr>::Err: Display,
        E: de::Error,
    {
        match self {
            RawMeasure::Bare(x) => Ok(Measure::Bare(x)),
            RawMeasure::Text(s) => s.parse::<Q>()
                .map(Measure::Dimensioned)
                .map_err(|e| E::custom(format!("`{s}`: {e}"))),
        }
    }
}

fn deserialize_measure_opt<'d, D, Q>(deserializer: D) -> std::result::Result<Option<Measure<Q>>, D::Error>
where
    D: Deserializer<'d>,
    Q: FromStr,
    <Q as FromStr>::Err: Display,
{
    Option::<RawMeasure>::deserialize(deserializer)?
        .map(RawMeasure::parse)
        .transpose()
}

fn deserialize_measure_2d<'d, D, Q>(deserializer: D) -> std::result::Result<(Measure<Q>, Measure<Q>), D::Error>
where
    D: Deserializer<'d>,
    Q: FromStr,
    <Q as FromStr>::Err: Display,
{
    let (x, y) = <(RawMeasure, RawMeasure)>::deserialize(deserializer)?;
    Ok((x.parse::<Q, D::Error>()?, y.parse::<Q, D::Error>()?))
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub geometry: Geometry,
    pub image: Image,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Kind { Par, Moj, #[default] Fan }

/// The `[geometry]` table: the parameters of the `SinoGeom` builders. Absent
/// parameters take the builders' defaults.
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Geometry {
    #[serde(default)]
    pub kind: Kind,

    pub nb: Option<usize>,
    pub na: Option<usize>,

    #[serde(default, deserialize_with = "deserialize_measure_opt")]
    pub d: Option<Measure<Length>>,

    #[serde(default, deserialize_with = "deserialize_measure_opt")]
    pub orbit: Option<Measure<Angle>>,

    #[serde(default, deserialize_with = "deserialize_measure_opt")]
    pub orbit_start: Option<Measure<Angle>>,

    /// Detector offset, in bins
    pub offset: Option<Ratiof32>,

    #[serde(default, deserialize_with = "deserialize_measure_opt")]
    pub strip_width: Option<Measure<Length>>,

    // ----- fan-beam only ----------------------------------------
    #[serde(default, deserialize_with = "deserialize_measure_opt")]
    pub source_offset: Option<Measure<Length>>,

    #[serde(default, deserialize_with = "deserialize_measure_opt")]
    pub dsd: Option<Measure<Length>>,

    #[serde(default, deserialize_with = "deserialize_measure_opt")]
    pub dod: Option<Measure<Length>>,

    /// 0 for an arc detector, `inf` for a flat one
    #[serde(default, deserialize_with = "deserialize_measure_opt")]
    pub dfs: Option<Measure<Length>>,
}

/// Pass each of the listed parameters to the builder, if it was given
macro_rules! set {
    ($builder:ident <- $source:ident: $($param:ident),+) => {
        $(if let Some(x) = $source.$param { $builder = $builder.$param(x); })+
    };
}

impl Geometry {

    pub fn build(&self) -> Result<SinoGeom> {
        let g = self;
        match self.kind {
            Kind::Par | Kind::Moj => {
                let fan_only = [("source_offset", g.source_offset), ("dsd", g.dsd), ("dod", g.dod), ("dfs", g.dfs)];
                if let Some(&(name, _)) = fan_only.iter().find(|(_, value)| value.is_some()) {
                    return Err(Error::invalid(name, "only meaningful for fan-beam geometries"))
                }
                let mut builder = if self.kind == Kind::Par { SinoGeom::par() } else { SinoGeom::moj() };
                set!(builder <- g: nb, na, d, orbit, orbit_start, offset, strip_width);
                builder.build()
            },
            Kind::Fan => {
                let mut builder = SinoGeom::fan();
                set!(builder <- g: nb, na, d, orbit, orbit_start, offset, strip_width);
                set!(builder <- g: source_offset, dsd, dod, dfs);
                builder.build()
            },
        }
    }
}

/// The `[image]` table
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Image {
    /// Number of pixels along `x` and `y`
    pub n: (usize, usize),

    /// Full extent of the image along `x` and `y`
    #[serde(deserialize_with = "deserialize_measure_2d")]
    pub size: (Measure<Length>, Measure<Length>),

    /// Shift of the image centre, in pixels
    #[serde(default)]
    pub offset: (Ratiof32, Ratiof32),

    /// Only pixels within this distance of the isocentre are reconstructed
    #[serde(default, deserialize_with = "deserialize_measure_opt")]
    pub fov_mask: Option<Measure<Length>>,
}

impl Image {

    pub fn grid(&self) -> Result<ImageGrid> {
        let (sx, sy) = self.size;
        let grid = match self.fov_mask {
            None => {
                let [sx, sy] = promote_lengths([("size.x", sx), ("size.y", sy)])?;
                ImageGrid::from_size(self.n, (sx, sy))?
            },
            Some(radius) => {
                let [sx, sy, radius] = promote_lengths([("size.x", sx), ("size.y", sy), ("fov_mask", radius)])?;
                ImageGrid::from_size(self.n, (sx, sy))?.with_circular_mask(radius)
            },
        };
        let (ox, oy) = self.offset;
        grid.with_offsets(ox, oy)
    }
}

pub fn read_config_file(path: &Path) -> Result<Config> {
    let config: String = fs::read_to_string(path)?;
    Ok(toml::from_str(&config)?)
}
