/// Read / write float arrays as raw binary: little-endian `f32`s, with no
/// header.
///
/// Two-dimensional arrays are stored with their first axis varying fastest:
/// detector bins for sinograms, `x` for images.

use std::fs::File;
use std::io::{Write, Read, BufWriter, BufReader};
use std::path::Path;

use ndarray::{Array2, ShapeBuilder};

use crate::{Error, Result};

pub fn write(data: impl Iterator<Item = f32>, path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut buf = BufWriter::new(file);
    for datum in data {
        buf.write_all(&datum.to_le_bytes())?;
    }
    buf.flush()
}

type IORes<T> = std::io::Result<T>;
pub fn read<'a>(path: &Path) -> IORes<impl Iterator<Item = IORes<f32>> + 'a> {
    let file = File::open(path)?;
    let mut buf = BufReader::new(file);
    let mut buffer = [0; 4];

    Ok(std::iter::from_fn(move || {
        use std::io::ErrorKind::UnexpectedEof;
        match buf.read_exact(&mut buffer) {
            Ok(()) => Some(Ok(f32::from_le_bytes(buffer))),
            Err(e) if e.kind() == UnexpectedEof => None,
            Err(e) => Some(Err(e)),
        }
    }))
}

/// Write `array`, first axis fastest
pub fn write_2d(array: &Array2<f32>, path: &Path) -> Result<()> {
    write(array.t().iter().copied(), path)?;
    Ok(())
}

/// Read an array of shape `dim`, stored first axis fastest
pub fn read_2d(path: &Path, dim: (usize, usize)) -> Result<Array2<f32>> {
    let data = read(path)?.collect::<IORes<Vec<_>>>()?;
    let mismatch = |found| Error::DimensionMismatch {
        what: "raw data",
        expected: (dim.0 * dim.1, 1),
        actual: (found, 1),
    };
    if data.len() != dim.0 * dim.1 { return Err(mismatch(data.len())) }
    let n = data.len();
    Array2::from_shape_vec(dim.f(), data).map_err(|_| mismatch(n))
}
