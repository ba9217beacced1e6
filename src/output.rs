use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::distributed::DistributedGrid;
use crate::error::Error;
use crate::message::Communicator;
use crate::patch::Patch;

/// Significant digits used by `general`, as for C's `%g`.
const PRECISION: usize = 6;




#[derive(Serialize, Deserialize)]


/**
 * The gathered solution state at the end of a run, with the configuration
 * that produced it
 */
pub struct Checkpoint {
    pub config: Config,
    pub num_points: usize,
    pub time: f64,
    pub state: Patch,
}




/**
 * Format a number like C's `%g`: six significant digits, trailing zeros
 * removed, and scientific notation when the exponent is below -4 or at
 * least six.
 */
pub fn general(value: f64) -> String {
    if value.is_nan() {
        return "nan".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf".into() } else { "-inf".into() };
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0".into() } else { "0".into() };
    }

    let scientific = format!("{:.*e}", PRECISION - 1, value);
    let (mantissa, exponent) = scientific.split_at(scientific.find('e').unwrap_or(scientific.len()));
    let exponent: i32 = exponent.trim_start_matches('e').parse().unwrap_or(0);

    if exponent < -4 || exponent >= PRECISION as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exponent.abs())
    } else {
        let decimals = (PRECISION as i32 - 1 - exponent) as usize;
        trim_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}




/**
 * Write the solution as CSV, one `x,h,hu` row per global grid point, after
 * a header row. The state is gathered on rank 0, which writes the file;
 * other ranks only contribute their data.
 */
pub fn write_solution<C: Communicator>(
    grid: &DistributedGrid<C>,
    state: &Patch,
    path: &Path,
) -> Result<(), Error> {
    let full = match grid.gather(state)? {
        Some(full) => full,
        None => return Ok(()),
    };
    let io = |source| Error::Io { path: path.to_path_buf(), source };
    let mut file = BufWriter::new(File::create(path).map_err(io)?);

    writeln!(file, "x,h,hu").map_err(io)?;

    for (i, u) in full.index_space().iter().zip(full.iter_data()) {
        let x = grid.grid().coordinate(i);
        writeln!(file, "{},{},{}", general(x), general(u[0]), general(u[1])).map_err(io)?;
    }
    file.flush().map_err(io)?;

    info!("wrote {}", path.display());
    Ok(())
}




/**
 * Write the gathered state as a CBOR checkpoint. Only rank 0 touches the
 * file.
 */
pub fn write_checkpoint<C: Communicator>(
    grid: &DistributedGrid<C>,
    config: &Config,
    state: &Patch,
    time: f64,
    path: &Path,
) -> Result<(), Error> {
    let full = match grid.gather(state)? {
        Some(full) => full,
        None => return Ok(()),
    };
    let checkpoint = Checkpoint {
        config: config.clone(),
        num_points: grid.grid().num_points(),
        time,
        state: full,
    };
    let file = File::create(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
    let mut buffer = BufWriter::new(file);

    ciborium::ser::into_writer(&checkpoint, &mut buffer)
        .map_err(|e| Error::Checkpoint(format!("{:?}", e)))?;
    buffer
        .flush()
        .map_err(|source| Error::Io { path: path.to_path_buf(), source })?;

    info!("wrote {}", path.display());
    Ok(())
}

pub fn read_checkpoint(path: &Path) -> Result<Checkpoint, Error> {
    let file = File::open(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
    ciborium::de::from_reader(BufReader::new(file)).map_err(|e| Error::Checkpoint(format!("{:?}", e)))
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::general;

    #[test]
    fn general_format_matches_printf() {
        assert_eq!(general(0.0), "0");
        assert_eq!(general(1.0), "1");
        assert_eq!(general(0.5), "0.5");
        assert_eq!(general(0.001), "0.001");
        assert_eq!(general(1e-5), "1e-05");
        assert_eq!(general(-2.5e-7), "-2.5e-07");
        assert_eq!(general(123456.0), "123456");
        assert_eq!(general(1234567.0), "1.23457e+06");
        assert_eq!(general(0.1 + 0.2), "0.3");
        assert_eq!(general(1.0 / 999.0), "0.001001");
        assert_eq!(general(999999.5), "1e+06");
    }
}
