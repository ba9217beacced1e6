use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;




#[derive(Debug)]


/**
 * Error to represent an invalid run setup, a failed exchange between ranks,
 * or a failure to write output.
 */
pub enum Error {
    InvalidGrid(usize),
    TooManyPartitions { num_points: usize, num_ranks: usize },
    InvalidConfig(String),
    Disconnected(usize),
    Aborted,
    Encode(rmp_serde::encode::Error),
    Decode(rmp_serde::decode::Error),
    Io { path: PathBuf, source: io::Error },
    Checkpoint(String),
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        use Error::*;

        match self {
            InvalidGrid(n) => write!(fmt, "grid needs at least 3 points, got {}", n),
            TooManyPartitions { num_points, num_ranks } => write!(
                fmt,
                "cannot split {} grid points across {} ranks",
                num_points, num_ranks
            ),
            InvalidConfig(msg) => write!(fmt, "invalid configuration: {}", msg),
            Disconnected(rank) => write!(fmt, "rank {} disconnected", rank),
            Aborted => write!(fmt, "run aborted by a peer rank"),
            Encode(e) => write!(fmt, "message encoding failed: {}", e),
            Decode(e) => write!(fmt, "message decoding failed: {}", e),
            Io { path, source } => write!(fmt, "cannot open file {}: {}", path.display(), source),
            Checkpoint(msg) => write!(fmt, "checkpoint failed: {}", msg),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Encode(e) => Some(e),
            Error::Decode(e) => Some(e),
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<rmp_serde::encode::Error> for Error {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Error::Encode(e)
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Error::Decode(e)
    }
}
