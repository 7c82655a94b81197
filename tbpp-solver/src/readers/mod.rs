//! Readers for the benchmark instance formats and for allocation files.
//!
//! * [`format1`]: one job per line, benchmark groups in directories named `n<n> t<t> <category>`.
//! * [`format2`]: job demands followed by the set of active jobs at every time step.
//! * [`allocation`]: one server per line, listing the indices of the jobs it hosts.
pub mod allocation;
pub mod format1;
pub mod format2;

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::instance::InstanceError;

pub type ReadResult<T> = Result<T, ReadError>;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("IO error, more details: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected {expected}, found '{found}'")]
    Malformed {
        line: usize,
        expected: &'static str,
        found: String,
    },
    #[error("the file is empty")]
    MissingHeader,
    #[error("the header announces {expected} jobs but {actual} were given")]
    JobCountMismatch { expected: usize, actual: usize },
    #[error("line {line}: job {job} does not exist")]
    UnknownJob { line: usize, job: usize },
    #[error("job {0} is never active")]
    InactiveJob(usize),
    #[error("job {job} becomes active again at time step {time}")]
    ReactivatedJob { job: usize, time: usize },
    #[error("'{0}' is not a valid benchmark name")]
    InvalidName(String),
    #[error("the instance is invalid, more details: {0}")]
    Instance(#[from] InstanceError),
}

/// Opens `path` for buffered reading.
pub(crate) fn open(path: &Path) -> ReadResult<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

/// The lines of `reader` together with their one-based line numbers.
pub(crate) fn numbered_lines(
    reader: impl BufRead,
) -> impl Iterator<Item = ReadResult<(usize, String)>> {
    reader
        .lines()
        .enumerate()
        .map(|(index, line)| Ok((index + 1, line?)))
}

/// Parses every token of `line`, which has to consist of exactly `count` tokens when given.
pub(crate) fn parse_tokens<T: FromStr>(
    line_number: usize,
    line: &str,
    count: Option<usize>,
    expected: &'static str,
) -> ReadResult<Vec<T>> {
    let malformed = || ReadError::Malformed {
        line: line_number,
        expected,
        found: line.to_owned(),
    };

    let values = line
        .split_whitespace()
        .map(|token| token.parse::<T>().map_err(|_| malformed()))
        .collect::<ReadResult<Vec<T>>>()?;
    if count.is_some_and(|count| count != values.len()) {
        return Err(malformed());
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_counted() {
        assert_eq!(parse_tokens::<u64>(1, "3 4", Some(2), "two numbers").ok(), Some(vec![3, 4]));
        assert!(matches!(
            parse_tokens::<u64>(7, "3 4 5", Some(2), "two numbers"),
            Err(ReadError::Malformed { line: 7, .. })
        ));
        assert!(matches!(
            parse_tokens::<u64>(2, "3 x", None, "numbers"),
            Err(ReadError::Malformed { line: 2, .. })
        ));
    }
}
