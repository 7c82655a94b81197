//! The first benchmark format.
//!
//! The first line holds the number of jobs and the server capacity, followed by one line per job
//! with its index, start, end and demand. Benchmark sets are organised in directories named
//! `n<jobs> t<horizon> <category>`, each holding a number of `*.txt` instance files.
use std::fmt::Display;
use std::io::BufRead;
use std::path::Path;
use std::path::PathBuf;

use super::numbered_lines;
use super::open;
use super::parse_tokens;
use super::ReadError;
use super::ReadResult;
use crate::instance::Instance;
use crate::instance::Job;
use crate::instance::Time;

pub fn read_instance(reader: impl BufRead) -> ReadResult<Instance> {
    let mut lines = numbered_lines(reader)
        .filter(|line| !matches!(line, Ok((_, content)) if content.trim().is_empty()));

    let (line, header) = lines.next().ok_or(ReadError::MissingHeader)??;
    let header = parse_tokens::<u64>(line, &header, Some(2), "the number of jobs and the capacity")?;
    let num_jobs = header[0] as usize;
    let capacity = header[1];

    let mut jobs = Vec::with_capacity(num_jobs);
    for numbered in lines {
        let (line, content) = numbered?;
        let row = parse_tokens::<Time>(line, &content, Some(4), "index, start, end and demand")?;
        let demand = u64::try_from(row[3]).map_err(|_| ReadError::Malformed {
            line,
            expected: "a non-negative demand",
            found: content.clone(),
        })?;
        jobs.push(Job::new(row[1], row[2], demand));
    }

    if jobs.len() != num_jobs {
        return Err(ReadError::JobCountMismatch {
            expected: num_jobs,
            actual: jobs.len(),
        });
    }
    Ok(Instance::new(jobs, capacity)?)
}

pub fn read_file(path: impl AsRef<Path>) -> ReadResult<Instance> {
    read_instance(open(path.as_ref())?)
}

/// A group of benchmark instances sharing their size, horizon and category.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BenchmarkGroup {
    pub num_jobs: usize,
    pub horizon: u64,
    pub category: String,
}

impl BenchmarkGroup {
    /// Parses a directory name of the form `n<jobs> t<horizon> <category>`.
    pub fn parse(name: &str) -> ReadResult<BenchmarkGroup> {
        let invalid = || ReadError::InvalidName(name.to_owned());

        let mut parts = name.split(' ');
        let num_jobs = parts
            .next()
            .and_then(|part| part.strip_prefix('n'))
            .and_then(|value| value.parse().ok())
            .ok_or_else(invalid)?;
        let horizon = parts
            .next()
            .and_then(|part| part.strip_prefix('t'))
            .and_then(|value| value.parse().ok())
            .ok_or_else(invalid)?;
        let category = parts.next().ok_or_else(invalid)?.to_owned();
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(BenchmarkGroup {
            num_jobs,
            horizon,
            category,
        })
    }

    /// The instance files of this group below `root`, sorted by name.
    pub fn instance_files(&self, root: impl AsRef<Path>) -> ReadResult<Vec<PathBuf>> {
        let directory = root.as_ref().join(self.to_string());
        let mut files = Vec::new();
        for entry in std::fs::read_dir(directory)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|extension| extension == "txt") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl Display for BenchmarkGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{} t{} {}", self.num_jobs, self.horizon, self.category)
    }
}

/// The benchmark groups found in the directories directly below `root`, in ascending order.
pub fn groups(root: impl AsRef<Path>) -> ReadResult<Vec<BenchmarkGroup>> {
    let mut groups = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        groups.push(BenchmarkGroup::parse(&name.to_string_lossy())?);
    }
    groups.sort();
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "3 10\n0 0 4 6\n1 1 5 6\n2 2 6 3\n";

    #[test]
    fn reads_jobs_and_capacity() {
        let instance = read_instance(SMALL.as_bytes()).expect("valid instance");

        assert_eq!(instance.num_jobs(), 3);
        assert_eq!(instance.capacity(), 10);
        assert_eq!(instance[1], Job::new(1, 5, 6));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let instance = read_instance("\n2 5\n\n0 0 1 1\n1 3 4 2\n\n".as_bytes()).expect("valid");

        assert_eq!(instance.num_jobs(), 2);
    }

    #[test]
    fn job_count_has_to_match_the_header() {
        let result = read_instance("4 10\n0 0 4 6\n".as_bytes());

        assert!(matches!(
            result,
            Err(ReadError::JobCountMismatch {
                expected: 4,
                actual: 1
            })
        ));
    }

    #[test]
    fn empty_intervals_are_rejected() {
        let result = read_instance("1 10\n0 3 3 6\n".as_bytes());

        assert!(matches!(result, Err(ReadError::Instance(_))));
    }

    #[test]
    fn empty_files_have_no_header() {
        assert!(matches!(read_instance("".as_bytes()), Err(ReadError::MissingHeader)));
    }

    #[test]
    fn group_names_round_trip() {
        let group = BenchmarkGroup::parse("n100 t200 A").expect("valid name");

        assert_eq!(group.num_jobs, 100);
        assert_eq!(group.horizon, 200);
        assert_eq!(group.category, "A");
        assert_eq!(group.to_string(), "n100 t200 A");
    }

    #[test]
    fn malformed_group_names_are_rejected() {
        for name in ["100 t200 A", "n100 200 A", "n100 t200", "n100 t200 A B", "nx t200 A"] {
            assert!(BenchmarkGroup::parse(name).is_err(), "{name}");
        }
    }

    #[test]
    fn groups_sort_numerically() {
        let mut groups = ["n20 t5 B", "n100 t5 A", "n20 t5 A"]
            .iter()
            .map(|name| BenchmarkGroup::parse(name).expect("valid name"))
            .collect::<Vec<_>>();
        groups.sort();

        let names = groups.iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(names, vec!["n20 t5 A", "n20 t5 B", "n100 t5 A"]);
    }
}
