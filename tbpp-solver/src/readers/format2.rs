//! The second benchmark format.
//!
//! The first line holds the number of jobs, the server capacity and the number of time steps,
//! separated by tabs. It is followed by one demand per job and two lines which are ignored. Every
//! remaining line is a time step and lists the jobs active during it. A job starts at the first
//! step in which it is listed and ends at the first step in which it no longer is.
//!
//! Instance files are named `I_<iteration>.txt_<steps>_<capacity>.txt`; every ten iterations
//! form one instance class.
use std::collections::BTreeSet;
use std::io::BufRead;
use std::path::Path;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use super::numbered_lines;
use super::open;
use super::parse_tokens;
use super::ReadError;
use super::ReadResult;
use crate::instance::Instance;
use crate::instance::Job;
use crate::instance::Time;

/// The number of lines between the demands and the first time step.
const SKIPPED_LINES: usize = 2;

static FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"I_(\d+)\.txt_(\d+)_(\d+)\.txt").expect("valid file name pattern")
});

pub fn read_instance(reader: impl BufRead) -> ReadResult<Instance> {
    let mut lines = numbered_lines(reader);

    let (line, header) = lines.next().ok_or(ReadError::MissingHeader)??;
    let header = parse_tokens::<u64>(line, &header, Some(3), "jobs, capacity and time steps")?;
    let num_jobs = header[0] as usize;
    let capacity = header[1];

    let mut demands = Vec::with_capacity(num_jobs);
    for _ in 0..num_jobs {
        let Some(numbered) = lines.next() else {
            return Err(ReadError::JobCountMismatch {
                expected: num_jobs,
                actual: demands.len(),
            });
        };
        let (line, content) = numbered?;
        demands.push(parse_tokens::<u64>(line, &content, Some(1), "a demand")?[0]);
    }
    for numbered in lines.by_ref().take(SKIPPED_LINES) {
        let _ = numbered?;
    }

    let mut starts: Vec<Option<Time>> = vec![None; num_jobs];
    let mut ends: Vec<Option<Time>> = vec![None; num_jobs];
    let mut active = BTreeSet::new();
    let mut num_steps = 0;
    for (step, numbered) in lines.enumerate() {
        let (line, content) = numbered?;
        let listed = parse_tokens::<usize>(line, &content, None, "the indices of active jobs")?
            .into_iter()
            .collect::<BTreeSet<_>>();
        if let Some(&job) = listed.iter().find(|&&job| job >= num_jobs) {
            return Err(ReadError::UnknownJob { line, job });
        }

        let time = step as Time;
        for &job in active.difference(&listed) {
            ends[job] = Some(time);
        }
        for &job in listed.difference(&active) {
            if starts[job].is_some() {
                return Err(ReadError::ReactivatedJob { job, time: step });
            }
            starts[job] = Some(time);
        }
        active = listed;
        num_steps = step + 1;
    }
    for &job in &active {
        ends[job] = Some(num_steps as Time);
    }

    let jobs = (0..num_jobs)
        .map(|job| match (starts[job], ends[job]) {
            (Some(start), Some(end)) => Ok(Job::new(start, end, demands[job])),
            _ => Err(ReadError::InactiveJob(job)),
        })
        .collect::<ReadResult<Vec<_>>>()?;
    Ok(Instance::new(jobs, capacity)?)
}

pub fn read_file(path: impl AsRef<Path>) -> ReadResult<Instance> {
    read_instance(open(path.as_ref())?)
}

/// The information encoded in the name of an instance file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceFile {
    pub iteration: u32,
    pub num_steps: u32,
    pub capacity: u64,
    pub class: u32,
    pub path: PathBuf,
}

impl InstanceFile {
    /// Parses the name of `path`; returns `None` if it does not follow the naming scheme.
    pub fn parse(path: impl Into<PathBuf>) -> Option<InstanceFile> {
        let path = path.into();
        let name = path.file_name()?.to_str()?;
        let captures = FILE_NAME.captures(name)?;

        let iteration = captures[1].parse::<u32>().ok()?;
        let num_steps = captures[2].parse().ok()?;
        let capacity = captures[3].parse().ok()?;
        Some(InstanceFile {
            iteration,
            num_steps,
            capacity,
            class: 1 + iteration.saturating_sub(1) / 10,
            path,
        })
    }

    pub fn read(&self) -> ReadResult<Instance> {
        read_file(&self.path)
    }
}

/// The instance files directly below `root`, ordered by class and iteration. Files which do not
/// follow the naming scheme are skipped.
pub fn instance_files(root: impl AsRef<Path>) -> ReadResult<Vec<InstanceFile>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let path = entry?.path();
        if path.extension().is_some_and(|extension| extension == "txt") {
            files.extend(InstanceFile::parse(path));
        }
    }
    files.sort_by_key(|file| (file.class, file.iteration, file.num_steps, file.capacity));
    Ok(files)
}
