//! Allocation files: one server per line, listing the indices of its jobs separated by
//! whitespace. Blank lines are ignored.
use std::io::BufRead;
use std::io::Write;
use std::path::Path;

use super::numbered_lines;
use super::open;
use super::parse_tokens;
use super::ReadResult;
use crate::instance::Allocation;
use crate::instance::Pattern;

pub fn read_allocation(reader: impl BufRead) -> ReadResult<Allocation> {
    let mut patterns = Vec::new();
    for numbered in numbered_lines(reader) {
        let (line, content) = numbered?;
        if content.trim().is_empty() {
            continue;
        }
        let jobs = parse_tokens::<usize>(line, &content, None, "the indices of jobs")?;
        patterns.push(Pattern::new(jobs));
    }
    Ok(Allocation::new(patterns))
}

pub fn read_allocation_file(path: impl AsRef<Path>) -> ReadResult<Allocation> {
    read_allocation(open(path.as_ref())?)
}

pub fn write_allocation(allocation: &Allocation, mut writer: impl Write) -> std::io::Result<()> {
    for pattern in allocation.iter() {
        writeln!(writer, "{pattern}")?;
    }
    writer.flush()
}

pub fn write_allocation_file(allocation: &Allocation, path: impl AsRef<Path>) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    write_allocation(allocation, std::io::BufWriter::new(file))
}
