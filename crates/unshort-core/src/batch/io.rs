//! Input discovery, URL list reading and result writing.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::outcome::Job;

use super::BatchError;

/// Marker in input filenames that is swapped for [`OUTPUT_MARKER`].
pub const INPUT_MARKER: &str = "tco_links";
pub const OUTPUT_MARKER: &str = "converted_links";

/// Regular files directly in `dir` whose name ends with `suffix`, sorted by name.
pub fn discover_inputs(dir: &Path, suffix: &str) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if name.to_string_lossy().ends_with(suffix) {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

/// Reads newline-delimited URLs, trimming whitespace and dropping empty lines.
///
/// Lines that are not valid UTF-8 are logged and skipped; the rest of the file
/// is still used.
pub fn read_urls(path: &Path) -> Result<Vec<String>, BatchError> {
    let data = fs::read(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            BatchError::InputNotFound(path.to_path_buf())
        } else {
            BatchError::Read {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    Ok(parse_url_list(&data))
}

pub(crate) fn parse_url_list(data: &[u8]) -> Vec<String> {
    let mut urls = Vec::new();
    for (n, raw) in data.split(|&b| b == b'\n').enumerate() {
        let Ok(line) = std::str::from_utf8(raw) else {
            tracing::warn!(line = n + 1, "skipping input line that is not valid UTF-8");
            continue;
        };
        let line = line.trim();
        if !line.is_empty() {
            urls.push(line.to_string());
        }
    }
    urls
}

/// Output path for an input file: `x_tco_links.txt` -> `x_converted_links.txt`.
///
/// Only the file name is rewritten. Without the marker, `.converted` is
/// inserted before the extension so the input is never overwritten.
pub fn output_path_for(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let out_name = if name.contains(INPUT_MARKER) {
        name.replace(INPUT_MARKER, OUTPUT_MARKER)
    } else {
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => format!("{}.converted.{}", stem, ext),
            _ => format!("{}.converted", name),
        }
    };
    input.with_file_name(out_name)
}

/// Writes one output line per job, in the order given (completion order).
pub fn write_results(path: &Path, jobs: &[Job]) -> Result<(), BatchError> {
    let write = || -> io::Result<()> {
        let mut out = BufWriter::new(fs::File::create(path)?);
        for job in jobs {
            out.write_all(job.output_line().as_bytes())?;
            out.write_all(b"\n")?;
        }
        out.flush()
    };
    write().map_err(|e| BatchError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}
