//! Extract command implementation.

use crate::utils::{create_progress_bar, matches_filters, safe_output_path};
use filetime::FileTime;
use nufx_archive::{HeaderBlock, NufxArchive, ThreadKind, ThreadRecord};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Options for extracting archive contents.
pub struct ExtractOptions<'a> {
    pub files: &'a [String],
    pub include: &'a [String],
    pub exclude: &'a [String],
    pub resource_forks: bool,
    pub verbose: bool,
    pub progress: bool,
}

impl ExtractOptions<'_> {
    fn should_extract(&self, name: &str) -> bool {
        if !self.files.is_empty()
            && !self
                .files
                .iter()
                .any(|f| name == f || name.starts_with(&format!("{}/", f)))
        {
            return false;
        }
        matches_filters(name, self.include, self.exclude)
    }
}

/// Decode one thread into `path` and return the number of bytes written.
fn write_thread(thread: &ThreadRecord, path: &Path) -> Result<u64, Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut reader = thread.reader()?;
    let mut writer = BufWriter::new(File::create(path)?);
    let written = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    if reader.is_crc_valid() == Some(false) {
        log::warn!("{}: fork CRC mismatch", path.display());
    }
    Ok(written)
}

fn set_modified(entry: &HeaderBlock, path: &Path) {
    let Some(when) = entry.mod_when else {
        return;
    };
    let mtime = FileTime::from_unix_time(when.and_utc().timestamp(), 0);
    if let Err(e) = filetime::set_file_mtime(path, mtime) {
        log::debug!("Cannot set modification time of {}: {}", path.display(), e);
    }
}

/// Output path for an entry, or `None` when its name cannot be used.
fn entry_path(output: &Path, name: &str) -> Option<PathBuf> {
    match safe_output_path(output, name) {
        Ok(path) => Some(path),
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    }
}

fn resource_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".rsrc");
    PathBuf::from(name)
}

pub fn cmd_extract(
    archive: &Path,
    output: &Path,
    options: &ExtractOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let nufx = NufxArchive::open(archive)?;

    println!("Extracting {} to {}", archive.display(), output.display());

    let to_extract: Vec<_> = nufx
        .entries()
        .iter()
        .filter(|e| options.should_extract(e.filename()))
        .collect();

    let pb = create_progress_bar(to_extract.len() as u64, options.progress);
    pb.set_message("entries");

    let mut skipped = 0usize;
    for entry in to_extract {
        let name = entry.filename();
        let Some(path) = entry_path(output, name) else {
            skipped += 1;
            pb.println(format!("  Skipped: {:?} (unsafe or empty name)", name));
            pb.inc(1);
            continue;
        };

        if entry.find_thread(ThreadKind::CreateDirectory).is_some() {
            std::fs::create_dir_all(&path)?;
            if options.verbose {
                pb.println(format!("  Created: {}", name));
            }
            pb.inc(1);
            continue;
        }

        if let Some(fork) = entry.data_fork() {
            if fork.thread_format.is_decodable() {
                let written = write_thread(fork, &path)?;
                set_modified(entry, &path);
                if options.verbose {
                    pb.println(format!("  Extracted: {} ({} bytes)", name, written));
                }
            } else {
                skipped += 1;
                pb.println(format!(
                    "  Skipped: {} ({} is not supported)",
                    name, fork.thread_format
                ));
            }
        }

        if options.resource_forks {
            if let Some(fork) = entry.resource_fork() {
                let rsrc = resource_path(&path);
                if fork.thread_format.is_decodable() {
                    let written = write_thread(fork, &rsrc)?;
                    set_modified(entry, &rsrc);
                    if options.verbose {
                        pb.println(format!(
                            "  Extracted: {}.rsrc ({} bytes)",
                            name, written
                        ));
                    }
                } else {
                    skipped += 1;
                }
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    if skipped > 0 {
        println!("{} entries or forks skipped", skipped);
    }
    Ok(())
}
