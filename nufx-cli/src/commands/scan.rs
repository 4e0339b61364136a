//! Scan command implementation.
//!
//! Walks directory trees for `.shk` and `.sdk` archives and prints a hex
//! dump of every entry header, then names the smallest compressed entry.

use nufx_archive::{HeaderBlock, NufxArchive, ThreadClass};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const HEADER: &str = "Ver# Threads  FSId FSIn Access   FileType ExtraTyp Stor Thread Formats..... OrigSize CompSize Filename";
const RULE: &str = "==== ======== ==== ==== ======== ======== ======== ==== =================== ======== ======== ==============================";

/// Thread format columns shown per row.
const FORMAT_COLUMNS: usize = 4;

/// One formatted entry row.
struct ScanRow {
    line: String,
    filename: String,
    compressed: bool,
    comp_size: u64,
}

/// Smallest compressed entry seen so far.
#[derive(Default)]
struct Smallest {
    archive: Option<PathBuf>,
    filename: String,
    size: u64,
}

impl Smallest {
    fn offer(&mut self, archive: &Path, row: &ScanRow) {
        if row.compressed && (self.size == 0 || row.comp_size < self.size) {
            self.archive = Some(archive.to_path_buf());
            self.filename = row.filename.clone();
            self.size = row.comp_size;
        }
    }
}

/// Whether a file name carries a NuFX archive extension.
fn is_nufx_name(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("shk") || ext.eq_ignore_ascii_case("sdk"))
}

fn format_row(entry: &HeaderBlock) -> ScanRow {
    let mut line = format!(
        "{:04x} {:08x} {:04x} {:04x} {:08x} {:08x} {:08x} {:04x} ",
        entry.version_number,
        entry.total_threads,
        entry.file_sys_id,
        entry.file_sys_info,
        entry.access,
        entry.file_type,
        entry.extra_type,
        entry.storage_type
    );

    let mut orig_size = 0u64;
    let mut comp_size = 0u64;
    let mut compressed = false;
    for thread in entry.threads() {
        let _ = write!(line, "{:04x} ", thread.thread_format.raw());
        compressed |= thread.thread_format.is_compressed();
        if thread.thread_class == ThreadClass::Data {
            orig_size += thread.thread_eof;
            comp_size += thread.comp_thread_eof;
        }
    }
    for _ in entry.threads().len()..FORMAT_COLUMNS {
        line.push_str("     ");
    }

    let filename = match entry.filename() {
        "" => "<Unknown>".to_string(),
        name => name.to_string(),
    };
    let _ = write!(line, "{:08x} {:08x} {}", orig_size, comp_size, filename);

    ScanRow {
        line,
        filename,
        compressed,
        comp_size,
    }
}

fn display_archive(path: &Path, smallest: &mut Smallest) {
    let shown = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    println!("Details for {}\n", shown.display());

    let archive = match NufxArchive::open(path) {
        Ok(archive) => archive,
        Err(e) => {
            println!("Unable to read {}: {}\n", shown.display(), e);
            log::debug!("{}: {:?}", path.display(), e);
            return;
        }
    };

    println!("{}", HEADER);
    println!("{}", RULE);
    for entry in archive.entries() {
        let row = format_row(entry);
        println!("{}", row.line);
        smallest.offer(&shown, &row);
    }
    println!();
}

fn scan_directory(directory: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Scanning '{}'...\n", directory.display());
    if !directory.is_dir() {
        return Err(format!("'{}' is not a directory", directory.display()).into());
    }

    let mut smallest = Smallest::default();
    for dir_entry in WalkDir::new(directory).sort_by_file_name() {
        let dir_entry = match dir_entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable path: {}", e);
                continue;
            }
        };
        if dir_entry.file_type().is_file() && is_nufx_name(dir_entry.path()) {
            display_archive(dir_entry.path(), &mut smallest);
        }
    }

    if let Some(archive) = &smallest.archive {
        println!("\n\nSmallest compressed file:");
        println!("Archive = {}", archive.display());
        println!("Filename = {}", smallest.filename);
        println!("Size = {:08x} ({})", smallest.size, smallest.size);
    }
    Ok(())
}

pub fn cmd_scan(directories: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    for directory in directories {
        scan_directory(directory)?;
    }
    Ok(())
}
