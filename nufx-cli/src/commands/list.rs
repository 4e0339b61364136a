//! List command implementation.

use crate::utils::{entry_method, filter_entries, print_entries, space_savings};
use nufx_archive::{HeaderBlock, NufxArchive};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// JSON serializable entry data for archive listings.
#[derive(Debug, Serialize, Deserialize)]
struct EntryJson {
    name: String,
    size: u64,
    compressed_size: u64,
    ratio: f64,
    format: String,
    file_system: String,
    file_type: u32,
    extra_type: u32,
    storage_type: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<String>,
    threads: usize,
    disk_image: bool,
    header_crc_ok: bool,
}

impl EntryJson {
    fn from_entry(entry: &HeaderBlock) -> Self {
        let size = entry.uncompressed_size();
        let compressed_size = entry.compressed_size();
        Self {
            name: entry.filename().to_string(),
            size,
            compressed_size,
            ratio: space_savings(size, compressed_size),
            format: entry_method(entry).to_string(),
            file_system: entry.file_system().name().to_string(),
            file_type: entry.file_type,
            extra_type: entry.extra_type,
            storage_type: entry.storage_type,
            modified: entry
                .mod_when
                .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
            threads: entry.threads().len(),
            disk_image: entry.is_disk_image(),
            header_crc_ok: entry.is_crc_valid(),
        }
    }
}

/// JSON output for archive listing.
#[derive(Debug, Serialize, Deserialize)]
struct ArchiveListJson {
    archive: String,
    master_version: u16,
    total_records: u32,
    binary_ii: bool,
    entries: Vec<EntryJson>,
}

/// Options for listing archive contents.
pub struct ListOptions<'a> {
    pub verbose: bool,
    pub json: bool,
    pub include: &'a [String],
    pub exclude: &'a [String],
}

pub fn cmd_list(archive: &Path, options: &ListOptions) -> Result<(), Box<dyn std::error::Error>> {
    let nufx = NufxArchive::open(archive)?;
    let filtered = filter_entries(&nufx, options.include, options.exclude);

    if options.json {
        let listing = ArchiveListJson {
            archive: archive.display().to_string(),
            master_version: nufx.master().master_version,
            total_records: nufx.master().total_records,
            binary_ii: nufx.master().is_binary_ii(),
            entries: filtered.iter().map(|e| EntryJson::from_entry(e)).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("Archive: {} (NuFX)", archive.display());
    println!();
    print_entries(&filtered, options.verbose);
    Ok(())
}
