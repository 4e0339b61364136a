//! Info command implementation.

use chrono::NaiveDateTime;
use nufx_archive::{NufxArchive, ThreadKind};
use std::path::Path;

fn show_date(date: Option<NaiveDateTime>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d %H:%M:%S").to_string())
}

pub fn cmd_info(archive: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let nufx = NufxArchive::open(archive)?;
    let metadata = std::fs::metadata(archive)?;
    let master = nufx.master();

    println!("Archive Information");
    println!("===================");
    println!("File: {}", archive.display());
    println!("Size: {} bytes", metadata.len());
    if master.is_binary_ii() {
        println!("Wrapper: Binary II");
    }

    println!();
    println!("Master Header:");
    println!("  Version: {}", master.master_version);
    println!("  Records: {}", master.total_records);
    println!("  Created: {}", show_date(master.archive_create_when));
    println!("  Modified: {}", show_date(master.archive_mod_when));
    match master.master_eof {
        Some(eof) => println!("  Declared EOF: {} bytes", eof),
        None => println!("  Declared EOF: unknown"),
    }
    println!(
        "  CRC: {:04x} ({})",
        master.master_crc,
        if master.is_crc_valid() { "OK" } else { "MISMATCH" }
    );

    let entries = nufx.entries();
    let total_size = nufx.uncompressed_size();
    let total_compressed = nufx.compressed_size();
    let bad_headers = entries.iter().filter(|e| !e.is_crc_valid()).count();

    println!();
    println!("Contents:");
    println!(
        "  Files: {}",
        entries.iter().filter(|e| !e.is_disk_image()).count()
    );
    println!(
        "  Disk images: {}",
        entries.iter().filter(|e| e.is_disk_image()).count()
    );
    println!(
        "  Resource forks: {}",
        entries
            .iter()
            .filter(|e| e.find_thread(ThreadKind::ResourceFork).is_some())
            .count()
    );
    println!("  Total size: {} bytes", total_size);
    println!("  Compressed size: {} bytes", total_compressed);
    if total_size > 0 {
        println!(
            "  Compression ratio: {:.1}%",
            (1.0 - total_compressed as f64 / total_size as f64) * 100.0
        );
    }
    if bad_headers > 0 {
        println!("  Header CRC mismatches: {}", bad_headers);
    }

    Ok(())
}
