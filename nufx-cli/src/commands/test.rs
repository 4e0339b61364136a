//! Test command implementation.

use nufx_archive::{NufxArchive, ThreadClass, ThreadRecord};
use nufx_core::NufxError;
use std::io;
use std::path::Path;

enum ThreadOutcome {
    Ok(u64),
    CrcMismatch,
    Skipped,
}

fn test_thread(thread: &ThreadRecord) -> Result<ThreadOutcome, NufxError> {
    if !thread.thread_format.is_decodable() {
        return Ok(ThreadOutcome::Skipped);
    }
    let mut reader = thread.reader()?;
    let len = io::copy(&mut reader, &mut io::sink())?;
    if len < thread.thread_eof {
        let missing = thread.thread_eof - len;
        return Err(NufxError::end_of_data(
            usize::try_from(missing).unwrap_or(usize::MAX),
        ));
    }
    if reader.is_crc_valid() == Some(false) {
        return Ok(ThreadOutcome::CrcMismatch);
    }
    Ok(ThreadOutcome::Ok(len))
}

pub fn cmd_test(archive: &Path, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let nufx = NufxArchive::open(archive)?;

    println!("Testing {} (NuFX)", archive.display());

    let mut total_threads = 0usize;
    let mut ok_count = 0usize;
    let mut skipped = 0usize;
    let mut errors: Vec<(String, String)> = Vec::new();
    let mut header_warnings = 0usize;

    if !nufx.master().is_crc_valid() {
        println!("  WARNING: master header CRC mismatch");
    }

    for entry in nufx.entries() {
        let name = entry.filename();
        if !entry.is_crc_valid() {
            header_warnings += 1;
            if verbose {
                println!("  WARNING: {} - header CRC mismatch", name);
            }
        }

        for thread in entry
            .threads()
            .iter()
            .filter(|t| t.thread_class == ThreadClass::Data)
        {
            total_threads += 1;
            let label = format!("{} [{}]", name, thread.thread_kind);
            match test_thread(thread) {
                Ok(ThreadOutcome::Ok(len)) => {
                    ok_count += 1;
                    if verbose {
                        println!("  OK: {} ({} bytes, {})", label, len, thread.thread_format);
                    }
                }
                Ok(ThreadOutcome::Skipped) => {
                    skipped += 1;
                    if verbose {
                        println!("  SKIPPED: {} ({})", label, thread.thread_format);
                    }
                }
                Ok(ThreadOutcome::CrcMismatch) => {
                    errors.push((label.clone(), "fork CRC mismatch".to_string()));
                    if verbose {
                        println!("  FAILED: {} - fork CRC mismatch", label);
                    }
                }
                Err(e) => {
                    if verbose {
                        println!("  FAILED: {} - {}", label, e);
                    }
                    errors.push((label, e.to_string()));
                }
            }
        }
    }

    println!();
    println!("Test results:");
    println!("  Total threads: {}", total_threads);
    println!("  OK: {}", ok_count);
    println!("  Skipped (no decoder): {}", skipped);
    println!("  Failed: {}", errors.len());
    if header_warnings > 0 {
        println!("  Header CRC mismatches: {}", header_warnings);
    }

    if !errors.is_empty() && !verbose {
        println!();
        println!("Errors:");
        for (name, err) in &errors {
            println!("  {}: {}", name, err);
        }
    }

    if !errors.is_empty() {
        std::process::exit(2);
    }

    println!();
    println!("All threads OK");
    Ok(())
}
