//! Utility functions for the CLI.

use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use nufx_archive::{HeaderBlock, NufxArchive, ThreadFormat};
use nufx_core::NufxError;
use std::path::{Component, Path, PathBuf};

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");
    let pb = ProgressBar::new(len);
    pb.set_style(style);
    pb
}

/// Check if a filename matches the filter patterns.
/// - If include patterns are specified, the name must match at least one
/// - If exclude patterns are specified, the name must not match any
pub fn matches_filters(name: &str, include: &[String], exclude: &[String]) -> bool {
    let matches = |pattern: &String| Pattern::new(pattern).is_ok_and(|p| p.matches(name));

    if exclude.iter().any(matches) {
        return false;
    }
    include.is_empty() || include.iter().any(matches)
}

/// Entries whose filenames pass the include/exclude patterns.
pub fn filter_entries<'a>(
    archive: &'a NufxArchive,
    include: &[String],
    exclude: &[String],
) -> Vec<&'a HeaderBlock> {
    archive
        .entries()
        .iter()
        .filter(|e| matches_filters(e.filename(), include, exclude))
        .collect()
}

/// Space saved by compression, in percent.
pub fn space_savings(size: u64, compressed: u64) -> f64 {
    if size == 0 {
        0.0
    } else {
        (1.0 - compressed as f64 / size as f64) * 100.0
    }
}

/// Short name of a thread format for tables.
pub fn format_short_name(format: ThreadFormat) -> &'static str {
    match format {
        ThreadFormat::Uncompressed => "Stored",
        ThreadFormat::HuffmanSqueeze => "Squeeze",
        ThreadFormat::DynamicLzw1 => "LZW/1",
        ThreadFormat::DynamicLzw2 => "LZW/2",
        ThreadFormat::Unix12BitCompress => "LZC12",
        ThreadFormat::Unix16BitCompress => "LZC16",
        ThreadFormat::Unknown(_) => "?",
    }
}

/// Format of the entry's main fork.
pub fn entry_method(entry: &HeaderBlock) -> &'static str {
    entry
        .data_fork()
        .or_else(|| entry.resource_fork())
        .map_or("-", |t| format_short_name(t.thread_format))
}

/// File type and auxiliary type, ProDOS style.
pub fn entry_type(entry: &HeaderBlock) -> String {
    if entry.is_disk_image() {
        format!("Disk {}K", entry.uncompressed_size() / 1024)
    } else {
        format!("${:02X}/{:04X}", entry.file_type, entry.extra_type)
    }
}

/// Join an entry name onto the output directory.
///
/// Absolute names and names containing `..` are refused.
pub fn safe_output_path(output: &Path, name: &str) -> Result<PathBuf, NufxError> {
    let mut path = output.to_path_buf();
    let mut pushed = false;
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => {
                path.push(part.to_string_lossy().replace('\0', "_"));
                pushed = true;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(NufxError::path_traversal(name));
            }
        }
    }
    if !pushed {
        return Err(NufxError::path_traversal(name));
    }
    Ok(path)
}

/// Print entries in a formatted table.
pub fn print_entries(entries: &[&HeaderBlock], verbose: bool) {
    if !verbose {
        for entry in entries {
            println!("{}", entry.filename());
        }
        return;
    }

    println!(
        "{:>10} {:>10} {:>6} {:>7} {:<16} {:<10}  Name",
        "Size", "Compressed", "Ratio", "Format", "File system", "Type",
    );
    println!("{}", "-".repeat(78));

    let mut total_size = 0u64;
    let mut total_compressed = 0u64;

    for entry in entries {
        let size = entry.uncompressed_size();
        let compressed = entry.compressed_size();
        let ratio = if size > 0 {
            format!("{:.1}%", space_savings(size, compressed))
        } else {
            "-".to_string()
        };

        println!(
            "{:>10} {:>10} {:>6} {:>7} {:<16} {:<10}  {}",
            size,
            compressed,
            ratio,
            entry_method(entry),
            entry.file_system().name(),
            entry_type(entry),
            entry.filename()
        );

        total_size += size;
        total_compressed += compressed;
    }

    println!("{}", "-".repeat(78));
    println!(
        "{:>10} {:>10} {:>5.1}%  {} entries",
        total_size,
        total_compressed,
        space_savings(total_size, total_compressed),
        entries.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_filters() {
        let none: Vec<String> = Vec::new();
        assert!(matches_filters("GAMES/ZORK", &none, &none));

        let include = vec!["GAMES/*".to_string()];
        assert!(matches_filters("GAMES/ZORK", &include, &none));
        assert!(!matches_filters("UTIL/COPY", &include, &none));

        let exclude = vec!["*ZORK*".to_string()];
        assert!(!matches_filters("GAMES/ZORK", &include, &exclude));
    }

    #[test]
    fn test_safe_output_path() {
        let out = Path::new("out");
        assert_eq!(
            safe_output_path(out, "GAMES/ZORK").unwrap(),
            Path::new("out").join("GAMES").join("ZORK")
        );
        assert_eq!(
            safe_output_path(out, "./A").unwrap(),
            Path::new("out").join("A")
        );
        assert!(matches!(
            safe_output_path(out, "../ESCAPE"),
            Err(NufxError::PathTraversal { .. })
        ));
        assert!(safe_output_path(out, "/ETC/PASSWD").is_err());
        assert!(safe_output_path(out, "").is_err());
    }

    #[test]
    fn test_space_savings() {
        assert_eq!(space_savings(0, 0), 0.0);
        assert_eq!(space_savings(100, 25), 75.0);
    }

    #[test]
    fn test_format_short_names() {
        assert_eq!(format_short_name(ThreadFormat::DynamicLzw2), "LZW/2");
        assert_eq!(format_short_name(ThreadFormat::Unknown(9)), "?");
    }
}
