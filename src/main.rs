//! Main entry point for the zsfs CLI application.
//!
//! This binary exposes the archive file system on the command line, so an
//! archive can be listed and read through the same path strings a library
//! caller would use.

use anyhow::{Result, bail};
use chrono::DateTime;
use clap::Parser;
use std::io::{self, Read, Seek, SeekFrom, Write};

use zipstream_vfs::cli::Command;
use zipstream_vfs::{Cli, FilePath, Registry};

/// Application entry point.
///
/// Installs the logger (configured through `RUST_LOG`), parses the command
/// line and dispatches to the matching command.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let registry = Registry::with_defaults();

    match &cli.command {
        Command::Ls { path, long } => list(&*registry.path(path), *long, cli.is_quiet()),
        Command::Stat { path } => stat(&*registry.path(path)),
        Command::Cat { path } => read_range(&*registry.path(path), 0, None),
        Command::Read {
            path,
            offset,
            length,
        } => read_range(&*registry.path(path), *offset, *length),
        Command::Tree { path } => {
            let root = registry.path(path);
            println!("{}", root.name());
            tree(&*root, 1)
        }
    }
}

/// List the direct children of a directory.
///
/// Supports two output formats:
/// - Simple format: one path per line
/// - Long format (`-l`): type, size, modification time and path, followed
///   by a total line
///
/// # Arguments
///
/// * `dir` - The directory to list
/// * `long` - If true, display type, size and date of every child
/// * `quiet` - If true, omit the total line
fn list(dir: &dyn FilePath, long: bool, quiet: bool) -> Result<()> {
    let children = dir.list()?;

    let mut total_size = 0u64;
    for child in &children {
        if long {
            let is_dir = child.is_directory();
            let size = if is_dir { 0 } else { child.size() };
            total_size += size;
            println!(
                "{}  {:>10}  {:>16}  {}",
                if is_dir { 'd' } else { '-' },
                size,
                format_timestamp(child.last_modified()),
                child.name()
            );
        } else {
            println!("{}", child.name());
        }
    }

    if long && !quiet {
        println!("{} entries, {}", children.len(), format_size(total_size));
    }

    Ok(())
}

/// Print existence, type and size of a path.
fn stat(path: &dyn FilePath) -> Result<()> {
    if !path.exists() && !path.is_directory() {
        bail!("{}: no such file or directory", path.name());
    }

    let kind = if path.is_directory() {
        "directory"
    } else {
        "file"
    };
    println!("  Path: {}", path.name());
    println!("  Type: {}", kind);
    if kind == "file" {
        let size = path.size();
        println!("  Size: {} ({})", size, format_size(size));
        println!("  Date: {}", format_timestamp(path.last_modified()));
    }
    Ok(())
}

/// Copy a window of a file to stdout.
///
/// The offset is reached with a seek on the file handle, so for archive
/// entries the bytes before it are skipped rather than copied.
///
/// # Arguments
///
/// * `path` - The file to read
/// * `offset` - Offset of the first byte to write
/// * `length` - Number of bytes to write, or `None` for the rest of the file
fn read_range(path: &dyn FilePath, offset: u64, length: Option<u64>) -> Result<()> {
    let mut file = path.open_read()?;
    if offset > 0 {
        file.seek(SeekFrom::Start(offset))?;
    }

    let mut stdout = io::stdout().lock();
    match length {
        Some(n) => io::copy(&mut file.by_ref().take(n), &mut stdout)?,
        None => io::copy(&mut file, &mut stdout)?,
    };
    stdout.flush()?;
    file.close()?;
    Ok(())
}

/// Print a directory tree, children indented below their parent.
fn tree(dir: &dyn FilePath, depth: usize) -> Result<()> {
    for child in dir.list()? {
        let name = child.name();
        let label = name
            .trim_end_matches('/')
            .rsplit(['/', '!'])
            .next()
            .unwrap_or(name);
        println!("{}{}", "  ".repeat(depth), label);
        if child.is_directory() {
            tree(&*child, depth + 1)?;
        }
    }
    Ok(())
}

/// Format epoch milliseconds as `YYYY-MM-DD HH:MM`, or `-` when unknown.
fn format_timestamp(millis: u64) -> String {
    match DateTime::from_timestamp_millis(millis as i64) {
        Some(t) if millis > 0 => t.format("%Y-%m-%d %H:%M").to_string(),
        _ => "-".to_string(),
    }
}

/// Format a byte size into a human-readable string.
///
/// Automatically selects the appropriate unit (bytes, KB, MB, GB)
/// based on the size magnitude.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// assert_eq!(format_size(1048576), "1.00 MB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
