//! Example: building archives with globtar-core
//!
//! Run with: `cargo run --example create_archive`

use globtar_core::CreationConfig;
use globtar_core::EntryFilter;
use globtar_core::create_tar;
use globtar_core::create_tar_stream;
use std::fs;
use std::io;
use tempfile::TempDir;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = TempDir::new()?;
    let root = workspace.path().join("dist");
    fs::create_dir_all(root.join("assets"))?;
    fs::write(root.join("app.js"), "console.log('app');\n")?;
    fs::write(root.join("app.test.js"), "test('app');\n")?;
    fs::write(root.join("assets/logo.svg"), "<svg/>\n")?;

    // Example 1: plain tar file
    println!("Example 1: plain tar");
    let config = CreationConfig::default().with_root_path(&root);
    let output = workspace.path().join("bundle.tar");
    let report = create_tar(&["**/*.js", "/assets/*"], &output, &config)?;
    println!(
        "  {} files, {} bytes",
        report.files_added, report.bytes_written
    );

    // Example 2: gzip, dropping test files
    println!("\nExample 2: filtered tar.gz");
    let config = config
        .with_gzip(true)
        .with_filter(EntryFilter::exclude_suffixes(vec![".test.js".to_string()]));
    let output = workspace.path().join("bundle.tar.gz");
    let report = create_tar(&["**/*"], &output, &config)?;
    println!(
        "  {} files, compression ratio {:.2}",
        report.files_added,
        report.compression_ratio()
    );

    // Example 3: pull-based stream
    println!("\nExample 3: stream");
    let mut stream = create_tar_stream(&["**/*.js"], &config)?;
    let streamed = io::copy(&mut stream, &mut io::sink())?;
    println!("  streamed {streamed} bytes");

    Ok(())
}
