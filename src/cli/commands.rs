// CLI command implementations
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::json;

use detag::{Error, FlagPolicy};

use crate::cli::output::OutputFormatter;

/// Map a failed command to a process exit code, so scripting callers can
/// tell "nothing to strip" from "corrupt input" from "unsupported".
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<Error>() {
        Some(Error::NoMetadataFound) => 2,
        Some(Error::InvalidVersion { .. })
        | Some(Error::InvalidSize { .. })
        | Some(Error::CorruptHeader { .. }) => 3,
        Some(Error::UnsupportedVersion { .. }) | Some(Error::UnsupportedFlags { .. }) => 4,
        _ => 1,
    }
}

fn flag_policy(strict: bool) -> FlagPolicy {
    if strict {
        FlagPolicy::Strict
    } else {
        FlagPolicy::Permissive
    }
}

fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("stripped-{}", name))
}

fn strip_file(input: &Path, output: &Path, policy: FlagPolicy) -> Result<u64> {
    let file = File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let mut reader = BufReader::new(file);
    let out =
        File::create(output).with_context(|| format!("failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(out);

    let written = detag::strip_with_policy(&mut reader, &mut writer, policy)
        .with_context(|| format!("failed to strip {}", input.display()))?;
    writer.flush()?;
    Ok(written)
}

/// Strip a single file
pub fn command_strip(
    input: String,
    output: Option<String>,
    overwrite: bool,
    strict: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let input_path = PathBuf::from(&input);
    let output_path = match output {
        Some(path) => PathBuf::from(path),
        None => {
            let fallback = default_output_path(&input_path);
            formatter.print_info(&format!(
                "no output file specified, writing to {}",
                fallback.display()
            ));
            fallback
        }
    };

    if output_path.exists() && !overwrite {
        bail!(
            "output file {} already exists (pass --overwrite to replace it)",
            output_path.display()
        );
    }

    let written = strip_file(&input_path, &output_path, flag_policy(strict))?;
    formatter.print_success(&format!(
        "{} -> {} ({} bytes)",
        input_path.display(),
        output_path.display(),
        written
    ));
    Ok(())
}

/// Probe file(s) for ID3 tags
pub fn command_probe(files: Vec<String>, formatter: &OutputFormatter) -> Result<()> {
    if files.is_empty() {
        bail!("no files specified");
    }

    let mut first_error = None;

    for file_path in files {
        match probe_report(&file_path) {
            Ok(report) => formatter.output_report(&report)?,
            Err(e) => {
                formatter.print_error(&format!("{:#}", e));
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn probe_report(file_path: &str) -> Result<serde_json::Value> {
    let file =
        File::open(file_path).with_context(|| format!("failed to open {}", file_path))?;
    let mut reader = BufReader::new(file);

    let header = detag::probe(&mut reader)
        .with_context(|| format!("failed to probe {}", file_path))?;
    let v1_offset = detag::id3v1_offset(&mut reader)
        .with_context(|| format!("failed to probe {}", file_path))?;

    Ok(json!({
        "file": file_path,
        "id3v2": header,
        "id3v1_offset": v1_offset,
    }))
}

/// Strip every file matching a pattern under a directory
pub fn command_batch(
    directory: String,
    pattern: String,
    overwrite: bool,
    strict: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    // Build glob pattern
    let glob_pattern = if pattern.contains('*') || pattern.contains('?') {
        format!("{}/{}", directory, pattern)
    } else {
        format!("{}/**/{}", directory, pattern)
    };

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in
        glob::glob(&glob_pattern).with_context(|| format!("invalid pattern {}", glob_pattern))?
    {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => formatter.print_error(&format!("error reading path: {}", e)),
        }
    }

    if files.is_empty() {
        formatter.print_info("no files found matching pattern");
        return Ok(());
    }
    formatter.print_info(&format!("processing {} files...", files.len()));

    let policy = flag_policy(strict);
    let mut stripped = 0;
    let mut skipped = 0;
    let mut errors = 0;

    for input_path in &files {
        let output_path = default_output_path(input_path);
        if output_path.exists() && !overwrite {
            formatter.print_error(&format!(
                "{}: output {} already exists",
                input_path.display(),
                output_path.display()
            ));
            errors += 1;
            continue;
        }

        match strip_file(input_path, &output_path, policy) {
            Ok(written) => {
                formatter.print_success(&format!("{} ({} bytes)", input_path.display(), written));
                stripped += 1;
            }
            Err(e) if matches!(e.downcast_ref::<Error>(), Some(Error::NoMetadataFound)) => {
                formatter.print_info(&format!("{}: no metadata, skipped", input_path.display()));
                skipped += 1;
            }
            Err(e) => {
                formatter.print_error(&format!("{:#}", e));
                errors += 1;
            }
        }
    }

    formatter.print_info(&format!(
        "completed: {} stripped, {} skipped, {} errors",
        stripped, skipped, errors
    ));
    if errors > 0 {
        bail!("{} file(s) failed", errors);
    }
    Ok(())
}

/// Show file information
pub fn command_info(files: Vec<String>) -> Result<()> {
    if files.is_empty() {
        bail!("no files specified");
    }

    for file_path in files {
        let path = Path::new(&file_path);
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("failed to stat {}", file_path))?;
        let file_size = metadata.len();

        let file = File::open(path)
            .with_context(|| format!("failed to open {}", file_path))?;
        let mut reader = BufReader::new(file);
        let header = detag::probe(&mut reader)?;
        let v1_offset = detag::id3v1_offset(&mut reader)?;

        println!("{}", file_path);
        println!("{}", "-".repeat(60));
        println!("Size: {} bytes", file_size);
        if let Ok(mtime) = metadata.modified() {
            let modified: chrono::DateTime<chrono::Local> = mtime.into();
            println!("Modified: {}", modified.format("%Y-%m-%d %H:%M:%S"));
        }

        let start = match &header {
            Some(h) => {
                println!(
                    "ID3v2: present (version 2.{}.{}, tag size {} bytes)",
                    h.major_version, h.revision, h.tag_size
                );
                h.total_size()
            }
            None => {
                println!("ID3v2: absent");
                0
            }
        };
        let end = match v1_offset {
            Some(offset) => {
                println!("ID3v1: present (offset {})", offset);
                offset
            }
            None => {
                println!("ID3v1: absent");
                file_size
            }
        };

        if start > end {
            println!("Payload: inconsistent bounds ({}..{})", start, end);
        } else {
            println!("Payload: bytes {}..{} ({} bytes)", start, end, end - start);
        }
        println!();
    }

    Ok(())
}
