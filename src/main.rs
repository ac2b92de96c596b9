use std::io::Write;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use pdfstitch::PdfStitchError;
use pdfstitch::cli::Cli;
use pdfstitch::merge::PdfMerger;
use pdfstitch::output::{Delivery, SaveMode};
use pdfstitch::utils::collect_paths_for_patterns;
use pdfstitch::validation::Validator;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {err:#}");
        let code = err
            .downcast_ref::<PdfStitchError>()
            .map(PdfStitchError::exit_code)
            .unwrap_or(1);
        process::exit(code);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let inputs = collect_paths_for_patterns(&cli.inputs)?;

    if cli.dry_run {
        return dry_run(cli, &inputs);
    }

    let mut merger = PdfMerger::new(cli.composer_options()?);

    if let Some(manifest) = &cli.manifest {
        let json = std::fs::read_to_string(manifest)
            .with_context(|| format!("Failed to read manifest {}", manifest.display()))?;
        merger.add_batch_json(&json)?;
    }

    for input in &inputs {
        merger.add_pdf(input, &cli.pages, None)?;
    }

    // Non-file modes stream the PDF itself to stdout, so progress
    // chatter goes to stderr there.
    let to_file = SaveMode::parse(&cli.mode) == SaveMode::File;

    if !cli.quiet {
        let message = format!("Merging {} PDF file(s)...", merger.entry_count());
        if to_file {
            println!("{message}");
        } else {
            eprintln!("{message}");
        }
    }

    let meta = cli.metadata();
    let result = if cli.duplex {
        merger.duplex_merge(None, &meta)?
    } else {
        merger.merge(None, &meta)?
    };

    if cli.verbose {
        let stats = &result.statistics;
        let message = format!(
            "Composed {} page(s) from {} file(s) ({} blank, {} input) in {:.2}s",
            stats.total_pages,
            stats.files_merged,
            stats.blank_pages_added,
            stats.format_input_size(),
            stats.merge_time.as_secs_f64(),
        );
        if to_file {
            println!("{message}");
        } else {
            eprintln!("{message}");
        }
    }

    let mut stdout = std::io::stdout().lock();
    match result.save(&cli.output, &cli.mode, &mut stdout)? {
        Delivery::Written { path } => {
            if !cli.quiet {
                println!("✓ Successfully created {}", path.display());
            }
        }
        Delivery::Bytes(bytes) => {
            stdout.write_all(&bytes)?;
        }
        Delivery::Attachment { .. } | Delivery::Inline { .. } => {
            // Bytes already streamed to stdout.
        }
    }

    Ok(())
}

fn dry_run(cli: &Cli, inputs: &[std::path::PathBuf]) -> Result<()> {
    if !cli.quiet && !cli.json {
        println!("🔍 DRY RUN MODE - No files will be created\n");
    }

    let validator = Validator::new();
    let (results, summary) = validator.validate_all(inputs);

    if cli.json {
        let valid: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "files": valid,
                "summary": summary,
            }))?
        );
        return Ok(());
    }

    for result in &results {
        match result {
            Ok(valid) => {
                if cli.verbose {
                    println!(
                        "  {} - {} page(s), {} bytes",
                        valid.path.display(),
                        valid.page_count,
                        valid.file_size
                    );
                } else {
                    println!("  {} - ok", valid.path.display());
                }
            }
            Err(err) => println!("  ✗ {err}"),
        }
    }

    println!(
        "\nValidated {} file(s), {} failed, {} page(s) total",
        summary.files_validated, summary.files_failed, summary.total_pages
    );
    println!("  Output would be: {}", cli.output.display());
    println!("  Run without --dry-run to create the merged PDF");

    Ok(())
}
