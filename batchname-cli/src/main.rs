use anyhow::{Context, Result};
use batchname_core::{PreviewRow, RenameSession, SortDirection};

mod cli;

fn main() -> Result<()> {
    let args = cli::parse_args();

    // Initialize logger with appropriate level based on verbose flag
    if std::env::var("RUST_LOG").is_err() {
        if args.verbose {
            std::env::set_var("RUST_LOG", "debug");
        } else {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    if args.dry_run {
        log::info!("Running in DRY-RUN mode - no files will be renamed");
    }

    let mut session = RenameSession::new();

    let summary = session.load(&args.files).context("Failed to load files")?;
    if summary.loaded == 0 {
        eprintln!("ERROR: {}", session.status());
        std::process::exit(1);
    }
    log::info!("{}", session.status());

    let form = args.settings_form(summary.suggested_zero_fill);
    if let Err(e) = session.apply_form(&form) {
        eprintln!("ERROR: {}: {}", session.status(), e);
        std::process::exit(2);
    }

    if let Some(key) = args.sort {
        let direction = if args.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        session.sort_by(key.into(), direction)?;
    }

    if args.json {
        println!("{}", session.preview_json()?);
    } else {
        print_preview(&session.rows());
    }

    let duplicates = session.duplicates();
    if duplicates.has_duplicates {
        eprintln!("\n❌ {}", session.status());
        eprintln!("Fix the clashing names before renaming.");
        std::process::exit(1);
    }

    if args.dry_run {
        log::info!("[DRY RUN] Would rename {} files", session.plan().len());
        return Ok(());
    }

    let total = session.commit().context("Rename blocked")?;
    log::info!("Renaming {} files", total);

    let result = session.wait(|progress| {
        log::info!(
            "Renaming in progress (phase {}/2): {}/{} files",
            progress.pass,
            progress.completed,
            progress.total
        );
    });

    match result {
        Some(Ok(count)) => {
            log::info!("{}", session.status());
            println!("✅ Renamed {} files", count);
            Ok(())
        }
        Some(Err(failure)) => {
            eprintln!("\n❌ {}", session.status());
            eprintln!(
                "Stopped in pass {}/2 after {} files. Completed renames were not rolled back.",
                failure.pass, failure.completed
            );
            std::process::exit(1);
        }
        None => anyhow::bail!("Rename job ended without a result"),
    }
}

/// Prints "original -> proposed" rows in working order
fn print_preview(rows: &[PreviewRow]) {
    let width = rows
        .iter()
        .map(|r| r.original_name.chars().count())
        .max()
        .unwrap_or(0);

    for row in rows {
        let marker = if row.is_duplicate { "  ⚠ duplicate" } else { "" };
        println!(
            "{:<width$}  →  {}{}",
            row.original_name,
            row.proposed_name,
            marker,
            width = width
        );
    }
}
