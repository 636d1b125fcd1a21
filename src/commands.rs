// src/commands.rs

//! Command handlers for the remedy CLI

use anyhow::Result;
use std::path::Path;
use tracing::info;

use remedy::apply::{CommandRunner, PatchApplier};
use remedy::lifecycle::DistLifecycle;
use remedy::manifest::{load_manifest, Patch};
use remedy::report::ConsoleReporter;
use remedy::resolver;
use remedy::state::{load_state, InstallState};

fn load_inputs(manifest_path: &str, snapshot_path: &str) -> Result<(Vec<Patch>, InstallState)> {
    let patches = load_manifest(Path::new(manifest_path))?;
    info!("Loaded {} patches from {}", patches.len(), manifest_path);

    let state = load_state(Path::new(snapshot_path))?;
    info!(
        "Loaded snapshot with {} installed packages from {}",
        state.package_count(),
        snapshot_path
    );

    Ok((patches, state))
}

/// Resolve applicable patches and apply them
pub fn apply(
    manifest_path: &str,
    snapshot_path: &str,
    root: &str,
    cache_dir: &str,
    tool: &str,
    dry_run: bool,
) -> Result<()> {
    let (patches, state) = load_inputs(manifest_path, snapshot_path)?;
    let applicable = resolver::resolve(&patches, &state)?;

    if dry_run {
        if applicable.is_empty() {
            println!("No applicable patches");
            return Ok(());
        }
        println!("Would apply {} patches:", applicable.len());
        for patch in &applicable {
            println!(
                "  {} -> {} (-p{})",
                patch.name(),
                patch.target_name(),
                patch.precision()
            );
        }
        return Ok(());
    }

    let lifecycle = DistLifecycle::new(root, cache_dir)?;
    let runner = CommandRunner::new(tool)?;
    let reporter = ConsoleReporter;

    let mut applier = PatchApplier::new(&state, &lifecycle, &runner, &reporter);
    let report = applier.apply(&applicable)?;

    if report.patches_applied > 0 {
        println!(
            "Applied {} patches ({} packages reinstalled)",
            report.patches_applied, report.packages_reinstalled
        );
    }
    Ok(())
}

/// Show each patch's applicability against the installed snapshot
pub fn status(manifest_path: &str, snapshot_path: &str) -> Result<()> {
    let (patches, state) = load_inputs(manifest_path, snapshot_path)?;

    if patches.is_empty() {
        println!("Manifest declares no patches");
        return Ok(());
    }

    let mut failures = 0;
    for patch in &patches {
        match resolver::evaluate(patch, &state) {
            Ok(outcome) => {
                let marker = if outcome.is_applicable() { "+" } else { "-" };
                println!(
                    "{} {} ({}): {}",
                    marker,
                    patch.name(),
                    patch.target_name(),
                    outcome.description()
                );
            }
            Err(e) => {
                failures += 1;
                eprintln!("! {}: {}", patch.name(), e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} patches have unsatisfiable required conditions");
    }
    Ok(())
}

/// Parse and validate the patch manifest
pub fn validate(manifest_path: &str) -> Result<()> {
    let patches = load_manifest(Path::new(manifest_path))?;

    println!("Manifest OK: {} patches", patches.len());
    for patch in &patches {
        println!(
            "  {} -> {} ({} conditions, -p{})",
            patch.name(),
            patch.target_name(),
            patch.conditions().len(),
            patch.precision()
        );
    }
    Ok(())
}
