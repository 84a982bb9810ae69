// SPDX-License-Identifier: MIT

//! Directory walker and batch driver
//!
//! Walks each game root one file at a time: preprocess names, ask the
//! recognition adapter, then route through the placer into `Processed` or
//! `Error`. Per-file failures never stop the batch; each file ends up with
//! exactly one outcome and the loop moves on.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::placer;
use crate::recognize::{CardIdentity, Recognition, RecognitionAdapter};
use crate::sanitize::sanitize;
use crate::Result;

/// Extensions eligible for processing
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp"];

/// Reserved routing subfolders, never traversed
const RESERVED_DIRS: &[&str] = &["Processed", "Error"];

/// Supported games, each tied to a top-level folder under the scan root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKind {
    Magic,
    Pokemon,
    Lorcana,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [GameKind::Magic, GameKind::Pokemon, GameKind::Lorcana];

    /// Name of the game's top-level folder
    pub fn folder(&self) -> &'static str {
        match self {
            GameKind::Magic => "Magic",
            GameKind::Pokemon => "Pokemon",
            GameKind::Lorcana => "Lorcana",
        }
    }

    /// Expertise wording for the vision system prompt
    pub fn expertise(&self) -> &'static str {
        match self {
            GameKind::Magic => "Magic: The Gathering trading card game expert",
            GameKind::Pokemon => "Pokemon trading card game expert",
            GameKind::Lorcana => "Lorcana trading card game expert",
        }
    }
}

/// Statistics accumulated over one invocation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub magic_processed: usize,
    pub pokemon_processed: usize,
    pub lorcana_processed: usize,
    pub errors: usize,
    pub fixed: usize,
}

impl RunReport {
    fn record(&mut self, game: GameKind, outcome: &FileOutcome) {
        match game {
            GameKind::Magic => self.magic_processed += 1,
            GameKind::Pokemon => self.pokemon_processed += 1,
            GameKind::Lorcana => self.lorcana_processed += 1,
        }
        if !matches!(outcome, FileOutcome::Identified(_)) {
            self.errors += 1;
        }
    }
}

/// Terminal outcome for one file in one pass
#[derive(Debug)]
pub enum FileOutcome {
    /// Renamed after the card and moved to `Processed`
    Identified(PathBuf),
    /// Moved unchanged to `Error`
    Unidentified(PathBuf),
    /// Even the fallback move failed; the file stays where it is
    FilesystemFailure,
}

/// True for files carrying an eligible image extension
pub fn is_candidate(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

fn is_reserved(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| RESERVED_DIRS.contains(&name))
            .unwrap_or(false)
}

/// Leaf directories under `root` (excluding `root` itself), with
/// `Processed`/`Error` pruned from the traversal.
fn eligible_dirs(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_reserved(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir() && e.path() != root)
        .map(|e| e.into_path())
        .collect()
}

/// Files directly inside `dir`, in enumeration order, filtered to candidates
fn candidate_files(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| is_candidate(p))
            .collect(),
        Err(e) => {
            warn!("Cannot read directory {:?}: {}", dir, e);
            Vec::new()
        }
    }
}

/// Sanitize the stems of all candidate files under `root` in place.
///
/// Files whose stem is already clean are left untouched, so the pass is
/// idempotent.
pub fn preprocess_file_names(root: &Path) -> Result<()> {
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_reserved(e));

    for entry in walker.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !is_candidate(path) {
            continue;
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let clean = sanitize(stem);
        if clean == stem {
            continue;
        }

        let extension = placer::dotted_extension(path);
        let renamed = placer::rename_in_place(path, &clean, &extension)?;
        info!("Preprocessed {:?} to {:?}", path, renamed);
    }

    Ok(())
}

/// Desired stem and extension for an identified card.
///
/// Vision identifications (series present) are normalized to
/// `"{name} - {series}"` with a `.jpg` extension; OCR identifications keep
/// the file's own extension.
fn target_name(file: &Path, card: &CardIdentity) -> (String, String) {
    match &card.series {
        Some(series) => (sanitize(&format!("{} - {}", card.name, series)), ".jpg".to_string()),
        None => (sanitize(&card.name), placer::dotted_extension(file)),
    }
}

fn route_to_error(file: &Path, error_dir: &Path) -> FileOutcome {
    match placer::move_to_dir(file, error_dir) {
        Ok(placed) => FileOutcome::Unidentified(placed),
        Err(e) => {
            error!("Could not move {:?} to {:?}: {}", file, error_dir, e);
            FileOutcome::FilesystemFailure
        }
    }
}

/// Classify one file and route it. Every failure path falls back to the
/// `Error` folder; only a failed fallback move leaves the file in place.
async fn process_one(
    file: &Path,
    adapter: &dyn RecognitionAdapter,
    processed_dir: &Path,
    error_dir: &Path,
    quiet: bool,
) -> FileOutcome {
    debug!("Processing {:?} with {} adapter", file, adapter.name());

    let card = match adapter.identify(file).await {
        Ok(Recognition::Identified(card)) => card,
        Ok(Recognition::Unidentified) => {
            warn!("Could not identify {:?}", file);
            return route_to_error(file, error_dir);
        }
        Err(e) => {
            error!("Error processing image {:?}: {}", file, e);
            return route_to_error(file, error_dir);
        }
    };

    let (stem, extension) = target_name(file, &card);

    let renamed = match placer::rename_in_place(file, &stem, &extension) {
        Ok(renamed) => renamed,
        Err(e) => {
            error!("Error renaming image {:?} to '{}{}': {}", file, stem, extension, e);
            return route_to_error(file, error_dir);
        }
    };

    if !quiet {
        println!(
            "Renamed '{}' to '{}'",
            file.file_name().unwrap_or_default().to_string_lossy(),
            renamed.file_name().unwrap_or_default().to_string_lossy()
        );
    }

    match placer::move_to_dir(&renamed, processed_dir) {
        Ok(placed) => FileOutcome::Identified(placed),
        Err(e) => {
            error!("Error moving {:?} to {:?}: {}", renamed, processed_dir, e);
            route_to_error(&renamed, error_dir)
        }
    }
}

/// Process every candidate file under a game root.
///
/// Returns `true` when no candidate file was seen at all ("no new files").
pub async fn process_game_root(
    root: &Path,
    game: GameKind,
    adapter: &dyn RecognitionAdapter,
    report: &mut RunReport,
    quiet: bool,
) -> bool {
    let mut no_new_files = true;

    for dir in eligible_dirs(root) {
        info!("Now processing {:?}", dir);
        if !quiet {
            println!("Now processing {}", dir.display());
        }

        let processed_dir = dir.join("Processed");
        let error_dir = dir.join("Error");

        for file in candidate_files(&dir) {
            no_new_files = false;
            let outcome = process_one(&file, adapter, &processed_dir, &error_dir, quiet).await;
            report.record(game, &outcome);
        }

        if !quiet {
            println!("Complete!");
        }
    }

    no_new_files
}

/// Re-run recognition over everything sitting in `Error` folders under
/// `root` (one level, non-recursive). Successes move to the sibling
/// `Processed` and count as fixed; failures stay in `Error` under their
/// current name.
pub async fn reprocess_errors(
    root: &Path,
    adapter: &dyn RecognitionAdapter,
    report: &mut RunReport,
    quiet: bool,
) {
    let error_dirs: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir() && e.file_name() == "Error")
        .map(|e| e.into_path())
        .collect();

    for error_dir in error_dirs {
        let processed_dir = error_dir
            .parent()
            .unwrap_or(root)
            .join("Processed");

        for file in candidate_files(&error_dir) {
            info!("Reprocessing {:?}", file);
            if !quiet {
                println!("Reprocessing {}", file.display());
            }

            let outcome = process_one(&file, adapter, &processed_dir, &error_dir, quiet).await;
            if let FileOutcome::Identified(_) = outcome {
                report.fixed += 1;
            }
        }
    }
}
