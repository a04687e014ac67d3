//! Data-directory layout: one sub-directory per roast profile holding a
//! `Plan/` folder and a folder of roast logs (`Wypaly/`, or `Wypały/`).

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ParseError;

pub const PLAN_DIR: &str = "Plan";
/// Roast-log folder names, tried in order.
pub const ROAST_DIRS: [&str; 2] = ["Wypaly", "Wypały"];

/// Files belonging to one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFiles {
    pub name: String,
    /// First plan file in name order.
    pub plan: Option<PathBuf>,
    /// Roast logs sorted by name.
    pub roasts: Vec<PathBuf>,
}

fn unreadable(path: &Path, e: &std::io::Error) -> ParseError {
    ParseError::Unreadable(format!("{}: {e}", path.display()))
}

/// Sorted names of the sub-directories of `base`.
pub fn list_profiles(base: &Path) -> Result<Vec<String>, ParseError> {
    let entries = fs::read_dir(base).map_err(|e| unreadable(base, &e))?;
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}

/// `.csv` files directly inside `dir`, sorted. A missing directory is empty.
fn csv_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    files
}

/// Locate the plan and roast logs of profile `name` under `base`.
///
/// Fails only when the profile directory itself cannot be read; missing
/// sub-folders yield no plan or no roasts.
pub fn discover_profile(base: &Path, name: &str) -> Result<ProfileFiles, ParseError> {
    let root = base.join(name);
    fs::read_dir(&root).map_err(|e| unreadable(&root, &e))?;

    let plan = csv_files(&root.join(PLAN_DIR)).into_iter().next();
    let roasts = ROAST_DIRS
        .iter()
        .map(|d| root.join(d))
        .find(|d| d.is_dir())
        .map(|d| csv_files(&d))
        .unwrap_or_default();
    tracing::debug!(profile = name, plan = ?plan, roasts = roasts.len(), "profile discovered");
    Ok(ProfileFiles {
        name: name.to_string(),
        plan,
        roasts,
    })
}
