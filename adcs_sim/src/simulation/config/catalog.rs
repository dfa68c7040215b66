// adcs_sim/src/simulation/config/catalog.rs

//! Discovery of scenario files on disk.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

/// Where the bundled scenarios live, relative to the crate root.
pub const DEFAULT_SCENARIO_DIR: &str = "assets/scenarios";

/// Walks `dir` and returns every `.toml` file below it, sorted by path.
pub fn list_scenarios(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!(
            "Scenario directory not found at {:?}, no scenarios will be listed.",
            dir
        );
        return Vec::new();
    }

    let mut scenarios: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| {
            !e.file_type().is_dir() && e.path().extension().map_or(false, |ext| ext == "toml")
        })
        .map(|e| e.into_path())
        .collect();
    scenarios.sort();

    info!("Found {} scenario(s) under {:?}", scenarios.len(), dir);
    scenarios
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_scenarios_are_found() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_SCENARIO_DIR);
        let names: Vec<String> = list_scenarios(&dir)
            .iter()
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();

        for expected in ["bdot_detumble", "free_rotation", "hardware_loop", "torque_scenario"] {
            assert!(names.iter().any(|n| n == expected), "missing {}", expected);
        }
    }

    #[test]
    fn missing_directory_lists_nothing() {
        assert!(list_scenarios(Path::new("no/such/dir")).is_empty());
    }
}
