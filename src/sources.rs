//! The named source datasets and where to find them on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Every dataset the site knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataSource {
    WaterSystems,
    Climate,
    Vegetation,
    Disasters,
    Governance,
    KeyBuildings,
    OtherBuildings,
    Population,
    Culture,
    Commerce,
    Products,
    Transport,
    Events,
    Wars,
    People,
}

impl DataSource {
    pub const ALL: [DataSource; 15] = [
        Self::WaterSystems,
        Self::Climate,
        Self::Vegetation,
        Self::Disasters,
        Self::Governance,
        Self::KeyBuildings,
        Self::OtherBuildings,
        Self::Population,
        Self::Culture,
        Self::Commerce,
        Self::Products,
        Self::Transport,
        Self::Events,
        Self::Wars,
        Self::People,
    ];

    /// Key used in the combined output.
    pub fn key(&self) -> &'static str {
        match self {
            Self::WaterSystems => "waterSystems",
            Self::Climate => "climate",
            Self::Vegetation => "vegetation",
            Self::Disasters => "disasters",
            Self::Governance => "governance",
            Self::KeyBuildings => "keyBuildings",
            Self::OtherBuildings => "otherBuildings",
            Self::Population => "population",
            Self::Culture => "culture",
            Self::Commerce => "commerce",
            Self::Products => "products",
            Self::Transport => "transport",
            Self::Events => "events",
            Self::Wars => "wars",
            Self::People => "people",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::WaterSystems => "02水系 - 总数据和各朝代数据.json",
            Self::Climate => "03气候 - 总数据和各朝代数据.json",
            Self::Vegetation => "04植被 - 总数据和各朝代数据.json",
            Self::Disasters => "05灾害 - 总数据和各朝代数据.json",
            Self::Governance => "07建制沿革 - 总数据和各朝代数据.json",
            Self::KeyBuildings => "09重点建筑 - 总数据和各朝代数据.json",
            Self::OtherBuildings => "10其他建筑 - 总数据和各朝代数据.json",
            Self::Population => "11人口 - 总数据和各朝代数据.json",
            Self::Culture => "13文化 - 总数据和各朝代数据.json",
            // no space after the dash in the published file name
            Self::Commerce => "14商业手工业 -总数据和各朝代数据.json",
            Self::Products => "15物产 - 总数据和各朝代数据.json",
            Self::Transport => "16交通 - 总数据和各朝代数据.json",
            Self::Events => "17事件 - 总数据和各朝代数据.json",
            Self::Wars => "18战争 - 总数据和各朝代数据.json",
            Self::People => "19人物 - 总数据和各朝代数据.json",
        }
    }
}

/// Index every `.json` file under `root` by file name.
///
/// Datasets may sit in nested folders (`json/`, `assets/data/`, …); the
/// first path seen for a given name wins, and directories are visited in
/// sorted order so the choice is stable.
pub fn scan_data_dir(root: &Path) -> HashMap<String, PathBuf> {
    let mut found = HashMap::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        found
            .entry(name.to_string())
            .or_insert_with(|| path.to_path_buf());
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_and_files_unique() {
        let mut keys: Vec<_> = DataSource::ALL.iter().map(|s| s.key()).collect();
        let mut files: Vec<_> = DataSource::ALL.iter().map(|s| s.file_name()).collect();
        keys.sort();
        keys.dedup();
        files.sort();
        files.dedup();
        assert_eq!(keys.len(), DataSource::ALL.len());
        assert_eq!(files.len(), DataSource::ALL.len());
    }

    #[test]
    fn test_scan_nested_json_only() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("assets").join("data");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join(DataSource::Climate.file_name()), "[]").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::write(dir.path().join("beijing.json"), "{}").unwrap();

        let found = scan_data_dir(dir.path());
        assert_eq!(found.len(), 2);
        assert_eq!(
            found.get(DataSource::Climate.file_name()),
            Some(&nested.join(DataSource::Climate.file_name()))
        );
    }

    #[test]
    fn test_scan_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_data_dir(&dir.path().join("nope")).is_empty());
    }
}
