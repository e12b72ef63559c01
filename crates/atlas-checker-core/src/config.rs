use std::path::PathBuf;

/// Configuration for a label checking run
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the reference catalog CSV
    pub csv_path: PathBuf,

    /// Number of threads to use for directory processing (0 = auto)
    pub threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("./atlases/atlas_v3/atlas_info.csv"),
            threads: 0, // Auto
        }
    }
}
