use std::fs;
use std::path::{Path, PathBuf};

use crate::table::TableKind;

pub const CONFIG_FILE: &str = "plots.txt";

#[derive(Clone, Debug, PartialEq)]
pub struct PlotConfig {
    pub data_dir: PathBuf,
    pub output_root: PathBuf,
    /// Repetition suffix of the dataset file names, e.g. `blob_2D_50000.csv`.
    pub samples: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_root: PathBuf::from("imgs"),
            samples: 50_000,
            width: 1260,
            height: 720,
        }
    }
}

impl PlotConfig {
    pub fn table_path(&self, kind: TableKind) -> PathBuf {
        self.data_dir.join(kind.file_name(self.samples))
    }

    pub fn canvas(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set(&mut self, key: &str, val_str: &str, origin: &str) -> Result<bool, String> {
        let positive = |v: &str| -> Result<u32, String> {
            match v.parse::<u32>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(format!("Invalid {} value in {}: '{}'", key, origin, v)),
            }
        };
        match key {
            "Data dir" => self.data_dir = PathBuf::from(val_str),
            "Output root" => self.output_root = PathBuf::from(val_str),
            "Samples" => self.samples = positive(val_str)?,
            "Width" => self.width = positive(val_str)?,
            "Height" => self.height = positive(val_str)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Parses `key = value` lines over the defaults. Unknown keys are ignored.
pub fn parse_config(contents: &str, origin: &str) -> Result<PlotConfig, String> {
    let mut config = PlotConfig::default();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let val_str = line[eq_pos + 1..].trim();
            if val_str.is_empty() {
                return Err(format!("Missing {} value in {}", key, origin));
            }
            if !config.set(key, val_str, origin)? {
                log::debug!("ignoring unknown key '{}' in {}", key, origin);
            }
        }
    }
    Ok(config)
}

/// Reads the config file; a missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<PlotConfig, String> {
    if !path.exists() {
        return Ok(PlotConfig::default());
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    parse_config(&contents, &path.display().to_string())
}

const ENV_KEYS: [(&str, &str); 5] = [
    ("PERC_DATA_DIR", "Data dir"),
    ("PERC_OUTPUT_ROOT", "Output root"),
    ("PERC_SAMPLES", "Samples"),
    ("PERC_WIDTH", "Width"),
    ("PERC_HEIGHT", "Height"),
];

/// Environment values take precedence over the file.
pub fn apply_env(
    config: &mut PlotConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), String> {
    for (var, key) in ENV_KEYS {
        if let Some(val) = lookup(var) {
            let val = val.trim().to_string();
            if !val.is_empty() {
                config.set(key, &val, var)?;
            }
        }
    }
    Ok(())
}

/// `plots.txt` in the working directory, then `PERC_*` overrides.
pub fn from_environment() -> Result<PlotConfig, String> {
    let mut config = load_config(Path::new(CONFIG_FILE))?;
    apply_env(&mut config, |k| std::env::var(k).ok())?;
    Ok(config)
}
