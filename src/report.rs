use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::PlotConfig;
use crate::figures::{self, FigureGroup};
use crate::render::render;
use crate::table::TableKind;

/// Everything one headless run produced.
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    pub groups: Vec<FigureGroup>,
    pub tables: Vec<(TableKind, usize)>,
    pub figures: Vec<PathBuf>,
}

/// Group names from the command line; none or `all` selects every group.
pub fn parse_groups<S: AsRef<str>>(args: &[S]) -> Result<Vec<FigureGroup>, String> {
    if args.is_empty() || args.iter().any(|a| a.as_ref().trim() == "all") {
        return Ok(FigureGroup::ALL.to_vec());
    }
    let mut groups = Vec::new();
    for arg in args {
        let g = FigureGroup::parse(arg.as_ref()).ok_or_else(|| {
            let known: Vec<&str> = FigureGroup::ALL.iter().map(|g| g.name()).collect();
            format!("Unknown figure group '{}' (expected one of: all, {})", arg.as_ref(), known.join(", "))
        })?;
        if !groups.contains(&g) {
            groups.push(g);
        }
    }
    Ok(groups)
}

/// Loads the tables the groups need and renders every figure.
pub fn run(groups: &[FigureGroup], config: &PlotConfig) -> Result<RunReport, Box<dyn Error>> {
    let specs: Vec<_> = groups.iter().flat_map(|&g| figures::group_figures(g)).collect();
    let tables = figures::load_tables(&figures::required_tables(&specs), config)?;

    let mut report = RunReport {
        groups: groups.to_vec(),
        tables: tables.iter().map(|(&k, t)| (k, t.len())).collect(),
        figures: Vec::with_capacity(specs.len()),
    };

    for spec in &specs {
        let figure = spec.build(&tables)?;
        let path = spec.output_path(&config.output_root);
        render(&figure, &path, config.canvas())?;
        println!("{}", path.display());
        report.figures.push(path);
    }
    Ok(report)
}

impl RunReport {
    /// Writes `summary.txt`; the header lines use the `plots.txt` keys so the
    /// file can be reused as a configuration.
    pub fn write_summary(&self, path: &Path, config: &PlotConfig) -> Result<(), Box<dyn Error>> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let mut file = File::create(path)?;
        writeln!(file, "Plot summary")?;
        writeln!(file, "Timestamp: {}", timestamp)?;
        writeln!(file)?;
        writeln!(file, "Data dir = {}", config.data_dir.display())?;
        writeln!(file, "Output root = {}", config.output_root.display())?;
        writeln!(file, "Samples = {}", config.samples)?;
        writeln!(file, "Width = {}", config.width)?;
        writeln!(file, "Height = {}", config.height)?;
        writeln!(file)?;
        let names: Vec<&str> = self.groups.iter().map(|g| g.name()).collect();
        writeln!(file, "Groups: {}", names.join(" "))?;
        writeln!(file)?;
        writeln!(file, "Tables")?;
        for (kind, rows) in &self.tables {
            writeln!(file, "{:<40} {} rows", kind.file_name(config.samples), rows)?;
        }
        writeln!(file)?;
        writeln!(file, "Figures ({})", self.figures.len())?;
        for f in &self.figures {
            writeln!(file, "{}", f.display())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::table::Lattice;

    #[test]
    fn no_arguments_selects_everything() {
        let none: [&str; 0] = [];
        assert_eq!(parse_groups(&none).unwrap().len(), FigureGroup::ALL.len());
        assert_eq!(parse_groups(&["blob2d", "all"]).unwrap().len(), FigureGroup::ALL.len());
    }

    #[test]
    fn groups_keep_order_without_duplicates() {
        let g = parse_groups(&["percolation", "blob3d", "percolation"]).unwrap();
        assert_eq!(g, vec![FigureGroup::Percolation, FigureGroup::Blob3D]);
        let err = parse_groups(&["blobs"]).unwrap_err();
        assert!(err.contains("blobs"), "{}", err);
    }

    #[test]
    fn summary_doubles_as_config() {
        let path = std::env::temp_dir().join(format!("perc_summary_{}.txt", std::process::id()));
        let config = PlotConfig {
            samples: 123,
            ..PlotConfig::default()
        };
        let report = RunReport {
            groups: vec![FigureGroup::Blob3D],
            tables: vec![(TableKind::Blob(Lattice::Cubic), 4)],
            figures: vec![PathBuf::from("imgs/blob_3D/blob_vol_3D.png")],
        };
        report.write_summary(&path, &config).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(text.contains("blob_3D_123.csv"));
        assert!(text.contains("Groups: blob3d"));
        assert!(text.contains("imgs/blob_3D/blob_vol_3D.png"));
        assert_eq!(parse_config(&text, "summary.txt").unwrap(), config);
    }
}
