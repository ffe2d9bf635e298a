//! The fixed set of figures, grouped by subject.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::angles::{AngleColumns, AngleMode};
use crate::config::PlotConfig;
use crate::normalize::normalize;
use crate::render::{Figure, LegendPlacement};
use crate::series::{self, Series, Shade};
use crate::table::{load_csv, Lattice, Table, TableKind};
use crate::theory;

pub type Tables = BTreeMap<TableKind, Table>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FigureGroup {
    Blob2D,
    Blob3D,
    Crossing2D,
    Crossing3D,
    Percolation,
    Projection2D,
    Intersection2D,
}

impl FigureGroup {
    pub const ALL: [FigureGroup; 7] = [
        FigureGroup::Blob2D,
        FigureGroup::Blob3D,
        FigureGroup::Crossing2D,
        FigureGroup::Crossing3D,
        FigureGroup::Percolation,
        FigureGroup::Projection2D,
        FigureGroup::Intersection2D,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FigureGroup::Blob2D => "blob2d",
            FigureGroup::Blob3D => "blob3d",
            FigureGroup::Crossing2D => "crossing2d",
            FigureGroup::Crossing3D => "crossing3d",
            FigureGroup::Percolation => "percolation",
            FigureGroup::Projection2D => "projection2d",
            FigureGroup::Intersection2D => "intersection2d",
        }
    }

    /// Output subdirectory under the output root.
    pub fn dir(self) -> &'static str {
        match self {
            FigureGroup::Blob2D => "blob_2D",
            FigureGroup::Blob3D => "blob_3D",
            FigureGroup::Crossing2D => "crossing_2D",
            FigureGroup::Crossing3D => "crossing_3D",
            FigureGroup::Percolation => "percolation",
            FigureGroup::Projection2D => "projection_2D",
            FigureGroup::Intersection2D => "intersection_2D",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|g| g.name() == s)
    }
}

impl fmt::Display for FigureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Table column a data figure plots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    Named(&'static str),
    /// First of these the table has. Blob datasets come with either
    /// `vol`/`area` or `interior`/`boundary`.
    FirstOf(&'static [&'static str]),
}

impl Column {
    pub fn resolve(self, table: &Table) -> Result<&'static str, String> {
        match self {
            Column::Named(name) => Ok(name),
            Column::FirstOf(names) => names
                .iter()
                .copied()
                .find(|n| table.has_column(n))
                .ok_or_else(|| {
                    format!("None of {} found in {} table", names.join(", "), table.kind())
                }),
        }
    }
}

impl From<&'static str> for Column {
    fn from(name: &'static str) -> Self {
        Column::Named(name)
    }
}

const BLOB_VOLUME: Column = Column::FirstOf(&["rel_avg_vol", "rel_avg_interior"]);
const BLOB_SURFACE: Column = Column::FirstOf(&["rel_avg_area", "rel_avg_boundary"]);
const BLOB_BOUNDARY: Column = Column::FirstOf(&["rel_avg_boundary", "rel_avg_area"]);

#[derive(Clone, Debug, PartialEq)]
pub enum Lines {
    /// `(n, max_d, shade)`: one line per depth.
    DepthSweeps {
        column: Column,
        sweeps: Vec<(u32, u32, Shade)>,
    },
    AritySweep {
        column: Column,
        ns: Vec<u32>,
        d: u32,
    },
    /// `(n, d, shade)`: one line each.
    Singles {
        column: Column,
        lines: Vec<(u32, u32, Shade)>,
    },
    Angles {
        n: u32,
        d: u32,
        angles: Vec<u32>,
        mode: AngleMode,
    },
    TheoryDepthSweeps(Vec<(u32, u32, Shade)>),
    TheoryAritySweep {
        ns: Vec<u32>,
        d: u32,
    },
    ExpectedDensity(Vec<u32>),
    ExpectedDimension {
        dimension: u32,
        ns: Vec<u32>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct FigureSpec {
    pub group: FigureGroup,
    pub file_name: String,
    pub source: Option<TableKind>,
    pub lines: Lines,
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub y_range: Option<(f64, f64)>,
    pub legend: LegendPlacement,
}

fn figure(group: FigureGroup, file_name: &str, title: &str, y_desc: &str, lines: Lines) -> FigureSpec {
    FigureSpec {
        group,
        file_name: format!("{}.png", file_name),
        source: None,
        lines,
        title: title.to_string(),
        x_desc: "p".to_string(),
        y_desc: y_desc.to_string(),
        y_range: None,
        legend: LegendPlacement::Outside,
    }
}

impl FigureSpec {
    fn with_source(mut self, kind: TableKind) -> Self {
        self.source = Some(kind);
        self
    }

    fn with_y_range(mut self, lo: f64, hi: f64) -> Self {
        self.y_range = Some((lo, hi));
        self
    }

    fn with_x_desc(mut self, desc: &str) -> Self {
        self.x_desc = desc.to_string();
        self
    }

    fn with_legend_inside(mut self) -> Self {
        self.legend = LegendPlacement::Inside;
        self
    }

    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(self.group.dir()).join(&self.file_name)
    }

    /// Builds the drawable figure from already normalized tables.
    pub fn build(&self, tables: &Tables) -> Result<Figure, String> {
        let table = || -> Result<&Table, String> {
            let kind = self
                .source
                .ok_or_else(|| format!("{} has no source table", self.file_name))?;
            tables
                .get(&kind)
                .ok_or_else(|| format!("{} table not loaded for {}", kind, self.file_name))
        };

        let series: Vec<Series> = match &self.lines {
            Lines::DepthSweeps { column, sweeps } => {
                let t = table()?;
                let column = column.resolve(t)?;
                let mut out = Vec::new();
                for &(n, max_d, shade) in sweeps {
                    out.extend(series::depth_sweep(t, column, n, max_d, shade)?);
                }
                out
            }
            Lines::AritySweep { column, ns, d } => {
                let t = table()?;
                series::arity_sweep(t, column.resolve(t)?, ns, *d)?
            }
            Lines::Singles { column, lines } => {
                let t = table()?;
                let column = column.resolve(t)?;
                lines
                    .iter()
                    .map(|&(n, d, shade)| series::single(t, column, n, d, shade))
                    .collect::<Result<_, _>>()?
            }
            Lines::Angles {
                n,
                d,
                angles,
                mode,
            } => {
                let t = table()?;
                let buckets = AngleColumns::from_table(t)?;
                series::angle_sweep(t, &buckets, *n, *d, angles, *mode)?
            }
            Lines::TheoryDepthSweeps(sweeps) => sweeps
                .iter()
                .flat_map(|&(n, max_d, shade)| theory::crossing_depth_sweep(n, max_d, shade))
                .collect(),
            Lines::TheoryAritySweep { ns, d } => theory::crossing_arity_sweep(ns, *d),
            Lines::ExpectedDensity(depths) => theory::density_curves(depths),
            Lines::ExpectedDimension { dimension, ns } => theory::dimension_curves(*dimension, ns),
        };

        Ok(Figure {
            title: self.title.clone(),
            x_desc: self.x_desc.clone(),
            y_desc: self.y_desc.clone(),
            x_range: (0.0, 1.0),
            y_range: self.y_range,
            legend: self.legend,
            series,
        })
    }
}

pub fn required_tables(specs: &[FigureSpec]) -> BTreeSet<TableKind> {
    specs.iter().filter_map(|s| s.source).collect()
}

/// Loads and normalizes each table once.
pub fn load_tables(kinds: &BTreeSet<TableKind>, config: &PlotConfig) -> Result<Tables, String> {
    let mut tables = Tables::new();
    for &kind in kinds {
        tables.insert(kind, load_table(kind, config)?);
    }
    Ok(tables)
}

pub fn load_table(kind: TableKind, config: &PlotConfig) -> Result<Table, String> {
    let path = config.table_path(kind);
    let raw = load_csv(&path, kind)?;
    let table = normalize(&raw);
    log::info!("loaded {} ({} rows) from {}", kind, table.len(), path.display());
    Ok(table)
}

pub fn catalogue() -> Vec<FigureSpec> {
    FigureGroup::ALL.into_iter().flat_map(group_figures).collect()
}

pub fn group_figures(group: FigureGroup) -> Vec<FigureSpec> {
    match group {
        FigureGroup::Blob2D => blob_2d(),
        FigureGroup::Blob3D => blob_3d(),
        FigureGroup::Crossing2D => crossing_2d(),
        FigureGroup::Crossing3D => crossing_3d(),
        FigureGroup::Percolation => percolation(),
        FigureGroup::Projection2D => angle_figures(FigureGroup::Projection2D),
        FigureGroup::Intersection2D => angle_figures(FigureGroup::Intersection2D),
    }
}

// ── parameter lists ──────────────────────────

const CYAN: Shade = (0.0, 1.0, 1.0);
const MAGENTA: Shade = (1.0, 0.0, 1.0);
const YELLOW: Shade = (1.0, 1.0, 0.0);
const RED: Shade = (1.0, 0.0, 0.0);
const GREEN: Shade = (0.0, 1.0, 0.0);
const BLUE: Shade = (0.0, 0.0, 1.0);
const GREY: Shade = (1.0, 1.0, 1.0);

const ARITIES_2D: [u32; 16] = [2, 3, 5, 7, 11, 13, 17, 20, 25, 50, 75, 100, 125, 150, 175, 200];
const ODD_ARITIES_2D: [u32; 14] = [3, 5, 7, 11, 13, 17, 25, 51, 75, 101, 125, 151, 175, 201];
const ODD_ARITIES_3D: [u32; 7] = [3, 5, 7, 9, 11, 13, 15];

fn deep_sweeps() -> Vec<(u32, u32, Shade)> {
    vec![(2, 8, CYAN), (3, 5, MAGENTA), (5, 3, YELLOW)]
}

fn two_level_sweeps() -> Vec<(u32, u32, Shade)> {
    vec![
        (2, 2, CYAN),
        (3, 2, MAGENTA),
        (5, 2, YELLOW),
        (7, 2, RED),
        (11, 2, GREEN),
        (13, 2, BLUE),
        (17, 2, GREY),
    ]
}

const BLOB_2D: TableKind = TableKind::Blob(Lattice::Square);
const BLOB_3D: TableKind = TableKind::Blob(Lattice::Cubic);

fn sweeps(column: impl Into<Column>, sweeps: Vec<(u32, u32, Shade)>) -> Lines {
    Lines::DepthSweeps {
        column: column.into(),
        sweeps,
    }
}

fn arities(column: impl Into<Column>, ns: &[u32], d: u32) -> Lines {
    Lines::AritySweep {
        column: column.into(),
        ns: ns.to_vec(),
        d,
    }
}

fn blob_2d() -> Vec<FigureSpec> {
    let g = FigureGroup::Blob2D;
    let area = |name: &str, lines: Lines| {
        figure(g, name, "Area of the boundary of the blob", "Average boundary of the blob area", lines)
            .with_source(BLOB_2D)
            .with_y_range(0.0, 120.0)
    };
    let step = |name: &str, lines: Lines| {
        figure(
            g,
            name,
            "Maximum step distance to the center of the blob",
            "Average maximum step distance to the center",
            lines,
        )
        .with_source(BLOB_2D)
    };
    let dist = |name: &str, lines: Lines| {
        figure(
            g,
            name,
            "Maximum distance to the center of the blob",
            "Average maximum distance to the center",
            lines,
        )
        .with_source(BLOB_2D)
    };
    let vol = |name: &str, lines: Lines| {
        figure(g, name, "Area of the blob", "Average blob area", lines)
            .with_source(BLOB_2D)
            .with_y_range(0.0, 1.0)
    };

    let area_bis = vec![
        (3, 2, MAGENTA),
        (5, 2, YELLOW),
        (7, 2, RED),
        (11, 2, GREEN),
        (13, 2, BLUE),
        (17, 2, GREY),
    ];
    // n^2 against (n*n)^1: same side length, one subdivision level less.
    let flattened = vec![
        (5, 2, (0.0, 0.5, 0.5)),
        (25, 1, (0.0, 1.0, 1.0)),
        (7, 2, (0.0, 0.0, 0.5)),
        (49, 1, (0.0, 0.0, 1.0)),
        (11, 2, (0.0, 0.5, 0.0)),
        (121, 1, (0.0, 1.0, 0.0)),
        (13, 2, (0.5, 0.0, 0.0)),
        (169, 1, (1.0, 0.0, 0.0)),
        (17, 2, (0.4, 0.4, 0.4)),
        (289, 1, (0.8, 0.8, 0.8)),
    ];

    vec![
        area("blob_area_2D", sweeps(BLOB_SURFACE, vec![(3, 5, MAGENTA), (5, 2, YELLOW)])),
        area("blob_area_2D_bis", sweeps(BLOB_SURFACE, area_bis.clone())),
        area("blob_area_2D_ter", arities(BLOB_SURFACE, &ODD_ARITIES_2D, 1)),
        step("blob_step_2D", sweeps("rel_avg_step", deep_sweeps())),
        step("blob_step_2D_bis", sweeps("rel_avg_step", two_level_sweeps())),
        step("blob_step_2D_ter", arities("rel_avg_step", &ARITIES_2D, 1)),
        dist("blob_dist_2D", sweeps("rel_avg_dist", deep_sweeps())),
        dist("blob_dist_2D_bis", sweeps("rel_avg_dist", two_level_sweeps())),
        dist("blob_dist_2D_ter", arities("rel_avg_dist", &ARITIES_2D, 1)),
        vol("blob_vol_2D", sweeps(BLOB_VOLUME, vec![(3, 5, MAGENTA), (5, 2, YELLOW)])),
        vol("blob_vol_2D_bis", sweeps(BLOB_VOLUME, area_bis)),
        vol("blob_vol_2D_ter", arities(BLOB_VOLUME, &ODD_ARITIES_2D, 1)),
        vol(
            "blob_vol_2D_qua",
            Lines::Singles {
                column: BLOB_VOLUME,
                lines: flattened,
            },
        ),
    ]
}

fn blob_3d() -> Vec<FigureSpec> {
    let g = FigureGroup::Blob3D;
    let fig = |name: &str, title: &str, y_desc: &str, lines: Lines| {
        figure(g, name, title, y_desc, lines).with_source(BLOB_3D)
    };
    let base = || vec![(3, 3, MAGENTA), (5, 2, YELLOW)];
    let area_title = "Area of the boundary of the blob";
    let area_y = "Average boundary of the blob area";
    let step_title = "Maximum step distance to the center of the blob";
    let step_y = "Average maximum step distance to the center";
    let dist_title = "Maximum distance to the center of the blob";
    let dist_y = "Average maximum distance to the center";
    let boundary_title = "Boundary of the blob";
    let boundary_y = "Average blob boundary area";

    vec![
        fig("blob_area_3D", area_title, area_y, sweeps(BLOB_SURFACE, base())).with_y_range(0.0, 90.0),
        fig("blob_area_3D_bis", area_title, area_y, arities(BLOB_SURFACE, &ODD_ARITIES_3D, 1))
            .with_y_range(0.0, 90.0),
        fig("blob_step_3D", step_title, step_y, sweeps("rel_avg_step", base())),
        fig("blob_step_3D_bis", step_title, step_y, arities("rel_avg_step", &ODD_ARITIES_3D, 1)),
        fig("blob_dist_3D", dist_title, dist_y, sweeps("rel_avg_dist", base())),
        fig("blob_dist_3D_bis", dist_title, dist_y, arities("rel_avg_dist", &ODD_ARITIES_3D, 1)),
        fig("blob_vol_3D", "Volume of the blob", "Average blob volume", sweeps(BLOB_VOLUME, base()))
            .with_y_range(0.0, 1.0),
        fig(
            "blob_vol_3D_bis",
            "Volume of the blob",
            "Average blob volume",
            arities(BLOB_VOLUME, &ODD_ARITIES_3D, 1),
        )
        .with_y_range(0.0, 1.0),
        fig(
            "blob_boundary_3D",
            boundary_title,
            boundary_y,
            sweeps(BLOB_BOUNDARY, vec![(3, 2, MAGENTA), (5, 1, YELLOW)]),
        ),
        fig(
            "blob_boundary_3D_bis",
            boundary_title,
            boundary_y,
            arities(BLOB_BOUNDARY, &ODD_ARITIES_3D, 1),
        ),
    ]
}

fn crossing_2d() -> Vec<FigureSpec> {
    let g = FigureGroup::Crossing2D;
    let complement = TableKind::Crossings {
        lattice: Lattice::Square,
        straight: false,
        complement: true,
    };
    let straight = TableKind::Crossings {
        lattice: Lattice::Square,
        straight: true,
        complement: false,
    };
    let plain = TableKind::Crossings {
        lattice: Lattice::Square,
        straight: false,
        complement: false,
    };

    let proba = |name: &str, lines: Lines| {
        figure(
            g,
            name,
            "Empirical Non-Straight Crossing Probability",
            "Non-straight crossing probability",
            lines,
        )
        .with_source(complement)
    };
    let length = |name: &str, lines: Lines| {
        figure(
            g,
            name,
            "Length of straight crossing (when existing)",
            "Average length of straight crossings",
            lines,
        )
        .with_source(straight)
        .with_x_desc("Percolation probability")
        .with_y_range(0.9, 2.25)
    };
    let theoretical = |name: &str, lines: Lines| {
        figure(
            g,
            name,
            "Theoretical Straight Crossing Probability",
            "Straight Crossing Probability",
            lines,
        )
    };
    let proba_bis = vec![
        (2, 2, YELLOW),
        (3, 2, MAGENTA),
        (5, 2, CYAN),
        (7, 2, YELLOW),
        (11, 2, MAGENTA),
        (13, 2, CYAN),
        (17, 2, GREY),
    ];
    let theory_bis = vec![
        (2, 2, YELLOW),
        (3, 2, MAGENTA),
        (5, 2, CYAN),
        (7, 2, BLUE),
        (11, 2, GREEN),
        (13, 2, RED),
        (17, 2, GREY),
    ];
    let mut steps = deep_sweeps();
    steps.extend([(7, 2, YELLOW), (11, 2, MAGENTA), (13, 2, CYAN), (17, 2, GREY)]);

    vec![
        proba("complement_crossing_proba_2D", sweeps("cp", deep_sweeps())),
        proba("complement_crossing_proba_2D_bis", sweeps("cp", proba_bis)),
        proba("complement_crossing_proba_2D_ter", arities("cp", &ARITIES_2D, 1)),
        length("straight_crossing_length_2D", sweeps("ral", deep_sweeps())),
        length("straight_crossing_length_2D_bis", sweeps("ral", two_level_sweeps())),
        length("straight_crossing_length_2D_ter", arities("ral", &ARITIES_2D, 1)),
        theoretical(
            "theoretical_straight_crossing_proba_2D",
            Lines::TheoryDepthSweeps(vec![(2, 2, CYAN), (3, 2, MAGENTA), (5, 2, YELLOW)]),
        ),
        theoretical(
            "theoretical_straight_crossing_proba_2D_bis",
            Lines::TheoryDepthSweeps(theory_bis),
        ),
        theoretical(
            "theoretical_straight_crossing_proba_2D_ter",
            Lines::TheoryAritySweep {
                ns: ARITIES_2D.to_vec(),
                d: 1,
            },
        ),
        figure(
            g,
            "crossing_steps_2D",
            "Non-Straight Crossing steps (when existing)",
            "Average steps of crossings",
            sweeps("al", steps),
        )
        .with_source(plain)
        .with_legend_inside(),
        figure(
            g,
            "density_2D",
            "Density",
            "Average Density of Squares",
            sweeps(plain.density_column(), vec![(2, 8, RED), (3, 5, GREEN), (5, 3, BLUE)]),
        )
        .with_source(plain)
        .with_legend_inside(),
    ]
}

fn crossing_3d() -> Vec<FigureSpec> {
    let g = FigureGroup::Crossing3D;
    let complement_straight = TableKind::Crossings {
        lattice: Lattice::Cubic,
        straight: true,
        complement: true,
    };
    let plain = TableKind::Crossings {
        lattice: Lattice::Cubic,
        straight: false,
        complement: false,
    };
    let length = |name: &str, lines: Lines| {
        figure(
            g,
            name,
            "Length of straight crossing (when existing)",
            "Average length of straight crossings",
            lines,
        )
        .with_source(complement_straight)
        .with_x_desc("Percolation probability")
        .with_y_range(0.9, 2.5)
    };
    let singles: Vec<(u32, u32, Shade)> = vec![
        (2, 1, CYAN),
        (3, 1, MAGENTA),
        (5, 1, YELLOW),
        (6, 1, RED),
        (7, 1, GREEN),
        (8, 1, BLUE),
        (9, 1, GREY),
        (10, 1, CYAN),
        (11, 1, MAGENTA),
        (12, 1, YELLOW),
        (13, 1, RED),
        (14, 1, GREEN),
        (15, 1, BLUE),
        (20, 1, GREY),
        (25, 1, (0.5, 0.5, 0.5)),
    ];

    vec![
        length(
            "complement_straight_crossing_length_3D",
            sweeps("ral", vec![(2, 4, CYAN), (3, 2, MAGENTA), (5, 1, YELLOW)]),
        ),
        length("complement_straight_crossing_length_3D_bis", sweeps("ral", singles))
            .with_legend_inside(),
        figure(
            g,
            "density_3D",
            "Density",
            "Average Density of Cubes",
            sweeps(
                plain.density_column(),
                vec![
                    (2, 4, CYAN),
                    (3, 2, MAGENTA),
                    (5, 1, YELLOW),
                    (6, 1, RED),
                    (7, 1, GREEN),
                    (8, 1, BLUE),
                    (9, 1, GREY),
                ],
            ),
        )
        .with_source(plain)
        .with_legend_inside(),
    ]
}

fn percolation() -> Vec<FigureSpec> {
    let g = FigureGroup::Percolation;
    let depths = vec![0, 1, 2, 3, 4, 5, 10, 20, 50, 100];
    let arities = vec![2, 3, 5, 6, 7, 8, 9, 10, 20, 50];
    let mut out = Vec::new();
    for dimension in 1..=5u32 {
        out.push(figure(
            g,
            &format!("density_{}D", dimension),
            "Density of the percolation",
            "Expected density",
            Lines::ExpectedDensity(depths.clone()),
        ));
    }
    for dimension in 1..=5u32 {
        out.push(figure(
            g,
            &format!("dimension_{}D", dimension),
            "Dimension of the percolation",
            "Expected dimension",
            Lines::ExpectedDimension {
                dimension,
                ns: arities.clone(),
            },
        ));
    }
    out
}

/// `(n, d)` pairs with a projection/intersection figure.
#[rustfmt::skip]
pub const ANGLE_PAIRS: [(u32, u32); 33] = [
    (2, 1), (2, 2), (2, 3), (2, 4), (2, 5), (2, 6), (2, 7), (2, 8),
    (3, 1), (3, 2), (3, 3), (3, 4), (3, 5),
    (5, 1), (5, 2), (5, 3),
    (7, 1), (7, 2),
    (11, 1), (11, 2),
    (13, 1), (13, 2),
    (17, 1), (17, 2),
    (20, 1), (25, 1), (50, 1), (75, 1), (100, 1), (125, 1), (150, 1), (175, 1), (200, 1),
];

pub fn plotted_angles() -> Vec<u32> {
    (0..=44).step_by(4).collect()
}

fn angle_figures(group: FigureGroup) -> Vec<FigureSpec> {
    let (kind, subject, stem) = match group {
        FigureGroup::Intersection2D => (TableKind::Intersection, "Intersection", "intersection_2D"),
        _ => (TableKind::Projection, "Projection", "projection_2D"),
    };
    let mut out = Vec::new();
    for &(n, d) in ANGLE_PAIRS.iter() {
        let pair = series::series_label(n, d);
        let absolute = figure(
            group,
            &format!("{}_{}", stem, pair),
            &format!("{} Length ({})", subject, pair),
            &format!("Average {} Length", subject),
            Lines::Angles {
                n,
                d,
                angles: plotted_angles(),
                mode: AngleMode::Absolute,
            },
        )
        .with_source(kind)
        .with_legend_inside();

        let mut relative = figure(
            group,
            &format!("relative_{}_{}", stem, pair),
            &format!("Relative {} Length ({})", subject, pair),
            &format!("Average Relative {} Length", subject),
            Lines::Angles {
                n,
                d,
                angles: plotted_angles(),
                mode: AngleMode::Relative,
            },
        )
        .with_source(kind);
        if kind == TableKind::Intersection {
            relative = relative.with_y_range(0.0, 1.0);
        }
        out.push(absolute);
        out.push(relative);
    }
    out
}
