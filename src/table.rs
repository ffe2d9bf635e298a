use std::fmt;
use std::path::Path;

/// Raw measurement columns a blob table may carry.
pub const BLOB_MEASUREMENTS: [&str; 6] = ["vol", "interior", "area", "boundary", "step", "dist"];

/// Raw measurement columns every crossing table must carry.
pub const CROSSING_MEASUREMENTS: [&str; 3] = ["nc", "sq", "lc"];

const KEY_COLUMNS: [&str; 4] = ["n", "d", "p", "rep"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lattice {
    Square,
    Cubic,
}

impl Lattice {
    pub fn dimension(self) -> i32 {
        match self {
            Lattice::Square => 2,
            Lattice::Cubic => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Lattice::Square => "2D",
            Lattice::Cubic => "3D",
        }
    }

    /// Half the unit-cell diagonal, used to correct centre distances.
    pub fn half_diagonal(self) -> f64 {
        match self {
            Lattice::Square => 2f64.sqrt() / 2.0,
            Lattice::Cubic => 3f64.sqrt() / 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableKind {
    Blob(Lattice),
    Crossings {
        lattice: Lattice,
        straight: bool,
        complement: bool,
    },
    Projection,
    Intersection,
}

impl TableKind {
    /// File name stem, without the sample-count suffix.
    pub fn file_stem(self) -> String {
        match self {
            TableKind::Blob(lattice) => format!("blob_{}", lattice.label()),
            TableKind::Crossings {
                lattice,
                straight,
                complement,
            } => format!(
                "{}crossings{}_{}",
                if complement { "complement_" } else { "" },
                if straight { "_straight" } else { "" },
                lattice.label()
            ),
            TableKind::Projection => "projection_2D".to_string(),
            TableKind::Intersection => "intersection_2D".to_string(),
        }
    }

    pub fn file_name(self, samples: u32) -> String {
        format!("{}_{}.csv", self.file_stem(), samples)
    }

    /// Density column plotted for this kind. Only the non-straight complement
    /// dataset counts the empty part; the straight one keeps `sq / max`.
    pub fn density_column(self) -> &'static str {
        match self {
            TableKind::Crossings {
                complement: true,
                straight: false,
                ..
            } => "complement_density",
            _ => "density",
        }
    }

    pub fn check_columns(self, columns: &[String]) -> Result<(), String> {
        let has = |name: &str| columns.iter().any(|c| c == name);
        match self {
            TableKind::Blob(_) => {
                if BLOB_MEASUREMENTS.iter().any(|m| has(m)) {
                    Ok(())
                } else {
                    Err(format!(
                        "{} table needs at least one of {}",
                        self,
                        BLOB_MEASUREMENTS.join(", ")
                    ))
                }
            }
            TableKind::Crossings { .. } => {
                for m in CROSSING_MEASUREMENTS {
                    if !has(m) {
                        return Err(format!("{} table is missing column '{}'", self, m));
                    }
                }
                Ok(())
            }
            TableKind::Projection | TableKind::Intersection => {
                if columns.is_empty() {
                    Err(format!("{} table has no angle columns", self))
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Blob(lattice) => write!(f, "blob {}", lattice.label()),
            TableKind::Crossings {
                lattice,
                straight,
                complement,
            } => write!(
                f,
                "{}{}crossings {}",
                if *complement { "complement " } else { "" },
                if *straight { "straight " } else { "" },
                lattice.label()
            ),
            TableKind::Projection => write!(f, "projection 2D"),
            TableKind::Intersection => write!(f, "intersection 2D"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub n: u32,
    pub d: u32,
    pub p: f64,
    pub rep: u64,
    pub values: Vec<f64>,
}

impl Row {
    /// Lattice side length `n^d`.
    pub fn side(&self) -> f64 {
        (self.n as f64).powi(self.d as i32)
    }
}

/// In-memory table: four key fields per row plus named value columns.
/// Raw columns come first, derived columns are appended by `normalize`.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    kind: TableKind,
    columns: Vec<String>,
    raw_len: usize,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(kind: TableKind, columns: &[&str]) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let raw_len = columns.len();
        Self {
            kind,
            columns,
            raw_len,
            rows: Vec::new(),
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn raw_columns(&self) -> &[String] {
        &self.columns[..self.raw_len]
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn value(&self, row: &Row, name: &str) -> Option<f64> {
        self.column_index(name).map(|i| row.values[i])
    }

    pub fn column_values(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    pub fn push(&mut self, n: u32, d: u32, p: f64, rep: u64, values: Vec<f64>) -> Result<(), String> {
        if n == 0 {
            return Err("n must be >= 1".into());
        }
        if d == 0 {
            return Err("d must be >= 1".into());
        }
        if rep == 0 {
            return Err("rep must be >= 1".into());
        }
        if !(0.0..=1.0).contains(&p) {
            return Err(format!("p must be in [0, 1], got {}", p));
        }
        if values.len() != self.raw_len || self.columns.len() != self.raw_len {
            return Err(format!(
                "Expected {} raw values, got {}",
                self.raw_len,
                values.len()
            ));
        }
        self.rows.push(Row { n, d, p, rep, values });
        Ok(())
    }

    /// Appends a derived column; `values` is aligned with the current row order.
    pub(crate) fn append_column(&mut self, name: &str, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.rows.len());
        if let Some(idx) = self.column_index(name) {
            for (row, v) in self.rows.iter_mut().zip(values) {
                row.values[idx] = v;
            }
            return;
        }
        self.columns.push(name.to_string());
        for (row, v) in self.rows.iter_mut().zip(values) {
            row.values.push(v);
        }
    }

    /// Stable sort by `(p, d, n)`.
    pub fn sort_rows(&mut self) {
        self.rows.sort_by(|a, b| {
            a.p.total_cmp(&b.p)
                .then(a.d.cmp(&b.d))
                .then(a.n.cmp(&b.n))
        });
    }

    pub fn is_sorted(&self) -> bool {
        self.rows.windows(2).all(|w| {
            let (a, b) = (&w[0], &w[1]);
            (a.p, a.d, a.n) <= (b.p, b.d, b.n)
        })
    }

    /// Rows matching `n` and `d` exactly, in table order.
    pub fn select(&self, n: u32, d: u32) -> impl Iterator<Item = &Row> + '_ {
        self.rows.iter().filter(move |r| r.n == n && r.d == d)
    }
}

fn parse_count(raw: &str, column: &str, origin: &str) -> Result<u64, String> {
    if let Ok(v) = raw.parse::<u64>() {
        return Ok(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => Ok(v as u64),
        _ => Err(format!("Invalid {} value in {}: '{}'", column, origin, raw)),
    }
}

fn parse_measurement(raw: &str, column: &str, origin: &str) -> Result<f64, String> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>()
        .map_err(|_| format!("Invalid {} value in {}: '{}'", column, origin, raw))
}

/// Pandas writes its index as an unnamed first column.
fn is_index_column(name: &str) -> bool {
    name.is_empty() || name.starts_with("Unnamed:")
}

/// Reads a CSV table of raw observations. Key columns `n`, `d`, `p`, `rep`
/// are mandatory; every other named column is kept as a raw measurement.
pub fn load_csv(path: &Path, kind: TableKind) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;

    let headers = reader
        .headers()
        .map_err(|e| format!("Failed to read header of {}: {}", path.display(), e))?
        .clone();

    let mut key_idx = [0usize; 4];
    for (slot, name) in KEY_COLUMNS.iter().enumerate() {
        key_idx[slot] = headers
            .iter()
            .position(|h| h == *name)
            .ok_or_else(|| format!("Missing column '{}' in {}", name, path.display()))?;
    }

    let measure_idx: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !KEY_COLUMNS.contains(h) && !is_index_column(h))
        .map(|(i, h)| (i, h.to_string()))
        .collect();
    let names: Vec<String> = measure_idx.iter().map(|(_, h)| h.clone()).collect();
    kind.check_columns(&names)
        .map_err(|e| format!("{} ({})", e, path.display()))?;

    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut table = Table::new(kind, &name_refs);

    for (i, record) in reader.records().enumerate() {
        let origin = format!("{} line {}", path.display(), i + 2);
        let record = record.map_err(|e| format!("Failed to read {}: {}", origin, e))?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let n = parse_count(field(key_idx[0]), "n", &origin)?;
        let d = parse_count(field(key_idx[1]), "d", &origin)?;
        let p = field(key_idx[2])
            .parse::<f64>()
            .map_err(|_| format!("Invalid p value in {}: '{}'", origin, field(key_idx[2])))?;
        let rep = parse_count(field(key_idx[3]), "rep", &origin)?;
        let n = u32::try_from(n).map_err(|_| format!("n out of range in {}", origin))?;
        let d = u32::try_from(d).map_err(|_| format!("d out of range in {}", origin))?;

        let mut values = Vec::with_capacity(measure_idx.len());
        for (idx, name) in &measure_idx {
            values.push(parse_measurement(field(*idx), name, &origin)?);
        }

        table
            .push(n, d, p, rep, values)
            .map_err(|e| format!("{} in {}", e, origin))?;
    }

    log::debug!("{}: {} rows from {}", kind, table.len(), path.display());
    Ok(table)
}
