use plotters::style::RGBColor;

use crate::angles::{AngleColumns, AngleMode};
use crate::table::Table;

/// Per-channel weights; a line's colour is `1 - weight * t` for a fraction `t`.
pub type Shade = (f64, f64, f64);

#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub label: String,
    /// `None` takes the next colour of the default palette.
    pub color: Option<RGBColor>,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub fn series_label(n: u32, d: u32) -> String {
    format!("n^d={}^{}", n, d)
}

fn channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Colour for a line at fraction `t` of a sweep.
pub fn shade_color(shade: Shade, t: f64) -> RGBColor {
    let (r, g, b) = shade;
    RGBColor(
        channel(1.0 - r * t),
        channel(1.0 - g * t),
        channel(1.0 - b * t),
    )
}

/// `(p, column)` points of the rows matching `(n, d)`; rows whose value is
/// not finite are skipped. Unknown columns are configuration errors.
pub fn select_points(table: &Table, column: &str, n: u32, d: u32) -> Result<Vec<(f64, f64)>, String> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| format!("Column '{}' not found in {} table", column, table.kind()))?;
    let points: Vec<(f64, f64)> = table
        .select(n, d)
        .map(|r| (r.p, r.values[idx]))
        .filter(|(_, v)| v.is_finite())
        .collect();
    if points.is_empty() {
        log::warn!("{}: no finite '{}' values for n={}, d={}", table.kind(), column, n, d);
    } else {
        log::debug!("{}: {} points of '{}' for n={}, d={}", table.kind(), points.len(), column, n, d);
    }
    Ok(points)
}

pub fn line(
    table: &Table,
    column: &str,
    n: u32,
    d: u32,
    color: Option<RGBColor>,
) -> Result<Series, String> {
    Ok(Series {
        label: series_label(n, d),
        color,
        points: select_points(table, column, n, d)?,
    })
}

/// One line per depth `1..=max_d` at fixed arity, shaded from light to dark.
pub fn depth_sweep(
    table: &Table,
    column: &str,
    n: u32,
    max_d: u32,
    shade: Shade,
) -> Result<Vec<Series>, String> {
    (1..=max_d)
        .map(|d| {
            let color = shade_color(shade, d as f64 / max_d as f64);
            line(table, column, n, d, Some(color))
        })
        .collect()
}

/// One line per arity at fixed depth, default palette.
pub fn arity_sweep(table: &Table, column: &str, ns: &[u32], d: u32) -> Result<Vec<Series>, String> {
    ns.iter().map(|&n| line(table, column, n, d, None)).collect()
}

/// A single `(n, d)` line with the full shade applied.
pub fn single(table: &Table, column: &str, n: u32, d: u32, shade: Shade) -> Result<Series, String> {
    line(table, column, n, d, Some(shade_color(shade, 1.0)))
}

/// One line per angle for a fixed `(n, d)`.
pub fn angle_sweep(
    table: &Table,
    buckets: &AngleColumns,
    n: u32,
    d: u32,
    angles: &[u32],
    mode: AngleMode,
) -> Result<Vec<Series>, String> {
    angles
        .iter()
        .map(|&a| {
            let column = buckets
                .column(a)
                .ok_or_else(|| format!("No column for angle {} in {} table", a, table.kind()))?;
            let points = select_points(table, column, n, d)?
                .into_iter()
                .map(|(p, v)| (p, mode.apply(v, a)))
                .filter(|(_, v)| v.is_finite())
                .collect();
            Ok(Series {
                label: format!("a={}", a),
                color: None,
                points,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::table::{Lattice, TableKind};

    fn blob_table() -> Table {
        let mut raw = Table::new(TableKind::Blob(Lattice::Square), &["area"]);
        raw.push(3, 1, 0.5, 10, vec![30.0]).unwrap();
        raw.push(3, 1, 0.1, 10, vec![10.0]).unwrap();
        raw.push(3, 2, 0.1, 10, vec![90.0]).unwrap();
        raw.push(5, 1, 0.1, 10, vec![f64::NAN]).unwrap();
        normalize(&raw)
    }

    #[test]
    fn missing_pair_gives_empty_series() {
        let t = blob_table();
        let s = line(&t, "rel_avg_area", 7, 3, None).unwrap();
        assert!(s.is_empty());
        assert_eq!(s.label, "n^d=7^3");
    }

    #[test]
    fn unknown_column_is_an_error() {
        let t = blob_table();
        assert!(line(&t, "rel_avg_vol", 3, 1, None).is_err());
    }

    #[test]
    fn points_follow_p_order_and_skip_nan() {
        let t = blob_table();
        let pts = select_points(&t, "avg_area", 3, 1).unwrap();
        assert_eq!(pts, vec![(0.1, 1.0), (0.5, 3.0)]);
        assert!(select_points(&t, "avg_area", 5, 1).unwrap().is_empty());
    }

    #[test]
    fn depth_sweep_darkens_with_depth() {
        let t = blob_table();
        let lines = depth_sweep(&t, "rel_avg_area", 3, 2, (1.0, 0.0, 1.0)).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].color, Some(RGBColor(128, 255, 128)));
        assert_eq!(lines[1].color, Some(RGBColor(0, 255, 0)));
        assert_eq!(lines[1].points, vec![(0.1, 1.0)]);
    }

    #[test]
    fn arity_sweep_uses_palette() {
        let t = blob_table();
        let lines = arity_sweep(&t, "rel_avg_area", &[3, 5, 7], 1).unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|s| s.color.is_none()));
        assert_eq!(lines[0].points.len(), 2);
        assert!(lines[1].is_empty());
        assert!(lines[2].is_empty());
    }

    #[test]
    fn single_line_uses_inverted_shade() {
        let t = blob_table();
        let s = single(&t, "rel_avg_area", 3, 2, (0.0, 0.5, 0.5)).unwrap();
        assert_eq!(s.color, Some(RGBColor(255, 128, 128)));
    }

    #[test]
    fn angle_sweep_reads_mapped_columns() {
        let mut raw = Table::new(TableKind::Projection, &["0", "60"]);
        raw.push(2, 1, 0.5, 1, vec![1.0, 2.0]).unwrap();
        let t = normalize(&raw);
        let buckets = AngleColumns::from_table(&t).unwrap();

        let abs = angle_sweep(&t, &buckets, 2, 1, &[0, 60], AngleMode::Absolute).unwrap();
        assert_eq!(abs[1].label, "a=60");
        assert_eq!(abs[1].points, vec![(0.5, 2.0)]);

        let rel = angle_sweep(&t, &buckets, 2, 1, &[60], AngleMode::Relative).unwrap();
        assert!((rel[0].points[0].1 - 1.0).abs() < 1e-12);

        assert!(angle_sweep(&t, &buckets, 2, 1, &[30], AngleMode::Absolute).is_err());
    }
}
