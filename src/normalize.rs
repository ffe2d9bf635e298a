//! Derived per-site quantities for each table kind.
//!
//! Every derived column is a pure function of the raw row. Divisions by a
//! zero count are not guarded: the resulting NaN/inf values stay in the
//! table and are dropped when a series is extracted.

use crate::table::{Lattice, Table, TableKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Extent {
    Length,
    Surface,
    Volume,
}

impl Extent {
    fn exponent(self, lattice: Lattice) -> i32 {
        match self {
            Extent::Length => 1,
            Extent::Surface => lattice.dimension() - 1,
            Extent::Volume => lattice.dimension(),
        }
    }
}

const BLOB_EXTENTS: [(&str, Extent); 6] = [
    ("vol", Extent::Volume),
    ("interior", Extent::Volume),
    ("area", Extent::Surface),
    ("boundary", Extent::Surface),
    ("step", Extent::Length),
    ("dist", Extent::Length),
];

/// Sorts a copy of `raw` by `(p, d, n)` and appends the derived columns of its kind.
pub fn normalize(raw: &Table) -> Table {
    let mut table = raw.clone();
    table.sort_rows();

    let sides: Vec<f64> = table.rows().iter().map(|r| r.side()).collect();
    table.append_column("side", sides);

    match table.kind() {
        TableKind::Blob(lattice) => derive_blob(&mut table, lattice),
        TableKind::Crossings { lattice, .. } => derive_crossings(&mut table, lattice),
        TableKind::Projection | TableKind::Intersection => {}
    }
    table
}

/// `side / (side - 1)` written the way the distance correction is defined:
/// `c / (c - c / side)` with `c` half the cell diagonal.
pub fn distance_rescale(lattice: Lattice, side: f64) -> f64 {
    let c = lattice.half_diagonal();
    c / (c - c / side)
}

fn derive_blob(table: &mut Table, lattice: Lattice) {
    let dim = lattice.dimension();
    let max: Vec<f64> = table
        .rows()
        .iter()
        .map(|r| r.rep as f64 * r.side().powi(dim))
        .collect();
    table.append_column("max", max);

    for (name, extent) in BLOB_EXTENTS {
        let Some(raw) = table.column_values(name) else {
            continue;
        };
        let k = extent.exponent(lattice);
        let avg: Vec<f64> = table
            .rows()
            .iter()
            .zip(&raw)
            .map(|(r, v)| v / r.rep as f64)
            .collect();
        let mut rel: Vec<f64> = table
            .rows()
            .iter()
            .zip(&avg)
            .map(|(r, a)| a / r.side().powi(k))
            .collect();

        if name == "dist" {
            let rescale: Vec<f64> = table
                .rows()
                .iter()
                .map(|r| distance_rescale(lattice, r.side()))
                .collect();
            for (v, s) in rel.iter_mut().zip(&rescale) {
                *v *= s;
            }
            table.append_column("rescale_dist", rescale);
        }

        table.append_column(&format!("avg_{}", name), avg);
        table.append_column(&format!("rel_avg_{}", name), rel);
    }
}

fn derive_crossings(table: &mut Table, lattice: Lattice) {
    let dim = lattice.dimension();
    let max: Vec<f64> = table
        .rows()
        .iter()
        .map(|r| r.rep as f64 * r.side().powi(dim))
        .collect();

    if let Some(nc) = table.column_values("nc") {
        let cp = table
            .rows()
            .iter()
            .zip(&nc)
            .map(|(r, c)| c / r.rep as f64)
            .collect();
        table.append_column("cp", cp);
    }

    table.append_column("max", max.clone());

    if let Some(sq) = table.column_values("sq") {
        let density = sq.iter().zip(&max).map(|(s, m)| s / m).collect();
        let complement = sq.iter().zip(&max).map(|(s, m)| (m - s) / m).collect();
        let dim_col = sq.iter().zip(&max).map(|(s, m)| s.ln() / m.ln()).collect();
        let complement_dim = sq
            .iter()
            .zip(&max)
            .map(|(s, m)| (m.ln() - s.ln()) / m.ln())
            .collect();
        table.append_column("density", density);
        table.append_column("complement_density", complement);
        table.append_column("dim", dim_col);
        table.append_column("complement_dim", complement_dim);
    }

    if let (Some(lc), Some(nc)) = (table.column_values("lc"), table.column_values("nc")) {
        let al: Vec<f64> = lc.iter().zip(&nc).map(|(l, c)| l / c).collect();
        let ral = table
            .rows()
            .iter()
            .zip(&al)
            .map(|(r, a)| a / r.side())
            .collect();
        table.append_column("al", al);
        table.append_column("ral", ral);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
    }

    fn crossing(lattice: Lattice, complement: bool) -> TableKind {
        TableKind::Crossings {
            lattice,
            straight: false,
            complement,
        }
    }

    #[test]
    fn blob_area_is_averaged_and_scaled_by_side() {
        let mut raw = Table::new(TableKind::Blob(Lattice::Square), &["area"]);
        raw.push(3, 2, 0.5, 1000, vec![4500.0]).unwrap();
        let t = normalize(&raw);
        let row = &t.rows()[0];
        assert!(close(t.value(row, "avg_area").unwrap(), 4.5));
        assert!(close(t.value(row, "rel_avg_area").unwrap(), 0.5));
        assert!(close(t.value(row, "side").unwrap(), 9.0));
        assert!(close(t.value(row, "max").unwrap(), 1000.0 * 81.0));
    }

    #[test]
    fn crossing_probability_is_count_over_repetitions() {
        let mut raw = Table::new(crossing(Lattice::Square, false), &["nc"]);
        raw.push(2, 3, 0.5, 500, vec![250.0]).unwrap();
        let t = normalize(&raw);
        assert!(close(t.value(&t.rows()[0], "cp").unwrap(), 0.5));
        assert!(!t.has_column("density"));
        assert!(!t.has_column("al"));
    }

    #[test]
    fn blob_exponents_depend_on_lattice() {
        let cols = ["vol", "interior", "area", "boundary", "step", "dist"];
        let raw_values = vec![800.0, 400.0, 200.0, 100.0, 50.0, 25.0];

        let mut raw2 = Table::new(TableKind::Blob(Lattice::Square), &cols);
        raw2.push(2, 2, 0.3, 10, raw_values.clone()).unwrap();
        let t2 = normalize(&raw2);
        let r2 = &t2.rows()[0];
        assert!(close(t2.value(r2, "rel_avg_vol").unwrap(), 80.0 / 16.0));
        assert!(close(t2.value(r2, "rel_avg_interior").unwrap(), 40.0 / 16.0));
        assert!(close(t2.value(r2, "rel_avg_area").unwrap(), 20.0 / 4.0));
        assert!(close(t2.value(r2, "rel_avg_boundary").unwrap(), 10.0 / 4.0));
        assert!(close(t2.value(r2, "rel_avg_step").unwrap(), 5.0 / 4.0));

        let mut raw3 = Table::new(TableKind::Blob(Lattice::Cubic), &cols);
        raw3.push(2, 2, 0.3, 10, raw_values).unwrap();
        let t3 = normalize(&raw3);
        let r3 = &t3.rows()[0];
        assert!(close(t3.value(r3, "rel_avg_vol").unwrap(), 80.0 / 64.0));
        assert!(close(t3.value(r3, "rel_avg_boundary").unwrap(), 10.0 / 16.0));
        assert!(close(t3.value(r3, "rel_avg_step").unwrap(), 5.0 / 4.0));
        assert!(close(t3.value(r3, "max").unwrap(), 10.0 * 64.0));
    }

    #[test]
    fn distance_gets_diagonal_correction() {
        let mut raw = Table::new(TableKind::Blob(Lattice::Square), &["dist"]);
        raw.push(2, 2, 0.7, 4, vec![12.0]).unwrap();
        let t = normalize(&raw);
        let row = &t.rows()[0];
        let rescale = t.value(row, "rescale_dist").unwrap();
        assert!(close(rescale, 4.0 / 3.0));
        assert!(close(t.value(row, "avg_dist").unwrap(), 3.0));
        assert!(close(t.value(row, "rel_avg_dist").unwrap(), 3.0 / 4.0 * 4.0 / 3.0));
        assert!(close(distance_rescale(Lattice::Cubic, 4.0), 4.0 / 3.0));
    }

    #[test]
    fn zero_crossings_propagate_nan() {
        let mut raw = Table::new(crossing(Lattice::Cubic, false), &["nc", "sq", "lc"]);
        raw.push(2, 1, 0.1, 10, vec![0.0, 0.0, 0.0]).unwrap();
        let t = normalize(&raw);
        let row = &t.rows()[0];
        assert_eq!(t.value(row, "cp").unwrap(), 0.0);
        assert!(t.value(row, "al").unwrap().is_nan());
        assert!(t.value(row, "ral").unwrap().is_nan());
        assert_eq!(t.value(row, "dim").unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn crossing_columns_on_cubic_lattice() {
        let mut raw = Table::new(crossing(Lattice::Cubic, true), &["nc", "sq", "lc"]);
        raw.push(2, 1, 0.9, 4, vec![2.0, 8.0, 6.0]).unwrap();
        let t = normalize(&raw);
        let row = &t.rows()[0];
        let max = 4.0 * 8.0;
        assert!(close(t.value(row, "max").unwrap(), max));
        assert!(close(t.value(row, "density").unwrap(), 8.0 / max));
        assert!(close(t.value(row, "complement_density").unwrap(), (max - 8.0) / max));
        assert!(close(t.value(row, "dim").unwrap(), 8f64.ln() / max.ln()));
        assert!(close(
            t.value(row, "complement_dim").unwrap(),
            1.0 - 8f64.ln() / max.ln()
        ));
        assert!(close(t.value(row, "al").unwrap(), 3.0));
        assert!(close(t.value(row, "ral").unwrap(), 1.5));
    }

    #[test]
    fn randomized_rows_match_direct_formulas() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let kind = crossing(Lattice::Square, false);
        let mut raw = Table::new(kind, &["nc", "sq", "lc"]);
        for _ in 0..200 {
            let n = rng.gen_range(1..8u32);
            let d = rng.gen_range(1..5u32);
            let rep = rng.gen_range(1..5000u64);
            let p = rng.gen::<f64>();
            let nc = rng.gen_range(0..=rep) as f64;
            let side = (n as f64).powi(d as i32);
            let sq = rng.gen_range(0.0..=(rep as f64 * side * side));
            let lc = nc * rng.gen_range(1.0..3.0) * side;
            raw.push(n, d, p, rep, vec![nc, sq, lc]).unwrap();
        }

        let t = normalize(&raw);
        assert!(t.is_sorted());
        assert_eq!(t.len(), raw.len());

        for row in t.rows() {
            let nc = t.value(row, "nc").unwrap();
            let sq = t.value(row, "sq").unwrap();
            let cp = t.value(row, "cp").unwrap();
            assert!(close(cp, nc / row.rep as f64));

            let density = t.value(row, "density").unwrap();
            let complement = t.value(row, "complement_density").unwrap();
            assert!((complement - (1.0 - density)).abs() < 1e-9);
            let max = t.value(row, "max").unwrap();
            assert!(close(density, sq / max));
        }
    }

    #[test]
    fn normalizing_twice_is_stable() {
        let mut raw = Table::new(TableKind::Blob(Lattice::Square), &["area", "vol"]);
        raw.push(5, 1, 0.9, 3, vec![30.0, 40.0]).unwrap();
        raw.push(3, 2, 0.1, 2, vec![10.0, 20.0]).unwrap();
        let once = normalize(&raw);
        let twice = normalize(&once);
        assert_eq!(once.columns(), twice.columns());
        assert_eq!(once.rows(), twice.rows());
    }
}
