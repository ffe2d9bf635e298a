//! Closed-form curves for self-similar percolation.

use crate::series::{series_label, shade_color, Series, Shade};

pub const CROSSING_GRID_POINTS: usize = 100;
pub const PERCOLATION_GRID_POINTS: usize = 250;

/// `count` evenly spaced values from `start` to `end`, both included.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + i as f64 * step })
                .collect()
        }
    }
}

/// Probability of a straight crossing after `d` levels of `n`-ary subdivision:
/// `(1 / n^d) * prod_{j=1..d} (n * p^(n^j))`.
pub fn straight_crossing_probability(n: u32, d: u32, p: f64) -> f64 {
    let n = n as f64;
    let mut s = 1.0;
    for j in 1..=d {
        s *= n * p.powf(n.powi(j as i32));
    }
    s / n.powi(d as i32)
}

/// Expected occupied fraction after `d` levels: `p^d`.
pub fn expected_density(d: u32, p: f64) -> f64 {
    p.powi(d as i32)
}

/// Expected fractal dimension in the limit of infinite depth, clamped at zero:
/// `max(dimension + ln(p) / ln(n), 0)`.
pub fn expected_dimension(dimension: u32, n: u32, p: f64) -> f64 {
    (dimension as f64 + p.ln() / (n as f64).ln()).max(0.0)
}

fn curve(label: String, color: Option<plotters::style::RGBColor>, grid: &[f64], f: impl Fn(f64) -> f64) -> Series {
    Series {
        label,
        color,
        points: grid
            .iter()
            .map(|&p| (p, f(p)))
            .filter(|(_, v)| v.is_finite())
            .collect(),
    }
}

pub fn crossing_depth_sweep(n: u32, max_d: u32, shade: Shade) -> Vec<Series> {
    let grid = linspace(0.0, 1.0, CROSSING_GRID_POINTS);
    (1..=max_d)
        .map(|d| {
            let color = shade_color(shade, d as f64 / max_d as f64);
            curve(series_label(n, d), Some(color), &grid, |p| {
                straight_crossing_probability(n, d, p)
            })
        })
        .collect()
}

pub fn crossing_arity_sweep(ns: &[u32], d: u32) -> Vec<Series> {
    let grid = linspace(0.0, 1.0, CROSSING_GRID_POINTS);
    ns.iter()
        .map(|&n| {
            curve(series_label(n, d), None, &grid, |p| {
                straight_crossing_probability(n, d, p)
            })
        })
        .collect()
}

pub fn density_curves(depths: &[u32]) -> Vec<Series> {
    let grid = linspace(0.0, 1.0, PERCOLATION_GRID_POINTS);
    depths
        .iter()
        .map(|&d| curve(format!("n^d=n^{}", d), None, &grid, |p| expected_density(d, p)))
        .collect()
}

pub fn dimension_curves(dimension: u32, ns: &[u32]) -> Vec<Series> {
    let grid = linspace(0.0, 1.0, PERCOLATION_GRID_POINTS);
    ns.iter()
        .map(|&n| {
            curve(format!("n^d={}^inf", n), None, &grid, |p| {
                expected_dimension(dimension, n, p)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_both_ends() {
        let g = linspace(0.0, 1.0, 5);
        assert_eq!(g, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(0.0, 1.0, 1), vec![0.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(0.0, 1.0, 100).len(), 100);
    }

    #[test]
    fn crossing_probability_limits() {
        assert!((straight_crossing_probability(2, 1, 1.0) - 1.0).abs() < 1e-12);
        assert_eq!(straight_crossing_probability(2, 1, 0.0), 0.0);
        for n in [2, 3, 5] {
            for d in 1..4 {
                assert!((straight_crossing_probability(n, d, 1.0) - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn crossing_probability_matches_closed_form() {
        // Closed form: p^((n^(d+1) - n) / (n - 1)).
        let (n, d, p) = (3u32, 2u32, 0.9f64);
        let exponent = (3f64.powi(3) - 3.0) / 2.0;
        assert!((straight_crossing_probability(n, d, p) - p.powf(exponent)).abs() < 1e-12);
    }

    #[test]
    fn density_and_dimension() {
        assert_eq!(expected_density(0, 0.3), 1.0);
        assert!((expected_density(3, 0.5) - 0.125).abs() < 1e-12);
        assert_eq!(expected_dimension(2, 2, 1.0), 2.0);
        assert!((expected_dimension(2, 2, 0.5) - 1.0).abs() < 1e-12);
        assert_eq!(expected_dimension(1, 2, 0.0), 0.0);
        assert_eq!(expected_dimension(1, 2, 0.1), 0.0);
    }

    #[test]
    fn sweeps_have_one_curve_per_parameter() {
        let lines = crossing_depth_sweep(2, 3, (0.0, 1.0, 1.0));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].label, "n^d=2^3");
        assert_eq!(lines[0].points.len(), CROSSING_GRID_POINTS);

        let lines = crossing_arity_sweep(&[2, 3], 1);
        assert!(lines.iter().all(|s| s.color.is_none()));

        let lines = dimension_curves(3, &[2, 5]);
        assert_eq!(lines[1].label, "n^d=5^inf");
        assert_eq!(lines[0].points.len(), PERCOLATION_GRID_POINTS);
        assert_eq!(lines[0].points[0], (0.0, 0.0));

        let lines = density_curves(&[0, 1, 2]);
        assert_eq!(lines[0].points.last(), Some(&(1.0, 1.0)));
    }
}
