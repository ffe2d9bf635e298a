use std::error::Error;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::series::Series;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegendPlacement {
    /// Upper right corner of the plotting area.
    Inside,
    /// Column to the right of the chart.
    Outside,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub x_range: (f64, f64),
    /// `None` fits the finite data.
    pub y_range: Option<(f64, f64)>,
    pub legend: LegendPlacement,
    pub series: Vec<Series>,
}

// matplotlib's default colour cycle
const PALETTE: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];

/// Resolved colour of every series; palette entries are handed out in
/// order to series without an explicit colour.
pub fn resolve_colors(series: &[Series]) -> Vec<RGBColor> {
    let mut next = 0usize;
    series
        .iter()
        .map(|s| match s.color {
            Some(c) => c,
            None => {
                let c = PALETTE[next % PALETTE.len()];
                next += 1;
                c
            }
        })
        .collect()
}

/// Y range of the figure: the explicit one, or the finite data padded by 10%.
pub fn y_bounds(figure: &Figure) -> (f64, f64) {
    if let Some(r) = figure.y_range {
        return r;
    }
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for s in &figure.series {
        for &(_, y) in &s.points {
            if y.is_finite() {
                y_min = y_min.min(y);
                y_max = y_max.max(y);
            }
        }
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        return (0.0, 1.0);
    }
    let y_pad = (y_max - y_min).abs() * 0.1 + 1e-10;
    (y_min - y_pad, y_max + y_pad)
}

fn draw_side_legend(
    area: &DrawingArea<BitMapBackend, Shift>,
    entries: &[(&str, RGBColor)],
) -> Result<(), Box<dyn Error>> {
    let row_height = 18i32;
    let top = 40i32;
    for (i, (label, color)) in entries.iter().enumerate() {
        let y = top + i as i32 * row_height;
        area.draw(&PathElement::new(vec![(8, y), (32, y)], color.stroke_width(2)))?;
        area.draw(&Text::new(
            label.to_string(),
            (40, y - 7),
            ("sans-serif", 14).into_font(),
        ))?;
    }
    Ok(())
}

/// Draws `figure` to a PNG at `path`, creating parent directories.
pub fn render(figure: &Figure, path: &Path, size: (u32, u32)) -> Result<(), Box<dyn Error>> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let (chart_area, legend_area) = match figure.legend {
        LegendPlacement::Inside => (root.clone(), None),
        LegendPlacement::Outside => {
            let (left, right) = root.split_horizontally((size.0 as f64 * 0.75) as u32);
            (left, Some(right))
        }
    };

    let (x_min, x_max) = figure.x_range;
    let (y_min, y_max) = y_bounds(figure);

    let mut chart = ChartBuilder::on(&chart_area)
        .caption(&figure.title, ("sans-serif", 22).into_font())
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(figure.x_desc.as_str())
        .y_desc(figure.y_desc.as_str())
        .draw()?;

    let colors = resolve_colors(&figure.series);
    let mut entries: Vec<(&str, RGBColor)> = Vec::new();
    for (s, &color) in figure.series.iter().zip(&colors) {
        if s.is_empty() {
            continue;
        }
        let drawn = chart.draw_series(LineSeries::new(
            s.points.iter().copied(),
            color.stroke_width(2),
        ))?;
        if legend_area.is_none() {
            drawn
                .label(s.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }
        entries.push((s.label.as_str(), color));
    }

    match &legend_area {
        Some(area) => draw_side_legend(area, &entries)?,
        None if !entries.is_empty() => {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }
        None => {}
    }

    root.present()?;
    log::info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(color: Option<RGBColor>, points: Vec<(f64, f64)>) -> Series {
        Series {
            label: "s".into(),
            color,
            points,
        }
    }

    fn figure(series: Vec<Series>, y_range: Option<(f64, f64)>) -> Figure {
        Figure {
            title: "t".into(),
            x_desc: "p".into(),
            y_desc: "y".into(),
            x_range: (0.0, 1.0),
            y_range,
            legend: LegendPlacement::Inside,
            series,
        }
    }

    #[test]
    fn palette_skips_explicit_colors() {
        let fixed = RGBColor(1, 2, 3);
        let colors = resolve_colors(&[
            series(None, vec![]),
            series(Some(fixed), vec![]),
            series(None, vec![]),
        ]);
        assert_eq!(colors, vec![PALETTE[0], fixed, PALETTE[1]]);
    }

    #[test]
    fn palette_cycles() {
        let many: Vec<Series> = (0..12).map(|_| series(None, vec![])).collect();
        let colors = resolve_colors(&many);
        assert_eq!(colors[10], PALETTE[0]);
        assert_eq!(colors[11], PALETTE[1]);
    }

    #[test]
    fn y_bounds_pad_data_or_use_explicit_range() {
        let f = figure(vec![series(None, vec![(0.0, 0.0), (1.0, 10.0)])], None);
        let (lo, hi) = y_bounds(&f);
        assert!((lo + 1.0).abs() < 1e-6);
        assert!((hi - 11.0).abs() < 1e-6);

        let f = figure(vec![series(None, vec![(0.0, 5.0)])], Some((0.9, 2.25)));
        assert_eq!(y_bounds(&f), (0.9, 2.25));

        let f = figure(vec![series(None, vec![])], None);
        assert_eq!(y_bounds(&f), (0.0, 1.0));
    }
}
