use std::collections::BTreeMap;

use crate::table::Table;

/// Spacing, in degrees, between consecutive angle buckets when the header
/// does not name the angle.
pub const BUCKET_STEP_DEGREES: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AngleMode {
    /// Raw measured length.
    Absolute,
    /// Length divided by the longest possible chord at that angle, `1 / cos(a)`.
    Relative,
}

impl AngleMode {
    pub fn apply(self, value: f64, angle_degrees: u32) -> f64 {
        match self {
            AngleMode::Absolute => value,
            AngleMode::Relative => {
                let longest = 1.0 / (angle_degrees as f64).to_radians().cos();
                value / longest
            }
        }
    }
}

/// Explicit map from angle (degrees) to the column holding its measurement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AngleColumns {
    by_angle: BTreeMap<u32, String>,
}

fn parse_angle_header(name: &str) -> Option<u32> {
    let trimmed = name.trim();
    let digits = trimmed
        .strip_prefix("a=")
        .or_else(|| trimmed.strip_prefix('a'))
        .unwrap_or(trimmed);
    digits.trim().parse::<u32>().ok()
}

impl AngleColumns {
    /// Builds the map from raw column names in header order. Headers that
    /// name an angle (`10`, `a10`, `a=10`) are used as is; any other bucket at
    /// position `i` is taken to be `2 * i` degrees.
    pub fn from_columns(columns: &[String]) -> Result<Self, String> {
        let mut by_angle = BTreeMap::new();
        for (i, name) in columns.iter().enumerate() {
            let angle = parse_angle_header(name).unwrap_or(i as u32 * BUCKET_STEP_DEGREES);
            if let Some(prev) = by_angle.insert(angle, name.clone()) {
                return Err(format!(
                    "Columns '{}' and '{}' both map to angle {}",
                    prev, name, angle
                ));
            }
        }
        if by_angle.is_empty() {
            return Err("No angle columns".into());
        }
        Ok(Self { by_angle })
    }

    pub fn from_table(table: &Table) -> Result<Self, String> {
        Self::from_columns(table.raw_columns())
            .map_err(|e| format!("{} ({} table)", e, table.kind()))
    }

    pub fn column(&self, angle: u32) -> Option<&str> {
        self.by_angle.get(&angle).map(String::as_str)
    }

    pub fn angles(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_angle.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn numeric_headers_map_directly() {
        let map = AngleColumns::from_columns(&names(&["0", "a4", "a=8"])).unwrap();
        assert_eq!(map.column(0), Some("0"));
        assert_eq!(map.column(4), Some("a4"));
        assert_eq!(map.column(8), Some("a=8"));
        assert_eq!(map.column(2), None);
    }

    #[test]
    fn unnamed_buckets_fall_back_to_position() {
        let map = AngleColumns::from_columns(&names(&["len_0", "len_1", "len_2"])).unwrap();
        assert_eq!(map.angles().collect::<Vec<_>>(), vec![0, 2, 4]);
        assert_eq!(map.column(4), Some("len_2"));
    }

    #[test]
    fn duplicate_angles_are_rejected() {
        assert!(AngleColumns::from_columns(&names(&["2", "x"])).is_err());
        assert!(AngleColumns::from_columns(&[]).is_err());
    }

    #[test]
    fn relative_mode_scales_by_cosine() {
        assert_eq!(AngleMode::Absolute.apply(3.0, 40), 3.0);
        assert!((AngleMode::Relative.apply(3.0, 0) - 3.0).abs() < 1e-12);
        let v = AngleMode::Relative.apply(1.0, 60);
        assert!((v - 0.5).abs() < 1e-12);
    }
}
