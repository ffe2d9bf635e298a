//! Figures for self-similar percolation simulation results.
//!
//! CSV tables are loaded with [`table::load_csv`], extended with derived
//! columns by [`normalize::normalize`], turned into line series and written
//! as PNG charts by [`render::render`]. The fixed chart set lives in
//! [`figures`].

pub mod angles;
pub mod config;
pub mod figures;
pub mod normalize;
pub mod render;
pub mod report;
pub mod series;
pub mod table;
pub mod theory;

/// Installs the `pretty_env_logger` backend; `RUST_LOG` overrides `default`.
pub fn init_logging(default: log::LevelFilter) {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(default);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    let _ = builder.try_init();
}
