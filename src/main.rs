use percolation_plots::{config, init_logging, report};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(log::LevelFilter::Info);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let groups = report::parse_groups(&args)?;
    let config = config::from_environment()?;
    log::info!(
        "data dir {}, output root {}, samples {}",
        config.data_dir.display(),
        config.output_root.display(),
        config.samples
    );

    let report = report::run(&groups, &config)?;

    let summary = config.output_root.join("summary.txt");
    report.write_summary(&summary, &config)?;
    println!(
        "{} figures from {} tables, summary in {}",
        report.figures.len(),
        report.tables.len(),
        summary.display()
    );
    Ok(())
}
