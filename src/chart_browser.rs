use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color as TuiColor, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Terminal,
};

use percolation_plots::config::{self, PlotConfig};
use percolation_plots::figures::{self, FigureGroup, FigureSpec, Tables};
use percolation_plots::init_logging;
use percolation_plots::render::render;

struct App {
    config: PlotConfig,
    /// `None` shows every group.
    filter: Option<FigureGroup>,
    specs: Vec<FigureSpec>,
    selected: usize,
    tables: Tables,
    rendered: BTreeSet<PathBuf>,
    status: Option<String>,
    error_msg: Option<String>,
}

impl App {
    fn new(config: PlotConfig) -> Self {
        Self {
            config,
            filter: None,
            specs: figures::catalogue(),
            selected: 0,
            tables: Tables::new(),
            rendered: BTreeSet::new(),
            status: None,
            error_msg: None,
        }
    }

    fn cycle_filter(&mut self) {
        let all = FigureGroup::ALL;
        self.filter = match self.filter {
            None => Some(all[0]),
            Some(g) => all
                .iter()
                .position(|&x| x == g)
                .and_then(|i| all.get(i + 1).copied()),
        };
        self.specs = match self.filter {
            Some(g) => figures::group_figures(g),
            None => figures::catalogue(),
        };
        self.selected = 0;
    }

    fn filter_label(&self) -> &'static str {
        self.filter.map(|g| g.name()).unwrap_or("all")
    }

    /// Loads the source table on first use, then draws the selected figure.
    fn render_selected(&mut self) -> Result<PathBuf, String> {
        let spec = self
            .specs
            .get(self.selected)
            .ok_or_else(|| "No figure selected".to_string())?;
        if let Some(kind) = spec.source {
            if !self.tables.contains_key(&kind) {
                let table = figures::load_table(kind, &self.config)?;
                self.tables.insert(kind, table);
            }
        }
        let figure = spec.build(&self.tables)?;
        let path = spec.output_path(&self.config.output_root);
        render(&figure, &path, self.config.canvas()).map_err(|e| e.to_string())?;
        self.rendered.insert(path.clone());
        Ok(path)
    }
}

// ─────────────────────────────────────────────
// TUI drawing
// ─────────────────────────────────────────────

fn draw_frame(f: &mut ratatui::Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(5), Constraint::Length(3)])
        .split(f.area());

    let header = Paragraph::new(format!(
        "Group: {}   Data: {}   Output: {}\n\
         \u{2191}/\u{2193} select   Enter: render   Tab: next group   q: quit",
        app.filter_label(),
        app.config.data_dir.display(),
        app.config.output_root.display(),
    ))
    .block(Block::default().borders(Borders::ALL).title("Chart Browser"))
    .style(Style::default().fg(TuiColor::Cyan));
    f.render_widget(header, layout[0]);

    // keep the selection on screen
    let visible = layout[1].height.saturating_sub(3) as usize;
    let offset = if visible > 0 && app.selected >= visible {
        app.selected + 1 - visible
    } else {
        0
    };

    let mut rows = Vec::new();
    for (idx, spec) in app.specs.iter().enumerate().skip(offset) {
        let selected = idx == app.selected;
        let style = if selected {
            Style::default().fg(TuiColor::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(TuiColor::White)
        };
        let source = spec
            .source
            .map(|k| k.to_string())
            .unwrap_or_else(|| "theory".to_string());
        let done = if app.rendered.contains(&spec.output_path(&app.config.output_root)) {
            "\u{2713}"
        } else {
            ""
        };
        rows.push(Row::new(vec![
            Cell::from(spec.group.name()).style(style),
            Cell::from(spec.file_name.clone()).style(style),
            Cell::from(source).style(style),
            Cell::from(done).style(Style::default().fg(TuiColor::Green)),
        ]));
    }

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Percentage(50),
            Constraint::Percentage(35),
            Constraint::Length(3),
        ],
    )
    .header(
        Row::new(vec!["Group", "Figure", "Source", ""])
            .style(Style::default().fg(TuiColor::Cyan).add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Figures ({})", app.specs.len())),
    )
    .column_spacing(1);
    f.render_widget(table, layout[1]);

    let (footer_text, footer_style) = match (&app.error_msg, &app.status) {
        (Some(e), _) => (e.as_str(), Style::default().fg(TuiColor::Red)),
        (None, Some(s)) => (s.as_str(), Style::default().fg(TuiColor::Green)),
        (None, None) => (
            "Select a figure and press Enter to render it.",
            Style::default().fg(TuiColor::Gray),
        ),
    };
    let footer = Paragraph::new(footer_text)
        .block(Block::default().borders(Borders::ALL).title("Messages"))
        .style(footer_style);
    f.render_widget(footer, layout[2]);
}

// ─────────────────────────────────────────────
// Event handling
// ─────────────────────────────────────────────

/// Returns Err("quit") to signal a clean exit.
fn handle_key(app: &mut App, key: KeyCode) -> Result<(), String> {
    match key {
        KeyCode::Char('q') => return Err("quit".into()),
        KeyCode::Up => {
            if app.selected > 0 {
                app.selected -= 1;
            }
            app.error_msg = None;
        }
        KeyCode::Down => {
            if app.selected + 1 < app.specs.len() {
                app.selected += 1;
            }
            app.error_msg = None;
        }
        KeyCode::Tab => {
            app.cycle_filter();
            app.error_msg = None;
            app.status = None;
        }
        KeyCode::Enter => match app.render_selected() {
            Ok(path) => {
                app.error_msg = None;
                app.status = Some(format!("Wrote {}", path.display()));
            }
            Err(e) => app.error_msg = Some(e),
        },
        _ => {}
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Main loop
// ─────────────────────────────────────────────

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), String> {
    loop {
        terminal.draw(|f| draw_frame(f, app)).map_err(|e| e.to_string())?;

        if event::poll(std::time::Duration::from_millis(50)).map_err(|e| e.to_string())? {
            if let Ok(Event::Key(key)) = event::read() {
                handle_key(app, key.code)?;
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // log lines would tear the alternate screen
    init_logging(log::LevelFilter::Off);
    let config = config::from_environment()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    for path in &app.rendered {
        println!("{}", path.display());
    }

    exit_status(res)?;
    Ok(())
}

/// A "quit" from `handle_key` is a clean exit; anything else is a failure.
fn exit_status(res: Result<(), String>) -> Result<(), String> {
    match res {
        Err(e) if e == "quit" => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(PlotConfig {
            data_dir: PathBuf::from("/nonexistent/data"),
            ..PlotConfig::default()
        })
    }

    #[test]
    fn tab_cycles_through_groups_back_to_all() {
        let mut app = app();
        let total = app.specs.len();
        for g in FigureGroup::ALL {
            handle_key(&mut app, KeyCode::Tab).unwrap();
            assert_eq!(app.filter, Some(g));
            assert!(app.specs.iter().all(|s| s.group == g));
        }
        handle_key(&mut app, KeyCode::Tab).unwrap();
        assert_eq!(app.filter, None);
        assert_eq!(app.specs.len(), total);
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut app = app();
        handle_key(&mut app, KeyCode::Up).unwrap();
        assert_eq!(app.selected, 0);
        for _ in 0..app.specs.len() + 5 {
            handle_key(&mut app, KeyCode::Down).unwrap();
        }
        assert_eq!(app.selected, app.specs.len() - 1);
        handle_key(&mut app, KeyCode::Tab).unwrap();
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn only_quit_exits_cleanly() {
        assert_eq!(exit_status(Err("quit".into())), Ok(()));
        assert_eq!(exit_status(Ok(())), Ok(()));
        assert_eq!(
            exit_status(Err("terminal gone".into())),
            Err("terminal gone".to_string())
        );
    }

    #[test]
    fn render_errors_stay_in_message_pane() {
        let mut app = app();
        // first figure reads the blob table, which is missing
        handle_key(&mut app, KeyCode::Enter).unwrap();
        assert!(app.error_msg.is_some());
        assert!(app.rendered.is_empty());
        assert_eq!(handle_key(&mut app, KeyCode::Char('q')), Err("quit".to_string()));
    }
}
