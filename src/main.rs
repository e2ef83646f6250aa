use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use soccer_desk::config::ConfigStore;
use soccer_desk::form::{FieldKind, Form};
use soccer_desk::provider::spawn_provider;
use soccer_desk::reports::{ReportTable, format_money};
use soccer_desk::state::{
    AppState, ExportFormat, InputTarget, Popup, ProviderCommand, Section, apply_delta,
};
use soccer_desk::view::ViewStatus;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

struct App {
    state: AppState,
    store: ConfigStore,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    tick: usize,
}

impl App {
    fn new(state: AppState, store: ConfigStore, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state,
            store,
            should_quit: false,
            cmd_tx,
            tick: 0,
        }
    }

    fn flush_commands(&mut self) {
        for cmd in self.state.take_outbox() {
            let Some(tx) = &self.cmd_tx else {
                self.state.command_dropped(&cmd);
                self.state.push_log("[WARN] Provider unavailable");
                continue;
            };
            if let Err(err) = tx.send(cmd) {
                self.state.command_dropped(&err.0);
                self.state.push_log("[WARN] Provider request failed");
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.popup.is_some() {
            self.on_popup_key(key);
            return;
        }
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
                self.state.help_overlay = false;
            }
            return;
        }
        if self.state.editor_open() {
            self.on_editor_key(key);
            return;
        }
        if let Some(target) = self.state.input {
            self.on_input_key(target, key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Char('1') => self.state.switch_section(Section::Dashboard),
            KeyCode::Char('2') => self.state.switch_section(Section::Teams),
            KeyCode::Char('3') => self.state.switch_section(Section::Players),
            KeyCode::Char('4') => self.state.switch_section(Section::Reports),
            KeyCode::Char('5') => self.state.switch_section(Section::Settings),
            KeyCode::Char('r') => self.state.load_section(),
            _ => match self.state.section {
                Section::Dashboard => {}
                Section::Teams => self.on_teams_key(key),
                Section::Players => self.on_players_key(key),
                Section::Reports => self.on_reports_key(key),
                Section::Settings => self.on_settings_key(key),
            },
        }
    }

    fn on_popup_key(&mut self, key: KeyEvent) {
        match self.state.popup {
            Some(Popup::Confirm { .. }) => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.state.resolve_popup(true),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.state.resolve_popup(false)
                }
                _ => {}
            },
            Some(Popup::Alert(_)) => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                    self.state.resolve_popup(false);
                }
            }
            None => {}
        }
    }

    fn on_editor_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Enter {
            self.state.save_editor();
            return;
        }
        if key.code == KeyCode::Esc {
            self.state.close_editor();
            return;
        }
        let form = match self.state.section {
            Section::Teams => self.state.teams.editor.as_mut(),
            Section::Players => self.state.players.editor.as_mut(),
            _ => None,
        };
        let Some(form) = form else {
            return;
        };
        let on_choice = form
            .focused()
            .is_some_and(|f| matches!(f.kind, FieldKind::Flag | FieldKind::Choice(_)));
        match key.code {
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Right => form.cycle(true),
            KeyCode::Left => form.cycle(false),
            KeyCode::Char(' ') if on_choice => form.cycle(true),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => form.insert_char(ch),
            _ => {}
        }
    }

    fn on_input_key(&mut self, target: InputTarget, key: KeyEvent) {
        let text = match target {
            InputTarget::TeamSearch => &mut self.state.teams.filter.search,
            InputTarget::PlayerSearch => &mut self.state.players.filter.search,
            InputTarget::SettingsUrl => &mut self.state.settings.draft_url,
        };
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.state.input = None,
            KeyCode::Backspace => {
                text.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => text.push(ch),
            _ => {}
        }
        match target {
            InputTarget::TeamSearch => self.state.teams.clamp_selection(),
            InputTarget::PlayerSearch => self.state.players.clamp_selection(),
            InputTarget::SettingsUrl => {
                self.state.settings.editing_url = self.state.input.is_some();
            }
        }
    }

    fn on_teams_key(&mut self, key: KeyEvent) {
        let view = &mut self.state.teams;
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => view.select_next(),
            KeyCode::Char('k') | KeyCode::Up => view.select_prev(),
            KeyCode::Char('/') => self.state.input = Some(InputTarget::TeamSearch),
            KeyCode::Char('c') => view.cycle_country(true),
            KeyCode::Char('C') => view.cycle_country(false),
            KeyCode::Char('l') => view.cycle_league(true),
            KeyCode::Char('L') => view.cycle_league(false),
            KeyCode::Char('x') => view.clear_filter(),
            KeyCode::Char('n') => self.state.open_editor(false),
            KeyCode::Char('e') | KeyCode::Enter => self.state.open_editor(true),
            KeyCode::Char('d') => self.state.request_delete(),
            _ => {}
        }
    }

    fn on_players_key(&mut self, key: KeyEvent) {
        let view = &mut self.state.players;
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => view.select_next(),
            KeyCode::Char('k') | KeyCode::Up => view.select_prev(),
            KeyCode::Char('/') => self.state.input = Some(InputTarget::PlayerSearch),
            KeyCode::Char('t') => view.cycle_team(true),
            KeyCode::Char('T') => view.cycle_team(false),
            KeyCode::Char('p') => view.cycle_position(true),
            KeyCode::Char('P') => view.cycle_position(false),
            KeyCode::Char('i') => view.cycle_injured(),
            KeyCode::Char('x') => view.clear_filter(),
            KeyCode::Char('n') => self.state.open_editor(false),
            KeyCode::Char('e') | KeyCode::Enter => self.state.open_editor(true),
            KeyCode::Char('d') => self.state.request_delete(),
            _ => {}
        }
    }

    fn on_reports_key(&mut self, key: KeyEvent) {
        let today = chrono::Local::now().date_naive();
        match key.code {
            KeyCode::Tab => self.state.reports.cycle_kind(),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('j') => {
                self.state.reports.select_team_next()
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('k') => {
                self.state.reports.select_team_prev()
            }
            KeyCode::Char('s') => self.state.reports.toggle_source(),
            KeyCode::Char('g') | KeyCode::Enter => self.state.run_report(),
            KeyCode::Char('x') => self.state.export_report(ExportFormat::Csv, today),
            KeyCode::Char('X') => self.state.export_report(ExportFormat::Xlsx, today),
            _ => {}
        }
    }

    fn on_settings_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('e') => {
                self.state.settings.editing_url = true;
                self.state.input = Some(InputTarget::SettingsUrl);
            }
            KeyCode::Char('b') | KeyCode::Tab => self.state.settings.toggle_backend(),
            KeyCode::Char('t') => self.state.test_connection(),
            KeyCode::Esc => {
                let config = self.state.config.clone();
                self.state.settings.reset(&config);
            }
            KeyCode::Char('s') | KeyCode::Enter => self.save_settings(),
            _ => {}
        }
    }

    fn save_settings(&mut self) {
        let saved = self
            .state
            .settings
            .draft()
            .and_then(|draft| self.store.save(&draft));
        match saved {
            Ok(config) => self.state.config_saved(config),
            Err(err) => {
                self.state.push_log(format!("[ERROR] Saving settings failed: {err}"));
                self.state.alert(err.to_string());
            }
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let store = ConfigStore::from_env();
    let config = store.load().with_env_overrides();
    let mut state = AppState::new(config.clone());
    if let Some(dir) = std::env::var("SOCCER_EXPORT_DIR")
        .ok()
        .filter(|v| !v.trim().is_empty())
    {
        state.export_dir = PathBuf::from(dir);
    }
    state.push_log(format!(
        "[INFO] {} backend at {}",
        config.backend_type.label(),
        config.api_base_url
    ));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(config, tx, cmd_rx);

    let mut app = App::new(state, store, Some(cmd_tx));
    app.state.switch_section(Section::Dashboard);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<soccer_desk::state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }
        app.flush_commands();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                    app.flush_commands();
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
            app.tick = app.tick.wrapping_add(1);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let state = &app.state;
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(header_text(state, app.tick))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match state.section {
        Section::Dashboard => render_dashboard(frame, chunks[1], state),
        Section::Teams => render_teams(frame, chunks[1], state),
        Section::Players => render_players(frame, chunks[1], state),
        Section::Reports => render_reports(frame, chunks[1], state),
        Section::Settings => render_settings(frame, chunks[1], state),
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    let editor = match state.section {
        Section::Teams => state.teams.editor.as_ref(),
        Section::Players => state.players.editor.as_ref(),
        _ => None,
    };
    if let Some(form) = editor {
        render_editor(frame, area, form);
    }
    if let Some(popup) = &state.popup {
        render_popup(frame, area, popup);
    }
    if state.help_overlay {
        render_help_overlay(frame, area);
    }
}

fn header_text(state: &AppState, tick: usize) -> String {
    let tabs = Section::ALL
        .iter()
        .enumerate()
        .map(|(idx, section)| {
            if *section == state.section {
                format!("[{} {}]", idx + 1, section.label())
            } else {
                format!(" {} {} ", idx + 1, section.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let busy = if state.is_loading() {
        format!(" {} loading", SPINNER[tick % SPINNER.len()])
    } else {
        String::new()
    };
    format!(
        "SOCCER DESK | {} | {}{busy}\n{tabs}",
        state.config.backend_type.label(),
        state.config.api_base_url
    )
}

fn footer_text(state: &AppState) -> String {
    if state.editor_open() {
        return "Tab/↑/↓ Field | ←/→/Space Choice | Enter Save | Esc Cancel".to_string();
    }
    if state.input.is_some() {
        return "Type to edit | Backspace Delete | Enter/Esc Done".to_string();
    }
    match state.section {
        Section::Dashboard => "1-5 Section | r Reload | ? Help | q Quit".to_string(),
        Section::Teams => {
            "j/k Move | / Search | c Country | l League | x Clear | n New | e Edit | d Delete | r Reload | q Quit".to_string()
        }
        Section::Players => {
            "j/k Move | / Search | t Team | p Position | i Injured | x Clear | n New | e Edit | d Delete | q Quit".to_string()
        }
        Section::Reports => {
            "Tab Kind | ←/→ Team | s Source | g Generate | x CSV | X XLSX | r Reload | q Quit".to_string()
        }
        Section::Settings => {
            "e Edit URL | b Backend | t Test | Enter Save | Esc Revert | q Quit".to_string()
        }
    }
}

fn status_line(status: ViewStatus, error: Option<&String>) -> String {
    match (status, error) {
        (ViewStatus::Error, Some(err)) => format!("Error: {err}"),
        (status, _) => format!("Status: {}", status.label()),
    }
}

fn render_dashboard(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = match (&state.dashboard.summary, &state.dashboard.last_error) {
        (_, Some(err)) => format!("Dashboard unavailable: {err}"),
        (Some(summary), None) => [
            format!("Total Teams:          {}", summary.team_count),
            format!("Total Players:        {}", summary.player_count),
            format!("Injured Players:      {}", summary.injured_count),
            format!("Average Player Value: {}", summary.average_value_text()),
        ]
        .join("\n"),
        (None, None) => "Loading dashboard...".to_string(),
    };
    let widget = Paragraph::new(text)
        .block(Block::default().title("Dashboard").borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn render_teams(frame: &mut Frame, area: Rect, state: &AppState) {
    let view = &state.teams;
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(area);

    let filter = format!(
        "Search: {}{} | Country: {} | League: {}\n{}",
        view.filter.search,
        if state.input == Some(InputTarget::TeamSearch) { "_" } else { "" },
        view.filter.country.as_deref().unwrap_or("All"),
        view.filter.league.as_deref().unwrap_or("All"),
        status_line(view.status, view.last_error.as_ref())
    );
    frame.render_widget(Paragraph::new(filter), sections[0]);

    let headers = ["Name", "Country", "League", "Stadium", "Value"];
    let widths = [
        Constraint::Min(20),
        Constraint::Length(14),
        Constraint::Length(18),
        Constraint::Length(22),
        Constraint::Length(16),
    ];
    let rows: Vec<Vec<String>> = view
        .visible()
        .iter()
        .map(|t| {
            vec![
                t.display_name().to_string(),
                t.country.clone(),
                t.league.clone(),
                t.home_stadium.clone(),
                format_money(t.team_value),
            ]
        })
        .collect();
    render_rows(
        frame,
        sections[1],
        &headers,
        &widths,
        &rows,
        Some(view.selected),
        "No teams found",
    );
}

fn render_players(frame: &mut Frame, area: Rect, state: &AppState) {
    let view = &state.players;
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(area);

    let team = view
        .filter
        .team_id
        .and_then(|id| view.options.team_name(id))
        .unwrap_or("All");
    let injured = match view.filter.injured {
        None => "Any",
        Some(true) => "Injured",
        Some(false) => "Healthy",
    };
    let filter = format!(
        "Search: {}{} | Team: {team} | Position: {} | Injury: {injured}\n{}",
        view.filter.search,
        if state.input == Some(InputTarget::PlayerSearch) { "_" } else { "" },
        view.filter.position.as_deref().unwrap_or("All"),
        status_line(view.status, view.last_error.as_ref())
    );
    frame.render_widget(Paragraph::new(filter), sections[0]);

    let headers = ["Name", "Team", "Position", "Rating", "Value", "Injured"];
    let widths = [
        Constraint::Min(20),
        Constraint::Length(20),
        Constraint::Length(12),
        Constraint::Length(7),
        Constraint::Length(16),
        Constraint::Length(8),
    ];
    let rows: Vec<Vec<String>> = view
        .visible()
        .iter()
        .map(|p| {
            vec![
                p.display_name().to_string(),
                p.team_name.clone(),
                p.position.clone(),
                if p.rating == 0.0 {
                    String::new()
                } else {
                    format!("{}", p.rating)
                },
                format_money(p.player_value),
                if p.is_injured { "Yes" } else { "No" }.to_string(),
            ]
        })
        .collect();
    render_rows(
        frame,
        sections[1],
        &headers,
        &widths,
        &rows,
        Some(view.selected),
        "No players found",
    );
}

fn render_reports(frame: &mut Frame, area: Rect, state: &AppState) {
    let view = &state.reports;
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(area);

    let team = view
        .selected_team()
        .map(|t| t.display_name().to_string())
        .unwrap_or_else(|| "-- select a team --".to_string());
    let export = view
        .last_export
        .as_ref()
        .map(|p| format!(" | Last export: {}", p.display()))
        .unwrap_or_default();
    let controls = format!(
        "Report: {} | Team: {team} | Source: {}\n{}{export}",
        view.kind.label(),
        view.source.label(),
        status_line(view.status, view.last_error.as_ref())
    );
    frame.render_widget(Paragraph::new(controls), sections[0]);

    let Some(rendered) = &view.rendered else {
        let hint = Paragraph::new("Pick a team and press g to generate a report")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Report").borders(Borders::ALL));
        frame.render_widget(hint, sections[1]);
        return;
    };

    let block = Block::default()
        .title(rendered.heading.clone())
        .borders(Borders::ALL);
    let inner = block.inner(sections[1]);
    frame.render_widget(block, sections[1]);

    let mut constraints = vec![Constraint::Length(rendered.summary.len() as u16 + 1)];
    constraints.extend(rendered.tables.iter().map(|_| Constraint::Min(3)));
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    frame.render_widget(Paragraph::new(rendered.summary.join("\n")), parts[0]);
    for (idx, table) in rendered.tables.iter().enumerate() {
        render_report_table(frame, parts[idx + 1], table);
    }
}

fn render_report_table(frame: &mut Frame, area: Rect, table: &ReportTable) {
    let block = Block::default().title(table.title.clone()).borders(Borders::TOP);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let headers: Vec<&str> = table.headers.iter().map(String::as_str).collect();
    let widths: Vec<Constraint> = headers
        .iter()
        .enumerate()
        .map(|(idx, _)| {
            if idx == 0 {
                Constraint::Min(20)
            } else {
                Constraint::Length(16)
            }
        })
        .collect();
    render_rows(frame, inner, &headers, &widths, &table.rows, None, "No rows");
}

fn render_settings(frame: &mut Frame, area: Rect, state: &AppState) {
    let settings = &state.settings;
    let cursor = if settings.editing_url { "_" } else { "" };
    let connection = if settings.testing {
        "Testing connection...".to_string()
    } else {
        settings
            .connection
            .as_ref()
            .map(|c| c.message.clone())
            .unwrap_or_default()
    };
    let dirty = if settings.is_dirty(&state.config) {
        " (unsaved)"
    } else {
        ""
    };
    let exports = format!("Exports go to {}", state.export_dir.display());
    let text = [
        format!("API Base URL: {}{cursor}", settings.draft_url),
        format!("Backend:      {}{dirty}", settings.draft_backend.label()),
        String::new(),
        connection,
        String::new(),
        exports,
    ]
    .join("\n");
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("API Settings").borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn render_rows(
    frame: &mut Frame,
    area: Rect,
    headers: &[&str],
    widths: &[Constraint],
    rows: &[Vec<String>],
    selected: Option<usize>,
    empty: &str,
) {
    if area.height == 0 {
        return;
    }
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let header_style = Style::default().add_modifier(Modifier::BOLD);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths.to_vec())
        .split(sections[0]);
    for (idx, header) in headers.iter().enumerate() {
        if let Some(col) = cols.get(idx) {
            render_cell_text(frame, *col, header, header_style);
        }
    }

    let list_area = sections[1];
    if rows.is_empty() {
        let widget = Paragraph::new(empty).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(widget, list_area);
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(selected.unwrap_or(0), rows.len(), visible);
    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let is_selected = selected == Some(idx);
        let style = if is_selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if is_selected {
            frame.render_widget(Block::default().style(style), row_area);
        }
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths.to_vec())
            .split(row_area);
        for (col_idx, cell) in rows[idx].iter().enumerate() {
            if let Some(col) = cols.get(col_idx) {
                render_cell_text(frame, *col, cell, style);
            }
        }
    }
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let text_area = Rect {
        x: area.x,
        y: area.y + (area.height / 2),
        width: area.width,
        height: 1,
    };
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, text_area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_editor(frame: &mut Frame, area: Rect, form: &Form) {
    let popup_area = centered_rect(60, 80, area);
    frame.render_widget(Clear, popup_area);

    let lines = form
        .visible_fields()
        .map(|(idx, field)| {
            let marker = if idx == form.focus { ">" } else { " " };
            let value = match field.kind {
                FieldKind::Flag | FieldKind::Choice(_) => format!("< {} >", field.display_value()),
                _ if idx == form.focus => format!("{}_", field.value),
                _ => field.value.clone(),
            };
            format!("{marker} {:<16} {value}", field.label)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let widget = Paragraph::new(lines)
        .block(Block::default().title(form.title.clone()).borders(Borders::ALL));
    frame.render_widget(widget, popup_area);
}

fn render_popup(frame: &mut Frame, area: Rect, popup: &Popup) {
    let popup_area = centered_rect(50, 25, area);
    frame.render_widget(Clear, popup_area);
    let (title, text) = match popup {
        Popup::Alert(message) => ("Alert", format!("{message}\n\n[Enter] OK")),
        Popup::Confirm { message, .. } => ("Confirm", format!("{message}\n\n[y] Yes  [n] No")),
    };
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(widget, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Soccer Desk - Help",
        "",
        "Global:",
        "  1-5          Dashboard / Teams / Players / Reports / Settings",
        "  r            Reload section",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Teams / Players:",
        "  j/k or ↑/↓   Move",
        "  /            Search by name",
        "  c l          Country / league filter (teams)",
        "  t p i        Team / position / injury filter (players)",
        "  x            Clear filters",
        "  n e d        New / edit / delete",
        "",
        "Reports:",
        "  Tab ←/→ s    Kind / team / source",
        "  g            Generate",
        "  x X          Export CSV / XLSX",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
