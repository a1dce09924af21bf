//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which owns the shared `AppState`,
//! translates key presses into intents, drains the delete schedule from the
//! event loop tick, and renders the list, the add form and the status bar.

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};

use crate::controller::{AppState, Effect, Intent};
use crate::fields::{format_filter, format_priority, FilterMode, Priority};
use crate::tui::colors::{ALERT_RED, AMBER, CALM_GREEN, OVERDUE_RED, TAG_BLUE};
use crate::tui::form::{FormField, TaskForm};
use crate::tui::input::InputField;
use crate::view::{format_due, is_overdue, truncate};

/// Which screen the TUI is showing.
#[derive(Clone, Copy, PartialEq)]
enum Screen {
    List,
    AddTask,
}

/// Terminal UI over the shared application state.
pub struct App {
    state: AppState,
    screen: Screen,
    table_state: TableState,
    visible: Vec<u64>,
    form: TaskForm,
    search: InputField,
    search_active: bool,
    status_message: String,
}

impl App {
    /// Create a new App instance, loading the store from the given path.
    pub fn new(db_path: &Path) -> io::Result<Self> {
        let mut app = App {
            state: AppState::load(db_path),
            screen: Screen::List,
            table_state: TableState::default(),
            visible: Vec::new(),
            form: TaskForm::new(),
            search: InputField::new(),
            search_active: false,
            status_message: String::new(),
        };
        app.update_visible();
        Ok(app)
    }

    /// Main event loop: render, poll for input, and drain expired deletes.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.state.tick(Instant::now())? > 0 {
                self.update_visible();
            }

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }

    /// Recompute the visible id list, keeping the selection on the same task
    /// when it is still shown.
    fn update_visible(&mut self) {
        let old_selected = self
            .table_state
            .selected()
            .and_then(|idx| self.visible.get(idx))
            .copied();

        self.visible = self.state.visible().iter().map(|t| t.id).collect();

        let selection = match old_selected {
            Some(id) => self.visible.iter().position(|&v| v == id),
            None => None,
        };
        match selection {
            Some(idx) => self.table_state.select(Some(idx)),
            None if self.visible.is_empty() => self.table_state.select(None),
            None => self.table_state.select(Some(0)),
        }
    }

    fn selected_id(&self) -> Option<u64> {
        self.table_state
            .selected()
            .and_then(|idx| self.visible.get(idx))
            .copied()
    }

    /// Feed an intent through the reducer and refresh the view, reporting
    /// save errors on the status line instead of crashing the UI.
    fn dispatch(&mut self, intent: Intent) -> Effect {
        match self.state.apply(intent) {
            Ok(effect) => {
                self.update_visible();
                effect
            }
            Err(e) => {
                self.status_message = format!("Error saving: {e}");
                Effect::NoOp
            }
        }
    }

    /// Handle keyboard input. Returns true when the app should exit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if !event::poll(Duration::from_millis(50))? {
            return Ok(false);
        }
        let Event::Key(key) = event::read()? else {
            return Ok(false);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(false);
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        match self.screen {
            Screen::AddTask => self.handle_form_input(key.code),
            Screen::List if self.search_active => self.handle_search_input(key.code),
            Screen::List => return self.handle_list_input(key.code),
        }
        Ok(false)
    }

    fn handle_list_input(&mut self, code: KeyCode) -> io::Result<bool> {
        self.status_message.clear();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),

            KeyCode::Char('a') => {
                self.screen = Screen::AddTask;
            }
            KeyCode::Char('/') => {
                self.search_active = true;
            }

            // Filter mode: cycle, or jump straight to one.
            KeyCode::Char('f') => {
                let next = self.state.filter.next();
                self.dispatch(Intent::SetFilter(next));
                self.status_message = format!("Filter: {}", format_filter(next));
            }
            KeyCode::Char('1') => {
                self.dispatch(Intent::SetFilter(FilterMode::All));
            }
            KeyCode::Char('2') => {
                self.dispatch(Intent::SetFilter(FilterMode::Active));
            }
            KeyCode::Char('3') => {
                self.dispatch(Intent::SetFilter(FilterMode::Completed));
            }

            KeyCode::Up => {
                if let Some(idx) = self.table_state.selected() {
                    if idx > 0 {
                        self.table_state.select(Some(idx - 1));
                    }
                }
            }
            KeyCode::Down => {
                if let Some(idx) = self.table_state.selected() {
                    if idx + 1 < self.visible.len() {
                        self.table_state.select(Some(idx + 1));
                    }
                }
            }

            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(id) = self.selected_id() {
                    if self.dispatch(Intent::ToggleTask(id)) == Effect::Mutated {
                        let done = self
                            .state
                            .store
                            .get(id)
                            .map(|t| t.completed)
                            .unwrap_or(false);
                        self.status_message = if done {
                            "Task completed".into()
                        } else {
                            "Task reopened".into()
                        };
                    }
                }
            }

            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    if !self.state.deletes.is_pending(id) {
                        self.dispatch(Intent::DeleteTask(id));
                        self.status_message = "Deleting…".into();
                    }
                }
            }

            KeyCode::Char('x') => {
                let cleared = self.state.stats().completed;
                if self.dispatch(Intent::ClearCompleted) == Effect::Mutated {
                    self.status_message = format!("Cleared {cleared} completed task(s)");
                } else {
                    self.status_message = "No completed tasks to clear".into();
                }
            }

            _ => {}
        }
        Ok(false)
    }

    /// Incremental search: every edit re-applies the term, like typing into
    /// the search box.
    fn handle_search_input(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.search_active = false;
                self.search.clear();
                self.dispatch(Intent::SetSearch(String::new()));
                self.status_message.clear();
            }
            KeyCode::Enter => {
                self.search_active = false;
                if !self.search.is_empty() {
                    self.status_message = format!(
                        "Search: '{}' ({} shown)",
                        self.search.trimmed(),
                        self.visible.len()
                    );
                }
            }
            KeyCode::Backspace => {
                self.search.handle_backspace();
                self.dispatch(Intent::SetSearch(self.search.value.clone()));
            }
            KeyCode::Left => self.search.move_cursor_left(),
            KeyCode::Right => self.search.move_cursor_right(),
            KeyCode::Char(c) => {
                self.search.handle_char(c);
                self.dispatch(Intent::SetSearch(self.search.value.clone()));
            }
            _ => {}
        }
    }

    fn handle_form_input(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.screen = Screen::List;
                self.form.reset();
            }
            KeyCode::Tab | KeyCode::Down => self.form.cycle_focus(true),
            KeyCode::BackTab | KeyCode::Up => self.form.cycle_focus(false),
            KeyCode::Enter => {
                let today = Local::now().date_naive();
                match self.form.submit(today) {
                    Ok(intent) => {
                        if let Effect::Added(_) = self.dispatch(intent) {
                            self.form.reset();
                            self.screen = Screen::List;
                            self.status_message = "Task added".into();
                        }
                    }
                    Err(e) => {
                        self.form.error = Some(e.message());
                    }
                }
            }
            KeyCode::Backspace => self.form.handle_backspace(),
            KeyCode::Left => match self.form.focus {
                FormField::Text => self.form.text.move_cursor_left(),
                FormField::Due => self.form.due.move_cursor_left(),
                FormField::Category => self.form.category.move_cursor_left(),
                FormField::Priority => {}
            },
            KeyCode::Right => match self.form.focus {
                FormField::Text => self.form.text.move_cursor_right(),
                FormField::Due => self.form.due.move_cursor_right(),
                FormField::Category => self.form.category.move_cursor_right(),
                FormField::Priority => {}
            },
            KeyCode::Char(c) => self.form.handle_char(c),
            _ => {}
        }
    }

    // --- rendering ---

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header with stats
                Constraint::Length(3), // Filter tabs + search
                Constraint::Min(0),    // Task list
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_filter_bar(f, chunks[1]);
        self.render_list(f, chunks[2]);
        self.render_status_bar(f, chunks[3]);

        if self.screen == Screen::AddTask {
            self.render_form_popup(f);
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let stats = self.state.stats();
        let header = Paragraph::new(Line::from(vec![
            Span::styled("TO-DO LIST", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("   "),
            Span::styled(
                format!("Total: {}", stats.total),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw("  "),
            Span::styled(
                format!("Completed: {}", stats.completed),
                Style::default().fg(CALM_GREEN),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_filter_bar(&self, f: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        for (i, mode) in [FilterMode::All, FilterMode::Active, FilterMode::Completed]
            .into_iter()
            .enumerate()
        {
            let label = format!(" {} {} ", i + 1, format_filter(mode));
            let style = if self.state.filter == mode {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(label, style));
            spans.push(Span::raw(" "));
        }

        if self.search_active || !self.search.value.is_empty() {
            let yellow = Style::default().fg(Color::Yellow);
            spans.push(Span::raw("  "));
            spans.push(Span::styled("Search: ", yellow));
            if self.search_active {
                spans.extend(cursor_spans(&self.search, yellow));
            } else {
                spans.push(Span::styled(self.search.value.as_str(), yellow));
            }
        }

        let bar = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title("Filter"));
        f.render_widget(bar, area);
    }

    fn render_list(&mut self, f: &mut Frame, area: Rect) {
        if self.visible.is_empty() {
            let empty = Paragraph::new("No tasks found")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title("Tasks"))
                .alignment(Alignment::Center);
            f.render_widget(empty, area);
            return;
        }

        let today = Local::now().date_naive();
        let mut rows = Vec::with_capacity(self.visible.len());
        for &id in &self.visible {
            let Some(task) = self.state.store.get(id) else {
                continue;
            };
            let leaving = self.state.deletes.is_pending(id);

            let indicator_color = match task.priority {
                Priority::Low => CALM_GREEN,
                Priority::Medium => AMBER,
                Priority::High => ALERT_RED,
            };

            let mut text_style = Style::default();
            if task.completed {
                text_style = text_style
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT);
            }
            // Exit animation: the row fades while its delete is pending.
            if leaving {
                text_style = text_style
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM | Modifier::ITALIC);
            }

            let category = if task.category.is_empty() {
                Span::raw("")
            } else {
                Span::styled(
                    format!("[{}]", truncate(&task.category, 14)),
                    Style::default().fg(TAG_BLUE),
                )
            };

            let due_style = if is_overdue(task, today) {
                Style::default().fg(OVERDUE_RED).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };

            rows.push(Row::new(vec![
                Line::from(Span::styled("●", Style::default().fg(indicator_color))),
                Line::from(Span::styled(task.text.clone(), text_style)),
                Line::from(category),
                Line::from(Span::styled(format_due(task.due), due_style)),
            ]));
        }

        let table = Table::new(
            rows,
            [
                Constraint::Length(2),
                Constraint::Min(20),
                Constraint::Length(16),
                Constraint::Length(13),
            ],
        )
        .header(
            Row::new(vec!["", "Task", "Category", "Due"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title("Tasks"))
        .row_highlight_style(Style::default().bg(Color::Rgb(40, 40, 60)));

        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if self.status_message.is_empty() {
            "a add  / search  f/1-3 filter  space toggle  d delete  x clear done  q quit".into()
        } else {
            self.status_message.clone()
        };
        let bar = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        f.render_widget(bar, area);
    }

    fn render_form_popup(&self, f: &mut Frame) {
        let area = centered_rect(50, 15, f.area());
        f.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Add task (Tab: next field, Enter: save, Esc: cancel)");
        let inner = block.inner(area);
        f.render_widget(block, area);

        let fields = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(inner);

        self.render_form_field(f, fields[0], "Task", field_line(&self.form.text, self.form.focus == FormField::Text), self.form.focus == FormField::Text);
        self.render_form_field(f, fields[1], "Due (YYYY-MM-DD)", field_line(&self.form.due, self.form.focus == FormField::Due), self.form.focus == FormField::Due);
        self.render_form_field(
            f,
            fields[2],
            "Priority (any key cycles)",
            Line::from(format_priority(self.form.priority)),
            self.form.focus == FormField::Priority,
        );
        self.render_form_field(f, fields[3], "Category", field_line(&self.form.category, self.form.focus == FormField::Category), self.form.focus == FormField::Category);

        if let Some(err) = &self.form.error {
            let msg = Paragraph::new(err.as_str()).style(Style::default().fg(ALERT_RED));
            f.render_widget(msg, fields[4]);
        }
    }

    fn render_form_field(&self, f: &mut Frame, area: Rect, title: &str, content: Line, focused: bool) {
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let field = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        );
        f.render_widget(field, area);
    }
}

/// Render a field's value with the cursor shown at its character position:
/// the character under the cursor (or a trailing space) is reversed.
fn cursor_spans(field: &InputField, base: Style) -> Vec<Span<'_>> {
    let (before, after) = field.split_at_cursor();
    let mut chars = after.chars();
    let at = chars.next().map_or_else(|| " ".to_string(), String::from);
    let rest: String = chars.collect();
    vec![
        Span::styled(before, base),
        Span::styled(at, base.add_modifier(Modifier::REVERSED)),
        Span::styled(rest, base),
    ]
}

/// A text field's content line, with the in-place cursor when focused.
fn field_line(field: &InputField, focused: bool) -> Line<'_> {
    if focused {
        Line::from(cursor_spans(field, Style::default()))
    } else {
        Line::from(field.value.as_str())
    }
}

/// Centre a fixed-size rect inside the available area.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}
