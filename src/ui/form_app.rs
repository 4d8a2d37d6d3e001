use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::api::client::{SearchParams, TwitterClient};
use crate::data::exporter::save_csv;
use crate::data::row::{flatten_tweets, TweetRow};
use crate::data::table::TweetTable;

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Query,
    MaxResults,
    Pages,
    StartTime,
    EndTime,
    OutPath,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Query => Field::MaxResults,
            Field::MaxResults => Field::Pages,
            Field::Pages => Field::StartTime,
            Field::StartTime => Field::EndTime,
            Field::EndTime => Field::OutPath,
            Field::OutPath => Field::Query,
        }
    }

    fn prev(self) -> Self {
        match self {
            Field::Query => Field::OutPath,
            Field::MaxResults => Field::Query,
            Field::Pages => Field::MaxResults,
            Field::StartTime => Field::Pages,
            Field::EndTime => Field::StartTime,
            Field::OutPath => Field::EndTime,
        }
    }
}

struct Modal {
    title: &'static str,
    message: String,
    error: bool,
}

impl Modal {
    fn done(message: String) -> Self {
        Self {
            title: "Done",
            message,
            error: false,
        }
    }

    fn error(message: String) -> Self {
        Self {
            title: "Error",
            message,
            error: true,
        }
    }
}

/// Interactive search form: query, paging controls, time window and
/// output path, with fetch results reported in a modal.
pub struct FormApp {
    query: Input,
    max_results: Input,
    pages: Input,
    start_time: Input,
    end_time: Input,
    out_path: Input,
    focus: Field,
    modal: Option<Modal>,
    status_message: String,
}

impl FormApp {
    pub fn new() -> Self {
        Self {
            query: Input::from("python lang:en -is:retweet".to_string()),
            max_results: Input::from("50".to_string()),
            pages: Input::from("2".to_string()),
            start_time: Input::default(),
            end_time: Input::default(),
            out_path: Input::from("outputs/tweets.csv".to_string()),
            focus: Field::Query,
            modal: None,
            status_message: "Ready - Tab moves between fields, Enter fetches".to_string(),
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.ui(f))?;

            if let Event::Key(key) = event::read()? {
                if self.modal.is_some() {
                    // Any key dismisses the modal
                    self.modal = None;
                    continue;
                }
                match key.code {
                    KeyCode::Esc => break,
                    KeyCode::Enter => self.fetch(),
                    KeyCode::Tab | KeyCode::Down => {
                        self.focus = self.focus.next();
                    }
                    KeyCode::BackTab | KeyCode::Up => {
                        self.focus = self.focus.prev();
                    }
                    _ => {
                        self.focused_input_mut().handle_event(&Event::Key(key));
                    }
                }
            }
        }
        Ok(())
    }

    fn focused_input_mut(&mut self) -> &mut Input {
        match self.focus {
            Field::Query => &mut self.query,
            Field::MaxResults => &mut self.max_results,
            Field::Pages => &mut self.pages,
            Field::StartTime => &mut self.start_time,
            Field::EndTime => &mut self.end_time,
            Field::OutPath => &mut self.out_path,
        }
    }

    fn fetch(&mut self) {
        self.status_message = format!("Fetching: {}", self.query.value().trim());

        match self.run_search() {
            Ok(count) => {
                self.status_message =
                    format!("Saved {} rows to {}", count, self.out_path.value().trim());
                self.modal = Some(Modal::done(format!("Saved {} rows.", count)));
            }
            Err(e) => {
                self.status_message = format!("Error: {}", e);
                self.modal = Some(Modal::error(e.to_string()));
            }
        }
    }

    /// The whole pipeline, blocking: fetch pages, flatten, export.
    fn run_search(&self) -> Result<usize> {
        let max_results: u32 = self
            .max_results
            .value()
            .trim()
            .parse()
            .map_err(|_| anyhow!("Max/Page must be a whole number"))?;
        let pages: usize = self
            .pages
            .value()
            .trim()
            .parse()
            .map_err(|_| anyhow!("Pages must be a whole number"))?;

        let client = TwitterClient::new()?;
        let params = SearchParams::new(self.query.value().trim())
            .with_max_results(max_results)
            .with_time_window(
                optional(self.start_time.value()),
                optional(self.end_time.value()),
            )
            .with_page_limit(pages);

        let mut rows: Vec<TweetRow> = Vec::new();
        for page in client.search(params) {
            let page = page?;
            rows.extend(flatten_tweets(&page.data, page.includes.as_ref()));
        }

        let table = TweetTable::from_rows(&rows);
        save_csv(&table, self.out_path.value().trim())?;
        Ok(table.row_count())
    }

    fn ui(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Query
                Constraint::Length(3), // Max/Page | Pages
                Constraint::Length(3), // Start | End
                Constraint::Length(3), // Output CSV
                Constraint::Min(5),    // Help
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        self.render_field(f, chunks[0], "Query", &self.query, Field::Query);

        let paging = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        self.render_field(f, paging[0], "Max/Page", &self.max_results, Field::MaxResults);
        self.render_field(f, paging[1], "Pages", &self.pages, Field::Pages);

        let window = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);
        self.render_field(f, window[0], "Start (ISO8601)", &self.start_time, Field::StartTime);
        self.render_field(f, window[1], "End (ISO8601)", &self.end_time, Field::EndTime);

        self.render_field(f, chunks[3], "Output CSV", &self.out_path, Field::OutPath);

        let help_text = vec![
            Line::from("Fill in the search parameters and press Enter to fetch."),
            Line::from("Start/End may be left blank to search the whole recent window."),
            Line::from(""),
            Line::from("Controls:"),
            Line::from("  Tab / Shift-Tab - Move between fields"),
            Line::from("  Enter           - Fetch and save CSV"),
            Line::from("  Esc             - Quit"),
        ];
        let help_paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(Wrap { trim: true });
        f.render_widget(help_paragraph, chunks[4]);

        let status_line = Line::from(vec![
            Span::styled(&self.status_message, Style::default().fg(Color::White)),
            Span::raw(" | "),
            Span::styled(
                "FORM",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | Enter=Fetch | Esc=Quit"),
        ]);
        let status = Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray));
        f.render_widget(status, chunks[5]);

        if let Some(modal) = &self.modal {
            self.render_modal(f, modal);
        }
    }

    fn render_field(&self, f: &mut Frame, area: Rect, title: &str, input: &Input, field: Field) {
        let focused = self.focus == field;
        let style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };

        let widget = Paragraph::new(input.value())
            .block(Block::default().borders(Borders::ALL).title(title))
            .style(style);
        f.render_widget(widget, area);

        if focused && self.modal.is_none() {
            f.set_cursor_position((area.x + input.visual_cursor() as u16 + 1, area.y + 1));
        }
    }

    fn render_modal(&self, f: &mut Frame, modal: &Modal) {
        let area = centered_rect(60, 30, f.area());
        f.render_widget(Clear, area);

        let color = if modal.error { Color::Red } else { Color::Green };
        let text = vec![
            Line::from(modal.message.clone()),
            Line::from(""),
            Line::from("Press any key to continue"),
        ];
        let popup = Paragraph::new(text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(modal.title)
                    .border_style(Style::default().fg(color)),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(popup, area);
    }
}

impl Default for FormApp {
    fn default() -> Self {
        Self::new()
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn run_form_app() -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = FormApp::new();
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}
