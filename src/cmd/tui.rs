use anyhow::Result;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Row, Table, Tabs},
    Frame, Terminal,
};
use std::{io::stdout, path::PathBuf};
use tui_input::{Input, InputRequest};

use crate::{
    config::Config,
    report::{keyword_heading, ReportView, NONE_MARKER},
    scan::{scan_blocking, ScanOptions},
    source::Source,
    utils::parse_keywords,
};

const TAB_TITLES: [&str; 4] = ["Search", "All Keywords", "By Keyword", "Ranking"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Source,
    Keywords,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Ready,
    Info(String),
    Error(String),
}

pub struct TuiApp {
    pub current_tab: usize,
    pub focus: Field,
    pub source_input: Input,
    pub keywords_input: Input,
    pub report: Option<ReportView>,
    pub status: Status,
    config: Config,
}

impl TuiApp {
    pub fn new(source: Option<PathBuf>, config: Config) -> Self {
        let source_input = source
            .map(|path| Input::new(path.to_string_lossy().into_owned()))
            .unwrap_or_default();

        Self {
            current_tab: 0,
            focus: Field::Source,
            source_input,
            keywords_input: Input::default(),
            report: None,
            status: Status::Ready,
            config,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;

        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, Hide)?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.run_app(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), Show)?;
        terminal.show_cursor()?;

        res
    }

    fn run_app(&mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.ui(f))?;

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                match key.code {
                    KeyCode::Esc => return Ok(()),
                    KeyCode::Tab => self.next_tab(),
                    KeyCode::BackTab => self.previous_tab(),
                    KeyCode::Char('q') if self.current_tab != 0 => return Ok(()),
                    KeyCode::Enter if self.current_tab == 0 => {
                        self.status = Status::Info("Scanning...".to_string());
                        terminal.draw(|f| self.ui(f))?;
                        self.start_search();
                    }
                    _ if self.current_tab == 0 => self.handle_input_key(key),
                    _ => {}
                }
            }
        }
    }

    pub fn next_tab(&mut self) {
        self.current_tab = (self.current_tab + 1) % TAB_TITLES.len();
    }

    pub fn previous_tab(&mut self) {
        self.current_tab = if self.current_tab == 0 {
            TAB_TITLES.len() - 1
        } else {
            self.current_tab - 1
        };
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        let request = match key.code {
            KeyCode::Up | KeyCode::Down => {
                self.focus = match self.focus {
                    Field::Source => Field::Keywords,
                    Field::Keywords => Field::Source,
                };
                return;
            }
            KeyCode::Char(c) => InputRequest::InsertChar(c),
            KeyCode::Backspace => InputRequest::DeletePrevChar,
            KeyCode::Delete => InputRequest::DeleteNextChar,
            KeyCode::Left => InputRequest::GoToPrevChar,
            KeyCode::Right => InputRequest::GoToNextChar,
            KeyCode::Home => InputRequest::GoToStart,
            KeyCode::End => InputRequest::GoToEnd,
            _ => return,
        };

        let input = match self.focus {
            Field::Source => &mut self.source_input,
            Field::Keywords => &mut self.keywords_input,
        };
        input.handle(request);
    }

    /// Validate the form and run a scan. Problems are shown in the status bar
    /// and leave the previous report untouched.
    pub fn start_search(&mut self) {
        let source_path = self.source_input.value().trim().to_string();
        if source_path.is_empty() {
            self.status =
                Status::Error("Please provide a zip file or folder containing resumes.".to_string());
            return;
        }

        let keywords = match parse_keywords(self.keywords_input.value()) {
            Ok(keywords) => keywords,
            Err(e) => {
                self.status = Status::Error(e.to_string());
                return;
            }
        };

        let source = match Source::detect(PathBuf::from(&source_path).as_path(), self.config.recursive) {
            Ok(source) => source,
            Err(e) => {
                self.status = Status::Error(e.to_string());
                return;
            }
        };

        let options = ScanOptions {
            jobs: self.config.jobs,
            show_progress: false,
            pattern: None,
        };

        match scan_blocking(&source, keywords, &options) {
            Ok(summary) => {
                let report = summary.report();
                self.status = Status::Info(format!(
                    "Scanned {} documents, {} skipped, {} matched at least one keyword",
                    report.documents_scanned,
                    report.skipped.len(),
                    report.ranking.len()
                ));
                self.report = Some(report);
                self.current_tab = 1;
            }
            Err(e) => self.status = Status::Error(format!("{:#}", e)),
        }
    }

    fn ui(&self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints(
                [
                    Constraint::Length(1), // Header
                    Constraint::Length(2), // Tabs
                    Constraint::Min(0),    // Content
                    Constraint::Length(2), // Status bar
                ]
                .as_ref(),
            )
            .split(size);

        self.draw_header(f, chunks[0]);
        self.draw_tabs(f, chunks[1]);

        match self.current_tab {
            0 => self.draw_search_tab(f, chunks[2]),
            1 => self.draw_all_keywords_tab(f, chunks[2]),
            2 => self.draw_by_keyword_tab(f, chunks[2]),
            3 => self.draw_ranking_tab(f, chunks[2]),
            _ => unreachable!(),
        }

        self.draw_status_bar(f, chunks[3]);
    }

    fn draw_header(&self, f: &mut Frame, area: Rect) {
        let title = Line::from(vec![
            Span::styled("resumatch", Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)),
            Span::raw(" resume keyword screening"),
        ]);

        f.render_widget(Paragraph::new(title), area);
    }

    fn draw_tabs(&self, f: &mut Frame, area: Rect) {
        let tabs = TAB_TITLES
            .iter()
            .map(|t| {
                let (first, rest) = t.split_at(1);
                Line::from(vec![
                    Span::styled(first, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                    Span::styled(rest, Style::default().fg(Color::Gray)),
                ])
            })
            .collect();

        let tabs = Tabs::new(tabs)
            .select(self.current_tab)
            .block(Block::default().borders(Borders::BOTTOM))
            .style(Style::default().fg(Color::White))
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

        f.render_widget(tabs, area);
    }

    fn draw_search_tab(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)].as_ref())
            .split(area);

        let fields = [
            (Field::Source, "Zip archive, folder or resume", &self.source_input, chunks[0]),
            (Field::Keywords, "Keywords (comma separated)", &self.keywords_input, chunks[1]),
        ];

        for (field, title, input, chunk) in fields {
            let border_style = if self.focus == field {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let widget = Paragraph::new(input.value()).block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(border_style),
            );
            f.render_widget(widget, chunk);

            if self.focus == field {
                let max_x = chunk.x + chunk.width.saturating_sub(2);
                let x = (chunk.x + 1 + input.cursor() as u16).min(max_x);
                f.set_cursor(x, chunk.y + 1);
            }
        }

        let help = Paragraph::new(
            [
                "Enter       run search",
                "Up/Down     switch field",
                "Tab         next tab",
                "Esc         quit",
            ]
            .join("\n"),
        )
        .block(Block::default().title("Actions").borders(Borders::ALL));
        f.render_widget(help, chunks[2]);
    }

    fn draw_all_keywords_tab(&self, f: &mut Frame, area: Rect) {
        let Some(report) = &self.report else {
            self.draw_empty(f, area, "Files Containing All Keywords");
            return;
        };

        let items: Vec<ListItem> = if report.all_keywords.is_empty() {
            vec![ListItem::new(Line::from(Span::styled(
                NONE_MARKER,
                Style::default().fg(Color::DarkGray),
            )))]
        } else {
            report
                .all_keywords
                .iter()
                .map(|file| ListItem::new(file.as_str()))
                .collect()
        };

        let list = List::new(items).block(
            Block::default()
                .title("Files Containing All Keywords")
                .borders(Borders::ALL),
        );
        f.render_widget(list, area);
    }

    fn draw_by_keyword_tab(&self, f: &mut Frame, area: Rect) {
        let Some(report) = &self.report else {
            self.draw_empty(f, area, "Files Per Keyword");
            return;
        };

        let mut items: Vec<ListItem> = Vec::new();
        for section in &report.by_keyword {
            items.push(ListItem::new(Line::from(Span::styled(
                keyword_heading(&section.keyword),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ))));
            for file in &section.files {
                items.push(ListItem::new(format!("  {}", file)));
            }
        }
        if items.is_empty() {
            items.push(ListItem::new(Line::from(Span::styled(
                "No keyword matched any document",
                Style::default().fg(Color::DarkGray),
            ))));
        }

        let list = List::new(items).block(Block::default().title("Files Per Keyword").borders(Borders::ALL));
        f.render_widget(list, area);
    }

    fn draw_ranking_tab(&self, f: &mut Frame, area: Rect) {
        let Some(report) = &self.report else {
            self.draw_empty(f, area, "Ranking");
            return;
        };

        let rows: Vec<Row> = report
            .ranking
            .iter()
            .enumerate()
            .map(|(i, ranked)| {
                Row::new(vec![
                    (i + 1).to_string(),
                    ranked.file.clone(),
                    format!("{}/{}", ranked.matches, report.keyword_count),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(4),
            Constraint::Percentage(75),
            Constraint::Length(10),
        ];
        let table = Table::new(rows)
            .header(
                Row::new(vec!["#", "File", "Matches"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(
                Block::default()
                    .title(report.ranking_heading())
                    .borders(Borders::ALL),
            )
            .widths(&widths);

        f.render_widget(table, area);
    }

    fn draw_empty(&self, f: &mut Frame, area: Rect, title: &str) {
        let paragraph = Paragraph::new("No report yet. Run a search from the Search tab.")
            .block(Block::default().title(title.to_string()).borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn draw_status_bar(&self, f: &mut Frame, area: Rect) {
        let (text, style) = match &self.status {
            Status::Ready => (
                "Ready - Enter to search, Tab to switch tabs, Esc to quit".to_string(),
                Style::default(),
            ),
            Status::Info(message) => (message.clone(), Style::default().fg(Color::Green)),
            Status::Error(message) => (message.clone(), Style::default().fg(Color::Red)),
        };

        let status = Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::TOP));
        f.render_widget(status, area);
    }
}
