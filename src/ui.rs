use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use portfolio_filter::{Card, Category, FilterController, RecordingView};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

pub struct App {
    /// Rows and buttons are styled from the signals in the controller's view
    pub controller: FilterController<RecordingView>,
    /// Button under the keyboard cursor (not necessarily the selected one)
    pub focus: usize,
    pub state: TableState,
    pub show_detail: bool,
    /// Also list hidden cards, dimmed
    pub show_hidden: bool,
}

impl App {
    pub fn new(controller: FilterController<RecordingView>) -> Self {
        let mut state = TableState::default();
        if !controller.cards().is_empty() {
            state.select(Some(0));
        }
        let focus = controller.selected_button().unwrap_or(0);

        Self {
            controller,
            focus,
            state,
            show_detail: false,
            show_hidden: false,
        }
    }

    /// Cards in table order, paired with their visibility
    pub fn rows(&self) -> Vec<(&Card, bool)> {
        self.controller
            .cards()
            .iter()
            .map(|c| (c, self.card_visible(c)))
            .filter(|(_, visible)| *visible || self.show_hidden)
            .collect()
    }

    pub fn card_visible(&self, card: &Card) -> bool {
        self.controller.view().card_visible(&card.id).unwrap_or(false)
    }

    pub fn button_selected(&self, index: usize) -> bool {
        self.controller.view().button_selected(index).unwrap_or(false)
    }

    pub fn selected_card(&self) -> Option<&Card> {
        let rows = self.rows();
        self.state.selected().and_then(|i| rows.get(i).map(|(c, _)| *c))
    }

    /// Single dispatch point for "category chosen"
    pub fn choose(&mut self, category: Category) {
        self.controller.select_category(category);
        if let Some(index) = self.controller.selected_button() {
            self.focus = index;
        }
        self.reset_cursor();
    }

    pub fn choose_button(&mut self, index: usize) {
        if let Some(button) = self.controller.buttons().get(index) {
            let category = button.category.clone();
            self.choose(category);
        }
    }

    pub fn focus_next(&mut self) {
        let len = self.controller.buttons().len();
        if len > 0 {
            self.focus = (self.focus + 1) % len;
        }
    }

    pub fn focus_previous(&mut self) {
        let len = self.controller.buttons().len();
        if len > 0 {
            self.focus = if self.focus == 0 { len - 1 } else { self.focus - 1 };
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn toggle_hidden(&mut self) {
        self.show_hidden = !self.show_hidden;
        self.reset_cursor();
    }

    fn reset_cursor(&mut self) {
        if self.rows().is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn next(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Apply one key press; returns true when the app should exit
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left | KeyCode::Char('h') => self.focus_previous(),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => self.focus_next(),
            KeyCode::Enter | KeyCode::Char(' ') => self.choose_button(self.focus),
            KeyCode::Char('*') | KeyCode::Char('0') => self.choose(Category::Wildcard),
            KeyCode::Char(c @ '1'..='9') => {
                // '1' is the first button
                let index = c as usize - '1' as usize;
                self.choose_button(index);
            }
            KeyCode::Char('d') => self.toggle_detail(),
            KeyCode::Char('a') => self.toggle_hidden(),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Home => {
                if !self.rows().is_empty() {
                    self.state.select(Some(0));
                }
            }
            KeyCode::End => {
                let len = self.rows().len();
                if len > 0 {
                    self.state.select(Some(len - 1));
                }
            }
            _ => {}
        }
        false
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Windows reports releases too
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key.code) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Category buttons
            Constraint::Min(0),    // Cards
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_buttons(f, chunks[0], app);

    if app.show_detail {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_cards(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        render_cards(f, chunks[1], app);
    }

    render_status_bar(f, chunks[2], app);
}

fn render_buttons(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];
    for (i, button) in app.controller.buttons().iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }

        let mut style = if app.button_selected(i) {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        if i == app.focus {
            style = style.bg(Color::Rgb(40, 40, 40));
        }

        let label = if i < 9 {
            format!("{} {}", i + 1, button.label)
        } else {
            button.label.clone()
        };
        spans.push(Span::styled(label, style));
    }

    if app.controller.buttons().is_empty() {
        spans.push(Span::styled("No categories", Style::default().fg(Color::DarkGray)));
    }

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Portfolio "),
    );

    f.render_widget(header, area);
}

fn render_cards(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Id", "Title", "Tags"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows: Vec<Row> = app
        .rows()
        .into_iter()
        .map(|(card, visible)| {
            let style = if visible {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
            };
            Row::new(vec![
                Cell::from(card.id.clone()),
                Cell::from(truncate(&card.title, 40)),
                Cell::from(card.tags().join(" ")),
            ])
            .style(style)
            .height(1)
        })
        .collect();

    let title = format!(
        " Cards - {} ({}/{}) ",
        app.controller.active(),
        app.controller.visible_count(),
        app.controller.cards().len()
    );

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(42),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
    let total = app.rows().len();

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, total),
        Style::default().fg(Color::Cyan),
    )];

    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled(
        format!("Filter: {}", app.controller.active().selector()),
        Style::default().fg(Color::Green),
    ));

    status_spans.push(Span::raw(" | "));
    for (key, help) in [
        ("←/→", " Focus | "),
        ("Enter", " Select | "),
        ("1-9", " Button | "),
        ("*", " All | "),
        ("a", " Hidden | "),
        ("d", " Details | "),
    ] {
        status_spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(help));
    }
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Card Details ");

    let card = match app.selected_card() {
        Some(c) => c,
        None => {
            f.render_widget(Paragraph::new("No card selected").block(block), area);
            return;
        }
    };

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let visible = app.card_visible(card);

    let mut content = vec![
        Line::from(""),
        Line::from(vec![Span::styled("  Id: ", label), Span::raw(card.id.clone())]),
        Line::from(""),
        Line::from(vec![Span::styled("  Title: ", label), Span::raw(card.title.clone())]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Tags: ", label),
            Span::raw(if card.tags().is_empty() {
                "(none)".to_string()
            } else {
                card.tags().join(", ")
            }),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Visible: ", label),
            Span::styled(
                if visible { "yes" } else { "no" },
                Style::default().fg(if visible { Color::Green } else { Color::Red }),
            ),
        ]),
    ];

    if let Some(description) = &card.description {
        content.push(Line::from(""));
        content.push(Line::from("  ─────────────────────────────────────"));
        content.push(Line::from(""));
        for line in wrap_text(description, 35) {
            content.push(Line::from(Span::styled(
                format!("  {}", line),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }
    }

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if !current_line.is_empty() && current_line.chars().count() + word.chars().count() + 1 > width {
            lines.push(std::mem::take(&mut current_line));
        }
        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }
    lines
}
