use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use signal_catalog::{
    Broker, Carousel, Catalog, CatalogResult, DeadlineClock, FilterEngine, Listing, Navigator,
    Provider, Testimonial, NO_CONSTRAINT,
};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Upper bound on how long the loop blocks waiting for input
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Providers,
    Brokers,
    Testimonials,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Providers => Page::Brokers,
            Page::Brokers => Page::Testimonials,
            Page::Testimonials => Page::Providers,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Providers => Page::Testimonials,
            Page::Brokers => Page::Providers,
            Page::Testimonials => Page::Brokers,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Providers => "Signal Providers",
            Page::Brokers => "Brokers",
            Page::Testimonials => "Testimonials",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    Search,
}

/// Contract violations from the view: loud in debug builds, ignored in release
fn apply_or_warn(result: CatalogResult<()>) {
    if let Err(err) = result {
        debug_assert!(false, "view sent an invalid change: {}", err);
        tracing::warn!(%err, "ignoring invalid change from the view");
    }
}

// ============================================================================
// CATALOG VIEW (one per catalog page)
// ============================================================================

pub struct CatalogView<E> {
    pub engine: FilterEngine<E>,
    pub state: TableState,
    pub focused_facet: usize,
}

impl<E: Listing> CatalogView<E> {
    pub fn new(catalog: Arc<Catalog<E>>) -> Self {
        let mut view = Self {
            engine: FilterEngine::new(catalog),
            state: TableState::default(),
            focused_facet: 0,
        };
        view.reset_selection();
        view
    }

    pub fn selected(&self) -> Option<&E> {
        let visible = self.engine.current_visible();
        self.state.selected().and_then(|i| visible.get(i).copied())
    }

    pub fn push_search_char(&mut self, c: char) {
        let mut term = self.engine.state().search_term().to_string();
        term.push(c);
        self.engine.set_search_term(&term);
        self.reset_selection();
    }

    pub fn pop_search_char(&mut self) {
        let mut term = self.engine.state().search_term().to_string();
        term.pop();
        self.engine.set_search_term(&term);
        self.reset_selection();
    }

    pub fn focus_next_facet(&mut self) {
        let count = self.engine.declared_facets().len();
        if count > 0 {
            self.focused_facet = (self.focused_facet + 1) % count;
        }
    }

    /// all -> first option -> ... -> last option -> all
    pub fn cycle_facet_value(&mut self) {
        let facets = self.engine.declared_facets();
        let Some(facet) = facets.get(self.focused_facet) else {
            return;
        };

        let current = self
            .engine
            .facet_value(facet.name)
            .unwrap_or_else(|| NO_CONSTRAINT.to_string());
        let position = facet.options.iter().position(|o| o.value == current);
        let next = match position {
            None => facet.options.first().map(|o| o.value).unwrap_or(NO_CONSTRAINT),
            Some(i) if i + 1 < facet.options.len() => facet.options[i + 1].value,
            Some(_) => NO_CONSTRAINT,
        };

        apply_or_warn(self.engine.set_facet(facet.name, next));
        self.reset_selection();
    }

    pub fn clear_filters(&mut self) {
        self.engine.reset();
        self.reset_selection();
    }

    pub fn next(&mut self) {
        let len = self.engine.visible_count();
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
        let len = self.engine.visible_count();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    // Reset selection to first item
    fn reset_selection(&mut self) {
        if self.engine.visible_count() > 0 {
            self.state.select(Some(0));
        } else {
            self.state.select(None);
        }
    }
}

/// Outbound links can't leave a terminal; show the URL for the visitor to follow
struct StatusNavigator<'a> {
    status: &'a mut Option<String>,
}

impl Navigator for StatusNavigator<'_> {
    fn open(&mut self, url: &str) -> anyhow::Result<()> {
        *self.status = Some(format!("Open: {}", url));
        Ok(())
    }
}

// ============================================================================
// APP
// ============================================================================

pub struct App {
    pub providers: CatalogView<Provider>,
    pub brokers: CatalogView<Broker>,
    pub carousel: Carousel<Testimonial, DeadlineClock>,
    pub current_page: Page,
    pub input_mode: InputMode,
    pub status: Option<String>,
    slide_area: Option<Rect>,
    hovering: bool,
}

impl App {
    pub fn new(
        providers: Arc<Catalog<Provider>>,
        brokers: Arc<Catalog<Broker>>,
        carousel: Carousel<Testimonial, DeadlineClock>,
    ) -> Self {
        Self {
            providers: CatalogView::new(providers),
            brokers: CatalogView::new(brokers),
            carousel,
            current_page: Page::Providers,
            input_mode: InputMode::Browse,
            status: None,
            slide_area: None,
            hovering: false,
        }
    }

    pub fn next_page(&mut self) {
        self.leave_slide();
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.leave_slide();
        self.current_page = self.current_page.previous();
    }

    /// Deliver the autoplay tick if its deadline passed
    pub fn fire_due_timer(&mut self, now: Instant) {
        if let Some(token) = self.carousel.timer_source().take_due(now) {
            self.carousel.on_tick(token);
        }
    }

    fn poll_timeout(&self) -> Duration {
        self.carousel
            .timer_source()
            .time_until_due(Instant::now())
            .map_or(IDLE_POLL, |left| left.min(IDLE_POLL))
    }

    fn dispatch_selected(&mut self) {
        let mut navigator = StatusNavigator { status: &mut self.status };
        let result = match self.current_page {
            Page::Providers => match self.providers.selected() {
                Some(p) => self.providers.engine.catalog().dispatch_affiliate(&p.id, &mut navigator),
                None => Ok(()),
            },
            Page::Brokers => match self.brokers.selected() {
                Some(b) => self.brokers.engine.catalog().dispatch_affiliate(&b.id, &mut navigator),
                None => Ok(()),
            },
            Page::Testimonials => Ok(()),
        };

        if let Err(err) = result {
            tracing::warn!(%err, "affiliate dispatch failed");
            self.status = Some(format!("Error: {}", err));
        }
    }

    /// Returns false when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.input_mode == InputMode::Search {
            self.handle_search_key(key);
            return true;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Tab => self.next_page(),
            KeyCode::BackTab => self.previous_page(),
            _ => match self.current_page {
                Page::Providers => self.handle_catalog_key(key, CatalogPage::Providers),
                Page::Brokers => self.handle_catalog_key(key, CatalogPage::Brokers),
                Page::Testimonials => self.handle_carousel_key(key),
            },
        }
        true
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.input_mode = InputMode::Browse,
            KeyCode::Backspace => match self.current_page {
                Page::Providers => self.providers.pop_search_char(),
                Page::Brokers => self.brokers.pop_search_char(),
                Page::Testimonials => {}
            },
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                match self.current_page {
                    Page::Providers => self.providers.push_search_char(c),
                    Page::Brokers => self.brokers.push_search_char(c),
                    Page::Testimonials => {}
                }
            }
            _ => {}
        }
    }

    fn handle_catalog_key(&mut self, key: KeyEvent, page: CatalogPage) {
        macro_rules! view {
            () => {
                match page {
                    CatalogPage::Providers => &mut self.providers as &mut dyn CatalogControls,
                    CatalogPage::Brokers => &mut self.brokers as &mut dyn CatalogControls,
                }
            };
        }

        match key.code {
            KeyCode::Char('/') => self.input_mode = InputMode::Search,
            KeyCode::Char('f') => view!().focus_next_facet(),
            KeyCode::Char(' ') => view!().cycle_facet_value(),
            KeyCode::Char('c') => {
                view!().clear_filters();
                self.status = None;
            }
            KeyCode::Down | KeyCode::Char('j') => view!().next(),
            KeyCode::Up | KeyCode::Char('k') => view!().previous(),
            KeyCode::Enter => self.dispatch_selected(),
            _ => {}
        }
    }

    fn handle_carousel_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.carousel.prev(),
            KeyCode::Right | KeyCode::Char('l') => self.carousel.next(),
            KeyCode::Char('p') => self.carousel.toggle_autoplay(),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if let Err(err) = self.carousel.go_to(index) {
                    self.status = Some(err.to_string());
                }
            }
            _ => {}
        }
    }

    /// Hovering the slide pauses autoplay, leaving it resumes
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !matches!(mouse.kind, MouseEventKind::Moved) {
            return;
        }

        let inside = self.current_page == Page::Testimonials
            && self
                .slide_area
                .map_or(false, |area| contains(area, mouse.column, mouse.row));

        if inside && !self.hovering {
            self.hovering = true;
            self.carousel.pause();
        } else if !inside {
            self.leave_slide();
        }
    }

    fn leave_slide(&mut self) {
        if self.hovering {
            self.hovering = false;
            self.carousel.resume();
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum CatalogPage {
    Providers,
    Brokers,
}

/// Object-safe slice of `CatalogView` used by key handling
trait CatalogControls {
    fn focus_next_facet(&mut self);
    fn cycle_facet_value(&mut self);
    fn clear_filters(&mut self);
    fn next(&mut self);
    fn previous(&mut self);
}

impl<E: Listing> CatalogControls for CatalogView<E> {
    fn focus_next_facet(&mut self) {
        CatalogView::focus_next_facet(self)
    }

    fn cycle_facet_value(&mut self) {
        CatalogView::cycle_facet_value(self)
    }

    fn clear_filters(&mut self) {
        CatalogView::clear_filters(self)
    }

    fn next(&mut self) {
        CatalogView::next(self)
    }

    fn previous(&mut self) {
        CatalogView::previous(self)
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

// ============================================================================
// EVENT LOOP
// ============================================================================

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(app.poll_timeout())? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if !app.handle_key(key) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        app.fire_due_timer(Instant::now());
    }
}

// ============================================================================
// RENDERING
// ============================================================================

/// Column layout of a catalog table
trait TableRow {
    const HEADERS: &'static [&'static str];
    const WIDTHS: &'static [u16];
    fn cells(&self) -> Vec<String>;
}

impl TableRow for Provider {
    const HEADERS: &'static [&'static str] = &["Provider", "Signals", "Risk", "Price", "Rating", "Win %", "Followers"];
    const WIDTHS: &'static [u16] = &[24, 22, 8, 10, 8, 7, 10];

    fn cells(&self) -> Vec<String> {
        let verified = if self.verified { " ✓" } else { "" };
        vec![
            format!("{}{}", truncate(&self.name, 20), verified),
            truncate(&self.signal_types.join(", "), 20),
            self.risk_level.to_string(),
            format!("${}/mo", self.subscription_price),
            format!("{:.1}", self.rating),
            format!("{}%", self.win_rate),
            self.followers.to_string(),
        ]
    }
}

impl TableRow for Broker {
    const HEADERS: &'static [&'static str] = &["Broker", "Instruments", "Regulation", "Min dep.", "Leverage", "Spread", "Rating"];
    const WIDTHS: &'static [u16] = &[24, 28, 18, 10, 9, 8, 8];

    fn cells(&self) -> Vec<String> {
        let verified = if self.verified { " ✓" } else { "" };
        vec![
            format!("{}{}", truncate(&self.name, 20), verified),
            truncate(&self.instruments.join(", "), 26),
            truncate(&self.regulation.join(", "), 16),
            format!("${}", self.min_deposit),
            self.max_leverage.clone(),
            format!("{:.2}", self.spreads_from),
            format!("{:.1}", self.rating),
        ]
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let searching = app.input_mode == InputMode::Search;
    match app.current_page {
        Page::Providers => render_catalog(f, chunks[1], &mut app.providers, searching),
        Page::Brokers => render_catalog(f, chunks[1], &mut app.brokers, searching),
        Page::Testimonials => render_testimonials(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Providers, Page::Brokers, Page::Testimonials];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!(
            "Providers {}/{}",
            app.providers.engine.visible_count(),
            app.providers.engine.catalog().len()
        ),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!(
            "Brokers {}/{}",
            app.brokers.engine.visible_count(),
            app.brokers.engine.catalog().len()
        ),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_catalog<E: Listing + TableRow>(f: &mut Frame, area: Rect, view: &mut CatalogView<E>, searching: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    // Filter bar: search line + facet line
    let search_style = if searching {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let cursor = if searching { "▏" } else { "" };
    let search_line = Line::from(vec![
        Span::styled(" Search: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::styled(format!("{}{}", view.engine.state().search_term(), cursor), search_style),
    ]);

    let mut facet_spans = vec![Span::styled(
        " Filters: ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    for (i, facet) in view.engine.declared_facets().iter().enumerate() {
        let value = view
            .engine
            .facet_value(facet.name)
            .unwrap_or_else(|| NO_CONSTRAINT.to_string());
        let label = facet
            .options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.to_string())
            .unwrap_or(value);

        let style = if i == view.focused_facet {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        facet_spans.push(Span::styled(format!("{}: {}", facet.label, label), style));
        facet_spans.push(Span::raw("  "));
    }

    let filter_bar = Paragraph::new(vec![search_line, Line::from(facet_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );
    f.render_widget(filter_bar, chunks[0]);

    let title = format!(" {} ({} shown) ", E::CATALOG, view.engine.visible_count());

    if view.engine.visible_count() == 0 {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No results match your filters",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )),
            Line::from(Span::styled(
                "Press c to clear",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(empty, chunks[1]);
        return;
    }

    let header_cells = E::HEADERS.iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows: Vec<Row> = view
        .engine
        .current_visible()
        .iter()
        .map(|entity| Row::new(entity.cells().into_iter().map(Cell::from)).height(1))
        .collect();

    let widths: Vec<Constraint> = E::WIDTHS.iter().map(|w| Constraint::Length(*w)).collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, chunks[1], &mut view.state);
}

fn render_testimonials(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    app.slide_area = Some(chunks[0]);

    let t = app.carousel.current();
    let stars: String = (0..5).map(|i| if i < t.rating { '★' } else { '☆' }).collect();

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(stars, Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            format!("“{}”", t.text),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("[{}] ", t.avatar),
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            ),
            Span::styled(t.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(Span::styled(t.role.clone(), Style::default().fg(Color::Gray))),
        Line::from(Span::styled(t.location.clone(), Style::default().fg(Color::DarkGray))),
    ];

    let slide = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green))
                .title(" What our traders say "),
        );
    f.render_widget(slide, chunks[0]);

    let mut dots = vec![];
    for i in 0..app.carousel.len() {
        let (glyph, color) = if i == app.carousel.current_index() {
            ("●", Color::Green)
        } else {
            ("○", Color::DarkGray)
        };
        dots.push(Span::styled(format!("{} ", glyph), Style::default().fg(color)));
    }
    dots.push(Span::raw("   "));
    dots.push(if app.carousel.is_playing() {
        Span::styled("▶ autoplay", Style::default().fg(Color::Green))
    } else {
        Span::styled("⏸ paused", Style::default().fg(Color::Yellow))
    });

    let controls = Paragraph::new(Line::from(dots))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(controls, chunks[1]);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));

    let mut status_spans = vec![Span::raw(" ")];

    if let Some(status) = &app.status {
        status_spans.push(Span::styled(status.clone(), Style::default().fg(Color::Green)));
        status_spans.push(Span::raw(" | "));
    }

    match (app.current_page, app.input_mode) {
        (Page::Testimonials, _) => {
            status_spans.extend([
                key("←/→"),
                Span::raw(" Slide | "),
                key("1-9"),
                Span::raw(" Jump | "),
                key("p"),
                Span::raw(" Autoplay | "),
            ]);
        }
        (_, InputMode::Search) => {
            status_spans.extend([key("Enter/Esc"), Span::raw(" Done typing | ")]);
        }
        (_, InputMode::Browse) => {
            status_spans.extend([
                key("/"),
                Span::raw(" Search | "),
                key("f"),
                Span::raw(" Facet | "),
                key("Space"),
                Span::raw(" Value | "),
                key("c"),
                Span::raw(" Clear | "),
                key("Enter"),
                Span::raw(" Open | "),
            ]);
        }
    }

    status_spans.extend([
        key("Tab"),
        Span::raw(" Page | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ]);

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
