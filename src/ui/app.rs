//! Browser state and event loop for the import tree viewer.
//!
//! [`App`] holds the [`ImportTree`] being browsed together with its
//! expandable view. Key handling lives on `App` itself so the event loop in
//! [`run_app`] only draws and forwards keys.

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};

use super::tree::{FlattenedNode, TreeNode};
use crate::graph::ImportTree;

const CHAIN_SEPARATOR: &str = " → ";

/// State of the import tree browser
pub struct App {
    /// The import tree being browsed
    pub imports: ImportTree,
    /// Expandable view of `imports`
    pub tree: TreeNode,
    /// Visible rows of `tree`, in display order
    pub rows: Vec<FlattenedNode>,
    /// Substring that rows must contain; empty shows every row
    pub query: String,
    /// Whether keys are being typed into `query`
    pub editing_query: bool,
    /// Indices into `rows` matching `query`
    matches: Vec<usize>,
    /// Position of the cursor in the shown rows
    pub selected: usize,
    /// Rows that fit in the list, updated on every draw
    page_height: usize,
    list_state: ListState,
    /// Packages pruned during this session, in order
    pub pruned: Vec<String>,
    /// Message shown in the footer after an action
    pub status: Option<String>,
    /// Set once the user asks to leave
    pub should_quit: bool,
}

impl App {
    /// Create a browser for the given import tree
    pub fn new(imports: ImportTree) -> Self {
        let tree = TreeNode::from_import_tree(&imports);
        let rows = tree.flatten();
        Self {
            imports,
            tree,
            rows,
            query: String::new(),
            editing_query: false,
            matches: Vec::new(),
            selected: 0,
            page_height: 1,
            list_state: ListState::default(),
            pruned: Vec::new(),
            status: None,
            should_quit: false,
        }
    }

    fn is_filtered(&self) -> bool {
        !self.query.is_empty()
    }

    /// Number of rows currently shown
    pub fn shown_len(&self) -> usize {
        if self.is_filtered() {
            self.matches.len()
        } else {
            self.rows.len()
        }
    }

    /// Index into `rows` of the shown row at `position`
    fn row_index(&self, position: usize) -> Option<usize> {
        if self.is_filtered() {
            self.matches.get(position).copied()
        } else {
            (position < self.rows.len()).then_some(position)
        }
    }

    /// The row under the cursor
    pub fn selected_row(&self) -> Option<&FlattenedNode> {
        self.row_index(self.selected).and_then(|i| self.rows.get(i))
    }

    /// Moves the cursor by `delta` rows, stopping at either end
    pub fn move_selection(&mut self, delta: isize) {
        let last = self.shown_len().saturating_sub(1);
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    fn move_pages(&mut self, pages: isize) {
        let height = self.page_height.max(1) as isize;
        self.move_selection(pages * height);
    }

    /// Expands or collapses the package under the cursor
    pub fn toggle_selected(&mut self) {
        let Some(index) = self.row_index(self.selected) else {
            return;
        };
        if self.tree.toggle_at_index(index) {
            self.refresh_rows();
        }
    }

    /// Removes the package under the cursor from the import tree
    ///
    /// Packages imported only through it go too; packages with another
    /// importer stay. The root cannot be pruned.
    pub fn prune_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let (id, name) = (row.node_id, row.name.clone());

        if id == self.imports.root() {
            self.status = Some(format!("{name} is the root package and cannot be pruned"));
            return;
        }

        let before = self.imports.node_count();
        self.imports.remove_node_recursively(id);
        let left = self.imports.node_count();

        let expanded = self.tree.expanded_names();
        self.tree = TreeNode::from_import_tree(&self.imports);
        self.tree.restore_expanded(&expanded);
        self.refresh_rows();

        self.status = Some(format!(
            "Pruned {name} ({} packages removed, {left} left)",
            before - left
        ));
        self.pruned.push(name);
    }

    /// The import chain from the root to the package under the cursor
    pub fn selected_chain(&self) -> Vec<&str> {
        let Some(row) = self.selected_row() else {
            return Vec::new();
        };
        self.imports
            .import_chain(row.node_id)
            .into_iter()
            .filter_map(|id| self.imports.identifier(id))
            .collect()
    }

    fn refresh_rows(&mut self) {
        self.rows = self.tree.flatten();
        self.refresh_matches();
    }

    fn refresh_matches(&mut self) {
        self.matches = if self.is_filtered() {
            self.rows
                .iter()
                .enumerate()
                .filter(|(_, row)| row.name.contains(self.query.as_str()))
                .map(|(i, _)| i)
                .collect()
        } else {
            Vec::new()
        };
        self.move_selection(0);
    }

    fn set_query(&mut self, query: String) {
        self.query = query;
        self.selected = 0;
        self.refresh_matches();
    }

    /// Applies one key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.editing_query {
            match key.code {
                KeyCode::Esc => {
                    self.editing_query = false;
                    self.set_query(String::new());
                }
                KeyCode::Enter => self.editing_query = false,
                KeyCode::Backspace => {
                    let mut query = std::mem::take(&mut self.query);
                    query.pop();
                    self.set_query(query);
                }
                KeyCode::Char(c) => {
                    let query = format!("{}{c}", self.query);
                    self.set_query(query);
                }
                KeyCode::Down => self.move_selection(1),
                KeyCode::Up => self.move_selection(-1),
                _ => {}
            }
            return;
        }

        self.status = None;
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc if self.is_filtered() => self.set_query(String::new()),
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('/') => {
                self.editing_query = true;
                self.set_query(String::new());
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('d') | KeyCode::PageDown => self.move_pages(1),
            KeyCode::Char('u') | KeyCode::PageUp => self.move_pages(-1),
            KeyCode::Char('g') | KeyCode::Home => self.selected = 0,
            KeyCode::Char('G') | KeyCode::End => self.move_selection(isize::MAX),
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('x') | KeyCode::Delete => self.prune_selected(),
            _ => {}
        }
    }
}

/// Run the browser until the user quits
pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| render(frame, app))?;
        if let Event::Key(key) = event::read()? {
            app.handle_key(key);
        }
    }
    Ok(())
}

fn render(frame: &mut Frame, app: &mut App) {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(4),
    ])
    .areas(frame.area());

    let title = Paragraph::new(format!(
        "imptree - Import Tree of {}",
        app.imports.root_node().identifier()
    ))
    .style(Style::default().add_modifier(Modifier::BOLD))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, header);

    render_rows(frame, app, body);
    render_footer(frame, app, footer);
}

/// Style of a package row
///
/// Cycle members are red, repeats are dimmed and the root is bold.
fn row_style(row: &FlattenedNode) -> Style {
    let style = Style::default();
    if row.in_cycle {
        style.fg(Color::Red)
    } else if row.is_repeat {
        style.fg(Color::DarkGray)
    } else if row.depth == 0 {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

/// Splits `name` around the first occurrence of `query`.
fn query_spans(name: &str, query: &str, style: Style) -> Vec<Span<'static>> {
    let Some(start) = name.find(query).filter(|_| !query.is_empty()) else {
        return vec![Span::styled(name.to_string(), style)];
    };
    let end = start + query.len();
    vec![
        Span::styled(name[..start].to_string(), style),
        Span::styled(
            name[start..end].to_string(),
            style.fg(Color::Yellow).add_modifier(Modifier::UNDERLINED),
        ),
        Span::styled(name[end..].to_string(), style),
    ]
}

fn row_line(row: &FlattenedNode, query: &str, filtered: bool) -> Line<'static> {
    let mut spans = Vec::new();
    // guides only make sense over the whole tree
    if !filtered {
        spans.push(Span::styled(row.guide.clone(), Style::default().fg(Color::DarkGray)));
    }
    spans.push(Span::raw(row.expansion_indicator()));
    spans.extend(query_spans(&row.name, query, row_style(row)));
    if row.is_repeat {
        spans.push(Span::styled(" (*)", Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

fn render_rows(frame: &mut Frame, app: &mut App, area: Rect) {
    app.page_height = usize::from(area.height.saturating_sub(2));

    let filtered = app.is_filtered();
    let items: Vec<ListItem> = (0..app.shown_len())
        .filter_map(|pos| app.row_index(pos))
        .filter_map(|i| app.rows.get(i))
        .map(|row| ListItem::new(row_line(row, &app.query, filtered)))
        .collect();

    let title = if app.editing_query {
        format!("Find: {}_", app.query)
    } else if filtered {
        format!("Packages containing \"{}\" ({})", app.query, app.matches.len())
    } else {
        format!("Packages ({} in tree)", app.imports.node_count())
    };

    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    app.list_state.select(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let info = match &app.status {
        Some(status) => Line::styled(status.clone(), Style::default().fg(Color::Yellow)),
        None => Line::raw(app.selected_chain().join(CHAIN_SEPARATOR)),
    };
    let keys = if app.editing_query {
        "type to filter  Enter keep  Esc clear"
    } else {
        "j/k move  d/u page  Enter expand  / find  x prune  q quit  (*) shown above"
    };

    let footer = Paragraph::new(vec![
        info,
        Line::styled(keys, Style::default().fg(Color::DarkGray)),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
