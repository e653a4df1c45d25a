use std::collections::HashSet;
use std::mem;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use tracing::{error, warn};

use crate::db::ProductStore;
use crate::models::{Column, Product, ProductQuery, SortDirection, SortOrder};
use crate::settings::Settings;

use super::forms::{ConfirmDelete, ProductForm};
use super::helpers::{centered_rect, format_price, surface_error};
use super::theme::{Palette, Theme};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Header space for the title and the active search/sort summary.
const HEADER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 10;

/// Fine-grained modes layered over the product table.
enum Mode {
    Normal,
    Adding(ProductForm),
    Updating { id: i64, form: ProductForm },
    ConfirmDelete(ConfirmDelete),
    Searching(SearchState),
}

/// State for an active inline search. `previous` is restored on Esc.
struct SearchState {
    query: String,
    previous: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self, palette: &Palette) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(palette.info),
            StatusKind::Error => Style::default().fg(palette.error),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    store: ProductStore,
    products: Vec<Product>,
    selected: usize,
    marked: HashSet<i64>,
    search: String,
    sort: Option<SortOrder>,
    mode: Mode,
    status: Option<StatusMessage>,
    theme: Theme,
    settings: Settings,
    settings_path: PathBuf,
}

impl App {
    pub fn new(
        store: ProductStore,
        products: Vec<Product>,
        settings: Settings,
        settings_path: PathBuf,
    ) -> Self {
        let theme = Theme::from_name(&settings.theme).unwrap_or_else(|| {
            warn!(theme = %settings.theme, "unknown theme, falling back to darkly");
            Theme::Darkly
        });

        Self {
            store,
            products,
            selected: 0,
            marked: HashSet::new(),
            search: String::new(),
            sort: None,
            mode: Mode::Normal,
            status: None,
            theme,
            settings,
            settings_path,
        }
    }

    /// Rows currently on screen, in display order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn selected_product(&self) -> Option<&Product> {
        self.products.get(self.selected)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Text of the current status line, if any.
    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|status| status.text.as_str())
    }

    /// The read request matching the UI's current search and sort.
    pub fn current_query(&self) -> ProductQuery {
        ProductQuery::all()
            .with_search(self.search.clone())
            .with_sort(self.sort)
    }

    /// Process one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Adding(form) => self.handle_add(code, form)?,
            Mode::Updating { id, form } => self.handle_update(code, id, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    /// Surface an error that escaped a key handler without ending the session.
    pub(crate) fn report_error(&mut self, err: &anyhow::Error) {
        error!("{err:#}");
        self.set_status(surface_error(err), StatusKind::Error);
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                if self.search.is_empty() {
                    *exit = true;
                } else {
                    self.apply_search(String::new())?;
                    self.set_status("Search cleared.", StatusKind::Info);
                }
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.move_selection(PAGE_STEP),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.products.len().saturating_sub(1),
            KeyCode::Char(' ') => self.toggle_mark(),
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return Ok(Mode::Adding(ProductForm::default()));
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(product) = self.selected_product() {
                    let mode = Mode::Updating {
                        id: product.id,
                        form: ProductForm::from_product(product),
                    };
                    self.clear_status();
                    return Ok(mode);
                }
                self.set_status("Select a row to update!", StatusKind::Error);
            }
            KeyCode::Char('-') | KeyCode::Char('d') => {
                let targets = self.delete_targets();
                if targets.is_empty() {
                    self.set_status("Select a row to delete!", StatusKind::Error);
                } else {
                    let confirm = ConfirmDelete::from_products(&targets);
                    self.clear_status();
                    return Ok(Mode::ConfirmDelete(confirm));
                }
            }
            KeyCode::Char('f') | KeyCode::Char('/') => {
                return Ok(Mode::Searching(SearchState {
                    query: self.search.clone(),
                    previous: self.search.clone(),
                }));
            }
            KeyCode::Char('1') => self.sort_by(Column::Name)?,
            KeyCode::Char('2') => self.sort_by(Column::Quantity)?,
            KeyCode::Char('3') => self.sort_by(Column::Price)?,
            KeyCode::Char('0') => {
                self.sort = None;
                self.refresh(self.selected_id())?;
                self.set_status("Sorting cleared.", StatusKind::Info);
            }
            KeyCode::Char('r') => {
                self.refresh(self.selected_id())?;
                self.set_status("Reloaded.", StatusKind::Info);
            }
            KeyCode::Char('t') => self.cycle_theme(),
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_add(&mut self, code: KeyCode, mut form: ProductForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_product(&form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::Adding(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_update(&mut self, code: KeyCode, id: i64, mut form: ProductForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Update cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_existing_product(id, &form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::Updating { id, form })
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&confirm) {
                    Ok(_) => Ok(Mode::Normal),
                    Err(err) => {
                        error!("{err:#}");
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Ok(Mode::Normal)
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.apply_search(state.previous)?;
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => {
                let count = self.products.len();
                self.set_status(format!("{count} product(s) found."), StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Up => {
                self.move_selection(-1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Down => {
                self.move_selection(1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => state.query.push(ch),
            _ => return Ok(Mode::Searching(state)),
        }

        if let Err(err) = self.apply_search(state.query.clone()) {
            self.report_error(&err);
        }
        Ok(Mode::Searching(state))
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let palette = self.theme.palette();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0], &palette);
        self.draw_table(frame, chunks[1], &palette);
        self.draw_footer(frame, chunks[2], &palette);

        match &self.mode {
            Mode::Adding(form) => self.draw_product_form(frame, area, "Add Product", form, &palette),
            Mode::Updating { id, form } => {
                let title = format!("Update Product #{id}");
                self.draw_product_form(frame, area, &title, form, &palette)
            }
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm, &palette),
            Mode::Searching(state) => self.draw_search_bar(frame, chunks[0], state, &palette),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let search = if self.search.trim().is_empty() {
            Span::raw("none")
        } else {
            Span::styled(format!("\"{}\"", self.search), palette.key())
        };
        let sort = match self.sort {
            Some(order) => format!("{} {}", order.column.label(), order.direction.arrow()),
            None => "none".to_string(),
        };

        let line = Line::from(vec![
            Span::raw("Search: "),
            search,
            Span::raw("   Sort: "),
            Span::raw(sort),
            Span::raw(format!("   Marked: {}", self.marked.len())),
        ]);

        let block = Block::default()
            .title(" Inventory ")
            .borders(Borders::ALL)
            .border_style(palette.border());
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default()
            .title(" Summary ")
            .borders(Borders::ALL)
            .border_style(palette.border());

        if self.products.is_empty() {
            let text = if self.search.trim().is_empty() {
                "No products yet. Press '+' to add one."
            } else {
                "No products match the current search."
            };
            let message = Paragraph::new(text).alignment(Alignment::Center).block(block);
            frame.render_widget(message, area);
            return;
        }

        let mut headers = vec![Cell::from("ID")];
        for column in Column::ALL {
            let label = match self.sort {
                Some(order) if order.column == column => {
                    format!("{} {}", column.label(), order.direction.arrow())
                }
                _ => column.label().to_string(),
            };
            headers.push(Cell::from(label));
        }
        let header = Row::new(headers).style(palette.header());

        let rows = self.products.iter().map(|product| {
            let marked = self.marked.contains(&product.id);
            let id = if marked {
                format!("*{}", product.id)
            } else {
                product.id.to_string()
            };
            let row = Row::new(vec![
                Cell::from(id),
                Cell::from(product.name.clone()),
                Cell::from(Text::from(product.quantity.to_string()).alignment(Alignment::Right)),
                Cell::from(Text::from(format_price(product.price)).alignment(Alignment::Right)),
            ]);
            if marked {
                row.style(palette.marked_row())
            } else {
                row
            }
        });

        let widths = [
            Constraint::Length(8),
            Constraint::Min(20),
            Constraint::Length(12),
            Constraint::Length(12),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(palette.selected_row())
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default().borders(Borders::TOP).border_style(palette.border());
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style(palette))])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions(palette);

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self, palette: &Palette) -> Line<'static> {
        let key_style = palette.key();
        match &self.mode {
            Mode::Searching(_) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Keep Filter   "),
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            _ => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[Space]", key_style),
                Span::raw(" Mark   "),
                Span::styled("[+]", key_style),
                Span::raw(" Add   "),
                Span::styled("[e]", key_style),
                Span::raw(" Update   "),
                Span::styled("[-]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[f]", key_style),
                Span::raw(" Search   "),
                Span::styled("[1-3]", key_style),
                Span::raw(" Sort   "),
                Span::styled("[t]", key_style),
                Span::raw(format!(" Theme ({})   ", self.theme.name())),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState, palette: &Palette) {
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border())
            .title(" Search ");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);

        let inner = block.inner(area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_product_form(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        form: &ProductForm,
        palette: &Palette,
    ) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(palette.border());
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = Column::ALL
            .iter()
            .map(|column| form.build_line(*column))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(palette.error),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let row = Column::ALL
            .iter()
            .position(|column| *column == form.active)
            .unwrap_or(0) as u16;
        let prefix = format!("{}: ", form.active.label()).len() as u16;
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + row,
        ));
    }

    fn draw_confirm_delete(
        &self,
        frame: &mut Frame,
        area: Rect,
        confirm: &ConfirmDelete,
        palette: &Palette,
    ) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL)
            .border_style(palette.border());
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(confirm.summary.clone()),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn save_new_product(&mut self, form: &ProductForm) -> Result<()> {
        let draft = form.parse_inputs()?;
        let id = self.store.insert(&draft)?;
        self.refresh(Some(id)).context("failed to refresh products")?;
        self.set_status("Entry added successfully.", StatusKind::Info);
        Ok(())
    }

    fn save_existing_product(&mut self, id: i64, form: &ProductForm) -> Result<()> {
        let draft = form.parse_inputs()?;
        if !self.store.update(id, &draft)? {
            return Err(anyhow!("No product with id {id}."));
        }
        self.refresh(Some(id)).context("failed to refresh products")?;
        self.set_status("Entry updated successfully.", StatusKind::Info);
        Ok(())
    }

    fn perform_delete(&mut self, confirm: &ConfirmDelete) -> Result<()> {
        let deleted = self.store.delete(&confirm.ids)?;
        for id in &confirm.ids {
            self.marked.remove(id);
        }
        self.refresh(None).context("failed to refresh products")?;
        let noun = if deleted == 1 { "entry" } else { "entries" };
        self.set_status(format!("Deleted {deleted} {noun}."), StatusKind::Info);
        Ok(())
    }

    /// Re-read the table with the current search and sort. On failure the
    /// rows from the last successful read stay on screen.
    fn refresh(&mut self, focus_id: Option<i64>) -> Result<()> {
        let products = self.store.fetch(&self.current_query())?;
        self.show_products(products, focus_id);
        Ok(())
    }

    /// Switch to a different search term. The term is only kept once the
    /// matching rows were fetched, so header and table never disagree.
    fn apply_search(&mut self, search: String) -> Result<()> {
        let query = ProductQuery::all()
            .with_search(search.clone())
            .with_sort(self.sort);
        let products = self.store.fetch(&query)?;
        self.search = search;
        self.show_products(products, None);
        Ok(())
    }

    fn show_products(&mut self, products: Vec<Product>, focus_id: Option<i64>) {
        self.products = products;
        let visible: HashSet<i64> = self.products.iter().map(|p| p.id).collect();
        self.marked.retain(|id| visible.contains(id));

        if self.products.is_empty() {
            self.selected = 0;
            return;
        }

        if let Some(id) = focus_id {
            if let Some(idx) = self.products.iter().position(|p| p.id == id) {
                self.selected = idx;
                return;
            }
        }

        if self.selected >= self.products.len() {
            self.selected = self.products.len() - 1;
        }
    }

    /// Sort by `column`, flipping the direction when it is already the sort
    /// column.
    fn sort_by(&mut self, column: Column) -> Result<()> {
        let direction = match self.sort {
            Some(order) if order.column == column => order.direction.flipped(),
            _ => SortDirection::Ascending,
        };
        self.sort = Some(SortOrder { column, direction });
        self.refresh(self.selected_id())?;
        self.set_status(
            format!("Sorted by {} {}.", column.label(), direction.arrow()),
            StatusKind::Info,
        );
        Ok(())
    }

    fn cycle_theme(&mut self) {
        let next = self.theme.next();
        match self.settings.set_theme(next.name(), &self.settings_path) {
            Ok(()) => {
                self.theme = next;
                self.set_status(format!("Theme set to {}.", next.name()), StatusKind::Info);
            }
            Err(err) => {
                error!("{err}");
                self.set_status(err.to_string(), StatusKind::Error);
            }
        }
    }

    /// Marked rows when any are marked, otherwise the row under the cursor.
    fn delete_targets(&self) -> Vec<&Product> {
        if self.marked.is_empty() {
            return self.selected_product().into_iter().collect();
        }
        self.products
            .iter()
            .filter(|p| self.marked.contains(&p.id))
            .collect()
    }

    fn toggle_mark(&mut self) {
        if let Some(id) = self.selected_id() {
            if !self.marked.remove(&id) {
                self.marked.insert(id);
            }
            self.move_selection(1);
        }
    }

    fn selected_id(&self) -> Option<i64> {
        self.selected_product().map(|p| p.id)
    }

    fn move_selection(&mut self, offset: isize) {
        if self.products.is_empty() {
            return;
        }
        let last = self.products.len() as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }
}
