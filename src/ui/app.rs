use std::env;
use std::mem;

use anyhow::{Context, Error, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::db::CustomerStore;
use crate::export::{export_customers, ExportFormat};
use crate::models::{Customer, CustomerField};

use super::forms::{
    ConfirmCustomerDelete, CustomerForm, CustomerFormField, FilterForm, FilterFormField,
    SearchState, SortPicker,
};
use super::helpers::{centered_rect, surface_error, truncate_cell};
use super::screens::{ChartScreen, CustomerScreen, ViewKind};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Column width for the id cell in the customer table.
const ID_COLUMN_WIDTH: usize = 6;
/// Column width for the phone cell; the rest is split between name and email.
const PHONE_COLUMN_WIDTH: usize = 16;
/// Longest bar drawn in the chart view, in cells.
const CHART_BAR_WIDTH: usize = 40;

/// High-level navigation states. Keeping this explicit makes it easy to
/// reason about which rendering path runs and what keyboard shortcuts do.
enum Screen {
    Customers,
    Charts(ChartScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    AddingCustomer(CustomerForm),
    EditingCustomer { id: i64, form: CustomerForm },
    ConfirmDelete(ConfirmCustomerDelete),
    Filtering(FilterForm),
    PickingSort(SortPicker),
    Searching(SearchState),
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
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI. Owns the store outright;
/// there is no other handle to the database in the process.
pub struct App {
    store: CustomerStore,
    list: CustomerScreen,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: CustomerStore, customers: Vec<Customer>) -> Self {
        Self {
            store,
            list: CustomerScreen::new(customers),
            screen: Screen::Customers,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingCustomer(form) => self.handle_add_customer(code, form)?,
            Mode::EditingCustomer { id, form } => self.handle_edit_customer(code, id, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::Filtering(form) => self.handle_filter(code, form)?,
            Mode::PickingSort(picker) => self.handle_sort_picker(code, picker)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Customers => {
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        *exit = true;
                    }
                    KeyCode::Up => self.list.move_selection(-1),
                    KeyCode::Down => self.list.move_selection(1),
                    KeyCode::Left | KeyCode::PageUp => self.list.flip_page(-1),
                    KeyCode::Right | KeyCode::PageDown => self.list.flip_page(1),
                    KeyCode::Home => self.list.select_first(),
                    KeyCode::End => self.list.select_last(),
                    KeyCode::Char('+') => {
                        self.clear_status();
                        return Ok(Mode::AddingCustomer(CustomerForm::default()));
                    }
                    KeyCode::Char('e') | KeyCode::Char('E') => {
                        if let Some(customer) = self.list.current_customer().cloned() {
                            self.clear_status();
                            return Ok(Mode::EditingCustomer {
                                id: customer.id,
                                form: CustomerForm::from_customer(&customer),
                            });
                        } else {
                            self.set_status("No customer selected to edit.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('-') => {
                        if let Some(customer) = self.list.current_customer().cloned() {
                            self.clear_status();
                            return Ok(Mode::ConfirmDelete(ConfirmCustomerDelete::from(customer)));
                        } else {
                            self.set_status("No customer selected to remove.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('f') => {
                        return Ok(Mode::Searching(SearchState {
                            query: String::new(),
                        }));
                    }
                    KeyCode::Char('l') | KeyCode::Char('L') => {
                        self.clear_status();
                        return Ok(Mode::Filtering(FilterForm::default()));
                    }
                    KeyCode::Char('o') | KeyCode::Char('O') => {
                        self.clear_status();
                        let last = match &self.list.view {
                            ViewKind::Sorted(spec) => Some(*spec),
                            _ => None,
                        };
                        return Ok(Mode::PickingSort(SortPicker::from_spec(last)));
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => match self.reload_all(None) {
                        Ok(()) => self.set_status("Showing all customers.", StatusKind::Info),
                        Err(err) => {
                            let message = surface_error(&err);
                            self.set_status(message, StatusKind::Error);
                        }
                    },
                    KeyCode::Char('c') | KeyCode::Char('C') => {
                        self.clear_status();
                        if let Err(err) = self.open_charts() {
                            let message = surface_error(&err);
                            self.set_status(message, StatusKind::Error);
                        }
                    }
                    KeyCode::Char('x') => self.export(ExportFormat::Csv),
                    KeyCode::Char('X') => self.export(ExportFormat::Spreadsheet),
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Charts(ref chart) => {
                let mut back = false;
                let mut next_field = None;
                match code {
                    KeyCode::Char('q') => {
                        *exit = true;
                    }
                    KeyCode::Esc | KeyCode::Char('c') | KeyCode::Char('C') => {
                        back = true;
                    }
                    KeyCode::Tab => next_field = Some(chart.field.next()),
                    _ => {}
                }

                if back {
                    self.clear_status();
                    self.screen = Screen::Customers;
                } else if let Some(field) = next_field {
                    match self.store.count_by(field) {
                        Ok(counts) => {
                            self.screen = Screen::Charts(ChartScreen::new(field, counts));
                        }
                        Err(err) => self.set_status(err.to_string(), StatusKind::Error),
                    }
                }
                Ok(Mode::Normal)
            }
        }
    }

    fn handle_add_customer(&mut self, code: KeyCode, mut form: CustomerForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add customer cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_customer(&form) {
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
            Ok(Mode::AddingCustomer(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_edit_customer(
        &mut self,
        code: KeyCode,
        id: i64,
        mut form: CustomerForm,
    ) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_existing_customer(id, &form) {
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
            Ok(Mode::EditingCustomer { id, form })
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmCustomerDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&confirm) {
                    Ok(_) => Ok(Mode::Normal),
                    Err(err) => {
                        let message = surface_error(&err);
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::ConfirmDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn handle_filter(&mut self, code: KeyCode, mut form: FilterForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Filter cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Left | KeyCode::Right => form.cycle_choice(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.parse_inputs() {
                Ok(predicate) => match self.store.filter(&predicate) {
                    Ok(matches) => {
                        let found = matches.len();
                        self.list
                            .set_customers(matches, ViewKind::Filtered(predicate));
                        self.set_status(
                            format!("{found} customer(s) match the filter."),
                            StatusKind::Info,
                        );
                        keep_open = false;
                    }
                    Err(err) => {
                        let message = err.to_string();
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                },
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
            Ok(Mode::Filtering(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_sort_picker(&mut self, code: KeyCode, mut picker: SortPicker) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Sort cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                picker.cycle_field();
                Ok(Mode::PickingSort(picker))
            }
            KeyCode::Up | KeyCode::Down => {
                picker.flip_direction();
                Ok(Mode::PickingSort(picker))
            }
            KeyCode::Enter => {
                let spec = picker.spec();
                match self.store.sort(spec) {
                    Ok(sorted) => {
                        self.list.set_customers(sorted, ViewKind::Sorted(spec));
                        self.list.select_first();
                        self.set_status(
                            format!(
                                "Sorted by {} {}.",
                                spec.field.label().to_lowercase(),
                                picker.direction_label()
                            ),
                            StatusKind::Info,
                        );
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        self.set_status(err.to_string(), StatusKind::Error);
                        Ok(Mode::PickingSort(picker))
                    }
                }
            }
            _ => Ok(Mode::PickingSort(picker)),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.list.set_search(None);
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => {
                // Commit the narrowed view and drop back to normal keys; Esc
                // from normal mode quits, so the search stays applied until
                // 'r' resets the view or a new search begins.
                let shown = self.list.filtered.len();
                if !state.query.trim().is_empty() {
                    self.set_status(
                        format!("{shown} customer(s) match \"{}\".", state.query.trim()),
                        StatusKind::Info,
                    );
                }
                return Ok(Mode::Normal);
            }
            KeyCode::Up => {
                self.list.move_selection(-1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Down => {
                self.list.move_selection(1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Left | KeyCode::PageUp => {
                self.list.flip_page(-1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Right | KeyCode::PageDown => {
                self.list.flip_page(1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    state.query.push(ch);
                }
            }
            _ => {}
        }

        if state.query.trim().is_empty() {
            self.list.set_search(None);
        } else {
            self.list.set_search(Some(state.query.clone()));
        }

        Ok(Mode::Searching(state))
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Customers => self.draw_customer_table(frame, content_area),
            Screen::Charts(chart) => self.draw_chart(frame, content_area, chart),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingCustomer(form) => {
                self.draw_customer_form(frame, area, "Add Customer", form)
            }
            Mode::EditingCustomer { form, .. } => {
                self.draw_customer_form(frame, area, "Edit Customer", form)
            }
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Filtering(form) => self.draw_filter_form(frame, area, form),
            Mode::PickingSort(picker) => self.draw_sort_picker(frame, area, picker),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::Normal => {}
        }
    }

    fn draw_customer_table(&self, frame: &mut Frame, area: Rect) {
        let title = format!(
            "{} • Page {}/{}",
            self.list.view.title(),
            self.list.current_page() + 1,
            self.list.page_count()
        );
        let block = Block::default().borders(Borders::ALL).title(title);

        if self.list.filtered.is_empty() {
            let message = if self.list.customers.is_empty() {
                "No customers yet. Press '+' to add one."
            } else {
                "No customers match the current search."
            };
            let paragraph = Paragraph::new(message)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let inner_width = area.width.saturating_sub(2) as usize;
        let (rows, selected) = self.list.page_rows();

        let header = format_row(["ID", "Name", "Email", "Phone"], inner_width, false);
        let mut lines = vec![Line::from(Span::styled(
            header,
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        for (idx, customer) in rows.iter().enumerate() {
            let is_selected = idx == selected;
            let style = if is_selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let row = format_row(
                [
                    customer.id.to_string().as_str(),
                    &customer.name,
                    &customer.email,
                    &customer.phone,
                ],
                inner_width,
                is_selected,
            );
            lines.push(Line::from(Span::styled(row, style)));
        }

        let paragraph = Paragraph::new(lines).block(block);
        frame.render_widget(paragraph, area);
    }

    fn draw_chart(&self, frame: &mut Frame, area: Rect, chart: &ChartScreen) {
        let title = format!("Customer Counts • by {}", chart.field.label());
        let block = Block::default().borders(Borders::ALL).title(title);

        if chart.counts.is_empty() {
            let paragraph = Paragraph::new("No customers to chart yet.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let inner_width = area.width.saturating_sub(2) as usize;
        let max_count = chart
            .counts
            .iter()
            .map(|(_, count)| *count)
            .max()
            .unwrap_or(1)
            .max(1);
        let label_width = inner_width.saturating_sub(CHART_BAR_WIDTH + 8).max(8);

        let mut lines = Vec::with_capacity(chart.counts.len());
        for (value, count) in &chart.counts {
            let label = if value.trim().is_empty() {
                "<blank>".to_string()
            } else {
                value.clone()
            };
            let bar_len =
                ((*count as usize * CHART_BAR_WIDTH) / max_count as usize).max(1);
            lines.push(Line::from(vec![
                Span::raw(format!(
                    "{:<label_w$} ",
                    truncate_cell(&label, label_width),
                    label_w = label_width,
                )),
                Span::styled("█".repeat(bar_len), Style::default().fg(Color::Cyan)),
                Span::raw(format!(" {count}")),
            ]));
        }

        let paragraph = Paragraph::new(lines).block(block);
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match (&self.screen, &self.mode) {
            (_, Mode::Searching(_)) => Line::from(vec![
                Span::styled("[Type]", key_style),
                Span::raw(" Narrow   "),
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Keep   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Clear"),
            ]),
            (_, Mode::Filtering(_)) => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Next Slot   "),
                Span::styled("[←→]", key_style),
                Span::raw(" Change   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Apply   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (_, Mode::PickingSort(_)) => Line::from(vec![
                Span::styled("[←→]", key_style),
                Span::raw(" Attribute   "),
                Span::styled("[↑↓]", key_style),
                Span::raw(" Direction   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Apply   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (_, Mode::AddingCustomer(_)) | (_, Mode::EditingCustomer { .. }) => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Switch Field   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Save   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (_, Mode::ConfirmDelete(_)) => Line::from(vec![
                Span::styled("[Y]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[N/Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (Screen::Charts(_), _) => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Group By   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Back   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
            (Screen::Customers, Mode::Normal) => Line::from(vec![
                Span::styled("[+]", key_style),
                Span::raw(" Add  "),
                Span::styled("[e]", key_style),
                Span::raw(" Edit  "),
                Span::styled("[-]", key_style),
                Span::raw(" Delete  "),
                Span::styled("[f]", key_style),
                Span::raw(" Search  "),
                Span::styled("[l]", key_style),
                Span::raw(" Filter  "),
                Span::styled("[o]", key_style),
                Span::raw(" Sort  "),
                Span::styled("[r]", key_style),
                Span::raw(" Reset  "),
                Span::styled("[c]", key_style),
                Span::raw(" Charts  "),
                Span::styled("[x/X]", key_style),
                Span::raw(" Export  "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_customer_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &CustomerForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let name_line = form.build_line("Name", CustomerFormField::Name);
        let email_line = form.build_line("Email", CustomerFormField::Email);
        let phone_line = form.build_line("Phone", CustomerFormField::Phone);

        let mut lines = vec![name_line, email_line, phone_line, Line::from("")];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (cursor_x, cursor_y) = match form.active {
            CustomerFormField::Name => {
                let prefix = "Name: ".len() as u16;
                (
                    inner.x + prefix + form.value_len(CustomerFormField::Name) as u16,
                    inner.y,
                )
            }
            CustomerFormField::Email => {
                let prefix = "Email: ".len() as u16;
                (
                    inner.x + prefix + form.value_len(CustomerFormField::Email) as u16,
                    inner.y + 1,
                )
            }
            CustomerFormField::Phone => {
                let prefix = "Phone: ".len() as u16;
                (
                    inner.x + prefix + form.value_len(CustomerFormField::Phone) as u16,
                    inner.y + 2,
                )
            }
        };
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_filter_form(&self, frame: &mut Frame, area: Rect, form: &FilterForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Filter Customers").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let field_line = form.build_line("Field", FilterFormField::Field);
        let op_line = form.build_line("Operator", FilterFormField::Op);
        let value_line = form.build_line("Value", FilterFormField::Value);

        let mut lines = vec![field_line, op_line, value_line, Line::from("")];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to apply • Tab to switch • ←/→ to change • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if form.active == FilterFormField::Value {
            let prefix = "Value: ".len() as u16;
            let cursor_x = inner.x + prefix + form.value_len() as u16;
            frame.set_cursor_position((cursor_x, inner.y + 2));
        }
    }

    fn draw_sort_picker(&self, frame: &mut Frame, area: Rect, picker: &SortPicker) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Sort Customers").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(vec![
                Span::raw("Attribute: "),
                Span::styled(
                    format!("< {} >", picker.field.label()),
                    Style::default().fg(Color::Yellow),
                ),
            ]),
            Line::from(vec![
                Span::raw("Direction: "),
                Span::styled(
                    format!("< {} >", picker.direction_label()),
                    Style::default().fg(Color::Yellow),
                ),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "←/→ attribute • ↑/↓ direction • Enter to apply • Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmCustomerDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete customer #{} ({})?",
                confirm.customer.id, confirm.customer.name
            )),
            Line::from("This removes the record permanently."),
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

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        let cursor_y = inner.y;
        frame.set_cursor_position((cursor_x, cursor_y));
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

    fn save_new_customer(&mut self, form: &CustomerForm) -> Result<()> {
        let (name, email, phone) = form.parse_inputs()?;
        let customer = self.store.create(&name, &email, &phone)?;
        self.reload_all(Some(customer.id))?;
        self.set_status(format!("Customer '{name}' added."), StatusKind::Info);
        Ok(())
    }

    fn save_existing_customer(&mut self, id: i64, form: &CustomerForm) -> Result<()> {
        let (name, email, phone) = form.parse_inputs()?;
        self.store.update(id, &name, &email, &phone)?;
        self.reload_view(Some(id))?;
        self.set_status(format!("Customer '{name}' updated."), StatusKind::Info);
        Ok(())
    }

    fn perform_delete(&mut self, confirm: &ConfirmCustomerDelete) -> Result<()> {
        self.store.delete(confirm.customer.id)?;
        self.reload_view(None)?;
        self.set_status(
            format!("Customer '{}' deleted.", confirm.customer.name),
            StatusKind::Info,
        );
        Ok(())
    }

    /// Reset to the unfiltered, id-ordered view.
    fn reload_all(&mut self, focus_id: Option<i64>) -> Result<()> {
        let customers = self.store.list_all()?;
        self.list.set_search(None);
        self.list.set_customers(customers, ViewKind::All);
        if let Some(id) = focus_id {
            self.list.focus_id(id);
        }
        Ok(())
    }

    /// Re-run whatever query produced the current view so edits and deletes
    /// show up without discarding an active filter or sort.
    fn reload_view(&mut self, focus_id: Option<i64>) -> Result<()> {
        let (customers, view) = match &self.list.view {
            ViewKind::All => (self.store.list_all()?, ViewKind::All),
            ViewKind::Filtered(predicate) => {
                let predicate = predicate.clone();
                (self.store.filter(&predicate)?, ViewKind::Filtered(predicate))
            }
            ViewKind::Sorted(spec) => (self.store.sort(*spec)?, ViewKind::Sorted(*spec)),
        };
        self.list.set_customers(customers, view);
        if let Some(id) = focus_id {
            self.list.focus_id(id);
        }
        Ok(())
    }

    fn open_charts(&mut self) -> Result<()> {
        let field = CustomerField::Name;
        let counts = self.store.count_by(field)?;
        self.screen = Screen::Charts(ChartScreen::new(field, counts));
        Ok(())
    }

    /// Export the full customer set, not just the visible page or the current
    /// filter.
    fn export(&mut self, format: ExportFormat) {
        let result = self.store.list_all().map_err(Error::from).and_then(|customers| {
            let dir = env::current_dir().context("could not resolve the working directory")?;
            let path = export_customers(&customers, format, &dir)?;
            Ok((customers.len(), path))
        });
        match result {
            Ok((count, path)) => self.set_status(
                format!("Exported {count} customer(s) to {}.", path.display()),
                StatusKind::Info,
            ),
            Err(err) => {
                let message = surface_error(&err);
                self.set_status(message, StatusKind::Error);
            }
        }
    }
}

/// Lay out one table row as `id | name | email | phone` with fixed id/phone
/// columns and the remaining width split between name and email.
fn format_row(cells: [&str; 4], width: usize, selected: bool) -> String {
    let [id, name, email, phone] = cells;
    let pointer = if selected { "▶ " } else { "  " };
    let text_width = width
        .saturating_sub(pointer.chars().count())
        .saturating_sub(ID_COLUMN_WIDTH + PHONE_COLUMN_WIDTH + 3);
    let name_width = text_width / 2;
    let email_width = text_width - name_width;

    format!(
        "{pointer}{:<id_w$} {:<name_w$} {:<email_w$} {:<phone_w$}",
        truncate_cell(id, ID_COLUMN_WIDTH),
        truncate_cell(name, name_width),
        truncate_cell(email, email_width),
        truncate_cell(phone, PHONE_COLUMN_WIDTH),
        id_w = ID_COLUMN_WIDTH,
        name_w = name_width,
        email_w = email_width,
        phone_w = PHONE_COLUMN_WIDTH,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::CustomerStore;

    fn app_with(names: &[&str]) -> App {
        let mut store = CustomerStore::open_in_memory().unwrap();
        for name in names {
            store
                .create(name, &format!("{}@x.com", name.to_lowercase()), "555")
                .unwrap();
        }
        let customers = store.list_all().unwrap();
        App::new(store, customers)
    }

    #[test]
    fn add_form_flow_creates_customer() {
        let mut app = app_with(&[]);
        app.handle_key(KeyCode::Char('+')).unwrap();
        for ch in "Ann".chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.list.customers.len(), 1);
        assert_eq!(app.list.customers[0].name, "Ann");
    }

    #[test]
    fn empty_name_keeps_form_open_with_error() {
        let mut app = app_with(&[]);
        app.handle_key(KeyCode::Char('+')).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        match &app.mode {
            Mode::AddingCustomer(form) => assert!(form.error.is_some()),
            _ => panic!("expected the add form to stay open"),
        }
    }

    #[test]
    fn delete_flow_removes_selected_customer() {
        let mut app = app_with(&["Ann", "Bo"]);
        app.handle_key(KeyCode::Char('-')).unwrap();
        app.handle_key(KeyCode::Char('y')).unwrap();
        assert_eq!(app.list.customers.len(), 1);
        assert_eq!(app.list.customers[0].name, "Bo");
    }

    #[test]
    fn search_narrows_then_esc_clears() {
        let mut app = app_with(&["Ann", "Bo"]);
        app.handle_key(KeyCode::Char('f')).unwrap();
        app.handle_key(KeyCode::Char('a')).unwrap();
        app.handle_key(KeyCode::Char('n')).unwrap();
        assert_eq!(app.list.filtered.len(), 1);
        app.handle_key(KeyCode::Esc).unwrap();
        assert_eq!(app.list.filtered.len(), 2);
    }

    #[test]
    fn sort_picker_applies_descending_order() {
        let mut app = app_with(&["Ann", "Bo"]);
        app.handle_key(KeyCode::Char('o')).unwrap();
        app.handle_key(KeyCode::Up).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        let names: Vec<_> = app.list.filtered.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Bo", "Ann"]);
    }

    #[test]
    fn quit_key_exits_from_customer_list() {
        let mut app = app_with(&[]);
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }

    #[test]
    fn store_errors_surface_in_footer_instead_of_exiting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customers.sqlite");
        let mut store = CustomerStore::open_path(&path).unwrap();
        store.create("Ann", "ann@x.com", "111").unwrap();
        let customers = store.list_all().unwrap();
        let mut app = App::new(store, customers);

        // Break the database behind the app's back so every query fails.
        rusqlite::Connection::open(&path)
            .unwrap()
            .execute("DROP TABLE customers", [])
            .unwrap();

        app.handle_key(KeyCode::Char('o')).unwrap();
        assert!(!app.handle_key(KeyCode::Enter).unwrap());
        assert!(matches!(
            app.status,
            Some(StatusMessage {
                kind: StatusKind::Error,
                ..
            })
        ));
        assert!(matches!(app.mode, Mode::PickingSort(_)));

        app.handle_key(KeyCode::Esc).unwrap();
        assert!(!app.handle_key(KeyCode::Char('r')).unwrap());
        assert!(matches!(
            app.status,
            Some(StatusMessage {
                kind: StatusKind::Error,
                ..
            })
        ));

        assert!(!app.handle_key(KeyCode::Char('c')).unwrap());
        assert!(matches!(app.screen, Screen::Customers));
        assert!(matches!(
            app.status,
            Some(StatusMessage {
                kind: StatusKind::Error,
                ..
            })
        ));
    }
}
