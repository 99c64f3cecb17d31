use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::db::{FilterOp, Predicate, SortSpec};
use crate::models::{Customer, CustomerField};

/// Internal representation of the add/edit customer form fields.
#[derive(Default, Clone)]
pub(crate) struct CustomerForm {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) phone: String,
    pub(crate) active: CustomerFormField,
    pub(crate) error: Option<String>,
}

/// Fields available within the customer form, in focus order.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum CustomerFormField {
    #[default]
    Name,
    Email,
    Phone,
}

impl CustomerForm {
    /// Populate the form from an existing customer when entering edit mode.
    pub(crate) fn from_customer(customer: &Customer) -> Self {
        Self {
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            active: CustomerFormField::Name,
            error: None,
        }
    }

    /// Cycle focus across the three fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            CustomerFormField::Name => CustomerFormField::Email,
            CustomerFormField::Email => CustomerFormField::Phone,
            CustomerFormField::Phone => CustomerFormField::Name,
        };
    }

    /// Insert a character into the active field.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            CustomerFormField::Name => self.name.push(ch),
            CustomerFormField::Email => self.email.push(ch),
            CustomerFormField::Phone => self.phone.push(ch),
        }
        true
    }

    /// Remove a character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            CustomerFormField::Name => {
                self.name.pop();
            }
            CustomerFormField::Email => {
                self.email.pop();
            }
            CustomerFormField::Phone => {
                self.phone.pop();
            }
        }
    }

    /// Validate and normalize form inputs before they are written to the
    /// database. Only the name is mandatory; the store accepts free-form
    /// text for everything.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String, String)> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Customer name is required."));
        }
        Ok((
            name.to_string(),
            self.email.trim().to_string(),
            self.phone.trim().to_string(),
        ))
    }

    /// Render a styled line for the modal form.
    pub(crate) fn build_line(&self, field_name: &str, field: CustomerFormField) -> Line<'static> {
        let (value, is_active) = match field {
            CustomerFormField::Name => (&self.name, self.active == CustomerFormField::Name),
            CustomerFormField::Email => (&self.email, self.active == CustomerFormField::Email),
            CustomerFormField::Phone => (&self.phone, self.active == CustomerFormField::Phone),
        };

        let placeholder = match field {
            CustomerFormField::Name => "<required>",
            CustomerFormField::Email => "<optional>",
            CustomerFormField::Phone => "<optional>",
        };

        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Character length of the requested field, for cursor placement.
    pub(crate) fn value_len(&self, field: CustomerFormField) -> usize {
        match field {
            CustomerFormField::Name => self.name.chars().count(),
            CustomerFormField::Email => self.email.chars().count(),
            CustomerFormField::Phone => self.phone.chars().count(),
        }
    }
}

/// State for confirming permanent customer deletion.
#[derive(Clone)]
pub(crate) struct ConfirmCustomerDelete {
    pub(crate) customer: Customer,
}

impl ConfirmCustomerDelete {
    pub(crate) fn from(customer: Customer) -> Self {
        Self { customer }
    }
}

/// Structured filter form: a field picker, an operator picker, and a free
/// value. Field and operator cycle through fixed sets, so the resulting
/// predicate is valid by construction.
#[derive(Clone)]
pub(crate) struct FilterForm {
    pub(crate) field: CustomerField,
    pub(crate) op: FilterOp,
    pub(crate) value: String,
    pub(crate) active: FilterFormField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum FilterFormField {
    Field,
    Op,
    Value,
}

impl Default for FilterForm {
    fn default() -> Self {
        Self {
            field: CustomerField::Name,
            op: FilterOp::Equals,
            value: String::new(),
            active: FilterFormField::Field,
            error: None,
        }
    }
}

impl FilterForm {
    /// Cycle focus across the three form slots.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            FilterFormField::Field => FilterFormField::Op,
            FilterFormField::Op => FilterFormField::Value,
            FilterFormField::Value => FilterFormField::Field,
        };
    }

    /// Advance the focused picker; no-op when the value slot has focus.
    pub(crate) fn cycle_choice(&mut self) {
        match self.active {
            FilterFormField::Field => self.field = self.field.next(),
            FilterFormField::Op => self.op = self.op.next(),
            FilterFormField::Value => {}
        }
    }

    /// Insert a character into the value slot.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if self.active != FilterFormField::Value || ch.is_control() {
            return false;
        }
        self.value.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        if self.active == FilterFormField::Value {
            self.value.pop();
        }
    }

    /// Build the typed predicate the store consumes. Empty values are allowed
    /// for equals/not-equals (matching blank fields) but meaningless for
    /// contains, where they would select everything.
    pub(crate) fn parse_inputs(&self) -> Result<Predicate> {
        let value = self.value.trim();
        if self.op == FilterOp::Contains && value.is_empty() {
            return Err(anyhow!("Filter value is required for 'contains'."));
        }
        Ok(Predicate::new(self.field, self.op, value))
    }

    /// Render one line of the filter form.
    pub(crate) fn build_line(&self, label: &str, field: FilterFormField) -> Line<'static> {
        let is_active = self.active == field;
        let display = match field {
            FilterFormField::Field => format!("< {} >", self.field.label()),
            FilterFormField::Op => format!("< {} >", self.op.label()),
            FilterFormField::Value => {
                if self.value.is_empty() {
                    "<value>".to_string()
                } else {
                    self.value.clone()
                }
            }
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if field == FilterFormField::Value && self.value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{label}: ")),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self) -> usize {
        self.value.chars().count()
    }
}

/// Sort picker: cycles the attribute with ←/→ and flips direction with ↑/↓.
#[derive(Clone)]
pub(crate) struct SortPicker {
    pub(crate) field: CustomerField,
    pub(crate) ascending: bool,
}

impl SortPicker {
    /// Start from the last applied sort, or name ascending by default.
    pub(crate) fn from_spec(spec: Option<SortSpec>) -> Self {
        match spec {
            Some(spec) => Self {
                field: spec.field,
                ascending: spec.ascending,
            },
            None => Self {
                field: CustomerField::Name,
                ascending: true,
            },
        }
    }

    pub(crate) fn cycle_field(&mut self) {
        self.field = self.field.next();
    }

    pub(crate) fn flip_direction(&mut self) {
        self.ascending = !self.ascending;
    }

    pub(crate) fn spec(&self) -> SortSpec {
        SortSpec::new(self.field, self.ascending)
    }

    pub(crate) fn direction_label(&self) -> &'static str {
        if self.ascending {
            "ascending"
        } else {
            "descending"
        }
    }
}

/// State for an active inline search over the customer list.
pub(crate) struct SearchState {
    pub(crate) query: String,
}
