use crate::db::{Predicate, SortSpec};
use crate::models::{Customer, CustomerField};

/// Fixed number of rows shown per page of the customer table.
pub(crate) const PAGE_SIZE: usize = 10;

/// Describes which result set the customer screen currently shows, so the
/// header and footer can name it and 'r' knows there is something to reset.
pub(crate) enum ViewKind {
    All,
    Filtered(Predicate),
    Sorted(SortSpec),
}

impl ViewKind {
    pub(crate) fn title(&self) -> String {
        match self {
            ViewKind::All => "Customers".to_string(),
            ViewKind::Filtered(predicate) => format!(
                "Customers • {} {} {}",
                predicate.field.label(),
                predicate.op.label(),
                predicate.value
            ),
            ViewKind::Sorted(spec) => format!(
                "Customers • sorted by {} {}",
                spec.field.label(),
                if spec.ascending { "↑" } else { "↓" }
            ),
        }
    }
}

/// State backing the paginated customer table: the loaded result set, an
/// optional incremental search narrowing it, and the selection cursor. The
/// page is derived from the selection so navigation never desyncs the two.
pub(crate) struct CustomerScreen {
    pub(crate) customers: Vec<Customer>,
    pub(crate) filtered: Vec<Customer>,
    pub(crate) search: Option<String>,
    pub(crate) view: ViewKind,
    pub(crate) selected: usize,
}

impl CustomerScreen {
    pub(crate) fn new(customers: Vec<Customer>) -> Self {
        let mut screen = Self {
            filtered: Vec::new(),
            customers,
            search: None,
            view: ViewKind::All,
            selected: 0,
        };
        screen.apply_search();
        screen
    }

    /// Replace the underlying result set, e.g. after a reload, filter, or
    /// sort. The search box keeps narrowing whatever was loaded.
    pub(crate) fn set_customers(&mut self, customers: Vec<Customer>, view: ViewKind) {
        self.customers = customers;
        self.view = view;
        self.apply_search();
    }

    pub(crate) fn set_search(&mut self, search: Option<String>) {
        self.search = search;
        self.apply_search();
    }

    pub(crate) fn apply_search(&mut self) {
        self.filtered = match &self.search {
            Some(q) if !q.trim().is_empty() => self
                .customers
                .iter()
                .filter(|c| c.matches(q))
                .cloned()
                .collect(),
            _ => self.customers.clone(),
        };
        self.ensure_in_bounds();
    }

    pub(crate) fn current_customer(&self) -> Option<&Customer> {
        self.filtered.get(self.selected)
    }

    /// Keep the selection on an id after a reload when it still exists.
    pub(crate) fn focus_id(&mut self, id: i64) {
        if let Some(idx) = self.filtered.iter().position(|c| c.id == id) {
            self.selected = idx;
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.filtered.is_empty() {
            return;
        }
        let len = self.filtered.len() as isize;
        let mut new = self.selected as isize + offset;
        if new < 0 {
            new = 0;
        }
        if new >= len {
            new = len - 1;
        }
        self.selected = new as usize;
    }

    /// Jump a whole page forward or back, landing on the first row of the
    /// target page.
    pub(crate) fn flip_page(&mut self, offset: isize) {
        if self.filtered.is_empty() {
            return;
        }
        let pages = self.page_count() as isize;
        let mut page = (self.selected / PAGE_SIZE) as isize + offset;
        if page < 0 {
            page = 0;
        }
        if page >= pages {
            page = pages - 1;
        }
        self.selected = page as usize * PAGE_SIZE;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        if !self.filtered.is_empty() {
            self.selected = self.filtered.len() - 1;
        }
    }

    /// Zero-based page the selection sits on.
    pub(crate) fn current_page(&self) -> usize {
        self.selected / PAGE_SIZE
    }

    pub(crate) fn page_count(&self) -> usize {
        self.filtered.len().div_ceil(PAGE_SIZE).max(1)
    }

    /// The slice of rows on the current page plus the selected index within
    /// that slice.
    pub(crate) fn page_rows(&self) -> (&[Customer], usize) {
        let start = self.current_page() * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(self.filtered.len());
        (&self.filtered[start..end], self.selected - start)
    }

    pub(crate) fn ensure_in_bounds(&mut self) {
        if self.filtered.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len() - 1;
        }
    }
}

/// State for the count-by-field bar chart view. Holds the grouping field and
/// the counts loaded for it; the app reloads counts whenever the field cycles.
pub(crate) struct ChartScreen {
    pub(crate) field: CustomerField,
    pub(crate) counts: Vec<(String, i64)>,
}

impl ChartScreen {
    pub(crate) fn new(field: CustomerField, counts: Vec<(String, i64)>) -> Self {
        Self { field, counts }
    }
}
