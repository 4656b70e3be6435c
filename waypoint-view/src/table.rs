//! Sorted and filtered version table
//!
//! [`TableModel`] keeps two row sets: every row in the order of the last
//! sort, and the subset passing the current filter. [`VersionsTable`] wraps
//! a model and keeps it in step with a [`Filter`].

use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use waypoint_core::domain::version::VersionItem;

use crate::filter::{Filter, FilterCriteria, FilterSubscription};

/// Column a sort request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    /// Pipeline name
    Name,
    /// Build number deployed to the environment with this id
    Environment(u32),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// What the renderer should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableView<'a> {
    /// Rows to draw; may be empty when there is no data at all
    Items(&'a [VersionItem]),
    /// A filter is active and nothing passes it
    NoMatchingItems,
}

/// Row sets behind the version table
#[derive(Debug, Clone, Default)]
pub struct TableModel {
    sorted_items: Vec<VersionItem>,
    filtered_items: Vec<VersionItem>,
    criteria: FilterCriteria,
    filtering: bool,
    sort: Option<(SortColumn, SortOrder)>,
}

impl TableModel {
    pub fn new(items: Vec<VersionItem>) -> Self {
        let mut model = Self::default();
        model.set_items(items);
        model
    }

    /// Replace every row, e.g. after a fresh fetch
    ///
    /// Rows take the new source order; any previous sort is forgotten and the
    /// current filter is applied again.
    pub fn set_items(&mut self, items: Vec<VersionItem>) {
        self.sorted_items = items;
        self.sort = None;
        self.refilter();
    }

    /// Stable-sort all rows by a column, then re-apply the filter
    ///
    /// Ascending, rows without a cell for an environment column come before
    /// rows with one; descending reverses that.
    pub fn apply_sort(&mut self, column: SortColumn, order: SortOrder) {
        self.sorted_items.sort_by(|a, b| {
            let ordering = compare(column, a, b);
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
        self.sort = Some((column, order));
        debug!("Sorted {} row(s) by {:?} {:?}", self.sorted_items.len(), column, order);
        self.refilter();
    }

    /// Filter the sorted rows with new criteria
    pub fn apply_filter(&mut self, criteria: &FilterCriteria) {
        self.criteria = criteria.clone();
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtering = self.criteria.is_active();
        self.filtered_items = if self.filtering {
            self.sorted_items
                .iter()
                .filter(|item| self.criteria.matches(item))
                .cloned()
                .collect()
        } else {
            self.sorted_items.clone()
        };
    }

    pub fn sorted_items(&self) -> &[VersionItem] {
        &self.sorted_items
    }

    pub fn filtered_items(&self) -> &[VersionItem] {
        &self.filtered_items
    }

    /// Whether the last applied criteria constrain anything
    pub fn is_filtering(&self) -> bool {
        self.filtering
    }

    pub fn sort(&self) -> Option<(SortColumn, SortOrder)> {
        self.sort
    }

    pub fn view(&self) -> TableView<'_> {
        if self.filtering && self.filtered_items.is_empty() {
            TableView::NoMatchingItems
        } else {
            TableView::Items(&self.filtered_items)
        }
    }
}

fn compare(column: SortColumn, a: &VersionItem, b: &VersionItem) -> Ordering {
    match column {
        SortColumn::Name => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
        SortColumn::Environment(id) => {
            let a = a.environment(id).map(|env| env.build_number.as_str());
            let b = b.environment(id).map(|env| env.build_number.as_str());
            a.cmp(&b)
        }
    }
}

/// A [`TableModel`] that follows a [`Filter`] for as long as it lives
pub struct VersionsTable {
    model: Arc<Mutex<TableModel>>,
    _subscription: FilterSubscription,
}

impl VersionsTable {
    /// Build the table and start listening to `filter`
    ///
    /// The filter's current criteria are applied right away.
    pub fn attach(filter: &Arc<Filter>, items: Vec<VersionItem>) -> Self {
        let mut model = TableModel::new(items);
        model.apply_filter(&filter.criteria());
        let model = Arc::new(Mutex::new(model));

        let weak = Arc::downgrade(&model);
        let subscription = filter.subscribe(move |criteria| {
            if let Some(model) = weak.upgrade() {
                lock(&model).apply_filter(criteria);
            }
        });

        Self {
            model,
            _subscription: subscription,
        }
    }

    pub fn apply_sort(&self, column: SortColumn, order: SortOrder) {
        lock(&self.model).apply_sort(column, order);
    }

    pub fn replace_items(&self, items: Vec<VersionItem>) {
        lock(&self.model).set_items(items);
    }

    /// Run `render` against a snapshot of the current view
    ///
    /// The lock is released before `render` runs, so it may change the
    /// filter; such changes show up on the next call.
    pub fn render<R>(&self, render: impl FnOnce(TableView<'_>) -> R) -> R {
        let snapshot = lock(&self.model).clone();
        render(snapshot.view())
    }

    pub fn filtered_items(&self) -> Vec<VersionItem> {
        lock(&self.model).filtered_items().to_vec()
    }

    pub fn is_filtering(&self) -> bool {
        lock(&self.model).is_filtering()
    }
}

fn lock(model: &Mutex<TableModel>) -> MutexGuard<'_, TableModel> {
    model.lock().unwrap_or_else(PoisonError::into_inner)
}
