//! Filter criteria and change subscriptions
//!
//! A [`Filter`] belongs to one view session. Whoever renders the table
//! subscribes to it; the returned [`FilterSubscription`] unregisters the
//! listener when dropped, so a torn-down view stops reacting.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use waypoint_core::domain::status::PipelineStatus;
use waypoint_core::domain::version::VersionItem;

/// Current filter settings
///
/// Unset criteria (no keyword, empty sets) do not constrain anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub keyword: Option<String>,
    pub statuses: BTreeSet<PipelineStatus>,
    pub build_numbers: BTreeSet<String>,
}

impl FilterCriteria {
    /// Whether any criterion is set
    pub fn is_active(&self) -> bool {
        self.keyword().is_some() || !self.statuses.is_empty() || !self.build_numbers.is_empty()
    }

    fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref().filter(|k| !k.is_empty())
    }

    /// Whether a row passes every set criterion
    ///
    /// - keyword: case-insensitive. Matches the name when its characters
    ///   appear in order, not necessarily adjacent, so "svc" finds
    ///   "billing-service". Matches a build number only as a substring, so
    ///   "1.0" finds "1.0.3" but not "10.0"
    /// - statuses: some environment has one of the statuses
    /// - build numbers: some environment deployed one of the build numbers
    pub fn matches(&self, item: &VersionItem) -> bool {
        if let Some(keyword) = self.keyword() {
            let keyword = keyword.to_lowercase();
            let in_name = contains_in_order(&item.name, &keyword);
            let in_builds = item
                .environments
                .values()
                .any(|env| env.build_number.to_lowercase().contains(&keyword));
            if !in_name && !in_builds {
                return false;
            }
        }

        if !self.statuses.is_empty()
            && !item
                .environments
                .values()
                .any(|env| self.statuses.contains(&env.status))
        {
            return false;
        }

        if !self.build_numbers.is_empty()
            && !item
                .environments
                .values()
                .any(|env| self.build_numbers.contains(&env.build_number))
        {
            return false;
        }

        true
    }
}

/// `needle` must already be lowercase
fn contains_in_order(haystack: &str, needle: &str) -> bool {
    let haystack = haystack.to_lowercase();
    let mut remaining = haystack.chars();
    needle.chars().all(|wanted| remaining.any(|c| c == wanted))
}

type Listener = Arc<dyn Fn(&FilterCriteria) + Send + Sync>;

#[derive(Default)]
struct FilterInner {
    criteria: FilterCriteria,
    listeners: BTreeMap<u64, Listener>,
    next_listener_id: u64,
}

/// Observable filter state
#[derive(Default)]
pub struct Filter {
    inner: Mutex<FilterInner>,
}

impl Filter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.lock().criteria.clone()
    }

    /// Whether [`Filter::reset`] would change anything
    pub fn has_changes_to_reset(&self) -> bool {
        self.lock().criteria.is_active()
    }

    pub fn set_keyword(&self, keyword: Option<String>) {
        self.update(|criteria| criteria.keyword = keyword);
    }

    pub fn set_statuses(&self, statuses: impl IntoIterator<Item = PipelineStatus>) {
        let statuses: BTreeSet<_> = statuses.into_iter().collect();
        self.update(|criteria| criteria.statuses = statuses);
    }

    pub fn set_build_numbers<I, S>(&self, build_numbers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let build_numbers: BTreeSet<String> = build_numbers.into_iter().map(Into::into).collect();
        self.update(|criteria| criteria.build_numbers = build_numbers);
    }

    pub fn set_criteria(&self, criteria: FilterCriteria) {
        self.update(|current| *current = criteria);
    }

    /// Clear every criterion
    pub fn reset(&self) {
        self.update(|criteria| *criteria = FilterCriteria::default());
    }

    /// Register a listener called after every change
    ///
    /// The listener runs on the thread that changed the filter, after the
    /// filter's own lock is released.
    pub fn subscribe(
        self: &Arc<Self>,
        listener: impl Fn(&FilterCriteria) + Send + Sync + 'static,
    ) -> FilterSubscription {
        let mut inner = self.lock();
        let listener_id = inner.next_listener_id;
        inner.next_listener_id = inner.next_listener_id.saturating_add(1);
        inner.listeners.insert(listener_id, Arc::new(listener));

        FilterSubscription {
            listener_id,
            filter: Arc::clone(self),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn unsubscribe(&self, listener_id: u64) {
        self.lock().listeners.remove(&listener_id);
    }

    fn update(&self, change: impl FnOnce(&mut FilterCriteria)) {
        let (criteria, listeners) = {
            let mut inner = self.lock();
            let before = inner.criteria.clone();
            change(&mut inner.criteria);
            if inner.criteria == before {
                return;
            }
            let listeners: Vec<Listener> = inner.listeners.values().cloned().collect();
            (inner.criteria.clone(), listeners)
        };

        debug!(
            "Filter changed (active: {}), notifying {} listener(s)",
            criteria.is_active(),
            listeners.len()
        );

        for listener in listeners {
            listener(&criteria);
        }
    }

    fn lock(&self) -> MutexGuard<'_, FilterInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registration handle returned by [`Filter::subscribe`]
pub struct FilterSubscription {
    listener_id: u64,
    filter: Arc<Filter>,
}

impl Drop for FilterSubscription {
    fn drop(&mut self) {
        self.filter.unsubscribe(self.listener_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use waypoint_core::domain::version::EnvironmentVersion;

    fn item(name: &str, envs: &[(u32, &str, PipelineStatus)]) -> VersionItem {
        VersionItem {
            name: name.to_string(),
            definition_id: 1,
            environments: envs
                .iter()
                .map(|(id, build, status)| {
                    (
                        *id,
                        EnvironmentVersion {
                            status: *status,
                            build_id: 1,
                            build_number: build.to_string(),
                        },
                    )
                })
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_empty_criteria_match_everything() {
        let criteria = FilterCriteria::default();
        assert!(!criteria.is_active());
        assert!(criteria.matches(&item("anything", &[])));
    }

    #[test]
    fn test_empty_keyword_is_inactive() {
        let criteria = FilterCriteria {
            keyword: Some(String::new()),
            ..Default::default()
        };
        assert!(!criteria.is_active());
    }

    #[test]
    fn test_keyword_matches_name_case_insensitively() {
        let criteria = FilterCriteria {
            keyword: Some("SVC".to_string()),
            ..Default::default()
        };
        assert!(criteria.matches(&item("billing-svc", &[])));
        assert!(!criteria.matches(&item("mobile-ios-app", &[])));
    }

    #[test]
    fn test_keyword_characters_in_order() {
        let criteria = FilterCriteria {
            keyword: Some("svc".to_string()),
            ..Default::default()
        };
        assert!(criteria.matches(&item("enterprise-distributed-service", &[])));
        assert!(!criteria.matches(&item("mobile-ios-app", &[])));
        assert!(!criteria.matches(&item("cvs", &[])));
    }

    #[test]
    fn test_keyword_matches_build_number() {
        let criteria = FilterCriteria {
            keyword: Some("2024".to_string()),
            ..Default::default()
        };
        let row = item("api", &[(1, "20240501.2", PipelineStatus::Succeeded)]);
        assert!(criteria.matches(&row));
    }

    #[test]
    fn test_keyword_is_a_substring_of_build_numbers() {
        let criteria = FilterCriteria {
            keyword: Some("1.0".to_string()),
            ..Default::default()
        };
        let ten = item("web", &[(1, "10.0", PipelineStatus::Succeeded)]);
        let patch = item("web", &[(1, "1.0.3", PipelineStatus::Succeeded)]);

        assert!(!criteria.matches(&ten));
        assert!(criteria.matches(&patch));
    }

    #[test]
    fn test_criteria_combine_with_and() {
        let row = item(
            "api",
            &[
                (1, "1.0", PipelineStatus::Succeeded),
                (2, "0.9", PipelineStatus::Failed),
            ],
        );

        let mut criteria = FilterCriteria {
            keyword: Some("api".to_string()),
            statuses: [PipelineStatus::Failed].into(),
            ..Default::default()
        };
        assert!(criteria.matches(&row));

        criteria.build_numbers = ["2.0".to_string()].into();
        assert!(!criteria.matches(&row));

        criteria.build_numbers = ["1.0".to_string()].into();
        assert!(criteria.matches(&row));
    }

    #[test]
    fn test_subscribers_are_notified_on_change_only() {
        let filter = Filter::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _subscription = filter.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        filter.set_keyword(Some("svc".to_string()));
        filter.set_keyword(Some("svc".to_string()));
        filter.reset();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!filter.has_changes_to_reset());
    }

    #[test]
    fn test_dropped_subscription_stops_notifications() {
        let filter = Filter::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let subscription = filter.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(filter.listener_count(), 1);

        drop(subscription);
        filter.set_statuses([PipelineStatus::Failed]);

        assert_eq!(filter.listener_count(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(filter.has_changes_to_reset());
    }

    #[test]
    fn test_listener_may_read_filter() {
        let filter = Filter::new();
        let observed = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&observed);
        let reader = Arc::clone(&filter);
        let _subscription = filter.subscribe(move |_| {
            *sink.lock().unwrap() = Some(reader.criteria());
        });

        filter.set_build_numbers(["1.0"]);

        let seen = observed.lock().unwrap().clone().unwrap();
        assert!(seen.build_numbers.contains("1.0"));
    }
}
