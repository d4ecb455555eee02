//! Ordinal search over a paginated deployment listing.
//!
//! The remote listing is trusted to return newest-created-first; nothing is
//! sorted or buffered locally beyond the current page and a scalar
//! accumulator.

use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentNode {
    pub id: i64,
    pub state: String,
}

/// One page of the remote listing. `end_cursor` is an opaque continuation
/// token carried unchanged into the next request.
#[derive(Debug, Clone, Default)]
pub struct DeploymentPage {
    pub nodes: Vec<DeploymentNode>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

pub const PAGE_SIZE: u32 = 20;

const ACTIVE_STATE: &str = "ACTIVE";
const INACTIVE_STATE: &str = "INACTIVE";

/// Which deployment states count toward the ordinal.
///
/// Only ACTIVE is the advertised concept, but deployments superseded on the
/// same environment are flipped to INACTIVE by the forge, so counting both
/// walks the environment's deployment history. This stays a configuration
/// point rather than a baked-in choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountedStates {
    ActiveOnly,
    ActiveAndInactive,
}

impl CountedStates {
    pub fn counts(&self, state: &str) -> bool {
        match self {
            CountedStates::ActiveOnly => state == ACTIVE_STATE,
            CountedStates::ActiveAndInactive => {
                state == ACTIVE_STATE || state == INACTIVE_STATE
            }
        }
    }
}

/// A source of deployment pages for one repository.
pub trait DeploymentSource {
    /// Fetch one page for `environment`, newest-created-first, starting at
    /// `cursor` (None means from the beginning).
    fn page(&self, environment: &str, cursor: Option<&str>) -> Result<DeploymentPage>;
}

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub counted: CountedStates,
    /// Politeness delay before every page request except the first.
    pub page_delay: Duration,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            counted: CountedStates::ActiveAndInactive,
            page_delay: Duration::from_millis(500),
        }
    }
}

// Accumulator for the page fold. `found` counts qualifying nodes seen so
// far; `last_match` is the id of the most recent one. The nth hit is the
// answer iff `found` actually reached nth before pages ran out.
#[derive(Debug, Default)]
struct Search {
    found: u32,
    last_match: Option<i64>,
}

/// Find the id of the `nth` qualifying deployment in `environment`,
/// counting strictly in newest-first order across page boundaries.
///
/// Returns Ok(None) when fewer than `nth` deployments qualify across all
/// pages; that is an outcome, not an error.
pub fn resolve_nth(
    source: &dyn DeploymentSource,
    environment: &str,
    nth: u32,
    options: &ResolveOptions,
) -> Result<Option<i64>> {
    if nth == 0 {
        return Err(Error::validation_invalid_argument(
            "nth",
            "Occurrence is 1-based and must be at least 1",
        ));
    }

    let mut search = Search::default();
    let mut cursor: Option<String> = None;
    let mut has_more = true;

    while has_more && search.found < nth {
        if cursor.is_some() {
            thread::sleep(options.page_delay);
        }

        let page = source.page(environment, cursor.as_deref())?;

        for node in &page.nodes {
            if !options.counted.counts(&node.state) {
                continue;
            }
            search.last_match = Some(node.id);
            search.found += 1;
            if search.found == nth {
                break;
            }
        }

        cursor = page.end_cursor;
        has_more = page.has_next_page;
    }

    Ok(if search.found == nth {
        search.last_match
    } else {
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakeSource {
        pages: Vec<DeploymentPage>,
        requests: RefCell<Vec<Option<String>>>,
    }

    impl FakeSource {
        fn new(pages: Vec<DeploymentPage>) -> Self {
            Self {
                pages,
                requests: RefCell::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    impl DeploymentSource for FakeSource {
        fn page(&self, _environment: &str, cursor: Option<&str>) -> Result<DeploymentPage> {
            let mut requests = self.requests.borrow_mut();
            requests.push(cursor.map(|c| c.to_string()));
            Ok(self.pages[requests.len() - 1].clone())
        }
    }

    fn node(id: i64, state: &str) -> DeploymentNode {
        DeploymentNode {
            id,
            state: state.to_string(),
        }
    }

    fn page(nodes: Vec<DeploymentNode>, has_next: bool, cursor: Option<&str>) -> DeploymentPage {
        DeploymentPage {
            nodes,
            has_next_page: has_next,
            end_cursor: cursor.map(|c| c.to_string()),
        }
    }

    fn options() -> ResolveOptions {
        ResolveOptions {
            counted: CountedStates::ActiveAndInactive,
            page_delay: Duration::ZERO,
        }
    }

    #[test]
    fn finds_first_active_after_non_matching_states() {
        let source = FakeSource::new(vec![page(
            vec![
                node(1003, "QUEUED"),
                node(1002, "ERROR"),
                node(1001, "PENDING"),
                node(1000, "ACTIVE"),
            ],
            false,
            None,
        )]);

        let found = resolve_nth(&source, "production", 1, &options()).unwrap();
        assert_eq!(found, Some(1000));
        assert_eq!(source.request_count(), 1);
    }

    #[test]
    fn crosses_page_boundary_and_carries_cursor_unchanged() {
        let source = FakeSource::new(vec![
            page(vec![node(5, "QUEUED")], true, Some("cursor-1")),
            page(vec![node(999, "ACTIVE")], false, None),
        ]);

        let found = resolve_nth(&source, "production", 1, &options()).unwrap();
        assert_eq!(found, Some(999));
        assert_eq!(
            source.requests.borrow().as_slice(),
            &[None, Some("cursor-1".to_string())]
        );
    }

    #[test]
    fn counts_ordinal_across_pages() {
        let source = FakeSource::new(vec![
            page(
                vec![node(30, "ACTIVE"), node(29, "ERROR"), node(28, "INACTIVE")],
                true,
                Some("c1"),
            ),
            page(vec![node(27, "INACTIVE"), node(26, "ACTIVE")], false, None),
        ]);

        assert_eq!(
            resolve_nth(&source, "production", 3, &options()).unwrap(),
            Some(27)
        );
    }

    #[test]
    fn stops_paging_once_the_target_is_found() {
        let source = FakeSource::new(vec![
            page(vec![node(10, "ACTIVE")], true, Some("c1")),
            page(vec![node(9, "ACTIVE")], true, Some("c2")),
            page(vec![node(8, "ACTIVE")], false, None),
        ]);

        let found = resolve_nth(&source, "production", 2, &options()).unwrap();
        assert_eq!(found, Some(9));
        assert_eq!(source.request_count(), 2);
    }

    #[test]
    fn returns_none_when_fewer_than_nth_qualify() {
        let source = FakeSource::new(vec![
            page(vec![node(2, "ACTIVE")], true, Some("c1")),
            page(vec![node(1, "ERROR")], false, None),
        ]);

        assert_eq!(resolve_nth(&source, "production", 2, &options()).unwrap(), None);
        assert_eq!(source.request_count(), 2);
    }

    #[test]
    fn returns_none_for_an_empty_environment() {
        let source = FakeSource::new(vec![page(vec![], false, None)]);
        assert_eq!(resolve_nth(&source, "staging", 1, &options()).unwrap(), None);
    }

    #[test]
    fn active_only_skips_inactive_records() {
        let nodes = vec![node(3, "INACTIVE"), node(2, "INACTIVE"), node(1, "ACTIVE")];
        let strict = FakeSource::new(vec![page(nodes.clone(), false, None)]);
        let legacy = FakeSource::new(vec![page(nodes, false, None)]);

        let strict_options = ResolveOptions {
            counted: CountedStates::ActiveOnly,
            page_delay: Duration::ZERO,
        };
        assert_eq!(
            resolve_nth(&strict, "production", 1, &strict_options).unwrap(),
            Some(1)
        );
        assert_eq!(
            resolve_nth(&legacy, "production", 1, &options()).unwrap(),
            Some(3)
        );
    }

    #[test]
    fn state_comparison_is_case_sensitive() {
        let source = FakeSource::new(vec![page(
            vec![node(2, "active"), node(1, "ACTIVE")],
            false,
            None,
        )]);

        assert_eq!(
            resolve_nth(&source, "production", 1, &options()).unwrap(),
            Some(1)
        );
    }

    #[test]
    fn zeroth_occurrence_is_rejected() {
        let source = FakeSource::new(vec![]);
        let err = resolve_nth(&source, "production", 0, &options()).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ValidationInvalidArgument);
        assert_eq!(source.request_count(), 0);
    }
}
