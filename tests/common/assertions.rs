//! Domain-specific assertion macros for atoll harnesses.
//!
//! These wrap plain comparisons with failure messages that say which island
//! invariant broke and show the state around it.

// ---------------------------------------------------------------------------
// Search dialog
// ---------------------------------------------------------------------------

/// Assert the search dialog of a `Page` is in the given state.
///
/// ```rust,ignore
/// assert_dialog_state!(rt.page(), DialogState::OpenResults);
/// ```
#[macro_export]
macro_rules! assert_dialog_state {
    ($page:expr, $state:expr) => {{
        let page: &atoll_islands::Page = $page;
        let expected: atoll_core::DialogState = $state;
        match page.search() {
            Some(search) if search.state() == expected => {}
            Some(search) => panic!(
                "assert_dialog_state! failed:\n  expected: {}\n  actual:   {}\n  query: {:?}\n  error: {:?}",
                expected,
                search.state(),
                search.query(),
                search.error()
            ),
            None => panic!("assert_dialog_state! failed: no search island on this page"),
        }
    }};
}

/// Assert the rendered result titles, in order.
#[macro_export]
macro_rules! assert_result_titles {
    ($page:expr, [$($title:expr),* $(,)?]) => {{
        let page: &atoll_islands::Page = $page;
        let search = page.search().expect("no search island on this page");
        let actual: Vec<&str> = search.results().iter().map(|h| h.title.as_str()).collect();
        let expected: Vec<&str> = vec![$($title),*];
        if actual != expected {
            panic!(
                "assert_result_titles! failed:\n  expected: {:?}\n  actual:   {:?}\n  state: {}",
                expected,
                actual,
                search.state()
            );
        }
    }};
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Assert a runtime performed no full-page navigation.
#[macro_export]
macro_rules! assert_no_full_navigation {
    ($rt:expr) => {{
        let navigations = $rt.navigations();
        if !navigations.is_empty() {
            panic!(
                "assert_no_full_navigation! failed: page navigated to {:?}",
                navigations.iter().map(|u| u.as_str()).collect::<Vec<_>>()
            );
        }
    }};
}
