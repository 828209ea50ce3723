//! Subreddit list building.
//!
//! The front page shows pinned subreddits first, in the order the user chose,
//! followed by every other subscription sorted case-insensitively. The list is
//! always rebuilt from scratch; `needs_rebuild` answers whether the inputs
//! drifted from the list currently on screen.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::ops::Index;

// ============================================================================
// SubredditList
// ============================================================================

/// Ordered, duplicate-free sequence of subreddit names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubredditList {
    names: Vec<String>,
}

impl SubredditList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Position of `name` (exact match).
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

impl Index<usize> for SubredditList {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.names[index]
    }
}

impl<'a> IntoIterator for &'a SubredditList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

// ============================================================================
// Building
// ============================================================================

/// Case-insensitive ordering, falling back to byte order so that names that
/// differ only in case still sort deterministically.
fn compare_ci(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Merge pinned and subscribed names into the front-page order.
///
/// Pinned names come first in the given order (first occurrence wins), then the
/// remaining subscriptions sorted case-insensitively ascending.
pub fn build_list<S, P>(subscribed: &[S], pinned: &[P]) -> SubredditList
where
    S: AsRef<str>,
    P: AsRef<str>,
{
    let mut seen: HashSet<&str> = HashSet::with_capacity(subscribed.len() + pinned.len());
    let mut names: Vec<String> = Vec::with_capacity(subscribed.len().max(pinned.len()));

    for name in pinned.iter().map(AsRef::as_ref) {
        if seen.insert(name) {
            names.push(name.to_string());
        }
    }

    let mut rest: Vec<&str> = subscribed
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| seen.insert(*name))
        .collect();
    rest.sort_by(|a, b| compare_ci(a, b));
    names.extend(rest.into_iter().map(str::to_string));

    SubredditList { names }
}

/// Whether `current` no longer reflects the subscription inputs: the distinct
/// name count differs, or some pinned position holds a different entry.
pub fn needs_rebuild<S, P>(current: &SubredditList, subscribed: &[S], pinned: &[P]) -> bool
where
    S: AsRef<str>,
    P: AsRef<str>,
{
    let distinct: HashSet<&str> = subscribed
        .iter()
        .map(AsRef::as_ref)
        .chain(pinned.iter().map(AsRef::as_ref))
        .collect();
    if distinct.len() != current.len() {
        return true;
    }

    pinned
        .iter()
        .enumerate()
        .any(|(i, name)| current.get(i) != Some(name.as_ref()))
}

// ============================================================================
// Shortcuts
// ============================================================================

/// Maximum number of subreddit shortcuts registered alongside "Open link".
pub const MAX_SUBREDDIT_SHORTCUTS: usize = 2;

/// A quick-launch entry registered with the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutItem {
    Subreddit(String),
    /// Open whatever link the user has copied.
    OpenLink,
}

impl ShortcutItem {
    pub fn title(&self) -> &str {
        match self {
            Self::Subreddit(name) => name,
            Self::OpenLink => "Open link",
        }
    }
}

/// Shortcut entries for a list: the first subreddits that are not paths
/// (no '/'), then "Open link", in reverse registration order.
pub fn shortcut_items(list: &SubredditList) -> Vec<ShortcutItem> {
    let mut items: Vec<ShortcutItem> = list
        .iter()
        .filter(|name| !name.contains('/'))
        .take(MAX_SUBREDDIT_SHORTCUTS)
        .map(|name| ShortcutItem::Subreddit(name.to_string()))
        .collect();
    items.push(ShortcutItem::OpenLink);
    items.reverse();
    items
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(list: &SubredditList) -> Vec<&str> {
        list.iter().collect()
    }

    #[test]
    fn test_pinned_first_then_sorted() {
        let list = build_list(&["aww", "pics"], &["pics"]);
        assert_eq!(names(&list), vec!["pics", "aww"]);
    }

    #[test]
    fn test_case_insensitive_sort() {
        let list = build_list(&["zeta", "Alpha", "beta", "Gamma"], &[] as &[&str]);
        assert_eq!(names(&list), vec!["Alpha", "beta", "Gamma", "zeta"]);
    }

    #[test]
    fn test_empty_input_yields_empty_list() {
        let list = build_list(&[] as &[&str], &[] as &[&str]);
        assert!(list.is_empty());
        assert_eq!(list.get(0), None);
    }

    #[test]
    fn test_duplicates_removed() {
        let list = build_list(&["rust", "pics", "rust"], &["pics", "pics"]);
        assert_eq!(names(&list), vec!["pics", "rust"]);
    }

    #[test]
    fn test_pinned_not_subscribed_still_first() {
        let list = build_list(&["aww"], &["frontpage"]);
        assert_eq!(names(&list), vec!["frontpage", "aww"]);
    }

    #[test]
    fn test_names_differing_in_case_are_distinct() {
        let list = build_list(&["AWW", "aww"], &[] as &[&str]);
        assert_eq!(names(&list), vec!["AWW", "aww"]);
    }

    #[test]
    fn test_index_of_and_contains() {
        let list = build_list(&["aww", "pics", "rust"], &["rust"]);
        assert_eq!(list.index_of("rust"), Some(0));
        assert_eq!(list.index_of("pics"), Some(2));
        assert_eq!(list.index_of("news"), None);
        assert!(list.contains("aww"));
        assert_eq!(&list[1], "aww");
    }

    #[test]
    fn test_needs_rebuild_unchanged() {
        let subs = ["aww", "pics"];
        let pinned = ["pics"];
        let list = build_list(&subs, &pinned);
        assert!(!needs_rebuild(&list, &subs, &pinned));
    }

    #[test]
    fn test_needs_rebuild_on_count_change() {
        let list = build_list(&["aww", "pics"], &["pics"]);
        assert!(needs_rebuild(&list, &["aww", "pics", "rust"], &["pics"]));
        assert!(needs_rebuild(&list, &["pics"], &["pics"]));
    }

    #[test]
    fn test_needs_rebuild_on_pinned_reorder() {
        let list = build_list(&["aww", "pics", "rust"], &["pics", "rust"]);
        assert!(needs_rebuild(&list, &["aww", "pics", "rust"], &["rust", "pics"]));
    }

    #[test]
    fn test_needs_rebuild_when_pinned_outgrows_list() {
        let list = SubredditList::new();
        assert!(needs_rebuild(&list, &[] as &[&str], &["pics"]));
    }

    #[test]
    fn test_shortcuts_skip_paths_and_reverse() {
        let list = build_list(&["u_someone/m/multi", "aww", "pics", "rust"], &[] as &[&str]);
        let items = shortcut_items(&list);
        assert_eq!(
            items,
            vec![
                ShortcutItem::OpenLink,
                ShortcutItem::Subreddit("pics".to_string()),
                ShortcutItem::Subreddit("aww".to_string()),
            ]
        );
    }

    #[test]
    fn test_shortcuts_for_empty_list() {
        assert_eq!(shortcut_items(&SubredditList::new()), vec![ShortcutItem::OpenLink]);
        assert_eq!(ShortcutItem::OpenLink.title(), "Open link");
    }
}
