//! Horizontal paging engine.
//!
//! The pager shows one page at a time. It does not know where pages come from:
//! the owner supplies the ordered page names through [`PageSource`] and builds
//! pages through [`PageFactory`]. Pages scrolled away from are kept in a small
//! LRU cache so returning to them preserves their loaded state.

use lru::LruCache;
use std::num::NonZeroUsize;

/// Something the pager can display and cache.
pub trait Page {
    /// Stable cache key (the subreddit name).
    fn key(&self) -> &str;
}

/// Ordered page names. Implemented by the screen over its subreddit list.
pub trait PageSource {
    fn page_count(&self) -> usize;
    fn page_name(&self, index: usize) -> Option<&str>;
}

/// Builds a page for a name the cache does not hold.
pub trait PageFactory {
    type Page: Page;

    fn make_page(&mut self, name: &str) -> Self::Page;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDirection {
    Forward,
    Reverse,
}

impl NavigationDirection {
    /// Forward when moving to a higher index.
    pub fn between(from: usize, to: usize) -> Self {
        if to > from {
            Self::Forward
        } else {
            Self::Reverse
        }
    }
}

/// Record of the last page change handed to the pager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub target: String,
    pub direction: NavigationDirection,
    pub animated: bool,
}

pub struct Pager<P> {
    current: Option<P>,
    current_index: usize,
    swipe_enabled: bool,
    cache: LruCache<String, P>,
    last_transition: Option<Transition>,
}

impl<P: Page> Pager<P> {
    pub fn new(cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            current: None,
            current_index: 0,
            swipe_enabled: false,
            cache: LruCache::new(capacity),
            last_transition: None,
        }
    }

    pub fn current(&self) -> Option<&P> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut P> {
        self.current.as_mut()
    }

    /// Index the owner last settled on.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn set_current_index(&mut self, index: usize) {
        self.current_index = index;
    }

    pub fn swipe_enabled(&self) -> bool {
        self.swipe_enabled
    }

    /// Swiping between neighbors needs a page source; without one the pager
    /// only changes page when told to.
    pub fn set_swipe_enabled(&mut self, enabled: bool) {
        self.swipe_enabled = enabled;
    }

    pub fn last_transition(&self) -> Option<&Transition> {
        self.last_transition.as_ref()
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Take the page for `name`: the displayed page, a cached one, or a new one.
    pub fn page_for<F>(&mut self, name: &str, factory: &mut F) -> P
    where
        F: PageFactory<Page = P>,
    {
        if self.current.as_ref().is_some_and(|p| p.key() == name) {
            if let Some(page) = self.current.take() {
                return page;
            }
        }
        match self.cache.pop(name) {
            Some(page) => {
                tracing::debug!(page = %name, "Reusing cached page");
                page
            }
            None => factory.make_page(name),
        }
    }

    /// Display `page`. The previously displayed page moves into the cache.
    pub fn set_page(&mut self, page: P, direction: NavigationDirection, animated: bool) {
        if let Some(old) = self.current.take() {
            if old.key() != page.key() {
                let key = old.key().to_string();
                if let Some((evicted, _)) = self.cache.push(key, old) {
                    tracing::debug!(page = %evicted, "Evicted page from cache");
                }
            }
        }
        self.last_transition = Some(Transition {
            target: page.key().to_string(),
            direction,
            animated,
        });
        self.current = Some(page);
    }

    /// Page to the neighbor `offset` steps away. Returns the target index, or
    /// None when swiping is disabled or the neighbor does not exist.
    pub fn swipe<S, F>(&mut self, source: &S, factory: &mut F, offset: isize) -> Option<usize>
    where
        S: PageSource + ?Sized,
        F: PageFactory<Page = P>,
    {
        if !self.swipe_enabled || offset == 0 {
            return None;
        }
        let target = self.current_index.checked_add_signed(offset)?;
        let name = source.page_name(target)?.to_string();
        let page = self.page_for(&name, factory);
        self.set_page(
            page,
            NavigationDirection::between(self.current_index, target),
            true,
        );
        Some(target)
    }

    /// Mutable access to a displayed or cached page without touching LRU order.
    pub fn page_mut(&mut self, key: &str) -> Option<&mut P> {
        match self.current.as_mut() {
            Some(page) if page.key() == key => Some(page),
            _ => self.cache.peek_mut(key),
        }
    }

    /// Forget the displayed or cached page for `key`, so the next
    /// [`Pager::page_for`] builds it anew. Returns true if a page was dropped.
    pub fn discard(&mut self, key: &str) -> bool {
        let shown = self.current.as_ref().is_some_and(|p| p.key() == key);
        if shown {
            self.current = None;
        }
        let cached = self.cache.pop(key).is_some();
        shown || cached
    }

    /// Drop cached pages whose key no longer passes `keep`.
    pub fn retain_cached(&mut self, keep: impl Fn(&str) -> bool) {
        let stale: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| !keep(key.as_str()))
            .map(|(key, _)| key.clone())
            .collect();
        for key in stale {
            self.cache.pop(&key);
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.cache.clear();
        self.current_index = 0;
        self.last_transition = None;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TestPage {
        name: String,
        serial: usize,
    }

    impl Page for TestPage {
        fn key(&self) -> &str {
            &self.name
        }
    }

    #[derive(Default)]
    struct Factory {
        built: usize,
    }

    impl PageFactory for Factory {
        type Page = TestPage;

        fn make_page(&mut self, name: &str) -> TestPage {
            self.built += 1;
            TestPage {
                name: name.to_string(),
                serial: self.built,
            }
        }
    }

    struct Names(Vec<&'static str>);

    impl PageSource for Names {
        fn page_count(&self) -> usize {
            self.0.len()
        }

        fn page_name(&self, index: usize) -> Option<&str> {
            self.0.get(index).copied()
        }
    }

    #[test]
    fn test_direction_between() {
        assert_eq!(NavigationDirection::between(0, 2), NavigationDirection::Forward);
        assert_eq!(NavigationDirection::between(2, 0), NavigationDirection::Reverse);
        assert_eq!(NavigationDirection::between(1, 1), NavigationDirection::Reverse);
    }

    #[test]
    fn test_previous_page_is_cached_and_reused() {
        let mut pager = Pager::new(4);
        let mut factory = Factory::default();

        let pics = pager.page_for("pics", &mut factory);
        pager.set_page(pics, NavigationDirection::Forward, false);
        let aww = pager.page_for("aww", &mut factory);
        pager.set_page(aww, NavigationDirection::Forward, true);
        assert_eq!(pager.cached_len(), 1);

        let again = pager.page_for("pics", &mut factory);
        assert_eq!(again.serial, 1);
        assert_eq!(factory.built, 2);
    }

    #[test]
    fn test_page_for_current_takes_displayed_page() {
        let mut pager = Pager::new(4);
        let mut factory = Factory::default();
        let pics = pager.page_for("pics", &mut factory);
        pager.set_page(pics, NavigationDirection::Forward, false);

        let same = pager.page_for("pics", &mut factory);
        assert_eq!(same.serial, 1);
        assert!(pager.current().is_none());
        pager.set_page(same, NavigationDirection::Reverse, false);
        assert_eq!(pager.cached_len(), 0);
    }

    #[test]
    fn test_cache_evicts_least_recent() {
        let mut pager = Pager::new(1);
        let mut factory = Factory::default();
        for name in ["a", "b", "c"] {
            let page = pager.page_for(name, &mut factory);
            pager.set_page(page, NavigationDirection::Forward, false);
        }
        assert_eq!(pager.cached_len(), 1);
        assert!(pager.page_mut("a").is_none());
        assert!(pager.page_mut("b").is_some());
    }

    #[test]
    fn test_swipe_requires_enabled_and_bounds() {
        let names = Names(vec!["a", "b", "c"]);
        let mut pager = Pager::new(4);
        let mut factory = Factory::default();

        assert_eq!(pager.swipe(&names, &mut factory, 1), None);

        pager.set_swipe_enabled(true);
        assert_eq!(pager.swipe(&names, &mut factory, -1), None);
        assert_eq!(pager.swipe(&names, &mut factory, 1), Some(1));
        let transition = pager.last_transition().unwrap();
        assert_eq!(transition.target, "b");
        assert_eq!(transition.direction, NavigationDirection::Forward);

        pager.set_current_index(2);
        assert_eq!(pager.swipe(&names, &mut factory, 1), None);
    }

    #[test]
    fn test_retain_cached_drops_removed_pages() {
        let mut pager = Pager::new(4);
        let mut factory = Factory::default();
        for name in ["a", "b", "c"] {
            let page = pager.page_for(name, &mut factory);
            pager.set_page(page, NavigationDirection::Forward, false);
        }
        pager.retain_cached(|key| key != "a");
        assert!(pager.page_mut("a").is_none());
        assert!(pager.page_mut("b").is_some());
        assert!(pager.page_mut("c").is_some());
    }

    #[test]
    fn test_discard_forces_rebuild() {
        let mut pager = Pager::new(4);
        let mut factory = Factory::default();
        for name in ["a", "b"] {
            let page = pager.page_for(name, &mut factory);
            pager.set_page(page, NavigationDirection::Forward, false);
        }

        assert!(pager.discard("b"));
        assert!(pager.current().is_none());
        assert!(pager.discard("a"));
        assert!(!pager.discard("a"));

        let page = pager.page_for("a", &mut factory);
        assert_eq!(page.serial, 3);
    }

    #[test]
    fn test_clear_resets_state() {
        let mut pager = Pager::new(2);
        let mut factory = Factory::default();
        let page = pager.page_for("a", &mut factory);
        pager.set_page(page, NavigationDirection::Forward, false);
        pager.set_current_index(3);
        pager.clear();
        assert!(pager.current().is_none());
        assert_eq!(pager.current_index(), 0);
        assert!(pager.last_transition().is_none());
    }
}
