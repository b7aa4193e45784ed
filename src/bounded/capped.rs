use std::collections::HashSet;
use std::hash::Hash;

/// Insertion-ordered set that stops accepting new items once full.
#[derive(Clone, Debug)]
pub struct Capped<T> {
    cap:   usize,
    items: Vec<T>,
    seen:  HashSet<T>,
}

impl<T: Eq + Hash + Clone> Capped<T> {
    pub fn new(cap: usize) -> Self {
        Self {
            cap:   cap,
            items: Vec::new(),
            seen:  HashSet::new(),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(usize::MAX)
    }

    pub fn add(&mut self, item: T) -> bool {
        if self.is_full() || self.seen.contains(&item) {
            return false;
        }
        self.seen.insert(item.clone());
        self.items.push(item);
        true
    }

    pub fn extend<'a, I>(&mut self, items: I) where I: IntoIterator<Item = &'a T>, T: 'a {
        for item in items {
            if self.is_full() {
                break;
            }
            self.add(item.clone());
        }
    }

    pub fn contains(&self, item: &T) -> bool {
        self.seen.contains(item)
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.cap
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.seen.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.items.iter()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }
}

impl<T: PartialEq> PartialEq for Capped<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cap == other.cap && self.items == other.items
    }
}

impl<T: Eq> Eq for Capped<T> {}

impl<T: Eq + Hash + Clone> Default for Capped<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}
