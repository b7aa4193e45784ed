use std::collections::HashMap;
use super::Tuple;

/// Unique flow references, each carrying the NAT outgoing port seen for
/// the flow (0 when unknown).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Set {
    refs: HashMap<Tuple, u16>,
}

impl Set {
    pub fn new() -> Self {
        Self {
            refs: HashMap::new(),
        }
    }

    pub fn add(&mut self, tuple: Tuple) {
        self.add_with_value(tuple, 0);
    }

    pub fn add_with_value(&mut self, tuple: Tuple, port: u16) {
        let value = self.refs.entry(tuple).or_insert(port);
        if port != 0 {
            *value = port;
        }
    }

    pub fn contains(&self, tuple: &Tuple) -> bool {
        self.refs.contains_key(tuple)
    }

    pub fn discard(&mut self, tuple: &Tuple) {
        self.refs.remove(tuple);
    }

    /// Removes `tuple`, returning its port if it was present.
    pub fn take(&mut self, tuple: &Tuple) -> Option<u16> {
        self.refs.remove(tuple)
    }

    pub fn union(&mut self, other: &Set) {
        for (tuple, port) in other.iter() {
            self.add_with_value(*tuple, port);
        }
    }

    pub fn clear(&mut self) {
        self.refs.clear();
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Tuple, u16)> {
        self.refs.iter().map(|(tuple, port)| (tuple, *port))
    }
}
