use serde::Serialize;
use crate::update::{Endpoint, Labels, Update};

const RESERVED_PREFIX: &str = "projectcalico.org/";

#[derive(Clone, Debug, Default, Serialize, Eq, PartialEq)]
pub struct FlowLabels {
    pub src_labels: Option<Labels>,
    pub dst_labels: Option<Labels>,
}

impl FlowLabels {
    pub fn new(u: &Update) -> Self {
        Self {
            src_labels: labels(u.src_ep.as_ref()),
            dst_labels: labels(u.dst_ep.as_ref()),
        }
    }

    pub fn aggregate(&mut self, u: &Update) {
        merge(&mut self.src_labels, labels(u.src_ep.as_ref()));
        merge(&mut self.dst_labels, labels(u.dst_ep.as_ref()));
    }

    pub fn merge_with(&mut self, other: FlowLabels) {
        merge(&mut self.src_labels, other.src_labels);
        merge(&mut self.dst_labels, other.dst_labels);
    }

    pub fn clear(&mut self) {
        self.src_labels = None;
        self.dst_labels = None;
    }
}

fn labels(ep: Option<&Endpoint>) -> Option<Labels> {
    ep.map(|ep| ep.labels().clone())
}

fn merge(current: &mut Option<Labels>, new: Option<Labels>) {
    *current = match current.take() {
        Some(current) => Some(intersect(&current, &new.unwrap_or_default())),
        None          => new,
    };
}

/// Keeps the labels present with the same value in both maps.
pub fn intersect(a: &Labels, b: &Labels) -> Labels {
    a.iter().filter(|(k, v)| {
        !k.starts_with(RESERVED_PREFIX) && b.get(*k) == Some(*v)
    }).map(|(k, v)| (k.clone(), v.clone())).collect()
}
