use std::collections::BTreeSet;
use std::net::IpAddr;
use serde::{Serialize, Deserialize};

/// A set of at most `cap` addresses that keeps counting past capacity.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct BoundedSet {
    cap:   usize,
    ips:   BTreeSet<IpAddr>,
    #[serde(default)]
    total: usize,
}

impl BoundedSet {
    pub fn new(cap: usize) -> Self {
        Self {
            cap:   cap,
            ips:   BTreeSet::new(),
            total: 0,
        }
    }

    pub fn from_slice_with_total(cap: usize, ips: &[IpAddr], total: usize) -> Self {
        let ips = ips.iter().copied().take(cap).collect::<BTreeSet<_>>();
        Self {
            cap:   cap,
            total: total.max(ips.len()),
            ips:   ips,
        }
    }

    pub fn add(&mut self, ip: IpAddr) {
        if self.ips.contains(&ip) {
            return;
        }

        self.total += 1;

        if self.ips.len() < self.cap {
            self.ips.insert(ip);
        }
    }

    pub fn combine(&mut self, other: &BoundedSet) {
        for ip in &other.ips {
            if self.ips.len() >= self.cap {
                break;
            }
            self.ips.insert(*ip);
        }
        self.total += other.total;
    }

    pub fn reset(&mut self) {
        self.ips.clear();
        self.total = 0;
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.ips.contains(ip)
    }

    pub fn to_ip_vec(&self) -> Vec<IpAddr> {
        self.ips.iter().copied().collect()
    }

    pub fn total_count(&self) -> usize {
        self.total
    }

    pub fn len(&self) -> usize {
        self.ips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ips.is_empty()
    }
}
