use std::net::IpAddr;
use serde::Serialize;
use crate::bounded::{BoundedSet, Capped};
use crate::update::Update;
use super::labels::FlowLabels;
use super::record::{FlowLog, Timestamp};
use super::meta::FlowMeta;
use super::policy::{policy_set, PolicySet, PolicySets};
use super::process::FlowStatsByProcess;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub include_process: bool,
    pub process_limit:   usize,
    pub args_limit:      usize,
    pub nat_port_limit:  usize,
    pub max_orig_ips:    usize,
    pub max_domains:     usize,
    pub debug:           bool,
}

/// Whether lazily reset data (labels, policies, domains) still holds the
/// previous interval's values.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    Active,
    PendingReset,
}

#[derive(Clone, Debug, Serialize, Eq, PartialEq)]
pub struct FlowExtras {
    pub original_source_ips:     Vec<IpAddr>,
    pub num_original_source_ips: usize,
}

/// Aggregated state of every flow sharing one `FlowMeta`.
#[derive(Clone, Debug)]
pub struct FlowSpec {
    stats:    FlowStatsByProcess,
    labels:   FlowLabels,
    all:      PolicySets,
    enforced: PolicySets,
    pending:  PolicySet,
    domains:  Capped<String>,
    extras:   BoundedSet,
    phase:    Phase,
}

impl FlowSpec {
    pub fn new(u: &Update, config: Config) -> Self {
        let extras = match &u.orig_source_ips {
            Some(ips) => BoundedSet::from_slice_with_total(config.max_orig_ips, &ips.to_ip_vec(), ips.total_count()),
            None      => BoundedSet::new(config.max_orig_ips),
        };

        let mut domains = Capped::new(config.max_domains);
        domains.extend(&u.dst_domains);

        Self {
            stats:    FlowStatsByProcess::new(u, config),
            labels:   FlowLabels::new(u),
            all:      PolicySets::new(policy_set(&u.rule_ids, true)),
            enforced: PolicySets::new(policy_set(&u.rule_ids, false)),
            pending:  policy_set(&u.pending_rule_ids, true),
            domains:  domains,
            extras:   extras,
            phase:    Phase::Active,
        }
    }

    pub fn aggregate(&mut self, u: &Update) {
        if self.phase == Phase::PendingReset {
            self.clear_stale();
        }

        self.labels.aggregate(u);
        self.all.aggregate(policy_set(&u.rule_ids, true));
        self.enforced.aggregate(policy_set(&u.rule_ids, false));
        self.domains.extend(&u.dst_domains);

        if let Some(ips) = &u.orig_source_ips {
            self.extras.combine(ips);
        }

        self.stats.aggregate(u);
        self.pending = policy_set(&u.pending_rule_ids, true);
    }

    /// Folds a spec re-keyed onto the same `FlowMeta` into this one.
    pub fn merge_with(&mut self, other: FlowSpec) {
        if self.phase == Phase::PendingReset && other.phase == Phase::Active {
            self.clear_stale();
        }

        if self.phase == other.phase {
            self.labels.merge_with(other.labels);
            self.all.merge_with(other.all);
            self.enforced.merge_with(other.enforced);
            self.domains.extend(other.domains.iter());
            if self.pending.is_empty() {
                self.pending = other.pending;
            }
        }

        self.extras.combine(&other.extras);
        self.stats.merge_with(other.stats);
    }

    /// Moves the active flow of `u.tuple` into a spec of its own, described
    /// by `u`. Counters of the current interval stay here.
    pub fn split_off(&mut self, u: &Update, config: Config) -> FlowSpec {
        let mut domains = Capped::new(config.max_domains);
        domains.extend(&u.dst_domains);

        FlowSpec {
            stats:    self.stats.split_off(u),
            labels:   FlowLabels::new(u),
            all:      PolicySets::new(policy_set(&u.rule_ids, true)),
            enforced: PolicySets::new(policy_set(&u.rule_ids, false)),
            pending:  policy_set(&u.pending_rule_ids, true),
            domains:  domains,
            extras:   BoundedSet::new(config.max_orig_ips),
            phase:    self.phase,
        }
    }

    pub fn to_flow_logs(&self, meta: &FlowMeta, start: Timestamp, end: Timestamp, include_labels: bool, include_policies: bool) -> Vec<FlowLog> {
        let extras = FlowExtras {
            original_source_ips:     self.extras.to_ip_vec(),
            num_original_source_ips: self.extras.total_count(),
        };

        let labels = match include_labels {
            true  => Some(self.labels.clone()),
            false => None,
        };

        let paired = self.all.len() == self.enforced.len();

        let mut logs = Vec::new();
        for stats in self.stats.to_reported_stats() {
            let log = FlowLog {
                start_time:        start,
                end_time:          end,
                meta:              meta.clone(),
                labels:            labels.clone(),
                domains:           self.domains.to_vec(),
                extras:            extras.clone(),
                stats:             stats,
                all_policies:      None,
                enforced_policies: None,
                pending_policies:  None,
            };

            if !include_policies {
                logs.push(log);
                continue;
            }

            for (idx, all) in self.all.iter().enumerate() {
                let enforced = match paired {
                    true  => self.enforced.get(idx).cloned(),
                    false => None,
                };

                logs.push(FlowLog {
                    all_policies:      Some(all.clone()),
                    enforced_policies: enforced,
                    pending_policies:  Some(self.pending.clone()),
                    ..log.clone()
                });
            }
        }
        logs
    }

    pub fn reset(&mut self) {
        self.stats.reset();
        self.extras.reset();
        self.phase = Phase::PendingReset;
    }

    pub fn gc(&mut self) -> usize {
        self.stats.gc()
    }

    pub fn contains_active_refs(&self, u: &Update) -> bool {
        self.stats.contains_active_refs(u)
    }

    /// Holds no flow at all, which happens once every flow was split off.
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn active_flows_count(&self) -> usize {
        self.stats.active_count()
    }

    /// More than one distinct policy trace was seen this interval.
    pub fn is_split(&self) -> bool {
        self.all.len() > 1
    }

    pub fn is_unpaired(&self) -> bool {
        self.all.len() != self.enforced.len()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn clear_stale(&mut self) {
        self.all.clear();
        self.enforced.clear();
        self.pending.clear();
        self.labels.clear();
        self.domains.clear();
        self.phase = Phase::Active;
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include_process: false,
            process_limit:   2,
            args_limit:      5,
            nat_port_limit:  3,
            max_orig_ips:    50,
            max_domains:     5,
            debug:           false,
        }
    }
}
