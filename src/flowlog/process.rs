use std::collections::HashMap;
use log::{trace, warn};
use serde::Serialize;
use crate::update::Update;
use crate::update::endpoint::NOT_INCLUDED;
use super::spec::Config;
use super::stats::{FlowStats, ReportedStats, TcpStats};

pub const AGGREGATED: &str = "*";

/// Process attribution of a single update.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Process {
    pub name: String,
    pub id:   Option<u32>,
    pub args: Option<String>,
}

#[derive(Clone, Debug, Serialize, Eq, PartialEq)]
pub struct ProcessReportedStats {
    pub process_name:       String,
    pub num_process_names:  usize,
    pub process_id:         String,
    pub num_process_ids:    usize,
    pub process_args:       Vec<String>,
    pub num_process_args:   usize,
    pub nat_outgoing_ports: Vec<u16>,
    #[serde(flatten)]
    pub stats:              ReportedStats,
    pub tcp:                TcpStats,
}

/// Flow statistics grouped by process name, in first-seen order.
#[derive(Clone, Debug)]
pub struct FlowStatsByProcess {
    stats:  HashMap<String, FlowStats>,
    names:  Vec<String>,
    config: Config,
}

pub fn normalize(u: &Update, include_process: bool) -> Process {
    match u.process_name.as_deref() {
        Some(name) if include_process && !name.is_empty() => Process {
            name: name.to_owned(),
            id:   u.process_id,
            args: u.process_args.clone().filter(|args| !args.is_empty()),
        },
        _ => Process {
            name: NOT_INCLUDED.to_owned(),
            id:   None,
            args: None,
        },
    }
}

impl FlowStatsByProcess {
    pub fn new(u: &Update, config: Config) -> Self {
        let mut by = Self {
            stats:  HashMap::new(),
            names:  Vec::new(),
            config: config,
        };
        by.aggregate(u);
        by
    }

    pub fn aggregate(&mut self, u: &Update) {
        let process = normalize(u, self.config.include_process);

        match self.stats.get_mut(&process.name) {
            Some(stats) => {
                stats.aggregate(u, &process);
                if self.config.debug {
                    trace!("aggregated {} into {:?}", u.tuple, stats);
                }
            }
            None => {
                if self.config.debug {
                    trace!("new process {} for {}", process.name, u.tuple);
                }
                self.names.push(process.name.clone());
                self.stats.insert(process.name.clone(), FlowStats::new(u, &process));
            }
        }
    }

    pub fn merge_with(&mut self, mut other: FlowStatsByProcess) {
        for name in other.names.drain(..) {
            let stats = match other.stats.remove(&name) {
                Some(stats) => stats,
                None        => continue,
            };

            match self.stats.get_mut(&name) {
                Some(current) => current.merge_with(stats),
                None          => {
                    self.names.push(name.clone());
                    self.stats.insert(name, stats);
                }
            }
        }
    }

    /// Moves every process's references to `u.tuple` into a new set of
    /// stats, attributed to the process of `u`.
    pub fn split_off(&mut self, u: &Update) -> FlowStatsByProcess {
        let process = normalize(u, self.config.include_process);

        let mut split = Self {
            stats:  HashMap::new(),
            names:  Vec::new(),
            config: self.config,
        };

        let by_name = &mut self.stats;

        self.names.retain(|name| {
            let stats = match by_name.get_mut(name) {
                Some(stats) if stats.contains_active(&u.tuple) => stats,
                _                                               => return true,
            };

            let mut moved = stats.split_off(&u.tuple);
            if *name == process.name {
                moved.attribute(&process);
            }

            let empty = stats.is_empty();

            split.names.push(name.clone());
            split.stats.insert(name.clone(), moved);

            // nothing left to report for this interval
            if empty {
                by_name.remove(name);
            }
            !empty
        });

        split
    }

    pub fn contains_active_refs(&self, u: &Update) -> bool {
        let process = normalize(u, self.config.include_process);
        self.stats.get(&process.name).map(|stats| {
            stats.contains_active(&u.tuple)
        }).unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.stats.values().map(FlowStats::active_count).sum()
    }

    pub fn reset(&mut self) {
        self.stats.values_mut().for_each(FlowStats::reset);
    }

    /// Drops processes without active flows and returns the number of
    /// active flows that remain.
    pub fn gc(&mut self) -> usize {
        let stats = &mut self.stats;
        let mut remaining = 0;

        self.names.retain(|name| {
            let active = stats.get(name).map(FlowStats::active_count).unwrap_or(0);
            if active == 0 {
                stats.remove(name);
                return false;
            }
            remaining += active;
            true
        });

        remaining
    }

    pub fn to_reported_stats(&self) -> Vec<ProcessReportedStats> {
        if !self.config.include_process {
            return match self.stats.get(NOT_INCLUDED) {
                Some(stats) => vec![self.unattributed(stats)],
                None        => {
                    warn!("no flow stats recorded");
                    Vec::new()
                }
            };
        }

        let limit = self.config.process_limit;

        let mut reported = Vec::with_capacity(limit + 1);
        let mut emitted  = 0;
        let mut overflow = None;

        for name in &self.names {
            let stats = match self.stats.get(name) {
                Some(stats) => stats,
                None        => {
                    warn!("stats not found for process {}", name);
                    continue;
                }
            };

            if name == NOT_INCLUDED {
                reported.push(self.unattributed(stats));
                continue;
            }

            let entry = self.attributed(name, stats);

            if emitted < limit {
                reported.push(entry);
                emitted += 1;
            } else {
                let rest = overflow.get_or_insert_with(aggregated);
                self.absorb(rest, entry);
            }
        }

        if let Some(mut rest) = overflow {
            if rest.process_args.is_empty() {
                rest.process_args.push(NOT_INCLUDED.to_owned());
            }
            reported.push(rest);
        }

        reported
    }

    fn unattributed(&self, stats: &FlowStats) -> ProcessReportedStats {
        ProcessReportedStats {
            process_name:       NOT_INCLUDED.to_owned(),
            num_process_names:  0,
            process_id:         NOT_INCLUDED.to_owned(),
            num_process_ids:    0,
            process_args:       vec![NOT_INCLUDED.to_owned()],
            num_process_args:   0,
            nat_outgoing_ports: stats.nat_ports(self.config.nat_port_limit),
            stats:              stats.reported,
            tcp:                stats.tcp,
        }
    }

    fn attributed(&self, name: &str, stats: &FlowStats) -> ProcessReportedStats {
        let pids = stats.pids();
        let pid  = match pids.len() {
            0 => NOT_INCLUDED.to_owned(),
            1 => pids.iter().map(u32::to_string).collect(),
            _ => AGGREGATED.to_owned(),
        };

        let (args, num_args) = self.args(stats);

        ProcessReportedStats {
            process_name:       name.to_owned(),
            num_process_names:  1,
            process_id:         pid,
            num_process_ids:    pids.len(),
            process_args:       args,
            num_process_args:   num_args,
            nat_outgoing_ports: stats.nat_ports(self.config.nat_port_limit),
            stats:              stats.reported,
            tcp:                stats.tcp,
        }
    }

    fn args(&self, stats: &FlowStats) -> (Vec<String>, usize) {
        let args = stats.args();

        if args.is_empty() {
            return (vec![NOT_INCLUDED.to_owned()], 0);
        }

        // a single pid reporting several args keeps only the longest,
        // the first seen on a tie
        if stats.pids().len() == 1 {
            let longest = args.iter().rev().max_by_key(|arg| arg.len());
            return (longest.into_iter().cloned().collect(), 1);
        }

        let limit = self.config.args_limit;
        (args.iter().take(limit).cloned().collect(), args.len())
    }

    fn absorb(&self, rest: &mut ProcessReportedStats, entry: ProcessReportedStats) {
        rest.num_process_names += entry.num_process_names;
        rest.num_process_ids   += entry.num_process_ids;
        rest.num_process_args  += entry.num_process_args;

        rest.stats.add(&entry.stats);
        rest.tcp.add(&entry.tcp);

        let args = entry.process_args.into_iter().filter(|arg| arg != NOT_INCLUDED);
        for arg in args {
            if rest.process_args.len() >= self.config.args_limit {
                break;
            }
            if !rest.process_args.contains(&arg) {
                rest.process_args.push(arg);
            }
        }

        let space = self.config.nat_port_limit.saturating_sub(rest.nat_outgoing_ports.len());
        rest.nat_outgoing_ports.extend(entry.nat_outgoing_ports.into_iter().take(space));
    }
}

fn aggregated() -> ProcessReportedStats {
    ProcessReportedStats {
        process_name:       AGGREGATED.to_owned(),
        num_process_names:  0,
        process_id:         AGGREGATED.to_owned(),
        num_process_ids:    0,
        process_args:       Vec::new(),
        num_process_args:   0,
        nat_outgoing_ports: Vec::new(),
        stats:              ReportedStats::default(),
        tcp:                TcpStats::default(),
    }
}
