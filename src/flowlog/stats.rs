use std::collections::BTreeSet;
use serde::Serialize;
use crate::bounded::Capped;
use crate::tuple::{self, Tuple};
use crate::update::{SocketStats, TcpMetric, Update, UpdateType};
use super::process::Process;

#[derive(Copy, Clone, Debug, Default, Serialize, Eq, PartialEq)]
pub struct ReportedStats {
    pub packets_in:               u64,
    pub packets_out:              u64,
    pub bytes_in:                 u64,
    pub bytes_out:                u64,
    pub http_requests_allowed_in: u64,
    pub http_requests_denied_in:  u64,
    pub num_flows:                usize,
    pub num_flows_started:        usize,
    pub num_flows_completed:      usize,
}

#[derive(Copy, Clone, Debug, Default, Serialize, Eq, PartialEq)]
pub struct MeanMin {
    pub mean: i64,
    pub min:  i64,
}

#[derive(Copy, Clone, Debug, Default, Serialize, Eq, PartialEq)]
pub struct MeanMax {
    pub mean: i64,
    pub max:  i64,
}

#[derive(Copy, Clone, Debug, Default, Serialize, Eq, PartialEq)]
pub struct TcpStats {
    pub count:               i64,
    pub send_congestion_wnd: MeanMin,
    pub smooth_rtt:          MeanMax,
    pub min_rtt:             MeanMax,
    pub mss:                 MeanMin,
    pub total_retrans:       u64,
    pub lost_out:            u64,
    pub unrecovered_rto:     u64,
}

/// Per-process flow statistics for one interval.
#[derive(Clone, Debug, Default)]
pub struct FlowStats {
    pub reported: ReportedStats,
    pub tcp:      TcpStats,
    refs:         Refs,
    pids:         BTreeSet<u32>,
    args:         Capped<String>,
    stale:        bool,
}

#[derive(Clone, Debug, Default)]
struct Refs {
    started:   tuple::Set,
    completed: tuple::Set,
    active:    tuple::Set,
    total:     tuple::Set,
}

impl Refs {
    fn move_to(&mut self, other: &mut Refs, tuple: &Tuple) {
        let sets = vec![
            (&mut self.started,   &mut other.started),
            (&mut self.completed, &mut other.completed),
            (&mut self.active,    &mut other.active),
            (&mut self.total,     &mut other.total),
        ];

        for (from, to) in sets {
            if let Some(port) = from.take(tuple) {
                to.add_with_value(*tuple, port);
            }
        }
    }
}

impl ReportedStats {
    pub fn add(&mut self, other: &ReportedStats) {
        self.packets_in               += other.packets_in;
        self.packets_out              += other.packets_out;
        self.bytes_in                 += other.bytes_in;
        self.bytes_out                += other.bytes_out;
        self.http_requests_allowed_in += other.http_requests_allowed_in;
        self.http_requests_denied_in  += other.http_requests_denied_in;
        self.num_flows                += other.num_flows;
        self.num_flows_started        += other.num_flows_started;
        self.num_flows_completed      += other.num_flows_completed;
    }
}

impl MeanMin {
    fn seed(v: i64) -> Self {
        Self { mean: v, min: v }
    }

    fn sample(&mut self, v: i64, count: i64) {
        self.min  = self.min.min(v);
        self.mean = (self.mean * count + v) / (count + 1);
    }

    fn combine(&mut self, other: &MeanMin, count: i64, other_count: i64) {
        self.min  = self.min.min(other.min);
        self.mean = weighted(self.mean, count, other.mean, other_count);
    }
}

impl MeanMax {
    fn seed(v: i64) -> Self {
        Self { mean: v, max: v }
    }

    fn sample(&mut self, v: i64, count: i64) {
        self.max  = self.max.max(v);
        self.mean = (self.mean * count + v) / (count + 1);
    }

    fn combine(&mut self, other: &MeanMax, count: i64, other_count: i64) {
        self.max  = self.max.max(other.max);
        self.mean = weighted(self.mean, count, other.mean, other_count);
    }
}

impl TcpStats {
    pub fn aggregate(&mut self, s: &SocketStats, m: &TcpMetric) {
        if self.count == 0 {
            *self = TcpStats {
                count:               1,
                send_congestion_wnd: MeanMin::seed(s.send_congestion_wnd),
                smooth_rtt:          MeanMax::seed(s.smooth_rtt),
                min_rtt:             MeanMax::seed(s.min_rtt),
                mss:                 MeanMin::seed(s.mss),
                total_retrans:       m.delta_total_retrans,
                lost_out:            m.delta_lost_out,
                unrecovered_rto:     m.delta_unrecovered_rto,
            };
            return;
        }

        let n = self.count;
        self.send_congestion_wnd.sample(s.send_congestion_wnd, n);
        self.smooth_rtt.sample(s.smooth_rtt, n);
        self.min_rtt.sample(s.min_rtt, n);
        self.mss.sample(s.mss, n);

        self.total_retrans   += m.delta_total_retrans;
        self.lost_out        += m.delta_lost_out;
        self.unrecovered_rto += m.delta_unrecovered_rto;
        self.count           += 1;
    }

    pub fn add(&mut self, other: &TcpStats) {
        if other.count == 0 {
            return;
        }

        if self.count == 0 {
            *self = *other;
            return;
        }

        let (n, m) = (self.count, other.count);
        self.send_congestion_wnd.combine(&other.send_congestion_wnd, n, m);
        self.smooth_rtt.combine(&other.smooth_rtt, n, m);
        self.min_rtt.combine(&other.min_rtt, n, m);
        self.mss.combine(&other.mss, n, m);

        self.total_retrans   += other.total_retrans;
        self.lost_out        += other.lost_out;
        self.unrecovered_rto += other.unrecovered_rto;
        self.count           += other.count;
    }
}

impl FlowStats {
    pub fn new(u: &Update, p: &Process) -> Self {
        let mut stats = FlowStats::default();
        stats.aggregate(u, p);
        stats
    }

    pub fn aggregate(&mut self, u: &Update, p: &Process) {
        if self.stale {
            self.pids.clear();
            self.args.clear();
            self.stale = false;
        }

        let refs = &mut self.refs;
        let port = u.nat_outgoing_port;

        match u.kind {
            UpdateType::Report => {
                if !refs.active.contains(&u.tuple) || refs.started.contains(&u.tuple) {
                    refs.started.add_with_value(u.tuple, port);
                }
                refs.active.add_with_value(u.tuple, port);
            }
            UpdateType::Expire => {
                refs.completed.add_with_value(u.tuple, port);
                refs.active.discard(&u.tuple);
            }
        }
        refs.total.add_with_value(u.tuple, port);

        self.attribute(p);

        let r = &mut self.reported;
        r.packets_in               += u.in_metric.delta_packets;
        r.bytes_in                 += u.in_metric.delta_bytes;
        r.packets_out              += u.out_metric.delta_packets;
        r.bytes_out                += u.out_metric.delta_bytes;
        r.http_requests_allowed_in += u.in_metric.delta_allowed_http_requests;
        r.http_requests_denied_in  += u.in_metric.delta_denied_http_requests;

        if let Some(socket) = &u.socket {
            self.tcp.aggregate(socket, &u.tcp_metric);
        }

        self.sync();
    }

    /// Starts a new interval. Still active flows carry over as the
    /// baseline so they are not counted as started again.
    pub fn reset(&mut self) {
        self.refs.started.clear();
        self.refs.completed.clear();
        self.refs.total = self.refs.active.clone();

        self.reported = ReportedStats::default();
        self.tcp      = TcpStats::default();
        self.stale    = true;

        self.sync();
    }

    pub fn merge_with(&mut self, other: FlowStats) {
        if self.stale && !other.stale {
            self.pids.clear();
            self.args.clear();
            self.stale = false;
        }

        if self.stale == other.stale {
            self.pids.extend(other.pids.iter());
            self.args.extend(other.args.iter());
        }

        self.refs.started.union(&other.refs.started);
        self.refs.completed.union(&other.refs.completed);
        self.refs.active.union(&other.refs.active);
        self.refs.total.union(&other.refs.total);

        self.reported.add(&other.reported);
        self.tcp.add(&other.tcp);

        self.sync();
    }

    /// Moves the references held for `tuple` into a new, counter-free
    /// `FlowStats`. Counters already accumulated stay here.
    pub fn split_off(&mut self, tuple: &Tuple) -> FlowStats {
        let mut split = FlowStats::default();
        split.stale = self.stale;

        self.refs.move_to(&mut split.refs, tuple);

        self.sync();
        split.sync();
        split
    }

    pub fn attribute(&mut self, p: &Process) {
        if let Some(pid) = p.id {
            self.pids.insert(pid);
        }

        if let Some(args) = &p.args {
            self.args.add(args.clone());
        }
    }

    pub fn nat_ports(&self, limit: usize) -> Vec<u16> {
        let active    = self.refs.active.iter();
        let completed = self.refs.completed.iter();
        active.chain(completed).map(|(_, port)| port).filter(|port| {
            *port != 0
        }).take(limit).collect()
    }

    pub fn contains_active(&self, tuple: &Tuple) -> bool {
        self.refs.active.contains(tuple)
    }

    /// No flow was seen this interval and none is active.
    pub fn is_empty(&self) -> bool {
        self.refs.total.is_empty() && self.refs.active.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.refs.active.len()
    }

    pub fn pids(&self) -> &BTreeSet<u32> {
        &self.pids
    }

    pub fn args(&self) -> &Capped<String> {
        &self.args
    }

    fn sync(&mut self) {
        self.reported.num_flows           = self.refs.total.len();
        self.reported.num_flows_started   = self.refs.started.len();
        self.reported.num_flows_completed = self.refs.completed.len();
    }
}

fn weighted(a: i64, n: i64, b: i64, m: i64) -> i64 {
    (a * n + b * m) / (n + m)
}
