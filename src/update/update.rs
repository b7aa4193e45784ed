use serde::{Serialize, Deserialize};
use crate::bounded::BoundedSet;
use crate::tuple::Tuple;
use super::{Endpoint, RuleId, Service};

#[derive(Copy, Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    Report,
    Expire,
}

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Metric {
    pub delta_packets:               u64,
    pub delta_bytes:                 u64,
    pub delta_allowed_http_requests: u64,
    pub delta_denied_http_requests:  u64,
}

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct TcpMetric {
    pub delta_total_retrans:   u64,
    pub delta_lost_out:        u64,
    pub delta_unrecovered_rto: u64,
}

/// Socket level TCP sample, absent when socket stats collection is off.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct SocketStats {
    pub send_congestion_wnd: i64,
    pub smooth_rtt:          i64,
    pub min_rtt:             i64,
    pub mss:                 i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Update {
    #[serde(rename = "type")]
    pub kind:              UpdateType,
    pub tuple:             Tuple,
    #[serde(default)]
    pub nat_outgoing_port: u16,
    #[serde(default)]
    pub orig_source_ips:   Option<BoundedSet>,
    #[serde(default)]
    pub src_ep:            Option<Endpoint>,
    #[serde(default)]
    pub dst_ep:            Option<Endpoint>,
    #[serde(default)]
    pub dst_service:       Option<Service>,
    #[serde(default)]
    pub dst_domains:       Vec<String>,
    #[serde(default)]
    pub is_connection:     bool,
    #[serde(default)]
    pub rule_ids:          Vec<RuleId>,
    #[serde(default)]
    pub pending_rule_ids:  Vec<RuleId>,
    #[serde(default)]
    pub has_deny_rule:     bool,
    #[serde(default)]
    pub unknown_rule_id:   Option<RuleId>,
    #[serde(default)]
    pub in_metric:         Metric,
    #[serde(default)]
    pub out_metric:        Metric,
    #[serde(default)]
    pub process_name:      Option<String>,
    #[serde(default)]
    pub process_id:        Option<u32>,
    #[serde(default)]
    pub process_args:      Option<String>,
    #[serde(default)]
    pub socket:            Option<SocketStats>,
    #[serde(default)]
    pub tcp_metric:        TcpMetric,
}

impl Update {
    pub fn new(kind: UpdateType, tuple: Tuple) -> Self {
        Self {
            kind:              kind,
            tuple:             tuple,
            nat_outgoing_port: 0,
            orig_source_ips:   None,
            src_ep:            None,
            dst_ep:            None,
            dst_service:       None,
            dst_domains:       Vec::new(),
            is_connection:     false,
            rule_ids:          Vec::new(),
            pending_rule_ids:  Vec::new(),
            has_deny_rule:     false,
            unknown_rule_id:   None,
            in_metric:         Metric::default(),
            out_metric:        Metric::default(),
            process_name:      None,
            process_id:        None,
            process_args:      None,
            socket:            None,
            tcp_metric:        TcpMetric::default(),
        }
    }

    /// The rule that decided the flow's fate, falling back to the
    /// unknown-rule placeholder when no policy matched.
    pub fn last_rule_id(&self) -> Option<&RuleId> {
        self.rule_ids.last().or_else(|| self.unknown_rule_id.as_ref())
    }
}
