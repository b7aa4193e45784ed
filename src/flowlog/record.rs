use std::fmt;
use serde::{Serialize, Deserialize};
use time::Timespec;
use super::labels::FlowLabels;
use super::meta::FlowMeta;
use super::policy::PolicySet;
use super::process::ProcessReportedStats;
use super::spec::FlowExtras;

#[derive(Copy, Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd)]
pub struct Timestamp(#[serde(with = "crate::serde::secs")] pub Timespec);

/// A finished flow record covering one export interval.
#[derive(Clone, Debug, Serialize, Eq, PartialEq)]
pub struct FlowLog {
    pub start_time:        Timestamp,
    pub end_time:          Timestamp,
    #[serde(flatten)]
    pub meta:              FlowMeta,
    #[serde(flatten)]
    pub labels:            Option<FlowLabels>,
    pub domains:           Vec<String>,
    #[serde(flatten)]
    pub extras:            FlowExtras,
    #[serde(flatten)]
    pub stats:             ProcessReportedStats,
    pub all_policies:      Option<PolicySet>,
    pub enforced_policies: Option<PolicySet>,
    pub pending_policies:  Option<PolicySet>,
}

impl Timestamp {
    pub fn now() -> Self {
        Timestamp(time::get_time())
    }

    pub fn secs(&self) -> i64 {
        self.0.sec
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.sec)
    }
}
