use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use crate::Error;

/// Aggregation granularity, ordered from finest to coarsest.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    Default,
    SourcePort,
    PrefixName,
    NoDestPorts,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Level {
    applied:   Kind,
    default:   Kind,
    escalated: bool,
    changed:   bool,
}

impl Kind {
    pub const MAX: Kind = Kind::NoDestPorts;

    const ALL: [Kind; 4] = [
        Kind::Default,
        Kind::SourcePort,
        Kind::PrefixName,
        Kind::NoDestPorts,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(n: usize) -> Kind {
        Self::ALL.get(n).copied().unwrap_or(Kind::MAX)
    }

    pub fn escalate(self, by: usize) -> Kind {
        Kind::from_index(self.index().saturating_add(by))
    }
}

impl Level {
    pub fn new(kind: Kind) -> Self {
        Self {
            applied:   kind,
            default:   kind,
            escalated: false,
            changed:   false,
        }
    }

    pub fn applied(&self) -> Kind {
        self.applied
    }

    pub fn base(&self) -> Kind {
        self.default
    }

    pub fn is_escalated(&self) -> bool {
        self.escalated
    }

    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn escalate(&mut self, by: usize) -> Kind {
        let next = self.applied.escalate(by);
        self.adjust(next);
        next
    }

    pub fn revert_to_default(&mut self) -> Kind {
        let default = self.default;
        self.adjust(default);
        default
    }

    pub fn adjust(&mut self, to: Kind) -> bool {
        self.changed   = self.applied != to;
        self.applied   = to;
        self.escalated = to > self.default;
        self.changed
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Kind::Default     => "default",
            Kind::SourcePort  => "source-port",
            Kind::PrefixName  => "prefix-name",
            Kind::NoDestPorts => "no-dest-ports",
        })
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default"       | "0" => Ok(Kind::Default),
            "source-port"   | "1" => Ok(Kind::SourcePort),
            "prefix-name"   | "2" => Ok(Kind::PrefixName),
            "no-dest-ports" | "3" => Ok(Kind::NoDestPorts),
            _                     => Err(Error::Level(s.to_owned())),
        }
    }
}
