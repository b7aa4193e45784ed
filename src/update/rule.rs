use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use crate::Error;

pub const STAGED_PREFIX: &str = "staged:";

#[derive(Copy, Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Allow,
    Deny,
    Pass,
    NextTier,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ingress,
    Egress,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub struct RuleId {
    pub tier:      String,
    pub name:      String,
    #[serde(default)]
    pub namespace: String,
    pub direction: Direction,
    pub action:    Action,
    pub index:     i32,
}

impl RuleId {
    pub fn is_staged(&self) -> bool {
        self.name.starts_with(STAGED_PREFIX)
    }

    /// `<tier>.<name>`, prefixed by `<namespace>/` for namespaced policies.
    /// A staged prefix stays on the name.
    pub fn policy_name(&self) -> String {
        match self.namespace.as_str() {
            "" => format!("{}.{}", self.tier, self.name),
            ns => format!("{}/{}.{}", ns, self.tier, self.name),
        }
    }

    /// Canonical policy trace entry at position `idx` of a trace.
    pub fn trace(&self, idx: usize) -> String {
        format!("{}|{}|{}|{}|{}", idx, self.tier, self.policy_name(), self.action, self.index)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Action::Allow    => "allow",
            Action::Deny     => "deny",
            Action::Pass     => "pass",
            Action::NextTier => "next-tier",
        })
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow"     => Ok(Action::Allow),
            "deny"      => Ok(Action::Deny),
            "pass"      => Ok(Action::Pass),
            "next-tier" => Ok(Action::NextTier),
            _           => Err(Error::Action(s.to_owned())),
        }
    }
}
