use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use serde::{Serialize, Deserialize};
use crate::Error;

pub const NOT_INCLUDED: &str = "-";

pub type Labels = BTreeMap<String, String>;

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Endpoint {
    Workload {
        id:            String,
        #[serde(default)]
        generate_name: Option<String>,
        #[serde(default)]
        labels:        Labels,
    },
    Host {
        hostname:  String,
        interface: String,
        #[serde(default)]
        labels:    Labels,
    },
    NetworkSet {
        name:      String,
        #[serde(default)]
        namespace: Option<String>,
        #[serde(default)]
        labels:    Labels,
    },
}

#[derive(Copy, Clone, Debug, Serialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Wep,
    Hep,
    Ns,
    Net,
}

#[derive(Clone, Debug, Serialize, Eq, PartialEq, Hash)]
pub struct Metadata {
    #[serde(rename = "type")]
    pub kind:            Kind,
    pub namespace:       String,
    pub name:            String,
    pub aggregated_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub struct Service {
    pub namespace: String,
    pub name:      String,
    #[serde(default)]
    pub port_name: String,
    #[serde(default)]
    pub port_num:  u16,
}

impl Endpoint {
    pub fn labels(&self) -> &Labels {
        match self {
            Endpoint::Workload   { labels, .. } => labels,
            Endpoint::Host       { labels, .. } => labels,
            Endpoint::NetworkSet { labels, .. } => labels,
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self, Endpoint::Host { .. })
    }
}

impl Metadata {
    pub fn new(ep: Option<&Endpoint>, ip: IpAddr) -> Result<Self, Error> {
        let (kind, namespace, name, aggregated) = match ep {
            Some(Endpoint::Workload { id, generate_name, .. }) => {
                let (ns, name) = split_workload_id(id)?;
                let aggregated = match generate_name.as_deref() {
                    Some(prefix) if !prefix.is_empty() => format!("{}*", prefix),
                    _                                  => name.to_owned(),
                };
                (Kind::Wep, ns.to_owned(), name.to_owned(), aggregated)
            }
            Some(Endpoint::Host { hostname, interface, .. }) => {
                (Kind::Hep, NOT_INCLUDED.to_owned(), interface.clone(), hostname.clone())
            }
            Some(Endpoint::NetworkSet { name, namespace, .. }) => {
                let ns = namespace.as_deref().unwrap_or(NOT_INCLUDED);
                (Kind::Ns, ns.to_owned(), NOT_INCLUDED.to_owned(), name.clone())
            }
            None => {
                let aggregated = match is_private(ip) {
                    true  => "pvt",
                    false => "pub",
                };
                (Kind::Net, NOT_INCLUDED.to_owned(), NOT_INCLUDED.to_owned(), aggregated.to_owned())
            }
        };

        Ok(Self {
            kind:            kind,
            namespace:       namespace,
            name:            name,
            aggregated_name: aggregated,
        })
    }

    pub fn without_name(self) -> Self {
        Self {
            name: NOT_INCLUDED.to_owned(),
            ..self
        }
    }
}

impl Service {
    pub fn empty() -> Self {
        Self {
            namespace: NOT_INCLUDED.to_owned(),
            name:      NOT_INCLUDED.to_owned(),
            port_name: NOT_INCLUDED.to_owned(),
            port_num:  0,
        }
    }

    pub fn normalize(svc: Option<&Service>) -> Self {
        let field = |s: &str| match s {
            "" => NOT_INCLUDED.to_owned(),
            s  => s.to_owned(),
        };

        match svc {
            Some(svc) => Self {
                namespace: field(&svc.namespace),
                name:      field(&svc.name),
                port_name: field(&svc.port_name),
                port_num:  svc.port_num,
            },
            None => Self::empty(),
        }
    }

    pub fn without_port_name(self) -> Self {
        Self {
            port_name: NOT_INCLUDED.to_owned(),
            ..self
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Kind::Wep => "wep",
            Kind::Hep => "hep",
            Kind::Ns  => "ns",
            Kind::Net => "net",
        })
    }
}

fn split_workload_id(id: &str) -> Result<(&str, &str), Error> {
    let mut parts = id.splitn(2, '/');
    match (parts.next(), parts.next()) {
        (Some(ns), Some(name)) if !ns.is_empty() && !name.is_empty() => Ok((ns, name)),
        _                                                            => Err(Error::Metadata(id.to_owned())),
    }
}

pub fn is_private(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ip) => ip.is_private(),
        IpAddr::V6(ip) => match ip.to_ipv4() {
            Some(v4) => v4.is_private(),
            None     => ip.segments()[0] & 0xfe00 == 0xfc00,
        },
    }
}
