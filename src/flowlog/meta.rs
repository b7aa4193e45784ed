use serde::Serialize;
use crate::Error;
use crate::tuple::Tuple;
use crate::update::{self, Direction, Metadata, Service, Update};
use super::Kind;

#[derive(Copy, Clone, Debug, Serialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Allow,
    Deny,
}

#[derive(Copy, Clone, Debug, Serialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Reporter {
    Src,
    Dst,
}

#[derive(Clone, Debug, Serialize, Eq, PartialEq, Hash)]
pub struct FlowMeta {
    pub tuple:       Tuple,
    pub src_meta:    Metadata,
    pub dst_meta:    Metadata,
    pub dst_service: Service,
    pub action:      Action,
    pub reporter:    Reporter,
}

impl FlowMeta {
    pub fn new(u: &Update, kind: Kind, include_service: bool) -> Result<Self, Error> {
        let meta = FlowMeta::exact(u, include_service)?;
        Ok(match kind {
            Kind::Default     => meta,
            Kind::SourcePort  => FlowMeta {
                tuple: meta.tuple.without_src_port(),
                ..meta
            },
            Kind::PrefixName  => FlowMeta {
                tuple:    meta.tuple.without_addrs(),
                src_meta: meta.src_meta.without_name(),
                dst_meta: meta.dst_meta.without_name(),
                ..meta
            },
            Kind::NoDestPorts => FlowMeta {
                tuple:       meta.tuple.without_ports(),
                src_meta:    meta.src_meta.without_name(),
                dst_meta:    meta.dst_meta.without_name(),
                dst_service: meta.dst_service.without_port_name(),
                ..meta
            },
        })
    }

    fn exact(u: &Update, include_service: bool) -> Result<Self, Error> {
        let src_meta = Metadata::new(u.src_ep.as_ref(), u.tuple.src)?;
        let dst_meta = Metadata::new(u.dst_ep.as_ref(), u.tuple.dst)?;

        let dst_service = match include_service {
            true  => Service::normalize(u.dst_service.as_ref()),
            false => Service::empty(),
        };

        let rule = u.last_rule_id().ok_or(Error::NoRuleId)?;

        let action = match rule.action {
            update::Action::Deny => Action::Deny,
            _                    => Action::Allow,
        };

        let reporter = match rule.direction {
            Direction::Ingress => Reporter::Dst,
            Direction::Egress  => Reporter::Src,
        };

        Ok(FlowMeta {
            tuple:       u.tuple,
            src_meta:    src_meta,
            dst_meta:    dst_meta,
            dst_service: dst_service,
            action:      action,
            reporter:    reporter,
        })
    }
}
