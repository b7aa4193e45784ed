use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use serde::{Serialize, Deserialize};

pub const UNSET: i32 = -1;

pub const EMPTY_IP: IpAddr = IpAddr::V6(Ipv6Addr::UNSPECIFIED);

#[derive(Copy, Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Tuple {
    pub src:    IpAddr,
    pub dst:    IpAddr,
    pub proto:  u8,
    pub l4_src: i32,
    pub l4_dst: i32,
}

impl Tuple {
    pub fn new(src: IpAddr, dst: IpAddr, proto: u8, l4_src: i32, l4_dst: i32) -> Self {
        Self {
            src:    src,
            dst:    dst,
            proto:  proto,
            l4_src: l4_src,
            l4_dst: l4_dst,
        }
    }

    pub fn without_src_port(self) -> Self {
        Self {
            l4_src: UNSET,
            ..self
        }
    }

    pub fn without_addrs(self) -> Self {
        Self {
            src:    EMPTY_IP,
            dst:    EMPTY_IP,
            l4_src: UNSET,
            ..self
        }
    }

    pub fn without_ports(self) -> Self {
        Self {
            l4_dst: UNSET,
            ..self.without_addrs()
        }
    }
}

impl Default for Tuple {
    fn default() -> Self {
        Tuple::new(EMPTY_IP, EMPTY_IP, 0, UNSET, UNSET)
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{} -> {}:{} ({})", self.src, self.l4_src, self.dst, self.l4_dst, self.proto)
    }
}
