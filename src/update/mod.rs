pub use endpoint::{Endpoint, Labels, Metadata, Service};
pub use rule::{Action, Direction, RuleId};
pub use update::{Metric, SocketStats, TcpMetric, Update, UpdateType};

pub mod endpoint;
pub mod rule;

mod update;
