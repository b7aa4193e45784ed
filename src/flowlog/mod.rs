pub use aggregator::{Aggregator, Stats};
pub use avg::FlowLogAvg;
pub use dispatch::{Dispatcher, JsonDispatcher};
pub use health::{Health, Report};
pub use labels::FlowLabels;
pub use level::{Kind, Level};
pub use meta::{Action, FlowMeta, Reporter};
pub use offset::{LogOffset, NoOpLogOffset, Offsets};
pub use policy::{PolicySet, PolicySets};
pub use process::{FlowStatsByProcess, Process, ProcessReportedStats};
pub use record::{FlowLog, Timestamp};
pub use reporter::FlowLogReporter;
pub use spec::{Config, FlowExtras, FlowSpec, Phase};
pub use stats::{FlowStats, ReportedStats, TcpStats};
pub use ticker::{JitterTicker, Ticker};

mod aggregator;
mod avg;
mod dispatch;
mod health;
mod labels;
mod level;
mod meta;
mod offset;
mod policy;
mod process;
mod ratelimit;
mod record;
mod reporter;
mod spec;
mod stats;
mod ticker;
