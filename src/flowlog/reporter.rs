use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use anyhow::Result;
use crossbeam_channel::{select, tick};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use crate::update::{Endpoint, Update};
use super::{Aggregator, FlowLogAvg, Health};
use super::dispatch::Dispatcher;
use super::offset::LogOffset;
use super::ticker::{JitterTicker, Ticker};

const HEALTH_INTERVAL: Duration = Duration::from_secs(10);

/// Drives aggregators on a flush interval and hands their logs to dispatchers.
pub struct FlowLogReporter {
    dispatchers: HashMap<String, Arc<dyn Dispatcher>>,
    flusher:     Flusher,
    interval:    Duration,
    ticker:      Option<Arc<dyn Ticker>>,
    health:      Option<Health>,
    hep:         bool,
}

#[derive(Clone)]
struct Flusher {
    targets: Arc<Mutex<Vec<Target>>>,
    offset:  Arc<dyn LogOffset>,
    avg:     Arc<Mutex<FlowLogAvg>>,
    debug:   bool,
}

#[derive(Clone)]
struct Target {
    aggregator:  Arc<Aggregator>,
    dispatchers: Vec<(String, Arc<dyn Dispatcher>)>,
}

impl FlowLogReporter {
    pub fn new(
        dispatchers: HashMap<String, Arc<dyn Dispatcher>>,
        interval:    Duration,
        health:      Option<Health>,
        enable_hep:  bool,
        debug:       bool,
        offset:      Arc<dyn LogOffset>,
    ) -> Self {
        Self {
            dispatchers: dispatchers,
            flusher:     Flusher {
                targets: Arc::new(Mutex::new(Vec::new())),
                offset:  offset,
                avg:     Arc::new(Mutex::new(FlowLogAvg::new())),
                debug:   debug,
            },
            interval:    interval,
            ticker:      None,
            health:      health,
            hep:         enable_hep,
        }
    }

    pub fn with_ticker(mut self, ticker: Arc<dyn Ticker>) -> Self {
        self.ticker = Some(ticker);
        self
    }

    /// Registers an aggregator whose logs go to the named dispatchers,
    /// either before or after `start`.
    ///
    /// Panics if a name was not passed to `new`.
    pub fn add_aggregator(&mut self, aggregator: Arc<Aggregator>, names: &[&str]) {
        let dispatchers = names.iter().map(|name| {
            match self.dispatchers.get(*name) {
                Some(d) => (name.to_string(), d.clone()),
                None    => panic!("unknown flow log dispatcher {}", name),
            }
        }).collect();

        self.flusher.targets.lock().push(Target {
            aggregator:  aggregator,
            dispatchers: dispatchers,
        });
    }

    pub fn start(&mut self) -> Result<()> {
        let mut ready = true;
        for (name, dispatcher) in &self.dispatchers {
            if let Err(e) = dispatcher.start() {
                error!("flow log dispatcher {} failed to start: {:?}", name, e);
                ready = false;
            }
        }

        let interval = self.interval;
        let ticker   = self.ticker.get_or_insert_with(|| {
            Arc::new(JitterTicker::new(interval, interval / 10)) as Arc<dyn Ticker>
        }).clone();

        let health  = self.health.clone();
        let flusher = self.flusher.clone();

        if let Some(health) = &health {
            health.report(true, ready);
        }

        info!("flushing flow logs every {:?}", interval);

        thread::Builder::new().name("flowlog-flush".to_owned()).spawn(move || {
            let flush = ticker.channel();
            let done  = ticker.done();
            let beat  = tick(HEALTH_INTERVAL);

            loop {
                select! {
                    recv(flush) -> msg => match msg {
                        Ok(_)  => flusher.flush(),
                        Err(_) => break,
                    },
                    recv(beat) -> _ => {
                        if let Some(health) = &health {
                            health.report(true, ready);
                        }
                    },
                    recv(done) -> _ => break,
                }
            }

            debug!("flow log reporter stopped");
        })?;

        Ok(())
    }

    pub fn stop(&self) {
        if let Some(ticker) = &self.ticker {
            ticker.stop();
        }
    }

    pub fn report(&self, u: &Update) {
        let u = self.strip(u);
        for target in self.flusher.targets.lock().iter() {
            if let Err(e) = target.aggregator.feed_update(&u) {
                debug!("failed to aggregate update for {}: {}", u.tuple, e);
            }
        }
    }

    /// Exports every aggregator immediately, outside the flush interval.
    pub fn flush(&self) {
        self.flusher.flush();
    }

    pub fn update_flow_logs_avg(&self, count: usize) {
        self.flusher.avg.lock().update(count);
    }

    pub fn reset_flow_logs_avg(&self) {
        self.flusher.avg.lock().reset();
    }

    pub fn get_and_reset_flow_logs_avg_per_minute(&self) -> f64 {
        let mut avg = self.flusher.avg.lock();
        let rate = avg.per_minute();
        avg.reset();
        rate
    }

    fn strip<'a>(&self, u: &'a Update) -> Cow<'a, Update> {
        let host = |ep: &Option<Endpoint>| ep.as_ref().map(Endpoint::is_host).unwrap_or(false);

        if self.hep || !(host(&u.src_ep) || host(&u.dst_ep)) {
            return Cow::Borrowed(u);
        }

        let mut u = u.clone();
        if host(&u.src_ep) {
            u.src_ep = None;
        }
        if host(&u.dst_ep) {
            u.dst_ep = None;
        }
        Cow::Owned(u)
    }
}

impl Flusher {
    fn flush(&self) {
        let targets = self.targets.lock().clone();
        for target in &targets {
            let aggregator = &target.aggregator;

            let offsets   = self.offset.read();
            let mut level = aggregator.level();
            let kind = match self.offset.is_behind(&offsets) {
                true  => level.escalate(self.offset.increase_factor(&offsets)),
                false => level.revert_to_default(),
            };

            if self.debug && level.is_escalated() {
                debug!("log pipeline behind, aggregating over {}", kind);
            }

            let logs = aggregator.get_and_calibrate(kind);
            if logs.is_empty() {
                continue;
            }

            self.avg.lock().update(logs.len());

            for (name, dispatcher) in &target.dispatchers {
                match dispatcher.report(&logs) {
                    Ok(()) => debug!("dispatched {} flow logs to {}", logs.len(), name),
                    Err(e) => warn!("failed to dispatch flow logs to {}: {:?}", name, e),
                }
            }
        }
    }
}
