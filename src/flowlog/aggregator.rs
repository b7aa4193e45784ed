use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use log::{debug, trace, warn};
use parking_lot::Mutex;
use crate::Error;
use crate::tuple::Tuple;
use crate::update::{Action, Update, UpdateType};
use super::{FlowLog, FlowMeta, FlowSpec, Kind, Level, Timestamp};
use super::ratelimit::RateLimited;
use super::spec::Config;

/// Groups metric updates into flow logs at a configurable granularity.
pub struct Aggregator {
    inner:    Mutex<Inner>,
    action:   Option<Action>,
    labels:   bool,
    policies: bool,
    service:  bool,
    config:   Config,
    counters: Counters,
    split:    RateLimited,
    unpaired: RateLimited,
}

struct Inner {
    store: HashMap<FlowMeta, Stored>,
    level: Level,
    start: Timestamp,
}

struct Stored {
    spec:   FlowSpec,
    last:   Update,
    active: HashMap<Tuple, Update>,
}

#[derive(Default)]
pub struct Counters {
    accepted: AtomicU64,
    filtered: AtomicU64,
    rejected: AtomicU64,
    exported: AtomicU64,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    pub accepted: u64,
    pub filtered: u64,
    pub rejected: u64,
    pub exported: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            inner:    Mutex::new(Inner {
                store: HashMap::new(),
                level: Level::new(Kind::Default),
                start: Timestamp::now(),
            }),
            action:   None,
            labels:   false,
            policies: false,
            service:  false,
            config:   Config::default(),
            counters: Counters::default(),
            split:    RateLimited::new(Duration::from_secs(60)),
            unpaired: RateLimited::new(Duration::from_secs(60)),
        }
    }

    pub fn for_action(mut self, action: Option<Action>) -> Self {
        self.action = action;
        self
    }

    pub fn aggregate_over(self, kind: Kind) -> Self {
        self.inner.lock().level = Level::new(kind);
        self
    }

    pub fn include_labels(mut self, include: bool) -> Self {
        self.labels = include;
        self
    }

    pub fn include_policies(mut self, include: bool) -> Self {
        self.policies = include;
        self
    }

    pub fn include_process(mut self, include: bool) -> Self {
        self.config.include_process = include;
        self
    }

    pub fn include_service(mut self, include: bool) -> Self {
        self.service = include;
        self
    }

    pub fn per_flow_process_limit(mut self, limit: usize) -> Self {
        self.config.process_limit = limit;
        self
    }

    pub fn per_flow_process_args_limit(mut self, limit: usize) -> Self {
        self.config.args_limit = limit;
        self
    }

    pub fn nat_outgoing_port_limit(mut self, limit: usize) -> Self {
        self.config.nat_port_limit = limit;
        self
    }

    pub fn max_original_ips_size(mut self, size: usize) -> Self {
        self.config.max_orig_ips = size;
        self
    }

    pub fn max_domains(mut self, max: usize) -> Self {
        self.config.max_domains = max;
        self
    }

    pub fn display_debug_trace_logs(mut self, display: bool) -> Self {
        self.config.debug = display;
        self
    }

    pub fn feed_update(&self, u: &Update) -> Result<(), Error> {
        if let (Some(action), Some(rule)) = (self.action, u.last_rule_id()) {
            if rule.action != action {
                self.counters.filtered.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
        }

        let mut inner = self.inner.lock();

        let meta = FlowMeta::new(u, inner.level.applied(), self.service).map_err(|e| {
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            e
        })?;

        if self.config.debug {
            trace!("flow meta {:?} for update {}", meta, u.tuple);
        }

        let stored = match inner.store.entry(meta) {
            Entry::Occupied(e) => {
                let stored = e.into_mut();
                stored.spec.aggregate(u);
                stored.last = u.clone();
                stored
            }
            Entry::Vacant(e) => e.insert(Stored {
                spec:   FlowSpec::new(u, self.config),
                last:   u.clone(),
                active: HashMap::new(),
            }),
        };

        match u.kind {
            UpdateType::Report => stored.active.insert(u.tuple, u.clone()),
            UpdateType::Expire => stored.active.remove(&u.tuple),
        };

        self.counters.accepted.fetch_add(1, Ordering::Relaxed);

        Ok(())
    }

    /// Exports every flow at `kind`, then starts a new interval and drops
    /// flows with no remaining active connections.
    pub fn get_and_calibrate(&self, kind: Kind) -> Vec<FlowLog> {
        let mut inner = self.inner.lock();

        self.apply(&mut inner, kind);

        let start = inner.start;
        let end   = Timestamp::now();
        inner.start = end;

        let mut logs = Vec::with_capacity(inner.store.len());
        for (meta, stored) in &inner.store {
            if self.policies {
                self.warn(meta, &stored.spec);
            }
            logs.extend(stored.spec.to_flow_logs(meta, start, end, self.labels, self.policies));
        }

        let before = inner.store.len();
        inner.store.retain(|_, stored| {
            let Stored { spec, active, .. } = stored;
            spec.reset();
            active.retain(|_, u| spec.contains_active_refs(u));
            spec.gc() > 0
        });

        debug!("exported {} flow logs for {}-{}, purged {} of {} flows", logs.len(), start, end, before - inner.store.len(), before);

        self.counters.exported.fetch_add(logs.len() as u64, Ordering::Relaxed);

        logs
    }

    pub fn adjust_level(&self, kind: Kind) {
        let mut inner = self.inner.lock();
        self.apply(&mut inner, kind);
    }

    pub fn level(&self) -> Level {
        self.inner.lock().level
    }

    pub fn current_level(&self) -> Kind {
        self.inner.lock().level.applied()
    }

    pub fn default_level(&self) -> Kind {
        self.inner.lock().level.base()
    }

    pub fn aggregation_level_changed(&self) -> bool {
        self.inner.lock().level.changed()
    }

    pub fn contains_active_refs(&self, u: &Update) -> bool {
        let inner = self.inner.lock();
        match FlowMeta::new(u, inner.level.applied(), self.service) {
            Ok(meta) => inner.store.get(&meta).map(|s| s.spec.contains_active_refs(u)).unwrap_or(false),
            Err(_)   => false,
        }
    }

    pub fn flows(&self) -> usize {
        self.inner.lock().store.len()
    }

    pub fn stats(&self) -> Stats {
        Stats {
            accepted: self.counters.accepted.load(Ordering::Relaxed),
            filtered: self.counters.filtered.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            exported: self.counters.exported.load(Ordering::Relaxed),
        }
    }

    fn apply(&self, inner: &mut Inner, kind: Kind) {
        let from = inner.level.applied();
        if inner.level.adjust(kind) {
            debug!("aggregation level changed from {} to {}", from, kind);
            self.rekey(inner);
        }
    }

    /// Re-derives every key at the applied level. Each active flow follows
    /// the key of its own last update, so entries merged at a coarser level
    /// split apart again when the level is lowered.
    fn rekey(&self, inner: &mut Inner) {
        let kind  = inner.level.applied();
        let store = mem::take(&mut inner.store);

        for (meta, mut stored) in store {
            let key = FlowMeta::new(&stored.last, kind, self.service).unwrap_or(meta);

            let moved = stored.active.values().filter_map(|u| {
                match FlowMeta::new(u, kind, self.service) {
                    Ok(meta) if meta != key => Some((meta, u.clone())),
                    _                       => None,
                }
            }).collect::<Vec<_>>();

            for (meta, u) in moved {
                stored.active.remove(&u.tuple);

                let spec = stored.spec.split_off(&u, self.config);
                if spec.is_empty() {
                    continue;
                }

                let mut active = HashMap::new();
                active.insert(u.tuple, u.clone());

                merge(&mut inner.store, meta, Stored {
                    spec:   spec,
                    last:   u,
                    active: active,
                });
            }

            if !stored.spec.is_empty() {
                merge(&mut inner.store, key, stored);
            }
        }
    }

    fn warn(&self, meta: &FlowMeta, spec: &FlowSpec) {
        if spec.is_split() && self.split.ready() {
            warn!("flow {} split into multiple flow logs, multiple policy traces observed", meta.tuple);
        }

        if spec.is_unpaired() && self.unpaired.ready() {
            warn!("flow {} has differing all and enforced policy traces, only all traces included", meta.tuple);
        }
    }
}

fn merge(store: &mut HashMap<FlowMeta, Stored>, key: FlowMeta, stored: Stored) {
    match store.entry(key) {
        Entry::Occupied(mut e) => {
            let current = e.get_mut();
            current.spec.merge_with(stored.spec);
            current.last = stored.last;
            current.active.extend(stored.active);
        }
        Entry::Vacant(e) => {
            e.insert(stored);
        }
    }
}
