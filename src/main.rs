use std::collections::HashMap;
use std::io::{self, BufRead};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use anyhow::Result;
use clap::{App, load_yaml, value_t};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use env_logger::Builder;
use jemallocator::Jemalloc;
use log::{debug, error, info, warn};
use log::LevelFilter::*;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag::register;
use flowlog::args::{input, opt};
use flowlog::flowlog::{Aggregator, Config, Dispatcher, FlowLogReporter, JsonDispatcher, Kind, NoOpLogOffset};
use flowlog::update::Update;

#[global_allocator]
static ALLOC: Jemalloc = Jemalloc;

fn main() -> Result<()> {
    let yaml = load_yaml!("args.yml");
    let ver  = env!("CARGO_PKG_VERSION");
    let args = App::from_yaml(&yaml).version(ver).get_matches();

    let interval = value_t!(args, "interval", u64)?;
    let level    = opt(args.value_of("level"))?.unwrap_or(Kind::Default);
    let action   = opt(args.value_of("action"))?;

    let defaults = Config::default();
    let process  = opt(args.value_of("process-limit"))?.unwrap_or(defaults.process_limit);
    let argv     = opt(args.value_of("args-limit"))?.unwrap_or(defaults.args_limit);
    let nat      = opt(args.value_of("nat-port-limit"))?.unwrap_or(defaults.nat_port_limit);
    let ips      = opt(args.value_of("max-orig-ips"))?.unwrap_or(defaults.max_orig_ips);
    let domains  = opt(args.value_of("max-domains"))?.unwrap_or(defaults.max_domains);

    let debug    = args.is_present("debug");
    let hep      = args.is_present("hep");
    let input    = input(args.value_of("input"))?;

    let (module, level_filter) = match args.occurrences_of("verbose") {
        0 => (Some(module_path!()), Info),
        1 => (Some(module_path!()), Debug),
        2 => (Some(module_path!()), Trace),
        _ => (None,                 Trace),
    };
    Builder::from_default_env().filter(module, level_filter).init();

    info!("initializing flowlog {}", ver);

    let shutdown = Arc::new(AtomicBool::new(false));
    register(SIGTERM, shutdown.clone())?;
    register(SIGINT,  shutdown.clone())?;

    let aggregator = Arc::new(Aggregator::new()
        .for_action(action)
        .aggregate_over(level)
        .include_labels(args.is_present("labels"))
        .include_policies(args.is_present("policies"))
        .include_process(args.is_present("process"))
        .include_service(args.is_present("service"))
        .per_flow_process_limit(process)
        .per_flow_process_args_limit(argv)
        .nat_outgoing_port_limit(nat)
        .max_original_ips_size(ips)
        .max_domains(domains)
        .display_debug_trace_logs(debug));

    let mut dispatchers: HashMap<String, Arc<dyn Dispatcher>> = HashMap::new();
    dispatchers.insert("stdout".to_owned(), Arc::new(JsonDispatcher::new(io::stdout())));

    let interval = Duration::from_secs(interval);
    let offset   = Arc::new(NoOpLogOffset);

    let mut reporter = FlowLogReporter::new(dispatchers, interval, None, hep, debug, offset);
    reporter.add_aggregator(aggregator.clone(), &["stdout"]);
    reporter.start()?;

    let (tx, rx) = bounded(1_000);
    thread::spawn(move || match replay(input, tx) {
        Ok(n)  => debug!("replayed {} updates", n),
        Err(e) => error!("replay failed: {:?}", e),
    });

    let timeout = Duration::from_millis(100);

    while !shutdown.load(Ordering::Acquire) {
        match rx.recv_timeout(timeout) {
            Ok(update)                          => reporter.report(&update),
            Err(RecvTimeoutError::Timeout)      => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    reporter.flush();
    reporter.stop();

    let stats = aggregator.stats();
    info!("accepted {}, filtered {}, rejected {} updates", stats.accepted, stats.filtered, stats.rejected);
    info!("exported {} flow logs, {:.2} per minute", stats.exported, reporter.get_and_reset_flow_logs_avg_per_minute());

    Ok(())
}

fn replay(input: Box<dyn BufRead + Send>, tx: Sender<Update>) -> Result<usize> {
    let mut count = 0;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str(&line) {
            Ok(update) => tx.send(update)?,
            Err(e)     => warn!("invalid update: {}", e),
        }

        count += 1;
    }

    Ok(count)
}
