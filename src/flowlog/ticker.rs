use std::thread;
use std::time::{Duration, Instant};
use crossbeam_channel::{bounded, select, Receiver, Sender};
use crossbeam_channel::TrySendError::*;
use log::debug;
use parking_lot::Mutex;
use rand::Rng;

/// Source of flush ticks. The done channel closes once the ticker stops.
pub trait Ticker: Send + Sync {
    fn channel(&self) -> Receiver<Instant>;

    fn done(&self) -> Receiver<()>;

    fn stop(&self);
}

pub struct JitterTicker {
    tick: Receiver<Instant>,
    done: Receiver<()>,
    stop: Mutex<Option<Sender<()>>>,
}

impl JitterTicker {
    pub fn new(interval: Duration, jitter: Duration) -> Self {
        let (tx, tick)   = bounded(1);
        let (stop, done) = bounded::<()>(0);

        let quit = done.clone();
        thread::spawn(move || loop {
            select! {
                recv(quit) -> _ => break,
                default(interval + spread(jitter)) => match tx.try_send(Instant::now()) {
                    Ok(_)                => (),
                    Err(Full(_))         => debug!("flush still pending, dropping tick"),
                    Err(Disconnected(_)) => break,
                },
            }
        });

        Self {
            tick: tick,
            done: done,
            stop: Mutex::new(Some(stop)),
        }
    }
}

impl Ticker for JitterTicker {
    fn channel(&self) -> Receiver<Instant> {
        self.tick.clone()
    }

    fn done(&self) -> Receiver<()> {
        self.done.clone()
    }

    fn stop(&self) {
        self.stop.lock().take();
    }
}

fn spread(jitter: Duration) -> Duration {
    match jitter.as_millis() as u64 {
        0   => Duration::from_millis(0),
        max => Duration::from_millis(rand::thread_rng().gen_range(0..=max)),
    }
}
