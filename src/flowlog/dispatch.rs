use std::io::Write;
use anyhow::Result;
use parking_lot::Mutex;
use super::record::FlowLog;

/// An output sink for finished flow logs.
pub trait Dispatcher: Send + Sync {
    fn start(&self) -> Result<()>;

    fn report(&self, logs: &[FlowLog]) -> Result<()>;
}

/// Writes each flow log as one line of JSON.
pub struct JsonDispatcher<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonDispatcher<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> Dispatcher for JsonDispatcher<W> {
    fn start(&self) -> Result<()> {
        Ok(())
    }

    fn report(&self, logs: &[FlowLog]) -> Result<()> {
        let mut out = self.out.lock();
        for log in logs {
            serde_json::to_writer(&mut *out, log)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(())
    }
}
