//! Output sinks for `print` and `debug`.
//!
//! The default sink writes to stdout. Hosts that render script output
//! themselves, and tests, install a [`BufferSink`] or a callback.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use parking_lot::Mutex;

/// Captures output in memory.
pub struct BufferSink {
    buffer: Mutex<String>,
}

impl BufferSink {
    pub fn new() -> Self {
        BufferSink {
            buffer: Mutex::new(String::new()),
        }
    }

    pub fn println(&self, msg: &str) {
        let mut buffer = self.buffer.lock();
        buffer.push_str(msg);
        buffer.push('\n');
    }

    pub fn get_output(&self) -> String {
        self.buffer.lock().clone()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Default for BufferSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Where script output goes.
#[derive(Clone, Default)]
pub enum OutputSink {
    /// Writes to stdout (default).
    #[default]
    Stdout,
    /// Captures to a shared buffer.
    Buffer(Arc<BufferSink>),
    /// Hands every line to the host.
    Callback(Rc<dyn Fn(&str)>),
    /// Discards all output.
    Silent,
}

impl OutputSink {
    /// A fresh capturing sink and the handle to read it back.
    pub fn buffer() -> (Self, Arc<BufferSink>) {
        let sink = Arc::new(BufferSink::new());
        (OutputSink::Buffer(Arc::clone(&sink)), sink)
    }

    pub fn callback(f: impl Fn(&str) + 'static) -> Self {
        OutputSink::Callback(Rc::new(f))
    }

    /// Write one line.
    pub fn println(&self, msg: &str) {
        match self {
            OutputSink::Stdout => println!("{msg}"),
            OutputSink::Buffer(sink) => sink.println(msg),
            OutputSink::Callback(f) => f(msg),
            OutputSink::Silent => {}
        }
    }

    /// Captured output; empty for sinks that don't capture.
    pub fn get_output(&self) -> String {
        match self {
            OutputSink::Buffer(sink) => sink.get_output(),
            OutputSink::Stdout | OutputSink::Callback(_) | OutputSink::Silent => String::new(),
        }
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputSink::Stdout => "Stdout",
            OutputSink::Buffer(_) => "Buffer",
            OutputSink::Callback(_) => "Callback",
            OutputSink::Silent => "Silent",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests;
