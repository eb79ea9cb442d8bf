use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, IsTerminal, Stderr, Stdout, Write};
use std::net::TcpStream;
use std::sync::Arc;

/// Destination of finished records.
///
/// Each record arrives through a single `write_record` call. Whether
/// concurrent calls interleave is up to the sink: the handlers add no
/// locking of their own. Wrap a plain `Write` in `LockedWriter` to get
/// whole-record writes from many threads.
pub trait Sink: Send + Sync {
    fn write_record(&self, record: &[u8]) -> io::Result<()>;

    /// Queried once when a console handler is built with `ColorMode::Auto`.
    fn is_terminal(&self) -> bool {
        false
    }
}

impl Sink for Stdout {
    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        self.lock().write_all(record)
    }

    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl Sink for Stderr {
    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        self.lock().write_all(record)
    }

    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl Sink for File {
    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        let mut file = self;
        file.write_all(record)
    }

    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl Sink for TcpStream {
    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        let mut stream = self;
        stream.write_all(record)
    }
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        (**self).write_record(record)
    }

    fn is_terminal(&self) -> bool {
        (**self).is_terminal()
    }
}

/// Serializes writes to any `Write` behind a mutex.
pub struct LockedWriter<W> {
    inner: Mutex<W>,
}

impl<W: Write> LockedWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

impl<W: Write + Send> Sink for LockedWriter<W> {
    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        let mut writer = self.inner.lock();
        writer.write_all(record)?;
        writer.flush()
    }
}

/// In-memory, cloneable capture of everything written. Clones share storage.
#[derive(Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.inner.lock().clone()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock()).into_owned()
    }

    /// Captured output split into lines, terminators removed.
    pub fn lines(&self) -> Vec<String> {
        self.to_string_lossy().lines().map(str::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        self.inner.lock().extend_from_slice(record);
        Ok(())
    }
}
