// ## 📂 File: `src/stream/io.rs`
// ## Raw sink abstraction + shared in-memory buffer

use std::fs::File;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// A writer with an explicit close capability.
///
/// Layers call `close` exactly once, after every byte they own has been
/// written. Implementations should flush before releasing the resource.
pub trait CloseableWrite: Write {
    fn close(&mut self) -> io::Result<()>;
}

impl CloseableWrite for File {
    fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        self.sync_all()
    }
}

impl<W: CloseableWrite + ?Sized> CloseableWrite for Box<W> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Canonical output abstraction: the raw sink at the bottom of the stack.
pub enum OutputSink {
    /// Plain writer without a close capability; `close` only flushes it.
    Writer(Box<dyn Write + Send>),
    /// Writer that is closed when the stack closes.
    Closeable(Box<dyn CloseableWrite + Send>),
    /// Shared in-memory buffer; read it back through the paired `SharedBuffer`.
    Memory(SharedBufferWriter),
}

impl OutputSink {
    pub fn writer<W: Write + Send + 'static>(w: W) -> Self {
        OutputSink::Writer(Box::new(w))
    }

    pub fn closeable<W: CloseableWrite + Send + 'static>(w: W) -> Self {
        OutputSink::Closeable(Box::new(w))
    }

    /// In-memory sink plus a handle to read the bytes after the writer is gone.
    pub fn memory() -> (Self, SharedBuffer) {
        let shared = SharedBuffer::default();
        (OutputSink::Memory(shared.writer()), shared)
    }
}

impl Write for OutputSink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        match self {
            OutputSink::Writer(w) => w.write(data),
            OutputSink::Closeable(w) => w.write(data),
            OutputSink::Memory(w) => w.write(data),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputSink::Writer(w) => w.flush(),
            OutputSink::Closeable(w) => w.flush(),
            OutputSink::Memory(w) => w.flush(),
        }
    }
}

impl CloseableWrite for OutputSink {
    fn close(&mut self) -> io::Result<()> {
        match self {
            OutputSink::Writer(w) => w.flush(),
            OutputSink::Closeable(w) => w.close(),
            OutputSink::Memory(w) => w.close(),
        }
    }
}

/// Read side of an in-memory sink.
#[derive(Clone, Default, Debug)]
pub struct SharedBuffer {
    buf: Arc<Mutex<Vec<u8>>>,
    closed: Arc<AtomicBool>,
}

impl SharedBuffer {
    pub fn writer(&self) -> SharedBufferWriter {
        SharedBufferWriter { buf: self.buf.clone(), closed: self.closed.clone() }
    }

    /// Copy of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        match self.buf.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.contents().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the writer side has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct SharedBufferWriter {
    buf: Arc<Mutex<Vec<u8>>>,
    closed: Arc<AtomicBool>,
}

impl SharedBufferWriter {
    fn lock(&self) -> io::Result<MutexGuard<'_, Vec<u8>>> {
        self.buf
            .lock()
            .map_err(|_| io::Error::other("shared buffer poisoned"))
    }
}

impl Write for SharedBufferWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.closed.load(Ordering::Acquire) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "shared buffer closed"));
        }
        self.lock()?.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CloseableWrite for SharedBufferWriter {
    fn close(&mut self) -> io::Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
