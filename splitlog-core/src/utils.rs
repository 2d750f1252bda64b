use std::{
    ops::Deref,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    thread::JoinHandle,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};

use crate::{LogRecord, Result, config::SPLITLOG_CONFIG, log_writer::LogWriter};

/// Default capacity of the record queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 50_000;

const BATCH_SIZE: usize = 32;

#[derive(Debug)]
pub enum LogMessage {
    Record(LogRecord),
    /// Flush the writer, then signal the carried sender.
    Flush(Sender<()>),
    Shutdown,
}

/// Bounded queue between callers and the writer thread.
///
/// Pushing never blocks: when the queue is full the record being pushed is dropped.
pub struct RecordQueue {
    sender: Sender<LogMessage>,
    dropped: AtomicU64,
    closed: AtomicBool,
}

impl RecordQueue {
    /// A capacity of 0 is raised to 1.
    pub fn bounded(capacity: usize) -> (Self, Receiver<LogMessage>) {
        let (sender, receiver) = bounded(capacity.max(1));
        let queue = Self {
            sender,
            dropped: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        };
        (queue, receiver)
    }

    /// Returns `false` if the record was dropped.
    pub fn push(&self, record: LogRecord) -> bool {
        if self.closed.load(Ordering::Acquire) {
            return false;
        }
        match self.sender.try_send(LogMessage::Record(record)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                if self.dropped.fetch_add(1, Ordering::Relaxed) == 0 {
                    log::warn!(target: "splitlog", "log queue full, dropping records");
                }
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Number of records dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn capacity(&self) -> usize {
        self.sender.capacity().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Handle on a writer thread. Shuts the thread down when dropped.
pub struct LogSender {
    queue: RecordQueue,
    handler: Mutex<Option<JoinHandle<bool>>>,
}

impl Deref for LogSender {
    type Target = RecordQueue;
    fn deref(&self) -> &Self::Target {
        &self.queue
    }
}

impl Drop for LogSender {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl LogSender {
    pub fn new(queue: RecordQueue, handler: JoinHandle<bool>) -> Self {
        Self {
            queue,
            handler: Mutex::new(Some(handler)),
        }
    }

    /// Blocks until every record queued before the call is written and the writer flushed.
    /// Returns at once after shutdown.
    pub fn flush(&self) {
        if self.queue.is_closed() {
            return;
        }
        let (ack, done) = bounded(1);
        if self.queue.sender.send(LogMessage::Flush(ack)).is_ok() {
            // Errors if the thread exits before handling the marker.
            let _ = done.recv();
        }
    }

    /// Stops accepting records, lets the thread write what is already queued and joins it.
    /// Calling it again is a no-op.
    pub fn shutdown(&self) {
        self.queue.closed.store(true, Ordering::Release);
        let handle = self
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            // Blocking send: the thread keeps draining, so room frees up.
            // Fails only if the thread is already gone.
            let _ = self.queue.sender.send(LogMessage::Shutdown);
            if !matches!(handle.join(), Ok(true)) {
                log::warn!(target: "splitlog", "log writer thread did not shut down cleanly");
            }
        }
    }
}

/// Spawns the thread that owns `writer` and writes every queued record to it, in order.
pub fn spawn_log_thread<W: LogWriter + Send + 'static>(
    mut writer: W,
    capacity: usize,
) -> Result<LogSender> {
    let (queue, receiver) = RecordQueue::bounded(capacity);
    let handler = std::thread::Builder::new()
        .name("splitlog-writer".into())
        .spawn(move || {
            let mut batch = Vec::with_capacity(BATCH_SIZE);
            let flush_interval = Duration::from_millis(SPLITLOG_CONFIG.FLUSH_INTERVAL_MS);
            let mut last_flush = Instant::now();
            loop {
                let elapsed = last_flush.elapsed();
                let timeout = if elapsed >= flush_interval {
                    Duration::from_millis(1)
                } else {
                    flush_interval - elapsed
                };

                match receiver.recv_timeout(timeout) {
                    Ok(msg) => {
                        batch.push(msg);
                        while let Ok(msg) = receiver.try_recv() {
                            batch.push(msg);
                            if batch.len() >= BATCH_SIZE {
                                break;
                            }
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        if last_flush.elapsed() >= flush_interval {
                            writer.flush();
                            last_flush = Instant::now();
                        }
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }

                let mut should_shutdown = false;
                for log_message in batch.drain(..) {
                    match log_message {
                        LogMessage::Record(record) => writer.write(&record),
                        LogMessage::Flush(ack) => {
                            writer.flush();
                            last_flush = Instant::now();
                            let _ = ack.send(());
                        }
                        LogMessage::Shutdown => {
                            should_shutdown = true;
                            break;
                        }
                    }
                }

                if should_shutdown {
                    break;
                }
                if last_flush.elapsed() >= flush_interval {
                    writer.flush();
                    last_flush = Instant::now();
                }
            }
            writer.flush();
            true
        })?;
    Ok(LogSender::new(queue, handler))
}
