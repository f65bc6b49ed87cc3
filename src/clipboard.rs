//! Clipboard access.
//!
//! Copy actions hand their text to a [`Clipboard`] and move on. A failed
//! write is logged by the caller and otherwise ignored.

use std::sync::{Mutex, mpsc};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::error::ClipboardError;

/// Something that can receive copied text.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Platform clipboard operations, run on the thread that owns the handle.
trait Backend {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;

    /// Serve `text` until another program takes the clipboard over.
    fn hold(&mut self, text: &str) -> Result<(), ClipboardError>;
}

struct Arboard(arboard::Clipboard);

impl Arboard {
    fn open() -> Result<Self, ClipboardError> {
        arboard::Clipboard::new()
            .map(Self)
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }
}

impl Backend for Arboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.0
            .set_text(text)
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()))
    }

    // X11 and Wayland selections live only as long as their owner.
    #[cfg(target_os = "linux")]
    fn hold(&mut self, text: &str) -> Result<(), ClipboardError> {
        use arboard::SetExtLinux;
        self.0
            .set()
            .wait()
            .text(text)
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()))
    }

    #[cfg(not(target_os = "linux"))]
    fn hold(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Ok(())
    }
}

enum Request {
    Write {
        text: String,
        reply: mpsc::Sender<Result<(), ClipboardError>>,
    },
    Persist,
}

fn serve<B, F>(open: F, requests: mpsc::Receiver<Request>)
where
    B: Backend,
    F: FnOnce() -> Result<B, ClipboardError>,
{
    let mut backend = open();
    if let Err(e) = &backend {
        debug!("System clipboard not available: {}", e);
    }
    let mut last: Option<String> = None;

    while let Ok(request) = requests.recv() {
        match request {
            Request::Write { text, reply } => {
                let result = match backend.as_mut() {
                    Ok(b) => b.set_text(&text),
                    Err(e) => Err(e.clone()),
                };
                if result.is_ok() {
                    last = Some(text);
                }
                let _ = reply.send(result);
            }
            Request::Persist => {
                if let Ok(b) = backend.as_mut()
                    && let Some(text) = last.as_deref()
                    && let Err(e) = b.hold(text)
                {
                    warn!("Could not keep the copied text on the clipboard: {}", e);
                }
                break;
            }
        }
    }
}

/// The desktop clipboard.
///
/// One arboard handle lives on a dedicated thread for as long as this value
/// does, so interactive sessions keep serving what they copied. Dropping it
/// releases the handle, which on Linux hands the contents to a running
/// clipboard manager if there is one. One-shot commands call
/// [`persist`](SystemClipboard::persist) before exiting.
pub struct SystemClipboard {
    requests: Mutex<Option<mpsc::Sender<Request>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

fn stopped() -> ClipboardError {
    ClipboardError::Unavailable("clipboard thread stopped".to_string())
}

impl SystemClipboard {
    /// Start the thread that owns the clipboard handle.
    pub fn spawn() -> Result<Self, ClipboardError> {
        Self::spawn_with(Arboard::open)
    }

    fn spawn_with<B, F>(open: F) -> Result<Self, ClipboardError>
    where
        B: Backend + 'static,
        F: FnOnce() -> Result<B, ClipboardError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("clipboard".to_string())
            .spawn(move || serve(open, rx))
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        Ok(Self {
            requests: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Keep the last copied text available after this process exits.
    ///
    /// On Linux this blocks until another program takes the clipboard over.
    /// Elsewhere it returns right away. Later writes fail.
    pub fn persist(&self) {
        if let Ok(mut requests) = self.requests.lock()
            && let Some(tx) = requests.take()
        {
            let _ = tx.send(Request::Persist);
        }
        self.join();
    }

    fn join(&self) {
        let handle = self.worker.lock().ok().and_then(|mut worker| worker.take());
        if let Some(handle) = handle
            && handle.join().is_err()
        {
            warn!("Clipboard thread panicked");
        }
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let (reply, response) = mpsc::channel();
        {
            let requests = self.requests.lock().map_err(|_| stopped())?;
            let tx = requests.as_ref().ok_or_else(stopped)?;
            tx.send(Request::Write {
                text: text.to_string(),
                reply,
            })
            .map_err(|_| stopped())?;
        }
        response.recv().map_err(|_| stopped())?
    }
}

impl Drop for SystemClipboard {
    fn drop(&mut self) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.take();
        }
        self.join();
    }
}

/// Clipboard that keeps every write in memory.
///
/// Used for headless sessions (`--no-clipboard`) and tests.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    writes: Mutex<Vec<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent write, if any.
    pub fn last(&self) -> Option<String> {
        self.writes.lock().ok()?.last().cloned()
    }

    /// All writes in order.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.writes
            .lock()
            .map_err(|_| ClipboardError::WriteFailed("clipboard lock poisoned".to_string()))?
            .push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Default)]
    struct Recorder {
        events: Arc<Mutex<Vec<String>>>,
        opens: Arc<AtomicUsize>,
    }

    impl Recorder {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    struct FakeBackend(Recorder);

    impl Backend for FakeBackend {
        fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            self.0.events.lock().unwrap().push(format!("set:{}", text));
            Ok(())
        }

        fn hold(&mut self, text: &str) -> Result<(), ClipboardError> {
            self.0.events.lock().unwrap().push(format!("hold:{}", text));
            Ok(())
        }
    }

    fn fake_system(recorder: &Recorder) -> SystemClipboard {
        let recorder = recorder.clone();
        SystemClipboard::spawn_with(move || {
            recorder.opens.fetch_add(1, Ordering::SeqCst);
            Ok(FakeBackend(recorder))
        })
        .unwrap()
    }

    #[test]
    fn test_memory_clipboard_records_writes() {
        let clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.last(), None);

        clipboard.write_text("Use @writer").unwrap();
        clipboard.write_text("# Writer").unwrap();

        assert_eq!(clipboard.last().as_deref(), Some("# Writer"));
        assert_eq!(clipboard.writes(), vec!["Use @writer", "# Writer"]);
    }

    #[test]
    fn test_system_clipboard_keeps_one_handle() {
        let recorder = Recorder::default();
        let clipboard = fake_system(&recorder);

        clipboard.write_text("Use @writer").unwrap();
        clipboard.write_text("# Writer").unwrap();
        drop(clipboard);

        assert_eq!(recorder.opens.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.events(), vec!["set:Use @writer", "set:# Writer"]);
    }

    #[test]
    fn test_persist_holds_last_write() {
        let recorder = Recorder::default();
        let clipboard = fake_system(&recorder);

        clipboard.write_text("Use @writer").unwrap();
        clipboard.write_text("# Writer").unwrap();
        clipboard.persist();

        assert_eq!(recorder.events().last().map(String::as_str), Some("hold:# Writer"));
        assert!(clipboard.write_text("late").is_err());
    }

    #[test]
    fn test_persist_without_writes_holds_nothing() {
        let recorder = Recorder::default();
        let clipboard = fake_system(&recorder);
        clipboard.persist();
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_unavailable_backend_reports_error() {
        let clipboard = SystemClipboard::spawn_with(|| {
            Err::<FakeBackend, _>(ClipboardError::Unavailable("no display".to_string()))
        })
        .unwrap();

        assert!(matches!(
            clipboard.write_text("Use @writer"),
            Err(ClipboardError::Unavailable(_))
        ));
        clipboard.persist();
    }
}
