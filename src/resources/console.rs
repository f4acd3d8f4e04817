//! Console output resource with redirection support.
//!
//! All engine-visible text goes through [`Console::write`]. Normally a line
//! is appended to the in-memory history and echoed to stdout. While a
//! redirect is active the text is captured into a bounded buffer instead and
//! handed to a caller-supplied flush callback, which is how external tools
//! collect engine output without scraping the terminal.

use bevy_ecs::prelude::Resource;
use log::warn;

/// Callback receiving captured console output when the redirect buffer
/// flushes.
pub type FlushFn = Box<dyn FnMut(&str) + Send + Sync>;

/// Upper bound on retained history lines. Oldest lines are dropped first.
pub const MAX_HISTORY_LINES: usize = 4096;

struct Redirect {
    buffer: String,
    capacity: usize,
    flush: FlushFn,
}

/// Console print surface.
#[derive(Resource, Default)]
pub struct Console {
    history: Vec<String>,
    redirect: Option<Redirect>,
    refresh_on_print: bool,
}

impl Console {
    pub fn new() -> Self {
        Console::default()
    }

    /// Print one line of console output.
    ///
    /// With a redirect active the text is captured and never printed. When
    /// appending would overflow the redirect capacity the buffer is flushed
    /// through the callback first; text larger than the whole capacity is
    /// handed to the callback directly.
    pub fn write(&mut self, text: &str) {
        if let Some(redirect) = &mut self.redirect {
            if text.len() >= redirect.capacity {
                if !redirect.buffer.is_empty() {
                    (redirect.flush)(&redirect.buffer);
                    redirect.buffer.clear();
                }
                (redirect.flush)(text);
                return;
            }
            if redirect.buffer.len() + text.len() >= redirect.capacity {
                (redirect.flush)(&redirect.buffer);
                redirect.buffer.clear();
            }
            redirect.buffer.push_str(text);
            return;
        }
        println!("{}", text);
        self.history.push(text.to_string());
        if self.history.len() > MAX_HISTORY_LINES {
            let excess = self.history.len() - MAX_HISTORY_LINES;
            self.history.drain(..excess);
        }
    }

    /// Begin capturing console output into a bounded buffer.
    ///
    /// An already active redirect is flushed and replaced. A zero capacity
    /// is refused.
    pub fn begin_redirect(&mut self, capacity: usize, flush: FlushFn) {
        if capacity == 0 {
            warn!("refusing console redirect with zero capacity");
            return;
        }
        self.end_redirect();
        self.redirect = Some(Redirect {
            buffer: String::with_capacity(capacity),
            capacity,
            flush,
        });
    }

    /// Stop capturing: flush any remaining text and restore normal printing.
    pub fn end_redirect(&mut self) {
        if let Some(mut redirect) = self.redirect.take() {
            if !redirect.buffer.is_empty() {
                (redirect.flush)(&redirect.buffer);
            }
        }
    }

    pub fn is_redirecting(&self) -> bool {
        self.redirect.is_some()
    }

    /// Request a screen repaint for every printed line. Front ends that own
    /// a surface poll this; the flag has no effect on the console itself.
    pub fn set_refresh_on_print(&mut self, set: bool) {
        self.refresh_on_print = set;
    }

    pub fn refresh_on_print(&self) -> bool {
        self.refresh_on_print
    }

    /// Retained history lines, oldest first. Redirected output is not
    /// recorded here.
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn collecting_flush(into: Arc<Mutex<Vec<String>>>) -> FlushFn {
        Box::new(move |text: &str| {
            into.lock().unwrap().push(text.to_string());
        })
    }

    #[test]
    fn test_redirect_captures_instead_of_history() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let mut console = Console::new();
        console.begin_redirect(64, collecting_flush(Arc::clone(&captured)));
        console.write("hidden from history");
        assert!(console.history().is_empty());
        console.end_redirect();
        assert_eq!(captured.lock().unwrap().as_slice(), ["hidden from history"]);
    }

    #[test]
    fn test_redirect_flushes_on_overflow() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let mut console = Console::new();
        console.begin_redirect(16, collecting_flush(Arc::clone(&captured)));
        console.write("0123456789");
        console.write("abcdefghij");
        // Second write overflows the 16-byte capacity, forcing a flush of the
        // first chunk before capture continues.
        assert_eq!(captured.lock().unwrap().as_slice(), ["0123456789"]);
        console.end_redirect();
        assert_eq!(
            captured.lock().unwrap().as_slice(),
            ["0123456789", "abcdefghij"]
        );
    }

    #[test]
    fn test_oversized_line_goes_straight_to_flush() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let mut console = Console::new();
        console.begin_redirect(8, collecting_flush(Arc::clone(&captured)));
        console.write("this line is larger than the buffer");
        assert_eq!(
            captured.lock().unwrap().as_slice(),
            ["this line is larger than the buffer"]
        );
    }

    #[test]
    fn test_zero_capacity_redirect_refused() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let mut console = Console::new();
        console.begin_redirect(0, collecting_flush(Arc::clone(&captured)));
        assert!(!console.is_redirecting());
    }
}
