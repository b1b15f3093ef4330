//! Character sources and sinks.
//!
//! A `Source` hands out characters as integer codes with `-1` marking end
//! of input; `get` peeks, `next` consumes. A `Sink` accepts characters and
//! strings, reporting success as a boolean so printing failures can travel
//! back through customer chains as `#f`.
//!
//! The sink the printing behaviors write through is a thread-local slot
//! set by the driver, like the rest of the per-configuration context.

use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::rc::Rc;

/// Character code for end of input.
pub const END_OF_INPUT: i64 = -1;

pub trait Source {
    /// True when no characters remain.
    fn empty(&mut self) -> bool {
        self.get() == END_OF_INPUT
    }
    /// The character at the current position, without consuming it.
    fn get(&mut self) -> i64;
    /// The character at the current position, consuming it.
    fn next(&mut self) -> i64;
}

/// Source over an in-memory string.
pub struct StrSource {
    chars: Vec<char>,
    pos: usize,
}

impl StrSource {
    pub fn new(text: &str) -> Self {
        StrSource {
            chars: text.chars().collect(),
            pos: 0,
        }
    }
}

impl Source for StrSource {
    fn get(&mut self) -> i64 {
        match self.chars.get(self.pos) {
            Some(&c) => c as i64,
            None => END_OF_INPUT,
        }
    }

    fn next(&mut self) -> i64 {
        let c = self.get();
        if c != END_OF_INPUT {
            self.pos += 1;
        }
        c
    }
}

/// Source over any byte reader, one byte of lookahead.
pub struct ReadSource<R: Read> {
    reader: BufReader<R>,
    lookahead: Option<i64>,
}

impl ReadSource<File> {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> ReadSource<R> {
    pub fn new(reader: R) -> Self {
        ReadSource {
            reader: BufReader::new(reader),
            lookahead: None,
        }
    }

    fn fill(&mut self) -> i64 {
        if let Some(c) = self.lookahead {
            return c;
        }
        let mut buf = [0u8; 1];
        let c = match self.reader.read(&mut buf) {
            Ok(1) => buf[0] as i64,
            _ => END_OF_INPUT,
        };
        self.lookahead = Some(c);
        c
    }
}

impl<R: Read> Source for ReadSource<R> {
    fn get(&mut self) -> i64 {
        self.fill()
    }

    fn next(&mut self) -> i64 {
        let c = self.fill();
        if c != END_OF_INPUT {
            self.lookahead = None;
        }
        c
    }
}

pub trait Sink {
    /// Transmit one character; true on success.
    fn put(&mut self, c: i64) -> bool;

    /// Transmit a string; true iff every character succeeded.
    fn put_str(&mut self, s: &str) -> bool {
        for c in s.chars() {
            if !self.put(c as i64) {
                return false;
            }
        }
        true
    }
}

/// Sink onto stdout; flushes per character so prompts interleave cleanly.
pub struct ConsoleSink;

impl Sink for ConsoleSink {
    fn put(&mut self, c: i64) -> bool {
        let Some(ch) = char::from_u32(c as u32) else {
            return false;
        };
        let mut out = std::io::stdout();
        write!(out, "{}", ch).and_then(|_| out.flush()).is_ok()
    }

    fn put_str(&mut self, s: &str) -> bool {
        let mut out = std::io::stdout();
        write!(out, "{}", s).and_then(|_| out.flush()).is_ok()
    }
}

/// Sink into a shared string buffer; the driver keeps the other handle.
#[derive(Clone, Default)]
pub struct SharedSink(pub Rc<RefCell<String>>);

impl SharedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> String {
        std::mem::take(&mut self.0.borrow_mut())
    }
}

impl Sink for SharedSink {
    fn put(&mut self, c: i64) -> bool {
        match char::from_u32(c as u32) {
            Some(ch) => {
                self.0.borrow_mut().push(ch);
                true
            }
            None => false,
        }
    }

    fn put_str(&mut self, s: &str) -> bool {
        self.0.borrow_mut().push_str(s);
        true
    }
}

thread_local! {
    static CURRENT_SINK: RefCell<Box<dyn Sink>> = RefCell::new(Box::new(ConsoleSink));
}

/// Install the sink printing behaviors write through.
pub fn set_current_sink(sink: Box<dyn Sink>) {
    CURRENT_SINK.with(|s| *s.borrow_mut() = sink);
}

/// Run `f` against the current sink.
pub fn with_sink<T>(f: impl FnOnce(&mut dyn Sink) -> T) -> T {
    CURRENT_SINK.with(|s| f(s.borrow_mut().as_mut()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_str_source_peek_and_consume() {
        let mut src = StrSource::new("ab");
        assert!(!src.empty());
        assert_eq!(src.get(), 'a' as i64);
        assert_eq!(src.get(), 'a' as i64);
        assert_eq!(src.next(), 'a' as i64);
        assert_eq!(src.next(), 'b' as i64);
        assert!(src.empty());
        assert_eq!(src.next(), END_OF_INPUT);
    }

    #[test]
    fn test_empty_str_source() {
        let mut src = StrSource::new("");
        assert!(src.empty());
        assert_eq!(src.get(), END_OF_INPUT);
        assert_eq!(src.next(), END_OF_INPUT);
    }

    #[test]
    fn test_read_source_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(x)").unwrap();
        let mut src = ReadSource::open(file.path()).unwrap();
        assert_eq!(src.next(), '(' as i64);
        assert_eq!(src.get(), 'x' as i64);
        assert_eq!(src.next(), 'x' as i64);
        assert_eq!(src.next(), ')' as i64);
        assert_eq!(src.next(), END_OF_INPUT);
        assert!(src.empty());
    }

    #[test]
    fn test_shared_sink_captures() {
        let sink = SharedSink::new();
        let mut writer = sink.clone();
        assert!(writer.put('a' as i64));
        assert!(writer.put_str("bc"));
        assert_eq!(sink.take(), "abc");
    }
}
