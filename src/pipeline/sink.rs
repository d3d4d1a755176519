use std::io::Write;
use std::sync::{Mutex, PoisonError};

/// Per-invocation log destination, typically the build console.
pub trait LogSink: Send + Sync {
    fn println(&self, line: &str);
}

/// Collects lines in memory.
#[derive(Debug, Default)]
pub struct BufferSink {
    lines: Mutex<Vec<String>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn contents(&self) -> String {
        self.lines().join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl LogSink for BufferSink {
    fn println(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

/// Writes lines to any writer, e.g. stdout of the build step.
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl WriterSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn println(&self, line: &str) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        // The sink is best-effort; a closed console must not fail the build
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            tracing::warn!(error = %e, "Failed to write to build log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_sink_collects_lines() {
        let sink = BufferSink::new();
        assert!(sink.is_empty());
        sink.println("first");
        sink.println("second");
        assert_eq!(sink.lines(), vec!["first", "second"]);
        assert_eq!(sink.contents(), "first\nsecond");
    }

    #[test]
    fn test_writer_sink_appends_newlines() {
        let sink = WriterSink::new(Vec::new());
        sink.println("ERROR: boom");
        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(written, "ERROR: boom\n");
    }
}
