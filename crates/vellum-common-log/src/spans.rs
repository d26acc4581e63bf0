//! Spans and timing for writer operations.

use std::time::{Duration, Instant};

use tracing::{info_span, Span};

/// Span around rendering one response. Carries an empty `error` field
/// filled by [`record_error`].
pub fn render_span(writer: &str, template: &str) -> Span {
    info_span!("render", writer = %writer, template = %template, error = tracing::field::Empty)
}

/// Span around writer initialization.
pub fn init_span(writer: &str) -> Span {
    info_span!("writer_init", writer = %writer)
}

/// Record `error` on the current span's `error` field.
pub fn record_error(error: &dyn std::error::Error) {
    Span::current().record("error", tracing::field::display(error));
}

/// Wall-clock timer reported at debug level.
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }

    /// Log the elapsed time and return it.
    pub fn finish(self) -> Duration {
        let elapsed = self.start.elapsed();
        tracing::debug!(
            operation = self.operation,
            duration_us = elapsed.as_micros() as u64,
            "operation completed"
        );
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn captured(f: impl FnOnce()) -> String {
        let out = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(out.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = out.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_render_span_fields() {
        let logs = captured(|| {
            let span = render_span("velocity", "numFound");
            let _guard = span.enter();
            tracing::info!("rendering");
        });
        assert!(logs.contains("render{writer=velocity template=numFound}"));
        assert!(logs.contains("rendering"));
    }

    #[test]
    fn test_record_error() {
        let logs = captured(|| {
            let span = render_span("velocity", "missing");
            let _guard = span.enter();
            record_error(&io::Error::new(io::ErrorKind::NotFound, "template not found"));
            tracing::warn!("render failed");
        });
        assert!(logs.contains("error=template not found"));
    }

    #[test]
    fn test_timer() {
        let timer = Timer::start("render");
        std::thread::sleep(Duration::from_millis(2));
        let logs = captured(|| {
            assert!(timer.finish() >= Duration::from_millis(2));
        });
        assert!(logs.contains("operation=\"render\"") || logs.contains("operation=render"));
        assert!(logs.contains("duration_us="));
    }
}
