//! Logging setup.
//!
//! Natively this is a plain `tracing-subscriber` fmt layer on stderr. In the browser the
//! same layer writes through [`ConsoleMakeWriter`], which forwards each
//! formatted line to the devtools console method matching its level.

use tracing_subscriber::EnvFilter;

use crate::config::DEFAULT_LOG_LEVEL;

/// Build the filter: `RUST_LOG` when set, else `level`, else the default.
fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Install the global subscriber.
///
/// Returns `false` when one was already installed; calling twice is harmless.
#[cfg(not(feature = "wasm"))]
pub fn init_logging(level: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// Install the global subscriber, writing to the browser console.
///
/// Returns `false` when one was already installed; calling twice is harmless.
#[cfg(feature = "wasm")]
pub fn init_logging(level: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .with_writer(console::ConsoleMakeWriter)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(feature = "wasm")]
pub use console::{ConsoleMakeWriter, ConsoleWriter};

#[cfg(feature = "wasm")]
mod console {
    use std::io;

    use tracing::{Level, Metadata};
    use tracing_subscriber::fmt::MakeWriter;
    use wasm_bindgen::JsValue;

    /// Hands out one [`ConsoleWriter`] per log event
    #[derive(Debug, Clone, Copy, Default)]
    pub struct ConsoleMakeWriter;

    /// Buffers one formatted event and emits it on drop
    #[derive(Debug)]
    pub struct ConsoleWriter {
        level: Level,
        buffer: Vec<u8>,
    }

    impl io::Write for ConsoleWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for ConsoleWriter {
        fn drop(&mut self) {
            let text = String::from_utf8_lossy(&self.buffer);
            let line = text.trim_end();
            if line.is_empty() {
                return;
            }
            let value = JsValue::from_str(line);
            if self.level == Level::ERROR {
                web_sys::console::error_1(&value);
            } else if self.level == Level::WARN {
                web_sys::console::warn_1(&value);
            } else if self.level == Level::INFO {
                web_sys::console::log_1(&value);
            } else {
                web_sys::console::debug_1(&value);
            }
        }
    }

    impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
        type Writer = ConsoleWriter;

        fn make_writer(&'a self) -> Self::Writer {
            ConsoleWriter {
                level: Level::INFO,
                buffer: Vec::new(),
            }
        }

        fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
            ConsoleWriter {
                level: *meta.level(),
                buffer: Vec::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        let _ = init_logging("debug");
        assert!(!init_logging("debug"));
    }

    #[test]
    fn test_invalid_level_falls_back() {
        // must not panic on garbage directives
        let _filter = filter_for("deletudo=[[[");
    }
}
