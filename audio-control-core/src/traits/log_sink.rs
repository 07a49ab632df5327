/// Fire-and-forget line sink for operation logs.
///
/// Injected through `AudioSystemConfig::log_sink`. Implementations must not
/// panic and must swallow their own I/O failures; the core never checks.
/// Lines are written with no internal lock held, so a sink may read
/// counts or state back from the system that produced them.
pub trait LogSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Forwards lines to the `log` facade at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCrateSink;

impl LogSink for LogCrateSink {
    fn write_line(&self, line: &str) {
        log::debug!(target: "audio_control", "{}", line);
    }
}
