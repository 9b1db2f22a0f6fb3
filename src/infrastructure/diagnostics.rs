/// Sink for integrity anomalies that must not crash the app, such as an
/// insert that reports an unexpected number of affected rows.
pub trait DiagnosticsSink: Send + Sync {
    fn track_fatal_error(&self, message: &str, error: Option<&anyhow::Error>);
}

/// Default sink: reports through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl DiagnosticsSink for LogDiagnostics {
    fn track_fatal_error(&self, message: &str, error: Option<&anyhow::Error>) {
        match error {
            Some(e) => log::error!("{message}: {e:#}"),
            None => log::error!("{message}"),
        }
    }
}
