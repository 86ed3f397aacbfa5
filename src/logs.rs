use crate::db::DocumentStore;
use crate::errors::{AppError, AppResult};
use crate::keys::{LogKey, YearMonth};
use crate::models::LogEntry;
use serde_json::Value;
use std::sync::Arc;

pub fn parse_entries(payload: Value) -> AppResult<Vec<LogEntry>> {
    match payload {
        Value::Array(items) => Ok(items.into_iter().map(LogEntry).collect()),
        _ => Err(AppError::InvalidInput("log body must be an array".to_string())),
    }
}

#[derive(Clone)]
pub struct LogStore {
    store: Arc<dyn DocumentStore>,
}

impl LogStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Absent months read as an empty log, never as `null`.
    pub fn read(&self, month: YearMonth) -> AppResult<Vec<LogEntry>> {
        let document = self.store.load()?;
        Ok(document
            .logs
            .get(&LogKey::audit(month))
            .cloned()
            .unwrap_or_default())
    }

    pub fn write(&self, month: YearMonth, entries: Vec<LogEntry>) -> AppResult<()> {
        let mut document = self.store.load()?;
        let count = entries.len();
        document.logs.insert(LogKey::audit(month), entries);
        self.store.save(&document)?;
        tracing::info!(%month, count, "audit log written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_entries, LogStore};
    use crate::db::MemoryStore;
    use crate::errors::AppError;
    use crate::keys::YearMonth;
    use crate::models::LogEntry;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn absent_month_reads_empty() {
        let logs = LogStore::new(Arc::new(MemoryStore::new()));
        assert!(logs.read(YearMonth::from_code(202501)).expect("read").is_empty());
    }

    #[test]
    fn write_replaces_the_month_log() {
        let logs = LogStore::new(Arc::new(MemoryStore::new()));
        let month = YearMonth::from_code(202501);
        logs.write(month, vec![LogEntry(json!({"acao": "a"})), LogEntry(json!({"acao": "b"}))])
            .expect("write");
        logs.write(month, vec![LogEntry(json!({"acao": "c"}))]).expect("write");
        assert_eq!(logs.read(month).expect("read"), vec![LogEntry(json!({"acao": "c"}))]);
        assert!(logs.read(YearMonth::from_code(202502)).expect("other").is_empty());
    }

    #[test]
    fn entries_must_be_an_array() {
        assert!(matches!(parse_entries(json!("x")), Err(AppError::InvalidInput(_))));
        assert_eq!(parse_entries(json!([1, "two", {"x": 3}])).expect("array").len(), 3);
    }
}
