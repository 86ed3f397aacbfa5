use crate::db::DocumentStore;
use crate::errors::{AppError, AppResult};
use crate::keys::{month_token, ScheduleKey, ScheduleVariant, YearMonth};
use crate::models::{row_is_for, Document, ScheduleRow};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Breadth of months touched by a scoped deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionScope {
    This,
    Future,
    All,
}

impl DeletionScope {
    /// Anything other than `future` or `all` means `this`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("future") => Self::Future,
            Some("all") => Self::All,
            _ => Self::This,
        }
    }

    pub fn includes(self, key_month: YearMonth, target: YearMonth) -> bool {
        match self {
            Self::All => true,
            Self::Future => key_month >= target,
            Self::This => key_month == target,
        }
    }
}

/// Removes `mat` from every schedule array selected by `scope`, across every
/// namespace and both variants. A key's month is its third underscore token,
/// so non-canonical keys such as `escala_vigilantes_202501_backup` count too.
/// Returns how many records were removed.
pub fn remove_assignments(
    document: &mut Document,
    target: YearMonth,
    mat: &str,
    scope: DeletionScope,
) -> usize {
    let mut removed = 0usize;
    for (key, rows) in document.schedules.iter_mut() {
        if !scope.includes(key.month, target) {
            continue;
        }
        let before = rows.len();
        rows.retain(|row| !row.is_for(mat));
        if rows.len() != before {
            tracing::debug!(
                namespace = %key.namespace,
                month = %key.month,
                variant = key.variant.as_str(),
                removed = before - rows.len(),
                "assignments removed"
            );
            removed += before - rows.len();
        }
    }
    for (key, value) in document.schedules.foreign_mut() {
        let Some(key_month) = month_token(key) else {
            continue;
        };
        if !scope.includes(key_month, target) {
            continue;
        }
        let Value::Array(rows) = value else {
            continue;
        };
        let before = rows.len();
        rows.retain(|row| !row_is_for(row, mat));
        if rows.len() != before {
            tracing::debug!(key = %key, removed = before - rows.len(), "assignments removed");
            removed += before - rows.len();
        }
    }
    removed
}

/// Accepts any JSON array. Its elements are stored as sent.
pub fn parse_assignments(payload: Value) -> AppResult<Vec<ScheduleRow>> {
    match payload {
        Value::Array(rows) => Ok(rows.into_iter().map(ScheduleRow).collect()),
        _ => Err(AppError::InvalidInput("schedule body must be an array".to_string())),
    }
}

#[derive(Clone)]
pub struct RosterStore {
    store: Arc<dyn DocumentStore>,
}

impl RosterStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn read(&self, month: YearMonth, variant: ScheduleVariant) -> AppResult<Option<Vec<ScheduleRow>>> {
        let document = self.store.load()?;
        Ok(document
            .schedules
            .get(&ScheduleKey::roster(month, variant))
            .cloned())
    }

    pub fn write(
        &self,
        month: YearMonth,
        variant: ScheduleVariant,
        assignments: Vec<ScheduleRow>,
    ) -> AppResult<()> {
        let mut document = self.store.load()?;
        let count = assignments.len();
        document
            .schedules
            .insert(ScheduleKey::roster(month, variant), assignments);
        self.store.save(&document)?;
        tracing::info!(%month, variant = variant.as_str(), count, "schedule written");
        Ok(())
    }

    /// Returns whether anything was removed. The document is only saved when
    /// at least one array changed.
    pub fn delete_by_scope(&self, month: YearMonth, mat: &str, scope: DeletionScope) -> AppResult<bool> {
        if mat.trim().is_empty() {
            return Err(AppError::InvalidInput("mat is required".to_string()));
        }
        let mut document = self.store.load()?;
        let removed = remove_assignments(&mut document, month, mat, scope);
        if removed == 0 {
            tracing::info!(%month, mat = mat.trim(), ?scope, "nothing to delete");
            return Ok(false);
        }
        self.store.save(&document)?;
        tracing::info!(%month, mat = mat.trim(), ?scope, removed, "assignments deleted");
        Ok(true)
    }
}
