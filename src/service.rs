use crate::accounts::AccountStore;
use crate::calendar::{derive_calendar, toggle_day, CalendarView, EditMode};
use crate::db::{DocumentStore, JsonFileStore};
use crate::errors::{AppError, AppResult};
use crate::keys::{ScheduleVariant, YearMonth};
use crate::logs::{parse_entries, LogStore};
use crate::models::{
    ChangePasswordPayload, CreateUserPayload, LoginPayload, LoginResponse, LogEntry, PublicUser, ScheduleRow,
    SeedUsersPayload, SeedUsersResponse, SuccessResponse, ToggleDayPayload,
};
use crate::roster::{parse_assignments, DeletionScope, RosterStore};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Entry point for every roster, log and account operation.
///
/// Each call is an independent load/mutate/save cycle on the whole document.
pub struct RosterService {
    roster: RosterStore,
    logs: LogStore,
    accounts: AccountStore,
}

impl RosterService {
    pub fn new(store: Arc<dyn DocumentStore>, default_password: &str) -> Arc<Self> {
        Arc::new(Self {
            roster: RosterStore::new(store.clone()),
            logs: LogStore::new(store.clone()),
            accounts: AccountStore::new(store, default_password),
        })
    }

    pub fn open(data_file: &Path, default_password: &str) -> Arc<Self> {
        tracing::info!(path = %data_file.display(), "using roster document");
        Self::new(Arc::new(JsonFileStore::new(data_file)), default_password)
    }

    pub fn get_schedule(&self, month: Option<&str>, variant: Option<&str>) -> AppResult<Option<Vec<ScheduleRow>>> {
        let month = require_month(month)?;
        self.roster.read(month, ScheduleVariant::from_type(variant))
    }

    pub fn save_schedule(&self, month: Option<&str>, variant: Option<&str>, body: Value) -> AppResult<SuccessResponse> {
        let assignments = parse_assignments(body)?;
        let month = require_month(month)?;
        self.roster
            .write(month, ScheduleVariant::from_type(variant), assignments)?;
        Ok(SuccessResponse::ok())
    }

    pub fn delete_assignments(
        &self,
        month: Option<&str>,
        mat: Option<&str>,
        scope: Option<&str>,
    ) -> AppResult<SuccessResponse> {
        let mat = require_mat(mat)?;
        let month = require_month(month)?;
        self.roster
            .delete_by_scope(month, mat, DeletionScope::parse(scope))?;
        Ok(SuccessResponse::ok())
    }

    pub fn get_logs(&self, month: Option<&str>) -> AppResult<Vec<LogEntry>> {
        self.logs.read(require_month(month)?)
    }

    pub fn save_logs(&self, month: Option<&str>, body: Value) -> AppResult<SuccessResponse> {
        let entries = parse_entries(body)?;
        let month = require_month(month)?;
        self.logs.write(month, entries)?;
        Ok(SuccessResponse::ok())
    }

    pub fn calendar(
        &self,
        month: Option<&str>,
        variant: Option<&str>,
        mat: Option<&str>,
        mode: Option<&str>,
    ) -> AppResult<CalendarView> {
        let month = require_month(month)?;
        let mat = require_mat(mat)?;
        let mode = EditMode::parse(mode)?;
        let rows = self
            .roster
            .read(month, ScheduleVariant::from_type(variant))?
            .ok_or_else(|| AppError::NotFound(format!("no schedule for {}", month)))?;
        let row = rows
            .iter()
            .find(|row| row.is_for(mat))
            .ok_or_else(|| AppError::NotFound(format!("{} has no assignment in {}", mat.trim(), month)))?;
        derive_calendar(&row.assignment(), month, mode)
    }

    /// Applies one calendar click and writes the month back. Only the row's
    /// `dias` and `vacation` change; the updated row is returned as stored.
    pub fn toggle_day(&self, payload: ToggleDayPayload) -> AppResult<ScheduleRow> {
        let month = YearMonth::parse(&payload.month)?;
        let mat = require_mat(Some(payload.mat.as_str()))?;
        let variant = ScheduleVariant::from_type(payload.variant.as_deref());
        let mut rows = self
            .roster
            .read(month, variant)?
            .ok_or_else(|| AppError::NotFound(format!("no schedule for {}", month)))?;
        let index = rows
            .iter()
            .position(|row| row.is_for(mat))
            .ok_or_else(|| AppError::NotFound(format!("{} has no assignment in {}", mat.trim(), month)))?;

        let updated = toggle_day(&rows[index].assignment(), month, payload.day, payload.mode)?;
        rows[index].apply(&updated);
        let row = rows[index].clone();
        self.roster.write(month, variant, rows)?;
        Ok(row)
    }

    pub fn list_users(&self) -> AppResult<Vec<PublicUser>> {
        self.accounts.list()
    }

    pub fn create_user(&self, payload: CreateUserPayload) -> AppResult<PublicUser> {
        self.accounts.create(payload)
    }

    pub fn seed_users(&self, payload: SeedUsersPayload) -> AppResult<SeedUsersResponse> {
        let added = self.accounts.seed(payload.vigilantes)?;
        Ok(SeedUsersResponse { success: true, added })
    }

    pub fn login(&self, payload: LoginPayload) -> AppResult<LoginResponse> {
        let (user, token) = self.accounts.login(&payload.mat, &payload.password)?;
        Ok(LoginResponse {
            success: true,
            user,
            token,
        })
    }

    pub fn change_password(&self, payload: ChangePasswordPayload) -> AppResult<SuccessResponse> {
        self.accounts
            .change_password(&payload.mat, &payload.new_password)?;
        Ok(SuccessResponse::ok())
    }
}

fn require_month(raw: Option<&str>) -> AppResult<YearMonth> {
    match raw {
        Some(value) if !value.trim().is_empty() => YearMonth::parse(value),
        _ => Err(AppError::InvalidInput("month is required".to_string())),
    }
}

fn require_mat(raw: Option<&str>) -> AppResult<&str> {
    raw.filter(|mat| !mat.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("mat is required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::RosterService;
    use crate::calendar::{CellCategory, EditMode};
    use crate::db::{DocumentStore, MemoryStore};
    use crate::errors::AppError;
    use crate::models::{ToggleDayPayload, Vacation};
    use serde_json::json;
    use std::sync::Arc;

    fn service_with_store() -> (Arc<RosterService>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (RosterService::new(store.clone(), "1234"), store)
    }

    #[test]
    fn month_is_required_and_validated() {
        let (service, _) = service_with_store();
        assert!(matches!(service.get_schedule(None, None), Err(AppError::InvalidInput(_))));
        assert!(matches!(service.get_schedule(Some(""), None), Err(AppError::InvalidInput(_))));
        assert!(matches!(
            service.get_schedule(Some("2025-01"), None),
            Err(AppError::InvalidInput(_))
        ));
        assert_eq!(service.get_schedule(Some("202501"), None).expect("read"), None);
    }

    #[test]
    fn draft_and_published_are_separate() {
        let (service, _) = service_with_store();
        service
            .save_schedule(Some("202501"), Some("draft"), json!([{"mat": "1", "dias": [1]}]))
            .expect("save draft");
        assert!(service.get_schedule(Some("202501"), None).expect("published").is_none());
        let draft = service
            .get_schedule(Some("202501"), Some("draft"))
            .expect("draft")
            .expect("present");
        assert_eq!(draft[0].assignment().dias, vec![1]);
    }

    #[test]
    fn non_array_body_is_rejected_without_writing() {
        let (service, store) = service_with_store();
        let result = service.save_schedule(Some("202501"), None, json!({"mat": "1"}));
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn delete_requires_mat() {
        let (service, _) = service_with_store();
        assert!(matches!(
            service.delete_assignments(Some("202501"), None, Some("all")),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn toggle_persists_through_the_roster() {
        let (service, store) = service_with_store();
        service
            .save_schedule(
                Some("202501"),
                None,
                json!([{"mat": "1", "dias": [2]}, {"mat": "2", "dias": []}]),
            )
            .expect("save");

        let updated = service
            .toggle_day(ToggleDayPayload {
                month: "202501".to_string(),
                variant: None,
                mat: "2".to_string(),
                day: 9,
                mode: EditMode::Vacation,
            })
            .expect("toggle");
        assert_eq!(updated.0, json!({"mat": "2", "dias": [], "vacation": {"start": 9, "end": 9}}));

        let rows = service
            .get_schedule(Some("202501"), None)
            .expect("read")
            .expect("present");
        assert_eq!(rows[0].0, json!({"mat": "1", "dias": [2]}));
        assert_eq!(rows[1].assignment().vacation, Some(Vacation { start: 9, end: 9 }));
        assert_eq!(store.save_count(), 2);

        let view = service
            .calendar(Some("202501"), None, Some("1"), Some("vacation"))
            .expect("calendar");
        assert_eq!(view.cells[1].category, CellCategory::WorkLocked);
    }

    #[test]
    fn calendar_for_missing_person_is_not_found() {
        let (service, _) = service_with_store();
        assert!(matches!(
            service.calendar(Some("202501"), None, Some("1"), None),
            Err(AppError::NotFound(_))
        ));
        service
            .save_schedule(Some("202501"), None, json!([{"mat": "1"}]))
            .expect("save");
        assert!(matches!(
            service.calendar(Some("202501"), None, Some("2"), None),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn logs_default_to_empty() {
        let (service, store) = service_with_store();
        assert!(service.get_logs(Some("202501")).expect("logs").is_empty());
        service
            .save_logs(Some("202501"), json!([{"acao": "publicar"}]))
            .expect("save logs");
        assert_eq!(service.get_logs(Some("202501")).expect("logs").len(), 1);
        assert_eq!(store.load().expect("load").logs.len(), 1);
    }
}
