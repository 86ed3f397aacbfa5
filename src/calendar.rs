use crate::errors::{AppError, AppResult};
use crate::keys::YearMonth;
use crate::models::{Assignment, Vacation};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    Days,
    Vacation,
}

impl EditMode {
    pub fn parse(raw: Option<&str>) -> AppResult<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("days") => Ok(Self::Days),
            Some("vacation") => Ok(Self::Vacation),
            Some(other) => Err(AppError::InvalidInput(format!("unknown edit mode '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellCategory {
    Work,
    Free,
    Vacation,
    WorkLocked,
    FreeEligible,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub day: u32,
    /// 0 = Sunday.
    pub weekday: u32,
    pub is_work: bool,
    pub is_vacation: bool,
    pub category: CellCategory,
    pub editable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarView {
    pub month: YearMonth,
    pub mode: EditMode,
    pub days_in_month: u32,
    /// Empty cells before day 1 so weekday columns line up (Sunday first).
    pub leading_blanks: u32,
    pub cells: Vec<DayCell>,
}

pub fn leading_blanks(month: YearMonth) -> AppResult<u32> {
    Ok(month.first_day()?.weekday().num_days_from_sunday())
}

pub fn derive_calendar(assignment: &Assignment, month: YearMonth, mode: EditMode) -> AppResult<CalendarView> {
    let days_in_month = month.days_in_month()?;
    let leading_blanks = leading_blanks(month)?;

    let cells = (1..=days_in_month)
        .map(|day| {
            let is_work = assignment.dias.contains(&day);
            let is_vacation = assignment
                .vacation
                .map(|range| range.contains(day))
                .unwrap_or(false);
            let (category, editable) = match mode {
                EditMode::Days if is_work => (CellCategory::Work, true),
                EditMode::Days => (CellCategory::Free, true),
                EditMode::Vacation if is_work => (CellCategory::WorkLocked, false),
                EditMode::Vacation if is_vacation => (CellCategory::Vacation, true),
                EditMode::Vacation => (CellCategory::FreeEligible, true),
            };
            DayCell {
                day,
                weekday: (leading_blanks + day - 1) % 7,
                is_work,
                is_vacation,
                category,
                editable,
            }
        })
        .collect();

    Ok(CalendarView {
        month,
        mode,
        days_in_month,
        leading_blanks,
        cells,
    })
}

/// Adds `day` to `dias` if absent, removes it otherwise. `dias` comes back
/// sorted and without duplicates.
pub fn toggle_work_day(assignment: &Assignment, day: u32) -> Assignment {
    let mut next = assignment.clone();
    if next.dias.contains(&day) {
        next.dias.retain(|current| *current != day);
    } else {
        next.dias.push(day);
    }
    next.dias.sort_unstable();
    next.dias.dedup();
    next
}

/// Single-range vacation editing.
///
/// Work days are locked. A day inside the range clears it. Outside the range
/// the range grows to cover the day, unless that would swallow a work day, in
/// which case a new one-day range starts there.
pub fn toggle_vacation_day(assignment: &Assignment, day: u32) -> Assignment {
    let mut next = assignment.clone();
    if next.dias.contains(&day) {
        return next;
    }
    next.vacation = match assignment.vacation {
        Some(range) if range.contains(day) => None,
        Some(range) => {
            let extended = Vacation {
                start: range.start.min(day),
                end: range.end.max(day),
            };
            let swallows_work = next
                .dias
                .iter()
                .any(|work_day| extended.contains(*work_day));
            if swallows_work {
                Some(Vacation { start: day, end: day })
            } else {
                Some(extended)
            }
        }
        None => Some(Vacation { start: day, end: day }),
    };
    next
}

pub fn toggle_day(assignment: &Assignment, month: YearMonth, day: u32, mode: EditMode) -> AppResult<Assignment> {
    let days_in_month = month.days_in_month()?;
    if day == 0 || day > days_in_month {
        return Err(AppError::InvalidInput(format!(
            "day {} is outside {} (1..={})",
            day, month, days_in_month
        )));
    }
    Ok(match mode {
        EditMode::Days => toggle_work_day(assignment, day),
        EditMode::Vacation => toggle_vacation_day(assignment, day),
    })
}
