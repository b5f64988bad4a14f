//! # Calendar month grid
//!
//! Translates per-day booking status into the cells a month-grid widget
//! renders, and owns the widget-local selection state. Configuration is a
//! typed struct validated at construction; interactions come back as
//! [`CalendarEvent`] values rather than callbacks, so hosts decide what a
//! click means.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::availability::ListenerGuard;
use crate::errors::{BookingError, BookingResult};
use crate::models::day::DateStatus;
use crate::sync::AvailabilitySync;

/// Widget configuration. `min_date` is the first interactive date; anything
/// earlier renders as past.
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    pub selectable: bool,
    pub multi_select: bool,
    pub admin_mode: bool,
    pub min_date: NaiveDate,
}

impl CalendarConfig {
    pub fn customer(min_date: NaiveDate) -> Self {
        Self {
            selectable: true,
            multi_select: false,
            admin_mode: false,
            min_date,
        }
    }

    pub fn admin(min_date: NaiveDate) -> Self {
        Self {
            selectable: false,
            multi_select: false,
            admin_mode: true,
            min_date,
        }
    }

    pub fn validate(&self) -> BookingResult<()> {
        if self.multi_select && !self.selectable {
            return Err(BookingError::InvalidConfig(
                "multi_select requires selectable".to_string(),
            ));
        }
        Ok(())
    }
}

/// Cell classification, one value per date. Priority when several apply:
/// past > unavailable > full > partial > available. Selection is a separate
/// flag on [`DayCell`], orthogonal to the classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayCellKind {
    Past,
    Unavailable,
    Full,
    Partial,
    Available,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub kind: DayCellKind,
    pub selected: bool,
    pub interactive: bool,
    pub open_slots: u32,
}

/// One rendered month. `leading_blanks` is the number of empty cells before
/// the 1st in a Sunday-first week row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub leading_blanks: u32,
    pub cells: Vec<DayCell>,
}

/// Interaction outcome reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarEvent {
    Selected(NaiveDate),
    Deselected(NaiveDate),
    AdminAction(NaiveDate),
}

fn classify(sync: &AvailabilitySync, config: &CalendarConfig, date: NaiveDate) -> DayCellKind {
    if date < config.min_date {
        return DayCellKind::Past;
    }
    match sync.date_status(date) {
        DateStatus::Unavailable => DayCellKind::Unavailable,
        DateStatus::Full => DayCellKind::Full,
        DateStatus::Partial => DayCellKind::Partial,
        DateStatus::Available => DayCellKind::Available,
    }
}

fn is_interactive(config: &CalendarConfig, kind: DayCellKind) -> bool {
    if kind == DayCellKind::Past {
        return false;
    }
    let bookable = matches!(kind, DayCellKind::Available | DayCellKind::Partial);
    (config.selectable && bookable) || config.admin_mode
}

/// Render one month's cells against the current availability state.
pub fn render_month(
    sync: &AvailabilitySync,
    config: &CalendarConfig,
    selected: &BTreeSet<NaiveDate>,
    year: i32,
    month: u32,
) -> BookingResult<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        BookingError::InvalidConfig(format!("invalid month: {year}-{month:02}"))
    })?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("month arithmetic");
    let days_in_month = (next_month - first).num_days() as u32;

    let mut cells = Vec::with_capacity(days_in_month as usize);
    for day in 1..=days_in_month {
        let date = first.with_day(day).expect("day in range");
        let kind = classify(sync, config, date);
        cells.push(DayCell {
            date,
            kind,
            selected: selected.contains(&date),
            interactive: is_interactive(config, kind),
            open_slots: sync.open_slots(date).len() as u32,
        });
    }

    Ok(MonthGrid {
        year,
        month,
        leading_blanks: first.weekday().num_days_from_sunday(),
        cells,
    })
}

/// Stateful month-grid widget: selection set plus a dirty flag driven by
/// availability change notifications.
pub struct CalendarView {
    config: CalendarConfig,
    sync: Arc<AvailabilitySync>,
    selected: BTreeSet<NaiveDate>,
    dirty: Arc<AtomicBool>,
    _store_listener: ListenerGuard,
}

impl CalendarView {
    /// Validates the configuration and subscribes to availability changes
    /// for the lifetime of the widget.
    pub fn new(config: CalendarConfig, sync: Arc<AvailabilitySync>) -> BookingResult<Self> {
        config.validate()?;
        let dirty = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&dirty);
        let guard = sync.store().subscribe(move || {
            flag.store(true, Ordering::Relaxed);
            Ok(())
        });
        Ok(Self {
            config,
            sync,
            selected: BTreeSet::new(),
            dirty,
            _store_listener: guard,
        })
    }

    pub fn render_month(&self, year: i32, month: u32) -> BookingResult<MonthGrid> {
        self.dirty.store(false, Ordering::Relaxed);
        render_month(&self.sync, &self.config, &self.selected, year, month)
    }

    /// Handle a click on a date. Past cells are inert. In admin mode every
    /// non-past date reports an [`CalendarEvent::AdminAction`]; otherwise a
    /// bookable date toggles its selection, clearing any prior selection
    /// first when multi-select is off.
    pub fn click(&mut self, date: NaiveDate) -> Option<CalendarEvent> {
        let kind = classify(&self.sync, &self.config, date);
        if kind == DayCellKind::Past {
            return None;
        }
        if self.config.admin_mode {
            return Some(CalendarEvent::AdminAction(date));
        }
        if !self.config.selectable || !matches!(kind, DayCellKind::Available | DayCellKind::Partial)
        {
            return None;
        }

        if self.selected.contains(&date) {
            self.selected.remove(&date);
            return Some(CalendarEvent::Deselected(date));
        }
        if !self.config.multi_select {
            self.selected.clear();
        }
        self.selected.insert(date);
        Some(CalendarEvent::Selected(date))
    }

    pub fn selected_dates(&self) -> Vec<NaiveDate> {
        self.selected.iter().copied().collect()
    }

    pub fn set_selected_dates(&mut self, dates: &[NaiveDate]) {
        self.selected = dates.iter().copied().collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// True when availability changed since the last render; reading the
    /// flag does not clear it, rendering does.
    pub fn needs_render(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }
}
