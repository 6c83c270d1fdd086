//! "Schedule for later" sub-flow of the start-interview modal.
//!
//! `First` offers begin-now or schedule-later, `Second` collects a date and
//! `Third` shows the calendar confirmation. Closing the modal resets to
//! `First`.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use url::Url;

use crate::wizard::modal::{ModalError, ModalKind};

const CALENDAR_EDIT_URL: &str = "https://calendar.google.com/calendar/u/0/r/eventedit";
const EVENT_TITLE: &str = "Interview with Eden";
const SLOT_MINUTES: i64 = 30;
const RECURRENCE: &str = "RRULE:FREQ=WEEKLY;UNTIL=20231231T000000Z";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulePhase {
    #[default]
    First,
    Second,
    Third,
}

impl SchedulePhase {
    fn as_str(self) -> &'static str {
        match self {
            SchedulePhase::First => "first",
            SchedulePhase::Second => "second",
            SchedulePhase::Third => "third",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleFlow {
    phase: SchedulePhase,
    date: Option<DateTime<Utc>>,
    calendar_link: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleView {
    pub phase: SchedulePhase,
    pub date: Option<DateTime<Utc>>,
    pub calendar_link: Option<String>,
}

impl ScheduleFlow {
    pub fn schedule_later(&mut self) -> Result<(), ModalError> {
        self.require_phase(SchedulePhase::First, "schedule later")?;
        self.phase = SchedulePhase::Second;
        Ok(())
    }

    pub fn pick_date(&mut self, date: DateTime<Utc>) -> Result<(), ModalError> {
        self.require_phase(SchedulePhase::Second, "pick date")?;
        self.date = Some(date);
        Ok(())
    }

    /// Builds the calendar link for the picked slot and moves to `Third`.
    pub fn add_to_calendar(&mut self, interview_link: &str) -> Result<String, ModalError> {
        self.require_phase(SchedulePhase::Second, "add to calendar")?;
        let date = self.date.ok_or(ModalError::InvalidState {
            kind: ModalKind::StartInterview,
            state: "missing a date",
            action: "add to calendar",
        })?;

        let link = calendar_link(date, interview_link);
        self.calendar_link = Some(link.clone());
        self.phase = SchedulePhase::Third;
        Ok(link)
    }

    pub fn view(&self) -> ScheduleView {
        ScheduleView {
            phase: self.phase,
            date: self.date,
            calendar_link: self.calendar_link.clone(),
        }
    }

    pub(crate) fn require_phase(
        &self,
        phase: SchedulePhase,
        action: &'static str,
    ) -> Result<(), ModalError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(ModalError::InvalidState {
                kind: ModalKind::StartInterview,
                state: self.phase.as_str(),
                action,
            })
        }
    }
}

/// Calendar timestamps are UTC, second precision, without separators.
fn calendar_stamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Google Calendar "new event" link for a 30 minute weekly slot.
pub fn calendar_link(start: DateTime<Utc>, interview_link: &str) -> String {
    let end = start + Duration::minutes(SLOT_MINUTES);
    let dates = format!("{}/{}", calendar_stamp(start), calendar_stamp(end));
    let details = format!(
        "A {SLOT_MINUTES} min interview with Eden AI. Join via this link: <a href=\"{interview_link}\">Click Here!</a>"
    );

    let params = [
        ("text", EVENT_TITLE),
        ("dates", dates.as_str()),
        ("details", details.as_str()),
        ("location", interview_link),
        ("recur", RECURRENCE),
    ];
    match Url::parse_with_params(CALENDAR_EDIT_URL, params) {
        Ok(url) => url.to_string(),
        // The base is a constant, parsing cannot fail.
        Err(_) => CALENDAR_EDIT_URL.to_string(),
    }
}

/// Link the candidate follows to resume the interview.
pub fn interview_link(link_base: &str, position_id: &str) -> String {
    format!("{link_base}/interview/{position_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn slot() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, 1, 14, 30, 0).unwrap()
    }

    fn query(link: &str) -> HashMap<String, String> {
        Url::parse(link)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_calendar_link_spans_thirty_minutes() {
        let link = calendar_link(slot(), "https://board.test/interview/p1");
        let q = query(&link);

        assert!(link.starts_with(CALENDAR_EDIT_URL));
        assert_eq!(q["dates"], "20230601T143000Z/20230601T150000Z");
        assert_eq!(q["text"], "Interview with Eden");
        assert_eq!(q["location"], "https://board.test/interview/p1");
        assert_eq!(q["recur"], RECURRENCE);
        assert!(q["details"].contains("href=\"https://board.test/interview/p1\""));
    }

    #[test]
    fn test_happy_path_reaches_third() {
        let mut flow = ScheduleFlow::default();
        assert_eq!(flow.view().phase, SchedulePhase::First);

        flow.schedule_later().unwrap();
        assert_eq!(flow.view().phase, SchedulePhase::Second);

        flow.pick_date(slot()).unwrap();
        let link = flow.add_to_calendar("https://board.test/interview/p1").unwrap();

        assert_eq!(flow.view().phase, SchedulePhase::Third);
        assert_eq!(flow.view().calendar_link.as_deref(), Some(link.as_str()));
    }

    #[test]
    fn test_calendar_requires_a_date() {
        let mut flow = ScheduleFlow::default();
        flow.schedule_later().unwrap();
        assert!(flow.add_to_calendar("x").is_err());
        assert_eq!(flow.view().phase, SchedulePhase::Second);
    }

    #[test]
    fn test_out_of_order_actions_are_rejected() {
        let mut flow = ScheduleFlow::default();
        assert!(flow.pick_date(slot()).is_err());
        assert!(flow.add_to_calendar("x").is_err());

        flow.schedule_later().unwrap();
        assert!(flow.schedule_later().is_err());
    }

    #[test]
    fn test_interview_link_joins_base_and_position() {
        assert_eq!(
            interview_link("https://developer-dao.joineden.ai", "p1"),
            "https://developer-dao.joineden.ai/interview/p1"
        );
    }
}
