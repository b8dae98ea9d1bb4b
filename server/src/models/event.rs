use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Days between the payment deadline and the end of the event.
pub const PAYMENT_DEADLINE_DAYS: i64 = 30;
/// Days after the end of the event at which sponsorship agreements lapse.
pub const AGREEMENT_END_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub organisation_id: Uuid,
    pub name: String,
    pub contact_email: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn payment_deadline(&self) -> DateTime<Utc> {
        self.end_time - Duration::days(PAYMENT_DEADLINE_DAYS)
    }

    pub fn agreement_end_date(&self) -> DateTime<Utc> {
        self.end_time + Duration::days(AGREEMENT_END_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_deadlines_are_fixed_offsets_from_event_end() {
        let end = Utc.with_ymd_and_hms(2025, 10, 31, 18, 0, 0).unwrap();
        let event = Event {
            id: Uuid::new_v4(),
            organisation_id: Uuid::new_v4(),
            name: "DevFest".into(),
            contact_email: None,
            start_time: end - Duration::days(1),
            end_time: end,
            created_at: end,
            updated_at: end,
        };

        assert_eq!(
            event.payment_deadline(),
            Utc.with_ymd_and_hms(2025, 10, 1, 18, 0, 0).unwrap()
        );
        assert_eq!(
            event.agreement_end_date(),
            Utc.with_ymd_and_hms(2025, 11, 30, 18, 0, 0).unwrap()
        );
    }
}
