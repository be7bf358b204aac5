use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Time-boxed request for donations of one blood type at a bank.
/// Expired rows are purged lazily on the next read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodNeed {
    pub id: RecordId,
    pub blood_bank_id: RecordId,
    pub blood_type: String,
    pub units: f64,
    pub location: String,
    pub hospital: String,
    pub expire_date: NaiveDate,
    pub expire_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

impl BloodNeed {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expire_date < now.date_naive()
            || (self.expire_date == now.date_naive() && self.expire_time <= now.time())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBloodNeed {
    pub blood_bank_id: RecordId,
    pub blood_type: String,
    pub units: f64,
    pub location: String,
    pub hospital: String,
    pub expire_date: NaiveDate,
    pub expire_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn need(date: &str, time: &str) -> BloodNeed {
        BloodNeed {
            id: RecordId::from_table_key("blood_needs", "n1"),
            blood_bank_id: RecordId::from_table_key("blood_banks", "b1"),
            blood_type: "A+".into(),
            units: 2.0,
            location: "Amman".into(),
            hospital: "Hayat".into(),
            expire_date: date.parse().unwrap(),
            expire_time: time.parse().unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn expires_after_date() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        assert!(need("2026-03-09", "09:00:00").is_expired(now));
        assert!(!need("2026-03-11", "09:00:00").is_expired(now));
    }

    #[test]
    fn same_day_compares_times() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        assert!(need("2026-03-10", "11:59:00").is_expired(now));
        assert!(need("2026-03-10", "12:00:00").is_expired(now));
        assert!(!need("2026-03-10", "12:01:00").is_expired(now));
    }
}
