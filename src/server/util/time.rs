use chrono::{DateTime, SecondsFormat, Utc};

pub(crate) mod helper {
    #[cfg(not(test))]
    pub use super::get_utc_now;
    #[cfg(test)]
    pub use super::mock_chrono::get_utc_now;
    pub use super::to_iso8601;
}


#[cfg(not(test))]
pub fn get_utc_now() -> DateTime<Utc> {
    Utc::now()
}

/// `2024-05-01T12:30:00.000Z`, the same shape browsers produce with `toISOString`.
pub fn to_iso8601(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
