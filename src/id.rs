use chrono::{DateTime, Utc};

/// Record ids are the creation time in epoch milliseconds, as a decimal string.
///
/// Two records created within the same millisecond get the same id; nothing
/// downstream rejects that.
pub fn new_timestamp_id() -> String {
    timestamp_id_at(Utc::now())
}

pub fn timestamp_id_at(now: DateTime<Utc>) -> String {
    now.timestamp_millis().to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    #[test]
    fn timestamp_id_is_epoch_millis() {
        let at = Utc.timestamp_millis_opt(1_708_000_000_123).unwrap();
        assert_eq!(timestamp_id_at(at), "1708000000123");
    }

    #[test]
    fn same_millisecond_yields_same_id() {
        let at = Utc.timestamp_millis_opt(42).unwrap();
        assert_eq!(timestamp_id_at(at), timestamp_id_at(at));
    }
}
