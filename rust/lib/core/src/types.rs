/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_millis() {
        let before = chrono::Utc::now().timestamp_millis();
        let now = now_millis();
        assert!(now >= before);
        // Sanity: after 2020-01-01.
        assert!(now > 1_577_836_800_000);
    }
}
