/// Hands out time-based ids (Unix milliseconds) that stay strictly
/// increasing within a session, even when several are issued in the same
/// millisecond or the clock steps backwards.
#[derive(Debug, Default, Clone)]
pub struct IdGen {
    last: i64,
}

impl IdGen {
    /// Seeds the generator so it never reissues any id in `existing`.
    pub fn above<I: IntoIterator<Item = i64>>(existing: I) -> Self {
        Self {
            last: existing.into_iter().max().unwrap_or(0),
        }
    }

    pub fn next_id(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.last = now.max(self.last.saturating_add(1));
        self.last
    }
}
