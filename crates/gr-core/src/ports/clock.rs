use chrono::NaiveDate;

pub trait ClockPort: Send + Sync {
    fn now_ms(&self) -> i64;

    fn today(&self) -> NaiveDate;
}
