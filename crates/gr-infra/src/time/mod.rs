use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Local, NaiveDate};
use gr_core::ports::ClockPort;

pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX epoch")
            .as_millis() as i64
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
