use chrono::{DateTime, Local};

pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[cfg(test)]
pub use fixed::FixedClock;

#[cfg(test)]
mod fixed {
    use std::cell::Cell;

    use chrono::{DateTime, Local, TimeZone};

    use super::Clock;

    /// Clock pinned to a settable instant.
    pub struct FixedClock {
        now: Cell<DateTime<Local>>,
    }

    impl FixedClock {
        pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> Self {
            Self {
                now: Cell::new(local(y, m, d, h, min, s)),
            }
        }

        pub fn set(&self, now: DateTime<Local>) {
            self.now.set(now);
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            self.now.get()
        }
    }

    pub fn local(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(y, m, d, h, min, s)
            .earliest()
            .unwrap()
    }
}

#[cfg(test)]
pub use fixed::local;
