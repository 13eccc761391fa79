#![forbid(unsafe_code)]

mod model;

pub use model::*;

pub mod ids {
    use std::fmt;

    /// Installation-local ticket number. Allocated by the store, never by callers.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct TicketId(i64);

    impl TicketId {
        pub const fn new(value: i64) -> Self {
            Self(value)
        }

        pub const fn get(self) -> i64 {
            self.0
        }

        /// `None` once the id space is exhausted.
        pub const fn next(self) -> Option<Self> {
            match self.0.checked_add(1) {
                Some(next) => Some(Self(next)),
                None => None,
            }
        }
    }

    impl From<i64> for TicketId {
        fn from(value: i64) -> Self {
            Self(value)
        }
    }

    impl fmt::Display for TicketId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "#{}", self.0)
        }
    }
}

pub mod directory {
    use uuid::Uuid;

    /// Resolves player ids to display names. Owned by the host.
    pub trait UserDirectory {
        fn name_of(&self, uuid: Uuid) -> Option<String>;
    }

    impl<F> UserDirectory for F
    where
        F: Fn(Uuid) -> Option<String>,
    {
        fn name_of(&self, uuid: Uuid) -> Option<String> {
            self(uuid)
        }
    }
}

pub mod span {
    use chrono::{DateTime, TimeDelta, Utc};

    const DAY_SECS: i64 = 86_400;

    /// Window used when ranking pickers by closed tickets.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum TimeAmount {
        Day,
        Week,
        Month,
        Year,
        Forever,
    }

    impl TimeAmount {
        pub fn length(self) -> Option<TimeDelta> {
            let secs = match self {
                TimeAmount::Day => DAY_SECS,
                TimeAmount::Week => 7 * DAY_SECS,
                TimeAmount::Month => 30 * DAY_SECS,
                TimeAmount::Year => 365 * DAY_SECS,
                TimeAmount::Forever => return None,
            };
            Some(TimeDelta::seconds(secs))
        }

        /// Epoch second after which activity counts. `Forever` starts at 0.
        pub fn cutoff_secs(self, now: DateTime<Utc>) -> i64 {
            match self.length() {
                Some(length) => (now - length).timestamp(),
                None => 0,
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value.trim().to_ascii_lowercase().as_str() {
                "day" => Some(TimeAmount::Day),
                "week" => Some(TimeAmount::Week),
                "month" => Some(TimeAmount::Month),
                "year" => Some(TimeAmount::Year),
                "forever" | "all" => Some(TimeAmount::Forever),
                _ => None,
            }
        }
    }
}
