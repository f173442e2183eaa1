use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Time left until `next_eligible_at`, or `None` when no cooldown is set or
/// it has already elapsed.
pub fn remaining(now: DateTime<Utc>, next_eligible_at: Option<DateTime<Utc>>) -> Option<Duration> {
    let target = next_eligible_at?;
    if target <= now {
        return None;
    }
    Some(target - now)
}

/// key: cooldown-countdown -> hours,minutes,seconds
///
/// Cooldowns are shorter than a day, so there is no days component. Longer
/// values keep accumulating in `hours`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    pub fn from_duration(duration: Duration) -> Self {
        let total = duration.num_seconds().max(0);
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

/// Last known support-ticket cooldown. Evaluated against an externally
/// supplied `now`; the stored instant is left untouched once it elapses so
/// the owner can reconcile it on the next fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownClock {
    pub next_eligible_at: Option<DateTime<Utc>>,
}

impl CooldownClock {
    pub fn new(next_eligible_at: Option<DateTime<Utc>>) -> Self {
        Self { next_eligible_at }
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        remaining(now, self.next_eligible_at)
    }

    /// Whole-second countdown. A sub-second remainder rounds up so the
    /// display never reads `00:00:00` while the gate is still closed.
    pub fn countdown(&self, now: DateTime<Utc>) -> Option<Countdown> {
        self.remaining(now).map(|left| {
            let whole = Duration::seconds(left.num_seconds());
            if whole < left {
                Countdown::from_duration(whole + Duration::seconds(1))
            } else {
                Countdown::from_duration(whole)
            }
        })
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now).is_some()
    }
}
