use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{debug, info};

use crate::cooldown::{CooldownClock, Countdown};
use crate::session::DashboardSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownTransition {
    Idle,
    Counting(Countdown),
    Cleared,
}

/// key: cooldown-tick -> compare this tick against the previous one
pub fn evaluate_tick(
    clock: &CooldownClock,
    now: DateTime<Utc>,
    was_active: bool,
) -> CooldownTransition {
    match clock.countdown(now) {
        Some(countdown) => CooldownTransition::Counting(countdown),
        None if was_active => CooldownTransition::Cleared,
        None => CooldownTransition::Idle,
    }
}

/// One scheduler tick. Returns whether a cooldown is still running.
pub async fn process_tick(session: &DashboardSession, now: DateTime<Utc>, was_active: bool) -> bool {
    let clock = session.cooldown().await;
    match evaluate_tick(&clock, now, was_active) {
        CooldownTransition::Counting(countdown) => {
            debug!(remaining = %countdown, "support cooldown running");
            true
        }
        CooldownTransition::Cleared => {
            info!("support cooldown elapsed; submissions re-enabled");
            false
        }
        CooldownTransition::Idle => false,
    }
}

/// key: cooldown-scheduler -> external one-second clock
pub fn spawn(session: Arc<DashboardSession>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut active = false;
        loop {
            ticker.tick().await;
            active = process_tick(&session, Utc::now(), active).await;
        }
    })
}
