//! # Example: interval
//!
//! A repeating task on the tokio driver whose behavior is swapped while it runs.
//!
//! Demonstrates how to:
//! - Build a [`Scheduler`] with the default [`TokioDriver`](tickvisor::TokioDriver).
//! - Replace the behavior without touching the timer.
//! - Change the period (old timer cancelled before the new one is registered).
//! - Pause and resume through [`Period::Paused`].
//!
//! ## Flow
//! ```text
//! repeating("poll", 200ms, v1) ──► ticks run v1
//!   ├─► set_behavior(v2)        ──► next tick runs v2, same registration
//!   ├─► set_every(100ms)        ──► cancel old ─► register new
//!   ├─► set_period(Paused)      ──► cancel, no ticks
//!   └─► drop(task)              ──► nothing left registered
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example interval
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tickvisor::{BehaviorError, Config, Period, Scheduler};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let sched = Scheduler::builder(Config::default()).build();
    let polls = Arc::new(AtomicU64::new(0));

    let p = Arc::clone(&polls);
    let mut task = sched.repeating("poll", Duration::from_millis(200), move || {
        let n = p.fetch_add(1, Ordering::Relaxed) + 1;
        println!("[v1] poll #{n}");
        Ok(())
    })?;
    tokio::time::sleep(Duration::from_millis(650)).await;

    let p = Arc::clone(&polls);
    task.set_behavior(move || {
        let n = p.fetch_add(1, Ordering::Relaxed) + 1;
        if n % 3 == 0 {
            return Err(BehaviorError::fail(format!("poll #{n} timed out")));
        }
        println!("[v2] poll #{n}");
        Ok(())
    });
    tokio::time::sleep(Duration::from_millis(650)).await;

    task.set_every(Duration::from_millis(100))?;
    println!("period -> {:?}, live timers = {}", task.period(), sched.live_timers());
    tokio::time::sleep(Duration::from_millis(350)).await;

    task.set_period(Period::Paused)?;
    let paused_at = polls.load(Ordering::Relaxed);
    tokio::time::sleep(Duration::from_millis(500)).await;
    anyhow::ensure!(
        polls.load(Ordering::Relaxed) == paused_at,
        "paused task kept ticking"
    );
    println!("paused after {paused_at} polls, ticks = {}", task.ticks());

    drop(task);
    println!("live timers after drop = {}", sched.live_timers());
    Ok(())
}
