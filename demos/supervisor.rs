//! # Example: supervisor
//!
//! Supervised repeating and one-shot tasks with a [`LogWriter`] and a
//! [`LiveTracker`] attached.
//!
//! Demonstrates how to:
//! - Attach subscribers through [`Scheduler::builder`].
//! - Issue redundant start / stop commands and see each take effect once.
//! - Run the behavior immediately on start via `Config::immediate`.
//! - Re-arm a fired one-shot with `start()`.
//!
//! ## Run
//! ```bash
//! cargo run --example supervisor --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use tickvisor::{
    Config, LiveTracker, LogWriter, OneShotTask, RepeatingTask, Scheduler, Subscribe,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let tracker = Arc::new(LiveTracker::new());
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new()), tracker.clone()];

    let cfg = Config {
        immediate: true,
        ..Config::default()
    };
    let sched = Scheduler::builder(cfg).with_subscribers(subs).build();

    let heartbeat = RepeatingTask::idle(&sched, "heartbeat", Duration::from_millis(150), || {
        println!("  heartbeat");
        Ok(())
    })?;
    let mut sup = sched.supervise(heartbeat);

    // Three starts, one registration.
    sup.start()?;
    sup.start()?;
    sup.start()?;
    tokio::time::sleep(Duration::from_millis(400)).await;

    // Fresh period window, old timer gone first.
    sup.reset()?;
    tokio::time::sleep(Duration::from_millis(400)).await;

    sup.stop();
    sup.stop();

    let deadline = OneShotTask::idle(&sched, "deadline", Duration::from_millis(100), || {
        println!("  deadline reached");
        Ok(())
    });
    let mut once = sched.supervise(deadline);
    once.start()?;
    tokio::time::sleep(Duration::from_millis(200)).await;
    anyhow::ensure!(!once.is_running(), "one-shot still pending after its deadline");

    once.start()?;
    tokio::time::sleep(Duration::from_millis(200)).await;
    println!("deadline fired {} times", once.task().ticks());

    // Flush the bus and wait for the subscribers.
    sched.shutdown().await;
    println!("live handles: {:?}", tracker.snapshot());
    Ok(())
}
