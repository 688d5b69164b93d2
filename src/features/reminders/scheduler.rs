//! # Reminder Scheduler
//!
//! Background loop that wakes up every tick, delivers every due subscription and
//! moves its next due time forward by its interval, measured from the tick.
//!
//! The tick is the practical floor of reminder precision: a subscription can be
//! delivered up to one tick after it became due.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Recurring subscriptions, concurrent delivery with per-send timeout, clean shutdown
//! - 1.0.0: One-shot reminder delivery

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{timeout, MissedTickBehavior};
use uuid::Uuid;

use super::catalog::ReminderCatalog;
use super::subscription::Subscription;
use crate::core::config::{DEFAULT_DELIVERY_TIMEOUT_SECONDS, DEFAULT_TICK_SECONDS};
use crate::core::{DeliveryError, StoreError};
use crate::database::Database;
use crate::transport::Transport;

/// Counters describing one scheduler tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Subscriptions returned by the due scan
    pub due: usize,
    /// Sent and rescheduled
    pub delivered: usize,
    /// Send failed or timed out; left due for the next tick
    pub failed: usize,
    /// Sent, but the row was deleted before it could be rescheduled
    pub vanished: usize,
    /// Sent, but rescheduling hit a storage error
    pub storage_errors: usize,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.due == 0
    }
}

enum Delivery {
    Delivered,
    Failed(DeliveryError),
    Vanished,
    StorageError(StoreError),
}

pub struct ReminderScheduler {
    database: Database,
    transport: Arc<dyn Transport>,
    catalog: Arc<ReminderCatalog>,
    tick: Duration,
    delivery_timeout: Duration,
}

impl ReminderScheduler {
    pub fn new(
        database: Database,
        transport: Arc<dyn Transport>,
        catalog: Arc<ReminderCatalog>,
    ) -> Self {
        Self {
            database,
            transport,
            catalog,
            tick: Duration::from_secs(DEFAULT_TICK_SECONDS),
            delivery_timeout: Duration::from_secs(DEFAULT_DELIVERY_TIMEOUT_SECONDS),
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_delivery_timeout(mut self, delivery_timeout: Duration) -> Self {
        self.delivery_timeout = delivery_timeout;
        self
    }

    /// Run until `shutdown` flips to true (or its sender is dropped).
    ///
    /// A batch that is already being delivered always runs to completion; the
    /// shutdown signal is only observed between ticks.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "⏰ Reminder scheduler started (tick: {:?}, delivery timeout: {:?})",
            self.tick, self.delivery_timeout
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.tick_at(Utc::now()).await {
                        error!("Reminder tick aborted: {e}");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("⏰ Reminder scheduler stopped");
    }

    /// Deliver everything due as of `now` and reschedule it from `now`
    pub async fn tick_at(&self, now: DateTime<Utc>) -> Result<TickReport, StoreError> {
        let tick_id = Uuid::new_v4().simple().to_string()[..8].to_string();

        // Snapshot: rows that become due while this batch runs wait for the next tick
        let due = self.database.due(now).await?;
        let mut report = TickReport {
            due: due.len(),
            ..TickReport::default()
        };

        if due.is_empty() {
            debug!("[{tick_id}] Nothing due at {now}");
            return Ok(report);
        }

        debug!("[{tick_id}] {} subscriptions due at {now}", due.len());

        let mut deliveries = JoinSet::new();
        for subscription in due {
            let text = self.catalog.text(subscription.reminder_type).to_string();
            deliveries.spawn(deliver(
                self.database.clone(),
                Arc::clone(&self.transport),
                subscription,
                text,
                now,
                self.delivery_timeout,
                tick_id.clone(),
            ));
        }

        while let Some(joined) = deliveries.join_next().await {
            match joined {
                Ok(Delivery::Delivered) => report.delivered += 1,
                Ok(Delivery::Vanished) => report.vanished += 1,
                Ok(Delivery::Failed(e)) => {
                    warn!("[{tick_id}] {e}; will retry next tick");
                    report.failed += 1;
                }
                Ok(Delivery::StorageError(e)) => {
                    error!("[{tick_id}] Could not reschedule after delivery: {e}");
                    report.storage_errors += 1;
                }
                Err(e) => {
                    error!("[{tick_id}] Delivery task panicked: {e}");
                    report.failed += 1;
                }
            }
        }

        info!(
            "[{tick_id}] Tick done: {} due, {} delivered, {} failed, {} vanished, {} storage errors",
            report.due, report.delivered, report.failed, report.vanished, report.storage_errors
        );
        Ok(report)
    }
}

async fn deliver(
    database: Database,
    transport: Arc<dyn Transport>,
    subscription: Subscription,
    text: String,
    now: DateTime<Utc>,
    limit: Duration,
    tick_id: String,
) -> Delivery {
    let user_id = subscription.user_id.as_str();
    let reminder_type = subscription.reminder_type;

    match timeout(limit, transport.send(user_id, &text)).await {
        Ok(Ok(())) => {}
        Ok(Err(source)) => {
            return Delivery::Failed(DeliveryError::Failed {
                user_id: user_id.to_string(),
                source,
            })
        }
        Err(_) => {
            return Delivery::Failed(DeliveryError::TimedOut {
                user_id: user_id.to_string(),
                timeout: limit,
            })
        }
    }

    // Re-read the row so an interval changed mid-flight applies from this delivery on
    let current = match database.get(user_id, reminder_type).await {
        Ok(Some(row)) => row,
        Ok(None) => {
            debug!("[{tick_id}] {reminder_type} for user {user_id} was removed during delivery");
            return Delivery::Vanished;
        }
        Err(e) => return Delivery::StorageError(e),
    };

    let next_due_at = current.rescheduled_from(now);
    match database.advance(user_id, reminder_type, next_due_at).await {
        Ok(()) => {
            debug!("[{tick_id}] Sent {reminder_type} to user {user_id}, next at {next_due_at}");
            Delivery::Delivered
        }
        Err(e) if e.is_not_found() => {
            debug!("[{tick_id}] {reminder_type} for user {user_id} was removed during delivery");
            Delivery::Vanished
        }
        Err(e) => Delivery::StorageError(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reminders::ReminderType;
    use crate::features::wizard::{ConfigurationWizard, MenuAction};
    use crate::transport::testing::RecordingTransport;
    use crate::transport::{UserEvent, WizardCommand};
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 4, 0, 0).unwrap()
    }

    fn minutes(m: i64) -> ChronoDuration {
        ChronoDuration::minutes(m)
    }

    async fn setup() -> (Database, Arc<RecordingTransport>, ReminderScheduler) {
        let db = Database::in_memory().await.unwrap();
        let transport = Arc::new(RecordingTransport::new());
        let scheduler = ReminderScheduler::new(
            db.clone(),
            transport.clone(),
            Arc::new(ReminderCatalog::builtin()),
        );
        (db, transport, scheduler)
    }

    /// Transport that mutates the store while a send is in flight
    struct InterferingTransport {
        database: Database,
        interference: Interference,
        inner: RecordingTransport,
    }

    enum Interference {
        DeleteAllFor(&'static str),
        Reconfigure(&'static str, ReminderType, u32),
    }

    #[async_trait]
    impl Transport for InterferingTransport {
        async fn send(&self, user_id: &str, text: &str) -> anyhow::Result<()> {
            match self.interference {
                Interference::DeleteAllFor(target) if target == user_id => {
                    self.database.delete_all(user_id).await?;
                }
                Interference::Reconfigure(target, reminder_type, interval) if target == user_id => {
                    self.database
                        .upsert(user_id, reminder_type, interval, t0())
                        .await?;
                }
                _ => {}
            }
            self.inner.send(user_id, text).await
        }
    }

    #[tokio::test]
    async fn test_istighfar_end_to_end() {
        let (db, transport, scheduler) = setup().await;
        let wizard = ConfigurationWizard::new(db.clone(), 10080);
        let user = "555";

        for event in [
            UserEvent::Command(WizardCommand::Start),
            UserEvent::Tap(MenuAction::Add.tag()),
            UserEvent::Tap(MenuAction::ChooseType(ReminderType::Istighfar).tag()),
            UserEvent::Tap(MenuAction::ChooseInterval(30).tag()),
        ] {
            wizard.handle_at(user, event, t0()).await.unwrap();
        }

        let row = db.get(user, ReminderType::Istighfar).await.unwrap().unwrap();
        assert_eq!(row.interval_minutes, 30);
        assert_eq!(row.next_due_at, t0() + minutes(30));

        // Not yet due
        let report = scheduler.tick_at(t0() + minutes(29)).await.unwrap();
        assert!(report.is_empty());
        assert!(transport.sent().is_empty());

        let tick = t0() + minutes(31);
        let report = scheduler.tick_at(tick).await.unwrap();
        assert_eq!(report.due, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(
            transport.sent_to(user),
            vec![ReminderType::Istighfar.default_text().to_string()]
        );

        let row = db.get(user, ReminderType::Istighfar).await.unwrap().unwrap();
        assert_eq!(row.next_due_at, tick + minutes(30));
    }

    #[tokio::test]
    async fn test_reschedule_counts_from_tick_not_old_due_time() {
        let (db, _transport, scheduler) = setup().await;
        db.upsert("u1", ReminderType::Tasbih, 15, t0()).await.unwrap();

        let late_tick = t0() + minutes(40);
        scheduler.tick_at(late_tick).await.unwrap();

        let row = db.get("u1", ReminderType::Tasbih).await.unwrap().unwrap();
        assert_eq!(row.next_due_at, late_tick + minutes(15));
        assert_ne!(row.next_due_at, t0() + minutes(15));
    }

    #[tokio::test]
    async fn test_failed_send_stays_due_and_batch_continues() {
        let (db, transport, scheduler) = setup().await;
        db.upsert("blocked", ReminderType::Hawqala, 15, t0()).await.unwrap();
        db.upsert("ok", ReminderType::Hawqala, 15, t0()).await.unwrap();
        transport.fail_for("blocked");

        let report = scheduler.tick_at(t0()).await.unwrap();
        assert_eq!(report.due, 2);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 1);

        let blocked = db.get("blocked", ReminderType::Hawqala).await.unwrap().unwrap();
        assert_eq!(blocked.next_due_at, t0());
        let ok = db.get("ok", ReminderType::Hawqala).await.unwrap().unwrap();
        assert_eq!(ok.next_due_at, t0() + minutes(15));

        // Retried on the next tick
        let due_again = db.due(t0() + minutes(1)).await.unwrap();
        assert_eq!(due_again.len(), 1);
        assert_eq!(due_again[0].user_id, "blocked");
    }

    #[tokio::test]
    async fn test_hanging_send_times_out_without_blocking_others() {
        let (db, transport, scheduler) = setup().await;
        let scheduler = scheduler.with_delivery_timeout(std::time::Duration::from_millis(50));
        db.upsert("slow", ReminderType::Tasbih, 30, t0()).await.unwrap();
        db.upsert("fast", ReminderType::Tasbih, 30, t0()).await.unwrap();
        transport.hang_for("slow");

        let report = scheduler.tick_at(t0()).await.unwrap();
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(transport.sent_to("fast").len(), 1);
        assert!(transport.sent_to("slow").is_empty());

        let slow = db.get("slow", ReminderType::Tasbih).await.unwrap().unwrap();
        assert_eq!(slow.next_due_at, t0());
    }

    #[tokio::test]
    async fn test_deletion_during_delivery_is_tolerated() {
        let db = Database::in_memory().await.unwrap();
        let transport = Arc::new(InterferingTransport {
            database: db.clone(),
            interference: Interference::DeleteAllFor("leaver"),
            inner: RecordingTransport::new(),
        });
        let scheduler = ReminderScheduler::new(
            db.clone(),
            transport.clone(),
            Arc::new(ReminderCatalog::builtin()),
        );
        db.upsert("leaver", ReminderType::DuaYunus, 60, t0()).await.unwrap();
        db.upsert("stayer", ReminderType::DuaYunus, 60, t0()).await.unwrap();

        let report = scheduler.tick_at(t0()).await.unwrap();
        assert_eq!(report.due, 2);
        assert_eq!(report.vanished, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.storage_errors, 0);

        assert!(db.list_for_user("leaver").await.unwrap().is_empty());
        let stayer = db.get("stayer", ReminderType::DuaYunus).await.unwrap().unwrap();
        assert_eq!(stayer.next_due_at, t0() + minutes(60));
    }

    #[tokio::test]
    async fn test_interval_change_during_delivery_applies_to_next() {
        let db = Database::in_memory().await.unwrap();
        let transport = Arc::new(InterferingTransport {
            database: db.clone(),
            interference: Interference::Reconfigure("u1", ReminderType::Hawqala, 120),
            inner: RecordingTransport::new(),
        });
        let scheduler = ReminderScheduler::new(
            db.clone(),
            transport.clone(),
            Arc::new(ReminderCatalog::builtin()),
        );
        db.upsert("u1", ReminderType::Hawqala, 15, t0()).await.unwrap();

        let tick = t0() + minutes(2);
        scheduler.tick_at(tick).await.unwrap();

        let row = db.get("u1", ReminderType::Hawqala).await.unwrap().unwrap();
        assert_eq!(row.interval_minutes, 120);
        assert_eq!(row.next_due_at, tick + minutes(120));
    }

    #[tokio::test]
    async fn test_unsubscribe_all_stops_deliveries() {
        let (db, transport, scheduler) = setup().await;
        let wizard = ConfigurationWizard::new(db.clone(), 10080);
        db.upsert("u1", ReminderType::Hawqala, 15, t0()).await.unwrap();
        db.upsert("u1", ReminderType::Tasbih, 60, t0()).await.unwrap();
        db.upsert("u2", ReminderType::Tasbih, 60, t0()).await.unwrap();

        wizard
            .handle_at("u1", UserEvent::Tap(MenuAction::UnsubscribeAll.tag()), t0())
            .await
            .unwrap();
        assert!(db.list_for_user("u1").await.unwrap().is_empty());

        for hours in [0, 1, 5, 24] {
            scheduler.tick_at(t0() + ChronoDuration::hours(hours)).await.unwrap();
        }
        assert!(transport.sent_to("u1").is_empty());
        assert!(!transport.sent_to("u2").is_empty());
    }

    #[tokio::test]
    async fn test_each_type_sends_its_own_text() {
        let (db, transport, scheduler) = setup().await;
        for t in ReminderType::ALL {
            db.upsert("u1", t, 30, t0()).await.unwrap();
        }

        let report = scheduler.tick_at(t0()).await.unwrap();
        assert_eq!(report.delivered, ReminderType::ALL.len());

        let mut sent = transport.sent_to("u1");
        sent.sort();
        let mut expected: Vec<String> = ReminderType::ALL
            .iter()
            .map(|t| t.default_text().to_string())
            .collect();
        expected.sort();
        assert_eq!(sent, expected);
    }

    #[tokio::test]
    async fn test_run_delivers_and_stops_on_shutdown() {
        let (db, transport, scheduler) = setup().await;
        let scheduler = scheduler.with_tick(std::time::Duration::from_millis(20));
        db.upsert("u1", ReminderType::Istighfar, 30, Utc::now() - minutes(1))
            .await
            .unwrap();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(scheduler.run(shutdown_rx));

        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        shutdown_tx.send(true).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(2), handle)
            .await
            .expect("scheduler should stop after shutdown")
            .unwrap();

        assert_eq!(transport.sent_to("u1").len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_row_does_not_stall_tick() {
        let (db, transport, scheduler) = setup().await;
        db.upsert("good", ReminderType::Tasbih, 15, t0()).await.unwrap();
        db.execute_raw(
            "INSERT INTO subscriptions VALUES ('x', 'takbir', 15, '2026-01-01 00:00:00')",
        )
        .await
        .unwrap();

        let report = scheduler.tick_at(t0() + minutes(60)).await.unwrap();
        assert_eq!(report.due, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(transport.sent_to("good").len(), 1);
        assert!(transport.sent_to("x").is_empty());
    }

    #[tokio::test]
    async fn test_failed_reschedule_is_counted_and_others_proceed() {
        let (db, transport, scheduler) = setup().await;
        db.upsert("stuck", ReminderType::Hawqala, 15, t0()).await.unwrap();
        db.upsert("ok", ReminderType::Hawqala, 15, t0()).await.unwrap();
        db.execute_raw(
            "CREATE TRIGGER stuck_rows BEFORE UPDATE ON subscriptions
             WHEN OLD.user_id = 'stuck'
             BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
        )
        .await
        .unwrap();

        let report = scheduler.tick_at(t0()).await.unwrap();
        assert_eq!(report.due, 2);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.storage_errors, 1);
        assert_eq!(report.failed, 0);

        // Sent but not rescheduled, so it stays due
        assert_eq!(transport.sent_to("stuck").len(), 1);
        let stuck = db.get("stuck", ReminderType::Hawqala).await.unwrap().unwrap();
        assert_eq!(stuck.next_due_at, t0());
        let ok = db.get("ok", ReminderType::Hawqala).await.unwrap().unwrap();
        assert_eq!(ok.next_due_at, t0() + minutes(15));
    }

    #[tokio::test]
    async fn test_run_keeps_ticking_after_store_failure() {
        let (db, transport, scheduler) = setup().await;
        let scheduler = scheduler.with_tick(std::time::Duration::from_millis(20));
        db.execute_raw("ALTER TABLE subscriptions RENAME TO parked")
            .await
            .unwrap();
        assert!(scheduler.tick_at(Utc::now()).await.is_err());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(scheduler.run(shutdown_rx));

        // Several ticks fail while the table is missing
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(!handle.is_finished());

        db.execute_raw("ALTER TABLE parked RENAME TO subscriptions")
            .await
            .unwrap();
        db.upsert("u1", ReminderType::Tasbih, 30, Utc::now() - minutes(1))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        shutdown_tx.send(true).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(2), handle)
            .await
            .expect("scheduler should stop after shutdown")
            .unwrap();

        assert_eq!(transport.sent_to("u1").len(), 1);
    }
}
