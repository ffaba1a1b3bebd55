//! Async runtime around [`TrackingEngine`].
//!
//! One task owns the engine and the [`TickSource`]. Commands and ticks are
//! handled strictly one at a time, so ticks can never interleave with a
//! command halfway through. Callers talk to it through a cloneable
//! [`TrackerHandle`].

use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{CoreError, Result, ValidationError};
use crate::events::Event;
use crate::risk::Assessment;
use crate::storage::{Settings, Statistics};
use crate::ticker::{self, TickSource};
use crate::tracker::{PomodoroConfig, TrackingEngine, TrackingSession};

const EVENT_BUFFER: usize = 256;

type Reply<T> = oneshot::Sender<T>;

enum Command {
    Start(Reply<Option<Event>>),
    Stop(Reply<Option<Event>>),
    Pause(Reply<Option<Event>>),
    Resume(Reply<Option<Event>>),
    StartBreak(Reply<Option<Event>>),
    SkipBreak(Reply<Option<Event>>),
    Snapshot(Reply<Event>),
    Assess(Reply<Assessment>),
    Statistics(Reply<Statistics>),
    Session(Reply<TrackingSession>),
    Settings(Reply<Settings>),
    Pomodoro(Reply<PomodoroConfig>),
    UpdateSetting {
        field: String,
        value: String,
        reply: Reply<std::result::Result<Settings, ValidationError>>,
    },
    UpdatePomodoro {
        field: String,
        value: String,
        reply: Reply<std::result::Result<PomodoroConfig, ValidationError>>,
    },
    Shutdown(Reply<()>),
}

pub struct TrackerService;

impl TrackerService {
    /// Move `engine` onto its own task and return a handle to it.
    pub fn spawn(engine: TrackingEngine, tick_interval: Duration) -> TrackerHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (events_tx, _) = broadcast::channel(EVENT_BUFFER);
        let task = tokio::spawn(run(engine, tick_interval, cmd_rx, events_tx.clone()));
        debug!(tick_interval_ms = tick_interval.as_millis() as u64, "tracker service spawned");
        TrackerHandle {
            commands: cmd_tx,
            events: events_tx,
            task: std::sync::Arc::new(std::sync::Mutex::new(Some(task))),
        }
    }
}

async fn run(
    mut engine: TrackingEngine,
    tick_interval: Duration,
    mut commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<Event>,
) {
    let (mut ticker, mut ticks) = TickSource::new(tick_interval);
    let publish = |event: &Event| {
        // No subscribers is fine.
        let _ = events.send(event.clone());
    };

    loop {
        tokio::select! {
            biased;
            cmd = commands.recv() => {
                let Some(cmd) = cmd else { break };
                if let Some(event) = engine.refresh_day() {
                    publish(&event);
                }
                match cmd {
                    Command::Start(reply) => {
                        let event = engine.start();
                        if event.is_some() {
                            ticker.start();
                        }
                        event.iter().for_each(publish);
                        let _ = reply.send(event);
                    }
                    Command::Stop(reply) => {
                        let event = engine.stop();
                        if event.is_some() {
                            ticker.stop();
                            let stale = ticker::drain(&mut ticks);
                            debug!(stale, "discarded queued ticks");
                        }
                        event.iter().for_each(publish);
                        let _ = reply.send(event);
                    }
                    Command::Pause(reply) => {
                        let event = engine.pause();
                        event.iter().for_each(publish);
                        let _ = reply.send(event);
                    }
                    Command::Resume(reply) => {
                        let event = engine.resume();
                        event.iter().for_each(publish);
                        let _ = reply.send(event);
                    }
                    Command::StartBreak(reply) => {
                        let event = engine.start_break();
                        event.iter().for_each(publish);
                        let _ = reply.send(event);
                    }
                    Command::SkipBreak(reply) => {
                        let event = engine.skip_break();
                        event.iter().for_each(publish);
                        let _ = reply.send(event);
                    }
                    Command::Snapshot(reply) => {
                        let _ = reply.send(engine.snapshot());
                    }
                    Command::Assess(reply) => {
                        let _ = reply.send(engine.assess());
                    }
                    Command::Statistics(reply) => {
                        let _ = reply.send(engine.statistics().clone());
                    }
                    Command::Session(reply) => {
                        let _ = reply.send(engine.session().clone());
                    }
                    Command::Settings(reply) => {
                        let _ = reply.send(engine.settings().clone());
                    }
                    Command::Pomodoro(reply) => {
                        let _ = reply.send(engine.pomodoro().clone());
                    }
                    Command::UpdateSetting { field, value, reply } => {
                        let result = engine.update_setting(&field, &value).cloned();
                        let _ = reply.send(result);
                    }
                    Command::UpdatePomodoro { field, value, reply } => {
                        let result = engine.update_pomodoro(&field, &value).cloned();
                        let _ = reply.send(result);
                    }
                    Command::Shutdown(reply) => {
                        ticker.stop();
                        engine.flush();
                        info!("tracker service shut down");
                        let _ = reply.send(());
                        return;
                    }
                }
            }
            Some(_) = ticks.recv() => {
                for event in engine.tick() {
                    publish(&event);
                }
            }
        }
    }

    ticker.stop();
    engine.flush();
    debug!("all tracker handles dropped, service exiting");
}

/// Cloneable client for a running [`TrackerService`].
#[derive(Clone)]
pub struct TrackerHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<Event>,
    task: std::sync::Arc<std::sync::Mutex<Option<JoinHandle<()>>>>,
}

impl TrackerHandle {
    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| CoreError::ServiceStopped)?;
        rx.await.map_err(|_| CoreError::ServiceStopped)
    }

    pub async fn start(&self) -> Result<Option<Event>> {
        self.request(Command::Start).await
    }

    pub async fn stop(&self) -> Result<Option<Event>> {
        self.request(Command::Stop).await
    }

    pub async fn pause(&self) -> Result<Option<Event>> {
        self.request(Command::Pause).await
    }

    pub async fn resume(&self) -> Result<Option<Event>> {
        self.request(Command::Resume).await
    }

    pub async fn start_break(&self) -> Result<Option<Event>> {
        self.request(Command::StartBreak).await
    }

    pub async fn skip_break(&self) -> Result<Option<Event>> {
        self.request(Command::SkipBreak).await
    }

    pub async fn snapshot(&self) -> Result<Event> {
        self.request(Command::Snapshot).await
    }

    pub async fn assess(&self) -> Result<Assessment> {
        self.request(Command::Assess).await
    }

    pub async fn statistics(&self) -> Result<Statistics> {
        self.request(Command::Statistics).await
    }

    pub async fn session(&self) -> Result<TrackingSession> {
        self.request(Command::Session).await
    }

    pub async fn settings(&self) -> Result<Settings> {
        self.request(Command::Settings).await
    }

    pub async fn pomodoro(&self) -> Result<PomodoroConfig> {
        self.request(Command::Pomodoro).await
    }

    /// Apply one settings edit. A rejected edit comes back as
    /// [`CoreError::Validation`] and leaves the stored value alone.
    pub async fn update_setting(&self, field: &str, value: &str) -> Result<Settings> {
        let (field, value) = (field.to_string(), value.to_string());
        let result = self
            .request(|reply| Command::UpdateSetting { field, value, reply })
            .await?;
        Ok(result?)
    }

    pub async fn update_pomodoro(&self, field: &str, value: &str) -> Result<PomodoroConfig> {
        let (field, value) = (field.to_string(), value.to_string());
        let result = self
            .request(|reply| Command::UpdatePomodoro { field, value, reply })
            .await?;
        Ok(result?)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Stop ticking, persist, and end the service task.
    pub async fn shutdown(&self) -> Result<()> {
        self.request(Command::Shutdown).await?;
        let task = self.task.lock().ok().and_then(|mut task| task.take());
        if let Some(task) = task {
            let _ = task.await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::storage::MemoryStore;
    use crate::tracker::StateKind;
    use std::sync::Arc;

    fn spawn() -> TrackerHandle {
        let engine = TrackingEngine::open(
            Arc::new(MemoryStore::new()),
            Arc::new(RecordingNotifier::new()),
        );
        TrackerService::spawn(engine, Duration::from_secs(1))
    }

    fn state_of(event: &Event) -> StateKind {
        match event {
            Event::StateSnapshot { state, .. } => *state,
            other => panic!("not a snapshot: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_flow_only_after_start() {
        let handle = spawn();
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(handle.session().await.unwrap().elapsed_secs, 0);

        handle.start().await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(handle.session().await.unwrap().elapsed_secs, 3);

        handle.stop().await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(handle.session().await.unwrap().elapsed_secs, 3);
        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn pause_keeps_ticker_but_freezes_counters() {
        let handle = spawn();
        handle.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;
        handle.pause().await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(handle.session().await.unwrap().elapsed_secs, 2);
        assert_eq!(state_of(&handle.snapshot().await.unwrap()), StateKind::Paused);

        handle.resume().await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(handle.session().await.unwrap().elapsed_secs >= 4);
        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn events_are_broadcast() {
        let handle = spawn();
        let mut events = handle.subscribe();
        handle.start().await.unwrap();
        handle.start_break().await.unwrap();
        handle.skip_break().await.unwrap();

        assert_eq!(events.recv().await.unwrap().name(), "TrackingStarted");
        assert_eq!(events.recv().await.unwrap().name(), "BreakStarted");
        assert_eq!(events.recv().await.unwrap().name(), "BreakEnded");
        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_stop_counts_from_zero() {
        let handle = spawn();
        handle.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;
        handle.stop().await.unwrap().unwrap();
        handle.start().await.unwrap().unwrap();
        assert_eq!(handle.session().await.unwrap().elapsed_secs, 0);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(handle.session().await.unwrap().elapsed_secs, 1);
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn invalid_edit_is_a_validation_error() {
        let handle = spawn();
        let err = handle.update_setting("break-interval", "5").await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::BelowMinimum { .. })));
        assert_eq!(handle.settings().await.unwrap().break_interval_minutes, 30);

        let settings = handle.update_setting("break-interval", "45").await.unwrap();
        assert_eq!(settings.break_interval_minutes, 45);
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn calls_after_shutdown_fail() {
        let handle = spawn();
        handle.shutdown().await.unwrap();
        assert!(matches!(handle.start().await, Err(CoreError::ServiceStopped)));
    }
}
