//! Periodic refresh driver: one immediate cycle on start, then a recurring
//! timer. Each cycle fetches, appends, and notifies the view; a failed fetch
//! is logged and skipped without touching state or the timer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::time::{Duration, MissedTickBehavior};

use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::render::View;
use crate::sensor::SensorSource;
use crate::state::{Reading, Sample, SampleStore};
use crate::status::{self, AlertEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Running,
    Stopped,
}

pub struct Poller {
    inner: Arc<PollerInner>,
    timer: Option<tokio::task::JoinHandle<()>>,
    state: PollState,
}

struct PollerInner {
    source: Box<dyn SensorSource + Send + Sync>,
    store: Mutex<SampleStore>,
    view: Mutex<Box<dyn View>>,
    // Serializes cycles: a tick that fires while a fetch is still in flight
    // is skipped, so append order always equals chronological order.
    in_flight: AtomicBool,
    recent_rows: usize,
}

impl Poller {
    pub fn new(
        source: Box<dyn SensorSource + Send + Sync>,
        store: SampleStore,
        view: Box<dyn View>,
        recent_rows: usize,
    ) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                source,
                store: Mutex::new(store),
                view: Mutex::new(view),
                in_flight: AtomicBool::new(false),
                recent_rows,
            }),
            timer: None,
            state: PollState::Idle,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Transition Idle/Stopped -> Running: run one cycle immediately so the
    /// display is live before the first interval elapses, then arm the timer.
    pub async fn start(&mut self, interval: Duration) {
        if self.state == PollState::Running {
            return;
        }
        self.state = PollState::Running;
        log(
            Level::Info,
            Domain::Poll,
            "started",
            obj(&[("interval_secs", json!(interval.as_secs()))]),
        );

        self.inner.cycle().await;

        let inner = self.inner.clone();
        self.timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; the immediate cycle
            // already ran, so consume it and start one interval out.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let inner = inner.clone();
                // Cycles run detached so a slow fetch outlives neither the
                // tick cadence nor stop(); the in-flight guard serializes.
                tokio::spawn(async move { inner.cycle().await });
            }
        }));
    }

    /// Disarm the timer. An in-flight fetch is not aborted; only future ticks
    /// stop. Idempotent.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        if self.state == PollState::Running {
            self.state = PollState::Stopped;
            log(Level::Info, Domain::Poll, "stopped", obj(&[]));
        }
    }

    /// One cycle outside the regular cadence. Does not reset or reschedule
    /// the armed timer.
    pub async fn refresh_now(&self) {
        log(Level::Debug, Domain::Poll, "manual_refresh", obj(&[]));
        self.inner.cycle().await;
    }

    // Read-only access for external consumers.

    pub fn current(&self) -> Reading {
        self.inner.store.lock().unwrap().current()
    }

    pub fn recent(&self, n: usize) -> Vec<Sample> {
        self.inner.store.lock().unwrap().recent(n)
    }

    pub fn history_len(&self) -> usize {
        self.inner.store.lock().unwrap().len()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl PollerInner {
    async fn cycle(&self) {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            log(Level::Debug, Domain::Poll, "tick_skipped_in_flight", obj(&[]));
            return;
        }

        match self.source.sample().await {
            Ok(sample) => {
                let alerts = status::scan(&sample);
                let (reading, recent) = {
                    let mut store = self.store.lock().unwrap();
                    store.append(sample);
                    (store.current(), store.recent(self.recent_rows))
                };
                log(
                    Level::Debug,
                    Domain::Sensor,
                    "sample",
                    obj(&[
                        ("temperature", v_num(sample.temperature)),
                        ("humidity", v_num(sample.humidity)),
                        ("smoke", v_num(sample.smoke)),
                    ]),
                );
                for alert in &alerts {
                    log_alert(alert);
                }
                let mut view = self.view.lock().unwrap();
                view.show_current(reading);
                view.show_history(&recent);
            }
            Err(err) => {
                log(
                    Level::Warn,
                    Domain::Sensor,
                    "fetch_failed",
                    obj(&[("error", v_str(&err.to_string()))]),
                );
                self.view.lock().unwrap().show_error(&err);
            }
        }

        self.in_flight.store(false, Ordering::SeqCst);
    }
}

fn log_alert(alert: &AlertEvent) {
    let fields = match alert {
        AlertEvent::SmokeHigh { ppm } => obj(&[("kind", v_str("smoke_high")), ("ppm", v_num(*ppm))]),
        AlertEvent::TemperatureOutOfRange { celsius } => {
            obj(&[("kind", v_str("temperature_out_of_range")), ("celsius", v_num(*celsius))])
        }
        AlertEvent::HumidityOutOfRange { percent } => {
            obj(&[("kind", v_str("humidity_out_of_range")), ("percent", v_num(*percent))])
        }
    };
    log(Level::Warn, Domain::Sensor, "alert", fields);
}
