//! Manual sync jobs against the external crawler API

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use serde::Deserialize;
use std::fmt::Display;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Oldest year the crawler can backfill exchange rates for.
pub const FIRST_SYNC_YEAR: i32 = 2023;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncJob {
    Exchange { year: i32 },
    Fund,
}

impl SyncJob {
    pub fn kind(&self) -> &'static str {
        match self {
            SyncJob::Exchange { .. } => "exchange",
            SyncJob::Fund => "fund",
        }
    }
}

impl Display for SyncJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncJob::Exchange { year } => write!(f, "exchange ({year})"),
            SyncJob::Fund => write!(f, "fund"),
        }
    }
}

/// Years offered for an exchange sync, newest first.
pub fn exchange_year_options(current_year: i32) -> Vec<i32> {
    (FIRST_SYNC_YEAR..=current_year).rev().collect()
}

pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Body returned by the sync API.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SyncResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl SyncResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[async_trait]
pub trait SyncTrigger: Send + Sync {
    /// Base URL shown to the operator when the API cannot be reached.
    fn endpoint(&self) -> &str;

    async fn trigger(&self, job: SyncJob) -> Result<SyncResponse>;
}

/// Outcome line shown after a trigger settles.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncBanner {
    pub ok: bool,
    pub message: String,
}

impl SyncBanner {
    pub fn from_response(response: &SyncResponse) -> Self {
        if response.is_success() {
            Self {
                ok: true,
                message: format!("✅ {}", response.message),
            }
        } else {
            Self {
                ok: false,
                message: format!("❌ Failed to start: {}", response.message),
            }
        }
    }

    pub fn unreachable(endpoint: &str) -> Self {
        Self {
            ok: false,
            message: format!("❌ Cannot reach API server ({endpoint})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    Finished(SyncBanner),
    /// Another job was still in flight; no request was issued.
    Busy { running: SyncJob },
}

/// Runs sync jobs one at a time.
///
/// The busy flag is advisory: it only covers triggers issued through this
/// controller, the sync API itself does not serialize jobs.
pub struct SyncController<T: SyncTrigger> {
    trigger: T,
    in_flight: Mutex<Option<SyncJob>>,
    last_banner: Mutex<Option<SyncBanner>>,
}

struct BusyGuard<'a> {
    slot: &'a Mutex<Option<SyncJob>>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

impl<T: SyncTrigger> SyncController<T> {
    pub fn new(trigger: T) -> Self {
        Self {
            trigger,
            in_flight: Mutex::new(None),
            last_banner: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        self.trigger.endpoint()
    }

    pub fn running(&self) -> Option<SyncJob> {
        self.in_flight.lock().ok().and_then(|slot| *slot)
    }

    pub fn is_busy(&self) -> bool {
        self.running().is_some()
    }

    pub fn last_banner(&self) -> Option<SyncBanner> {
        self.last_banner.lock().ok().and_then(|b| b.clone())
    }

    fn try_begin(&self, job: SyncJob) -> Result<BusyGuard<'_>, SyncJob> {
        let mut slot = match self.in_flight.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(running) = *slot {
            return Err(running);
        }
        *slot = Some(job);
        Ok(BusyGuard {
            slot: &self.in_flight,
        })
    }

    pub async fn run(&self, job: SyncJob) -> TriggerOutcome {
        let _guard = match self.try_begin(job) {
            Ok(guard) => guard,
            Err(running) => {
                warn!(%job, %running, "Sync already in flight, ignoring trigger");
                return TriggerOutcome::Busy { running };
            }
        };

        if let Ok(mut banner) = self.last_banner.lock() {
            *banner = None;
        }

        debug!(%job, "Triggering sync");
        let banner = match self.trigger.trigger(job).await {
            Ok(response) => SyncBanner::from_response(&response),
            Err(e) => {
                warn!(error = %e, %job, "Sync API unreachable");
                SyncBanner::unreachable(self.trigger.endpoint())
            }
        };

        if let Ok(mut last) = self.last_banner.lock() {
            *last = Some(banner.clone());
        }
        TriggerOutcome::Finished(banner)
    }
}
