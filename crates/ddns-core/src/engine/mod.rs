//! Synchronization engine
//!
//! A run resolves the public address once per address family and drives
//! every record of that family through a strictly linear sequence:
//!
//! ```text
//! START -> READ_CACHE -> (cached == current) -> SKIPPED
//!                     -> APPLY_UPDATE -> (error) -> FAILED
//!                                     -> (ok)    -> WRITE_CACHE -> NOTIFY -> UPDATED
//! ```
//!
//! ## Architecture
//!
//! ```text
//!                   ┌───────────────┐
//!                   │   run_all()   │
//!                   └───────────────┘
//!                    │             │
//!                    ▼             ▼
//!          ┌──────────────┐   ┌──────────────┐
//!          │ Synchronizer │   │ Synchronizer │
//!          │     (A)      │   │    (AAAA)    │
//!          └──────────────┘   └──────────────┘
//!                 │ resolve once, then one task per record
//!     ┌───────────┼──────────────┬─────────────────┐
//!     ▼           ▼              ▼                 ▼
//! ┌────────┐ ┌───────────┐ ┌────────────┐ ┌──────────────┐
//! │ Cache  │ │ Record    │ │ Cache      │ │ Notifier     │
//! │ (read) │ │ Updater   │ │ (write)    │ │ (webhooks)   │
//! └────────┘ └───────────┘ └────────────┘ └──────────────┘
//! ```
//!
//! ## Failure Isolation
//!
//! - Resolver failure: the family is skipped, the other family proceeds
//! - Update failure: only that record fails; no cache write, no webhook
//! - Cache read failure: treated as a miss (an empty cached address)
//! - Cache write and webhook failures: logged, the record still counts as updated
//!
//! Every spawned task is joined before its scope returns: webhook tasks
//! before their record task, record tasks before their family, families
//! before [`run_all`].

use crate::cache::CacheKey;
use crate::config::{DdnsConfig, RecordConfig, RecordType, SyncSettings};
use crate::notify::{BroadcastReport, Notifier};
use crate::traits::{AddressResolver, CacheStore, RecordUpdater};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{Instrument, error, info, info_span, warn};

/// What happened to the cache after a successful update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheWrite {
    /// The new address was persisted
    Written,
    /// No cache directory configured
    Disabled,
    /// Persisting failed; the next run will update again
    Failed { error: String },
}

/// Outcome of one record task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Cached address equals the current one; nothing was sent
    Skipped,
    /// The provider accepted the update
    Updated {
        cache: CacheWrite,
        notifications: BroadcastReport,
    },
    /// The provider call failed; cache and webhooks untouched
    Failed { error: String },
}

/// Report for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordReport {
    pub record_name: String,
    pub record_id: String,
    pub outcome: RecordOutcome,
}

/// Outcome of one address family
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOutcome {
    /// Address discovery failed; no record task was started
    ResolveFailed { error: String },
    /// Every record task ran to completion
    Completed {
        address: String,
        /// One entry per record, in configuration order
        records: Vec<RecordReport>,
    },
}

/// Report for one address family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReport {
    pub record_type: RecordType,
    pub outcome: GroupOutcome,
}

impl GroupReport {
    /// Record reports, empty when resolution failed
    pub fn records(&self) -> &[RecordReport] {
        match &self.outcome {
            GroupOutcome::Completed { records, .. } => records,
            GroupOutcome::ResolveFailed { .. } => &[],
        }
    }
}

/// Report for a whole run
///
/// Informational only: failures inside a run never change the process
/// exit status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One entry per family that had records, A before AAAA
    pub groups: Vec<GroupReport>,
}

impl RunReport {
    /// Report for the given family, if it ran
    pub fn group(&self, record_type: RecordType) -> Option<&GroupReport> {
        self.groups.iter().find(|g| g.record_type == record_type)
    }

    /// Number of records whose provider update succeeded
    pub fn updated_count(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Updated { .. }))
    }

    /// Number of records skipped on a cache hit
    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Skipped))
    }

    /// Number of records whose provider update failed
    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&RecordOutcome) -> bool) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.records())
            .filter(|r| predicate(&r.outcome))
            .count()
    }
}

/// Collaborators shared read-only by every task of a run
#[derive(Clone)]
pub struct SyncContext {
    resolver: Arc<dyn AddressResolver>,
    updater: Arc<dyn RecordUpdater>,
    cache: Arc<dyn CacheStore>,
    notifier: Notifier,
}

impl SyncContext {
    /// Create a context
    ///
    /// # Parameters
    ///
    /// - `resolver`: Public address discovery
    /// - `updater`: DNS provider
    /// - `cache`: Last-applied-address cache
    /// - `notifier`: Webhook broadcaster
    pub fn new(
        resolver: Arc<dyn AddressResolver>,
        updater: Arc<dyn RecordUpdater>,
        cache: Arc<dyn CacheStore>,
        notifier: Notifier,
    ) -> Self {
        Self {
            resolver,
            updater,
            cache,
            notifier,
        }
    }
}

/// Orchestrator for one address family
pub struct Synchronizer {
    ctx: SyncContext,
    record_type: RecordType,
    endpoint: String,
    records: Vec<RecordConfig>,
}

impl Synchronizer {
    /// Create a synchronizer for `records` of `record_type`, resolving
    /// the current address from `endpoint`
    pub fn new(
        ctx: SyncContext,
        record_type: RecordType,
        endpoint: impl Into<String>,
        records: Vec<RecordConfig>,
    ) -> Self {
        Self {
            ctx,
            record_type,
            endpoint: endpoint.into(),
            records,
        }
    }

    /// Resolve once, then sync every record concurrently and wait for all
    pub async fn run(self) -> GroupReport {
        let record_type = self.record_type;

        let address = match self.ctx.resolver.resolve(&self.endpoint).await {
            Ok(address) => address,
            Err(e) => {
                error!(error = %e, "Failed to get current IP address");
                return GroupReport {
                    record_type,
                    outcome: GroupOutcome::ResolveFailed {
                        error: e.to_string(),
                    },
                };
            }
        };
        info!(ip = %address, "Resolved current IP address");

        let shared_address: Arc<str> = Arc::from(address.as_str());
        let mut tasks = JoinSet::new();

        for (index, record) in self.records.into_iter().enumerate() {
            let ctx = self.ctx.clone();
            let address = Arc::clone(&shared_address);
            let span = info_span!(
                "sync_record",
                record_id = %record.record_id,
                record_name = %record.name,
            );

            tasks.spawn(
                async move { (index, sync_record(&ctx, record_type, record, &address).await) }
                    .instrument(span),
            );
        }

        let mut records = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => records.push(report),
                Err(e) => error!(error = %e, "Record task aborted"),
            }
        }
        records.sort_by_key(|(index, _)| *index);

        GroupReport {
            record_type,
            outcome: GroupOutcome::Completed {
                address,
                records: records.into_iter().map(|(_, r)| r).collect(),
            },
        }
    }
}

/// Run both address families concurrently and wait for both
///
/// Families without records are skipped entirely (no discovery request).
pub async fn run_all(ctx: &SyncContext, config: &DdnsConfig, settings: &SyncSettings) -> RunReport {
    let mut tasks = JoinSet::new();

    for record_type in RecordType::ALL {
        let records = config.records(record_type);
        if records.is_empty() {
            continue;
        }

        info!(record_type = %record_type, count = records.len(), "Updating records");

        let synchronizer = Synchronizer::new(
            ctx.clone(),
            record_type,
            settings.discovery_url(record_type),
            records.to_vec(),
        );
        let span = info_span!("sync_group", record_type = %record_type);
        tasks.spawn(synchronizer.run().instrument(span));
    }

    let mut groups = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(report) => groups.push(report),
            Err(e) => error!(error = %e, "Address family task aborted"),
        }
    }
    groups.sort_by_key(|g| RecordType::ALL.iter().position(|t| *t == g.record_type));

    RunReport { groups }
}

/// Compare, update, cache and notify one record
async fn sync_record(
    ctx: &SyncContext,
    record_type: RecordType,
    record: RecordConfig,
    address: &str,
) -> RecordReport {
    let key = CacheKey::for_record(record_type, &record);

    let cached = match ctx.cache.read(&key).await {
        Ok(cached) => cached,
        Err(e) => {
            // Continue as if nothing was cached
            warn!(error = %e, "Failed to read cached IP for record");
            None
        }
    };

    // A missing entry compares as empty
    let cached = cached.unwrap_or_default();

    let outcome = if cached == address {
        info!(ip = %address, "IP address unchanged for record, skipping update");
        RecordOutcome::Skipped
    } else {
        info!(
            old_ip = %cached,
            new_ip = %address,
            "Updating DNS record"
        );

        match ctx.updater.apply(&record, record_type, address).await {
            Err(e) => {
                error!(provider = ctx.updater.provider_name(), error = %e, "Failed to update DNS record");
                RecordOutcome::Failed {
                    error: e.to_string(),
                }
            }
            Ok(()) => {
                info!(ip = %address, "Successfully updated DNS record");

                let cache = write_cache(ctx, &key, address).await;
                let notifications = ctx
                    .notifier
                    .broadcast(&record.name, record_type, address, &record.webhooks)
                    .await;

                RecordOutcome::Updated {
                    cache,
                    notifications,
                }
            }
        }
    };

    RecordReport {
        record_name: record.name,
        record_id: record.record_id,
        outcome,
    }
}

/// Best-effort cache write after a successful update
async fn write_cache(ctx: &SyncContext, key: &CacheKey, address: &str) -> CacheWrite {
    if !ctx.cache.is_enabled() {
        info!(ip = %address, "Not caching IP address because no cache path is set");
        return CacheWrite::Disabled;
    }

    match ctx.cache.write(key, address).await {
        Ok(()) => {
            info!(ip = %address, "Successfully cached new IP address for record");
            CacheWrite::Written
        }
        Err(e) => {
            warn!(error = %e, "Failed to save cached IP for record");
            CacheWrite::Failed {
                error: e.to_string(),
            }
        }
    }
}
