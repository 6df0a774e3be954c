//! Seek-and-destroy pass over one resource kind
//!
//! A pass lists every object of the kind, keeps the ones whose names belong
//! to the run and deletes them with a bounded pool of workers:
//!
//! ```text
//! producer ──(unbounded mpsc)──> worker 1..N
//!   list (retried)                 match names
//!   wrap each object               delete (retried)
//!                                  poll until gone / timeout / cancelled
//! ```
//!
//! Nothing in a pass returns an error. Failures are logged with the kind, id
//! and names of the resource and counted in the [`PassReport`].

use crate::ownership::OwnershipFilter;
use crate::resource::{KindPolicy, Resource, ResourceKind};
use dockbench_common::DockerApi;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Counts from a single pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Objects returned by listing
    pub listed: usize,
    /// Objects with a name owned by the run
    pub matched: usize,
    /// Matched objects confirmed gone
    pub deleted: usize,
    /// Matched objects whose delete requests all failed
    pub abandoned: usize,
    /// Matched objects still present when the poll budget ran out
    pub timed_out: usize,
    /// Matched objects whose polling was cut short by cancellation
    pub interrupted: usize,
}

impl PassReport {
    /// Matched objects that may still exist
    pub fn residual(&self) -> usize {
        self.abandoned + self.timed_out + self.interrupted
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Deleted => self.deleted += 1,
            Outcome::Abandoned => self.abandoned += 1,
            Outcome::TimedOut => self.timed_out += 1,
            Outcome::Interrupted => self.interrupted += 1,
        }
    }

    pub(crate) fn merge(&mut self, other: PassReport) {
        self.listed += other.listed;
        self.matched += other.matched;
        self.deleted += other.deleted;
        self.abandoned += other.abandoned;
        self.timed_out += other.timed_out;
        self.interrupted += other.interrupted;
    }
}

/// Terminal state of one matched resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Deleted,
    Abandoned,
    TimedOut,
    Interrupted,
}

type Queue = Arc<Mutex<mpsc::UnboundedReceiver<Box<dyn Resource>>>>;

/// State shared by the workers of a pass
struct PassContext {
    kind: Arc<dyn ResourceKind>,
    filter: OwnershipFilter,
    policy: KindPolicy,
    cancel: CancellationToken,
}

/// One cleanup pass over a single resource kind
pub struct SeekAndDestroy {
    kind: Arc<dyn ResourceKind>,
    client: Arc<dyn DockerApi>,
    filter: OwnershipFilter,
    cancel: CancellationToken,
}

impl SeekAndDestroy {
    pub fn new(
        kind: Arc<dyn ResourceKind>,
        client: Arc<dyn DockerApi>,
        filter: OwnershipFilter,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            kind,
            client,
            filter,
            cancel,
        }
    }

    /// Run the pass to completion.
    ///
    /// Returns once listing has finished and every worker has drained the
    /// queue (or stopped after cancellation).
    pub async fn run(self) -> PassReport {
        let policy = self.kind.policy().clone();
        let kind_name = self.kind.name().to_string();
        let workers = policy.workers.max(1);

        info!(kind = %kind_name, workers, "Cleaning up resources");

        let (tx, rx) = mpsc::unbounded_channel();
        let queue: Queue = Arc::new(Mutex::new(rx));

        let producer = tokio::spawn(produce(
            self.kind.clone(),
            self.client.clone(),
            policy.clone(),
            tx,
        ));

        let ctx = Arc::new(PassContext {
            kind: self.kind,
            filter: self.filter,
            policy,
            cancel: self.cancel,
        });

        let mut consumers = JoinSet::new();
        for _ in 0..workers {
            consumers.spawn(consume(queue.clone(), ctx.clone()));
        }

        let mut report = PassReport::default();
        match producer.await {
            Ok(listed) => report.listed = listed,
            Err(e) => error!(kind = %kind_name, error = %e, "Resource listing task failed"),
        }

        while let Some(result) = consumers.join_next().await {
            match result {
                Ok(worker) => report.merge(worker),
                Err(e) => error!(kind = %kind_name, error = %e, "Cleanup worker failed"),
            }
        }

        if report.residual() > 0 {
            info!(
                kind = %kind_name,
                deleted = report.deleted,
                residual = report.residual(),
                "Finished cleanup with leftovers"
            );
        } else {
            info!(
                kind = %kind_name,
                listed = report.listed,
                deleted = report.deleted,
                "Finished cleanup"
            );
        }

        report
    }
}

/// List the kind and queue every object. Returns the number listed.
///
/// Dropping `tx` on return closes the queue.
async fn produce(
    kind: Arc<dyn ResourceKind>,
    client: Arc<dyn DockerApi>,
    policy: KindPolicy,
    tx: mpsc::UnboundedSender<Box<dyn Resource>>,
) -> usize {
    let listed = policy
        .list_retry()
        .run("list", || kind.list(&client))
        .await;

    let raws = match listed {
        Ok(raws) => raws,
        Err(e) => {
            error!(
                kind = %kind.name(),
                attempts = policy.list_attempts,
                error = ?e,
                "Failed to list resources"
            );
            return 0;
        }
    };

    let count = raws.len();
    debug!(kind = %kind.name(), count, "Listed resources");
    for raw in raws {
        if tx.send(kind.wrap(raw, client.clone())).is_err() {
            // Every worker has stopped
            break;
        }
    }
    count
}

/// Take resources off the queue until it is closed and empty or the pass is
/// cancelled.
async fn consume(queue: Queue, ctx: Arc<PassContext>) -> PassReport {
    let mut report = PassReport::default();

    loop {
        let next = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => None,
            resource = async { queue.lock().await.recv().await } => resource,
        };
        let Some(resource) = next else {
            break;
        };

        let names = resource.names();
        let Some(owned) = ctx.filter.first_owned(&names) else {
            continue;
        };

        report.matched += 1;
        debug!(
            kind = %ctx.kind.name(),
            id = %resource.id(),
            name = %owned,
            "Deleting resource"
        );
        report.record(destroy(resource.as_ref(), &names, &ctx).await);
    }

    report
}

/// Delete one resource and wait for it to disappear.
async fn destroy(resource: &dyn Resource, names: &[String], ctx: &PassContext) -> Outcome {
    let kind = ctx.kind.name();
    let id = resource.id();

    let requested = ctx
        .policy
        .delete_retry()
        .run("delete", || resource.delete())
        .await;

    if let Err(e) = requested {
        debug!(kind = %kind, id = %id, names = ?names, error = ?e, "Delete attempts exhausted");
        warn!(
            kind = %kind,
            id = %id,
            names = ?names,
            attempts = ctx.policy.max_attempts,
            error = ?e,
            "Failed to delete resource"
        );
        return Outcome::Abandoned;
    }

    let deadline = Instant::now() + ctx.policy.delete_timeout;
    let mut broken_checks = 0u32;

    loop {
        match resource.is_deleted().await {
            Ok(true) => return Outcome::Deleted,
            Ok(false) => {}
            Err(e) => {
                broken_checks += 1;
                error!(
                    kind = %kind,
                    id = %id,
                    failures = broken_checks,
                    error = ?e,
                    "Failed to check resource deletion status"
                );
                if broken_checks > ctx.policy.max_attempts {
                    break;
                }
            }
        }

        if Instant::now() >= deadline {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(ctx.policy.poll_interval) => {}
            _ = ctx.cancel.cancelled() => {
                warn!(
                    kind = %kind,
                    id = %id,
                    names = ?names,
                    "Cleanup cancelled before resource was confirmed deleted"
                );
                return Outcome::Interrupted;
            }
        }
    }

    warn!(
        kind = %kind,
        id = %id,
        names = ?names,
        timeout = ?ctx.policy.delete_timeout,
        failed_checks = broken_checks,
        "Resource was not deleted in time"
    );
    Outcome::TimedOut
}
