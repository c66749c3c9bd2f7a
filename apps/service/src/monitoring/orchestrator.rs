use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{error, info, warn};

use super::prober::Prober;
use super::tracker::StatusTracker;
use super::types::{ProbeOutcome, ServiceCheck};
use crate::database::ServiceRepository;
use crate::database::models::MonitoredService;
use crate::notify::{self, Notifier};

/// Runs one full monitoring pass: enumerate, probe, record, notify.
///
/// The scheduled sweep and the on-demand "check now" entry point share this
/// pipeline; the only difference is the optional owner scope.
pub struct CycleRunner {
    repository: Arc<dyn ServiceRepository>,
    prober: Arc<dyn Prober>,
    tracker: Arc<StatusTracker>,
    notifier: Arc<dyn Notifier>,
}

impl CycleRunner {
    pub fn new(
        repository: Arc<dyn ServiceRepository>,
        prober: Arc<dyn Prober>,
        tracker: Arc<StatusTracker>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { repository, prober, tracker, notifier }
    }

    /// Probe every registered service once, or just one owner's services.
    ///
    /// The sweep deliberately does not filter on `is_active`: each recorded
    /// check overwrites that flag with the probe result, so filtering on it
    /// would permanently silence any service that ever went down.
    ///
    /// Each service runs in its own task; a panicking or failing entry
    /// becomes an error marker in the result set and never aborts the rest
    /// of the cycle. Only enumerating the services can fail as a whole.
    pub async fn run_cycle(&self, owner: Option<&str>) -> Result<Vec<ServiceCheck>> {
        let services = match owner {
            Some(owner) => self.repository.list_services(owner).await?,
            None => self.repository.list_all_services().await?,
        };

        let mut tasks = Vec::with_capacity(services.len());
        for service in services {
            let prober = self.prober.clone();
            let tracker = self.tracker.clone();
            let notifier = self.notifier.clone();
            let summary = (service.id, service.name.clone(), service.url.clone(), service.owner.clone());
            let handle =
                tokio::spawn(
                    async move { check_service(prober, tracker, notifier, service).await },
                );
            tasks.push((summary, handle));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for ((service_id, name, url, owner), handle) in tasks {
            match handle.await {
                Ok(check) => results.push(check),
                Err(join_err) => {
                    error!(service = %name, error = %join_err, "check task crashed");
                    results.push(ServiceCheck {
                        service_id,
                        name,
                        url,
                        owner,
                        outcome: ProbeOutcome::unreachable(),
                        transitioned: false,
                        error: Some(format!("check task crashed: {join_err}")),
                    });
                }
            }
        }

        let transitions = results.iter().filter(|check| check.transitioned).count();
        info!(checked = results.len(), transitions, "monitoring cycle finished");
        Ok(results)
    }
}

/// Probe one service, record the outcome and notify on a transition.
async fn check_service(
    prober: Arc<dyn Prober>,
    tracker: Arc<StatusTracker>,
    notifier: Arc<dyn Notifier>,
    service: MonitoredService,
) -> ServiceCheck {
    let outcome = prober.probe(&service).await;
    let now = Utc::now();

    let (transitioned, error) = match tracker.record(service.id, outcome, now).await {
        Ok(transitioned) => (transitioned, None),
        Err(err) => {
            warn!(service = %service.name, error = %err, "failed to persist check result");
            (false, Some(err.to_string()))
        }
    };

    if transitioned {
        // The status write is already committed; a delivery failure is an
        // operational log entry, never a rollback or retry.
        let text = notify::transition_message(&service, outcome, now);
        if let Err(err) = notifier.send(&service.owner, &text).await {
            warn!(recipient = %service.owner, service = %service.name, error = %err,
                "failed to deliver transition notification");
        }
    }

    ServiceCheck {
        service_id: service.id,
        name: service.name,
        url: service.url,
        owner: service.owner,
        outcome,
        transitioned,
        error,
    }
}
