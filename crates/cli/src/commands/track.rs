// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Track and resume command handlers.
//!
//! Both run a tracker in the foreground and print its events until every
//! watched operation settles. Ctrl-C stops polling and leaves the records
//! active so `ot resume` can pick them up later.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use ot_adapters::{
    outcome_notification, DesktopNotifyAdapter, HttpProgressSource, NotifyAdapter, ProgressSource,
};
use ot_core::{
    is_reserved_field, Clock, OperationKey, OperationSeed, OperationStatus, SystemClock,
    RESERVED_FIELDS,
};
use ot_engine::{Tracker, TrackerConfig, TrackerEvent};
use ot_storage::{FileStore, OperationStore, Registry};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::color;
use crate::config::{ConfigError, Settings};
use crate::exit_error::{ExitError, EXIT_INTERRUPTED};
use crate::output::{event_json, format_event, OutputFormat};

#[derive(Args)]
pub struct TrackArgs {
    /// Operation type (replication, restore, ...)
    #[arg(value_name = "TYPE")]
    pub kind: String,
    /// Backend job id
    pub id: String,
    /// Progress URL template containing {id}
    #[arg(long)]
    pub url: Option<String>,
    /// Message shown until the first progress report
    #[arg(long)]
    pub message: Option<String>,
    /// Extra field stored with the record (repeatable)
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,
    /// Send a desktop notification when the operation settles
    #[arg(long)]
    pub notify: bool,
}

#[derive(Args)]
pub struct ResumeArgs {
    /// Operation type to resume
    #[arg(value_name = "TYPE")]
    pub kind: String,
    /// Progress URL template containing {id}
    #[arg(long)]
    pub url: Option<String>,
    /// Send a desktop notification as each operation settles
    #[arg(long)]
    pub notify: bool,
}

pub(crate) fn parse_field(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, _)) if is_reserved_field(key) => {
            Err(format!("'{key}' is a reserved field; reserved: {}", RESERVED_FIELDS.join(", ")))
        }
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

type HttpTracker = Tracker<HttpProgressSource, FileStore, SystemClock>;

fn build_tracker(kind: &str, url: Option<&str>, settings: &Settings) -> Result<HttpTracker> {
    let template = settings.progress_url(kind, url).map_err(|e| match e {
        ConfigError::UnknownType(_) => {
            anyhow::anyhow!("{e}; known types: {}", settings.known_types().join(", "))
        }
        other => other.into(),
    })?;
    let mut source = HttpProgressSource::new(&template)
        .with_context(|| format!("bad progress url for {kind}"))?
        .with_timeout(settings.fetch_timeout);
    if let Some(token) = &settings.token {
        source = source.with_token(token.clone());
    }
    tracing::debug!(operation_type = kind, %template, "progress source ready");

    let registry = Arc::new(Registry::open(FileStore::in_dir(&settings.state_dir), SystemClock));
    let config = TrackerConfig::new(kind)
        .poll_interval(settings.poll_interval)
        .removal_grace(settings.removal_grace);
    Ok(Tracker::new(config, source, registry))
}

pub async fn track(args: TrackArgs, settings: &Settings, format: OutputFormat) -> Result<()> {
    let tracker = build_tracker(&args.kind, args.url.as_deref(), settings)?;

    let mut seed = OperationSeed::new();
    if let Some(message) = args.message {
        seed = seed.message(message);
    }
    for (name, value) in args.fields {
        seed = seed.field(name, value);
    }

    let events = tracker.subscribe();
    tracker.start_tracking(&args.id, seed)?;
    if format == OutputFormat::Text {
        println!("Tracking {}", color::header(&OperationKey::new(&args.kind, &args.id).to_string()));
    }

    let notifier = args.notify.then(DesktopNotifyAdapter::new);
    watch(&tracker, events, BTreeSet::from([args.id]), notifier.as_ref(), format).await
}

pub async fn resume(args: ResumeArgs, settings: &Settings, format: OutputFormat) -> Result<()> {
    let tracker = build_tracker(&args.kind, args.url.as_deref(), settings)?;
    let events = tracker.subscribe();
    let ids: BTreeSet<String> = tracker
        .registry()
        .operations_by_type(&args.kind)
        .into_iter()
        .filter(|op| op.is_active())
        .map(|op| op.id)
        .collect();
    let resumed = tracker.activate();
    if resumed == 0 {
        if format == OutputFormat::Text {
            println!("{}", color::muted(&format!("No active {} operations", args.kind)));
        }
        return Ok(());
    }
    if format == OutputFormat::Text {
        println!("Resumed {resumed} {} operation(s)", args.kind);
    }

    let notifier = args.notify.then(DesktopNotifyAdapter::new);
    watch(&tracker, events, ids, notifier.as_ref(), format).await
}

/// Failed and cancelled operations seen while watching.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Outcomes {
    pub(crate) failed: usize,
    pub(crate) cancelled: usize,
}

impl Outcomes {
    fn record(&mut self, status: &OperationStatus) {
        match status {
            OperationStatus::Error => self.failed += 1,
            OperationStatus::Cancelled => self.cancelled += 1,
            _ => {}
        }
    }
}

/// Settle watched ids whose poll loop ended while their events were lost.
///
/// The outcome is read back from the registry; a record already removed
/// counts as completed.
pub(crate) fn settle_missed<P, S, C>(
    tracker: &Tracker<P, S, C>,
    pending: &mut BTreeSet<String>,
    outcomes: &mut Outcomes,
) where
    P: ProgressSource,
    S: OperationStore,
    C: Clock,
{
    pending.retain(|id| {
        if tracker.is_polling(id) {
            return true;
        }
        if let Some(op) = tracker.get_operation(id) {
            outcomes.record(&op.status);
        }
        false
    });
}

/// Print events until every id in `pending` has settled.
async fn watch<P, S, C, N>(
    tracker: &Tracker<P, S, C>,
    mut events: broadcast::Receiver<TrackerEvent>,
    mut pending: BTreeSet<String>,
    notifier: Option<&N>,
    format: OutputFormat,
) -> Result<()>
where
    P: ProgressSource,
    S: OperationStore,
    C: Clock,
    N: NotifyAdapter,
{
    let kind = tracker.operation_type().to_string();
    let mut outcomes = Outcomes::default();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    while !pending.is_empty() {
        let event = tokio::select! {
            _ = &mut ctrl_c => {
                tracker.deactivate();
                tracing::info!(operation_type = %kind, pending = pending.len(), "interrupted, leaving operations resumable");
                return Err(ExitError::new(
                    EXIT_INTERRUPTED,
                    format!("interrupted; run `ot resume {kind}` to continue"),
                )
                .into());
            }
            event = events.recv() => event,
        };
        let event = match event {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event stream lagged");
                settle_missed(tracker, &mut pending, &mut outcomes);
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        match format {
            OutputFormat::Text => {
                let status = &event.report().status;
                println!("{}", color::status(status, &format_event(&kind, &event)));
            }
            OutputFormat::Json => println!("{}", event_json(&kind, &event)),
        }

        if !event.is_terminal() || !pending.remove(event.id()) {
            continue;
        }
        outcomes.record(&event.report().status);
        if let Some(notifier) = notifier {
            notify_outcome(notifier, &kind, &event).await;
        }
    }

    match ExitError::from_outcomes(outcomes.failed, outcomes.cancelled) {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

async fn notify_outcome<N: NotifyAdapter>(notifier: &N, kind: &str, event: &TrackerEvent) {
    let key = OperationKey::new(kind, event.id());
    let report = event.report();
    let Some((title, body)) = outcome_notification(&key, &report.status, &report.message) else {
        return;
    };
    if let Err(e) = notifier.notify(&title, &body).await {
        tracing::warn!(error = %e, "desktop notification failed");
    }
}

#[cfg(test)]
#[path = "track_tests.rs"]
mod tests;
