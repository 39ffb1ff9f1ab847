//! Timeline command: Kubernetes events and condition transitions of one
//! cluster, merged in time order.

use anyhow::{Context, Result};
use capi_lint_core::{Document, CLUSTER_NAME_LABEL};
use capi_lint_rules::conditions::{raw_conditions, Condition, NEGATIVE_CONDITIONS};
use capi_lint_source::{Query, ResourceSource};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;

use crate::{DataFormat, Globals};

/// Resources whose condition transitions join the timeline: `(type, looked up by cluster name)`.
const CONDITION_SOURCES: &[(&str, bool)] = &[
    ("clusters.cluster.x-k8s.io", true),
    ("machines.cluster.x-k8s.io", false),
    ("machinedeployments.cluster.x-k8s.io", false),
    ("kubeadmcontrolplanes.controlplane.cluster.x-k8s.io", false),
];

const MESSAGE_WIDTH: usize = 80;

const SUMMARY_RULE: &str = "==================================================";

/// Arguments of the timeline command.
#[derive(Args, Debug, Clone, Default)]
pub struct TimelineArgs {
    /// Cluster name
    pub cluster: String,

    /// Namespace of the cluster
    #[arg(short, long, default_value = "default")]
    pub namespace: String,

    /// Only entries newer than this (e.g. 30m, 1h, 2d)
    #[arg(long, value_parser = parse_since)]
    pub since: Option<Duration>,

    /// Show full messages instead of the first 80 characters
    #[arg(long)]
    pub full: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: DataFormat,

    /// Write JSON to a file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Read resources from manifests instead of the live cluster
    #[arg(long, num_args = 1..)]
    pub manifests: Vec<PathBuf>,
}

/// One timeline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEvent {
    /// When it happened.
    pub timestamp: DateTime<Utc>,
    /// Kind of the object involved.
    pub kind: String,
    /// Name of the object involved.
    pub name: String,
    /// `Normal` or `Warning`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event reason, or `Type=Status` for a condition transition.
    pub reason: String,
    /// Event or condition message.
    pub message: String,
}

impl TimelineEvent {
    fn is_warning(&self) -> bool {
        self.event_type == "Warning"
    }

    fn icon(&self) -> &'static str {
        if self.is_warning() {
            return "⚠️ ";
        }
        match self.reason.as_str() {
            "Provisioned" | "Ready" | "Created" | "Completed" => "✓ ",
            "Deleting" | "Deleted" => "✗ ",
            _ => "· ",
        }
    }
}

/// Parses `30s`, `15m`, `1h` or `2d`.
pub fn parse_since(text: &str) -> Result<Duration, String> {
    let invalid = || format!("invalid duration '{text}' (expected e.g. 30m, 1h, 2d)");
    let text = text.trim().to_ascii_lowercase();
    let unit = text.chars().last().ok_or_else(invalid)?;
    let value: u32 = text[..text.len() - unit.len_utf8()].parse().map_err(|_| invalid())?;
    let value = i64::from(value);
    match unit {
        's' => Ok(Duration::seconds(value)),
        'm' => Ok(Duration::minutes(value)),
        'h' => Ok(Duration::hours(value)),
        'd' => Ok(Duration::days(value)),
        _ => Err(invalid()),
    }
}

/// Runs the timeline command.
pub fn run(args: &TimelineArgs, globals: &Globals) -> Result<i32> {
    let config = super::load_config(globals)?;
    let source = super::scope_source(&args.manifests, &config)?;

    tracing::info!("Building timeline for cluster '{}'...", args.cluster);
    let cutoff = args.since.map(|since| Utc::now() - since);
    let events = collect(source.as_ref(), &args.cluster, &args.namespace, cutoff);

    if let Some(path) = &args.output {
        std::fs::write(path, render_json(&events)?).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Timeline written to: {}", path.display());
    } else if args.format == DataFormat::Json {
        println!("{}", render_json(&events)?);
    } else {
        print!("{}", render_timeline(&events, args.full));
        print!("{}", render_summary(&events));
    }
    Ok(0)
}

/// Events related to `cluster` plus condition transitions of its objects,
/// oldest first. Entries before `cutoff` or without a readable time are dropped.
pub fn collect(
    source: &dyn ResourceSource,
    cluster: &str,
    namespace: &str,
    cutoff: Option<DateTime<Utc>>,
) -> Vec<TimelineEvent> {
    let recent = |timestamp: &DateTime<Utc>| cutoff.map_or(true, |cutoff| *timestamp >= cutoff);
    let mut events = Vec::new();

    match source.get(&Query::new("events").namespace(Some(namespace))) {
        Ok(items) => events.extend(
            items
                .iter()
                .filter(|event| involves(event, cluster))
                .filter_map(from_event)
                .filter(|event| recent(&event.timestamp)),
        ),
        Err(e) => tracing::warn!("Could not read events: {e}"),
    }

    for (resource, by_name) in CONDITION_SOURCES {
        let query = Query::new(*resource).namespace(Some(namespace));
        let query = if *by_name {
            query.named(cluster)
        } else {
            query.selector(format!("{CLUSTER_NAME_LABEL}={cluster}"))
        };
        let items = match source.get(&query) {
            Ok(items) => items,
            Err(e) => {
                tracing::debug!("Skipping {resource}: {e}");
                continue;
            }
        };
        for doc in &items {
            events.extend(
                raw_conditions(doc)
                    .iter()
                    .filter(|entry| entry.as_map().is_some())
                    .filter_map(|entry| from_condition(&Condition::from_entry(doc, entry)))
                    .filter(|event| recent(&event.timestamp)),
            );
        }
    }

    events.sort_by_key(|event| event.timestamp);
    events
}

/// Labeled for the cluster, or about the cluster or an object named after it.
fn involves(event: &Document, cluster: &str) -> bool {
    let involved = event.str_at("involvedObject.name").unwrap_or_default();
    event.label(CLUSTER_NAME_LABEL) == Some(cluster)
        || involved == cluster
        || involved.strip_prefix(cluster).is_some_and(|rest| rest.starts_with('-'))
}

fn parse_time(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|time| time.with_timezone(&Utc))
        .ok()
}

fn from_event(event: &Document) -> Option<TimelineEvent> {
    let timestamp = ["lastTimestamp", "eventTime", "metadata.creationTimestamp"]
        .iter()
        .find_map(|path| event.str_at(path).filter(|text| !text.is_empty()))?;
    let text = |path: &str| event.str_at(path).unwrap_or_default().to_string();
    Some(TimelineEvent {
        timestamp: parse_time(timestamp)?,
        kind: text("involvedObject.kind"),
        name: text("involvedObject.name"),
        event_type: event.str_at("type").unwrap_or("Normal").to_string(),
        reason: text("reason"),
        message: text("message"),
    })
}

fn from_condition(condition: &Condition) -> Option<TimelineEvent> {
    let timestamp = parse_time(&condition.last_transition)?;
    let settled = if NEGATIVE_CONDITIONS.contains(&condition.condition_type.as_str()) {
        condition.status == "False"
    } else {
        condition.status == "True"
    };
    let message = if condition.message.is_empty() {
        condition.reason.clone()
    } else {
        condition.message.clone()
    };
    Some(TimelineEvent {
        timestamp,
        kind: condition.kind.clone(),
        name: condition.name.clone(),
        event_type: if settled { "Normal" } else { "Warning" }.to_string(),
        reason: format!("{}={}", condition.condition_type, condition.status),
        message,
    })
}

/// Entries grouped by minute.
pub fn render_timeline(events: &[TimelineEvent], full: bool) -> String {
    let mut out = String::new();
    if events.is_empty() {
        let _ = writeln!(out, "No events found");
        return out;
    }

    let mut bucket = String::new();
    for event in events {
        let minute = event.timestamp.format("%Y-%m-%d %H:%M").to_string();
        if minute != bucket {
            let _ = writeln!(out, "\n{minute}");
            let _ = writeln!(out, "{}", "-".repeat(40));
            bucket = minute;
        }

        let chars: Vec<char> = event.message.chars().collect();
        let mut lines = chars.chunks(MESSAGE_WIDTH).map(|chunk| chunk.iter().collect::<String>());
        let first = lines.next().unwrap_or_default();
        let marker = if event.is_warning() { "⚠️ " } else { "" };

        let _ = writeln!(
            out,
            "  {} {}{}/{}",
            event.timestamp.format(":%S"),
            event.icon(),
            event.kind,
            event.name
        );
        let _ = writeln!(out, "       {marker}{}: {first}", event.reason);
        if full {
            for line in lines {
                let _ = writeln!(out, "       {line}");
            }
        }
    }
    out
}

/// Counts, time range and entries per kind (most first).
pub fn render_summary(events: &[TimelineEvent]) -> String {
    let mut out = String::new();
    let (Some(first), Some(last)) = (events.first(), events.last()) else {
        return out;
    };

    let _ = writeln!(out, "\n{SUMMARY_RULE}");
    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "{SUMMARY_RULE}");
    let _ = writeln!(out, "Total events: {}", events.len());
    let _ = writeln!(out, "Warnings: {}", events.iter().filter(|e| e.is_warning()).count());

    let time = |event: &TimelineEvent| event.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
    let _ = writeln!(out, "\nTime range: {} - {}", time(first), time(last));
    let _ = writeln!(out, "Duration: {}", format_span(last.timestamp - first.timestamp));

    let mut by_kind: Vec<(&str, usize)> = Vec::new();
    for event in events {
        match by_kind.iter_mut().find(|(kind, _)| *kind == event.kind) {
            Some((_, count)) => *count += 1,
            None => by_kind.push((event.kind.as_str(), 1)),
        }
    }
    by_kind.sort_by(|a, b| b.1.cmp(&a.1));

    let _ = writeln!(out, "\nEvents by resource type:");
    for (kind, count) in by_kind {
        let _ = writeln!(out, "  {kind}: {count}");
    }
    out
}

/// `H:MM:SS`, prefixed with `N day(s), ` past a day.
fn format_span(span: Duration) -> String {
    let total = span.num_seconds().max(0);
    let (days, rest) = (total / 86_400, total % 86_400);
    let clock = format!("{}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        n => format!("{n} days, {clock}"),
    }
}

/// JSON array of entries with RFC 3339 timestamps.
pub fn render_json(events: &[TimelineEvent]) -> Result<String> {
    Ok(serde_json::to_string_pretty(events)?)
}
