//! `slots` CLI: compute bookable calendar slots and shape event bodies.
//!
//! Every subcommand reads a JSON document (file or stdin) and writes
//! pretty-printed JSON (file or stdout).
//!
//! ## Usage
//!
//! ```sh
//! # Free 30-minute slots around the events listed in the request
//! slots free -i request.json
//!
//! # Same, with "now" pinned for reproducible output
//! slots free -i request.json --now 2026-03-01T00:00:00Z
//!
//! # Events on whole days within the request's date range
//! slots events -i schedule.json
//!
//! # Provider body for a new event
//! echo '{"summary":"Call","start":"2026-03-02T09:00:00","end":"2026-03-02T09:30:00"}' | slots draft
//!
//! # Merge an update onto an existing event
//! slots patch -i update.json
//! ```

mod logging;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::{self, Read};
use tracing::{debug, info};

use logging::LogFormat;
use slot_engine::source::PRIMARY_CALENDAR;
use slot_engine::{
    find_available_slots, Clock, EventDraft, EventPatch, EventResource, FixedClock, FreeSlot,
    ProviderEvent, ScheduleQuery, SlotQuery, StaticSource, SystemClock,
};

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Bookable calendar slot finder and event body shaper"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log line format (logs are written to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute free slots from a slot query and the calendar's events
    Free {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Treat this RFC 3339 instant as the current time
        #[arg(long)]
        now: Option<String>,
        /// Calendar the request's events belong to
        #[arg(long, env = "SLOTS_CALENDAR", default_value = PRIMARY_CALENDAR)]
        calendar: String,
    },
    /// List the events that fall on the requested days
    Events {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Build the provider body for a new event
    Draft {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Merge an update onto an existing event body
    Patch {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// `slots free` input: the query plus the events of the calendar.
#[derive(Deserialize)]
struct FreeInput {
    #[serde(flatten)]
    query: SlotQuery,
    #[serde(default)]
    events: Vec<ProviderEvent>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FreeOutput {
    available_slots: Vec<FreeSlot>,
}

/// `slots events` input: the day range plus the events to filter.
#[derive(Deserialize)]
struct EventsInput {
    #[serde(flatten)]
    query: ScheduleQuery,
    #[serde(default)]
    events: Vec<ProviderEvent>,
}

#[derive(Serialize)]
struct EventsOutput {
    events: Vec<ProviderEvent>,
}

#[derive(Deserialize)]
struct PatchInput {
    existing: EventResource,
    patch: EventPatch,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_format)?;

    match cli.command {
        Commands::Free {
            input,
            output,
            now,
            calendar,
        } => {
            let raw = read_input(input.as_deref())?;
            let FreeInput { query, events } =
                serde_json::from_str(&raw).context("Failed to parse slot request")?;
            let request = query.to_request().context("Invalid slot request")?;
            info!(events = events.len(), calendar = %calendar, "computing available slots");

            let source = StaticSource::new().with_calendar(calendar.clone(), events);
            let clock = clock_for(now.as_deref())?;
            let available_slots = find_available_slots(&source, clock.as_ref(), &calendar, &request)
                .context("Failed to compute available slots")?;

            write_json(output.as_deref(), &FreeOutput { available_slots })?;
        }
        Commands::Events { input, output } => {
            let raw = read_input(input.as_deref())?;
            let EventsInput { query, events } =
                serde_json::from_str(&raw).context("Failed to parse schedule request")?;
            let window = query.window().context("Invalid schedule request")?;
            let events = StaticSource::primary(events)
                .events_in(PRIMARY_CALENDAR, &window)
                .context("Failed to list events")?;
            info!(events = events.len(), "listed scheduled events");

            write_json(output.as_deref(), &EventsOutput { events })?;
        }
        Commands::Draft { input, output } => {
            let raw = read_input(input.as_deref())?;
            let draft = EventDraft::from_json(&raw).context("Failed to parse event draft")?;
            let resource = draft.into_resource().context("Invalid event draft")?;
            write_json(output.as_deref(), &resource)?;
        }
        Commands::Patch { input, output } => {
            let raw = read_input(input.as_deref())?;
            let PatchInput { existing, patch } =
                serde_json::from_str(&raw).context("Failed to parse event patch")?;
            let merged = patch.apply(&existing).context("Invalid event patch")?;
            write_json(output.as_deref(), &merged)?;
        }
    }

    Ok(())
}

/// A pinned clock for `--now`, otherwise the system clock.
fn clock_for(now: Option<&str>) -> Result<Box<dyn Clock>> {
    match now {
        Some(raw) => {
            let at: DateTime<Utc> = DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("Invalid --now timestamp: {}", raw))?
                .with_timezone(&Utc);
            debug!(now = %at, "using pinned clock");
            Ok(Box::new(FixedClock(at)))
        }
        None => Ok(Box::new(SystemClock)),
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_json<T: Serialize>(path: Option<&str>, value: &T) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    content.push('\n');
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
