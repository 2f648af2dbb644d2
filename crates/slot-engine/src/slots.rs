//! Compute bookable fixed-length slots from busy intervals.
//!
//! Busy intervals are sorted by start and walked once with a cursor. The gap
//! in front of each interval (less the buffer) is packed with back-to-back
//! slots, each followed by one buffer. The cursor then jumps past the busy
//! period plus its buffer, and never moves backwards, so overlapping or
//! out-of-window intervals cannot reopen time that is already ruled out.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use tracing::{debug, trace};

use crate::error::Result;
use crate::interval::{FreeSlot, SlotRequest, TimeInterval};
use crate::source::{BusySource, Clock};

/// Compute free slots for `request`, given the busy intervals and the current instant.
///
/// The effective window starts at the later of the window start and
/// `now + notice`. Every returned slot lasts exactly `duration_minutes`, keeps
/// `buffer_minutes` clear of busy time on both sides, and lies inside the
/// effective window. Slots are chronological; an empty result is not an error.
///
/// # Errors
/// Returns `SlotError::InvalidArgument` for an invalid request or an interval
/// whose end precedes its start. Nothing is computed on invalid input.
pub fn compute_free_slots(
    busy: &[TimeInterval],
    request: &SlotRequest,
    now: DateTime<Utc>,
) -> Result<Vec<FreeSlot>> {
    request.validate()?;
    for interval in busy {
        interval.validate()?;
    }

    let window = &request.window;
    let tz = window.timezone();
    let duration = request.duration();
    let buffer = request.buffer();

    let end = window.end();
    // A notice that runs past the last representable instant also runs past the window.
    let start = match now.checked_add_signed(request.notice()) {
        Some(earliest) => window.start().max(earliest.with_timezone(&tz)),
        None => end,
    };
    if start > window.start() {
        trace!(
            window_start = %window.start(),
            effective_start = %start,
            "clamped window start to now"
        );
    }

    debug!(
        busy = busy.len(),
        duration_minutes = request.duration_minutes,
        buffer_minutes = request.buffer_minutes,
        timezone = tz.name(),
        "computing free slots"
    );

    let mut slots = Vec::new();
    if start >= end {
        debug!("effective window is empty");
        return Ok(slots);
    }

    let mut sorted: Vec<TimeInterval> = busy.iter().map(|i| i.in_timezone(tz)).collect();
    // Stable: equal starts keep their input order.
    sorted.sort_by_key(|i| i.start);

    let mut cursor = start;
    for interval in &sorted {
        if cursor >= end {
            break;
        }
        // Out-of-range arithmetic saturates: before the cursor, or at the window end.
        let gap_end = interval
            .start
            .checked_sub_signed(buffer)
            .map_or(cursor, |t| t.min(end));
        pack_gap(&mut slots, cursor, gap_end, duration, buffer);
        let reopens = interval.end.checked_add_signed(buffer).unwrap_or(end);
        cursor = cursor.max(reopens);
    }
    pack_gap(&mut slots, cursor, end, duration, buffer);

    debug!(slots = slots.len(), "free slot search complete");
    Ok(slots)
}

/// Fetch busy time for `calendar_id` from `source`, read `clock`, and compute
/// free slots for `request`.
///
/// The request is validated before the source is queried, so invalid input
/// never costs a fetch.
pub fn find_available_slots<S, C>(
    source: &S,
    clock: &C,
    calendar_id: &str,
    request: &SlotRequest,
) -> Result<Vec<FreeSlot>>
where
    S: BusySource + ?Sized,
    C: Clock + ?Sized,
{
    request.validate()?;
    let busy = source.busy_intervals(calendar_id, &request.window)?;
    compute_free_slots(&busy, request, clock.now())
}

/// Emit slots into `[slot_start, gap_end)`, one buffer apart.
fn pack_gap(
    slots: &mut Vec<FreeSlot>,
    mut slot_start: DateTime<Tz>,
    gap_end: DateTime<Tz>,
    duration: Duration,
    buffer: Duration,
) {
    while gap_end - slot_start >= duration {
        let Some(slot_end) = slot_start.checked_add_signed(duration) else {
            break;
        };
        slots.push(FreeSlot::from_instants(slot_start, slot_end));
        match slot_end.checked_add_signed(buffer) {
            Some(next) => slot_start = next,
            None => break,
        }
    }
}
