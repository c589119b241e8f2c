//! # Temporal Relevance Selector
//! Picks the single record worth displaying "now" from a batch of
//! time-stamped, status-tagged records, plus the simpler transit variants:
//! alert validity windowing and arrival ranking.

use chrono::{DateTime, Duration, Utc};

/// Finished records older than this are no longer worth showing.
pub const DEFAULT_LOOK_BACK_DAYS: i64 = 3;

/// Arrival predictions shown per refresh.
pub const MAX_ARRIVALS: usize = 4;

/// Coarse phase of a record, derived from its upstream status tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordPhase {
    InProgress,
    Scheduled,
    Finished,
    Other,
}

/// A record the selector can rank: a status phase and an optional timestamp.
pub trait TemporalRecord {
    fn phase(&self) -> RecordPhase;
    fn timestamp(&self) -> Option<DateTime<Utc>>;
}

/// Why a record was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceTier {
    Live,
    Upcoming,
    Recent,
}

/// Eligibility horizons, fixed per source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalWindow {
    /// How far ahead a scheduled record stays eligible; `None` is unbounded.
    pub look_ahead: Option<Duration>,
    /// How far back a finished record stays eligible.
    pub look_back: Duration,
}

impl Default for TemporalWindow {
    fn default() -> Self {
        Self {
            look_ahead: None,
            look_back: Duration::days(DEFAULT_LOOK_BACK_DAYS),
        }
    }
}

/// The chosen record and the tier that won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a, T> {
    pub record: &'a T,
    pub tier: RelevanceTier,
}

/// Applies the priority policy: live > upcoming > recent > nothing.
///
/// - Live: first in-progress record in input order wins outright; its
///   timestamp is not consulted.
/// - Upcoming: first scheduled record in input order with a timestamp
///   strictly after `now` (and inside `look_ahead` when bounded). The
///   tie-break is input order, not earliest-first.
/// - Recent: the latest-timestamped finished record inside `look_back`.
///
/// Zero eligible records is a valid empty result, never an error.
pub fn most_relevant<'a, T: TemporalRecord>(
    records: &'a [T],
    now: DateTime<Utc>,
    window: TemporalWindow,
) -> Option<Selection<'a, T>> {
    let mut upcoming: Option<&T> = None;
    let mut recent: Option<(&T, DateTime<Utc>)> = None;

    for record in records {
        match record.phase() {
            RecordPhase::InProgress => {
                return Some(Selection {
                    record,
                    tier: RelevanceTier::Live,
                });
            }
            RecordPhase::Scheduled => {
                if upcoming.is_none() {
                    if let Some(ts) = record.timestamp() {
                        let within_horizon =
                            window.look_ahead.is_none_or(|ahead| ts - now <= ahead);
                        if ts > now && within_horizon {
                            upcoming = Some(record);
                        }
                    }
                }
            }
            RecordPhase::Finished => {
                if let Some(ts) = record.timestamp() {
                    let eligible = ts > now - window.look_back;
                    let newer = recent.is_none_or(|(_, best)| ts > best);
                    if eligible && newer {
                        recent = Some((record, ts));
                    }
                }
            }
            RecordPhase::Other => {}
        }
    }

    if let Some(record) = upcoming {
        return Some(Selection {
            record,
            tier: RelevanceTier::Upcoming,
        });
    }
    recent.map(|(record, _)| Selection {
        record,
        tier: RelevanceTier::Recent,
    })
}

/// One `[start, end)` validity interval of a transit alert. A missing start
/// means already active; a missing end means open-ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivePeriod {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ActivePeriod {
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| start <= now) && self.end.is_none_or(|end| now < end)
    }
}

/// An alert is active if any of its periods admits `now`. An alert with no
/// periods at all is never active.
pub fn is_active_at(periods: &[ActivePeriod], now: DateTime<Utc>) -> bool {
    periods.iter().any(|p| p.contains(now))
}

/// Ranks arrival predictions: discard anything already passed (negative
/// minutes), sort soonest first, keep at most `max`.
pub fn rank_arrivals<T, F>(mut items: Vec<T>, minutes: F, max: usize) -> Vec<T>
where
    F: Fn(&T) -> i64,
{
    items.retain(|item| minutes(item) >= 0);
    items.sort_by_key(|item| minutes(item));
    items.truncate(max);
    items
}
