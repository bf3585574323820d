use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Accepted intents, in the form needed to re-apply them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "type")]
pub enum ActionPayload {
    SetSeed { seed: u64 },
    StartBattle { opponent_id: String },
    SelectMove { move_id: String },
    /// Records the marker position that was graded, not the ticks leading to it.
    SubmitTiming { position: f32 },
    PassTurn,
    AdvanceAi,
    Rematch,
    ReturnToMenu,
}

impl ActionPayload {
    pub fn action_type(&self) -> &'static str {
        match self {
            ActionPayload::SetSeed { .. } => "SetSeed",
            ActionPayload::StartBattle { .. } => "StartBattle",
            ActionPayload::SelectMove { .. } => "SelectMove",
            ActionPayload::SubmitTiming { .. } => "SubmitTiming",
            ActionPayload::PassTurn => "PassTurn",
            ActionPayload::AdvanceAi => "AdvanceAi",
            ActionPayload::Rematch => "Rematch",
            ActionPayload::ReturnToMenu => "ReturnToMenu",
        }
    }
}

/// Stored action entry in the append-only action log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ActionEntry {
    pub seq: u64,
    pub action_type: String,
    pub payload: ActionPayload,
    /// Milliseconds since the Unix epoch.
    pub timestamp: String,
}

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: usize = 200;

/// One page of matching entries. `next_seq` is the sequence number of the
/// first matching entry left out, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionLogPage {
    pub entries: Vec<ActionEntry>,
    pub next_seq: Option<u64>,
}

/// Append-only log of accepted intents with strictly increasing sequence numbers.
#[derive(Debug, Default)]
pub struct ActionLog {
    entries: Mutex<Vec<ActionEntry>>,
    seq: AtomicU64,
}

impl Clone for ActionLog {
    fn clone(&self) -> Self {
        ActionLog {
            entries: Mutex::new(self.entries()),
            seq: AtomicU64::new(self.seq.load(Ordering::SeqCst)),
        }
    }
}

impl ActionLog {
    pub fn new() -> Self {
        ActionLog::default()
    }

    pub fn append(&self, payload: ActionPayload) -> ActionEntry {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let timestamp = match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
            Ok(dur) => format!("{}", dur.as_millis()),
            Err(_) => "0".to_string(),
        };
        let entry = ActionEntry {
            seq,
            action_type: payload.action_type().to_string(),
            payload,
            timestamp,
        };
        match self.entries.lock() {
            Ok(mut g) => g.push(entry.clone()),
            Err(e) => e.into_inner().push(entry.clone()),
        }
        entry
    }

    /// Cloned snapshot of all entries for replay and inspection.
    pub fn entries(&self) -> Vec<ActionEntry> {
        match self.entries.lock() {
            Ok(g) => g.clone(),
            Err(e) => e.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<ActionEntry> {
        match self.entries.lock() {
            Ok(g) => g.last().cloned(),
            Err(e) => e.into_inner().last().cloned(),
        }
    }

    /// Up to `limit` entries with `seq >= from_seq`, optionally only those of
    /// one action type, oldest first.
    pub fn page(&self, from_seq: Option<u64>, limit: usize, action_type: Option<&str>) -> ActionLogPage {
        let guard = match self.entries.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        let mut matching = guard.iter().filter(|e| {
            from_seq.map_or(true, |from| e.seq >= from)
                && action_type.map_or(true, |at| e.action_type == at)
        });
        let entries: Vec<ActionEntry> = matching.by_ref().take(limit).cloned().collect();
        ActionLogPage {
            entries,
            next_seq: matching.next().map(|e| e.seq),
        }
    }

    pub fn len(&self) -> usize {
        match self.entries.lock() {
            Ok(g) => g.len(),
            Err(e) => e.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let log = ActionLog::new();
        let a = log.append(ActionPayload::SetSeed { seed: 1 });
        let b = log.append(ActionPayload::StartBattle {
            opponent_id: "bubble_bot".to_string(),
        });
        assert_eq!(a.seq, 1);
        assert_eq!(b.seq, 2);
        assert_eq!(b.action_type, "StartBattle");
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn clone_keeps_entries_and_counter() {
        let log = ActionLog::new();
        log.append(ActionPayload::ReturnToMenu);
        let copy = log.clone();
        let next = copy.append(ActionPayload::Rematch);
        assert_eq!(next.seq, 2);
        assert_eq!(log.len(), 1);
    }

    fn seeded_log() -> ActionLog {
        let log = ActionLog::new();
        log.append(ActionPayload::StartBattle {
            opponent_id: "bubble_bot".to_string(),
        });
        for move_id in ["linear_scan", "binary_search", "memoize"] {
            log.append(ActionPayload::SelectMove {
                move_id: move_id.to_string(),
            });
            log.append(ActionPayload::AdvanceAi);
        }
        log
    }

    #[test]
    fn page_starts_at_from_seq_and_points_past_the_cut() {
        let log = seeded_log();
        let page = log.page(Some(3), 2, None);
        let seqs: Vec<u64> = page.entries.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![3, 4]);
        assert_eq!(page.next_seq, Some(5));

        let rest = log.page(page.next_seq, DEFAULT_PAGE_LIMIT, None);
        assert_eq!(rest.entries.len(), 3);
        assert_eq!(rest.next_seq, None);
    }

    #[test]
    fn page_filters_by_action_type_before_limiting() {
        let log = seeded_log();
        let page = log.page(None, 2, Some("SelectMove"));
        let seqs: Vec<u64> = page.entries.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![2, 4]);
        assert_eq!(page.next_seq, Some(6));

        let empty = log.page(None, 0, Some("AdvanceAi"));
        assert!(empty.entries.is_empty());
        assert_eq!(empty.next_seq, Some(3));
    }
}
