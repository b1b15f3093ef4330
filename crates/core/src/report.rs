//! At-exit usage report.
//!
//! Dumps heap and dispatch KPIs when the driver finishes, controlled by the
//! `ABE_REPORT` env var:
//! - unset or `0` -> no report, zero cost
//! - `1` -> human-readable to stderr
//! - `json` -> JSON to stderr

use crate::actor::Config;
use crate::heap::GcList;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Human,
    Json,
}

impl ReportFormat {
    /// Parse from the `ABE_REPORT` environment variable.
    pub fn from_env() -> Option<Self> {
        match std::env::var("ABE_REPORT").ok()?.as_str() {
            "" | "0" => None,
            "1" => Some(ReportFormat::Human),
            "json" => Some(ReportFormat::Json),
            other => {
                eprintln!("Warning: ABE_REPORT='{}' not recognized, ignoring", other);
                None
            }
        }
    }
}

/// Collected metrics for the report.
#[derive(Debug, Serialize)]
pub struct UsageReport {
    pub cells_arena: usize,
    pub cells_fresh: usize,
    pub cells_free: usize,
    pub cells_perm: usize,
    pub cells_allocated: u64,
    pub gc_cycles: u64,
    pub gc_reclaimed: u64,
    pub atoms: usize,
    pub actors_created: u64,
    pub messages_sent: u64,
    pub messages_delivered: u64,
    pub messages_timed: u64,
    pub queue_depth: usize,
    pub timers_pending: usize,
    pub clock: u64,
}

impl UsageReport {
    pub fn collect(cfg: &Config) -> Self {
        let stats = cfg.stats();
        UsageReport {
            cells_arena: cfg.heap.arena_size(),
            cells_fresh: cfg.heap.count(GcList::Fresh),
            cells_free: cfg.heap.count(GcList::Free),
            cells_perm: cfg.heap.count(GcList::Perm),
            cells_allocated: cfg.heap.cells_allocated(),
            gc_cycles: cfg.heap.gc_cycles(),
            gc_reclaimed: cfg.heap.gc_reclaimed(),
            atoms: cfg.heap.atom_count(),
            actors_created: stats.actors_created,
            messages_sent: stats.sent,
            messages_delivered: stats.delivered,
            messages_timed: stats.timed,
            queue_depth: cfg.q_count(),
            timers_pending: cfg.t_count(),
            clock: cfg.clock(),
        }
    }

    fn print_human(&self) {
        eprintln!("--- abe usage ---");
        eprintln!(
            "cells: {} arena, {} fresh, {} free, {} perm ({} allocated)",
            self.cells_arena, self.cells_fresh, self.cells_free, self.cells_perm,
            self.cells_allocated
        );
        eprintln!(
            "gc: {} cycles, {} cells reclaimed",
            self.gc_cycles, self.gc_reclaimed
        );
        eprintln!("atoms: {}", self.atoms);
        eprintln!(
            "actors: {} created, {} messages sent, {} delivered, {} timed",
            self.actors_created, self.messages_sent, self.messages_delivered, self.messages_timed
        );
        eprintln!(
            "pending: {} queued, {} timers, clock {}",
            self.queue_depth, self.timers_pending, self.clock
        );
    }

    fn print_json(&self) {
        match serde_json::to_string_pretty(self) {
            Ok(s) => eprintln!("{}", s),
            Err(e) => eprintln!("Warning: report serialization failed: {}", e),
        }
    }
}

/// Emit the usage report if `ABE_REPORT` asks for one.
pub fn emit(cfg: &Config) {
    let Some(format) = ReportFormat::from_env() else {
        return;
    };
    let report = UsageReport::collect(cfg);
    match format {
        ReportFormat::Human => report.print_human(),
        ReportFormat::Json => report.print_json(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_collect_counts_allocations() {
        let mut cfg = Config::new(8);
        cfg.heap.cons(Value::Int(1), Value::Nil);
        let report = UsageReport::collect(&cfg);
        assert_eq!(report.cells_fresh, 1);
        // queue and timer anchors
        assert_eq!(report.cells_perm, 2);
        assert!(report.cells_allocated >= 3);
    }

    #[test]
    fn test_report_serializes() {
        let cfg = Config::new(8);
        let report = UsageReport::collect(&cfg);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"gc_cycles\""));
    }
}
