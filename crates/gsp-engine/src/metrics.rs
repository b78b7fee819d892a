use crate::batch::OpKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default, Clone, Copy)]
struct KindCounters {
    count: u64,
    total: Duration,
}

/// Per-kind operation counts and cumulative latency.
///
/// Guarded by its own mutex, never by the graph lock, so a snapshot may be
/// slightly ahead of or behind the graph it describes.
pub struct MetricsCollector {
    started_at: DateTime<Utc>,
    // Indexed by OpKind::index
    counters: Mutex<[KindCounters; 3]>,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            counters: Mutex::new([KindCounters::default(); 3]),
        }
    }

    pub fn record(&self, kind: OpKind, elapsed: Duration) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        let slot = &mut counters[kind.index()];
        slot.count += 1;
        slot.total += elapsed;
    }

    /// Consistent view of the counters, combined with graph sizes read by the caller.
    pub fn snapshot(&self, total_nodes: usize, total_edges: usize) -> MetricsSnapshot {
        let counters = *self.counters.lock().unwrap_or_else(|e| e.into_inner());

        let total_operations: u64 = counters.iter().map(|c| c.count).sum();
        let total_latency: Duration = counters.iter().map(|c| c.total).sum();

        MetricsSnapshot {
            started_at: self.started_at,
            total_nodes: total_nodes as u64,
            total_edges: total_edges as u64,
            total_operations,
            query: KindStats::from(counters[OpKind::Query.index()]),
            add: KindStats::from(counters[OpKind::Add.index()]),
            delete: KindStats::from(counters[OpKind::Delete.index()]),
            avg_latency_us: average_us(total_latency, total_operations),
        }
    }
}

fn average_us(total: Duration, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total.as_secs_f64() * 1_000_000.0 / count as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KindStats {
    pub count: u64,
    pub total_latency_us: u64,
    pub avg_latency_us: f64,
}

impl From<KindCounters> for KindStats {
    fn from(c: KindCounters) -> Self {
        Self {
            count: c.count,
            total_latency_us: c.total.as_micros() as u64,
            avg_latency_us: average_us(c.total, c.count),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub started_at: DateTime<Utc>,
    pub total_nodes: u64,
    pub total_edges: u64,
    pub total_operations: u64,
    pub query: KindStats,
    pub add: KindStats,
    pub delete: KindStats,
    /// Average over all kinds.
    pub avg_latency_us: f64,
}

impl MetricsSnapshot {
    pub fn kind(&self, kind: OpKind) -> &KindStats {
        match kind {
            OpKind::Query => &self.query,
            OpKind::Add => &self.add,
            OpKind::Delete => &self.delete,
        }
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Performance Metrics:")?;
        writeln!(f, "Server Started: {}", self.started_at.to_rfc3339())?;
        writeln!(f, "Total Nodes: {}", self.total_nodes)?;
        writeln!(f, "Total Edges: {}", self.total_edges)?;
        writeln!(f, "Total Requests: {}", self.total_operations)?;
        for kind in OpKind::ALL {
            let stats = self.kind(kind);
            writeln!(
                f,
                "Average {} Time: {:.3}ms ({} ops)",
                kind.label(),
                stats.avg_latency_us / 1000.0,
                stats.count
            )?;
        }
        writeln!(f, "Average Overall Time: {:.3}ms", self.avg_latency_us / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_empty_snapshot_has_zero_averages() {
        let metrics = MetricsCollector::new();
        let snap = metrics.snapshot(0, 0);
        assert_eq!(snap.total_operations, 0);
        assert_eq!(snap.query.avg_latency_us, 0.0);
        assert_eq!(snap.add.avg_latency_us, 0.0);
        assert_eq!(snap.delete.avg_latency_us, 0.0);
        assert_eq!(snap.avg_latency_us, 0.0);
    }

    #[test]
    fn test_averages_are_per_kind() {
        let metrics = MetricsCollector::new();
        metrics.record(OpKind::Query, Duration::from_micros(100));
        metrics.record(OpKind::Query, Duration::from_micros(300));
        metrics.record(OpKind::Add, Duration::from_micros(50));

        let snap = metrics.snapshot(7, 3);
        assert_eq!(snap.total_nodes, 7);
        assert_eq!(snap.total_edges, 3);
        assert_eq!(snap.total_operations, 3);
        assert_eq!(snap.query.count, 2);
        assert_eq!(snap.query.total_latency_us, 400);
        assert!((snap.query.avg_latency_us - 200.0).abs() < 1e-6);
        assert!((snap.add.avg_latency_us - 50.0).abs() < 1e-6);
        assert_eq!(snap.delete.count, 0);
        assert_eq!(snap.delete.avg_latency_us, 0.0);
        assert!((snap.avg_latency_us - 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_concurrent_records_are_not_lost() {
        let metrics = Arc::new(MetricsCollector::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let metrics = Arc::clone(&metrics);
                thread::spawn(move || {
                    let kind = OpKind::ALL[i % 3];
                    for _ in 0..1000 {
                        metrics.record(kind, Duration::from_micros(1));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let snap = metrics.snapshot(0, 0);
        assert_eq!(snap.total_operations, 8000);
        assert_eq!(snap.query.count + snap.add.count + snap.delete.count, 8000);
    }

    #[test]
    fn test_report_layout() {
        let metrics = MetricsCollector::new();
        metrics.record(OpKind::Delete, Duration::from_millis(2));
        let report = metrics.snapshot(4, 1).to_string();

        assert!(report.starts_with("Performance Metrics:\n"));
        assert!(report.contains("Total Nodes: 4\n"));
        assert!(report.contains("Total Requests: 1\n"));
        assert!(report.contains("Average Delete Time: 2.000ms (1 ops)"));
        assert!(report.contains("Average Query Time: 0.000ms (0 ops)"));
    }

    #[test]
    fn test_snapshot_serializes() {
        let snap = MetricsCollector::new().snapshot(1, 0);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["total_nodes"], 1);
        assert_eq!(json["query"]["count"], 0);
    }
}
