//! Query pipeline
//!
//! One parameterized fetch-then-aggregate pass over the configured
//! source descriptors. A source whose store fails is logged and
//! degraded to an empty series; the chart always renders.

use crate::chart::{ChartSpec, SourceSeries};
use crate::store::{DateRange, ReadingStore};
use std::sync::Arc;
use tracing::{debug, warn};

/// One chart source bound to its store handle.
#[derive(Clone)]
pub struct SourceDescriptor {
    pub label: String,
    pub table: String,
    pub emphasis: bool,
    pub store: Arc<dyn ReadingStore>,
}

/// Fetch every source for the range and build the chart spec.
///
/// Idempotent for a fixed range and unchanged store contents.
pub async fn run(sources: &[SourceDescriptor], range: &DateRange) -> ChartSpec {
    let mut labeled = Vec::with_capacity(sources.len());

    for source in sources {
        let readings = match source.store.fetch(&source.table, range).await {
            Ok(rows) => {
                debug!(source = %source.label, rows = rows.len(), "fetched readings");
                rows
            }
            Err(e) => {
                warn!(
                    source = %source.label,
                    error = %e,
                    "store query failed, rendering empty series"
                );
                Vec::new()
            }
        };

        labeled.push(SourceSeries {
            label: source.label.clone(),
            emphasis: source.emphasis,
            readings,
        });
    }

    ChartSpec::build(&labeled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::PANEL_COUNT;
    use crate::store::memory::{reading_at, MemoryStore};
    use chrono::NaiveDate;

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(
            NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
        )
        .unwrap()
    }

    fn descriptor(label: &str, emphasis: bool, store: MemoryStore) -> SourceDescriptor {
        SourceDescriptor {
            label: label.to_string(),
            table: "Data".to_string(),
            emphasis,
            store: Arc::new(store),
        }
    }

    #[tokio::test]
    async fn test_unreachable_source_degrades_to_empty_series() {
        let tz = chrono_tz::UTC;
        let sources = vec![
            descriptor(
                "inside",
                false,
                MemoryStore::with_readings(vec![
                    reading_at("2024-01-01 08:00:00", tz),
                    reading_at("2024-01-01 20:00:00", tz),
                ]),
            ),
            descriptor("outside", true, MemoryStore::unreachable()),
        ];

        let spec = run(&sources, &range("2024-01-01", "2024-01-02")).await;

        assert_eq!(spec.panels.len(), PANEL_COUNT);
        let temp = &spec.panels[0];
        assert_eq!(temp.series[0].x.len(), 2);
        assert!(temp.series[1].x.is_empty());
        // Detail panels show the (empty) emphasis source.
        assert!(spec.panels[2].series[0].x.is_empty());
    }

    #[tokio::test]
    async fn test_no_sources_still_yields_four_panels() {
        let spec = run(&[], &range("2024-01-01", "2024-01-02")).await;
        assert_eq!(spec.panels.len(), PANEL_COUNT);
    }

    #[tokio::test]
    async fn test_pipeline_is_idempotent() {
        let tz = chrono_tz::UTC;
        let sources = vec![
            descriptor(
                "inside",
                false,
                MemoryStore::with_readings(vec![reading_at("2024-01-01 08:00:00", tz)]),
            ),
            descriptor(
                "outside",
                true,
                MemoryStore::with_readings(vec![reading_at("2024-01-01 09:00:00", tz)]),
            ),
        ];
        let r = range("2024-01-01", "2024-01-02");

        let first = run(&sources, &r).await;
        let second = run(&sources, &r).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_out_of_range_rows_are_filtered() {
        let tz = chrono_tz::UTC;
        let sources = vec![descriptor(
            "inside",
            false,
            MemoryStore::with_readings(vec![
                reading_at("2023-12-25 08:00:00", tz),
                reading_at("2024-01-01 08:00:00", tz),
            ]),
        )];

        let spec = run(&sources, &range("2024-01-01", "2024-01-02")).await;
        assert_eq!(spec.panels[0].series[0].x, vec!["2024-01-01 08:00:00"]);
    }
}
