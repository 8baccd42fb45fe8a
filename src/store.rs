//! Data source adapter
//!
//! Fetches sensor readings from a relational store over a date range.
//! The `ReadingStore` trait is the seam between the query pipeline and
//! the concrete sqlx-backed MySQL/MariaDB implementation; tests swap in
//! an in-memory store behind the same trait.

use crate::error::{DashSrvError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use sqlx::mysql::{MySqlPoolOptions, MySqlRow};
use sqlx::{MySqlPool, Row};

/// One sensor sample. The source label is attached one level up so the
/// row shape stays identical across sources.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub timestamp: DateTime<Tz>,
    pub temperature: f64,
    pub humidity: f64,
}

/// Inclusive date range selected in the UI, re-validated on each query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashSrvError::InvalidRange(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Default picker range: today through tomorrow in the given timezone.
    pub fn today_and_tomorrow(tz: Tz) -> Self {
        let today = chrono::Utc::now().with_timezone(&tz).date_naive();
        let tomorrow = today.succ_opt().unwrap_or(today);
        Self {
            start: today,
            end: tomorrow,
        }
    }

    /// Datetime bounds as the store compares them: both dates bind as
    /// midnight, so the range covers [start 00:00, end 00:00] inclusive.
    pub fn bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        (
            self.start.and_time(NaiveTime::MIN),
            self.end.and_time(NaiveTime::MIN),
        )
    }
}

/// Reading store seam
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Fetch all readings from `table` within the range, timestamps
    /// converted to the target timezone. Failures are typed errors;
    /// degrading to an empty series is the caller's decision.
    async fn fetch(&self, table: &str, range: &DateRange) -> Result<Vec<SensorReading>>;
}

/// sqlx-backed MySQL/MariaDB store
pub struct SqlStore {
    pool: MySqlPool,
    tz: Tz,
}

impl SqlStore {
    /// Build a lazily-connected pool. No network I/O happens here, so a
    /// store that is down at startup only fails at query time.
    pub fn connect_lazy(url: &str, tz: Tz) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(5)
            .connect_lazy(url)?;
        Ok(Self { pool, tz })
    }

    /// Check if the store is reachable.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ReadingStore for SqlStore {
    async fn fetch(&self, table: &str, range: &DateRange) -> Result<Vec<SensorReading>> {
        let (lo, hi) = range.bounds();
        let sql = select_sql(table);

        let rows = sqlx::query(&sql)
            .bind(lo)
            .bind(hi)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let timestamp: NaiveDateTime = row.try_get("date")?;
                Ok(SensorReading {
                    timestamp: to_zoned(timestamp, self.tz),
                    temperature: get_float(row, "temperature")?,
                    humidity: get_float(row, "humidity")?,
                })
            })
            .collect()
    }
}

/// Range query with both bounds bound as parameters; only the
/// config-validated table identifier is interpolated.
fn select_sql(table: &str) -> String {
    format!("SELECT `date`, `temperature`, `humidity` FROM `{table}` WHERE `date` BETWEEN ? AND ?")
}

/// Stored timestamps are naive and assumed UTC; convert to the target
/// timezone for display.
fn to_zoned(timestamp: NaiveDateTime, tz: Tz) -> DateTime<Tz> {
    timestamp.and_utc().with_timezone(&tz)
}

/// Sensor columns are FLOAT in some store schemas and DOUBLE in others.
fn get_float(row: &MySqlRow, column: &str) -> Result<f64> {
    match row.try_get::<f64, _>(column) {
        Ok(value) => Ok(value),
        Err(_) => Ok(row.try_get::<f32, _>(column)? as f64),
    }
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory reading store for tests, filtering with the same
    //! bounds semantics as the SQL adapter.

    use super::*;

    pub(crate) struct MemoryStore {
        readings: Vec<SensorReading>,
        unreachable: bool,
    }

    impl MemoryStore {
        pub(crate) fn with_readings(readings: Vec<SensorReading>) -> Self {
            Self {
                readings,
                unreachable: false,
            }
        }

        pub(crate) fn unreachable() -> Self {
            Self {
                readings: Vec::new(),
                unreachable: true,
            }
        }
    }

    /// Build a reading at a naive-UTC timestamp, converted like the
    /// SQL adapter would.
    pub(crate) fn reading_at(ts: &str, tz: Tz) -> SensorReading {
        let naive = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").expect("valid ts");
        SensorReading {
            timestamp: super::to_zoned(naive, tz),
            temperature: 21.5,
            humidity: 40.0,
        }
    }

    #[async_trait]
    impl ReadingStore for MemoryStore {
        async fn fetch(&self, _table: &str, range: &DateRange) -> Result<Vec<SensorReading>> {
            if self.unreachable {
                return Err(DashSrvError::Database("store unreachable".into()));
            }

            let (lo, hi) = range.bounds();
            Ok(self
                .readings
                .iter()
                .filter(|r| {
                    let ts = r.timestamp.naive_utc();
                    ts >= lo && ts <= hi
                })
                .cloned()
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::{reading_at, MemoryStore};
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_date_range_rejects_reversed_bounds() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(
            DateRange::new(start, end),
            Err(DashSrvError::InvalidRange(_))
        ));
        assert!(DateRange::new(end, start).is_ok());
        assert!(DateRange::new(end, end).is_ok());
    }

    #[test]
    fn test_date_range_bounds_are_midnights() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        )
        .unwrap();
        let (lo, hi) = range.bounds();
        assert_eq!(lo.to_string(), "2024-01-01 00:00:00");
        assert_eq!(hi.to_string(), "2024-01-02 00:00:00");
    }

    #[test]
    fn test_select_sql_is_parameterized() {
        let sql = select_sql("Data");
        assert!(sql.contains("FROM `Data`"));
        assert_eq!(sql.matches('?').count(), 2);
        assert!(!sql.contains('\''));
    }

    #[test]
    fn test_to_zoned_converts_utc_to_target() {
        let naive = NaiveDateTime::parse_from_str("2024-06-01 10:00:00", "%Y-%m-%d %H:%M:%S")
            .expect("valid ts");
        let zoned = to_zoned(naive, chrono_tz::Europe::Stockholm);
        // Stockholm is UTC+2 in June.
        assert_eq!(zoned.format("%H:%M").to_string(), "12:00");
        assert_eq!(
            zoned,
            chrono_tz::Europe::Stockholm
                .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_memory_store_filters_inclusive_bounds() {
        let tz = chrono_tz::UTC;
        let store = MemoryStore::with_readings(vec![
            reading_at("2023-12-31 23:59:59", tz),
            reading_at("2024-01-01 00:00:00", tz),
            reading_at("2024-01-01 12:00:00", tz),
            reading_at("2024-01-02 00:00:00", tz),
            reading_at("2024-01-02 12:00:00", tz),
        ]);

        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        )
        .unwrap();

        let readings = store.fetch("Data", &range).await.unwrap();
        let stamps: Vec<String> = readings
            .iter()
            .map(|r| r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string())
            .collect();
        assert_eq!(
            stamps,
            vec![
                "2024-01-01 00:00:00",
                "2024-01-01 12:00:00",
                "2024-01-02 00:00:00",
            ]
        );
    }

    #[tokio::test]
    async fn test_unreachable_store_returns_error() {
        let store = MemoryStore::unreachable();
        let range = DateRange::today_and_tomorrow(chrono_tz::UTC);
        assert!(matches!(
            store.fetch("Data", &range).await,
            Err(DashSrvError::Database(_))
        ));
    }
}
