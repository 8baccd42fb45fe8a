//! Series aggregator
//!
//! Arranges labeled result sets into the fixed 4-panel stacked chart:
//! temperature and humidity overviews across all sources, plus detail
//! panels repeating the emphasis source. Pure data shaping, no numeric
//! transformation; the dashboard page plots the serialized spec as-is.

use crate::store::SensorReading;
use serde::Serialize;
use std::fmt;

/// Number of stacked panels, independent of how many sources exist.
pub const PANEL_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Temperature,
    Humidity,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Temperature => write!(f, "temperature"),
            Metric::Humidity => write!(f, "humidity"),
        }
    }
}

/// Default visibility of a series within a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    #[serde(rename = "shown")]
    Shown,
    #[serde(rename = "legendonly")]
    LegendOnly,
}

/// One plotted line: timestamps, values and a legend name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub visibility: Visibility,
}

impl Series {
    fn new(metric: Metric, label: &str, readings: &[SensorReading], visibility: Visibility) -> Self {
        let x = readings
            .iter()
            .map(|r| r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string())
            .collect();
        let y = readings
            .iter()
            .map(|r| match metric {
                Metric::Temperature => r.temperature,
                Metric::Humidity => r.humidity,
            })
            .collect();

        Self {
            name: format!("{metric} {label}"),
            x,
            y,
            visibility,
        }
    }
}

/// One row of the stacked chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub metric: Metric,
    pub series: Vec<Series>,
}

impl Panel {
    fn new(metric: Metric) -> Self {
        Self {
            metric,
            series: Vec::new(),
        }
    }
}

/// A fetched result set with its source label.
#[derive(Debug, Clone)]
pub struct SourceSeries {
    pub label: String,
    pub emphasis: bool,
    pub readings: Vec<SensorReading>,
}

/// The complete chart: always exactly [`PANEL_COUNT`] panels, rebuilt
/// on every query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub panels: Vec<Panel>,
}

impl ChartSpec {
    /// Build the 4-panel layout from labeled result sets in input order.
    ///
    /// Emphasis series are legend-only in the overview panels to avoid
    /// visual clutter, fully visible in their detail panels.
    pub fn build(sources: &[SourceSeries]) -> Self {
        let mut overview_temperature = Panel::new(Metric::Temperature);
        let mut overview_humidity = Panel::new(Metric::Humidity);
        let mut detail_temperature = Panel::new(Metric::Temperature);
        let mut detail_humidity = Panel::new(Metric::Humidity);

        for source in sources {
            let overview_visibility = if source.emphasis {
                Visibility::LegendOnly
            } else {
                Visibility::Shown
            };

            overview_temperature.series.push(Series::new(
                Metric::Temperature,
                &source.label,
                &source.readings,
                overview_visibility,
            ));
            overview_humidity.series.push(Series::new(
                Metric::Humidity,
                &source.label,
                &source.readings,
                overview_visibility,
            ));

            if source.emphasis {
                detail_temperature.series.push(Series::new(
                    Metric::Temperature,
                    &source.label,
                    &source.readings,
                    Visibility::Shown,
                ));
                detail_humidity.series.push(Series::new(
                    Metric::Humidity,
                    &source.label,
                    &source.readings,
                    Visibility::Shown,
                ));
            }
        }

        Self {
            panels: vec![
                overview_temperature,
                overview_humidity,
                detail_temperature,
                detail_humidity,
            ],
        }
    }
}
