use chrono::{DateTime, FixedOffset};

use crate::error::{TimeParseError, WindowBound};
use crate::monitor::{MetricData, DataPoint, CPU_METRIC, MEMORY_METRIC};
use crate::types::{DeploymentMetrics, TimeWindow};

const COMPACT_FORMAT: &str = "%Y%m%dT%H%M%S";

pub fn parse_timestamp(bound: WindowBound, input: &str) -> Result<DateTime<FixedOffset>, TimeParseError> {
    DateTime::parse_from_rfc3339(input).map_err(|source| TimeParseError {
        bound,
        input: input.to_string(),
        source,
    })
}

/// Parses both ends of the window. An end before the start is not rejected.
pub fn parse_time_window(start: &str, end: &str) -> Result<TimeWindow, TimeParseError> {
    Ok(TimeWindow {
        start: parse_timestamp(WindowBound::Start, start)?,
        end: parse_timestamp(WindowBound::End, end)?,
    })
}

/// Renders a timestamp as `YYYYMMDDTHHMMSS` in its own offset.
pub fn compact_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.format(COMPACT_FORMAT).to_string()
}

/// Largest non-null value in a series, never below zero.
pub fn max_point_value(values: &[DataPoint]) -> f64 {
    values
        .iter()
        .filter_map(|p| p.value)
        .fold(0.0, |max, v| if v > max { v } else { max })
}

/// Reduces a statistic-data response to per-column peaks.
///
/// Only the first point-series of each metric is considered. Metrics
/// without a name or without values are skipped, unknown names are ignored,
/// and anything missing stays at zero.
pub fn reduce_metrics(data: &[MetricData]) -> DeploymentMetrics {
    let mut metrics = DeploymentMetrics::default();

    for metric in data {
        let name = match metric.metric_name.as_deref() {
            Some(n) => n,
            None => continue,
        };
        let values = match metric.points.as_ref().and_then(|p| p.first()) {
            Some(series) => series.values.as_deref().unwrap_or_default(),
            None => continue,
        };
        if values.is_empty() {
            continue;
        }

        let peak = max_point_value(values);
        match name {
            CPU_METRIC => metrics.cpu_max_percent = peak,
            MEMORY_METRIC => metrics.mem_max_percent = peak,
            _ => {}
        }
    }

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::PointSeries;

    fn point(value: Option<f64>) -> DataPoint {
        DataPoint {
            timestamp: Some(1_721_232_000),
            value,
        }
    }

    fn metric(name: &str, values: Vec<Option<f64>>) -> MetricData {
        MetricData {
            metric_name: Some(name.to_string()),
            points: Some(vec![PointSeries {
                dimensions: None,
                values: Some(values.into_iter().map(point).collect()),
            }]),
        }
    }

    #[test]
    fn test_parse_time_window() {
        let window =
            parse_time_window("2024-07-18T00:00:00+08:00", "2024-07-18T13:00:00+08:00").unwrap();

        assert_eq!(window.start_rfc3339(), "2024-07-18T00:00:00+08:00");
        assert_eq!(window.end_rfc3339(), "2024-07-18T13:00:00+08:00");
        assert_eq!(compact_timestamp(&window.start), "20240718T000000");
        assert_eq!(compact_timestamp(&window.end), "20240718T130000");
    }

    #[test]
    fn test_utc_window_renders_with_z() {
        let window = parse_time_window("2024-07-18T00:00:00Z", "2024-07-18T01:30:15Z").unwrap();
        assert_eq!(window.start_rfc3339(), "2024-07-18T00:00:00Z");
        assert_eq!(compact_timestamp(&window.end), "20240718T013015");
    }

    #[test]
    fn test_reversed_window_is_accepted() {
        let window =
            parse_time_window("2024-07-18T13:00:00+08:00", "2024-07-18T00:00:00+08:00").unwrap();
        assert!(window.start > window.end);
    }

    #[test]
    fn test_invalid_start_names_bound_and_input() {
        let err = parse_time_window("yesterday", "2024-07-18T13:00:00+08:00").unwrap_err();
        assert_eq!(err.bound, WindowBound::Start);
        assert_eq!(err.input, "yesterday");
        assert!(err.to_string().starts_with("invalid start time \"yesterday\""));
    }

    #[test]
    fn test_invalid_end_names_bound() {
        // Offset is mandatory.
        let err = parse_time_window("2024-07-18T00:00:00+08:00", "2024-07-18T13:00:00").unwrap_err();
        assert_eq!(err.bound, WindowBound::End);
        assert_eq!(err.input, "2024-07-18T13:00:00");
    }

    #[test]
    fn test_max_ignores_null() {
        let values: Vec<DataPoint> = [Some(0.2), Some(0.8), Some(0.5), None]
            .into_iter()
            .map(point)
            .collect();
        assert_eq!(max_point_value(&values), 0.8);
    }

    #[test]
    fn test_max_all_null_is_zero() {
        let values: Vec<DataPoint> = vec![point(None), point(None)];
        assert_eq!(max_point_value(&values), 0.0);
    }

    #[test]
    fn test_reduce_metric_without_points() {
        let data = vec![
            MetricData {
                metric_name: Some(CPU_METRIC.to_string()),
                points: Some(vec![]),
            },
            MetricData {
                metric_name: Some(MEMORY_METRIC.to_string()),
                points: None,
            },
        ];
        assert_eq!(reduce_metrics(&data), DeploymentMetrics::default());
    }

    #[test]
    fn test_reduce_maps_by_name_not_position() {
        let data = vec![
            metric(MEMORY_METRIC, vec![Some(12.5), Some(40.0)]),
            metric(CPU_METRIC, vec![Some(90.0), None, Some(3.0)]),
        ];
        let metrics = reduce_metrics(&data);
        assert_eq!(metrics.cpu_max_percent, 90.0);
        assert_eq!(metrics.mem_max_percent, 40.0);
    }

    #[test]
    fn test_reduce_ignores_unknown_and_unnamed() {
        let mut unnamed = metric(CPU_METRIC, vec![Some(99.0)]);
        unnamed.metric_name = None;
        let data = vec![
            unnamed,
            metric("K8sWorkloadCpuCoreUsed", vec![Some(7.0)]),
            metric(MEMORY_METRIC, vec![Some(0.4)]),
        ];
        let metrics = reduce_metrics(&data);
        assert_eq!(metrics.cpu_max_percent, 0.0);
        assert_eq!(metrics.mem_max_percent, 0.4);
    }

    #[test]
    fn test_reduce_uses_first_series_only() {
        let mut data = metric(CPU_METRIC, vec![Some(1.0)]);
        if let Some(points) = data.points.as_mut() {
            points.push(PointSeries {
                dimensions: None,
                values: Some(vec![point(Some(50.0))]),
            });
        }
        assert_eq!(reduce_metrics(&[data]).cpu_max_percent, 1.0);
    }
}
