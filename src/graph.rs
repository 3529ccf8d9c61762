use crate::error::PlotError;
use crate::table::{CellValue, ColumnKind, Table};
use plotters::prelude::*;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Chart kinds offered on the Plot page
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum PlotKind {
    /// Bar counts of the distinct values of a categorical column
    #[default]
    Countplot,

    /// Markers joined by a line, Y against X in row order
    Line,

    /// Frequency distribution of a numeric column
    Histogram,
}

impl PlotKind {
    pub const ALL: [PlotKind; 3] = [PlotKind::Countplot, PlotKind::Line, PlotKind::Histogram];

    pub fn label(&self) -> &'static str {
        match self {
            PlotKind::Countplot => "Countplot",
            PlotKind::Line => "Line Plot",
            PlotKind::Histogram => "Histogram",
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PlotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.label() == s.trim())
            .ok_or_else(|| format!("Unknown plot type: {}", s))
    }
}

/// What to draw and from which columns
#[derive(Clone, Debug, PartialEq)]
pub enum PlotSpec {
    Count { column: String },
    Line { x: String, y: String },
    Histogram { column: String },
}

impl PlotSpec {
    pub fn kind(&self) -> PlotKind {
        match self {
            PlotSpec::Count { .. } => PlotKind::Countplot,
            PlotSpec::Line { .. } => PlotKind::Line,
            PlotSpec::Histogram { .. } => PlotKind::Histogram,
        }
    }
}

/// Configuration options for chart rendering
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Width of the chart in pixels
    pub width: u32,

    /// Height of the chart in pixels
    pub height: u32,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// One histogram bin, `[start, end)` except the last which includes `end`
#[derive(Clone, Debug, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Data extracted from a table once the column choice has been validated
#[derive(Clone, Debug, PartialEq)]
pub enum PlotData {
    Counts {
        column: String,
        counts: Vec<(String, usize)>,
    },
    Points {
        x: String,
        y: String,
        points: Vec<(f64, f64)>,
    },
    Bins {
        column: String,
        bins: Vec<Bin>,
    },
}

fn kind_of(table: &Table, column: &str) -> Result<ColumnKind, PlotError> {
    table
        .column_kind(column)
        .ok_or_else(|| PlotError::UnknownColumn(column.to_string()))
}

fn numbers(table: &Table, column: &str) -> Vec<f64> {
    table
        .column_values(column)
        .unwrap_or_default()
        .into_iter()
        .filter_map(CellValue::as_f64)
        .collect()
}

/// Checks the column kinds for `spec` and pulls out the values to draw
///
/// # Errors
/// * `PlotError::NotCategorical` when a countplot is asked of a non-text column
/// * `PlotError::NotNumeric` when a line plot or histogram gets a non-numeric column
/// * `PlotError::NoData` when the columns hold nothing to draw
pub fn prepare(table: &Table, spec: &PlotSpec) -> Result<PlotData, PlotError> {
    match spec {
        PlotSpec::Count { column } => {
            if kind_of(table, column)? != ColumnKind::Categorical {
                return Err(PlotError::NotCategorical(column.clone()));
            }
            let values = table.column_values(column).unwrap_or_default();
            let counts = value_counts(values.into_iter());
            if counts.is_empty() {
                return Err(PlotError::NoData);
            }
            Ok(PlotData::Counts {
                column: column.clone(),
                counts,
            })
        }
        PlotSpec::Line { x, y } => {
            let x_kind = kind_of(table, x)?;
            let y_kind = kind_of(table, y)?;
            if x_kind != ColumnKind::Numeric || y_kind != ColumnKind::Numeric {
                return Err(PlotError::NotNumeric(vec![x.clone(), y.clone()]));
            }
            let xs = table.column_values(x).unwrap_or_default();
            let ys = table.column_values(y).unwrap_or_default();
            let points: Vec<(f64, f64)> = xs
                .into_iter()
                .zip(ys)
                .filter_map(|(a, b)| Some((a.as_f64()?, b.as_f64()?)))
                .collect();
            if points.is_empty() {
                return Err(PlotError::NoData);
            }
            Ok(PlotData::Points {
                x: x.clone(),
                y: y.clone(),
                points,
            })
        }
        PlotSpec::Histogram { column } => {
            if kind_of(table, column)? != ColumnKind::Numeric {
                return Err(PlotError::NotNumeric(vec![column.clone()]));
            }
            let values = numbers(table, column);
            if values.is_empty() {
                return Err(PlotError::NoData);
            }
            Ok(PlotData::Bins {
                column: column.clone(),
                bins: histogram_bins(&values),
            })
        }
    }
}

/// Counts distinct non-empty values, in order of first appearance
pub fn value_counts<'a>(values: impl Iterator<Item = &'a CellValue>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values.filter(|v| !v.is_empty()) {
        let key = value.to_string();
        match counts.iter_mut().find(|(k, _)| *k == key) {
            Some((_, n)) => *n += 1,
            None => counts.push((key, 1)),
        }
    }
    counts
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Upper bound on histogram bins, whatever the spread of the data
pub const MAX_BINS: usize = 1_000;

/// Number of bins: the larger of the Sturges and Freedman-Diaconis estimates
///
/// The Freedman-Diaconis estimate is capped at `MAX_BINS` and at ten bins per
/// value, so a single far outlier cannot blow up the bin count.
pub fn bin_count(values: &[f64]) -> usize {
    let n = values.len();
    if n < 2 {
        return 1;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let range = sorted[n - 1] - sorted[0];
    if range <= 0.0 {
        return 1;
    }

    let sturges = ((n as f64).log2() + 1.0).ceil() as usize;
    let iqr = quantile(&sorted, 0.75) - quantile(&sorted, 0.25);
    let fd_width = 2.0 * iqr / (n as f64).cbrt();
    let fd = if fd_width > 0.0 {
        // Saturating float-to-int cast; capped below
        (range / fd_width).ceil() as usize
    } else {
        0
    };
    let cap = n.saturating_mul(10).min(MAX_BINS);
    sturges.max(fd.min(cap)).max(1)
}

/// Splits the values into equal-width bins covering min..=max
pub fn histogram_bins(values: &[f64]) -> Vec<Bin> {
    if values.is_empty() {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max <= min {
        return vec![Bin {
            start: min - 0.5,
            end: max + 0.5,
            count: values.len(),
        }];
    }

    let count = bin_count(values);
    let width = (max - min) / count as f64;
    let mut bins: Vec<Bin> = (0..count)
        .map(|i| Bin {
            start: min + width * i as f64,
            end: if i + 1 == count {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for v in values {
        let idx = (((v - min) / width) as usize).min(count - 1);
        bins[idx].count += 1;
    }
    bins
}

/// Creates a chart from table data
///
/// Validates the column choice, then renders the chart as PNG.
///
/// # Arguments
/// * `table` - Sheet holding the data
/// * `spec` - Chart kind and columns
/// * `options` - Chart dimensions
///
/// # Returns
/// * PNG image bytes, or the reason nothing was drawn
pub fn create_graph(table: &Table, spec: &PlotSpec, options: &GraphOptions) -> Result<Vec<u8>, PlotError> {
    let data = prepare(table, spec)?;
    render_png(&data, options).map_err(|e| PlotError::Render(e.to_string()))
}

fn render_png(data: &PlotData, options: &GraphOptions) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    // The bitmap backend picks its encoder from the file extension
    let file = tempfile::Builder::new()
        .prefix("plot")
        .suffix(".png")
        .tempfile()?;
    {
        let root = BitMapBackend::new(file.path(), (options.width, options.height)).into_drawing_area();
        root.fill(&WHITE)?;

        match data {
            PlotData::Counts { column, counts } => draw_counts(&root, column, counts)?,
            PlotData::Points { x, y, points } => draw_line(&root, x, y, points)?,
            PlotData::Bins { column, bins } => draw_histogram(&root, column, bins)?,
        }

        root.present()?;
    }

    Ok(std::fs::read(file.path())?)
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, plotters::coord::Shift>;

fn draw_counts(root: &Area<'_>, column: &str, counts: &[(String, usize)]) -> Result<(), Box<dyn std::error::Error>> {
    let max = counts.iter().map(|(_, n)| *n).max().unwrap_or(1) as u32;
    let labels: Vec<&str> = counts.iter().map(|(k, _)| k.as_str()).collect();

    let mut chart = ChartBuilder::on(root)
        .caption(format!("Count of {}", column), ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d((0u32..counts.len() as u32).into_segmented(), 0u32..max + 1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(column)
        .y_desc("count")
        .x_labels(labels.len())
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).map(|s| s.to_string()).unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.filled())
            .margin(10)
            .data(counts.iter().enumerate().map(|(i, (_, n))| (i as u32, *n as u32))),
    )?;

    Ok(())
}

fn draw_line(root: &Area<'_>, x: &str, y: &str, points: &[(f64, f64)]) -> Result<(), Box<dyn std::error::Error>> {
    let (min_x, max_x) = bounds(points.iter().map(|p| p.0));
    let (min_y, max_y) = bounds(points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(root)
        .caption(format!("Line Plot of {} vs {}", y, x), ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(min_x..max_x, min_y..max_y)?;

    chart.configure_mesh().x_desc(x).y_desc(y).draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), &BLUE))?;
    chart.draw_series(points.iter().map(|&p| Circle::new(p, 4, BLUE.filled())))?;

    Ok(())
}

fn draw_histogram(root: &Area<'_>, column: &str, bins: &[Bin]) -> Result<(), Box<dyn std::error::Error>> {
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return Ok(());
    };
    let max = bins.iter().map(|b| b.count).max().unwrap_or(1) as f64;

    let mut chart = ChartBuilder::on(root)
        .caption(format!("Histogram of {}", column), ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(first.start..last.end, 0f64..max * 1.1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(column)
        .y_desc("Frequency")
        .draw()?;

    chart.draw_series(
        bins.iter()
            .map(|b| Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], BLUE.mix(0.6).filled())),
    )?;

    Ok(())
}

/// Axis range padded so a single point or a flat line still has a visible span
fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let pad = ((max - min) * 0.05).max(0.5);
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_kind_labels() {
        assert_eq!("Line Plot".parse::<PlotKind>(), Ok(PlotKind::Line));
        assert_eq!("Countplot".parse::<PlotKind>(), Ok(PlotKind::Countplot));
        assert!("Pie".parse::<PlotKind>().is_err());
        assert_eq!(PlotKind::Histogram.to_string(), "Histogram");
    }

    #[test]
    fn test_bin_count_flat_and_small() {
        assert_eq!(bin_count(&[]), 1);
        assert_eq!(bin_count(&[3.0]), 1);
        assert_eq!(bin_count(&[2.0, 2.0, 2.0]), 1);
        // Sturges for 8 values: log2(8) + 1 = 4
        assert!(bin_count(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]) >= 4);
    }

    #[test]
    fn test_bounds_padding() {
        let (lo, hi) = bounds([5.0].into_iter());
        assert_eq!((lo, hi), (4.5, 5.5));
    }
}
