mod common;

use common::{season, text};
use player_sheets::graph::{
    GraphOptions, MAX_BINS, PlotData, PlotSpec, bin_count, create_graph, histogram_bins, prepare,
    value_counts,
};
use player_sheets::{CellValue, PlotError, Table};

#[test]
fn test_countplot_counts_in_first_seen_order() {
    let table = season(0.0);
    let data = prepare(&table, &PlotSpec::Count { column: "Team".into() }).unwrap();

    match data {
        PlotData::Counts { counts, .. } => assert_eq!(
            counts,
            vec![("Red".to_string(), 2), ("Blue".to_string(), 2), ("Green".to_string(), 1)]
        ),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_value_counts_skip_empty() {
    let values = [text("a"), CellValue::Empty, text("b"), text("a")];
    assert_eq!(
        value_counts(values.iter()),
        vec![("a".to_string(), 2), ("b".to_string(), 1)]
    );
}

#[test]
fn test_wrong_column_kinds() {
    let table = season(0.0);

    assert_eq!(
        prepare(&table, &PlotSpec::Count { column: "Matches Won".into() }),
        Err(PlotError::NotCategorical("Matches Won".into()))
    );
    assert!(matches!(
        prepare(&table, &PlotSpec::Line { x: "Team".into(), y: "Matches Won".into() }),
        Err(PlotError::NotNumeric(_))
    ));
    assert!(matches!(
        prepare(&table, &PlotSpec::Histogram { column: "Player Name".into() }),
        Err(PlotError::NotNumeric(_))
    ));
    assert_eq!(
        prepare(&table, &PlotSpec::Histogram { column: "Goals".into() }),
        Err(PlotError::UnknownColumn("Goals".into()))
    );
    assert_eq!(
        PlotError::NotCategorical("x".into()).to_string(),
        "Selected column is not categorical. Please choose a categorical column for plotting."
    );
}

#[test]
fn test_line_points_follow_rows() {
    let table = season(0.0);
    let spec = PlotSpec::Line {
        x: "Matches Played".into(),
        y: "Matches Won".into(),
    };
    match prepare(&table, &spec).unwrap() {
        PlotData::Points { points, .. } => {
            assert_eq!(points.len(), 5);
            assert_eq!(points[0], (10.0, 8.0));
            assert_eq!(points[4], (11.0, 2.0));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_histogram_bins_cover_every_value() {
    let values: Vec<f64> = (0..50).map(|i| (i * 7 % 23) as f64).collect();
    let bins = histogram_bins(&values);

    assert!(bins.len() > 1);
    assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
    assert_eq!(bins[0].start, 0.0);
    assert_eq!(bins[bins.len() - 1].end, 22.0);
    for pair in bins.windows(2) {
        assert!((pair[0].end - pair[1].start).abs() < 1e-9);
    }
}

#[test]
fn test_empty_numeric_column_has_no_data() {
    let table = Table::from_rows(vec!["Score".into()], vec![vec![CellValue::Empty]]);
    assert_eq!(
        prepare(&table, &PlotSpec::Histogram { column: "Score".into() }),
        Err(PlotError::NoData)
    );
}

#[test]
fn test_rendered_charts_are_png() {
    let table = season(0.0);
    let options = GraphOptions {
        width: 320,
        height: 240,
    };
    let specs = [
        PlotSpec::Count { column: "Team".into() },
        PlotSpec::Line {
            x: "Matches Played".into(),
            y: "Matches Won".into(),
        },
        PlotSpec::Histogram {
            column: "Matches Played".into(),
        },
    ];

    for spec in &specs {
        match create_graph(&table, spec, &options) {
            Ok(png) => assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n", "{:?}", spec.kind()),
            // Headless machines may lack the fonts used for titles
            Err(PlotError::Render(e)) => println!("skipping {}: {}", spec.kind(), e),
            Err(e) => panic!("{:?} rejected: {}", spec.kind(), e),
        }
    }
    println!("✓ All three chart kinds handled");
}

#[test]
fn test_far_outlier_keeps_bin_count_bounded() {
    let mut values: Vec<f64> = (1..=10).map(f64::from).collect();
    values.push(1e12);

    let count = bin_count(&values);
    assert!(count <= MAX_BINS, "bin count {} exceeds cap", count);
    assert!(count <= values.len() * 10);

    let bins = histogram_bins(&values);
    assert_eq!(bins.len(), count);
    assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
    assert_eq!(bins[bins.len() - 1].end, 1e12);
    println!("✓ Outlier column binned into {} bins", count);
}

#[test]
fn test_histogram_of_outlier_column_renders_or_reports() {
    let mut rows: Vec<Vec<CellValue>> = (1..=10).map(|i| vec![CellValue::Number(i as f64)]).collect();
    rows.push(vec![CellValue::Number(1e12)]);
    let table = Table::from_rows(vec!["Matches Won".into()], rows);
    let spec = PlotSpec::Histogram {
        column: "Matches Won".into(),
    };

    match prepare(&table, &spec).unwrap() {
        PlotData::Bins { bins, .. } => assert!(bins.len() <= MAX_BINS),
        other => panic!("unexpected {:?}", other),
    }
    let options = GraphOptions {
        width: 320,
        height: 240,
    };
    match create_graph(&table, &spec, &options) {
        Ok(png) => assert!(png.starts_with(b"\x89PNG")),
        Err(e) => assert!(matches!(e, PlotError::Render(_)), "{}", e),
    }
}
