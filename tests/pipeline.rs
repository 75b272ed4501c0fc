use std::io::Write;
use std::path::Path;
use stormtrack::{
    prepare, run, Aggregator, CategoryFilter, ChangeKind, Config, StormError, StormLoader,
};

const HEADER: &str = "NAME,YEAR,MONTH,DAY,LAT,LONG,WIND_KTS,PRESSURE,CAT\n";

/// Three years of tracks with repeated storms, sentinels and a bad date.
fn fixture() -> String {
    let mut csv = String::from(HEADER);
    let rows = [
        "ABLE,1950,8,12,25.0,-70.0,60,0,TS",
        "ABLE,1950,8,13,26.0,-71.0,80,980,H1",
        "BAKER,1950,9,1,20.0,-60.0,45,1000,TS",
        "NOTNAMED,1950,9,3,18.0,-55.0,30,0,TD",
        "ABLE,1951,8,20,24.0,-75.0,90,970,H2",
        "BAKER,1951,8,21,27.0,-77.0,100,960,H3",
        "CHARLIE,1951,10,2,15.0,-80.0,35,0,TD",
        "SUBTROP1,1951,10,4,30.0,-50.0,40,0,TS",
        "DOG,1951,2,30,22.0,-65.0,50,995,TS",
        "ABLE,1952,9,10,28.0,-79.0,120,940,H4",
    ];
    for row in rows {
        csv.push_str(row);
        csv.push('\n');
    }
    csv
}

fn write_fixture(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("storms.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(fixture().as_bytes()).unwrap();
    path
}

#[test]
fn test_prepare_derives_every_row() {
    let dir = tempfile::tempdir().unwrap();
    let table = prepare(&write_fixture(dir.path())).unwrap();
    assert_eq!(table.len(), 10);

    let invalid: Vec<&str> = table.invalid_dates().map(|r| r.name()).collect();
    assert_eq!(invalid, vec!["DOG"]);

    let able = &table.rows()[1];
    assert!((able.wind_speed_mph - 92.0).abs() < 1e-9);
}

#[test]
fn test_named_storm_counts_and_changes() {
    let dir = tempfile::tempdir().unwrap();
    let table = prepare(&write_fixture(dir.path())).unwrap();

    let counts = Aggregator::distinct_storm_count_by_year(&table, true).unwrap();
    assert_eq!(counts.get(&1950), Some(&2));
    assert_eq!(counts.get(&1951), Some(&4));
    assert_eq!(counts.get(&1952), Some(&1));

    let series = Aggregator::to_series(&counts);
    let absolute = Aggregator::year_over_year_change(&series, ChangeKind::Absolute).unwrap();
    assert_eq!(absolute, vec![(1951, 2.0), (1952, -3.0)]);
    let percent = Aggregator::year_over_year_change(&series, ChangeKind::Percent).unwrap();
    assert_eq!(percent, vec![(1951, 1.0), (1952, -0.75)]);
}

#[test]
fn test_hurricane_aggregations() {
    let dir = tempfile::tempdir().unwrap();
    let table = prepare(&write_fixture(dir.path())).unwrap();

    let by_cat =
        Aggregator::distinct_storm_count_by_year_and_category(&table, &CategoryFilter::Hurricane)
            .unwrap();
    assert_eq!(by_cat.len(), 4);
    assert_eq!(by_cat[&(1951, "H3".to_string())], 1);

    let months = Aggregator::count_by_month(&table, &CategoryFilter::Hurricane).unwrap();
    // ABLE and BAKER in August, ABLE again in September
    assert_eq!(months[&8], 2);
    assert_eq!(months[&9], 1);

    let means = Aggregator::mean_by_category_year_month_day_location(&table, true).unwrap();
    assert!(means.iter().all(|m| m.mean_pressure > 0.0));
    assert_eq!(means.len(), 6);
}

#[test]
fn test_missing_input_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = prepare(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, StormError::DataUnavailable { .. }));
}

#[test]
fn test_header_only_file_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    std::fs::write(&path, HEADER).unwrap();
    assert!(StormLoader::load(&path).is_err());
}

#[test]
fn test_run_writes_summary_without_charts() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path());

    let mut config = Config::default();
    config.charts.enabled = false;
    config.output.dir = dir.path().join("report");

    let report = run(&input, &config).unwrap();
    assert_eq!(report.rows, 10);
    assert!(report.charts.is_empty());
    assert_eq!(report.summary_path, dir.path().join("report").join("summary.json"));

    let text = std::fs::read_to_string(&report.summary_path).unwrap();
    let summary: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(summary["invalid_dates"], 1);
    assert_eq!(summary["storms_per_year"]["1951"], 4);
    // the 1951-2008 window leaves 1951 and 1952
    assert_eq!(summary["mean_wind_mph_by_year"].as_object().unwrap().len(), 2);
}

/// Ten seasons with a varying number of storms, each a tropical storm that
/// strengthens into a hurricane.
fn seasons_fixture() -> String {
    let mut csv = String::from(HEADER);
    for (k, year) in (1960..1970).enumerate() {
        for s in 0..(2 + k % 3) {
            let name = format!("STORM{}{}", k, s);
            let month = 8 + s % 3;
            let lat = 20.0 + k as f64 + s as f64;
            let long = -60.0 - 2.0 * k as f64 - s as f64;
            let wind = 50 + 10 * s + k;
            csv.push_str(&format!(
                "{name},{year},{month},{},{lat},{long},{wind},0,TS\n",
                10 + s
            ));
            csv.push_str(&format!(
                "{name},{year},{month},{},{},{},{},{},H{}\n",
                11 + s,
                lat + 1.5,
                long - 1.5,
                wind + 30,
                990 - 5 * s - k,
                1 + s % 3
            ));
        }
    }
    csv
}

#[test]
fn test_run_renders_every_chart() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("seasons.csv");
    std::fs::write(&input, seasons_fixture()).unwrap();

    let mut config = Config::default();
    config.analysis.from_year = 1960;
    config.analysis.to_year = 1969;
    config.output.dir = dir.path().join("report");

    let report = run(&input, &config).unwrap();
    assert_eq!(report.skipped_charts, 0);
    assert_eq!(report.charts.len(), stormtrack::charts::SECTION_COUNT);

    let mut names: Vec<String> = report
        .charts
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    for (i, name) in names.iter().enumerate() {
        assert!(name.starts_with(&format!("{:02}_", i + 1)), "{name}");
        assert!(name.ends_with(".png"), "{name}");
    }
    for path in &report.charts {
        assert_eq!(path.parent(), Some(config.output.dir.as_path()));
        let size = std::fs::metadata(path).unwrap().len();
        assert!(size > 0, "{} is empty", path.display());
    }
    assert!(report.summary_path.is_file());
}
