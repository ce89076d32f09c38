//! Cube CSV export read back with the csv crate.

use pricer_core::types::Date;
use pricer_exposure::cube::NpvCube;
use pricer_exposure::output::{CubeWriter, CUBE_HEADER};
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;

fn ymd(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

#[test]
fn test_cube_round_trip() {
    let dates = vec![ymd(2024, 7, 1), ymd(2025, 1, 1)];
    let ids = vec!["T1".to_string(), "T2".to_string()];
    let mut cube = NpvCube::new(ymd(2024, 1, 1), ids, dates.clone(), 2, 1).unwrap();
    let mut expected = BTreeSet::new();
    for id in 0..2 {
        let t0 = 10.0 * id as f64 + 0.5;
        cube.set_t0(t0, id, 0).unwrap();
        expected.insert((format!("T{}", id + 1), 0usize, 0usize, 0usize, format!("{:.4}", t0)));
        for date in 0..2 {
            for sample in 0..2 {
                let value = 1000.0 * id as f64 + 100.0 * date as f64 + sample as f64 + 0.25;
                cube.set(value, id, date, sample, 0).unwrap();
                expected.insert(
                    (format!("T{}", id + 1), date + 1, sample + 1, 0, format!("{:.4}", value)),
                );
            }
        }
    }
    let map = BTreeMap::from([
        ("T1".to_string(), "NS_1".to_string()),
        ("T2".to_string(), "NS_2".to_string()),
    ]);

    let path = env::temp_dir().join("pricer_exposure_cube_round_trip.csv");
    let rows = CubeWriter::new(&path).write(&cube, &map, false).unwrap();
    assert_eq!(rows, 2 + 2 * 2 * 2);

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(header, CUBE_HEADER);

    let mut parsed: BTreeSet<(String, usize, usize, usize, String)> = BTreeSet::new();
    for record in reader.records() {
        let record = record.unwrap();
        let date_index: usize = record[2].parse().unwrap();
        let date = if date_index == 0 {
            ymd(2024, 1, 1)
        } else {
            dates[date_index - 1]
        };
        assert_eq!(record[3], date.to_string());
        assert_eq!(map[&record[0]], record[1]);
        parsed.insert((
            record[0].to_string(),
            date_index,
            record[4].parse().unwrap(),
            record[5].parse().unwrap(),
            record[6].to_string(),
        ));
    }
    assert_eq!(parsed, expected);
    fs::remove_file(path).ok();
}
