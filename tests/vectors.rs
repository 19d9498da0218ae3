#![cfg(all(feature = "std", feature = "serde"))]

use std::path::{Path, PathBuf};

use tz_oracle::{
    iso::LocalDateTime, runner::NullReporter, CaseRunner, ConversionResult, Direction, Oracle,
    RuleTable, RunOutcome, TimeZone, ZoneCases,
};

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

fn load_table(name: &str) -> RuleTable {
    let load = RuleTable::from_filepath(data_dir().join(name)).unwrap();
    assert!(load.rejected.is_empty(), "{:?}", load.rejected);
    load.table
}

fn load_cases() -> Vec<ZoneCases> {
    ["asia-aden.json", "america-new_york.json"]
        .iter()
        .map(|name| ZoneCases::from_filepath(data_dir().join("vectors").join(name)).unwrap())
        .collect()
}

#[test]
fn zoneinfo_and_json_tables_agree() {
    let zoneinfo = load_table("regimes.zi");
    let json = load_table("regimes.json");
    assert_eq!(zoneinfo.len(), json.len());
    for zone in zoneinfo.zones() {
        let id = zone.identifier();
        assert_eq!(json.zone(id).unwrap().regimes(), zone.regimes(), "{id}");
    }
}

#[test]
fn vector_files_pass() {
    let cases = load_cases();
    assert_eq!(cases[0].vectors.len(), 8);
    for table in [load_table("regimes.zi"), load_table("regimes.json")] {
        let outcome = CaseRunner::new(&table, NullReporter).run(&cases);
        assert_eq!(outcome, RunOutcome::AllPassed { total: 22 });
    }
}

#[test]
fn one_wrong_utc_field_fails_one_vector() {
    let table = load_table("regimes.zi");
    let mut cases = load_cases();
    let vector = &mut cases[0].vectors[5];
    vector.utc = LocalDateTime::try_new(1949, 12, 31, 23, 0, 0).unwrap();

    let outcome = CaseRunner::new(&table, NullReporter).run(&cases);
    assert_eq!(outcome.total(), 22);
    assert_eq!(outcome.passed(), 21);
    let failure = &outcome.failures()[0];
    assert_eq!(failure.zone, "Asia/Aden");
    assert_eq!(failure.index, 5);
    assert_eq!(failure.direction(), Some(Direction::UtcToLocal));
}

#[test]
fn aden_lmt_boundary_is_stable() {
    let table = load_table("regimes.zi");
    let aden = TimeZone::try_from_table(&table, "Asia/Yemen").unwrap();
    assert_eq!(aden.identifier(), "Asia/Aden");
    for hour in 17..=23 {
        let utc = LocalDateTime::try_new(1949, 12, 31, hour, 0, 0)
            .unwrap()
            .to_instant_utc();
        let local = aden.to_local(utc).unwrap();
        assert_eq!(aden.to_utc(&local).unwrap(), ConversionResult::Unique(utc));
        assert_eq!(
            local.to_wall_milliseconds() - utc.as_epoch_milliseconds(),
            3 * 3_600_000
        );
    }
}

#[test]
fn apia_skips_a_day() {
    let table = load_table("regimes.json");
    let oracle = Oracle::new(&table);
    let apia = TimeZone::try_from_table(&table, "Pacific/Apia").unwrap();

    let skipped = LocalDateTime::try_new(2011, 12, 30, 12, 0, 0).unwrap();
    let ConversionResult::Gap { earlier, later } = apia.to_utc(&skipped).unwrap() else {
        panic!("expected a gap");
    };
    assert_eq!(
        later.as_epoch_milliseconds() - earlier.as_epoch_milliseconds(),
        24 * 3_600_000
    );

    let before = LocalDateTime::try_new(2011, 12, 29, 23, 0, 0).unwrap();
    let after = LocalDateTime::try_new(2011, 12, 31, 0, 0, 0).unwrap();
    let instant = |local: &LocalDateTime| apia.to_utc(local).unwrap().unique().unwrap();
    assert_eq!(
        instant(&after).as_epoch_milliseconds() - instant(&before).as_epoch_milliseconds(),
        3_600_000
    );
    assert!(oracle
        .verify("Pacific/Apia", &after, instant(&after))
        .unwrap()
        .is_consistent());
}
