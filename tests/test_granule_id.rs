use s1_insar::{GranuleId, InsarError};

const GRANULES: [&str; 4] = [
    "S1A_IW_SLC__1SDV_20200101T000000_20200101T000020_030639_0382D5_DADE",
    "S1B_IW_SLC__1SDV_20191120T235959_20191121T000027_019011_023E0F_A1B2",
    "S1A_IW_SLC__1SSH_20230704T081522_20230704T081549_049258_05EC5D_55A6",
    "S1A_EW_SLC__1SDH_20160229T120000_20160229T120100_010000_00EE00_ABCD",
];

#[test]
fn test_platform_and_timestamp_from_fixed_offsets() {
    for name in GRANULES {
        let id = GranuleId::parse(name).unwrap();

        assert_eq!(id.platform().len(), 3);
        assert_eq!(id.platform(), &name[0..3]);

        let expected = format!(
            "{}-{}-{}T{}:{}:{}",
            &name[17..21],
            &name[21..23],
            &name[23..25],
            &name[26..28],
            &name[28..30],
            &name[30..32]
        );
        assert_eq!(id.acquisition_timestamp(), expected);
        assert_eq!(id.acquisition_timestamp().len(), "YYYY-MM-DDTHH:MM:SS".len());
        assert_eq!(
            id.acquisition_time().format("%Y-%m-%dT%H:%M:%S").to_string(),
            expected
        );
    }
}

#[test]
fn test_acquisition_date_and_safe_name() {
    let id: GranuleId = GRANULES[1].parse().unwrap();
    assert_eq!(id.acquisition_date(), "20191120");
    assert_eq!(id.platform(), "S1B");
    assert_eq!(id.safe_dir_name(), format!("{}.SAFE", GRANULES[1]));
    assert_eq!(id.to_string(), GRANULES[1]);
}

#[test]
fn test_surrounding_whitespace_is_ignored() {
    let padded = format!("  {}\n", GRANULES[0]);
    assert_eq!(GranuleId::parse(&padded).unwrap().name(), GRANULES[0]);
}

#[test]
fn test_malformed_names_are_typed_errors() {
    let cases = [
        "",
        "S1A",
        "S1A_IW_SLC__1SDV_20200101",
        // missing 'T' separator
        "S1A_IW_SLC__1SDV_20200101X000000_20200101T000020_030639_0382D5_DADE",
        // letters inside the time field
        "S1A_IW_SLC__1SDV_20200101T00AA00_20200101T000020_030639_0382D5_DADE",
        // 25:00:00 is not a time of day
        "S1A_IW_SLC__1SDV_20200101T250000_20200101T000020_030639_0382D5_DADE",
        // non-ASCII
        "S1A_IW_SLC__1SDV_20200101T000000_20200101T000020_030639_0382D5_DAD\u{e9}",
    ];

    for case in cases {
        match GranuleId::parse(case) {
            Err(InsarError::MalformedGranule { name, .. }) => assert_eq!(name, case.trim()),
            other => panic!("expected MalformedGranule for {:?}, got {:?}", case, other),
        }
    }
}
