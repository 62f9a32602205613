mod common;

use common::*;
use s1_insar::config::{CMR_URL, ORBIT_URL};
use s1_insar::io::{OrbitTier, TieBreak};
use s1_insar::testing::MockTransport;
use s1_insar::{DemChoice, GranuleAcquirer, InsarError, OrbitResolver, OrbitType, PipelineConfig, TopsAppRenderer};

fn config_in(dir: &std::path::Path) -> PipelineConfig {
    PipelineConfig {
        work_dir: dir.to_path_buf(),
        ..PipelineConfig::default()
    }
}

fn serve_pair(transport: &MockTransport) -> (String, String) {
    serve_granule(transport, REFERENCE);
    serve_granule(transport, SECONDARY);
    let reference_orbit = serve_precise_orbit(
        transport,
        "2020-01-01T00:00:00",
        "20200121T121010_V20191231T225942_20200102T005942",
        "2019-12-31T22:59:42",
        "2020-01-02T00:59:42",
    );
    let secondary_orbit = serve_precise_orbit(
        transport,
        "2020-01-13T00:00:00",
        "20200202T120711_V20200112T225942_20200114T005942",
        "2020-01-12T22:59:42",
        "2020-01-14T00:59:42",
    );
    (reference_orbit, secondary_orbit)
}

#[test]
fn test_pair_acquisition_and_rendering() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let (reference_orbit, secondary_orbit) = serve_pair(&transport);

    let config = config_in(dir.path());
    let acquirer = GranuleAcquirer::new(&transport, &config);

    let reference = acquirer.acquire_granule(REFERENCE).unwrap();
    let secondary = acquirer.acquire_granule(SECONDARY).unwrap();

    assert_eq!(reference.working_directory, dir.path().join(format!("{}.SAFE", REFERENCE)));
    assert_eq!(secondary.working_directory, dir.path().join(format!("{}.SAFE", SECONDARY)));
    assert!(reference.working_directory.is_dir());
    assert_eq!(reference.acquisition_date, "20200101");
    assert_eq!(secondary.acquisition_date, "20200113");

    assert_eq!(
        reference.orbit_file,
        dir.path().join(reference_orbit.rsplit('/').next().unwrap())
    );
    assert_eq!(
        secondary.orbit_file,
        dir.path().join(secondary_orbit.rsplit('/').next().unwrap())
    );
    assert!(reference.orbit_file.is_file());

    // archives are gone after staging
    assert!(!dir.path().join(format!("{}.zip", REFERENCE)).exists());
    assert!(!dir.path().join(format!("{}.zip", SECONDARY)).exists());

    let renderer = TopsAppRenderer::new(&config.processor, &config.work_dir);
    let path = renderer
        .render_configuration(&reference, &secondary, DemChoice::Auto)
        .unwrap();
    assert_eq!(path, dir.path().join("topsApp.xml"));

    let document = std::fs::read_to_string(&path).unwrap();
    for descriptor in [&reference, &secondary] {
        assert!(document.contains(&descriptor.working_directory.display().to_string()));
        assert!(document.contains(&descriptor.orbit_file.display().to_string()));
    }
}

#[test]
fn test_steps_run_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let (reference_orbit, _) = serve_pair(&transport);

    let config = config_in(dir.path());
    GranuleAcquirer::new(&transport, &config)
        .acquire_granule(REFERENCE)
        .unwrap();

    let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
    assert_eq!(
        urls,
        vec![
            CMR_URL.to_string(),
            granule_url(REFERENCE),
            ORBIT_URL.to_string(),
            reference_orbit,
        ]
    );
}

#[test]
fn test_unknown_granule_aborts_before_download() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    transport.respond_json(CMR_URL, CMR_EMPTY);

    let config = config_in(dir.path());
    let err = GranuleAcquirer::new(&transport, &config)
        .acquire_granule(REFERENCE)
        .unwrap_err();

    assert!(matches!(err, InsarError::GranuleNotFound(ref name) if name == REFERENCE));
    assert_eq!(transport.requests().len(), 1);
}

#[test]
fn test_malformed_name_makes_no_requests() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();

    let config = config_in(dir.path());
    let err = GranuleAcquirer::new(&transport, &config)
        .acquire_granule("S1A_IW_SLC")
        .unwrap_err();

    assert!(matches!(err, InsarError::MalformedGranule { .. }));
    assert!(transport.requests().is_empty());
}

#[test]
fn test_download_failure_leaves_no_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    transport.respond_when(
        CMR_URL,
        &[("readable_granule_name", REFERENCE)],
        cmr_json(&[&granule_url(REFERENCE)]),
    );
    transport.fail(&granule_url(REFERENCE), 401);

    let config = config_in(dir.path());
    let err = GranuleAcquirer::new(&transport, &config)
        .acquire_granule(REFERENCE)
        .unwrap_err();

    assert!(matches!(err, InsarError::Transport { status: 401, .. }));
    assert!(transport.requests_to(ORBIT_URL).is_empty());
}

#[test]
fn test_orbit_resolver_can_be_swapped() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    serve_pair(&transport);
    serve_orbit_tier(&transport, "AUX_RESORB", "2020-01-01T00:00:00", ORBIT_EMPTY.to_string());

    let config = config_in(dir.path());
    let restituted_only = OrbitResolver::new(&transport, &config.endpoints).with_tiers(vec![OrbitTier {
        orbit_type: OrbitType::RESORB,
        tie_break: TieBreak::MostRecentCreation,
    }]);
    let err = GranuleAcquirer::new(&transport, &config)
        .with_orbit_resolver(restituted_only)
        .acquire_granule(REFERENCE)
        .unwrap_err();

    // precise orbits are served but the chain never asks for them
    assert!(matches!(err, InsarError::OrbitNotFound(ref name) if name == REFERENCE));
    let orbit_requests = transport.requests_to(ORBIT_URL);
    assert_eq!(orbit_requests.len(), 1);
    assert_eq!(orbit_requests[0].param("product_type"), Some("AUX_RESORB"));
}
