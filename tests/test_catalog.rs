mod common;

use common::*;
use s1_insar::config::{EndpointConfig, CMR_URL};
use s1_insar::testing::MockTransport;
use s1_insar::{CatalogClient, CatalogResult, InsarError};

#[test]
fn test_empty_result_set_is_not_found() {
    init_logging();
    let transport = MockTransport::new();
    transport.respond_json(CMR_URL, CMR_EMPTY);

    let client = CatalogClient::new(&transport, &EndpointConfig::default());
    let result = client.resolve_download_url(REFERENCE).expect("empty result is not an error");
    assert_eq!(result, CatalogResult::NotFound);
}

#[test]
fn test_single_entry_resolves_data_link() {
    let transport = MockTransport::new();
    serve_granule(&transport, REFERENCE);

    let client = CatalogClient::new(&transport, &EndpointConfig::default());
    let result = client.resolve_download_url(REFERENCE).unwrap();
    assert_eq!(result, CatalogResult::Found(granule_url(REFERENCE)));

    let request = &transport.requests_to(CMR_URL)[0];
    assert_eq!(request.param("readable_granule_name"), Some(REFERENCE));
    assert_eq!(request.param("provider"), Some("ASF"));
    let collections: Vec<_> = request
        .query
        .iter()
        .filter(|(k, _)| k == "collection_concept_id")
        .collect();
    assert_eq!(collections.len(), 2);
}

#[test]
fn test_transport_failure_is_fatal() {
    let transport = MockTransport::new();
    transport.fail(CMR_URL, 500);

    let client = CatalogClient::new(&transport, &EndpointConfig::default());
    let err = client.resolve_download_url(REFERENCE).unwrap_err();
    assert!(matches!(err, InsarError::Transport { status: 500, .. }));
    // no retry
    assert_eq!(transport.requests_to(CMR_URL).len(), 1);
}

#[test]
fn test_custom_endpoint_is_used() {
    let transport = MockTransport::new();
    transport.respond_json("https://cmr.uat.earthdata.nasa.gov/search/granules.json", CMR_EMPTY);

    let endpoints = EndpointConfig {
        cmr_url: "https://cmr.uat.earthdata.nasa.gov/search/granules.json".to_string(),
        ..EndpointConfig::default()
    };
    let client = CatalogClient::new(&transport, &endpoints);
    assert!(!client.resolve_download_url(REFERENCE).unwrap().is_found());
}
