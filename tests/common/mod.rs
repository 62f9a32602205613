//! Shared fixtures for integration tests.

#![allow(dead_code)]

use s1_insar::config::{CMR_URL, ORBIT_URL};
use s1_insar::testing::MockTransport;
use std::io::{Cursor, Write};
use zip::write::FileOptions;

pub const REFERENCE: &str = "S1A_IW_SLC__1SDV_20200101T000000_20200101T000020_030639_0382D5_DADE";
pub const SECONDARY: &str = "S1A_IW_SLC__1SDV_20200113T000000_20200113T000020_030814_0388F1_2E3A";

pub fn granule_url(name: &str) -> String {
    format!("https://datapool.asf.alaska.edu/SLC/SA/{}.zip", name)
}

/// Minimal SAFE layout zipped in memory
pub fn safe_zip(name: &str) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let entries = [
        (format!("{}.SAFE/manifest.safe", name), b"<manifest/>".to_vec()),
        (
            format!("{}.SAFE/annotation/s1a-iw1-slc-vv.xml", name),
            b"<product/>".to_vec(),
        ),
        (
            format!("{}.SAFE/measurement/s1a-iw1-slc-vv.tiff", name),
            vec![0u8; 256],
        ),
    ];
    for (path, data) in entries {
        zip.start_file(path, FileOptions::default()).unwrap();
        zip.write_all(&data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn cmr_json(hrefs: &[&str]) -> String {
    let links: Vec<String> = hrefs
        .iter()
        .map(|h| format!(r#"{{"rel": "http://esipfed.org/ns/fedsearch/1.1/data#", "href": "{}"}}"#, h))
        .collect();
    format!(r#"{{"feed": {{"entry": [{{"links": [{}]}}]}}}}"#, links.join(", "))
}

pub const CMR_EMPTY: &str = r#"{"feed": {"entry": []}}"#;

pub struct OrbitFixture<'a> {
    pub url: &'a str,
    pub created: &'a str,
    pub start: &'a str,
    pub stop: &'a str,
}

pub fn orbit_json(records: &[OrbitFixture<'_>]) -> String {
    let results: Vec<String> = records
        .iter()
        .map(|r| {
            let name = r.url.rsplit('/').next().unwrap();
            format!(
                r#"{{"product_name": "{}", "remote_url": "{}", "creation_date": "{}", "validity_start": "{}", "validity_stop": "{}"}}"#,
                name, r.url, r.created, r.start, r.stop
            )
        })
        .collect();
    format!(r#"{{"count": {}, "results": [{}]}}"#, records.len(), results.join(", "))
}

pub const ORBIT_EMPTY: &str = r#"{"count": 0, "results": []}"#;

pub fn precise_orbit_url(tag: &str) -> String {
    format!("https://s1qc.asf.alaska.edu/aux_poeorb/S1A_OPER_AUX_POEORB_OPOD_{}.EOF", tag)
}

pub fn restituted_orbit_url(tag: &str) -> String {
    format!("https://s1qc.asf.alaska.edu/aux_resorb/S1A_OPER_AUX_RESORB_OPOD_{}.EOF", tag)
}

/// Route the catalog lookup and archive download for `name`
pub fn serve_granule(transport: &MockTransport, name: &str) {
    let url = granule_url(name);
    transport.respond_when(CMR_URL, &[("readable_granule_name", name)], cmr_json(&[&url]));
    transport.respond(&url, safe_zip(name));
}

/// Route an orbit tier answer for an acquisition timestamp
pub fn serve_orbit_tier(transport: &MockTransport, product_type: &str, timestamp: &str, body: String) {
    transport.respond_when(
        ORBIT_URL,
        &[("product_type", product_type), ("validity_start__lt", timestamp)],
        body,
    );
}

/// Serve one precise orbit covering `timestamp` and its file contents
pub fn serve_precise_orbit(transport: &MockTransport, timestamp: &str, tag: &str, start: &str, stop: &str) -> String {
    let url = precise_orbit_url(tag);
    serve_orbit_tier(
        transport,
        "AUX_POEORB",
        timestamp,
        orbit_json(&[OrbitFixture {
            url: &url,
            created: "2020-01-21T12:00:00",
            start,
            stop,
        }]),
    );
    transport.respond(&url, format!("<Earth_Explorer_File>{}</Earth_Explorer_File>", tag));
    url
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
