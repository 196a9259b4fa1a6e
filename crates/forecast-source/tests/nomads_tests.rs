//! NOMADS client tests against a local OPeNDAP stand-in.

use std::net::SocketAddr;

use axum::extract::RawQuery;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use chrono::{NaiveDate, TimeZone, Utc};

use forecast_common::{
    BoundingBox, DatasetProvider, ForecastCycle, ForecastDataset, ForecastUnavailable, RunHour,
    ViewerError,
};
use forecast_source::{NomadsConfig, NomadsProvider};
use test_utils::opendap;

async fn ascii(RawQuery(query): RawQuery) -> (StatusCode, &'static str) {
    match query.as_deref() {
        Some("time,lat,lon") => (StatusCode::OK, opendap::AXES_ASCII),
        Some(q) if q.starts_with("tmp2m") => (StatusCode::OK, opendap::TMP2M_ASCII),
        _ => (StatusCode::NOT_FOUND, "not found"),
    }
}

async fn spawn_server() -> SocketAddr {
    let app = Router::new()
        .route("/dods/gfs20250713/gfs_0p25_00z.dds", get(|| async { opendap::DDS }))
        .route("/dods/gfs20250713/gfs_0p25_00z.ascii", get(ascii))
        .route(
            "/dods/gfs20990101/gfs_0p25_00z.dds",
            get(|| async { opendap::ERROR_BODY }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn provider(addr: SocketAddr) -> NomadsProvider {
    NomadsProvider::new(NomadsConfig {
        base_url: format!("http://{}/dods", addr),
        request_timeout_secs: 5,
        ..Default::default()
    })
    .unwrap()
}

fn cycle(y: i32, m: u32, d: u32) -> ForecastCycle {
    ForecastCycle::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), RunHour::Z00)
}

#[tokio::test]
async fn test_open_reads_metadata() {
    let addr = spawn_server().await;
    let dataset = provider(addr).open(cycle(2025, 7, 13)).await.unwrap();

    assert_eq!(dataset.variables(), vec!["tmp2m", "pratesfc"]);
    assert!(dataset.has_variable("pratesfc"));
    assert!(!dataset.has_variable("ugrd10m"));

    let axes = dataset.axes();
    assert_eq!(axes.time_len(), 3);
    assert_eq!(axes.times[0], Utc.with_ymd_and_hms(2025, 7, 13, 0, 0, 0).unwrap());
}

#[tokio::test]
async fn test_read_hyperslab_maps_fill_to_nan() {
    let addr = spawn_server().await;
    let dataset = provider(addr).open(cycle(2025, 7, 13)).await.unwrap();

    let window = dataset
        .axes()
        .select(&BoundingBox::new(114.25, -2.75, 114.5, -2.25))
        .unwrap();
    assert_eq!(window.lat, 1..4);
    assert_eq!(window.lon, 1..3);

    let slice = dataset.read("tmp2m", 0, &window).await.unwrap();
    assert_eq!(slice.lats, vec![-2.75, -2.5, -2.25]);
    assert_eq!(slice.lons, vec![114.25, 114.5]);
    assert_eq!(slice.values[0], 300.5);
    assert!(slice.values[2].is_nan());
    assert_eq!(slice.values[5], 303.5);
}

#[tokio::test]
async fn test_missing_variable_and_lead() {
    let addr = spawn_server().await;
    let dataset = provider(addr).open(cycle(2025, 7, 13)).await.unwrap();
    let window = dataset.axes().select(&BoundingBox::new(114.0, -3.0, 114.75, -2.0)).unwrap();

    match dataset.read("ugrd10m", 0, &window).await {
        Err(ViewerError::DataFieldMissing(name)) => assert_eq!(name, "ugrd10m"),
        other => panic!("unexpected: {:?}", other.map(|s| s.values.len())),
    }

    match dataset.read("tmp2m", 3, &window).await {
        Err(ViewerError::ForecastUnavailable(ForecastUnavailable::LeadHourOutOfRange {
            requested,
            available,
        })) => {
            assert_eq!(requested, 3);
            assert_eq!(available, 3);
        }
        other => panic!("unexpected: {:?}", other.map(|s| s.values.len())),
    }
}

#[tokio::test]
async fn test_unavailable_cycles() {
    let addr = spawn_server().await;
    let provider = provider(addr);

    // GrADS error document
    let err = provider.open(cycle(2099, 1, 1)).await.err().unwrap();
    assert_eq!(err.kind(), "SourceUnavailable");
    assert!(err.to_string().contains("Invalid dataset"), "{}", err);

    // 404
    let err = provider.open(cycle(2020, 1, 1)).await.err().unwrap();
    assert_eq!(err.kind(), "SourceUnavailable");
    assert!(err.to_string().contains("404"), "{}", err);
}
