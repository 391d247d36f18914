//! End-to-end resolution against mocked Kakao and Seoul Open API services

use std::sync::Arc;
use std::time::Duration;

use seoul_air_locator::{
    AirQualityMeasurement, Coordinate, DEFAULT_ADDRESS, DEFAULT_COORDINATE,
    FixedPositionProvider, LocationResolver, LocatorConfig, ReportedPositionProvider,
};
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEOCHO_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<RealtimeCityAir>
    <list_total_count>1</list_total_count>
    <RESULT><CODE>INFO-000</CODE><MESSAGE>정상 처리되었습니다</MESSAGE></RESULT>
    <row>
        <MSRDT>202410181500</MSRDT>
        <MSRRGN_NM>동남권</MSRRGN_NM>
        <MSRSTE_NM>서초구</MSRSTE_NM>
        <PM10>25</PM10>
        <PM25>11</PM25>
        <O3>0.028</O3>
        <IDEX_NM>좋음</IDEX_NM>
        <IDEX_MVL>38</IDEX_MVL>
    </row>
</RealtimeCityAir>"#;

fn kakao_body(region_2depth: &str) -> serde_json::Value {
    serde_json::json!({
        "meta": { "total_count": 1 },
        "documents": [{
            "region_type": "H",
            "address_name": format!("서울특별시 {region_2depth} 서초동"),
            "region_1depth_name": "서울특별시",
            "region_2depth_name": region_2depth,
            "region_3depth_name": "서초동"
        }]
    })
}

fn config_for(kakao: &MockServer, seoul: &MockServer) -> LocatorConfig {
    let mut config = LocatorConfig::default();
    config.geocoding.api_key = Some("kakao-test-key".to_string());
    config.geocoding.base_url = kakao.uri();
    config.air_quality.api_key = Some("seoul-test-key".to_string());
    config.air_quality.base_url = seoul.uri();
    config
}

fn seoul_path(region: &str, station: &str) -> String {
    format!(
        "/seoul-test-key/xml/RealtimeCityAir/1/5/{}/{}",
        urlencoding::encode(region),
        urlencoding::encode(station)
    )
}

#[tokio::test]
async fn test_full_resolution() {
    let kakao = MockServer::start().await;
    let seoul = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/coord2regioncode.json"))
        .and(query_param("x", "127.0327"))
        .and(query_param("y", "37.4837"))
        .and(header("Authorization", "KakaoAK kakao-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kakao_body("서초구")))
        .expect(1)
        .mount(&kakao)
        .await;
    Mock::given(method("GET"))
        .and(path(seoul_path("동남권", "서초구")))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEOCHO_XML))
        .expect(1)
        .mount(&seoul)
        .await;

    let position = Arc::new(FixedPositionProvider::new(Coordinate::new(37.4837, 127.0327)));
    let resolver = LocationResolver::from_config(&config_for(&kakao, &seoul), position).unwrap();
    let resolved = resolver.resolve().await;

    assert_eq!(resolved.address, "서울특별시 서초구");
    assert_eq!(resolved.classification.region_name(), "동남권");
    assert_eq!(resolved.classification.district_name(), "서초구");
    assert_eq!(resolved.measurement.pm10, 25.0);
    assert_eq!(resolved.measurement.grade, "좋음");
    assert_eq!(resolved.grade_color(), "#4CAF50");

    let json = serde_json::to_value(&resolved).unwrap();
    assert_eq!(json["region"], "동남권");
    assert_eq!(json["district"], "서초구");
    assert_eq!(json["measurement"]["station_name"], "서초구");
}

#[tokio::test]
async fn test_repeated_resolution_is_identical() {
    let kakao = MockServer::start().await;
    let seoul = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kakao_body("서초구")))
        .expect(2)
        .mount(&kakao)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEOCHO_XML))
        .expect(2)
        .mount(&seoul)
        .await;

    let position = Arc::new(FixedPositionProvider::new(Coordinate::new(37.4837, 127.0327)));
    let resolver = LocationResolver::from_config(&config_for(&kakao, &seoul), position).unwrap();

    let first = resolver.resolve().await;
    let second = resolver.resolve().await;
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[tokio::test]
async fn test_denied_permission_skips_geocoding() {
    let kakao = MockServer::start().await;
    let seoul = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kakao_body("서초구")))
        .expect(0)
        .mount(&kakao)
        .await;
    Mock::given(method("GET"))
        .and(path(seoul_path("동북권", "광진구")))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEOCHO_XML))
        .expect(1)
        .mount(&seoul)
        .await;

    let resolver = LocationResolver::from_config(
        &config_for(&kakao, &seoul),
        Arc::new(ReportedPositionProvider::denied()),
    )
    .unwrap();
    let resolved = resolver.resolve().await;

    assert_eq!(resolved.coordinate, DEFAULT_COORDINATE);
    assert_eq!(resolved.address, DEFAULT_ADDRESS);
    assert_eq!(resolved.classification.district_name(), "광진구");
    assert_eq!(resolved.classification.region_name(), "동북권");
}

#[tokio::test]
async fn test_slow_geocoder_and_failing_air_service_fall_back() {
    let kakao = MockServer::start().await;
    let seoul = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(kakao_body("서초구"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&kakao)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/seoul-test-key/xml/RealtimeCityAir/1/5/.+"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<RESULT><CODE>ERROR-500</CODE><MESSAGE>서버 오류입니다</MESSAGE></RESULT>",
        ))
        .mount(&seoul)
        .await;

    let mut config = config_for(&kakao, &seoul);
    config.geocoding.timeout_seconds = 1;

    let coordinate = Coordinate::new(37.4837, 127.0327);
    let resolver =
        LocationResolver::from_config(&config, Arc::new(FixedPositionProvider::new(coordinate)))
            .unwrap();
    let resolved = resolver.resolve().await;

    assert_eq!(resolved.coordinate, coordinate);
    assert_eq!(resolved.address, DEFAULT_ADDRESS);
    assert_eq!(resolved.classification.district_name(), "광진구");
    assert_eq!(resolved.measurement, AirQualityMeasurement::fallback());
}

#[tokio::test]
async fn test_missing_credentials_make_no_requests() {
    let kakao = MockServer::start().await;
    let seoul = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&kakao)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&seoul)
        .await;

    let mut config = config_for(&kakao, &seoul);
    config.geocoding.api_key = Some("YOUR_KAKAO_REST_API_KEY".to_string());
    config.air_quality.api_key = None;

    let resolver = LocationResolver::from_config(
        &config,
        Arc::new(FixedPositionProvider::new(Coordinate::new(37.4837, 127.0327))),
    )
    .unwrap();
    let resolved = resolver.resolve().await;

    assert_eq!(resolved.address, DEFAULT_ADDRESS);
    assert_eq!(resolved.measurement.pm10, 81.0);
    assert_eq!(resolved.measurement.pm25, 45.0);
}
