use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use profile_explorer::config::Config;
use profile_explorer::directory::{seed_profiles, DirectoryService, InMemoryProfileStore};
use profile_explorer::domain::Coordinate;
use profile_explorer::geocoding::FixedGeocoder;
use profile_explorer::maps::{CapabilityHandle, StaticMapsCapability};
use profile_explorer::server::{app_router, AppState};

fn test_config() -> Config {
    let mut config = Config::default();
    config.maps.poll_interval_ms = 2;
    config.maps.max_attempts = 5;
    config
}

fn state_with(capability: CapabilityHandle) -> AppState {
    let store = InMemoryProfileStore::with_profiles(seed_profiles());
    let geocoder = FixedGeocoder::with_seed_addresses()
        .with("Pike Place Market, Seattle", Coordinate::new(47.6097, -122.3422));
    let directory = DirectoryService::new(Arc::new(store), Arc::new(geocoder));
    AppState::new(test_config(), directory, capability)
}

fn ready_state() -> AppState {
    let capability = StaticMapsCapability::new("test-key").expect("default url parses");
    state_with(CapabilityHandle::ready(Arc::new(capability)))
}

async fn send(app: &Router, request: Request<Body>) -> Result<(StatusCode, String)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, String::from_utf8(body.to_vec())?))
}

async fn get(app: &Router, uri: &str) -> Result<(StatusCode, String)> {
    send(app, Request::get(uri).body(Body::empty())?).await
}

async fn json_request(app: &Router, method: &str, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))?;
    let (status, text) = send(app, request).await?;
    let value = if text.is_empty() { Value::Null } else { serde_json::from_str(&text)? };
    Ok((status, value))
}

#[tokio::test]
async fn lists_and_filters_profiles() -> Result<()> {
    let app = app_router(ready_state());

    let (status, body) = get(&app, "/api/profiles").await?;
    assert_eq!(status, StatusCode::OK);
    let all: Vec<Value> = serde_json::from_str(&body)?;
    assert_eq!(all.len(), 3);

    let (_, body) = get(&app, "/api/profiles?search=SEATTLE").await?;
    let seattle: Vec<Value> = serde_json::from_str(&body)?;
    assert_eq!(seattle.len(), 1);
    assert_eq!(seattle[0]["name"], "Mike Johnson");

    let (_, body) = get(&app, "/api/profiles?interest=").await?;
    let unfiltered: Vec<Value> = serde_json::from_str(&body)?;
    assert_eq!(unfiltered.len(), 3);

    let (_, body) = get(&app, "/api/interests").await?;
    let interests: Vec<String> = serde_json::from_str(&body)?;
    assert_eq!(interests.len(), 9);
    Ok(())
}

#[tokio::test]
async fn create_update_delete_round() -> Result<()> {
    let app = app_router(ready_state());

    let (status, created) = json_request(
        &app,
        "POST",
        "/api/profiles",
        json!({
            "name": "Ada Lovelace",
            "description": "Analytical engines",
            "address": "Pike Place Market, Seattle",
            "email": "ada@example.com",
            "phone": "+44 20 0000",
            "interests": ["Math", "Math", " Poetry "]
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap_or_default().to_string();
    assert!(!["", "1", "2", "3"].contains(&id.as_str()));
    assert_eq!(created["interests"], json!(["Math", "Poetry"]));

    let (status, updated) =
        json_request(&app, "PUT", &format!("/api/profiles/{}", id), json!({ "phone": "+44 20 1111" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Ada Lovelace");
    assert_eq!(updated["phone"], "+44 20 1111");
    assert_eq!(updated["joined_at"], created["joined_at"]);

    let (status, _) = json_request(&app, "DELETE", &format!("/api/profiles/{}", id), Value::Null).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&app, &format!("/api/profiles/{}", id)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = get(&app, "/api/profiles").await?;
    let remaining: Vec<Value> = serde_json::from_str(&body)?;
    assert_eq!(remaining.len(), 3);
    Ok(())
}

#[tokio::test]
async fn invalid_profile_is_rejected_with_field_messages() -> Result<()> {
    let app = app_router(ready_state());
    let (status, body) = json_request(
        &app,
        "POST",
        "/api/profiles",
        json!({ "name": "No Contact", "email": "not-an-email" }),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["email"], "Email is invalid");
    assert_eq!(body["fields"]["phone"], "Phone is required");
    assert!(body["fields"].get("name").is_none());
    Ok(())
}

#[tokio::test]
async fn geocode_endpoint_reports_hits_and_misses() -> Result<()> {
    let app = app_router(ready_state());

    let (_, body) = get(&app, "/api/geocode?address=1%20Hacker%20Way%2C%20Menlo%20Park%2C%20CA%2094025").await?;
    let hit: Value = serde_json::from_str(&body)?;
    assert_eq!(hit["coordinate"]["lat"], 37.4845938);

    let (_, body) = get(&app, "/api/geocode?address=Nowhere").await?;
    let miss: Value = serde_json::from_str(&body)?;
    assert!(miss["coordinate"].is_null());
    Ok(())
}

#[tokio::test]
async fn map_session_lifecycle() -> Result<()> {
    let state = ready_state();
    let app = app_router(state.clone());

    let (status, report) = json_request(&app, "POST", "/api/profiles/3/map", Value::Null).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["state"], "ready");
    assert_eq!(report["map"]["zoom"], 15);
    assert_eq!(report["map"]["markers"][0]["label"], "1");
    assert_eq!(report["map"]["markers"][0]["title"], "Profile Location");
    assert!(report["map"]["image_url"].as_str().unwrap_or_default().contains("staticmap"));

    let session = report["session"].as_str().unwrap_or_default().to_string();
    let (status, report) = json_request(
        &app,
        "PUT",
        &format!("/api/maps/{}/markers", session),
        json!({ "markers": [{ "lat": 47.6, "lng": -122.3 }, { "lat": 47.7, "lng": -122.4 }] }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["map"]["markers"].as_array().map(Vec::len), Some(2));
    assert_eq!(report["map"]["markers"][1]["label"], "2");

    let (status, report) = json_request(
        &app,
        "PUT",
        &format!("/api/maps/{}/center", session),
        json!({ "lat": 47.7, "lng": -122.4 }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["map"]["center"]["lat"], 47.7);

    let (status, _) = json_request(&app, "DELETE", &format!("/api/maps/{}", session), Value::Null).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = get(&app, &format!("/api/maps/{}", session)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(state.maps.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn reloading_a_map_page_does_not_pile_up_sessions() -> Result<()> {
    let state = ready_state();
    let app = app_router(state.clone());

    for _ in 0..50 {
        let (status, page) = get(&app, "/profiles/1/map").await?;
        assert_eq!(status, StatusCode::OK);
        assert!(page.contains("staticmap"));
    }
    assert_eq!(state.maps.len().await, 1);

    let (status, _) = get(&app, "/profiles/3/map").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.maps.len().await, 2);
    Ok(())
}

#[tokio::test]
async fn open_map_sessions_are_capped() -> Result<()> {
    let mut config = test_config();
    config.maps.max_sessions = 2;
    let capability = StaticMapsCapability::new("test-key")?;
    let store = InMemoryProfileStore::with_profiles(seed_profiles());
    let directory = DirectoryService::new(Arc::new(store), Arc::new(FixedGeocoder::with_seed_addresses()));
    let state = AppState::new(config, directory, CapabilityHandle::ready(Arc::new(capability)));
    let app = app_router(state.clone());

    for id in ["1", "2", "3"] {
        let (status, _) = json_request(&app, "POST", &format!("/api/profiles/{}/map", id), Value::Null).await?;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(state.maps.len().await, 2);
    Ok(())
}

#[tokio::test]
async fn unavailable_maps_report_an_error_and_close_the_session() -> Result<()> {
    let state = state_with(CapabilityHandle::unavailable("missing Google Maps API key"));
    let app = app_router(state.clone());

    let (status, report) = json_request(&app, "POST", "/api/profiles/1/map", Value::Null).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["state"], "error");
    assert_eq!(report["error"]["kind"], "capability_unavailable");
    assert_eq!(report["attempts"], 1);
    assert!(state.maps.is_empty().await);

    let (status, body) = get(&app, "/profiles/1/map").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Google Maps API not available"));
    Ok(())
}

#[tokio::test]
async fn html_pages_render() -> Result<()> {
    let app = app_router(ready_state());

    let (status, page) = get(&app, "/").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Profile Explorer"));
    assert!(page.contains("All Interests"));
    assert!(page.contains("Jane Smith"));

    let request = Request::get("/profiles?search=zzz").header("HX-Request", "true").body(Body::empty())?;
    let (status, fragment) = send(&app, request).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(!fragment.contains("<!DOCTYPE html>"));
    assert!(fragment.contains("No profiles found matching your criteria."));

    let (status, detail) = get(&app, "/profiles/2").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(detail.contains("Contact Information"));
    assert!(detail.contains("jane.smith@example.com"));

    let (status, _) = get(&app, "/profiles/missing").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn html_form_shows_validation_errors() -> Result<()> {
    let app = app_router(ready_state());
    let request = Request::post("/profiles")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("name=Sam&email=sam&phone=1&address=Somewhere&description=Hi"))?;
    let (status, page) = send(&app, request).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(page.contains("Email is invalid"));
    assert!(page.contains("value=\"Sam\""));

    let request = Request::post("/profiles")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(
            "name=Sam&email=sam%40example.com&phone=1&address=Somewhere&description=Hi&interests=Chess%2C+Go",
        ))?;
    let (status, page) = send(&app, request).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert!(page.contains("Profile Added"));
    assert!(page.contains("Chess"));
    Ok(())
}

#[tokio::test]
async fn profile_without_location_shows_empty_message() -> Result<()> {
    let state = ready_state();
    let app = app_router(state.clone());

    let (_, created) = json_request(
        &app,
        "POST",
        "/api/profiles",
        json!({
            "name": "Lost Person",
            "description": "Somewhere",
            "address": "Atlantis",
            "email": "lost@example.com",
            "phone": "0"
        }),
    )
    .await?;
    let id = created["id"].as_str().unwrap_or_default().to_string();

    let (status, page) = get(&app, &format!("/profiles/{}/map", id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("No location available"));
    assert!(state.maps.is_empty().await);

    let (status, _) = json_request(&app, "POST", &format!("/api/profiles/{}/map", id), Value::Null).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
