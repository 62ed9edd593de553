//! Integration tests: submit, poll, cancel, clear, list, document types, SSE.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use docgen_api::server::{self, AppState};
use docgen_llm::MockGenerator;
use docgen_pipeline::{DocumentRegistry, PipelineConfig, SectionPipeline};
use docgen_scheduler::Scheduler;
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

fn test_app(generator: MockGenerator, pacing: Duration) -> axum::Router {
    let pipeline = SectionPipeline::new(
        Arc::new(DocumentRegistry::builtin().unwrap()),
        Arc::new(generator),
        PipelineConfig {
            pacing,
            summary_chars: 80,
        },
    );
    let state = Arc::new(AppState {
        scheduler: Scheduler::default(),
        pipeline,
    });
    server::router(state)
}

async fn call(app: &axum::Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> serde_json::Value {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn submit(app: &axum::Router, document_type: &str) -> String {
    let j = call(
        app,
        "POST",
        "/documents",
        Some(json!({
            "document_type": document_type,
            "subject": "Acme Bakery",
            "parameters": { "city": "Lyon" }
        })),
    )
    .await;
    assert_eq!(j["code"], 200, "{}", j);
    j["data"]["job_id"].as_str().unwrap().to_string()
}

async fn poll(app: &axum::Router, job_id: &str) -> serde_json::Value {
    for _ in 0..400 {
        let j = call(app, "GET", &format!("/jobs/{}", job_id), None).await;
        let status = j["data"]["status"].as_str().unwrap_or("");
        if matches!(status, "completed" | "failed" | "cancelled") {
            return j;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {} did not finish", job_id);
}

#[tokio::test]
async fn submit_then_poll_to_completed_document() {
    let app = test_app(MockGenerator::new().failing_at(1), Duration::ZERO);
    let job_id = submit(&app, "project_brief").await;

    let j = poll(&app, &job_id).await;
    let data = &j["data"];
    assert_eq!(data["status"], "completed");
    assert_eq!(data["job_type"], "project_brief");
    assert_eq!(data["payload"]["context"]["subject"], "Acme Bakery");
    let doc = &data["result"];
    assert_eq!(doc["sections"].as_array().unwrap().len(), 3);
    assert!(doc["sections"][1]["title"]
        .as_str()
        .unwrap()
        .contains("(GENERATION FAILED)"));
    assert_eq!(doc["sections"][1]["outcome"], "fallback");
    assert_eq!(doc["metadata"]["success_rate"], "67%");
    assert!(doc["content_by_id"]["section_01"]
        .as_str()
        .unwrap()
        .contains("Acme Bakery"));
}

#[tokio::test]
async fn validation_errors_are_reported_without_a_job() {
    let app = test_app(MockGenerator::new(), Duration::ZERO);
    let j = call(
        &app,
        "POST",
        "/documents",
        Some(json!({ "document_type": "sonnet", "subject": "x" })),
    )
    .await;
    assert_eq!(j["code"], 400);
    assert!(j["message"].as_str().unwrap().contains("sonnet"));

    let j = call(
        &app,
        "POST",
        "/documents",
        Some(json!({ "document_type": "project_brief" })),
    )
    .await;
    assert_eq!(j["code"], 400);

    let j = call(&app, "GET", "/jobs", None).await;
    assert_eq!(j["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn unknown_job_is_404_envelope() {
    let app = test_app(MockGenerator::new(), Duration::ZERO);
    let j = call(&app, "GET", "/jobs/does-not-exist", None).await;
    assert_eq!(j["code"], 404);
    assert!(j.get("data").is_none());
    let j = call(&app, "POST", "/jobs/does-not-exist/cancel", None).await;
    assert_eq!(j["code"], 404);
    let j = call(&app, "GET", "/jobs/does-not-exist/events", None).await;
    assert_eq!(j["code"], 404);
}

#[tokio::test]
async fn cancel_is_advisory_then_clear() {
    let app = test_app(MockGenerator::new(), Duration::from_millis(30));
    let job_id = submit(&app, "project_brief").await;

    let j = call(&app, "POST", &format!("/jobs/{}/cancel", job_id), None).await;
    assert_eq!(j["data"]["cancelled"], true);
    let j = call(&app, "POST", &format!("/jobs/{}/cancel", job_id), None).await;
    assert_eq!(j["data"]["cancelled"], false);

    let mut late = serde_json::Value::Null;
    for _ in 0..400 {
        let j = call(&app, "GET", &format!("/jobs/{}", job_id), None).await;
        assert_eq!(j["data"]["status"], "cancelled");
        if !j["data"]["late_outcome"].is_null() {
            late = j["data"]["late_outcome"].clone();
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(late["result"]["sections"].as_array().unwrap().len(), 3);

    let j = call(&app, "DELETE", &format!("/jobs/{}", job_id), None).await;
    assert_eq!(j["data"]["cleared"], true);
    let j = call(&app, "GET", &format!("/jobs/{}", job_id), None).await;
    assert_eq!(j["code"], 404);
}

#[tokio::test]
async fn list_filters_and_clear_completed() {
    let app = test_app(MockGenerator::new(), Duration::ZERO);
    let a = submit(&app, "project_brief").await;
    let b = submit(&app, "market_study").await;
    poll(&app, &a).await;
    poll(&app, &b).await;

    let j = call(&app, "GET", "/jobs?state=completed&job_type=market_study", None).await;
    let jobs = j["data"].as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["id"], b.as_str());

    let j = call(&app, "GET", "/jobs?state=active", None).await;
    assert_eq!(j["data"].as_array().unwrap().len(), 0);

    let j = call(&app, "GET", "/jobs?state=sideways", None).await;
    assert_eq!(j["code"], 400);

    let j = call(&app, "POST", "/jobs/clear-completed", None).await;
    assert_eq!(j["data"]["cleared"], 2);
    let j = call(&app, "GET", "/jobs", None).await;
    assert_eq!(j["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn document_types_lists_builtin_layouts() {
    let app = test_app(MockGenerator::new(), Duration::ZERO);
    let j = call(&app, "GET", "/document-types", None).await;
    let types = j["data"].as_array().unwrap();
    assert_eq!(types.len(), 3);
    let plan = types
        .iter()
        .find(|t| t["document_type"] == "business_plan")
        .unwrap();
    assert_eq!(plan["section_count"], 10);
    assert_eq!(plan["sections"][0], "Executive Summary");
}

#[tokio::test]
async fn events_stream_starts_with_snapshot() {
    let app = test_app(MockGenerator::new(), Duration::ZERO);
    let job_id = submit(&app, "project_brief").await;
    poll(&app, &job_id).await;

    let req = Request::builder()
        .method("GET")
        .uri(format!("/jobs/{}/events", job_id))
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "text/event-stream"
    );
    let mut body = res.into_body();
    let frame = tokio::time::timeout(Duration::from_secs(2), body.frame())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
    assert!(text.contains("event: completed"));
    assert!(text.contains(&job_id));
}

#[tokio::test]
async fn health() {
    let app = test_app(MockGenerator::new(), Duration::ZERO);
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"ok");
}
