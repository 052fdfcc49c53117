use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use axum_test::TestServer;
use serde_json::{json, Value};
use uuid::Uuid;

use porchlight::api::create_router;
use porchlight::config::Config;
use porchlight::visits::VisitStore;

// ============================================================
// Stub GitHub API
// ============================================================

/// Canned `/users/{user}/repos` response plus a hit counter, bound to a
/// real local port so the loader goes through its full HTTP path.
#[derive(Clone)]
struct StubGithub {
    status: StatusCode,
    body: Value,
    hits: Arc<AtomicUsize>,
}

async fn stub_repos(State(stub): State<StubGithub>) -> (StatusCode, Json<Value>) {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    (stub.status, Json(stub.body.clone()))
}

async fn start_stub(status: StatusCode, body: Value) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let stub = StubGithub {
        status,
        body,
        hits: hits.clone(),
    };
    let app = Router::new()
        .route("/users/{user}/repos", get(stub_repos))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server died");
    });
    (base, hits)
}

fn setup(github_base: &str) -> TestServer {
    let mut config = Config::for_user("tester");
    config.api_base = github_base.to_string();
    let store = VisitStore::new(config);
    TestServer::new(create_router(store)).expect("Failed to create test server")
}

async fn create_visit(server: &TestServer) -> Value {
    let response = server.post("/api/v1/visits").json(&json!({})).await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

fn visit_id(view: &Value) -> Uuid {
    view["id"].as_str().unwrap().parse().unwrap()
}

/// Poll a visit until its projects region reaches `expected` (the load
/// runs in a background task).
async fn wait_for_projects(server: &TestServer, id: Uuid, expected: &str) -> Value {
    for _ in 0..200 {
        let view: Value = server.get(&format!("/api/v1/visits/{id}")).await.json();
        if view["projects"]["status"] == expected {
            return view;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("visit never reached projects status {expected:?}");
}

fn sample_repos() -> Value {
    json!([
        {
            "name": "alpha",
            "html_url": "https://github.com/tester/alpha",
            "description": "First",
            "stargazers_count": 5,
            "forks_count": 1,
            "updated_at": "2024-01-01T00:00:00Z",
            "language": "Rust",
            "homepage": "",
            "fork": false,
            "archived": false
        },
        {
            "name": "beta",
            "html_url": "https://github.com/tester/beta",
            "description": null,
            "stargazers_count": 5,
            "forks_count": 0,
            "updated_at": "2024-06-01T00:00:00Z",
            "language": null,
            "homepage": "https://beta.example.com",
            "fork": false,
            "archived": false
        },
        {
            "name": "gamma-fork",
            "html_url": "https://github.com/tester/gamma-fork",
            "stargazers_count": 100,
            "updated_at": "2024-06-01T00:00:00Z",
            "fork": true,
            "archived": false
        }
    ])
}

// ============================================================
// Tests
// ============================================================

mod visits {
    use super::*;

    #[tokio::test]
    async fn a_fresh_visit_is_hidden_muted_and_pending() {
        let (base, _) = start_stub(StatusCode::OK, sample_repos()).await;
        let server = setup(&base);

        let view = create_visit(&server).await;
        assert_eq!(view["reveal_state"], "hidden");
        assert_eq!(view["projects"]["status"], "pending");
        assert_eq!(view["regions"]["tagline_hidden"], true);
        assert_eq!(view["regions"]["main_hidden"], true);
        assert_eq!(view["regions"]["footer_hidden"], true);
        assert_eq!(view["audio"]["label"], "🔇");
        assert_eq!(view["audio"]["aria_pressed"], false);
    }

    #[tokio::test]
    async fn unknown_visits_map_to_404() {
        let (base, _) = start_stub(StatusCode::OK, json!([])).await;
        let server = setup(&base);
        let id = Uuid::new_v4();

        server
            .get(&format!("/api/v1/visits/{id}"))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .post(&format!("/api/v1/visits/{id}/signals"))
            .json(&json!({ "type": "skip" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .post(&format!("/api/v1/visits/{id}/audio/toggle"))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

mod reveal_flow {
    use super::*;

    #[tokio::test]
    async fn skip_reveals_and_loads_projects_exactly_once() {
        let (base, hits) = start_stub(StatusCode::OK, sample_repos()).await;
        let server = setup(&base);
        let visit = create_visit(&server).await;
        let id = visit_id(&visit);

        let revealed: Value = server
            .post(&format!("/api/v1/visits/{id}/signals"))
            .json(&json!({ "type": "skip" }))
            .await
            .json();
        assert_eq!(revealed["reveal_state"], "revealed");
        assert_eq!(revealed["regions"]["main_hidden"], false);

        // Stray late signals: still revealed, no second load.
        for signal in [
            json!({ "type": "ended" }),
            json!({ "type": "skip" }),
            json!({ "type": "metadata_loaded", "duration_secs": 30.0 }),
        ] {
            let view: Value = server
                .post(&format!("/api/v1/visits/{id}/signals"))
                .json(&signal)
                .await
                .json();
            assert_eq!(view["reveal_state"], "revealed");
        }

        let view = wait_for_projects(&server, id, "populated").await;
        let html = view["projects"]["html"].as_str().unwrap();

        // Fork excluded; equal stars break toward the more recent repo.
        let beta = html.find("beta").expect("beta card");
        let alpha = html.find("alpha").expect("alpha card");
        assert!(beta < alpha);
        assert!(!html.contains("gamma-fork"));

        // Per-card contract spot checks.
        assert!(html.contains("No description provided."));
        assert!(html.contains(">Live demo<"));
        assert!(html.contains("💡 Rust"));
        assert!(html.contains("rel=\"noopener\""));

        assert_eq!(hits.load(Ordering::SeqCst), 1, "loader must run exactly once");
    }

    #[tokio::test]
    async fn near_end_time_update_reveals_immediately() {
        let (base, _) = start_stub(StatusCode::OK, json!([])).await;
        let server = setup(&base);
        let visit = create_visit(&server).await;
        let id = visit_id(&visit);

        let view: Value = server
            .post(&format!("/api/v1/visits/{id}/signals"))
            .json(&json!({ "type": "time_update", "position_secs": 9.85, "duration_secs": 10.0 }))
            .await
            .json();
        assert_eq!(view["reveal_state"], "revealed");
    }

    #[tokio::test]
    async fn empty_account_shows_the_empty_placeholder() {
        let (base, _) = start_stub(StatusCode::OK, json!([])).await;
        let server = setup(&base);
        let visit = create_visit(&server).await;
        let id = visit_id(&visit);

        server
            .post(&format!("/api/v1/visits/{id}/signals"))
            .json(&json!({ "type": "skip" }))
            .await
            .assert_status_ok();

        let view = wait_for_projects(&server, id, "empty").await;
        let html = view["projects"]["html"].as_str().unwrap();
        assert!(html.contains("id=\"projects-empty\" class=\"placeholder\">"));
        assert!(html.contains("id=\"projects-error\" class=\"placeholder\" hidden"));
        assert!(!html.contains("project-card"));
    }

    #[tokio::test]
    async fn upstream_failure_shows_the_error_placeholder() {
        let (base, _) =
            start_stub(StatusCode::INTERNAL_SERVER_ERROR, json!({"message": "boom"})).await;
        let server = setup(&base);
        let visit = create_visit(&server).await;
        let id = visit_id(&visit);

        // Reveal still succeeds; only the projects region degrades.
        let view: Value = server
            .post(&format!("/api/v1/visits/{id}/signals"))
            .json(&json!({ "type": "skip" }))
            .await
            .json();
        assert_eq!(view["reveal_state"], "revealed");

        let view = wait_for_projects(&server, id, "error").await;
        let html = view["projects"]["html"].as_str().unwrap();
        assert!(html.contains("id=\"projects-error\" class=\"placeholder\">"));
        assert!(html.contains("id=\"projects-empty\" class=\"placeholder\" hidden"));
        assert!(!html.contains("project-card"));
    }

    #[tokio::test]
    async fn internal_timer_signal_is_rejected_at_the_boundary() {
        let (base, _) = start_stub(StatusCode::OK, json!([])).await;
        let server = setup(&base);
        let visit = create_visit(&server).await;
        let id = visit_id(&visit);

        server
            .post(&format!("/api/v1/visits/{id}/signals"))
            .json(&json!({ "type": "fallback_elapsed" }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}

mod audio {
    use super::*;

    #[tokio::test]
    async fn toggles_alternate_and_report_resume_playback() {
        let (base, _) = start_stub(StatusCode::OK, json!([])).await;
        let server = setup(&base);
        let visit = create_visit(&server).await;
        let id = visit_id(&visit);

        let on: Value = server
            .post(&format!("/api/v1/visits/{id}/audio/toggle"))
            .await
            .json();
        assert_eq!(on["label"], "🔊");
        assert_eq!(on["aria_pressed"], true);
        assert_eq!(on["resume_playback"], true);

        let off: Value = server
            .post(&format!("/api/v1/visits/{id}/audio/toggle"))
            .await
            .json();
        assert_eq!(off["label"], "🔇");
        assert_eq!(off["aria_pressed"], false);
        assert_eq!(off["resume_playback"], false);

        // The snapshot's button always matches the last toggle.
        let view: Value = server.get(&format!("/api/v1/visits/{id}")).await.json();
        assert_eq!(view["audio"]["label"], "🔇");
    }
}

mod shell {
    use super::*;

    #[tokio::test]
    async fn index_serves_the_hidden_shell_with_a_visit_id() {
        let (base, _) = start_stub(StatusCode::OK, json!([])).await;
        let server = setup(&base);

        let response = server.get("/").await;
        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("data-visit-id=\""));
        assert!(html.contains("<main hidden>"));
        assert!(html.contains("class=\"tagline\" hidden"));
        assert!(html.contains("class=\"site-footer\" hidden"));
        assert!(html.contains("id=\"audioToggle\""));
        assert!(html.contains("id=\"skipReveal\""));
        assert!(html.contains("class=\"bg-video\""));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (base, _) = start_stub(StatusCode::OK, json!([])).await;
        let server = setup(&base);
        let response = server.get("/api/v1/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "ok");
    }
}
