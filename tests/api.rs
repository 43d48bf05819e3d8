use chrono::{Duration, Utc};
use job_tracker::applications::ApplicationRepository;
use job_tracker::auth::AuthConfig;
use job_tracker::core::config_manager::RecommendationSettings;
use job_tracker::core::Database;
use job_tracker::proxy::{JobSearchProxy, LinkedInPostsProxy};
use job_tracker::types::{ApplicationStatus, JobApplication, NewApplication};
use job_tracker::web::WebServices;
use job_tracker::build_rocket;
use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};
use std::sync::Arc;

const SECRET: &str = "integration-secret";
const USER: &str = "user-1";

struct TestApp {
    client: Client,
    db: Database,
    token: String,
}

impl TestApp {
    async fn new() -> Self {
        let db = Database::in_memory().await.unwrap();
        let auth = AuthConfig::new(SECRET, "authenticated");
        let token = auth
            .issue_token(USER, "ada@example.com", Duration::hours(1))
            .unwrap();

        let job_search = Arc::new(JobSearchProxy::disabled());
        let services = WebServices {
            database: db.clone(),
            auth,
            listings: job_search.clone(),
            job_search,
            linkedin: LinkedInPostsProxy::disabled(),
            recommendations: RecommendationSettings::default(),
        };

        let client = Client::tracked(build_rocket(services)).await.unwrap();
        Self { client, db, token }
    }

    fn bearer(&self) -> Header<'static> {
        Header::new("Authorization", format!("Bearer {}", self.token))
    }

    async fn get(&self, uri: &str) -> (Status, Value) {
        let response = self.client.get(uri.to_string()).header(self.bearer()).dispatch().await;
        let status = response.status();
        (status, response.into_json::<Value>().await.unwrap())
    }

    async fn send(&self, method: &str, uri: &str, body: Value) -> (Status, Value) {
        let request = match method {
            "POST" => self.client.post(uri.to_string()),
            "PATCH" => self.client.patch(uri.to_string()),
            "PUT" => self.client.put(uri.to_string()),
            other => panic!("unsupported method {}", other),
        };
        let response = request
            .header(self.bearer())
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;
        let status = response.status();
        (status, response.into_json::<Value>().await.unwrap())
    }

    async fn seed(&self, company: &str, status: ApplicationStatus) -> String {
        ApplicationRepository::new(self.db.pool())
            .insert(USER, NewApplication::new(company, "Engineer").with_status(status))
            .await
            .unwrap()
            .id
    }
}

fn task_count(board: &Value) -> usize {
    board["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|column| column["tasks"].as_array().unwrap().len())
        .sum()
}

#[rocket::async_test]
async fn test_four_statuses_fill_four_columns_in_order() {
    let app = TestApp::new().await;
    for (company, status) in [
        ("Acme", ApplicationStatus::Rejected),
        ("Globex", ApplicationStatus::Applied),
        ("Initech", ApplicationStatus::Offer),
        ("Umbrella", ApplicationStatus::Interview),
    ] {
        app.seed(company, status).await;
    }

    let (status, board) = app.get("/api/board").await;
    assert_eq!(status, Status::Ok);

    let columns = board["data"].as_array().unwrap();
    let ids: Vec<&str> = columns.iter().map(|c| c["id"].as_str().unwrap()).collect();
    let titles: Vec<&str> = columns.iter().map(|c| c["title"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["applied", "interview", "offer", "rejected"]);
    assert_eq!(titles, vec!["Applied", "Interview", "Offer", "Rejected"]);
    assert!(columns
        .iter()
        .all(|c| c["tasks"].as_array().unwrap().len() == 1));
    assert_eq!(columns[0]["tasks"][0]["company"], "Globex");
    assert_eq!(columns[0]["tasks"][0]["priority"], "high");
}

#[rocket::async_test]
async fn test_unknown_status_is_not_on_the_board() {
    let app = TestApp::new().await;
    let now = Utc::now();
    ApplicationRepository::new(app.db.pool())
        .insert_row(&JobApplication {
            id: "legacy-1".to_string(),
            user_id: USER.to_string(),
            company: "Hooli".to_string(),
            position: "Engineer".to_string(),
            status: "ghosted".to_string(),
            applied_date: now,
            notes: None,
            url: None,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();

    let (_, board) = app.get("/api/board").await;
    assert_eq!(board["data"].as_array().unwrap().len(), 4);
    assert_eq!(task_count(&board), 0);

    let (_, listed) = app.get("/api/applications").await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[rocket::async_test]
async fn test_delete_cancel_keeps_record_and_confirm_removes_it() {
    let app = TestApp::new().await;
    let id = app.seed("Acme", ApplicationStatus::Applied).await;

    let (status, pending) = app
        .send("POST", &format!("/api/applications/{}/delete-request", id), json!({}))
        .await;
    assert_eq!(status, Status::Ok);
    let token = pending["data"]["token"].as_str().unwrap().to_string();

    let (_, cancelled) = app
        .send("POST", "/api/applications/delete/cancel", json!({ "token": token }))
        .await;
    assert_eq!(cancelled["success"], true);
    let (_, listed) = app.get("/api/applications").await;
    assert_eq!(listed["data"][0]["id"], id.as_str());

    let (_, pending) = app
        .send("POST", &format!("/api/applications/{}/delete-request", id), json!({}))
        .await;
    let token = pending["data"]["token"].as_str().unwrap().to_string();
    let (_, confirmed) = app
        .send("POST", "/api/applications/delete/confirm", json!({ "token": token }))
        .await;
    assert_eq!(confirmed["success"], true);
    assert_eq!(confirmed["data"]["outcome"], "deleted");

    let (_, listed) = app.get("/api/applications").await;
    assert!(listed["data"].as_array().unwrap().is_empty());

    let (_, replay) = app
        .send("POST", "/api/applications/delete/confirm", json!({ "token": token }))
        .await;
    assert_eq!(replay["success"], false);
    assert_eq!(replay["error_code"], "NO_PENDING_DELETE");
}

#[rocket::async_test]
async fn test_status_patch_moves_card_and_rejects_unknown_status() {
    let app = TestApp::new().await;
    let id = app.seed("Acme", ApplicationStatus::Applied).await;

    let (_, moved) = app
        .send(
            "PATCH",
            &format!("/api/applications/{}/status", id),
            json!({ "status": "Interview" }),
        )
        .await;
    assert_eq!(moved["success"], true);
    assert_eq!(moved["data"][1]["tasks"][0]["id"], id.as_str());
    assert_eq!(moved["notifications"][0]["level"], "success");

    let (_, rejected) = app
        .send(
            "PATCH",
            &format!("/api/applications/{}/status", id),
            json!({ "status": "archived" }),
        )
        .await;
    assert_eq!(rejected["error_code"], "INVALID_STATUS");
}

#[rocket::async_test]
async fn test_create_and_add_card() {
    let app = TestApp::new().await;

    let (_, created) = app
        .send(
            "POST",
            "/api/applications",
            json!({ "company": "Acme", "position": "Backend Engineer", "notes": "Hybrid, Remote ok" }),
        )
        .await;
    assert_eq!(created["data"]["status"], "applied");

    let (_, board) = app
        .send(
            "POST",
            "/api/board/offer/cards",
            json!({ "company": "Globex", "position": "SRE" }),
        )
        .await;
    assert_eq!(board["data"][2]["tasks"][0]["company"], "Globex");
    assert_eq!(board["data"][0]["tasks"][0]["label"], "Remote");

    let (_, invalid) = app
        .send("POST", "/api/applications", json!({ "company": " ", "position": "SRE" }))
        .await;
    assert_eq!(invalid["success"], false);
    assert_eq!(invalid["error"], "Company is required");
}

#[rocket::async_test]
async fn test_requests_without_token_get_401() {
    let app = TestApp::new().await;
    let response = app.client.get("/api/board").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);

    let body = response.into_json::<Value>().await.unwrap();
    assert_eq!(body["error_code"], "AUTHENTICATION_ERROR");
}

#[rocket::async_test]
async fn test_recommendations_fall_back_to_synthetic_listings() {
    let app = TestApp::new().await;
    app.send(
        "PUT",
        "/api/profile",
        json!({ "desired_roles": ["Platform Engineer"], "country": "DE" }),
    )
    .await;

    let (_, first) = app.get("/api/recommendations").await;
    let listings = first["data"].as_array().unwrap();
    assert_eq!(listings.len(), 6);
    assert!(listings.iter().all(|l| l["match"].as_u64().unwrap() <= 99));
    assert!(listings.iter().all(|l| l["source"] == "synthetic"));
    assert!(listings.iter().all(|l| l["location"] == "Berlin"));

    let (_, cached) = app.get("/api/recommendations").await;
    assert_eq!(cached["data"], first["data"]);
}

#[rocket::async_test]
async fn test_job_search_without_key_reports_failure() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send("POST", "/api/functions/job-search", json!({ "query": "rust" }))
        .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["success"], false);
    assert_eq!(body["total"], 0);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[rocket::async_test]
async fn test_emotion_check_in_and_stats() {
    let app = TestApp::new().await;
    app.seed("Acme", ApplicationStatus::Applied).await;
    app.seed("Globex", ApplicationStatus::Offer).await;

    let (_, entry) = app
        .send(
            "POST",
            "/api/emotions",
            json!({ "answers": {
                "confidence": 5, "stress": "1", "motivation": 5,
                "rejection_impact": 1, "optimism": 5
            }}),
        )
        .await;
    assert_eq!(entry["data"]["mood_score"], 5.0);

    let (_, entries) = app.get("/api/emotions").await;
    assert_eq!(entries["data"].as_array().unwrap().len(), 1);

    let (_, stats) = app.get("/api/stats").await;
    assert_eq!(stats["data"]["total"], 2);
    assert_eq!(stats["data"]["response_rate"], 50.0);
    assert_eq!(stats["data"]["by_status"]["offer"], 1);
}
