// src/web/mod.rs
pub mod handlers;
pub mod types;

pub use types::*;

use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{
    catchers, get, options, patch, post, put, routes, Build, Request, Response, Rocket, State,
};
use std::sync::Arc;

use graflog::app_log;
use crate::applications::ApplicationUpdate;
use crate::auth::{AuthConfig, AuthenticatedUser, OptionalAuth};
use crate::board::{Column, DeleteResult, DeletionGate, MoveOption, PendingDeletion};
use crate::core::config_manager::RecommendationSettings;
use crate::core::{ConfigManager, Database};
use crate::emotions::{EmotionEntry, EmotionSubmission, Question};
use crate::profiles::{Profile, ProfileUpdate};
use crate::proxy::{JobSearchProxy, LinkedInPostsProxy};
use crate::recommendations::{HttpListingsSource, ListingsSource};
use crate::stats::ApplicationStats;
use crate::types::{
    JobApplication, JobListing, JobSearchRequest, JobSearchResponse, LinkedInPostsRequest,
    LinkedInPostsResponse,
};

pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PUT, PATCH, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// Applications

#[get("/applications")]
pub async fn list_applications(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Json<DataResponse<Vec<JobApplication>>> {
    handlers::list_applications_handler(auth, db).await
}

#[post("/applications", data = "<request>")]
pub async fn create_application(
    request: Json<StandardRequest<CreateApplicationRequest>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<JobApplication>>, Json<StandardErrorResponse>> {
    handlers::create_application_handler(request, auth, db).await
}

#[patch("/applications/<id>", data = "<request>")]
pub async fn update_application(
    id: &str,
    request: Json<StandardRequest<ApplicationUpdate>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<JobApplication>>, Json<StandardErrorResponse>> {
    handlers::update_details_handler(id, request, auth, db).await
}

#[patch("/applications/<id>/status", data = "<request>")]
pub async fn update_status(
    id: &str,
    request: Json<StandardRequest<UpdateStatusRequest>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    gate: &State<DeletionGate>,
) -> Result<Json<DataResponse<Vec<Column>>>, Json<StandardErrorResponse>> {
    handlers::update_status_handler(id, request, auth, db, gate).await
}

#[post("/applications/<id>/delete-request")]
pub async fn request_delete(
    id: &str,
    auth: AuthenticatedUser,
    db: &State<Database>,
    gate: &State<DeletionGate>,
) -> Result<Json<DataResponse<PendingDeletion>>, Json<StandardErrorResponse>> {
    handlers::delete_request_handler(id, auth, db, gate).await
}

#[post("/applications/delete/confirm", data = "<request>")]
pub async fn confirm_delete(
    request: Json<StandardRequest<DeleteTokenRequest>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    gate: &State<DeletionGate>,
) -> Result<Json<DataResponse<DeleteResult>>, Json<StandardErrorResponse>> {
    handlers::confirm_delete_handler(request, auth, db, gate).await
}

#[post("/applications/delete/cancel", data = "<request>")]
pub async fn cancel_delete(
    request: Json<StandardRequest<DeleteTokenRequest>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    gate: &State<DeletionGate>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    handlers::cancel_delete_handler(request, auth, db, gate).await
}

// Board

#[get("/board")]
pub async fn get_board(
    auth: AuthenticatedUser,
    db: &State<Database>,
    gate: &State<DeletionGate>,
) -> Json<DataResponse<Vec<Column>>> {
    handlers::get_board_handler(auth, db, gate).await
}

#[post("/board/<status>/cards", data = "<request>")]
pub async fn add_card(
    status: &str,
    request: Json<StandardRequest<CreateApplicationRequest>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    gate: &State<DeletionGate>,
) -> Result<Json<DataResponse<Vec<Column>>>, Json<StandardErrorResponse>> {
    handlers::add_card_handler(status, request, auth, db, gate).await
}

#[get("/board/moves/<status>")]
pub async fn move_options(
    status: &str,
) -> Result<Json<DataResponse<Vec<MoveOption>>>, Json<StandardErrorResponse>> {
    handlers::move_options_handler(status).await
}

// Recommendations, statistics, profile, questionnaire

#[get("/recommendations?<refresh>")]
pub async fn recommendations(
    refresh: Option<bool>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    listings: &State<ListingsBackend>,
    config: &State<ServerConfig>,
) -> Json<DataResponse<Vec<JobListing>>> {
    handlers::recommendations_handler(refresh, auth, db, listings, config).await
}

#[get("/stats")]
pub async fn stats(auth: AuthenticatedUser, db: &State<Database>) -> Json<DataResponse<ApplicationStats>> {
    handlers::stats_handler(auth, db).await
}

#[get("/profile")]
pub async fn get_profile(auth: AuthenticatedUser) -> Json<DataResponse<Profile>> {
    handlers::get_profile_handler(auth).await
}

#[put("/profile", data = "<request>")]
pub async fn update_profile(
    request: Json<StandardRequest<ProfileUpdate>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<Profile>>, Json<StandardErrorResponse>> {
    handlers::update_profile_handler(request, auth, db).await
}

#[get("/emotions/questions")]
pub async fn emotion_questions() -> Json<DataResponse<Vec<Question>>> {
    handlers::questions_handler().await
}

#[post("/emotions", data = "<request>")]
pub async fn record_emotion(
    request: Json<StandardRequest<EmotionSubmission>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<EmotionEntry>>, Json<StandardErrorResponse>> {
    handlers::record_emotion_handler(request, auth, db).await
}

#[get("/emotions")]
pub async fn list_emotions(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<Vec<EmotionEntry>>>, Json<StandardErrorResponse>> {
    handlers::list_emotions_handler(auth, db).await
}

// Proxy functions

#[post("/functions/job-search", data = "<request>")]
pub async fn job_search(
    request: Json<JobSearchRequest>,
    auth: OptionalAuth,
    proxies: &State<Proxies>,
) -> Json<JobSearchResponse> {
    handlers::job_search_handler(request, auth, proxies).await
}

#[post("/functions/linkedin-posts", data = "<request>")]
pub async fn linkedin_posts(
    request: Json<LinkedInPostsRequest>,
    auth: OptionalAuth,
    proxies: &State<Proxies>,
) -> Json<LinkedInPostsResponse> {
    handlers::linkedin_posts_handler(request, auth, proxies).await
}

// System

#[get("/me")]
pub async fn get_current_user(auth: AuthenticatedUser) -> Json<DataResponse<UserInfo>> {
    handlers::get_current_user_handler(auth).await
}

#[get("/health")]
pub async fn health(
    auth: OptionalAuth,
    db: &State<Database>,
) -> Result<Json<TextResponse>, Json<StandardErrorResponse>> {
    handlers::health_handler(auth, db).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers

#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(401)]
pub fn unauthorized() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Authentication required".to_string(),
        "AUTHENTICATION_ERROR".to_string(),
        vec![
            "Sign in again".to_string(),
            "Send the access token as 'Authorization: Bearer <token>'".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(404)]
pub fn not_found(request: &Request) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        format!("No route for {} {}", request.method(), request.uri()),
        "NOT_FOUND".to_string(),
        vec!["Check the endpoint path".to_string()],
        None,
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body does not match the expected shape".to_string(),
        "UNPROCESSABLE_ENTITY".to_string(),
        vec!["Verify field names and types".to_string()],
        None,
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
        None,
    ))
}

/// Everything the routes need, built once at startup.
pub struct WebServices {
    pub database: Database,
    pub auth: AuthConfig,
    pub job_search: Arc<JobSearchProxy>,
    pub linkedin: LinkedInPostsProxy,
    pub listings: Arc<dyn ListingsSource>,
    pub recommendations: RecommendationSettings,
}

impl WebServices {
    pub async fn from_config(config: &ConfigManager) -> Result<Self> {
        let database = Database::new(&config.environment.database_path).await?;
        let auth = AuthConfig::from_settings(&config.auth)?;
        let job_search = Arc::new(JobSearchProxy::from_config(&config.service)?);
        let linkedin = LinkedInPostsProxy::from_config(&config.service)?;

        let listings: Arc<dyn ListingsSource> = match config.service.listings_proxy_url.as_deref() {
            Some(url) => {
                app_log!(info, "Recommendations use the remote listings proxy at {}", url);
                Arc::new(HttpListingsSource::new(url, config.service.timeout_seconds)?)
            }
            None => {
                if !job_search.is_enabled() {
                    app_log!(info, "Recommendations will use synthetic listings only");
                }
                job_search.clone()
            }
        };

        Ok(Self {
            database,
            auth,
            job_search,
            linkedin,
            listings,
            recommendations: config.recommendations.clone(),
        })
    }
}

pub fn build_rocket(services: WebServices) -> Rocket<Build> {
    rocket::build()
        .attach(Cors)
        .manage(services.database)
        .manage(services.auth)
        .manage(DeletionGate::new())
        .manage(Proxies {
            job_search: services.job_search,
            linkedin: services.linkedin,
        })
        .manage(ListingsBackend(services.listings))
        .manage(ServerConfig {
            recommendations: services.recommendations,
        })
        .register(
            "/api",
            catchers![bad_request, unauthorized, not_found, unprocessable, internal_error],
        )
        .mount(
            "/api",
            routes![
                list_applications,
                create_application,
                update_application,
                update_status,
                request_delete,
                confirm_delete,
                cancel_delete,
                get_board,
                add_card,
                move_options,
                recommendations,
                stats,
                get_profile,
                update_profile,
                emotion_questions,
                record_emotion,
                list_emotions,
                job_search,
                linkedin_posts,
                get_current_user,
                health,
                options,
            ],
        )
}

pub async fn start_web_server(config: ConfigManager, port: u16) -> Result<()> {
    let services = WebServices::from_config(&config).await?;

    app_log!(info, "Starting job tracker API server");
    app_log!(info, "Database: {}", config.environment.database_path.display());
    app_log!(info, "Server: http://0.0.0.0:{}", port);

    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("address", "0.0.0.0"));

    build_rocket(services)
        .configure(figment)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket failed: {}", e))?;

    Ok(())
}
