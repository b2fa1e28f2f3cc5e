use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;

use crate::auth::{create_token, verify_staff};
use crate::config::AppConfig;
use crate::dashboard;
use crate::errors::{AppError, AppResult};
use crate::forms::{self, BugForm, BugUpload, ContactForm, FixForm, FixUpload};
use crate::middleware::Authorization;
use crate::models::{Bug, BugPatch, BugStatus, Category, FixPatch, LoginPayload, Severity, Subject};
use crate::researchers::{self, ResearcherQuery};
use crate::store::{self, BugFilter};
use crate::uploads::UploadStore;

pub const BUG_REPORTED: &str = "reported success wait for fix the bug";
pub const CONTACT_SENT: &str = "Your message has been sent!";
pub const FIX_RECORDED: &str = "Successfully fixed!";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(home)))
        .service(web::resource("/docs/").route(web::get().to(docs)))
        .service(web::resource("/usage/").route(web::get().to(usage)))
        .service(web::resource("/setup/").route(web::get().to(setup)))
        .service(
            web::resource("/dashboard/")
                .wrap(Authorization)
                .route(web::get().to(show_dashboard)),
        )
        .service(web::resource("/bugs/").route(web::get().to(get_bugs)))
        .service(web::resource("/bugs/{id}/").route(web::get().to(get_bug)))
        .service(
            web::resource("/contact/")
                .route(web::get().to(show_contact_form))
                .route(web::post().to(submit_contact)),
        )
        .service(
            web::resource("/create/")
                .route(web::get().to(show_create_form))
                .route(web::post().to(create_bug)),
        )
        .service(web::resource("/successful_fixed/").route(web::get().to(list_fixed_bugs)))
        .service(
            web::resource("/successful_fixed/create/")
                .route(web::get().to(show_fix_form))
                .route(web::post().to(create_fix)),
        )
        .service(web::resource("/successful_fixed/{id}/").route(web::get().to(get_fix)))
        .service(web::resource("/researcher_list/").route(web::get().to(list_researchers)))
        .service(
            web::resource("/researcher_detail/{category}/{id}/")
                .route(web::get().to(researcher_detail)),
        )
        .service(web::resource("/login").route(web::post().to(login)))
        .service(
            web::scope("/admin")
                .wrap(Authorization)
                .service(
                    web::resource("/bugs/{id}/")
                        .route(web::patch().to(update_bug))
                        .route(web::delete().to(delete_bug)),
                )
                .service(web::resource("/successful_fixed/{id}/").route(web::patch().to(update_fix)))
                .service(
                    web::resource("/contact_messages/").route(web::get().to(list_contact_messages)),
                ),
        );
}

// === Pages ===

fn page(name: &str, title: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "page": name, "title": title }))
}

async fn home() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "page": "home",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "links": {
            "bugs": "/bugs/",
            "create": "/create/",
            "successful_fixed": "/successful_fixed/",
            "researchers": "/researcher_list/",
            "contact": "/contact/",
        },
    }))
}

async fn docs() -> HttpResponse {
    page("docs", "Documentation")
}

async fn usage() -> HttpResponse {
    page("usage", "Usage")
}

async fn setup() -> HttpResponse {
    page("setup", "Setup")
}

// === GET /dashboard/ (staff only) ===

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub date_filter: Option<String>,
}

async fn show_dashboard(
    pool: web::Data<SqlitePool>,
    query: web::Query<DashboardQuery>,
) -> AppResult<HttpResponse> {
    let counts = dashboard::counts(pool.get_ref(), query.date_filter.as_deref(), Utc::now()).await?;
    Ok(HttpResponse::Ok().json(counts))
}

// === Bugs ===

async fn get_bugs(pool: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    let bugs = store::list_bugs(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(bugs))
}

async fn get_bug(pool: web::Data<SqlitePool>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let detail = store::bug_detail(pool.get_ref(), id)
        .await?
        .ok_or_else(|| AppError::not_found("Bug not found"))?;
    Ok(HttpResponse::Ok().json(detail))
}

// === Contact ===

async fn show_contact_form() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "form": ContactForm::default(),
        "subjects": Subject::choices(),
    }))
}

async fn submit_contact(
    pool: web::Data<SqlitePool>,
    form: web::Form<ContactForm>,
) -> AppResult<HttpResponse> {
    let new = form.validate()?;
    let message = store::insert_contact(pool.get_ref(), &new).await?;
    log::info!("contact message {} received ({})", message.id, message.subject);

    Ok(HttpResponse::Created().json(json!({
        "message": CONTACT_SENT,
        "contact": message,
        "form": ContactForm::default(),
    })))
}

// === Combined bug creation ===

async fn show_create_form() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "form": BugForm::default(),
        "severities": Severity::choices(),
        "categories": Category::choices(),
        "statuses": BugStatus::choices(),
    }))
}

async fn create_bug(
    pool: web::Data<SqlitePool>,
    uploads: web::Data<UploadStore>,
    MultipartForm(upload): MultipartForm<BugUpload>,
) -> AppResult<HttpResponse> {
    let new = BugForm::from(upload).validate()?;
    let created = store::create_bug(pool.get_ref(), uploads.get_ref(), &new).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": BUG_REPORTED,
        "bug": created.bug,
        "media_files": created.media_files,
        "code_files": created.code_files,
        "websites": created.websites,
    })))
}

// === Successful fixes ===

#[derive(Deserialize)]
pub struct FixedBugQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl FixedBugQuery {
    fn to_filter(&self) -> BugFilter {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        BugFilter {
            category: non_empty(&self.category),
            fixed: match self.status.as_deref() {
                Some("fixed") => Some(true),
                Some("not_fixed") => Some(false),
                _ => None,
            },
            search: non_empty(&self.search),
        }
    }
}

async fn list_fixed_bugs(
    pool: web::Data<SqlitePool>,
    query: web::Query<FixedBugQuery>,
) -> AppResult<HttpResponse> {
    let bugs = store::filter_bugs(pool.get_ref(), &query.to_filter()).await?;
    let fixes = store::list_fixes(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "bugs": bugs,
        "fixes": fixes,
        "categories": Category::choices(),
        "current_category": query.category.clone().unwrap_or_default(),
        "current_status": query.status.clone().unwrap_or_default(),
        "current_search": query.search.clone().unwrap_or_default(),
    })))
}

#[derive(Serialize)]
struct BugOption {
    id: i64,
    label: String,
}

impl From<&Bug> for BugOption {
    fn from(bug: &Bug) -> Self {
        Self {
            id: bug.id,
            label: format!("{} ({}, {})", bug.title, bug.severity, bug.category),
        }
    }
}

/// The query string prefills the form. An unknown or malformed `bug` id
/// leaves it without bug context.
async fn show_fix_form(
    pool: web::Data<SqlitePool>,
    web::Query(form): web::Query<FixForm>,
) -> AppResult<HttpResponse> {
    let bug_details = match form.bug_id() {
        Some(id) => store::get_bug(pool.get_ref(), id).await?,
        None => None,
    };
    let bugs: Vec<BugOption> = store::list_bugs_by_id(pool.get_ref())
        .await?
        .iter()
        .map(BugOption::from)
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "form": form,
        "bug_details": bug_details,
        "bugs": bugs,
        "statuses": BugStatus::choices(),
    })))
}

async fn create_fix(
    pool: web::Data<SqlitePool>,
    uploads: web::Data<UploadStore>,
    MultipartForm(upload): MultipartForm<FixUpload>,
) -> AppResult<HttpResponse> {
    let form = FixForm::from(upload);
    let bug = match form.bug_id() {
        Some(id) => store::get_bug(pool.get_ref(), id).await?,
        None => None,
    };
    let new = form.validate(bug.as_ref())?;
    let fix = store::create_fix(pool.get_ref(), uploads.get_ref(), &new).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": FIX_RECORDED,
        "fix": fix,
    })))
}

async fn get_fix(pool: web::Data<SqlitePool>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let fix = store::get_fix(pool.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Fix not found"))?;
    Ok(HttpResponse::Ok().json(fix))
}

// === Researchers ===

async fn list_researchers(
    pool: web::Data<SqlitePool>,
    query: web::Query<ResearcherQuery>,
) -> AppResult<HttpResponse> {
    let listing = researchers::listing(pool.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(listing))
}

async fn researcher_detail(
    pool: web::Data<SqlitePool>,
    path: web::Path<(String, i64)>,
) -> AppResult<HttpResponse> {
    let (category, id) = path.into_inner();
    let detail = researchers::detail(pool.get_ref(), &category, id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

// === POST /login ===

async fn login(config: web::Data<AppConfig>, payload: web::Json<LoginPayload>) -> HttpResponse {
    let Some(secret) = config.jwt_key.as_deref() else {
        return HttpResponse::Unauthorized().json(json!({ "status": "failure" }));
    };
    if !verify_staff(&config, &payload.username, &payload.password) {
        log::warn!("failed staff login for {}", payload.username);
        return HttpResponse::Unauthorized().json(json!({ "status": "failure" }));
    }

    match create_token(&payload.username, secret) {
        Ok(token) => HttpResponse::Ok().json(json!({
            "status": "success",
            "token": token,
        })),
        Err(e) => {
            log::error!("failed to sign staff token: {}", e);
            HttpResponse::InternalServerError().json(json!({ "status": "failure" }))
        }
    }
}

// === Admin (staff only) ===

async fn update_bug(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    patch: web::Json<BugPatch>,
) -> AppResult<HttpResponse> {
    forms::validate_bug_patch(&patch)?;
    let bug = store::update_bug(pool.get_ref(), path.into_inner(), &patch)
        .await?
        .ok_or_else(|| AppError::not_found("Bug not found"))?;
    Ok(HttpResponse::Ok().json(bug))
}

async fn delete_bug(pool: web::Data<SqlitePool>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if !store::delete_bug(pool.get_ref(), id).await? {
        return Err(AppError::not_found("Bug not found"));
    }
    log::info!("deleted bug {}", id);
    Ok(HttpResponse::Ok().json(json!({ "deleted": id })))
}

async fn update_fix(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    patch: web::Json<FixPatch>,
) -> AppResult<HttpResponse> {
    forms::validate_fix_patch(&patch)?;
    let fix = store::resave_fix(pool.get_ref(), path.into_inner(), &patch)
        .await?
        .ok_or_else(|| AppError::not_found("Fix not found"))?;
    Ok(HttpResponse::Ok().json(fix))
}

async fn list_contact_messages(pool: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    let messages = store::list_contact_messages(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(messages))
}
