#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_web::{web, App, HttpResponse, HttpServer};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::json;

/// Mutable backend fixture. `None` in an endpoint's field makes that
/// endpoint answer 500 so fallback paths can be exercised.
#[derive(Default)]
pub struct BackendState {
    pub sections_role: Mutex<Option<String>>,
    pub sections: Mutex<Vec<String>>,
    pub profile_role: Mutex<Option<String>>,
    pub permissions: Mutex<Option<HashMap<String, bool>>>,
    /// When set, the scoped permissions endpoint answers 200 without a
    /// permissions map, as some deployments do.
    pub scoped_map_omitted: Mutex<bool>,
    pub maintenance: Mutex<Option<HashMap<String, bool>>>,
    pub config_api: Mutex<Option<String>>,
    /// Total requests served, for asserting that a path made no calls.
    pub requests: Mutex<usize>,
}

impl BackendState {
    fn hit(&self) {
        *self.requests.lock().unwrap() += 1;
    }

    pub fn request_count(&self) -> usize {
        *self.requests.lock().unwrap()
    }
}

pub struct MockBackend {
    pub base: String,
    pub state: Arc<BackendState>,
}

pub async fn spawn(state: BackendState) -> MockBackend {
    let state = Arc::new(state);
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let data = web::Data::from(state.clone());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route("/api/rbac/sections", web::get().to(sections))
            .route("/api/auth/profile/me", web::get().to(profile))
            .route("/api/permissions/me", web::get().to(permissions))
            .route("/api/auth/permissions", web::get().to(auth_permissions))
            .route(
                "/api/system/maintenance-pages",
                web::get().to(maintenance_pages),
            )
            .route("/api/website/config", web::get().to(website_config))
    })
    .listen(listener)
    .unwrap()
    .workers(1)
    .run();
    actix_web::rt::spawn(server);

    MockBackend {
        base: format!("http://127.0.0.1:{port}"),
        state,
    }
}

async fn sections(state: web::Data<BackendState>) -> HttpResponse {
    state.hit();
    let role = state.sections_role.lock().unwrap().clone();
    match role {
        Some(role) => HttpResponse::Ok().json(json!({
            "success": true,
            "role": role,
            "allowedSections": state.sections.lock().unwrap().clone(),
        })),
        None => HttpResponse::InternalServerError().json(json!({ "success": false })),
    }
}

async fn profile(state: web::Data<BackendState>) -> HttpResponse {
    state.hit();
    let role = state.profile_role.lock().unwrap().clone();
    match role {
        Some(role) => HttpResponse::Ok().json(json!({
            "success": true,
            "profile": { "id": "user-1", "role": role, "project_name": "Test Label" },
        })),
        None => HttpResponse::InternalServerError().json(json!({ "success": false })),
    }
}

async fn permissions(state: web::Data<BackendState>) -> HttpResponse {
    state.hit();
    if *state.scoped_map_omitted.lock().unwrap() {
        return HttpResponse::Ok().json(json!({
            "role": state.profile_role.lock().unwrap().clone(),
        }));
    }
    let map = state.permissions.lock().unwrap().clone();
    match map {
        Some(map) => HttpResponse::Ok().json(json!({
            "role": state.profile_role.lock().unwrap().clone(),
            "permissions": map,
        })),
        None => HttpResponse::InternalServerError().finish(),
    }
}

async fn auth_permissions(state: web::Data<BackendState>) -> HttpResponse {
    state.hit();
    let map = state.permissions.lock().unwrap().clone();
    match map {
        Some(map) => HttpResponse::Ok().json(json!({
            "success": true,
            "permissions": map,
        })),
        None => HttpResponse::InternalServerError().finish(),
    }
}

async fn maintenance_pages(state: web::Data<BackendState>) -> HttpResponse {
    state.hit();
    let pages = state.maintenance.lock().unwrap().clone();
    match pages {
        Some(pages) => HttpResponse::Ok().json(json!({ "pages": pages })),
        None => HttpResponse::InternalServerError().finish(),
    }
}

async fn website_config(state: web::Data<BackendState>) -> HttpResponse {
    state.hit();
    let api = state.config_api.lock().unwrap().clone();
    match api {
        Some(api) => HttpResponse::Ok().json(json!({
            "success": true,
            "config": { "apiBase": api, "domain": "portal.example.com" },
        })),
        None => HttpResponse::InternalServerError().finish(),
    }
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    role: String,
    exp: usize,
}

/// Signed test token carrying a role claim. The client never verifies
/// the signature, any key works.
pub fn make_token(role: &str) -> String {
    let claims = TestClaims {
        sub: String::from("user-1"),
        role: String::from(role),
        exp: 4102444800,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-signing-key"),
    )
    .unwrap()
}
