use when2fly_common::db::DbThreadPool;
use when2fly_common::store::Store;

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::env;

#[derive(Deserialize)]
pub struct HealthKeyQuery {
    pub key: Option<String>,
}

pub async fn heartbeat() -> impl Responder {
    HttpResponse::Ok()
}

pub async fn health(
    store: web::Data<Store>,
    db_thread_pool: Option<web::Data<DbThreadPool>>,
    query: web::Query<HealthKeyQuery>,
) -> impl Responder {
    if !is_health_key_correct(query.key.as_deref()) {
        return HttpResponse::Unauthorized().finish();
    }

    let db_pool_state = db_thread_pool.map(|pool| {
        let state = pool.state();
        json!({
            "connections": state.connections,
            "idle_connections": state.idle_connections,
        })
    });

    HttpResponse::Ok().json(json!({
        "storage_backend": store.backend.name(),
        "db_thread_pool_state": db_pool_state,
    }))
}

#[inline]
fn is_health_key_correct(key: Option<&str>) -> bool {
    let Some(key) = key else {
        return false;
    };

    let correct_key = env::CONF.health_endpoint_key.as_bytes();
    let key = key.as_bytes();

    if correct_key.len() != key.len() || key.is_empty() {
        return false;
    }

    // Bitwise comparison so the time taken doesn't depend on where the keys differ
    let keys_dont_match = correct_key
        .iter()
        .zip(key)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));

    keys_dont_match == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::{self, TestRequest};
    use actix_web::web::Data;
    use actix_web::App;

    use crate::env::testing::HEALTH_ENDPOINT_KEY;
    use crate::handlers::test_utils;

    #[actix_rt::test]
    async fn test_heartbeat() {
        let app =
            test::init_service(App::new().route("/heartbeat", web::get().to(heartbeat))).await;

        let req = TestRequest::get().uri("/heartbeat").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    }

    #[actix_rt::test]
    async fn test_health_with_valid_key() {
        let (store, _) = test_utils::memory_store();
        let app = test::init_service(
            App::new()
                .app_data(Data::new(store))
                .route("/health", web::get().to(health)),
        )
        .await;

        let req = TestRequest::get()
            .uri(&format!("/health?key={HEALTH_ENDPOINT_KEY}"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

        let resp_json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(resp_json["storage_backend"], "memory");
        assert!(resp_json["db_thread_pool_state"].is_null());
    }

    #[actix_rt::test]
    async fn test_health_with_bad_keys() {
        let (store, _) = test_utils::memory_store();
        let app = test::init_service(
            App::new()
                .app_data(Data::new(store))
                .route("/health", web::get().to(health)),
        )
        .await;

        for uri in [
            "/health",
            "/health?key=",
            "/health?key=short",
            "/health?key=test-health-kez",
        ] {
            let req = TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(
                resp.status(),
                actix_web::http::StatusCode::UNAUTHORIZED,
                "{uri}"
            );
        }
    }
}
