use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use gamerec_core::{Error, ErrorKind, Mode, RawRecord, Recommender};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_K: usize = 5;

fn default_k() -> usize {
    DEFAULT_K
}

#[derive(Deserialize)]
struct ByNameRequest {
    name: String,
    mode: Mode,
    #[serde(default = "default_k")]
    k: usize,
}

#[derive(Deserialize)]
struct ByProfileRequest {
    profile: RawRecord,
    mode: Mode,
    #[serde(default = "default_k")]
    k: usize,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    items: usize,
    dimension: usize,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(recommender: Recommender, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .configure(|cfg| Self::configure(cfg, recommender.clone()))
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }

    /// Register routes and shared state on an app or test service
    pub fn configure(cfg: &mut web::ServiceConfig, recommender: Recommender) {
        cfg.app_data(web::Data::new(recommender))
            .route("/health", web::get().to(health))
            .route("/items", web::get().to(list_items))
            .route("/recommend/by-name", web::post().to(recommend_by_name))
            .route("/recommend/by-profile", web::post().to(recommend_by_profile));
    }
}

fn error_response(e: &Error) -> HttpResponse {
    let body = serde_json::json!({
        "status": { "error": e.to_string() }
    });
    match e.kind() {
        ErrorKind::Validation => HttpResponse::BadRequest().json(body),
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::ArtifactMismatch | ErrorKind::Computation => {
            warn!(error = %e, "recommendation failed");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

async fn health(recommender: web::Data<Recommender>) -> ActixResult<HttpResponse> {
    let snapshot = recommender.snapshot();
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        items: snapshot.len(),
        dimension: snapshot.dim(),
    }))
}

async fn list_items(recommender: web::Data<Recommender>) -> ActixResult<HttpResponse> {
    let mut names: Vec<&str> = recommender.item_names().iter().map(String::as_str).collect();
    names.sort_unstable();
    Ok(HttpResponse::Ok().json(names))
}

async fn recommend_by_name(
    recommender: web::Data<Recommender>,
    req: web::Json<ByNameRequest>,
) -> ActixResult<HttpResponse> {
    debug!(name = %req.name, mode = %req.mode, k = req.k, "recommend by name");
    match recommender.recommend_by_name(&req.name, req.mode, req.k) {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn recommend_by_profile(
    recommender: web::Data<Recommender>,
    req: web::Json<ByProfileRequest>,
) -> ActixResult<HttpResponse> {
    debug!(mode = %req.mode, k = req.k, fields = req.profile.len(), "recommend by profile");
    match recommender.recommend_by_profile(&req.profile, req.mode, req.k) {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(e) => Ok(error_response(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};
    use gamerec_core::{
        ArtifactParts, ArtifactSnapshot, ColumnScale, FeatureSchema, FeatureTable, Recommendations,
        ScalerParams, Vocabulary,
    };
    use serde_json::json;
    use std::sync::Arc;

    fn recommender() -> Recommender {
        let schema = FeatureSchema::new(vec!["NA_Sales".into()], vec!["Genre".into()]);
        let scaler = ScalerParams::new(vec![ColumnScale::new("NA_Sales", 0.0, 10.0)]);
        let vocabulary = Vocabulary::new(vec!["Genre_Puzzle".into(), "Genre_Sports".into()]);
        let table = FeatureTable::from_rows(&[
            vec![0.1, 1.0, 0.0],
            vec![0.9, 0.0, 1.0],
            vec![0.2, 1.0, 0.0],
        ])
        .unwrap();
        let names = vec!["Tetris".into(), "Wii Sports".into(), "Dr. Mario".into()];
        let parts = ArtifactParts::derive(schema, scaler, vocabulary, names, table);
        Recommender::new(Arc::new(ArtifactSnapshot::new(parts).unwrap()))
    }

    #[actix_web::test]
    async fn test_items_sorted() {
        let app = test::init_service(App::new().configure(|c| RestApi::configure(c, recommender()))).await;
        let req = test::TestRequest::get().uri("/items").to_request();
        let items: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(items, vec!["Dr. Mario", "Tetris", "Wii Sports"]);
    }

    #[actix_web::test]
    async fn test_by_name() {
        let app = test::init_service(App::new().configure(|c| RestApi::configure(c, recommender()))).await;
        let req = test::TestRequest::post()
            .uri("/recommend/by-name")
            .set_json(json!({ "name": "Tetris", "mode": "knn", "k": 1 }))
            .to_request();
        let result: Recommendations = test::call_and_read_body_json(&app, req).await;
        assert_eq!(result.mode, Mode::Distance);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].name, "Dr. Mario");
    }

    #[actix_web::test]
    async fn test_by_profile_default_k() {
        let app = test::init_service(App::new().configure(|c| RestApi::configure(c, recommender()))).await;
        let req = test::TestRequest::post()
            .uri("/recommend/by-profile")
            .set_json(json!({
                "profile": { "NA_Sales": 8.0, "Genre": "Sports" },
                "mode": "similarity"
            }))
            .to_request();
        let result: Recommendations = test::call_and_read_body_json(&app, req).await;
        assert_eq!(result.items.len(), 3);
        assert_eq!(result.items[0].name, "Wii Sports");
    }

    #[actix_web::test]
    async fn test_error_statuses() {
        let app = test::init_service(App::new().configure(|c| RestApi::configure(c, recommender()))).await;

        let unknown = test::TestRequest::post()
            .uri("/recommend/by-name")
            .set_json(json!({ "name": "Zork", "mode": "distance" }))
            .to_request();
        assert_eq!(test::call_service(&app, unknown).await.status(), StatusCode::NOT_FOUND);

        let missing = test::TestRequest::post()
            .uri("/recommend/by-profile")
            .set_json(json!({ "profile": { "Genre": "Sports" }, "mode": "distance" }))
            .to_request();
        assert_eq!(test::call_service(&app, missing).await.status(), StatusCode::BAD_REQUEST);

        let zero = test::TestRequest::post()
            .uri("/recommend/by-name")
            .set_json(json!({ "name": "Tetris", "mode": "cosine", "k": 0 }))
            .to_request();
        assert_eq!(test::call_service(&app, zero).await.status(), StatusCode::BAD_REQUEST);
    }
}
