use actix_web::web;

use crate::models::note::MAX_NOTE_SIZE;

pub mod note;

/// Largest accepted request body. Leaves room for a note of `MAX_NOTE_SIZE`
/// bytes even when every byte is escaped as `\u00XX` in the JSON body.
pub const MAX_REQUEST_BODY: usize = MAX_NOTE_SIZE * 6 + 1024;

pub async fn index() -> impl actix_web::Responder {
    actix_web::HttpResponse::Ok().finish()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().limit(MAX_REQUEST_BODY))
        .route("/", web::get().to(index))
        .service(
            web::scope("/notes")
                .route("", web::post().to(note::new))
                .route("/{id}", web::get().to(note::get))
                .route("/{id}/unlock", web::post().to(note::unlock))
                .route("/{id}/delete", web::post().to(note::del)),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use std::sync::Arc;

    use crate::store::{backend::MemoryBackend, credential::CredentialGuard, NoteStore};

    #[actix_web::test]
    async fn index_is_ok() {
        let app = test::init_service(App::new().configure(configure)).await;
        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    macro_rules! post_content {
        ($content:expr) => {{
            let store = NoteStore::new(Arc::new(MemoryBackend::new()), CredentialGuard::fast());
            let app = test::init_service(
                App::new()
                    .app_data(web::Data::new(store))
                    .configure(configure),
            )
            .await;
            let req = test::TestRequest::post()
                .uri("/notes")
                .set_json(serde_json::json!({ "content": $content }))
                .to_request();
            test::call_service(&app, req).await.status()
        }};
    }

    #[actix_web::test]
    async fn content_at_the_limit_is_accepted() {
        assert_eq!(post_content!("a".repeat(MAX_NOTE_SIZE)), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn content_over_the_limit_is_rejected() {
        assert_eq!(
            post_content!("a".repeat(MAX_NOTE_SIZE + 1)),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[actix_web::test]
    async fn escaped_content_under_the_limit_is_accepted() {
        assert_eq!(post_content!("\"".repeat(3_000_000)), StatusCode::CREATED);
        assert_eq!(post_content!("\u{1}".repeat(1_000_000)), StatusCode::CREATED);
    }
}
