//! HTTP handlers and route configuration.

mod health;
mod posts;
mod search;
mod share;

use actix_web::{HttpResponse, http::header, web};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        // Listing
        .route("/", web::get().to(posts::post_list))
        .route("/tag/{tag_slug}/", web::get().to(posts::post_list_by_tag))
        // Search
        .route("/search/", web::get().to(search::post_search))
        // Share by email
        .service(
            web::resource(r"/{post_id:\d+}/share/")
                .route(web::get().to(share::share_form))
                .route(web::post().to(share::share_post)),
        )
        // Detail and comments
        .service(
            web::resource(r"/{year:\d+}/{month:\d+}/{day:\d+}/{slug}/")
                .route(web::get().to(posts::post_detail))
                .route(web::post().to(posts::post_comment)),
        );
}

/// Redirect after a successful form submission.
pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use actix_web::{App, http::StatusCode, test};
    use tracing_subscriber::layer::SubscriberExt;
    use blog_core::domain::{Author, Post, PostStatus, Tag};
    use blog_core::views::ShareSettings;
    use blog_infra::{InMemoryContentStore, InMemoryMailer};
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    use super::*;
    use crate::state::AppState;

    fn post(id: i64, slug: &str, day: u32, status: PostStatus) -> Post {
        let publish = Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap();
        Post {
            id,
            title: slug.to_string(),
            slug: slug.to_string(),
            author: Author {
                id: 1,
                username: "admin".into(),
            },
            body: format!("Notes on {slug}"),
            publish,
            created_at: publish,
            updated_at: publish,
            status,
            tags: vec![Tag::new(1, "Rust", "rust")],
        }
    }

    async fn fixture() -> (AppState, Arc<InMemoryContentStore>, Arc<InMemoryMailer>) {
        let store = Arc::new(InMemoryContentStore::new());
        store
            .add_post(post(1, "ownership", 7, PostStatus::Published))
            .await;
        store
            .add_post(post(2, "borrowing", 5, PostStatus::Published))
            .await;
        store.add_post(post(3, "lifetimes", 6, PostStatus::Draft)).await;

        let mailer = Arc::new(InMemoryMailer::new());
        let share = ShareSettings {
            sender: "blog@example.com".into(),
        };
        let state = AppState::in_memory(store.clone(), mailer.clone(), share);
        (state, store, mailer)
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_list_returns_published_posts() {
        let (state, _, _) = fixture().await;
        let app = app!(state);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["page"]["total_items"], 2);
        assert_eq!(body["page"]["items"][0]["slug"], "ownership");
        assert!(body["tag"].is_null());
    }

    #[actix_web::test]
    async fn test_unknown_tag_is_404() {
        let (state, _, _) = fixture().await;
        let app = app!(state);

        let req = test::TestRequest::get().uri("/tag/python/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], 404);
    }

    #[actix_web::test]
    async fn test_page_out_of_range_is_404() {
        let (state, _, _) = fixture().await;
        let app = app!(state);

        let req = test::TestRequest::get().uri("/?page=9").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_detail_and_wrong_date() {
        let (state, _, _) = fixture().await;
        let app = app!(state);

        let req = test::TestRequest::get().uri("/2024/3/7/ownership/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["post"]["id"], 1);
        assert_eq!(body["similar_posts"][0]["id"], 2);

        let req = test::TestRequest::get().uri("/2024/3/8/ownership/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_valid_comment_redirects_to_post() {
        let (state, store, _) = fixture().await;
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/2024/03/07/ownership/")
            .set_form([("name", "Ann"), ("email", "ann@example.com"), ("body", "Nice")])
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/2024/3/7/ownership/"
        );
        assert_eq!(store.comments_of(1).await.len(), 1);
    }

    #[actix_web::test]
    async fn test_invalid_comment_rerenders_without_storing() {
        let (state, store, _) = fixture().await;
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/2024/3/7/ownership/")
            .set_form([("name", "Ann"), ("email", "ann-at-example"), ("body", "Nice")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["form"]["is_valid"], false);
        assert_eq!(body["form"]["data"]["email"], "ann-at-example");
        assert!(body["form"]["errors"]["email"].is_array());
        assert!(store.comments_of(1).await.is_empty());
    }

    #[actix_web::test]
    async fn test_share_flow() {
        let (state, _, mailer) = fixture().await;
        let app = app!(state);

        let req = test::TestRequest::get().uri("/1/share/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(mailer.sent().await.is_empty());

        let req = test::TestRequest::post()
            .uri("/1/share/")
            .set_form([("name", "Ann"), ("email", "ann@example.com")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(mailer.sent().await.is_empty());

        let req = test::TestRequest::post()
            .uri("/1/share/")
            .insert_header((header::HOST, "blog.test"))
            .set_form([
                ("name", "Ann"),
                ("email", "ann@example.com"),
                ("to", "bob@example.com"),
                ("comment", ""),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "bob@example.com");
        assert!(sent[0].body.contains("http://blog.test/2024/3/7/ownership/"));
    }

    /// Collects the fields of every event as `name=value` lines.
    #[derive(Clone, Default)]
    struct LogCapture {
        lines: Arc<Mutex<Vec<String>>>,
    }

    #[derive(Default)]
    struct FieldVisitor(Vec<String>);

    impl tracing::field::Visit for FieldVisitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            self.0.push(format!("{}={:?}", field.name(), value));
        }
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LogCapture {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut visitor = FieldVisitor::default();
            event.record(&mut visitor);
            self.lines.lock().unwrap().push(visitor.0.join(" "));
        }
    }

    #[actix_web::test]
    async fn test_share_logs_only_masked_addresses() {
        let capture = LogCapture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let _guard = tracing::subscriber::set_default(subscriber);

        let (state, _, mailer) = fixture().await;
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/1/share/")
            .set_form([
                ("name", "Ann"),
                ("email", "secret.sender@example.com"),
                ("to", "bob@example.com"),
                ("comment", "Worth it"),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(mailer.sent().await.len(), 1);

        let lines = capture.lines.lock().unwrap().clone();
        assert!(lines.iter().any(|l| l.contains("b***@example.com")));
        for line in &lines {
            assert!(!line.contains("secret.sender@"), "{line}");
            assert!(!line.contains("bob@example.com"), "{line}");
            assert!(!line.contains("blog@example.com"), "{line}");
        }
    }

    #[actix_web::test]
    async fn test_share_draft_or_non_numeric_id_is_404() {
        let (state, _, _) = fixture().await;
        let app = app!(state);

        for uri in ["/3/share/", "/abc/share/"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[actix_web::test]
    async fn test_search() {
        let (state, _, _) = fixture().await;
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri("/search/?query=ownership")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["results"][0]["post"]["slug"], "ownership");

        let req = test::TestRequest::get().uri("/search/?query=cobol").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["results"].as_array().map(Vec::len), Some(0));

        let req = test::TestRequest::get().uri("/search/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["form"]["is_bound"], false);
    }

    #[actix_web::test]
    async fn test_health_reports_memory_store() {
        let (state, _, _) = fixture().await;
        let app = app!(state);

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "memory");
    }
}
