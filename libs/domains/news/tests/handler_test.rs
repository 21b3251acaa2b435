//! Handler tests for the news endpoints

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use domain_news::*;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

struct Fixture {
    app: Router,
    launch: Uuid,
    tips: Uuid,
    draft: Uuid,
}

fn fixture() -> Fixture {
    let author = Uuid::now_v7();
    let now = Utc::now();

    let launch = Article::draft(
        "New paediatric syrup range",
        "Three sugar-free formulations",
        "The range ships to distributors next month.",
        NewsCategory::ProductLaunch,
        author,
    )
    .published_at(now - Duration::days(1))
    .featured();
    let tips = Article::draft(
        "Storing insulin in summer",
        "Keep it between 2 and 8 degrees",
        "Pharmacies should audit their cold storage weekly.",
        NewsCategory::HealthTips,
        author,
    )
    .published_at(now - Duration::days(3));
    let draft = Article::draft(
        "Quarterly results",
        "Embargoed",
        "Not for release.",
        NewsCategory::CompanyNews,
        author,
    );

    let ids = (launch.id, tips.id, draft.id);
    let repository = InMemoryNewsRepository::with_articles([launch, tips, draft]);

    Fixture {
        app: handlers::router(NewsService::new(repository)),
        launch: ids.0,
        tips: ids.1,
        draft: ids.2,
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn ids(body: &Value) -> Vec<String> {
    body["data"]["news"]
        .as_array()
        .unwrap()
        .iter()
        .map(|article| article["_id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_list_excludes_drafts_and_content() {
    let fixture = fixture();
    let (status, body) = get(&fixture.app, "/news").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        ids(&body),
        vec![fixture.launch.to_string(), fixture.tips.to_string()]
    );
    assert!(body["data"]["news"][0].get("content").is_none());
    assert_eq!(body["data"]["pagination"]["totalArticles"], 2);
    assert_eq!(body["data"]["pagination"]["hasNext"], false);
}

#[tokio::test]
async fn test_list_filters() {
    let fixture = fixture();

    let (_, body) = get(&fixture.app, "/news?category=health-tips").await;
    assert_eq!(ids(&body), vec![fixture.tips.to_string()]);

    let (_, body) = get(&fixture.app, "/news?featured=true").await;
    assert_eq!(ids(&body), vec![fixture.launch.to_string()]);

    let (status, body) = get(&fixture.app, "/news?category=gossip").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid value 'gossip' for category");
}

#[tokio::test]
async fn test_article_view_counts_reads() {
    let fixture = fixture();
    let uri = format!("/news/{}", fixture.tips);

    let (status, body) = get(&fixture.app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["news"]["views"], 1);
    assert_eq!(body["data"]["news"]["slug"], "storing-insulin-in-summer");
    assert!(body["data"]["news"]["content"].is_string());

    let (_, body) = get(&fixture.app, &uri).await;
    assert_eq!(body["data"]["news"]["views"], 2);
}

#[tokio::test]
async fn test_article_view_rejections() {
    let fixture = fixture();

    let (status, body) = get(&fixture.app, &format!("/news/{}", fixture.draft)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Article not found");

    let (status, _) = get(&fixture.app, &format!("/news/{}", Uuid::now_v7())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&fixture.app, "/news/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
