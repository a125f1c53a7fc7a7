//! Drives the catalog client and browse state against a live server.

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use tokio::net::TcpListener;

use recipe_catalog::app::build_app;
use recipe_catalog::client::browse::BrowseState;
use recipe_catalog::client::{Action, CatalogClient, ClientError, SearchFilters};

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });
    format!("http://{}", addr)
}

async fn spawn_catalog() -> String {
    spawn(build_app(common::seeded_state().await)).await
}

#[tokio::test]
async fn client_lists_and_searches() -> anyhow::Result<()> {
    let client = CatalogClient::new(spawn_catalog().await)?;

    let page = client.list(0, 3).await?;
    assert_eq!(page.data.len(), 3);
    assert_eq!(page.total, common::FIXTURE_ROWS);
    assert_eq!(page.data[0].title, "Tomato Soup");

    let filters = SearchFilters {
        title: "Cake".into(),
        calories: "<=300".into(),
        rating: String::new(),
    };
    let found = client.search(&filters).await?;
    assert_eq!(found.len(), 4);
    assert!(found.iter().all(|r| r.title.to_lowercase().contains("cake")));
    Ok(())
}

#[tokio::test]
async fn browse_state_paginates_and_searches() -> anyhow::Result<()> {
    let client = CatalogClient::new(spawn_catalog().await)?;
    let mut state = BrowseState::default();

    state.change_page_size(&client, 3).await;
    assert_eq!(state.recipes.len(), 3);
    assert_eq!(state.page_count(), 3);

    state.change_page(&client, 3).await;
    assert_eq!(state.recipes.len(), 1);
    assert_eq!(state.recipes[0].title, "Lemon Cake Bars");

    state.filters.title = "Soup".into();
    state.search(&client).await;
    assert!(state.search_mode);
    assert_eq!(state.page, 1);
    assert_eq!(state.recipes.len(), 1);

    // page changes while searching do not refetch
    state.change_page(&client, 2).await;
    assert_eq!(state.recipes.len(), 1);

    state.reset(&client).await;
    assert!(!state.search_mode);
    assert!(state.filters.is_empty());
    assert_eq!(state.recipes.len(), 3);
    assert!(state.error.is_none());
    Ok(())
}

#[tokio::test]
async fn headers_too_large_is_reported() -> anyhow::Result<()> {
    let app = Router::new().route(
        "/api/recipes/",
        get(|| async { StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE }),
    );
    let client = CatalogClient::new(spawn(app).await)?;

    let err = client.list(0, 10).await.unwrap_err();
    assert!(matches!(err, ClientError::HeadersTooLarge));

    let mut state = BrowseState::default();
    state.fetch(&client).await;
    assert_eq!(state.error, Some(err.user_message(Action::Fetch)));
    Ok(())
}

#[tokio::test]
async fn slow_server_times_out() -> anyhow::Result<()> {
    let app = Router::new().route(
        "/api/recipes/search/",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "[]"
        }),
    );
    let client = CatalogClient::with_timeout(spawn(app).await, Duration::from_millis(200))?;

    let err = client.search(&SearchFilters::default()).await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout), "got {err:?}");

    let mut state = BrowseState::default();
    state.search(&client).await;
    assert_eq!(state.error, Some("Search timeout. Please try again."));
    assert!(!state.search_mode);
    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_a_generic_failure() -> anyhow::Result<()> {
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let client = CatalogClient::new(format!("http://{}", addr))?;
    let mut state = BrowseState::default();
    state.fetch(&client).await;
    assert_eq!(
        state.error,
        Some("Failed to fetch recipes. Please make sure the backend server is running.")
    );
    Ok(())
}

#[tokio::test]
async fn bad_filter_surfaces_status_error() -> anyhow::Result<()> {
    let client = CatalogClient::new(spawn_catalog().await)?;
    let filters = SearchFilters {
        rating: "lots".into(),
        ..Default::default()
    };
    let err = client.search(&filters).await.unwrap_err();
    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body.contains("rating"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}
