//! End-to-end tests against a running server

use reqwest::{header, redirect::Policy, Client, StatusCode};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8080";

/// Client that reports redirects instead of following them
fn client() -> Client {
    Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

/// Name that does not collide with earlier runs against the same database
fn unique(prefix: &str) -> String {
    format!("{} {}", prefix, chrono::Utc::now().timestamp_micros())
}

fn location(response: &reqwest::Response) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .expect("Location is not text")
        .to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let response = client()
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let response = client()
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_root_redirects_to_books() {
    let response = client()
        .get(BASE_URL)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/books");
}

#[tokio::test]
#[ignore]
async fn test_genre_save_and_search() {
    let client = client();
    let name = unique("Genre");

    let response = client
        .post(format!("{}/genres/save", BASE_URL))
        .form(&[("name", name.as_str()), ("description", "")])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/genres?success="));

    let html = client
        .get(format!("{}/genres", BASE_URL))
        .query(&[("search", name.as_str())])
        .send()
        .await
        .expect("Failed to send request")
        .text()
        .await
        .expect("Failed to read body");

    assert!(html.contains(&name));
    assert!(html.contains("Total: 1"));
}

#[tokio::test]
#[ignore]
async fn test_duplicate_genre_rerenders_form() {
    let client = client();
    let name = unique("Duplicate");

    for _ in 0..2 {
        client
            .post(format!("{}/genres/save", BASE_URL))
            .form(&[("name", name.as_str())])
            .send()
            .await
            .expect("Failed to send request");
    }

    let response = client
        .post(format!("{}/genres/save", BASE_URL))
        .form(&[("name", name.to_uppercase().as_str())])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.expect("Failed to read body");
    assert!(html.contains("A genre with this name already exists"));
}

#[tokio::test]
#[ignore]
async fn test_unknown_book_view_redirects_with_error() {
    let response = client()
        .get(format!("{}/books/view/2147483647", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/books?error="));
}

#[tokio::test]
#[ignore]
async fn test_invalid_book_rerenders_form_with_input() {
    let title = unique("Orphan");

    let response = client()
        .post(format!("{}/books/save", BASE_URL))
        .form(&[
            ("title", title.as_str()),
            ("authorId", "2147483647"),
            ("genreId", "2147483647"),
            ("publicationYear", "1951"),
            ("isbn", "123"),
        ])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.expect("Failed to read body");
    assert!(html.contains("Could not save book"));
    assert!(html.contains(&title));
}

/// Id of the single row a filtered list page links to
async fn find_id(client: &Client, entity: &str, search: &str) -> String {
    let html = client
        .get(format!("{}/{}", BASE_URL, entity))
        .query(&[("search", search)])
        .send()
        .await
        .expect("Failed to send request")
        .text()
        .await
        .expect("Failed to read body");

    let marker = format!("/{}/view/", entity);
    let start = html.find(&marker).expect("No row in list") + marker.len();
    html[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect()
}

async fn post_form(client: &Client, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
    client
        .post(format!("{}{}", BASE_URL, path))
        .form(form)
        .send()
        .await
        .expect("Failed to send request")
}

async fn get(client: &Client, path: &str) -> reqwest::Response {
    client
        .get(format!("{}{}", BASE_URL, path))
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
#[ignore]
async fn test_catalog_scenario() {
    let client = client();
    let genre_name = unique("Sci-Fi");
    let last_name = unique("Asimov");
    let title = unique("Foundation");

    let response = post_form(&client, "/genres/save", &[("name", genre_name.as_str())]).await;
    assert!(location(&response).starts_with("/genres?success="));
    let genre_id = find_id(&client, "genres", &genre_name).await;

    let response = post_form(
        &client,
        "/authors/save",
        &[("firstName", "Isaac"), ("lastName", last_name.as_str())],
    )
    .await;
    assert!(location(&response).starts_with("/authors?success="));
    let author_id = find_id(&client, "authors", &last_name).await;

    let response = post_form(
        &client,
        "/books/save",
        &[
            ("title", title.as_str()),
            ("authorId", author_id.as_str()),
            ("genreId", genre_id.as_str()),
            ("publicationYear", "1951"),
            ("isbn", "123"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/books?success="));

    // Joined search on the author's last name
    let html = client
        .get(format!("{}/books", BASE_URL))
        .query(&[("search", last_name.to_lowercase().as_str())])
        .send()
        .await
        .expect("Failed to send request")
        .text()
        .await
        .expect("Failed to read body");
    assert!(html.contains(&title));
    assert!(html.contains(&genre_name));
    assert!(html.contains("Total: 1"));
    let book_id = find_id(&client, "books", &title).await;

    let response = get(&client, &format!("/genres/delete/{}", genre_id)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/genres?error=Cannot+delete+genre"));
    let response = get(&client, &format!("/genres/view/{}", genre_id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&client, &format!("/authors/delete/{}", author_id)).await;
    assert!(location(&response).starts_with("/authors?error=Cannot+delete+author"));

    let response = get(&client, &format!("/books/delete/{}", book_id)).await;
    assert_eq!(location(&response), "/books?deleted=Book+deleted");

    let response = get(&client, &format!("/genres/delete/{}", genre_id)).await;
    assert_eq!(location(&response), "/genres?deleted=Genre+deleted");
    let response = get(&client, &format!("/genres/view/{}", genre_id)).await;
    assert!(location(&response).starts_with("/genres?error="));

    let response = get(&client, &format!("/authors/delete/{}", author_id)).await;
    assert_eq!(location(&response), "/authors?deleted=Author+deleted");
}
