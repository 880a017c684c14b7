use base64::Engine;
use bitbucket_fetch::bitbucket::ClientOptions;
use bitbucket_fetch::{BitbucketCredentials, ClientType, FetchError};
use serde_json::json;
use std::time::{Duration, Instant};

fn user_password_credentials(url: String) -> BitbucketCredentials {
    BitbucketCredentials::new(
        None,
        Some("testuser".to_string()),
        Some("testpass".to_string()),
        Some(url),
    )
    .unwrap()
}

/// Cloud clients verify credentials against `/2.0/user` with Basic auth
#[tokio::test]
async fn test_cloud_connection_with_basic_auth() {
    let mut server = mockito::Server::new_async().await;
    let expected_auth = format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode("testuser:testpass")
    );

    let user_mock = server
        .mock("GET", "/2.0/user")
        .match_header("authorization", expected_auth.as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "username": "testuser" }).to_string())
        .create_async()
        .await;

    let client = user_password_credentials(server.url())
        .get_client(ClientType::Cloud)
        .unwrap();
    client.test_connection().await.unwrap();

    user_mock.assert_async().await;
}

/// Server clients use the 1.0 REST API root
#[tokio::test]
async fn test_local_connection() {
    let mut server = mockito::Server::new_async().await;

    let properties_mock = server
        .mock("GET", "/rest/api/1.0/application-properties")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "version": "8.9.0", "displayName": "Bitbucket" }).to_string())
        .create_async()
        .await;

    let client = user_password_credentials(server.url())
        .get_client("LOCAL".parse().unwrap())
        .unwrap();
    client.test_connection().await.unwrap();

    properties_mock.assert_async().await;
}

/// Token-only credentials authenticate with a Bearer header
#[tokio::test]
async fn test_token_uses_bearer_auth() {
    let mut server = mockito::Server::new_async().await;

    let user_mock = server
        .mock("GET", "/2.0/user")
        .match_header("authorization", "Bearer repo-token")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let credentials = BitbucketCredentials::new(
        Some("x-token-auth:repo-token".to_string()),
        None,
        None,
        Some(server.url()),
    )
    .unwrap();
    credentials
        .get_client(ClientType::Cloud)
        .unwrap()
        .test_connection()
        .await
        .unwrap();

    user_mock.assert_async().await;
}

/// Rejected credentials surface the status code
#[tokio::test]
async fn test_unauthorized_connection() {
    let mut server = mockito::Server::new_async().await;

    let _unauthorized = server
        .mock("GET", "/2.0/user")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(json!({ "error": { "message": "Invalid credentials" } }).to_string())
        .create_async()
        .await;

    let client = user_password_credentials(server.url())
        .get_client(ClientType::Cloud)
        .unwrap();
    let err = client.test_connection().await.unwrap_err();

    assert!(matches!(err, FetchError::Bitbucket { status: 401, .. }));
    assert!(err.to_string().contains("Invalid credentials"));
}

/// Repository details and clone links from Bitbucket Cloud
#[tokio::test]
async fn test_get_cloud_repository() {
    let mut server = mockito::Server::new_async().await;

    let _repo_mock = server
        .mock("GET", "/2.0/repositories/my-workspace/my-repository")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "name": "My Repository",
                "slug": "my-repository",
                "description": "Flow code",
                "is_private": true,
                "links": {
                    "clone": [
                        { "name": "https", "href": "https://testuser@bitbucket.org/my-workspace/my-repository.git" },
                        { "name": "ssh", "href": "git@bitbucket.org:my-workspace/my-repository.git" }
                    ]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = user_password_credentials(server.url())
        .get_client(ClientType::Cloud)
        .unwrap();
    let info = client
        .get_repository("my-workspace", "my-repository")
        .await
        .unwrap();

    assert_eq!(info.slug, "my-repository");
    assert_eq!(info.description.as_deref(), Some("Flow code"));
    assert_eq!(
        info.https_clone_url(),
        Some("https://testuser@bitbucket.org/my-workspace/my-repository.git")
    );
    assert_eq!(
        info.ssh_clone_url(),
        Some("git@bitbucket.org:my-workspace/my-repository.git")
    );
}

/// Repository details from Bitbucket Server
#[tokio::test]
async fn test_get_server_repository() {
    let mut server = mockito::Server::new_async().await;

    let _repo_mock = server
        .mock("GET", "/rest/api/1.0/projects/PROJ/repos/flows")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": 1,
                "name": "flows",
                "slug": "flows",
                "project": { "key": "PROJ" },
                "links": {
                    "clone": [
                        { "name": "http", "href": "https://bitbucket.example.com/scm/proj/flows.git" }
                    ],
                    "self": [{ "href": "https://bitbucket.example.com/projects/PROJ/repos/flows/browse" }]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = user_password_credentials(server.url())
        .get_client(ClientType::Local)
        .unwrap();
    let info = client.get_repository("PROJ", "flows").await.unwrap();

    assert_eq!(
        info.https_clone_url(),
        Some("https://bitbucket.example.com/scm/proj/flows.git")
    );
    assert!(info.description.is_none());
}

/// Missing repositories map to a 404 API error
#[tokio::test]
async fn test_repository_not_found() {
    let mut server = mockito::Server::new_async().await;

    let _missing = server
        .mock("GET", "/2.0/repositories/ws/missing")
        .with_status(404)
        .with_body("Repository not found")
        .create_async()
        .await;

    let client = user_password_credentials(server.url())
        .get_client(ClientType::Cloud)
        .unwrap();
    let err = client.get_repository("ws", "missing").await.unwrap_err();

    assert!(matches!(err, FetchError::Bitbucket { status: 404, .. }));
}

/// Credentials without any secret cannot produce a client
#[test]
fn test_client_requires_credentials() {
    let anonymous =
        BitbucketCredentials::new(None, Some("testuser".to_string()), None, None).unwrap();

    let err = anonymous.get_client(ClientType::Cloud).unwrap_err();
    assert!(matches!(err, FetchError::Auth(_)));
}

/// A server that never answers trips the configured client timeout
#[tokio::test]
async fn test_client_timeout_is_applied() {
    // Connections queue in the backlog but are never accepted or answered
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let client = user_password_credentials(url)
        .get_client_with(
            ClientType::Cloud,
            ClientOptions {
                timeout: Duration::from_millis(300),
            },
        )
        .unwrap();

    let started = Instant::now();
    let err = client.test_connection().await.unwrap_err();

    assert!(matches!(err, FetchError::Network(_)), "{err}");
    assert!(started.elapsed() < Duration::from_secs(10));
    drop(listener);
}
