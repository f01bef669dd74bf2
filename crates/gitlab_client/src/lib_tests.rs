//! Unit tests for the gitlab_client crate.

use super::*;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_TOKEN: &str = "glpat-test-token";

fn client_for(server: &MockServer) -> GitLabClient {
    GitLabClient::new(ClientConfig {
        url: server.uri(),
        ..Default::default()
    })
    .expect("Failed to create client")
}

#[test]
fn test_api_url_appends_version() {
    let config = ClientConfig {
        url: "http://localhost/".to_string(),
        ..Default::default()
    };

    assert_eq!(
        config.api_url().unwrap().as_str(),
        "http://localhost/api/v4/"
    );
}

#[test]
fn test_api_url_keeps_sub_path() {
    let config = ClientConfig {
        url: "https://example.com/gitlab".to_string(),
        api_version: "5".to_string(),
        ..Default::default()
    };

    assert_eq!(
        config.api_url().unwrap().as_str(),
        "https://example.com/gitlab/api/v5/"
    );
}

#[test]
fn test_new_rejects_invalid_url() {
    let result = GitLabClient::new(ClientConfig {
        url: "not a url".to_string(),
        ..Default::default()
    });

    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[test]
fn test_new_rejects_token_with_newline() {
    let result = GitLabClient::new(ClientConfig {
        auth: Auth::PrivateToken(SecretString::from("bad\ntoken".to_string())),
        ..Default::default()
    });

    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[test]
fn test_create_token_client_rejects_empty_token() {
    let result = create_token_client("https://gitlab.com", "  ");

    assert!(matches!(result, Err(Error::AuthError(_))));
}

#[test]
fn test_template_url_instance_and_project() {
    let client = create_anonymous_client("http://localhost").unwrap();

    let url = client
        .template_url(TemplateOwner::Instance, TemplateKind::License, Some("smpl"), &[])
        .unwrap();
    assert_eq!(url.as_str(), "http://localhost/api/v4/templates/licenses/smpl");

    let url = client
        .template_url(
            TemplateOwner::Project(1),
            TemplateKind::MergeRequest,
            Some("sample"),
            &[],
        )
        .unwrap();
    assert_eq!(
        url.as_str(),
        "http://localhost/api/v4/projects/1/templates/merge_requests/sample"
    );
}

#[test]
fn test_template_url_encodes_identifier_as_one_segment() {
    let client = create_anonymous_client("http://localhost").unwrap();

    let url = client
        .template_url(
            TemplateOwner::Instance,
            TemplateKind::Gitignore,
            Some("Global/Vim"),
            &[],
        )
        .unwrap();

    assert_eq!(
        url.as_str(),
        "http://localhost/api/v4/templates/gitignores/Global%2FVim"
    );
}

#[test]
fn test_template_url_collection_with_query() {
    let client = create_anonymous_client("http://localhost").unwrap();

    let url = client
        .template_url(
            TemplateOwner::Instance,
            TemplateKind::Dockerfile,
            None,
            &[("page", "2".to_string())],
        )
        .unwrap();

    assert_eq!(
        url.as_str(),
        "http://localhost/api/v4/templates/dockerfiles?page=2"
    );
}

#[test]
fn test_template_url_rejects_instance_issue_templates() {
    let client = create_anonymous_client("http://localhost").unwrap();

    let result = client.template_url(TemplateOwner::Instance, TemplateKind::Issue, None, &[]);

    assert!(matches!(
        result,
        Err(Error::UnsupportedTemplateKind {
            kind: TemplateKind::Issue,
            scope: TemplateScope::Instance
        })
    ));
}

#[tokio::test]
async fn test_private_token_header_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/templates/dockerfiles/Binary"))
        .and(header("PRIVATE-TOKEN", TEST_TOKEN))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"name": "Binary", "content": "FROM scratch"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = create_token_client(&server.uri(), TEST_TOKEN).unwrap();
    let result = client.dockerfiles().get("Binary").await;

    if let Err(e) = &result {
        eprintln!("get dockerfile error: {e:?}");
    }
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_oauth_token_header_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/templates/gitignores/Rust"))
        .and(header("Authorization", "Bearer oauth-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"name": "Rust", "content": "/target"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = GitLabClient::new(ClientConfig {
        url: server.uri(),
        auth: Auth::OAuthToken(SecretString::from("oauth-token".to_string())),
        ..Default::default()
    })
    .unwrap();

    assert!(client.gitignores().get("Rust").await.is_ok());
}

#[tokio::test]
async fn test_job_token_header_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/7/templates/issues/Bug"))
        .and(header("JOB-TOKEN", "job-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"name": "Bug", "content": "## Bug"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = GitLabClient::new(ClientConfig {
        url: server.uri(),
        auth: Auth::JobToken(SecretString::from("job-token".to_string())),
        ..Default::default()
    })
    .unwrap();

    assert!(client.project(7).issue_templates().get("Bug").await.is_ok());
}

#[tokio::test]
async fn test_not_found_maps_to_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/templates/licenses/unknown"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "404 License Not Found"})),
        )
        .mount(&server)
        .await;
    let client = client_for(&server);

    let result = client.licenses().get("unknown").await;

    assert!(matches!(result, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1/templates/issues/Bug"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "401 Unauthorized"})),
        )
        .mount(&server)
        .await;
    let client = client_for(&server);

    let result = client.project(1).issue_templates().get("Bug").await;

    match result {
        Err(Error::AuthError(msg)) => assert_eq!(msg, "401 Unauthorized"),
        other => panic!("Expected AuthError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limit_maps_to_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("RateLimit-Remaining", "0"))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let result = client.gitlabciymls().get("Rust").await;

    assert!(matches!(result, Err(Error::RateLimitExceeded)));
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let result = client.dockerfiles().get("Binary").await;

    match result {
        Err(Error::ApiError { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal Server Error");
        }
        other => panic!("Expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_error_body_falls_back_to_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let result = client.gitignores().list(&ListOptions::default()).await;

    match result {
        Err(Error::ApiError { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "Bad Gateway");
        }
        other => panic!("Expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_listing_maps_to_deserialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/templates/licenses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "nope"})))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let result = client.licenses().list(&ListOptions::default()).await;

    assert!(matches!(result, Err(Error::Deserialization(_))));
}

#[tokio::test]
async fn test_invalid_body_maps_to_deserialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let result = client.gitignores().get("Rust").await;

    assert!(matches!(result, Err(Error::Deserialization(_))));
}

#[tokio::test]
async fn test_list_follows_next_page_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/templates/gitignores"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-next-page", "")
                .set_body_json(json!([{"key": "Rust", "name": "Rust"}])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/templates/gitignores"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-next-page", "2")
                .set_body_json(json!([
                    {"key": "Go", "name": "Go"},
                    {"key": "Python", "name": "Python"}
                ])),
        )
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let options = ListOptions {
        page: Some(1),
        per_page: Some(2),
        all: true,
    };
    let summaries = client.gitignores().list(&options).await.unwrap();

    let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Go", "Python", "Rust"]);
}

#[tokio::test]
async fn test_list_without_all_stops_after_first_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/templates/dockerfiles"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-next-page", "2")
                .set_body_json(json!([{"key": "Binary", "name": "Binary"}])),
        )
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let summaries = client
        .dockerfiles()
        .list(&ListOptions::default())
        .await
        .unwrap();

    assert_eq!(summaries.len(), 1);
}

#[tokio::test]
async fn test_provider_dispatches_every_template_kind() {
    // (owner, kind, request path, expected wrapper type)
    let cases = [
        (TemplateOwner::Instance, TemplateKind::Dockerfile, "/api/v4/templates/dockerfiles", "Dockerfile"),
        (TemplateOwner::Instance, TemplateKind::Gitignore, "/api/v4/templates/gitignores", "Gitignore"),
        (TemplateOwner::Instance, TemplateKind::GitlabCiYml, "/api/v4/templates/gitlab_ci_ymls", "Gitlabciyml"),
        (TemplateOwner::Instance, TemplateKind::License, "/api/v4/templates/licenses", "License"),
        (TemplateOwner::Project(1), TemplateKind::Dockerfile, "/api/v4/projects/1/templates/dockerfiles", "ProjectDockerfileTemplate"),
        (TemplateOwner::Project(1), TemplateKind::Gitignore, "/api/v4/projects/1/templates/gitignores", "ProjectGitignoreTemplate"),
        (TemplateOwner::Project(1), TemplateKind::GitlabCiYml, "/api/v4/projects/1/templates/gitlab_ci_ymls", "ProjectGitlabciymlTemplate"),
        (TemplateOwner::Project(1), TemplateKind::License, "/api/v4/projects/1/templates/licenses", "ProjectLicenseTemplate"),
        (TemplateOwner::Project(1), TemplateKind::Issue, "/api/v4/projects/1/templates/issues", "ProjectIssueTemplate"),
        (TemplateOwner::Project(1), TemplateKind::MergeRequest, "/api/v4/projects/1/templates/merge_requests", "ProjectMergeRequestTemplate"),
    ];

    for (owner, kind, collection_path, type_name) in cases {
        let server = MockServer::start().await;
        let (id, body) = if kind == TemplateKind::License {
            (
                "smpl",
                json!({"name": "sample", "key": "smpl", "content": "Sample template content"}),
            )
        } else {
            (
                "sample",
                json!({"name": "sample", "content": "Sample template content"}),
            )
        };
        Mock::given(method("GET"))
            .and(path(format!("{collection_path}/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server);

        let template = client
            .get_template(owner, kind, id, &GetOptions::default())
            .await
            .unwrap_or_else(|e| panic!("{type_name}: {e:?}"));

        assert_eq!(template.type_name(), type_name);
        assert_eq!(template.kind(), kind);
        assert_eq!(template.scope(), owner.scope());
        assert_eq!(template.id(), id, "{type_name} {}", template.id_attr());
        assert_eq!(template.content(), "Sample template content");
    }
}

#[tokio::test]
async fn test_provider_rejects_instance_merge_request_templates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let get = client
        .get_template(
            TemplateOwner::Instance,
            TemplateKind::MergeRequest,
            "sample",
            &GetOptions::default(),
        )
        .await;
    let list = client
        .list_templates(
            TemplateOwner::Instance,
            TemplateKind::Issue,
            &ListOptions::default(),
        )
        .await;

    assert!(matches!(get, Err(Error::UnsupportedTemplateKind { .. })));
    assert!(matches!(list, Err(Error::UnsupportedTemplateKind { .. })));
}

#[test]
fn test_error_message_extraction() {
    assert_eq!(
        error_message(r#"{"message": "404 Not Found"}"#).as_deref(),
        Some("404 Not Found")
    );
    assert_eq!(
        error_message(r#"{"error": "invalid_token"}"#).as_deref(),
        Some("invalid_token")
    );
    assert_eq!(
        error_message(r#"{"message": {"name": ["is invalid"]}}"#).as_deref(),
        Some(r#"{"name":["is invalid"]}"#)
    );
    assert_eq!(error_message("not json"), None);
}
