use gist_wrapper::config::write_token;
use gist_wrapper::{GistError, NewGist, Settings, User, UserOptions};
use mockito::{Matcher, Server};
use serde_json::json;
use tempfile::tempdir;

fn options(username: Option<&str>, token: Option<&str>) -> UserOptions {
    UserOptions {
        username: username.map(String::from),
        token: token.map(String::from),
    }
}

fn created_gist_body() -> serde_json::Value {
    json!({
        "id": "aa5a315d61ae9438b18d",
        "html_url": "https://gist.github.com/aa5a315d61ae9438b18d",
        "description": "the description for this gist",
        "public": true,
        "files": {
            "file1.txt": {
                "filename": "file1.txt",
                "language": null,
                "raw_url": "https://gist.githubusercontent.com/octocat/raw/file1.txt",
                "size": 20,
                "content": "String file contents"
            }
        },
        "owner": { "login": "octocat", "id": 1 },
        "comments": 0,
        "created_at": "2010-04-14T02:15:15Z"
    })
}

#[test]
fn token_authenticates_on_construction() {
    let mut server = Server::new();
    let login = server
        .mock("GET", "/user")
        .match_header("authorization", "token valid-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"login":"octocat"}"#)
        .expect(1)
        .create();

    let user = User::with_api_url(options(None, Some("valid-token")), &server.url()).unwrap();
    assert!(user.authenticated());
    assert_eq!(user.login(), Some("octocat"));
    login.assert();
}

#[test]
fn rejected_token_still_reports_authenticated() {
    let mut server = Server::new();
    server
        .mock("GET", "/user")
        .with_status(401)
        .with_body(r#"{"message":"Bad credentials"}"#)
        .create();

    let user = User::with_api_url(options(None, Some("revoked")), &server.url()).unwrap();
    assert!(user.authenticated());
    assert_eq!(user.login(), None);
}

#[test]
fn without_token_gists_are_listed_by_username() {
    let mut server = Server::new();
    let listing = server
        .mock("GET", "/users/octocat/gists")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([created_gist_body()]).to_string())
        .create();

    let mut user = User::with_api_url(options(Some("octocat"), None), &server.url()).unwrap();
    assert!(!user.authenticated());

    let gists = user.gists().unwrap();
    assert_eq!(gists.len(), 1);
    assert_eq!(gists[0].id, "aa5a315d61ae9438b18d");
    assert!(!user.authenticated());
    listing.assert();
}

#[test]
fn authenticated_gists_use_the_token() {
    let mut server = Server::new();
    server
        .mock("GET", "/user")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"login":"octocat"}"#)
        .create();
    let listing = server
        .mock("GET", "/gists")
        .match_header("authorization", "token valid-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create();

    let mut user = User::with_api_url(options(Some("octocat"), Some("valid-token")), &server.url())
        .unwrap();
    assert!(user.gists().unwrap().is_empty());
    listing.assert();
}

#[test]
fn no_username_and_no_token_fails_on_first_use() {
    let server = Server::new();
    let mut user = User::with_api_url(options(None, None), &server.url()).unwrap();

    assert!(matches!(user.gists(), Err(GistError::NoUsernameDefined)));
    assert!(matches!(
        user.create_gist(&NewGist::new("d", true).file("a.txt", "b")),
        Err(GistError::AuthenticationError)
    ));
    assert!(!user.authenticated());
}

#[test]
fn create_gist_logs_in_then_returns_gist_unchanged() {
    let mut server = Server::new();
    let login = server
        .mock("GET", "/user")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"login":"octocat"}"#)
        .expect(1)
        .create();
    let create = server
        .mock("POST", "/gists")
        .match_header("authorization", "token valid-token")
        .match_body(Matcher::Json(json!({
            "description": "the description for this gist",
            "public": true,
            "files": { "file1.txt": { "content": "String file contents" } }
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(created_gist_body().to_string())
        .expect(1)
        .create();

    let mut user = User::with_api_url(options(None, Some("valid-token")), &server.url()).unwrap();
    // The login lookup already happened, before any gist call.
    login.assert();

    let gist = user
        .create_gist(
            &NewGist::new("the description for this gist", true)
                .file("file1.txt", "String file contents"),
        )
        .unwrap();

    assert_eq!(serde_json::to_value(&gist).unwrap(), created_gist_body());
    create.assert();
    login.assert();
}

#[test]
fn api_failures_propagate_from_create_gist() {
    let mut server = Server::new();
    server
        .mock("GET", "/user")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"login":"octocat"}"#)
        .create();
    server
        .mock("POST", "/gists")
        .with_status(422)
        .with_body(r#"{"message":"Validation Failed"}"#)
        .create();

    let mut user = User::with_api_url(options(None, Some("valid-token")), &server.url()).unwrap();
    match user.create_gist(&NewGist::new("empty", false)) {
        Err(GistError::Api { status, message }) => {
            assert_eq!(status.as_u16(), 422);
            assert!(message.contains("Validation Failed"));
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[test]
fn revoked_token_fails_only_when_used() {
    let mut server = Server::new();
    server.mock("GET", "/user").with_status(401).create();
    server.mock("GET", "/gists").with_status(401).create();

    let mut user = User::with_api_url(options(None, Some("revoked")), &server.url()).unwrap();
    assert!(user.authenticated());
    assert!(matches!(user.gists(), Err(GistError::Unauthorized)));
}

#[test]
fn from_settings_prefers_the_env_token_over_the_file() {
    let mut server = Server::new();
    let login = server
        .mock("GET", "/user")
        .match_header("authorization", "token from-env")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"login":"octocat"}"#)
        .expect(1)
        .create();

    let dir = tempdir().unwrap();
    let settings = Settings {
        api_url: server.url(),
        token_file: dir.path().join("token.yaml"),
        env_token: Some("from-env".into()),
    };
    write_token(&settings.token_file, "from-file").unwrap();

    let user = User::from_settings(&settings, None).unwrap();
    assert_eq!(user.login(), Some("octocat"));
    login.assert();
}

#[test]
fn from_settings_reads_the_token_file() {
    let mut server = Server::new();
    let login = server
        .mock("GET", "/user")
        .match_header("authorization", "token from-file")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"login":"octocat"}"#)
        .expect(1)
        .create();

    let dir = tempdir().unwrap();
    let settings = Settings {
        api_url: server.url(),
        token_file: dir.path().join("token.yaml"),
        env_token: Some(String::new()),
    };
    write_token(&settings.token_file, "from-file").unwrap();

    let user = User::from_settings(&settings, None).unwrap();
    assert!(user.authenticated());
    login.assert();
}
