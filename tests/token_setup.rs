use gist_wrapper::config::{read_token, write_token, Settings};
use gist_wrapper::ui::ask_until_valid;
use gist_wrapper::GitHubClient;
use mockito::Server;
use tempfile::tempdir;

#[test]
fn manual_token_loop_writes_first_valid_token() {
    let mut server = Server::new();
    let rejected = server
        .mock("GET", "/user")
        .match_header("authorization", "token not-a-token")
        .with_status(401)
        .expect(2)
        .create();
    server
        .mock("GET", "/user")
        .match_header("authorization", "token ghp_good")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"login":"octocat"}"#)
        .create();

    let dir = tempdir().unwrap();
    let settings = Settings {
        api_url: server.url(),
        token_file: dir.path().join("token.yaml"),
        env_token: None,
    };

    let mut answers = vec!["not-a-token", "not-a-token", "ghp_good"].into_iter();
    let token = ask_until_valid(
        || Ok(answers.next().expect("prompt asked too often").to_string()),
        |t| Ok(GitHubClient::with_token(&settings.api_url, t)?.verify()?),
    )
    .unwrap();
    assert_eq!(token, "ghp_good");
    rejected.assert();

    write_token(&settings.token_file, &token).unwrap();
    assert_eq!(
        read_token(&settings.token_file).unwrap().as_deref(),
        Some("ghp_good")
    );
}

#[test]
fn invalid_token_is_never_written() {
    let mut server = Server::new();
    server.mock("GET", "/user").with_status(401).create();

    let dir = tempdir().unwrap();
    let token_file = dir.path().join("token.yaml");
    let url = server.url();

    let mut remaining = 3;
    let result = ask_until_valid(
        || {
            if remaining == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::Interrupted, "ctrl-c").into());
            }
            remaining -= 1;
            Ok("still-wrong".to_string())
        },
        |t| Ok(GitHubClient::with_token(&url, t)?.verify()?),
    );

    assert!(result.is_err());
    assert!(gist_wrapper::ui::is_interrupt(&result.unwrap_err()));
    assert!(!token_file.exists());
}
