use mockito::{Mock, Server};
use pretty_assertions::assert_eq;
use selfie_analyzer::{
    api::FalClient,
    config::Config,
    description::Description,
    ui::{analyze_selfie, Outcome},
};
use tempfile::TempDir;

const KEY: &str = "test-id:test-secret";

fn create_test_config(server: &Server) -> Config {
    Config {
        api_key: KEY.to_string(),
        upload_url: format!("{}/upload", server.url()),
        model_url: format!("{}/model", server.url()),
        ..Config::default()
    }
}

fn upload_ok(server: &mut Server) -> Mock {
    server
        .mock("POST", "/upload")
        .with_status(200)
        .with_body(r#"{"url": "https://x/y.jpg"}"#)
        .expect(1)
        .create()
}

fn run(server: &Server, path: &str) -> (Outcome, String) {
    let api = FalClient::new(&create_test_config(server)).unwrap();
    let mut out = Vec::new();
    let outcome = analyze_selfie(&api, KEY, path, &mut out).unwrap();
    (outcome, String::from_utf8(out).unwrap())
}

fn selfie(dir: &TempDir) -> String {
    let path = dir.path().join("selfie.jpg");
    std::fs::write(&path, b"jpeg").unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn test_missing_file_makes_no_requests() {
    let mut server = Server::new();
    let upload = server.mock("POST", "/upload").expect(0).create();
    let model = server.mock("POST", "/model").expect(0).create();

    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.jpg");
    let missing = missing.to_string_lossy();

    let (outcome, output) = run(&server, &missing);

    assert_eq!(outcome, Outcome::FileNotFound);
    assert_eq!(output, format!("File not found: {}\n", missing));
    upload.assert();
    model.assert();
}

#[test]
fn test_directory_is_not_a_file() {
    let mut server = Server::new();
    let upload = server.mock("POST", "/upload").expect(0).create();

    let temp_dir = TempDir::new().unwrap();
    let (outcome, output) = run(&server, &temp_dir.path().to_string_lossy());

    assert_eq!(outcome, Outcome::FileNotFound);
    assert!(output.starts_with("File not found: "));
    upload.assert();
}

#[test]
fn test_path_is_trimmed() {
    let mut server = Server::new();
    let upload = upload_ok(&mut server);
    let _model = server
        .mock("POST", "/model")
        .with_status(200)
        .with_body(r#"{"text": "Straight black hair."}"#)
        .create();

    let temp_dir = TempDir::new().unwrap();
    let path = format!("  {}\n", selfie(&temp_dir));
    let (outcome, _) = run(&server, &path);

    assert_eq!(
        outcome,
        Outcome::Described(Description::Text("Straight black hair.".to_string()))
    );
    upload.assert();
}

#[test]
fn test_upload_failure_skips_analysis() {
    let mut server = Server::new();
    let upload = server
        .mock("POST", "/upload")
        .with_status(400)
        .with_body("bad upload")
        .expect(1)
        .create();
    let model = server.mock("POST", "/model").expect(0).create();

    let temp_dir = TempDir::new().unwrap();
    let (outcome, output) = run(&server, &selfie(&temp_dir));

    assert_eq!(outcome, Outcome::UploadFailed);
    assert_eq!(
        output,
        "Uploading image to FAL...\n\
         Failed to upload image: server returned 400 Bad Request: bad upload\n"
    );
    upload.assert();
    model.assert();
}

#[test]
fn test_full_flow_prints_description() {
    let mut server = Server::new();
    let upload = upload_ok(&mut server);
    let model = server
        .mock("POST", "/model")
        .match_header("authorization", "Key test-id:test-secret")
        .with_status(200)
        .with_body(r#"{"text": "Wavy brown hair, fair skin."}"#)
        .expect(1)
        .create();

    let temp_dir = TempDir::new().unwrap();
    let (_, output) = run(&server, &selfie(&temp_dir));

    assert_eq!(
        output,
        "Uploading image to FAL...\n\
         Image uploaded. URL: https://x/y.jpg\n\
         \n\
         Analyzing image with FAL AI Bagel model...\n\
         \n\
         Description:\n\
         Wavy brown hair, fair skin.\n"
    );
    upload.assert();
    model.assert();
}

#[test]
fn test_missing_text_prints_whole_structure() {
    let mut server = Server::new();
    let _upload = upload_ok(&mut server);
    let _model = server
        .mock("POST", "/model")
        .with_status(200)
        .with_body(r#"{"result": "ok"}"#)
        .create();

    let temp_dir = TempDir::new().unwrap();
    let (_, output) = run(&server, &selfie(&temp_dir));

    assert!(output.ends_with("Description:\n{\"result\": \"ok\"}\n"));
}

#[test]
fn test_analysis_failure_after_url_printed() {
    let mut server = Server::new();
    let _upload = upload_ok(&mut server);
    let model = server
        .mock("POST", "/model")
        .with_status(403)
        .expect(1)
        .create();

    let temp_dir = TempDir::new().unwrap();
    let (outcome, output) = run(&server, &selfie(&temp_dir));

    assert_eq!(outcome, Outcome::AnalysisFailed);
    assert_eq!(
        output,
        "Uploading image to FAL...\n\
         Image uploaded. URL: https://x/y.jpg\n\
         \n\
         Analyzing image with FAL AI Bagel model...\n\
         Failed to analyze image: server returned 403 Forbidden\n\
         Check that FAL_KEY holds a valid API key.\n"
    );
    model.assert();
}

#[test]
fn test_empty_path_is_file_not_found() {
    let mut server = Server::new();
    let upload = server.mock("POST", "/upload").expect(0).create();

    let (outcome, output) = run(&server, "   ");

    assert_eq!(outcome, Outcome::FileNotFound);
    assert_eq!(output, "File not found: \n");
    upload.assert();
}

#[test]
fn test_connection_failure_skips_analysis() {
    let mut server = Server::new();
    let model = server.mock("POST", "/model").expect(0).create();

    // nothing listens on the discard port
    let config = Config {
        upload_url: "http://127.0.0.1:9/upload".to_string(),
        ..create_test_config(&server)
    };
    let api = FalClient::new(&config).unwrap();
    let temp_dir = TempDir::new().unwrap();
    let mut out = Vec::new();

    let outcome = analyze_selfie(&api, KEY, &selfie(&temp_dir), &mut out).unwrap();
    let output = String::from_utf8(out).unwrap();

    assert_eq!(outcome, Outcome::UploadFailed);
    assert!(output.contains("Failed to upload image: network error:"));
    assert!(!output.contains("Image uploaded."));
    model.assert();
}
