//! Smoke tests for the obs-origin binary.
//!
//! These tests run the compiled binary and check argument handling,
//! error reporting and output against a stub build service.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn obs_origin() -> Command {
    let mut cmd = Command::cargo_bin("obs-origin").unwrap();
    cmd.env_remove("OBS_ORIGIN_PASSWORD")
        .env_remove("OBS_ORIGIN_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--no-interactive");
    cmd
}

/// Write a config file pointing at `api_url` without retries.
fn write_config(dir: &TempDir, api_url: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        format!("api_url = \"{}\"\nconnection_retries = 0\n", api_url),
    )
    .unwrap();
    path
}

fn xml(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/xml")
}

mod arguments {
    use super::*;

    #[test]
    fn help_lists_commands() {
        obs_origin()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("find"))
            .stdout(predicate::str::contains("list"))
            .stdout(predicate::str::contains("origins"));
    }

    #[test]
    fn version() {
        obs_origin()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn completion_script() {
        obs_origin()
            .args(["completion", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("obs-origin"));
    }

    #[test]
    fn find_requires_project_and_package() {
        obs_origin().args(["find", "P"]).assert().failure();
    }

    #[test]
    fn conflicting_project_kinds() {
        obs_origin()
            .args(["projects", "--maintained", "--configured"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot be used with"));
    }

    #[test]
    fn missing_config_file() {
        let temp = TempDir::new().unwrap();
        obs_origin()
            .arg("--config")
            .arg(temp.path().join("nope.toml"))
            .args(["find", "P", "zypper"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("does not exist"));
    }

    #[test]
    fn invalid_api_url() {
        let temp = TempDir::new().unwrap();
        let config = write_config(&temp, "https://api.example.org");
        obs_origin()
            .arg("--config")
            .arg(&config)
            .args(["-A", "nonsense", "find", "P", "zypper"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}

mod against_server {
    use super::*;

    async fn leap_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/project/id"))
            .and(query_param("match", "attribute/@name='OSRT:OriginConfig'"))
            .respond_with(xml(r#"<collection><project name="P:Update"/></collection>"#))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/source/P:Update/_attribute/OSRT:OriginConfig"))
            .respond_with(xml(
                r#"<attributes><attribute name="OriginConfig" namespace="OSRT"><value>origins:
- openSUSE:Factory: {}
</value></attribute></attributes>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search/request"))
            .respond_with(xml(r#"<collection matches="0"/>"#))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/source/openSUSE:Factory"))
            .and(query_param("expand", "1"))
            .respond_with(xml(
                r#"<directory><entry name="zziplib" originproject="openSUSE:Factory"/></directory>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/source/P:Update"))
            .and(query_param("expand", "1"))
            .respond_with(xml(
                r#"<directory>
                     <entry name="patchinfo.1" originproject="P:Update"/>
                     <entry name="zziplib" originproject="P:Update"/>
                     <entry name="brand-new" originproject="P:Update"/>
                   </directory>"#,
            ))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn find_prints_origin() {
        let server = leap_server().await;
        let temp = TempDir::new().unwrap();
        let config = write_config(&temp, &server.uri());

        obs_origin()
            .arg("--config")
            .arg(&config)
            .args(["find", "--no-resolve-inheritance", "P:Update", "zziplib"])
            .assert()
            .success()
            .stdout("openSUSE:Factory\n");

        obs_origin()
            .arg("--config")
            .arg(&config)
            .args(["find", "--no-resolve-inheritance", "P:Update", "missing"])
            .assert()
            .success()
            .stdout("(none)\n");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn list_prints_tab_separated_origins() {
        let server = leap_server().await;
        let temp = TempDir::new().unwrap();
        let config = write_config(&temp, &server.uri());

        obs_origin()
            .arg("--config")
            .arg(&config)
            .args(["list", "P:Update"])
            .assert()
            .success()
            .stdout("zziplib\topenSUSE:Factory\nbrand-new\t(none)\n");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn projects_lists_configured() {
        let server = leap_server().await;
        let temp = TempDir::new().unwrap();
        let config = write_config(&temp, &server.uri());

        obs_origin()
            .arg("--config")
            .arg(&config)
            .args(["projects", "--configured"])
            .assert()
            .success()
            .stdout("P:Update\n");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn server_errors_fail_the_command() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let temp = TempDir::new().unwrap();
        let config = write_config(&temp, &server.uri());

        obs_origin()
            .arg("--config")
            .arg(&config)
            .args(["find", "P:Update", "zziplib"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("500"));
    }
}
