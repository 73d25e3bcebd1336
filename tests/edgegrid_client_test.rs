use anyhow::Result;
use edge_reports::domain::ports::ApiClient;
use edge_reports::{EdgeGridClient, EdgeGridCredentials, EtlError};
use httpmock::prelude::*;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use url::Url;

fn edgerc_file() -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(
        b"[default]\nhost = akab-default.luna.akamaiapis.net\nclient_token = ct-default\nclient_secret = cs-default\naccess_token = at-default\n\n\
[reporting]\nhost = https://akab-reporting.luna.akamaiapis.net/\nclient_token = ct-reporting\nclient_secret = cs-reporting\naccess_token = at-reporting\n",
    )?;
    Ok(file)
}

fn client(server: &MockServer, section: &str) -> Result<EdgeGridClient> {
    let edgerc = edgerc_file()?;
    let credentials = EdgeGridCredentials::from_edgerc(edgerc.path(), section)?;
    Ok(EdgeGridClient::new(credentials, Duration::from_secs(5))?
        .with_base_url(Url::parse(&server.base_url())?))
}

#[tokio::test]
async fn test_requests_are_signed_and_parsed() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/cprg/v1/cpcodes")
            .query_param("accountSwitchKey", "F-AC-9")
            .header("accept", "application/json")
            .header_exists("authorization");
        then.status(200)
            .json_body(serde_json::json!({"cpcodes": [{"cpcodeId": "1"}]}));
    });

    let client = client(&server, "reporting")?;
    let body = client
        .get_json(
            "/cprg/v1/cpcodes",
            &[("accountSwitchKey".to_string(), "F-AC-9".to_string())],
        )
        .await?;

    mock.assert();
    assert_eq!(body["cpcodes"][0]["cpcodeId"], "1");
    Ok(())
}

#[tokio::test]
async fn test_unauthorized_is_fatal_auth_error() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/alerts/v2/alert-summaries");
        then.status(401).body("signature does not match");
    });

    let client = client(&server, "default")?;
    let err = client
        .get_json("/alerts/v2/alert-summaries", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, EtlError::AuthError { .. }));
    assert!(err.is_fatal());
    assert!(err.to_string().contains("signature does not match"));
    Ok(())
}

#[tokio::test]
async fn test_server_error_carries_status_and_body() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/alerts/v2/alert-summaries/7/details");
        then.status(502).body("bad gateway");
    });

    let client = client(&server, "default")?;
    let err = client
        .get_json("/alerts/v2/alert-summaries/7/details", &[])
        .await
        .unwrap_err();

    match &err {
        EtlError::HttpStatusError { status, body, .. } => {
            assert_eq!(*status, 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_fatal());
    Ok(())
}

#[tokio::test]
async fn test_invalid_json_is_row_level_error() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/cprg/v1/cpcodes");
        then.status(200).body("<html>maintenance</html>");
    });

    let client = client(&server, "default")?;
    let err = client.get_json("/cprg/v1/cpcodes", &[]).await.unwrap_err();

    assert!(matches!(err, EtlError::SerializationError(_)));
    assert!(!err.is_fatal());
    Ok(())
}

#[test]
fn test_unknown_section_fails_before_any_request() -> Result<()> {
    let edgerc = edgerc_file()?;
    let err = EdgeGridCredentials::from_edgerc(edgerc.path(), "papi").unwrap_err();
    assert!(matches!(err, EtlError::AuthError { .. }));
    Ok(())
}
