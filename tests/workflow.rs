use infocmdb::workflow::WorkflowState;
use infocmdb::{AttributeMutation, Workflow};
use mockito::Matcher;
use serde_json::json;
use std::fs;
use tempfile::tempdir;

fn args(json: &str) -> Vec<String> {
    vec![json.to_string()]
}

#[tokio::test]
async fn workflow_updates_triggering_ci() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/apiV2/auth/token")
        .with_status(200)
        .with_body(r#"{"success":true,"message":"","data":{"token":"abc"}}"#)
        .create_async()
        .await;
    let update = server
        .mock("PUT", "/apiV2/ci/42")
        .match_header("authorization", "Bearer abc")
        .match_body(Matcher::PartialJson(json!({
            "ci": { "attributes": [{ "mode": "set", "name": "state", "value": "done" }] }
        })))
        .with_status(200)
        .with_body(r#"{"success":true,"message":"","data":null}"#)
        .expect(1)
        .create_async()
        .await;

    let temp = tempdir()?;
    let config_path = temp.path().join("infocmdb.yml");
    fs::write(
        &config_path,
        format!("apiUrl: {}\napiUser: admin\napiPassword: admin\n", server.url()),
    )?;

    Workflow::new()
        .with_config(&config_path)
        .execute(&args(r#"{"ciid": "42", "triggerType": "ci_update"}"#), |params, cmdb| async move {
            assert_eq!(params.trigger_type, "ci_update");
            cmdb.update_ci_attributes(params.ci_id, &[AttributeMutation::set("state", "done")])
                .await?;
            Ok(())
        })
        .await?;

    update.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn workflow_without_config_fails_initializing() {
    let temp = tempdir().unwrap();

    let err = Workflow::new()
        .with_config(temp.path().join("missing.yml"))
        .execute(&args("{}"), |_, _| async { Ok(()) })
        .await
        .unwrap_err();

    assert_eq!(err.state(), WorkflowState::Initializing);
}
