mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{tenant_json, tower_json, TestServer, ADMIN_USER};

fn slice<'a>(slices: &'a Value, name: &str) -> &'a Value {
    slices
        .as_array()
        .and_then(|s| s.iter().find(|x| x["name"] == name))
        .map(|x| &x["value"])
        .unwrap_or(&Value::Null)
}

#[tokio::test]
async fn empty_dashboard() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;

    let res = server
        .client
        .get(server.url("/api/dashboard/metrics"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let metrics = &body["data"];
    assert_eq!(metrics["totalTowers"], 0);
    assert_eq!(metrics["monthlyRevenue"], 0.0);
    assert_eq!(metrics["towersBy"]["type"].as_array().map(Vec::len), Some(4));
    assert_eq!(metrics["recentActivity"], json!([]));
    Ok(())
}

#[tokio::test]
async fn counts_revenue_and_activity() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;

    let a = server.create_tower(&token, tower_json("TWR-D1")).await?;
    let mut guyed = tower_json("TWR-D2");
    guyed["type"] = json!("Guyed");
    guyed["status"] = json!("Maintenance");
    server.create_tower(&token, guyed).await?;

    let a_id = a["id"].as_str().unwrap();
    server
        .client
        .post(server.url(&format!("/api/towers/{a_id}/tenants")))
        .bearer_auth(&token)
        .json(&tenant_json("Verizon Wireless", 1500.25))
        .send()
        .await?;
    server
        .client
        .put(server.url(&format!("/api/towers/{a_id}")))
        .bearer_auth(&token)
        .json(&json!({ "status": "Inactive" }))
        .send()
        .await?;

    let res = server
        .client
        .get(server.url("/api/dashboard/metrics"))
        .bearer_auth(&token)
        .send()
        .await?;
    let body: Value = res.json().await?;
    let metrics = &body["data"];

    assert_eq!(metrics["totalTowers"], 2);
    assert_eq!(metrics["activeTowers"], 0);
    assert_eq!(metrics["maintenanceDue"], 1);
    assert_eq!(metrics["monthlyRevenue"], 1500.25);
    assert_eq!(*slice(&metrics["towersBy"]["type"], "Guyed"), 1);
    assert_eq!(*slice(&metrics["towersBy"]["status"], "Inactive"), 1);

    let activity = metrics["recentActivity"].as_array().unwrap();
    let actions: Vec<&str> = activity.iter().filter_map(|e| e["action"].as_str()).collect();
    assert_eq!(actions, vec!["Status Updated", "Tenant Added", "Tower Added", "Tower Added"]);
    assert_eq!(activity[0]["tower"], "TWR-D1");
    assert_eq!(activity[0]["user"], ADMIN_USER);
    Ok(())
}
