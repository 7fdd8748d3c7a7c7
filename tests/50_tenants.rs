mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{tenant_json, tower_json, TestServer};

#[tokio::test]
async fn tenants_roll_up_into_monthly_revenue() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;
    let tower = server.create_tower(&token, tower_json("TWR-TEN")).await?;
    let tower_id = tower["id"].as_str().unwrap().to_string();
    let tenants_url = server.url(&format!("/api/towers/{tower_id}/tenants"));

    let res = server
        .client
        .post(&tenants_url)
        .bearer_auth(&token)
        .json(&tenant_json("Verizon Wireless", 2500.0))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let first: Value = res.json().await?;
    let first_id = first["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(first["data"]["monthlyRevenue"], 2500.0);

    let mut second = tenant_json("County Dispatch", 1250.5);
    second["type"] = json!("Emergency Services");
    let res = server.client.post(&tenants_url).bearer_auth(&token).json(&second).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server
        .client
        .get(server.url(&format!("/api/towers/{tower_id}")))
        .bearer_auth(&token)
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["tenants"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["data"]["totalMonthlyRevenue"], 3750.5);

    let res = server
        .client
        .put(server.url(&format!("/api/towers/{tower_id}/tenants/{first_id}")))
        .bearer_auth(&token)
        .json(&tenant_json("Verizon Wireless", 3000.0))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["data"]["id"], first_id.as_str());
    assert_eq!(updated["data"]["monthlyRevenue"], 3000.0);

    let res = server
        .client
        .delete(server.url(&format!("/api/towers/{tower_id}/tenants/{first_id}")))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server.client.get(&tenants_url).bearer_auth(&token).send().await?;
    let body: Value = res.json().await?;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert_eq!(names, vec!["County Dispatch"]);
    Ok(())
}

#[tokio::test]
async fn invalid_tenant_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;
    let tower = server.create_tower(&token, tower_json("TWR-BAD")).await?;
    let tower_id = tower["id"].as_str().unwrap();

    let res = server
        .client
        .post(server.url(&format!("/api/towers/{tower_id}/tenants")))
        .bearer_auth(&token)
        .json(&json!({ "name": "", "type": "Carrier", "contractStart": "01/02/2024", "monthlyRevenue": -1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    let fields = &body["field_errors"];
    assert_eq!(fields["name"], "Tenant name is required");
    assert!(fields["contractStart"].is_string());
    assert_eq!(fields["contractEnd"], "Contract end is required");
    assert_eq!(fields["monthlyRevenue"], "Monthly revenue cannot be negative");
    Ok(())
}

#[tokio::test]
async fn unknown_tower_or_tenant_is_not_found() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;
    let tower = server.create_tower(&token, tower_json("TWR-404")).await?;
    let tower_id = tower["id"].as_str().unwrap();
    let missing = uuid::Uuid::new_v4();

    let res = server
        .client
        .post(server.url(&format!("/api/towers/{missing}/tenants")))
        .bearer_auth(&token)
        .json(&tenant_json("Nobody", 10.0))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server
        .client
        .put(server.url(&format!("/api/towers/{tower_id}/tenants/{missing}")))
        .bearer_auth(&token)
        .json(&tenant_json("Nobody", 10.0))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server
        .client
        .delete(server.url(&format!("/api/towers/{tower_id}/tenants/{missing}")))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn revenue_outside_stored_precision_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;
    let tower = server.create_tower(&token, tower_json("TWR-REV")).await?;
    let tenants_url = server.url(&format!("/api/towers/{}/tenants", tower["id"].as_str().unwrap()));

    for revenue in [json!(3200.555), json!(1.0e13)] {
        let mut body = tenant_json("Precise Wireless", 0.0);
        body["monthlyRevenue"] = revenue;
        let res = server.client.post(&tenants_url).bearer_auth(&token).json(&body).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = res.json().await?;
        assert!(body["field_errors"]["monthlyRevenue"].is_string());
    }
    Ok(())
}
