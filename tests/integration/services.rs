//! Integration tests for the resource services

use super::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_fields(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(console("Recipient/DynamicFields")))
        .respond_with(page(
            2,
            20,
            vec![
                json!({"Description": "nome", "Id": 1}),
                json!({"Description": "cognome", "Id": 2}),
            ],
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_subscribe_to_list() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;
    mount_fields(&server).await;

    Mock::given(method("POST"))
        .and(path(console("List/1/Recipient")))
        .and(header("authorization", "Bearer access-1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "Name": "Mario Rossi",
            "Email": "mario@example.com",
            "Fields": [
                {"Description": "nome", "Id": 1, "Value": "Mario"},
                {"Description": "cognome", "Id": 2, "Value": "Rossi"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(1001)))
        .expect(1)
        .mount(&server)
        .await;

    let id = client
        .lists()
        .subscribe(
            1,
            "Mario Rossi",
            "mario@example.com",
            &[("nome", "Mario"), ("cognome", "Rossi"), ("eta", "40")],
        )
        .await
        .unwrap();

    assert_eq!(id, 1001);
}

#[tokio::test]
async fn test_subscribe_to_group_and_unsubscribe() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("POST"))
        .and(path(console("Group/8/Recipient")))
        .and(body_json(json!({"Name": "Anna", "Email": "anna@example.com", "Fields": []})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(55)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(console("Group/8/Unsubscribe/55")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let groups = client.groups();
    let id = groups
        .subscribe::<&str, &str>(8, "Anna", "anna@example.com", &[])
        .await
        .unwrap();
    assert!(groups.unsubscribe(8, id).await.unwrap());
}

#[tokio::test]
async fn test_get_or_create_group() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("GET"))
        .and(path(console("List/1/Groups")))
        .respond_with(page(1, 20, vec![json!({"idGroup": 3, "Name": "news"})]))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(console("List/1/Group")))
        .and(body_json(json!({"Name": "vip", "Notes": ""})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"idGroup": 12, "Name": "vip"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let groups = client.groups();

    let existing = groups.get_or_create(1, "news").await.unwrap();
    assert_eq!(existing, GroupLookup { id: Some(3), created: false });

    let created = groups.get_or_create(1, "vip").await.unwrap();
    assert_eq!(created, GroupLookup { id: Some(12), created: true });
}

#[tokio::test]
async fn test_update_recipient_fields() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;
    mount_fields(&server).await;

    Mock::given(method("PUT"))
        .and(path(console("Recipient/Detail")))
        .and(body_json(json!({
            "Name": "Mario",
            "Email": "mario@example.com",
            "Fields": [{"Description": "cognome", "Id": 2, "Value": "Bianchi"}]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"idRecipient": 1001, "Name": "Mario"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let recipient = client
        .recipients()
        .update_fields("Mario", "mario@example.com", &[("cognome", "Bianchi")])
        .await
        .unwrap();

    assert_eq!(recipient["idRecipient"], 1001);
}

#[tokio::test]
async fn test_remove_recipient_from_all_lists() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("DELETE"))
        .and(path(console("Recipients/1001")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client
        .lists()
        .remove_recipient(ListScope::All, 1001)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_list_unsubscribe_non_ok_status_is_false() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("DELETE"))
        .and(path(console("List/1/Unsubscribe/1001")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!client.lists().unsubscribe(1, 1001).await.unwrap());
}

#[tokio::test]
async fn test_send_message() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("POST"))
        .and(path(console("Email/Send")))
        .and(body_json(json!({"Email": "a@example.com", "idMessage": 42})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.messages().send("a@example.com", 42).await.unwrap());
}

#[tokio::test]
async fn test_unauthenticated_call_logs_in_on_demand() {
    let server = MockServer::start().await;
    mount_login(&server, "access-1", "refresh-1").await;

    Mock::given(method("DELETE"))
        .and(path(console("Recipients/7")))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(console("Recipients/7")))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(client
        .lists()
        .remove_recipient(ListScope::All, 7)
        .await
        .unwrap());
}
