//! Integration tests for the messaging hub.
//!
//! The router runs in-process on an ephemeral port; clients connect with
//! `tokio-tungstenite` and the HTTP API is queried with `reqwest`.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use confab_server::{
    domain::{ConversationId, UserId},
    infrastructure::{auth::StaticTokenAuthenticator, repository::InMemoryMessagingService},
    ui::{AppState, HubConfig, Server, ServerError},
};
use confab_shared::time::SystemClock;
use futures_util::{SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::oneshot, task::JoinHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Error as WsError, Message, client::IntoClientRequest, http::HeaderValue},
};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const TOKENS: [&str; 4] = [
    "alice-token=alice",
    "bob-token=bob",
    "carol-token=carol",
    "dave-token=dave",
];

/// Helper struct to manage an in-process hub
struct TestHub {
    addr: SocketAddr,
    http: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<(), ServerError>>>,
}

impl TestHub {
    /// Start a hub with conversation C1 = {alice, bob, dave}
    async fn start(config: HubConfig) -> Self {
        let clock = Arc::new(SystemClock);
        let messaging = Arc::new(InMemoryMessagingService::new(clock.clone()));
        messaging
            .insert_conversation(
                ConversationId::try_from("C1").unwrap(),
                ["alice", "bob", "dave"]
                    .into_iter()
                    .map(|user| UserId::try_from(user).unwrap())
                    .collect(),
            )
            .await;
        let authenticator = StaticTokenAuthenticator::from_pairs(TOKENS).unwrap();
        let state = Arc::new(AppState::new(
            config,
            Arc::new(authenticator),
            messaging.clone(),
            messaging,
            clock,
        ));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(Server::new(state).serve(listener, async {
            let _ = shutdown_rx.await;
        }));

        Self {
            addr,
            http: reqwest::Client::new(),
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Connect with `?token=` and wait until the connection is registered
    async fn connect(&self, user: &str) -> Client {
        let before = self.connections_of(user).await;
        let (client, _) = connect_async(format!("{}?token={}-token", self.ws_url(), user))
            .await
            .expect("Failed to connect");
        self.wait_for_connections(user, before + 1).await;
        client
    }

    async fn presence(&self, user: &str) -> serde_json::Value {
        reqwest::get(self.http_url(&format!("/api/users/{}/presence", user)))
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    /// GET an authenticated API path as `user`
    async fn get_as(&self, user: &str, path: &str) -> reqwest::Response {
        self.http
            .get(self.http_url(path))
            .bearer_auth(format!("{}-token", user))
            .send()
            .await
            .unwrap()
    }

    /// Message history of a conversation as seen by `user`, newest first
    async fn messages_of(&self, user: &str, conversation: &str) -> Vec<serde_json::Value> {
        let response = self
            .get_as(user, &format!("/api/conversations/{}/messages", conversation))
            .await;
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }

    async fn connections_of(&self, user: &str) -> u64 {
        self.presence(user).await["connections"].as_u64().unwrap()
    }

    async fn wait_for_connections(&self, user: &str, expected: u64) {
        for _ in 0..100 {
            if self.connections_of(user).await == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("'{}' never reached {} connections", user, expected);
    }

    async fn stop(&mut self) -> Result<(), ServerError> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        match self.task.take() {
            Some(task) => task.await.unwrap(),
            None => Ok(()),
        }
    }
}

impl Drop for TestHub {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

fn test_config() -> HubConfig {
    HubConfig {
        shutdown_grace: Duration::from_secs(2),
        ..HubConfig::default()
    }
}

async fn send_json(client: &mut Client, value: serde_json::Value) {
    client
        .send(Message::Text(value.to_string().into()))
        .await
        .unwrap();
}

/// Receive the next JSON event, skipping control frames
async fn recv_event(client: &mut Client) -> serde_json::Value {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match client.next().await {
                Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).unwrap(),
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                other => panic!("unexpected frame: {:?}", other),
            }
        }
    })
    .await
    .expect("Timed out waiting for event")
}

async fn assert_no_event(client: &mut Client) {
    let result = tokio::time::timeout(Duration::from_millis(300), client.next()).await;
    assert!(result.is_err(), "unexpected frame: {:?}", result);
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: /api/health が {"status":"ok"} を返す
    // given (前提条件):
    let hub = TestHub::start(test_config()).await;

    // when (操作):
    let body: serde_json::Value = reqwest::get(hub.http_url("/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn test_connection_without_valid_token_is_rejected() {
    // テスト項目: トークンがない、または不正なトークンの接続は 401 で拒否され、接続は登録されない
    // given (前提条件):
    let hub = TestHub::start(test_config()).await;

    // when (操作):
    let missing = connect_async(hub.ws_url()).await;
    let invalid = connect_async(format!("{}?token=nope", hub.ws_url())).await;

    // then (期待する結果):
    for result in [missing, invalid] {
        match result {
            Err(WsError::Http(response)) => assert_eq!(response.status(), 401),
            other => panic!("expected 401, got {:?}", other.map(|(_, r)| r.status())),
        }
    }
    assert_eq!(hub.presence("alice").await["online"], false);
}

#[tokio::test]
async fn test_bearer_header_is_accepted() {
    // テスト項目: Authorization: Bearer ヘッダーで認証できる
    // given (前提条件):
    let hub = TestHub::start(test_config()).await;
    let mut request = hub.ws_url().into_client_request().unwrap();
    request.headers_mut().insert(
        "Authorization",
        HeaderValue::from_static("Bearer bob-token"),
    );

    // when (操作):
    let result = connect_async(request).await;

    // then (期待する結果):
    assert!(result.is_ok());
    hub.wait_for_connections("bob", 1).await;
}

#[tokio::test]
async fn test_message_fans_out_to_participants_only() {
    // テスト項目: メッセージは会話の参加者の全接続に届き、参加者以外には届かない
    // given (前提条件):
    let hub = TestHub::start(test_config()).await;
    let mut alice_phone = hub.connect("alice").await;
    let mut alice_laptop = hub.connect("alice").await;
    let mut bob = hub.connect("bob").await;
    let mut carol = hub.connect("carol").await;

    // when (操作):
    send_json(
        &mut alice_phone,
        serde_json::json!({"type": "message", "conversationId": "C1", "content": "  hi  "}),
    )
    .await;

    // then (期待する結果):
    for client in [&mut alice_phone, &mut alice_laptop, &mut bob] {
        let event = recv_event(client).await;
        assert_eq!(event["type"], "message");
        assert_eq!(event["message"]["conversationId"], "C1");
        assert_eq!(event["message"]["senderId"], "alice");
        assert_eq!(event["message"]["content"], "hi");
    }
    assert_no_event(&mut carol).await;

    let messages = hub.messages_of("bob", "C1").await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "hi");
}

#[tokio::test]
async fn test_typing_and_read_are_relayed_without_persistence() {
    // テスト項目: typing / read は永続化されずに参加者へ中継される
    // given (前提条件):
    let hub = TestHub::start(test_config()).await;
    let mut alice = hub.connect("alice").await;
    let mut bob = hub.connect("bob").await;

    // when (操作):
    send_json(
        &mut bob,
        serde_json::json!({"type": "typing", "conversationId": "C1"}),
    )
    .await;
    let typing = recv_event(&mut alice).await;
    send_json(
        &mut bob,
        serde_json::json!({"type": "read", "conversationId": "C1"}),
    )
    .await;
    let _ = recv_event(&mut alice).await;

    // then (期待する結果):
    assert_eq!(typing["type"], "typing");
    assert_eq!(typing["userId"], "bob");
    assert!(typing["ts"].is_string());
    assert_eq!(hub.messages_of("alice", "C1").await.len(), 0);
}

#[tokio::test]
async fn test_malformed_frame_keeps_connection_open() {
    // テスト項目: 不正なフレームは破棄され、接続は維持される
    // given (前提条件):
    let hub = TestHub::start(test_config()).await;
    let mut alice = hub.connect("alice").await;

    // when (操作):
    alice
        .send(Message::Text(r#"{"type":"message","conversationId":"C1""#.into()))
        .await
        .unwrap();
    alice
        .send(Message::Binary(vec![0xff, 0xfe].into()))
        .await
        .unwrap();
    send_json(
        &mut alice,
        serde_json::json!({"type": "message", "conversationId": "C1", "content": "still here"}),
    )
    .await;

    // then (期待する結果):
    let event = recv_event(&mut alice).await;
    assert_eq!(event["message"]["content"], "still here");
    assert_eq!(hub.messages_of("alice", "C1").await.len(), 1);
}

#[tokio::test]
async fn test_non_participant_message_is_dropped() {
    // テスト項目: 参加者でないユーザーのメッセージは永続化もブロードキャストもされない
    // given (前提条件):
    let hub = TestHub::start(test_config()).await;
    let mut alice = hub.connect("alice").await;
    let mut carol = hub.connect("carol").await;

    // when (操作):
    send_json(
        &mut carol,
        serde_json::json!({"type": "message", "conversationId": "C1", "content": "let me in"}),
    )
    .await;

    // then (期待する結果):
    assert_no_event(&mut alice).await;
    assert_eq!(hub.connections_of("carol").await, 1);
}

#[tokio::test]
async fn test_silent_connection_is_closed_after_read_timeout() {
    // テスト項目: read_timeout 内に何も送らない接続は切断され、Registry から削除される
    // given (前提条件):
    let hub = TestHub::start(HubConfig {
        read_timeout: Duration::from_millis(300),
        ..test_config()
    })
    .await;
    let mut dave = hub.connect("dave").await;

    // when (操作):
    hub.wait_for_connections("dave", 0).await;

    // then (期待する結果):
    let frame = tokio::time::timeout(Duration::from_secs(2), dave.next())
        .await
        .unwrap();
    assert!(matches!(frame, Some(Ok(Message::Close(_))) | None | Some(Err(_))));
    assert_eq!(hub.presence("dave").await["online"], false);
}

#[tokio::test]
async fn test_disconnect_updates_presence() {
    // テスト項目: クライアントが切断すると接続数が減る
    // given (前提条件):
    let hub = TestHub::start(test_config()).await;
    let mut first = hub.connect("bob").await;
    let _second = hub.connect("bob").await;

    // when (操作):
    first.close(None).await.unwrap();

    // then (期待する結果):
    hub.wait_for_connections("bob", 1).await;
    assert_eq!(hub.presence("bob").await["online"], true);
}

#[tokio::test]
async fn test_shutdown_closes_connections() {
    // テスト項目: シャットダウンで全接続が閉じられ、サーバーが正常終了する
    // given (前提条件):
    let mut hub = TestHub::start(test_config()).await;
    let mut alice = hub.connect("alice").await;

    // when (操作):
    let result = tokio::time::timeout(Duration::from_secs(5), hub.stop())
        .await
        .expect("Shutdown did not complete");

    // then (期待する結果):
    assert!(result.is_ok());
    let frame = tokio::time::timeout(Duration::from_secs(2), alice.next())
        .await
        .unwrap();
    assert!(matches!(frame, Some(Ok(Message::Close(_))) | None | Some(Err(_))));
}

#[tokio::test]
async fn test_conversation_api_requires_authentication() {
    // テスト項目: 会話 API は認証されていないリクエストを 401 で拒否する
    // given (前提条件):
    let hub = TestHub::start(test_config()).await;

    // when (操作):
    let list = reqwest::get(hub.http_url("/api/conversations")).await.unwrap();
    let history = hub
        .http
        .get(hub.http_url("/api/conversations/C1/messages"))
        .bearer_auth("nope")
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    for response in [list, history] {
        assert_eq!(response.status(), 401);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, serde_json::json!({"error": "Unauthorized"}));
    }
}

#[tokio::test]
async fn test_create_conversation_includes_creator_and_routes_messages() {
    // テスト項目: API で作成した会話には作成者が含まれ、WebSocket のメッセージがその参加者に届く
    // given (前提条件):
    let hub = TestHub::start(test_config()).await;
    let mut carol = hub.connect("carol").await;
    let mut bob = hub.connect("bob").await;

    // when (操作):
    let response = hub
        .http
        .post(hub.http_url("/api/conversations"))
        .bearer_auth("carol-token")
        .json(&serde_json::json!({"participantIds": ["bob", ""]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let conversation: serde_json::Value = response.json().await.unwrap();
    let id = conversation["id"].as_str().unwrap().to_string();
    send_json(
        &mut carol,
        serde_json::json!({"type": "message", "conversationId": id, "content": "welcome"}),
    )
    .await;

    // then (期待する結果):
    assert_eq!(
        conversation["participantIds"],
        serde_json::json!(["bob", "carol"])
    );
    assert!(conversation["createdAt"].is_string());
    let event = recv_event(&mut bob).await;
    assert_eq!(event["message"]["conversationId"], id.as_str());
    assert_eq!(event["message"]["content"], "welcome");
    let _ = recv_event(&mut carol).await;
}

#[tokio::test]
async fn test_create_conversation_rejects_invalid_body() {
    // テスト項目: 不正なリクエストボディは 400 {"error":"Invalid request"} になる
    // given (前提条件):
    let hub = TestHub::start(test_config()).await;

    // when (操作):
    let response = hub
        .http
        .post(hub.http_url("/api/conversations"))
        .bearer_auth("alice-token")
        .header("Content-Type", "application/json")
        .body(r#"{"participantIds": "bob"}"#)
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"error": "Invalid request"}));
}

#[tokio::test]
async fn test_list_conversations_is_paginated() {
    // テスト項目: 会話一覧は参加している会話のみを返し、limit / offset が効く
    // given (前提条件):
    let hub = TestHub::start(test_config()).await;
    for participant in ["bob", "dave"] {
        let response = hub
            .http
            .post(hub.http_url("/api/conversations"))
            .bearer_auth("alice-token")
            .json(&serde_json::json!({"participantIds": [participant]}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
    }

    // when (操作):
    let all: Vec<serde_json::Value> = hub
        .get_as("alice", "/api/conversations")
        .await
        .json()
        .await
        .unwrap();
    let page: Vec<serde_json::Value> = hub
        .get_as("alice", "/api/conversations?limit=1&offset=2")
        .await
        .json()
        .await
        .unwrap();
    let carol: Vec<serde_json::Value> = hub
        .get_as("carol", "/api/conversations?limit=0&offset=-1")
        .await
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(all.len(), 3);
    assert_eq!(page.len(), 1);
    assert!(carol.is_empty());
}

#[tokio::test]
async fn test_message_history_is_for_participants_only() {
    // テスト項目: メッセージ履歴は参加者のみ取得でき、非参加者は 403、存在しない会話は 404 になる
    // given (前提条件):
    let hub = TestHub::start(test_config()).await;
    let mut alice = hub.connect("alice").await;
    for content in ["first", "second"] {
        send_json(
            &mut alice,
            serde_json::json!({"type": "message", "conversationId": "C1", "content": content}),
        )
        .await;
        let _ = recv_event(&mut alice).await;
    }

    // when (操作):
    let newest = hub
        .get_as("dave", "/api/conversations/C1/messages?limit=1")
        .await;
    let forbidden = hub.get_as("carol", "/api/conversations/C1/messages").await;
    let missing = hub.get_as("alice", "/api/conversations/C9/messages").await;

    // then (期待する結果):
    assert_eq!(newest.status(), 200);
    let newest: Vec<serde_json::Value> = newest.json().await.unwrap();
    assert_eq!(newest.len(), 1);
    assert_eq!(newest[0]["content"], "second");
    assert_eq!(newest[0]["senderId"], "alice");
    assert_eq!(forbidden.status(), 403);
    assert_eq!(missing.status(), 404);
}
