//! Session manager flows against scripted and real relays.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::json;

use routine_builder::manager::{
    STATUS_EMPTY_SELECTION, STATUS_NO_ACTIVE_ROUTINE, STATUS_RELAY_FAILED, STATUS_ROUTINE_READY,
    StatusUpdate,
};
use routine_builder::store::load_selection;
use routine_builder::{
    Catalog, ChatCompletionRequest, ChatRelay, ChatRole, Error, FileStore, MemoryStore, Product,
    Relay, RelayClient, RelayConfig, RelayRequest, Result, SessionManager, Upstream, router,
};

fn product(id: u64, brand: &str, name: &str, category: &str) -> Product {
    Product {
        id,
        brand: brand.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        description: format!("{name} description"),
        image: format!("https://img.example.com/{id}.png"),
    }
}

fn catalog() -> Catalog {
    Catalog::new(vec![
        product(1, "CeraVe", "Foaming Facial Cleanser", "cleanser"),
        product(2, "La Roche-Posay", "Anthelios Sunscreen", "suncare"),
        product(3, "Lancôme", "Advanced Génifique Serum", "skincare"),
    ])
}

fn reply(text: &str) -> String {
    json!({"choices": [{"message": {"role": "assistant", "content": text}}]}).to_string()
}

#[derive(Clone, Default)]
struct ScriptedRelay {
    replies: Arc<Mutex<VecDeque<Result<String>>>>,
    sent: Arc<Mutex<Vec<RelayRequest>>>,
}

impl ScriptedRelay {
    fn replying(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            sent: Arc::default(),
        }
    }

    fn sent(&self) -> Vec<RelayRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatRelay for ScriptedRelay {
    async fn send(&self, request: &RelayRequest) -> Result<String> {
        self.sent.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::transport("no scripted reply", None)))
    }
}

#[tokio::test]
async fn empty_selection_makes_no_call() {
    let relay = ScriptedRelay::default();
    let mut manager = SessionManager::new(catalog(), relay.clone(), MemoryStore::new());

    let outcome = manager.generate_routine().await;
    assert!(outcome.error.unwrap().is_empty_selection());
    assert_eq!(outcome.status.text(), Some(STATUS_EMPTY_SELECTION));
    assert!(relay.sent().is_empty());
}

#[tokio::test]
async fn follow_up_requires_routine() {
    let relay = ScriptedRelay::default();
    let mut manager = SessionManager::new(catalog(), relay.clone(), MemoryStore::new());

    let outcome = manager.send_follow_up("Can I use this daily?").await;
    assert!(outcome.error.unwrap().is_no_active_routine());
    assert_eq!(outcome.status.text(), Some(STATUS_NO_ACTIVE_ROUTINE));
    assert!(relay.sent().is_empty());
    assert_eq!(manager.session().transcript().len(), 1);
}

#[tokio::test]
async fn routine_then_follow_up() {
    let relay = ScriptedRelay::replying(vec![
        Ok(reply("Morning: cleanser, then sunscreen.")),
        Ok(reply("Yes, every morning.")),
    ]);
    let mut manager = SessionManager::new(catalog(), relay.clone(), MemoryStore::new());
    manager.toggle_selection(2);
    manager.toggle_selection(1);
    manager.set_web_search(true);

    let outcome = manager.generate_routine().await;
    assert!(outcome.is_success());
    assert_eq!(outcome.status.text(), Some(STATUS_ROUTINE_READY));
    assert_eq!(
        outcome.reply.as_deref(),
        Some("Morning: cleanser, then sunscreen.")
    );
    assert!(manager.session().routine_active());

    let outcome = manager.send_follow_up("  Every day?  ").await;
    assert!(outcome.is_success());
    assert_eq!(outcome.status, StatusUpdate::Clear);
    assert_eq!(outcome.reply.as_deref(), Some("Yes, every morning."));

    let sent = relay.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|r| r.web_search));

    let first = &sent[0].messages;
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].role, ChatRole::System);
    assert_eq!(first[1].role, ChatRole::User);
    let sunscreen = first[1].content.find("Anthelios").unwrap();
    let cleanser = first[1].content.find("Foaming Facial Cleanser").unwrap();
    assert!(sunscreen < cleanser);

    let second = &sent[1].messages;
    assert_eq!(second.len(), 4);
    assert_eq!(second[2].role, ChatRole::Assistant);
    assert_eq!(second[3].content, "Every day?");
    assert_eq!(manager.session().transcript().len(), 5);
}

#[tokio::test]
async fn failed_reply_keeps_question() {
    let relay = ScriptedRelay::replying(vec![
        Ok(reply("Use the serum at night.")),
        Err(Error::upstream(500, "boom")),
        Ok(json!({"choices": []}).to_string()),
    ]);
    let mut manager = SessionManager::new(catalog(), relay.clone(), MemoryStore::new());
    manager.toggle_selection(3);
    assert!(manager.generate_routine().await.is_success());

    let outcome = manager.send_follow_up("How much?").await;
    assert!(!outcome.is_success());
    assert_eq!(outcome.status.text(), Some(STATUS_RELAY_FAILED));
    assert!(manager.session().routine_active());
    let messages = manager.session().transcript().messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[3].content, "How much?");

    let outcome = manager.send_follow_up("Still there?").await;
    assert!(outcome.error.unwrap().is_empty_reply());
    assert_eq!(outcome.status.text(), Some(STATUS_RELAY_FAILED));
    assert_eq!(manager.session().transcript().len(), 5);
}

#[tokio::test]
async fn new_routine_resets_conversation() {
    let relay = ScriptedRelay::replying(vec![
        Ok(reply("First routine.")),
        Ok(reply("Answer.")),
        Ok(reply("Second routine.")),
    ]);
    let mut manager = SessionManager::new(catalog(), relay.clone(), MemoryStore::new());
    manager.toggle_selection(1);
    manager.generate_routine().await;
    manager.send_follow_up("Question?").await;
    manager.toggle_selection(3);

    let outcome = manager.generate_routine().await;
    assert!(outcome.is_success());
    let sent = relay.sent();
    assert_eq!(sent[2].messages.len(), 2);
    assert_eq!(manager.session().transcript().len(), 3);
    assert_eq!(manager.session().chat_view().len(), 3);
}

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("routine-builder-{}-{name}", std::process::id()))
        .join("store.json")
}

#[test]
fn selection_survives_restart() {
    let path = scratch_path("restart");
    let _ = std::fs::remove_file(&path);

    let mut manager =
        SessionManager::new(catalog(), ScriptedRelay::default(), FileStore::new(&path));
    manager.toggle_selection(3);
    manager.toggle_selection(1);
    drop(manager);

    let manager = SessionManager::new(catalog(), ScriptedRelay::default(), FileStore::new(&path));
    assert_eq!(manager.session().selection().ids(), &[3, 1]);

    let smaller = Catalog::new(vec![product(1, "CeraVe", "Foaming Facial Cleanser", "cleanser")]);
    let manager = SessionManager::new(smaller, ScriptedRelay::default(), FileStore::new(&path));
    assert_eq!(manager.session().selection().ids(), &[1]);
    assert_eq!(load_selection(manager.store()), vec![3, 1]);

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[derive(Clone)]
struct Canned(std::result::Result<String, Error>);

#[async_trait::async_trait]
impl Upstream for Canned {
    async fn complete(&self, _: &ChatCompletionRequest) -> Result<String> {
        self.0.clone()
    }
}

async fn spawn_relay(upstream: Canned) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(Arc::new(Relay::new(upstream, RelayConfig::new())));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}

#[tokio::test]
async fn full_stack_over_http() {
    let url = spawn_relay(Canned(Ok(reply("Apply sunscreen last.")))).await;
    let relay = RelayClient::new(&url).unwrap();
    let mut manager = SessionManager::new(catalog(), relay, MemoryStore::new());
    manager.toggle_selection(2);

    let outcome = manager.generate_routine().await;
    assert!(outcome.is_success());
    assert_eq!(outcome.reply.as_deref(), Some("Apply sunscreen last."));
}

#[tokio::test]
async fn upstream_failure_over_http() {
    let url = spawn_relay(Canned(Err(Error::upstream(429, "rate limited")))).await;
    let relay = RelayClient::new(&url).unwrap();
    let mut manager = SessionManager::new(catalog(), relay, MemoryStore::new());
    manager.toggle_selection(2);

    let outcome = manager.generate_routine().await;
    let err = outcome.error.unwrap();
    assert!(err.is_upstream());
    assert_eq!(err.status_code(), Some(429));
    assert_eq!(outcome.status.text(), Some(STATUS_RELAY_FAILED));
    assert!(!manager.session().routine_active());
}
