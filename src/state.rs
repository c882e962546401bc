use crate::advice::AdviceClient;
use crate::chat::ChatSession;
use crate::session::SessionStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<SessionStore>>,
    pub chat: Arc<ChatSession>,
    pub advice: AdviceClient,
}

impl AppState {
    pub fn new(session: SessionStore, advice: AdviceClient) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            chat: Arc::new(ChatSession::new()),
            advice,
        }
    }
}
