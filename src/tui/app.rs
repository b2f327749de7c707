use crate::config::Config;
use crate::engine::profile::UserRecord;
use crate::transport::{IncomingMessage, OutgoingReply};

pub struct App {
    pub config: Config,
    pub tabs: Vec<String>,
    pub tab_index: usize,
    pub status: String,
    pub logs: Vec<String>,
    pub stats: Stats,
    pub user_id: String,
    pub input: String,
    pub chat: Vec<ChatLine>,
    /// Record of the active user as last read from storage.
    pub profile: Option<UserRecord>,
    /// Set when `profile` should be re-read before the next draw.
    pub profile_stale: bool,
    /// Messages typed but not yet handed to the processor.
    pub outbox: Vec<IncomingMessage>,
    pub should_quit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub time: String,
    pub from: String,
    pub text: String,
    pub is_reply: bool,
}

#[derive(Debug, Default)]
pub struct Stats {
    pub messages_sent: u64,
    pub replies_received: u64,
}

const MAX_LOGS: usize = 100;
const MAX_CHAT: usize = 200;

impl App {
    pub fn new(config: Config) -> Self {
        let user_id = config.system.default_user.clone();
        Self {
            config,
            tabs: vec!["Chat".to_string(), "Perfil".to_string(), "Logs".to_string(), "Config".to_string()],
            tab_index: 0,
            status: format!("Jogando como {}", user_id),
            logs: Vec::new(),
            stats: Stats::default(),
            user_id,
            input: String::new(),
            chat: Vec::new(),
            profile: None,
            profile_stale: true,
            outbox: Vec::new(),
            should_quit: false,
        }
    }

    pub fn add_log(&mut self, message: String) {
        self.logs.push(message);
        if self.logs.len() > MAX_LOGS {
            self.logs.remove(0);
        }
    }

    fn push_chat(&mut self, from: String, text: String, is_reply: bool) {
        let time = chrono::Local::now().format("%H:%M:%S").to_string();
        self.chat.push(ChatLine { time, from, text, is_reply });
        if self.chat.len() > MAX_CHAT {
            self.chat.remove(0);
        }
    }

    pub fn next_tab(&mut self) {
        self.tab_index = (self.tab_index + 1) % self.tabs.len();
    }

    pub fn previous_tab(&mut self) {
        if self.tab_index > 0 {
            self.tab_index -= 1;
        } else {
            self.tab_index = self.tabs.len() - 1;
        }
    }

    /// Handles Enter in the input box. `@<id>` switches the active user,
    /// anything else is queued as a chat message.
    pub fn submit_input(&mut self) {
        let line = std::mem::take(&mut self.input);
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        if let Some(user) = line.strip_prefix('@') {
            let user = user.trim();
            if !user.is_empty() {
                self.user_id = user.to_string();
                self.profile = None;
                self.profile_stale = true;
                self.status = format!("Jogando como {}", self.user_id);
                self.add_log(format!("Switched to user {}", self.user_id));
            }
            return;
        }

        self.push_chat(self.user_id.clone(), line.to_string(), false);
        self.outbox.push(IncomingMessage::new(self.user_id.clone(), line));
        self.stats.messages_sent += 1;
    }

    pub fn take_outbox(&mut self) -> Vec<IncomingMessage> {
        std::mem::take(&mut self.outbox)
    }

    pub fn on_reply(&mut self, reply: OutgoingReply) {
        self.stats.replies_received += 1;
        if reply.user_id == self.user_id {
            self.profile_stale = true;
        }
        self.add_log(format!("Reply to {}", reply.user_id));
        self.push_chat(format!("bot → {}", reply.user_id), reply.text, true);
    }
}
