//! Chat widget session: one exchange in flight at a time.

use crate::ChatRequest;

/// Sentinel sent to make the bot open the conversation.
pub const GREETING_MESSAGE: &str = "halo";
pub const GREETING_FAILED_REPLY: &str =
    "Sorry, an error occurred while starting the conversation. Please reload the page.";
pub const EXCHANGE_FAILED_REPLY: &str = "Maaf, terjadi kesalahan. Mohon coba lagi nanti.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// A transcript entry. Bot text is Markdown; user text is shown literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub sender: Sender,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeKind {
    Greeting,
    UserMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Exchange {
    #[default]
    Idle,
    Sending { id: u64, kind: ExchangeKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SendRejected {
    Empty,
    Busy,
    GreetingAlreadySent,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ChatState {
    session_id: String,
    conversation_has_started: bool,
    initial_greeting_sent: bool,
    exchange: Exchange,
    next_exchange_id: u64,
    transcript: Vec<ChatTurn>,
}

impl ChatState {
    pub(crate) fn new(session_id: String) -> Self {
        Self {
            session_id,
            ..Self::default()
        }
    }

    pub(crate) fn begin_greeting(&mut self) -> Result<(u64, ChatRequest), SendRejected> {
        if self.initial_greeting_sent {
            return Err(SendRejected::GreetingAlreadySent);
        }
        if self.is_sending() {
            return Err(SendRejected::Busy);
        }
        let request = ChatRequest {
            message: GREETING_MESSAGE.to_string(),
            user_id: self.session_id.clone(),
            conversation_has_started: false,
            is_initial_greeting_sent: false,
        };
        Ok((self.start(ExchangeKind::Greeting), request))
    }

    /// Appends the user's turn optimistically and opens an exchange.
    pub(crate) fn begin_message(&mut self, raw: &str) -> Result<(u64, ChatRequest), SendRejected> {
        let message = raw.trim();
        if message.is_empty() {
            return Err(SendRejected::Empty);
        }
        if self.is_sending() {
            return Err(SendRejected::Busy);
        }
        self.transcript.push(ChatTurn {
            sender: Sender::User,
            text: message.to_string(),
        });
        let request = ChatRequest {
            message: message.to_string(),
            user_id: self.session_id.clone(),
            conversation_has_started: self.conversation_has_started,
            is_initial_greeting_sent: self.initial_greeting_sent,
        };
        Ok((self.start(ExchangeKind::UserMessage), request))
    }

    fn start(&mut self, kind: ExchangeKind) -> u64 {
        self.next_exchange_id += 1;
        let id = self.next_exchange_id;
        self.exchange = Exchange::Sending { id, kind };
        id
    }

    /// Settles the open exchange. Replies for any other exchange are ignored
    /// and `None` is returned.
    pub(crate) fn finish(
        &mut self,
        exchange_id: u64,
        result: Result<String, String>,
    ) -> Option<ExchangeKind> {
        let kind = match self.exchange {
            Exchange::Sending { id, kind } if id == exchange_id => kind,
            _ => return None,
        };
        self.exchange = Exchange::Idle;

        let text = match (result, kind) {
            (Ok(reply), ExchangeKind::Greeting) => {
                self.initial_greeting_sent = true;
                reply
            }
            (Ok(reply), ExchangeKind::UserMessage) => {
                self.conversation_has_started = true;
                reply
            }
            (Err(_), ExchangeKind::Greeting) => GREETING_FAILED_REPLY.to_string(),
            (Err(_), ExchangeKind::UserMessage) => EXCHANGE_FAILED_REPLY.to_string(),
        };
        self.transcript.push(ChatTurn {
            sender: Sender::Bot,
            text,
        });
        Some(kind)
    }

    pub(crate) fn is_sending(&self) -> bool {
        matches!(self.exchange, Exchange::Sending { .. })
    }

    pub(crate) fn session_id(&self) -> &str {
        &self.session_id
    }

    pub(crate) fn conversation_has_started(&self) -> bool {
        self.conversation_has_started
    }

    pub(crate) fn initial_greeting_sent(&self) -> bool {
        self.initial_greeting_sent
    }

    pub(crate) fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }
}
