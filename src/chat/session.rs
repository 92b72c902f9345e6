use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::{sync::mpsc, task::JoinSet};
use uuid::Uuid;

use super::msg::{self, ChatMessage, Draft, Sender};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("nothing to send")]
    Empty,
    #[error("chat session is closed")]
    Closed,
}

/// Window the simulated reply delay is drawn from, `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyDelay {
    pub min: Duration,
    pub max: Duration,
}

impl Default for ReplyDelay {
    fn default() -> Self {
        Self::new(Duration::from_millis(1200), Duration::from_millis(2400))
    }
}

impl ReplyDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut impl Rng) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        if max <= min {
            return self.min;
        }
        Duration::from_millis(rng.random_range(min..max))
    }
}

/// One chat view's conversation.
///
/// The transcript is append-only with ids counting up from 1. Every accepted
/// user message schedules one assistant reply on a timer task; the replies come
/// back through [`ChatSession::next_reply`]. Closing or dropping the session
/// aborts whatever is still pending.
pub struct ChatSession {
    id: Uuid,
    room: String,
    assistant: String,
    delay: ReplyDelay,

    transcript: Vec<ChatMessage>,
    next_id: u64,

    pending: JoinSet<()>,
    in_flight: usize,
    replies_tx: mpsc::UnboundedSender<String>,
    replies_rx: mpsc::UnboundedReceiver<String>,
    closed: bool,
}

impl ChatSession {
    pub fn new(room: impl Into<String>, assistant: impl Into<String>, delay: ReplyDelay) -> Self {
        let (replies_tx, replies_rx) = mpsc::unbounded_channel();
        Self {
            id: Uuid::now_v7(),
            room: room.into(),
            assistant: assistant.into(),
            delay,
            transcript: Vec::new(),
            next_id: 1,
            pending: JoinSet::new(),
            in_flight: 0,
            replies_tx,
            replies_rx,
            closed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn assistant(&self) -> &str {
        &self.assistant
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// True while at least one reply is still on its way.
    pub fn is_typing(&self) -> bool {
        self.in_flight > 0
    }

    /// Appends the user's message and schedules the echo reply.
    pub fn send(&mut self, draft: Draft) -> Result<&ChatMessage, ChatError> {
        if self.closed {
            return Err(ChatError::Closed);
        }

        let text = draft.text.trim().to_owned();
        let image = draft.image.filter(|image| !image.is_empty());
        if text.is_empty() && image.is_none() {
            return Err(ChatError::Empty);
        }

        let reply = msg::reply_text(&self.assistant, &text, image.is_some());
        self.schedule_reply(reply);

        Ok(self.append(Sender::User, text, image))
    }

    /// Waits for the next scheduled reply and appends it. Cancel safe.
    ///
    /// Returns `None` once the session is closed.
    pub async fn next_reply(&mut self) -> Option<ChatMessage> {
        if self.closed {
            return None;
        }

        let text = self.replies_rx.recv().await?;
        self.in_flight = self.in_flight.saturating_sub(1);
        while self.pending.try_join_next().is_some() {}

        Some(self.append(Sender::Assistant, text, None).clone())
    }

    /// Aborts every pending reply. Nothing is appended afterwards.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.pending.abort_all();
        self.in_flight = 0;
        while self.replies_rx.try_recv().is_ok() {}
        tracing::debug!(chat = %self.id, room = %self.room, messages = self.transcript.len(), "chat session closed");
    }

    fn schedule_reply(&mut self, reply: String) {
        let delay = self.delay.sample(&mut rand::rng());
        let replies_tx = self.replies_tx.clone();

        self.in_flight += 1;
        self.pending.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = replies_tx.send(reply);
        });
    }

    fn append(&mut self, sender: Sender, text: String, image: Option<String>) -> &ChatMessage {
        let index = self.transcript.len();
        self.transcript.push(ChatMessage {
            id: self.next_id,
            sender,
            text,
            image,
            timestamp: OffsetDateTime::now_utc(),
        });
        self.next_id += 1;
        &self.transcript[index]
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use tokio::time::{timeout, Instant};

    use super::*;

    fn draft(text: &str) -> Draft {
        Draft { text: text.to_owned(), image: None }
    }

    fn session() -> ChatSession {
        ChatSession::new("General", "Gemini", ReplyDelay::default())
    }

    #[test]
    fn test_delay_sample_stays_in_window() {
        let delay = ReplyDelay::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let d = delay.sample(&mut rng);
            assert!(d >= Duration::from_millis(1200) && d < Duration::from_millis(2400), "{d:?}");
        }

        let fixed = ReplyDelay::new(Duration::from_millis(5), Duration::from_millis(5));
        assert_eq!(fixed.sample(&mut rng), Duration::from_millis(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hello_gets_one_echo() {
        let mut chat = session();
        let start = Instant::now();

        let sent = chat.send(draft("hello")).unwrap().clone();
        assert_eq!(sent.sender, Sender::User);
        assert_eq!(sent.text, "hello");
        assert!(chat.is_typing());

        let reply = chat.next_reply().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1200));
        assert!(start.elapsed() < Duration::from_millis(2400));
        assert_eq!(reply.sender, Sender::Assistant);
        assert!(reply.text.contains("hello"));
        assert_eq!(reply.text, "Gemini says: \"hello\"");
        assert!(!chat.is_typing());

        assert!(timeout(Duration::from_secs(10), chat.next_reply()).await.is_err());
        assert_eq!(chat.messages().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_sends_are_rejected() {
        let mut chat = session();

        assert_eq!(chat.send(draft("")).unwrap_err(), ChatError::Empty);
        assert_eq!(chat.send(draft("   ")).unwrap_err(), ChatError::Empty);
        assert_eq!(
            chat.send(Draft { text: String::new(), image: Some(String::new()) }).unwrap_err(),
            ChatError::Empty
        );
        assert!(chat.messages().is_empty());
        assert!(!chat.is_typing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_image_only_message() {
        let mut chat = session();

        let sent = chat
            .send(Draft { text: "  ".into(), image: Some("data:image/png;base64,AAAA".into()) })
            .unwrap()
            .clone();
        assert_eq!(sent.text, "");
        assert!(sent.image.is_some());

        let reply = chat.next_reply().await.unwrap();
        assert!(reply.text.ends_with("[Image received]"));
        assert!(reply.image.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ids_are_monotonic() {
        let mut chat = session();

        chat.send(draft("one")).unwrap();
        chat.send(draft("two")).unwrap();
        chat.next_reply().await.unwrap();
        chat.send(draft("three")).unwrap();
        chat.next_reply().await.unwrap();
        chat.next_reply().await.unwrap();

        let ids: Vec<u64> = chat.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, [1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_holds_until_last_reply() {
        let mut chat = session();

        chat.send(draft("a")).unwrap();
        chat.send(draft("b")).unwrap();
        chat.next_reply().await.unwrap();
        assert!(chat.is_typing());
        chat.next_reply().await.unwrap();
        assert!(!chat.is_typing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_cancels_pending_replies() {
        let mut chat = session();

        chat.send(draft("hello")).unwrap();
        chat.close();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(chat.next_reply().await.is_none());
        assert_eq!(chat.messages().len(), 1);
        assert!(!chat.is_typing());
        assert_eq!(chat.send(draft("again")).unwrap_err(), ChatError::Closed);
    }
}
