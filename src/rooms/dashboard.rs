use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::{session::DASHBOARD, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chatroom {
    pub id: i64,
    pub name: String,
}

impl Chatroom {
    /// "Random" in any casing gets the full-screen chat.
    pub fn is_random(&self) -> bool {
        self.name.to_lowercase() == "random"
    }
}

/// Where opening a chatroom leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Overlay(Chatroom),
    RandomChatroom,
    Nowhere,
}

/// A visitor's chatroom list plus the overlay chat they have open, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    chatrooms: Vec<Chatroom>,
    active: Option<i64>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            chatrooms: vec![
                Chatroom { id: 1, name: "General".to_owned() },
                Chatroom { id: 2, name: "Random".to_owned() },
            ],
            active: None,
        }
    }
}

impl Dashboard {
    pub async fn load(session: &Session) -> AppResult<Dashboard> {
        Ok(session.get::<Dashboard>(DASHBOARD).await?.unwrap_or_default())
    }

    pub async fn store(&self, session: &Session) -> AppResult<()> {
        session.insert(DASHBOARD, self).await?;
        Ok(())
    }

    pub fn chatrooms(&self) -> &[Chatroom] {
        &self.chatrooms
    }

    /// The chatroom whose overlay is open.
    pub fn active(&self) -> Option<&Chatroom> {
        let id = self.active?;
        self.chatrooms.iter().find(|c| c.id == id)
    }

    /// Appends a chatroom keyed by its creation time in milliseconds. Blank
    /// names are ignored. Names need not be unique, ids are bumped to stay so.
    pub fn add(&mut self, name: &str, now_ms: i64) -> Option<&Chatroom> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let id = match self.chatrooms.iter().map(|c| c.id).max() {
            Some(last) if last >= now_ms => last + 1,
            _ => now_ms,
        };
        let index = self.chatrooms.len();
        self.chatrooms.push(Chatroom { id, name: name.to_owned() });
        Some(&self.chatrooms[index])
    }

    /// Removes the chatroom with `id`, closing its overlay if it was open.
    pub fn delete(&mut self, id: i64) -> Option<Chatroom> {
        let index = self.chatrooms.iter().position(|c| c.id == id)?;
        if self.active == Some(id) {
            self.active = None;
        }
        Some(self.chatrooms.remove(index))
    }

    pub fn open(&mut self, id: i64) -> Destination {
        let Some(chatroom) = self.chatrooms.iter().find(|c| c.id == id) else {
            return Destination::Nowhere;
        };
        if chatroom.is_random() {
            return Destination::RandomChatroom;
        }
        let chatroom = chatroom.clone();
        self.active = Some(chatroom.id);
        Destination::Overlay(chatroom)
    }

    pub fn close(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_seeded() {
        let dashboard = Dashboard::default();
        let names: Vec<&str> = dashboard.chatrooms().iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, ["General", "Random"]);
        assert!(dashboard.active().is_none());
    }

    #[test]
    fn test_add_blank_is_ignored() {
        let mut dashboard = Dashboard::default();
        let before = dashboard.clone();

        assert!(dashboard.add("", NOW).is_none());
        assert!(dashboard.add("   \t\n", NOW).is_none());
        assert_eq!(dashboard, before);
    }

    #[test]
    fn test_add_appends_one() {
        let mut dashboard = Dashboard::default();

        let added = dashboard.add("  Team ", NOW).unwrap().clone();
        assert_eq!(added, Chatroom { id: NOW, name: "Team".to_owned() });
        assert_eq!(dashboard.chatrooms().len(), 3);
        assert_eq!(dashboard.chatrooms().last(), Some(&added));
    }

    #[test]
    fn test_duplicate_names_get_distinct_ids() {
        let mut dashboard = Dashboard::default();

        let first = dashboard.add("Team", NOW).unwrap().id;
        let second = dashboard.add("Team", NOW).unwrap().id;
        assert_ne!(first, second);
        assert_eq!(dashboard.chatrooms().iter().filter(|c| c.name == "Team").count(), 2);
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let mut dashboard = Dashboard::default();
        dashboard.add("Team", NOW);
        dashboard.add("Team", NOW);

        let removed = dashboard.delete(NOW).unwrap();
        assert_eq!(removed.id, NOW);
        assert_eq!(dashboard.chatrooms().len(), 3);
        assert!(dashboard.delete(NOW).is_none());
        assert_eq!(dashboard.chatrooms().len(), 3);
    }

    #[test]
    fn test_delete_closes_open_overlay() {
        let mut dashboard = Dashboard::default();
        assert!(matches!(dashboard.open(1), Destination::Overlay(_)));
        assert_eq!(dashboard.active().map(|c| c.id), Some(1));

        dashboard.delete(1);
        assert!(dashboard.active().is_none());
    }

    #[test]
    fn test_delete_other_keeps_overlay() {
        let mut dashboard = Dashboard::default();
        let id = dashboard.add("Team", NOW).unwrap().id;
        dashboard.open(1);

        dashboard.delete(id);
        assert_eq!(dashboard.active().map(|c| c.id), Some(1));
    }

    #[test]
    fn test_random_never_opens_overlay() {
        let mut dashboard = Dashboard::default();
        for (offset, name) in ["random", "RANDOM", "rAnDoM"].into_iter().enumerate() {
            let id = dashboard.add(name, NOW + offset as i64).unwrap().id;
            assert_eq!(dashboard.open(id), Destination::RandomChatroom);
            assert!(dashboard.active().is_none());
        }
        assert_eq!(dashboard.open(2), Destination::RandomChatroom);
    }

    #[test]
    fn test_open_unknown_and_close() {
        let mut dashboard = Dashboard::default();

        assert_eq!(dashboard.open(42), Destination::Nowhere);
        dashboard.open(1);
        dashboard.close();
        assert!(dashboard.active().is_none());
    }
}
