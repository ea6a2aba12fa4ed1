use std::rc::Rc;

use crate::error::Result;

use super::schema::PENDING_CREATOR_KEY;
use super::store::KeyValueStore;

/// Single-slot marker naming the creator the user left to go check.
/// Lives in the session store; a second `set` overwrites the first.
#[derive(Clone)]
pub struct PendingReturn {
    session: Rc<dyn KeyValueStore>,
}

impl PendingReturn {
    pub fn new(session: Rc<dyn KeyValueStore>) -> Self {
        Self { session }
    }

    pub fn set(&self, creator_id: &str) -> Result<()> {
        self.session.set(PENDING_CREATOR_KEY, creator_id)
    }

    pub fn get(&self) -> Result<Option<String>> {
        self.session.get(PENDING_CREATOR_KEY)
    }

    pub fn clear(&self) -> Result<()> {
        self.session.delete(PENDING_CREATOR_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn test_single_slot() {
        let pending = PendingReturn::new(Rc::new(MemoryStore::new()));
        assert_eq!(pending.get().unwrap(), None);

        pending.set("c1").unwrap();
        pending.set("c2").unwrap();
        assert_eq!(pending.get().unwrap().as_deref(), Some("c2"));

        pending.clear().unwrap();
        assert_eq!(pending.get().unwrap(), None);
    }

    #[test]
    fn test_new_session_starts_empty() {
        let pending = PendingReturn::new(Rc::new(MemoryStore::new()));
        pending.set("c1").unwrap();

        let next_session = PendingReturn::new(Rc::new(MemoryStore::new()));
        assert_eq!(next_session.get().unwrap(), None);
    }
}
