use std::rc::Rc;

use crate::error::{AppError, Result};
use crate::models::{Creator, CreatorUpdate};

use super::schema::CREATORS_KEY;
use super::store::KeyValueStore;

/// Owns the creators collection. Every mutation rewrites the whole array.
#[derive(Clone)]
pub struct CreatorRegistry {
    store: Rc<dyn KeyValueStore>,
}

impl CreatorRegistry {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Every stored creator, in storage order.
    pub fn list_all(&self) -> Result<Vec<Creator>> {
        match self.store.get(CREATORS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, creators: &[Creator]) -> Result<()> {
        let json = serde_json::to_string(creators)?;
        self.store.set(CREATORS_KEY, &json)
    }

    /// Active creators by ascending `order`; equal orders keep storage order.
    pub fn list_active(&self) -> Result<Vec<Creator>> {
        let mut creators: Vec<Creator> = self
            .list_all()?
            .into_iter()
            .filter(|c| !c.archived)
            .collect();
        creators.sort_by_key(|c| c.order);
        Ok(creators)
    }

    pub fn list_archived(&self) -> Result<Vec<Creator>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|c| c.archived)
            .collect())
    }

    pub fn get(&self, id: &str) -> Result<Option<Creator>> {
        Ok(self.list_all()?.into_iter().find(|c| c.id == id))
    }

    pub fn add(&self, username: &str, display_name: &str) -> Result<Creator> {
        let mut creators = self.list_all()?;
        if creators.iter().any(|c| c.username == username) {
            return Err(AppError::Duplicate(username.to_string()));
        }

        let max_order = creators.iter().map(|c| c.order).max().unwrap_or(0).max(0);
        let display_name = display_name.trim();
        let creator = Creator {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            name: if display_name.is_empty() {
                username.to_string()
            } else {
                display_name.to_string()
            },
            url: Creator::profile_url(username),
            icon_url: None,
            order: max_order + 1,
            archived: false,
            last_known_article_count: None,
            last_checked_at: None,
            has_new: false,
        };

        creators.push(creator.clone());
        self.save(&creators)?;
        tracing::info!(id = %creator.id, username, "Registered creator");
        Ok(creator)
    }

    pub fn update(&self, id: &str, update: CreatorUpdate) -> Result<Creator> {
        let mut creators = self.list_all()?;
        let creator = creators
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;

        update.apply_to(creator);
        let updated = creator.clone();
        self.save(&creators)?;
        Ok(updated)
    }

    pub fn archive(&self, id: &str) -> Result<Creator> {
        self.update(id, CreatorUpdate::archived(true))
    }

    pub fn restore(&self, id: &str) -> Result<Creator> {
        self.update(id, CreatorUpdate::archived(false))
    }

    /// Assigns each listed creator its 1-based position as `order`.
    /// Unknown ids are skipped; unlisted creators keep their current order.
    pub fn reorder(&self, ordered_ids: &[String]) -> Result<()> {
        let mut creators = self.list_all()?;
        for (i, id) in ordered_ids.iter().enumerate() {
            match creators.iter_mut().find(|c| &c.id == id) {
                Some(creator) => creator.order = i as i64 + 1,
                None => tracing::debug!(id = %id, "Ignoring unknown id in reorder"),
            }
        }
        self.save(&creators)
    }

    pub fn move_up(&self, id: &str) -> Result<()> {
        self.shift(id, -1)
    }

    pub fn move_down(&self, id: &str) -> Result<()> {
        self.shift(id, 1)
    }

    fn shift(&self, id: &str, delta: isize) -> Result<()> {
        let mut ids: Vec<String> = self.list_active()?.into_iter().map(|c| c.id).collect();
        let Some(idx) = ids.iter().position(|c| c == id) else {
            return Err(AppError::NotFound(id.to_string()));
        };
        let target = idx as isize + delta;
        if target < 0 || target as usize >= ids.len() {
            return Ok(());
        }
        ids.swap(idx, target as usize);
        self.reorder(&ids)
    }

    pub fn export_all(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.list_all()?)?)
    }

    /// Replaces the whole collection. Nothing is written unless the payload
    /// parses as an array of creators.
    pub fn import_all(&self, json: &str) -> Result<usize> {
        let creators: Vec<Creator> = serde_json::from_str(json)
            .map_err(|e| AppError::MalformedInput(e.to_string()))?;
        self.save(&creators)?;
        tracing::info!(count = creators.len(), "Imported creators");
        Ok(creators.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn registry() -> CreatorRegistry {
        CreatorRegistry::new(Rc::new(MemoryStore::new()))
    }

    fn ids(creators: &[Creator]) -> Vec<String> {
        creators.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn test_add_sets_defaults() {
        let registry = registry();
        let creator = registry.add("alice", "Alice").unwrap();

        assert_eq!(creator.username, "alice");
        assert_eq!(creator.name, "Alice");
        assert_eq!(creator.url, "https://note.com/alice");
        assert_eq!(creator.order, 1);
        assert!(!creator.archived);
        assert_eq!(creator.icon_url, None);
        assert_eq!(creator.last_known_article_count, None);
        assert_eq!(creator.last_checked_at, None);
    }

    #[test]
    fn test_add_blank_name_falls_back_to_username() {
        let creator = registry().add("bob", "  ").unwrap();
        assert_eq!(creator.name, "bob");
    }

    #[test]
    fn test_add_appends_after_max_order() {
        let registry = registry();
        let a = registry.add("a", "").unwrap();
        registry
            .update(
                &a.id,
                CreatorUpdate {
                    order: Some(7),
                    ..Default::default()
                },
            )
            .unwrap();
        let b = registry.add("b", "").unwrap();
        assert_eq!(b.order, 8);
        assert_eq!(ids(&registry.list_active().unwrap()), vec![a.id, b.id]);
    }

    #[test]
    fn test_duplicate_username_rejected_without_write() {
        let registry = registry();
        let first = registry.add("alice", "Alice").unwrap();
        registry.archive(&first.id).unwrap();
        let before = registry.export_all().unwrap();

        let err = registry.add("alice", "Again").unwrap_err();
        assert!(matches!(err, AppError::Duplicate(ref u) if u == "alice"));
        assert_eq!(registry.export_all().unwrap(), before);
    }

    #[test]
    fn test_usernames_stay_unique() {
        let registry = registry();
        for name in ["a", "b", "a", "c", "b", "a"] {
            let _ = registry.add(name, "");
        }
        let mut usernames: Vec<String> = registry
            .list_all()
            .unwrap()
            .into_iter()
            .map(|c| c.username)
            .collect();
        usernames.sort();
        assert_eq!(usernames, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_update_unknown_id() {
        let err = registry().update("nope", CreatorUpdate::rename("x")).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_archive_and_restore_keep_order() {
        let registry = registry();
        let a = registry.add("a", "").unwrap();
        let b = registry.add("b", "").unwrap();

        registry.archive(&a.id).unwrap();
        assert_eq!(ids(&registry.list_active().unwrap()), vec![b.id.clone()]);
        assert_eq!(ids(&registry.list_archived().unwrap()), vec![a.id.clone()]);

        let restored = registry.restore(&a.id).unwrap();
        assert_eq!(restored.order, 1);
        assert_eq!(ids(&registry.list_active().unwrap()), vec![a.id, b.id]);
    }

    #[test]
    fn test_reorder_full_coverage() {
        let registry = registry();
        let a = registry.add("a", "").unwrap();
        let b = registry.add("b", "").unwrap();
        let c = registry.add("c", "").unwrap();

        let wanted = vec![c.id.clone(), a.id.clone(), b.id.clone()];
        registry.reorder(&wanted).unwrap();
        assert_eq!(ids(&registry.list_active().unwrap()), wanted);
    }

    #[test]
    fn test_reorder_ignores_unknown_ids() {
        let registry = registry();
        let a = registry.add("a", "").unwrap();
        let b = registry.add("b", "").unwrap();

        registry
            .reorder(&[b.id.clone(), "ghost".to_string(), a.id.clone()])
            .unwrap();
        let active = registry.list_active().unwrap();
        assert_eq!(ids(&active), vec![b.id, a.id]);
        assert_eq!(active[1].order, 3);
    }

    #[test]
    fn test_equal_orders_break_by_storage_order() {
        let registry = registry();
        let a = registry.add("a", "").unwrap();
        let b = registry.add("b", "").unwrap();
        let c = registry.add("c", "").unwrap();

        // c takes position 1, a and b keep 1 and 2: a collides with c
        registry.reorder(&[c.id.clone()]).unwrap();
        assert_eq!(ids(&registry.list_active().unwrap()), vec![a.id, c.id, b.id]);
    }

    #[test]
    fn test_move_up_and_down() {
        let registry = registry();
        let a = registry.add("a", "").unwrap();
        let b = registry.add("b", "").unwrap();
        let c = registry.add("c", "").unwrap();

        registry.move_up(&c.id).unwrap();
        assert_eq!(
            ids(&registry.list_active().unwrap()),
            vec![a.id.clone(), c.id.clone(), b.id.clone()]
        );

        registry.move_down(&a.id).unwrap();
        assert_eq!(
            ids(&registry.list_active().unwrap()),
            vec![c.id.clone(), a.id.clone(), b.id.clone()]
        );

        // edges are no-ops
        registry.move_up(&c.id).unwrap();
        registry.move_down(&b.id).unwrap();
        assert_eq!(ids(&registry.list_active().unwrap()), vec![c.id, a.id, b.id]);
    }

    #[test]
    fn test_export_import_round_trip() {
        let registry = registry();
        let a = registry.add("a", "A").unwrap();
        registry.add("b", "B").unwrap();
        registry.archive(&a.id).unwrap();

        let active = registry.list_active().unwrap();
        let archived = registry.list_archived().unwrap();
        let exported = registry.export_all().unwrap();

        let other = self::registry();
        assert_eq!(other.import_all(&exported).unwrap(), 2);
        assert_eq!(other.list_active().unwrap(), active);
        assert_eq!(other.list_archived().unwrap(), archived);
    }

    #[test]
    fn test_import_rejects_non_collection() {
        let registry = registry();
        registry.add("keep", "").unwrap();
        let before = registry.export_all().unwrap();

        for payload in [r#"{"id":"c1"}"#, "not json", r#"[{"name":"no id"}]"#] {
            let err = registry.import_all(payload).unwrap_err();
            assert!(matches!(err, AppError::MalformedInput(_)), "{payload}");
        }
        assert_eq!(registry.export_all().unwrap(), before);
    }
}
