use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::{Debug, Display};
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use super::ids::IdStrategy;
use crate::errors::ServiceError;

/// An entity type that can live in a [`ResourceStore`].
///
/// The associated types pin down, per entity, the identifier type and the
/// strategy that generates it, the create payload and the update payload.
/// A `User` can only be created from a `NewUser`; an `Item` always gets a
/// sequential integer id.
pub trait Resource: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Debug + Display + Send + Sync + 'static;
    type Ids: IdStrategy<Id = Self::Id> + Default;
    type Input: Send;
    type Patch: Send;

    /// Lower-case entity name used in error messages.
    const KIND: &'static str;

    /// Check the business fields of a create payload.
    fn validate(input: &Self::Input) -> Result<(), ServiceError>;

    /// Construct the stored record from an already validated payload.
    fn build(id: Self::Id, input: Self::Input, now: DateTime<Utc>) -> Self;

    /// Apply an update payload, re-validating every field it touches.
    /// Called on a copy; an error discards the copy.
    fn apply(&mut self, patch: Self::Patch) -> Result<(), ServiceError>;

    fn id(&self) -> &Self::Id;

    fn updated_at(&self) -> DateTime<Utc>;

    fn set_updated_at(&mut self, at: DateTime<Utc>);

    /// Value of the field that must be unique among live records, if the
    /// entity declares one.
    fn unique_key(&self) -> Option<&str> {
        None
    }

    /// Same as [`Resource::unique_key`], read from a create payload.
    fn input_unique_key(_input: &Self::Input) -> Option<&str> {
        None
    }
}

/// A timestamp strictly later than `prev`, normally just "now".
pub fn next_timestamp(prev: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > prev { now } else { prev + Duration::microseconds(1) }
}

struct Slot<R> {
    seq: u64,
    record: R,
}

struct Inner<R: Resource> {
    records: HashMap<R::Id, Slot<R>>,
    // insertion sequence -> id; drives every ordered read
    order: BTreeMap<u64, R::Id>,
    next_seq: u64,
    ids: R::Ids,
}

impl<R: Resource> Inner<R> {
    fn ordered(&self) -> impl Iterator<Item = &R> + '_ {
        self.order
            .values()
            .filter_map(move |id| self.records.get(id).map(|slot| &slot.record))
    }

    fn find_unique(&self, key: &str) -> Option<&R> {
        self.ordered().find(|r| r.unique_key() == Some(key))
    }

    fn fresh_id(&mut self) -> R::Id {
        loop {
            let id = self.ids.next_id();
            if !self.records.contains_key(&id) {
                return id;
            }
        }
    }

    fn insert(&mut self, record: R) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, record.id().clone());
        self.records.insert(record.id().clone(), Slot { seq, record });
    }
}

/// In-memory, thread-safe keyed collection of records.
///
/// One reader-writer lock guards the records, their insertion order and the
/// id generator. Reads share the lock, writes take it exclusively, and no
/// guard outlives the method that acquired it. Every record handed out is a
/// clone; callers never hold a reference into the store.
pub struct ResourceStore<R: Resource> {
    inner: RwLock<Inner<R>>,
}

impl<R: Resource> Default for ResourceStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> ResourceStore<R> {
    pub fn new() -> Self {
        Self::with_ids(R::Ids::default())
    }

    /// Start from a specific generator state, e.g. `SequentialIds::starting_at(1000)`.
    pub fn with_ids(ids: R::Ids) -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: HashMap::new(),
                order: BTreeMap::new(),
                next_seq: 0,
                ids,
            }),
        }
    }

    /// Validate, check uniqueness, assign an id and store a private copy.
    pub fn create(&self, input: R::Input) -> Result<R, ServiceError> {
        R::validate(&input)?;
        let mut inner = self.inner.write();
        if let Some(key) = R::input_unique_key(&input) {
            if inner.find_unique(key).is_some() {
                return Err(ServiceError::already_exists(R::KIND));
            }
        }
        let id = inner.fresh_id();
        let record = R::build(id, input, Utc::now());
        inner.insert(record.clone());
        Ok(record)
    }

    /// Store every payload or none of them, under a single write acquisition.
    ///
    /// Uniqueness is checked against stored records and within the batch.
    pub fn create_batch(&self, inputs: Vec<R::Input>) -> Result<Vec<R>, ServiceError> {
        for input in &inputs {
            R::validate(input)?;
        }
        let mut inner = self.inner.write();
        {
            let mut seen = HashSet::new();
            for input in &inputs {
                if let Some(key) = R::input_unique_key(input) {
                    if !seen.insert(key) || inner.find_unique(key).is_some() {
                        return Err(ServiceError::already_exists(R::KIND));
                    }
                }
            }
        }
        let now = Utc::now();
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            let id = inner.fresh_id();
            let record = R::build(id, input, now);
            inner.insert(record.clone());
            created.push(record);
        }
        Ok(created)
    }

    pub fn get_by_id(&self, id: &R::Id) -> Result<R, ServiceError> {
        let inner = self.inner.read();
        inner
            .records
            .get(id)
            .map(|slot| slot.record.clone())
            .ok_or_else(|| ServiceError::not_found(R::KIND))
    }

    /// First record, in insertion order, whose unique field equals `value`.
    pub fn get_by_unique(&self, value: &str) -> Result<R, ServiceError> {
        let inner = self.inner.read();
        inner
            .find_unique(value)
            .cloned()
            .ok_or_else(|| ServiceError::not_found(R::KIND))
    }

    /// Every live record, oldest first.
    pub fn get_all(&self) -> Vec<R> {
        self.inner.read().ordered().cloned().collect()
    }

    /// Records matching `pred`, oldest first.
    pub fn search<F>(&self, pred: F) -> Vec<R>
    where
        F: Fn(&R) -> bool,
    {
        self.inner.read().ordered().filter(|r| pred(r)).cloned().collect()
    }

    /// Window of the insertion-ordered collection.
    pub fn page(&self, offset: usize, limit: usize) -> Vec<R> {
        self.inner.read().ordered().skip(offset).take(limit).cloned().collect()
    }

    /// [`ResourceStore::page`] plus the live record count, read under one
    /// lock acquisition so the two agree.
    pub fn page_with_total(&self, offset: usize, limit: usize) -> (Vec<R>, usize) {
        let inner = self.inner.read();
        let page = inner.ordered().skip(offset).take(limit).cloned().collect();
        (page, inner.records.len())
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `patch` to the stored record. On any error the stored record
    /// is left exactly as it was.
    pub fn update(&self, id: &R::Id, patch: R::Patch) -> Result<R, ServiceError> {
        let mut inner = self.inner.write();
        let mut next = inner
            .records
            .get(id)
            .map(|slot| slot.record.clone())
            .ok_or_else(|| ServiceError::not_found(R::KIND))?;
        let previous_key = next.unique_key().map(str::to_owned);
        let previous_at = next.updated_at();

        next.apply(patch)?;
        if let Some(key) = next.unique_key() {
            if previous_key.as_deref() != Some(key) && inner.find_unique(key).is_some() {
                return Err(ServiceError::already_exists(R::KIND));
            }
        }
        next.set_updated_at(next_timestamp(previous_at));

        if let Some(slot) = inner.records.get_mut(id) {
            slot.record = next.clone();
        }
        Ok(next)
    }

    pub fn delete(&self, id: &R::Id) -> Result<(), ServiceError> {
        let mut inner = self.inner.write();
        let slot = inner
            .records
            .remove(id)
            .ok_or_else(|| ServiceError::not_found(R::KIND))?;
        inner.order.remove(&slot.seq);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::items::{Item, ItemPatch, NewItem};
    use crate::storage::ids::SequentialIds;
    use crate::users::domain::{NewUser, User, UserPatch};

    fn widget(name: &str, price: i64) -> NewItem {
        NewItem { name: name.into(), description: String::new(), price }
    }

    fn new_user(email: &str, name: &str) -> NewUser {
        NewUser { email: email.into(), name: name.into() }
    }

    #[test]
    fn create_then_get_returns_same_fields() {
        let store = ResourceStore::<Item>::new();
        let created = store
            .create(NewItem { name: "Lamp".into(), description: "desk lamp".into(), price: 25 })
            .unwrap();
        let found = store.get_by_id(&created.id).unwrap();
        assert_eq!(found.name, "Lamp");
        assert_eq!(found.description, "desk lamp");
        assert_eq!(found.price, 25);
        assert_eq!(found, created);
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let store = ResourceStore::<Item>::new();
        let item = store.create(widget("Lamp", 1)).unwrap();
        store.delete(&item.id).unwrap();
        assert_eq!(store.get_by_id(&item.id), Err(ServiceError::not_found("item")));
        assert_eq!(store.delete(&item.id), Err(ServiceError::not_found("item")));
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_creates_get_distinct_ids() {
        let items = Arc::new(ResourceStore::<Item>::new());
        let users = Arc::new(ResourceStore::<User>::new());
        std::thread::scope(|s| {
            for t in 0..16 {
                let items = Arc::clone(&items);
                let users = Arc::clone(&users);
                s.spawn(move || {
                    for i in 0..50 {
                        items.create(widget(&format!("w-{t}-{i}"), i)).unwrap();
                        users.create(new_user(&format!("u{t}-{i}@example.com"), "U")).unwrap();
                    }
                });
            }
        });

        let all = items.get_all();
        assert_eq!(all.len(), 800);
        let ids: HashSet<u64> = all.iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), 800);
        assert_eq!(ids.iter().copied().max(), Some(800));

        let all = users.get_all();
        let ids: HashSet<_> = all.iter().map(|u| u.id).collect();
        assert_eq!(ids.len(), 800);
    }

    #[test]
    fn update_of_missing_id_changes_nothing() {
        let store = ResourceStore::<Item>::new();
        store.create(widget("A", 1)).unwrap();
        store.create(widget("B", 2)).unwrap();
        let before = store.get_all();

        let err = store
            .update(&99, ItemPatch { name: Some("Z".into()), ..ItemPatch::default() })
            .unwrap_err();
        assert_eq!(err, ServiceError::not_found("item"));
        assert_eq!(store.get_all(), before);
    }

    #[test]
    fn invalid_update_leaves_record_untouched() {
        let store = ResourceStore::<Item>::new();
        let item = store.create(widget("A", 1)).unwrap();
        let err = store
            .update(&item.id, ItemPatch { name: Some("B".into()), price: Some(-1), ..ItemPatch::default() })
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidField { field: "price", .. }));
        assert_eq!(store.get_by_id(&item.id).unwrap(), item);
    }

    #[test]
    fn returned_records_are_copies() {
        let store = ResourceStore::<Item>::new();
        let mut created = store.create(widget("Original", 10)).unwrap();
        created.name = "Changed".into();

        let mut listed = store.get_all();
        listed[0].price = 999;

        let mut fetched = store.get_by_id(&created.id).unwrap();
        fetched.description = "mutated".into();

        let again = store.get_by_id(&created.id).unwrap();
        assert_eq!(again.name, "Original");
        assert_eq!(again.price, 10);
        assert_eq!(again.description, "");
    }

    #[test]
    fn duplicate_unique_field_is_rejected() {
        let store = ResourceStore::<User>::new();
        store.create(new_user("a@example.com", "A")).unwrap();
        let err = store.create(new_user("a@example.com", "Other")).unwrap_err();
        assert_eq!(err, ServiceError::already_exists("user"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_by_unique("a@example.com").unwrap().name, "A");
        assert!(store.get_by_unique("b@example.com").is_err());
    }

    #[test]
    fn unique_key_is_free_again_after_delete() {
        let store = ResourceStore::<User>::new();
        let first = store.create(new_user("a@example.com", "A")).unwrap();
        store.delete(&first.id).unwrap();
        let second = store.create(new_user("a@example.com", "B")).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn item_lifecycle_scenario() {
        let store = ResourceStore::<Item>::new();

        let widget_item = store.create(widget("Widget", 100)).unwrap();
        assert_eq!(widget_item.id, 1);
        assert_eq!(widget_item.price, 100);

        assert!(matches!(
            store.create(widget("", 100)),
            Err(ServiceError::InvalidField { field: "name", .. })
        ));
        assert!(matches!(
            store.create(widget("Gadget", -5)),
            Err(ServiceError::InvalidField { field: "price", .. })
        ));
        assert_eq!(store.len(), 1);

        let updated = store
            .update(&widget_item.id, ItemPatch { name: Some("Widget2".into()), ..ItemPatch::default() })
            .unwrap();
        assert_eq!(updated.name, "Widget2");
        assert_eq!(updated.price, 100);
        assert!(updated.updated_at > updated.created_at);
        assert_eq!(updated.created_at, widget_item.created_at);

        store.delete(&widget_item.id).unwrap();
        assert_eq!(store.get_by_id(&widget_item.id), Err(ServiceError::not_found("item")));
    }

    #[test]
    fn reads_follow_insertion_order() {
        let store = ResourceStore::<Item>::new();
        for name in ["c", "a", "b", "d"] {
            store.create(widget(name, 0)).unwrap();
        }
        store.delete(&2).unwrap();
        let names: Vec<String> = store.get_all().into_iter().map(|i| i.name).collect();
        assert_eq!(names, ["c", "b", "d"]);

        let page: Vec<u64> = store.page(1, 5).into_iter().map(|i| i.id).collect();
        assert_eq!(page, [3, 4]);
        let (window, total) = store.page_with_total(0, 1);
        assert_eq!((window[0].id, total), (1, 3));

        let found: Vec<u64> = store.search(|i| i.name != "b").into_iter().map(|i| i.id).collect();
        assert_eq!(found, [1, 4]);
    }

    #[test]
    fn sequential_ids_are_not_reused() {
        let store = ResourceStore::<Item>::with_ids(SequentialIds::starting_at(10));
        let a = store.create(widget("a", 0)).unwrap();
        store.delete(&a.id).unwrap();
        let b = store.create(widget("b", 0)).unwrap();
        assert_eq!((a.id, b.id), (10, 11));
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let store = ResourceStore::<User>::new();
        store.create(new_user("taken@example.com", "T")).unwrap();

        let err = store
            .create_batch(vec![new_user("x@example.com", "X"), new_user("taken@example.com", "Y")])
            .unwrap_err();
        assert_eq!(err, ServiceError::already_exists("user"));

        let err = store
            .create_batch(vec![new_user("d@example.com", "D"), new_user("d@example.com", "E")])
            .unwrap_err();
        assert_eq!(err, ServiceError::already_exists("user"));

        let err = store
            .create_batch(vec![new_user("ok@example.com", "Ok"), new_user("", "Bad")])
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidField { field: "email", .. }));
        assert_eq!(store.len(), 1);

        let created = store
            .create_batch(vec![new_user("p@example.com", "P"), new_user("q@example.com", "Q")])
            .unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn user_update_changes_name_only() {
        let store = ResourceStore::<User>::new();
        let user = store.create(new_user("n@example.com", "Before")).unwrap();
        let updated = store.update(&user.id, UserPatch { name: "After".into() }).unwrap();
        assert_eq!(updated.email, "n@example.com");
        assert_eq!(updated.name, "After");
        assert!(updated.updated_at > user.updated_at);
        assert!(store.update(&user.id, UserPatch { name: "  ".into() }).is_err());
        assert_eq!(store.get_by_id(&user.id).unwrap().name, "After");
    }

    #[test]
    fn next_timestamp_is_strictly_later() {
        let far_future = Utc::now() + Duration::days(1);
        assert!(next_timestamp(far_future) > far_future);
        let past = Utc::now() - Duration::seconds(5);
        assert!(next_timestamp(past) > past);
    }
}
