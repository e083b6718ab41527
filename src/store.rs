use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
    backup::{ExportDocument, ImportSummary, export_timestamp, parse_import},
    defaults,
    domain::{
        self, BlogPost, ContactMessage, DomainError, MessageStatus, Property, Record,
        SiteSettings, Testimonial,
    },
    merge::MergeTable,
    notify::{ChangeBus, Subscription},
    storage::{FileBackend, KeyValueBackend, MemoryBackend, StorageKey, StoreError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertAt {
    Back,
    /// Newest first.
    Front,
}

/// A list collection persisted under one storage key.
pub trait Collection: Record {
    const KEY: StorageKey;
    const NAME: &'static str;
    const INSERT_AT: InsertAt;
    /// Whether the seed list is written back on the first read.
    const PERSIST_SEED: bool = true;

    fn seed() -> Vec<Self>;

    /// Field checks applied to records arriving from outside the store.
    fn validate(&self) -> Result<(), DomainError>;
}

impl Collection for Property {
    const KEY: StorageKey = StorageKey::Properties;
    const NAME: &'static str = "property";
    const INSERT_AT: InsertAt = InsertAt::Back;

    fn seed() -> Vec<Self> {
        defaults::default_properties()
    }

    fn validate(&self) -> Result<(), DomainError> {
        domain::validate_property(self)
    }
}

impl Collection for Testimonial {
    const KEY: StorageKey = StorageKey::Testimonials;
    const NAME: &'static str = "testimonial";
    const INSERT_AT: InsertAt = InsertAt::Back;

    fn seed() -> Vec<Self> {
        defaults::default_testimonials()
    }

    fn validate(&self) -> Result<(), DomainError> {
        domain::validate_testimonial(self)
    }
}

impl Collection for BlogPost {
    const KEY: StorageKey = StorageKey::Blog;
    const NAME: &'static str = "blog post";
    const INSERT_AT: InsertAt = InsertAt::Front;

    fn seed() -> Vec<Self> {
        defaults::default_blog_posts()
    }

    fn validate(&self) -> Result<(), DomainError> {
        domain::validate_blog_post(self)
    }
}

impl Collection for ContactMessage {
    const KEY: StorageKey = StorageKey::Messages;
    const NAME: &'static str = "message";
    const INSERT_AT: InsertAt = InsertAt::Front;
    const PERSIST_SEED: bool = false;

    fn seed() -> Vec<Self> {
        defaults::default_messages()
    }

    fn validate(&self) -> Result<(), DomainError> {
        domain::validate_contact_message(self)
    }
}

/// Site content store: one JSON value per [`StorageKey`], full
/// read-modify-write per operation, change notification after every write.
pub struct ContentStore {
    backend: Box<dyn KeyValueBackend>,
    bus: ChangeBus,
    settings_merge: MergeTable,
}

impl std::fmt::Debug for ContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStore")
            .field("bus", &self.bus)
            .field("settings_merge", &self.settings_merge)
            .finish_non_exhaustive()
    }
}

impl ContentStore {
    pub fn new(backend: impl KeyValueBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            bus: ChangeBus::new(),
            settings_merge: MergeTable::site_settings(),
        }
    }

    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self::new(FileBackend::open(data_dir)?))
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    pub fn with_settings_merge(mut self, table: MergeTable) -> Self {
        self.settings_merge = table;
        self
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.bus.subscribe(callback)
    }

    fn read_json<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>, StoreError> {
        match self.backend.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn write_json<T: Serialize + ?Sized>(
        &mut self,
        key: StorageKey,
        value: &T,
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, &raw)
    }

    pub fn list<C: Collection>(&mut self) -> Result<Vec<C>, StoreError> {
        if let Some(items) = self.read_json::<Vec<C>>(C::KEY)? {
            return Ok(items);
        }
        let seed = C::seed();
        if C::PERSIST_SEED {
            debug!(key = C::KEY.as_str(), count = seed.len(), "seeding defaults");
            self.write_json(C::KEY, &seed)?;
        }
        Ok(seed)
    }

    pub fn get<C: Collection>(&mut self, id: &str) -> Result<Option<C>, StoreError> {
        Ok(self.list::<C>()?.into_iter().find(|item| item.id() == id))
    }

    /// Inserts without checking for an existing `id`.
    pub fn add<C: Collection>(&mut self, item: C) -> Result<(), StoreError> {
        let mut items = self.list::<C>()?;
        match C::INSERT_AT {
            InsertAt::Back => items.push(item),
            InsertAt::Front => items.insert(0, item),
        }
        self.write_json(C::KEY, &items)?;
        self.bus.notify();
        Ok(())
    }

    /// Replaces the first record with a matching `id` in place.
    ///
    /// Returns `false` and leaves storage untouched (no write, no notification)
    /// when nothing matches.
    pub fn update<C: Collection>(&mut self, item: C) -> Result<bool, StoreError> {
        let mut items = self.list::<C>()?;
        let Some(slot) = items.iter_mut().find(|existing| existing.id() == item.id()) else {
            debug!(key = C::KEY.as_str(), id = item.id(), "update matched nothing");
            return Ok(false);
        };
        *slot = item;
        self.write_json(C::KEY, &items)?;
        self.bus.notify();
        Ok(true)
    }

    /// Removes every record with a matching `id`; `false` when there was none.
    pub fn delete<C: Collection>(&mut self, id: &str) -> Result<bool, StoreError> {
        let mut items = self.list::<C>()?;
        let before = items.len();
        items.retain(|item| item.id() != id);
        if items.len() == before {
            debug!(key = C::KEY.as_str(), id, "delete matched nothing");
            return Ok(false);
        }
        self.write_json(C::KEY, &items)?;
        self.bus.notify();
        Ok(true)
    }

    pub fn properties(&mut self) -> Result<Vec<Property>, StoreError> {
        self.list()
    }

    pub fn add_property(&mut self, property: Property) -> Result<(), StoreError> {
        self.add(property)
    }

    pub fn update_property(&mut self, property: Property) -> Result<bool, StoreError> {
        self.update(property)
    }

    pub fn delete_property(&mut self, id: &str) -> Result<bool, StoreError> {
        self.delete::<Property>(id)
    }

    pub fn testimonials(&mut self) -> Result<Vec<Testimonial>, StoreError> {
        self.list()
    }

    pub fn add_testimonial(&mut self, testimonial: Testimonial) -> Result<(), StoreError> {
        self.add(testimonial)
    }

    pub fn update_testimonial(&mut self, testimonial: Testimonial) -> Result<bool, StoreError> {
        self.update(testimonial)
    }

    pub fn delete_testimonial(&mut self, id: &str) -> Result<bool, StoreError> {
        self.delete::<Testimonial>(id)
    }

    pub fn blog_posts(&mut self) -> Result<Vec<BlogPost>, StoreError> {
        self.list()
    }

    pub fn add_blog_post(&mut self, post: BlogPost) -> Result<(), StoreError> {
        self.add(post)
    }

    pub fn update_blog_post(&mut self, post: BlogPost) -> Result<bool, StoreError> {
        self.update(post)
    }

    pub fn delete_blog_post(&mut self, id: &str) -> Result<bool, StoreError> {
        self.delete::<BlogPost>(id)
    }

    pub fn messages(&mut self) -> Result<Vec<ContactMessage>, StoreError> {
        self.list()
    }

    pub fn add_message(&mut self, message: ContactMessage) -> Result<(), StoreError> {
        self.add(message)
    }

    pub fn update_message(&mut self, message: ContactMessage) -> Result<bool, StoreError> {
        self.update(message)
    }

    pub fn delete_message(&mut self, id: &str) -> Result<bool, StoreError> {
        self.delete::<ContactMessage>(id)
    }

    pub fn set_message_status(
        &mut self,
        id: &str,
        status: MessageStatus,
    ) -> Result<Option<ContactMessage>, StoreError> {
        let Some(mut message) = self.get::<ContactMessage>(id)? else {
            return Ok(None);
        };
        message.status = status;
        self.update(message.clone())?;
        Ok(Some(message))
    }

    /// Stored settings merged over the defaults; seeds the defaults when
    /// nothing is stored yet.
    pub fn settings(&mut self) -> Result<SiteSettings, StoreError> {
        let Some(stored) = self.read_json::<Map<String, Value>>(StorageKey::Settings)? else {
            let settings = defaults::default_settings();
            debug!(key = StorageKey::Settings.as_str(), "seeding defaults");
            self.write_json(StorageKey::Settings, &settings)?;
            return Ok(settings);
        };

        let merged = self
            .settings_merge
            .merge(&defaults::default_settings_map()?, &stored);
        Ok(serde_json::from_value(Value::Object(merged))?)
    }

    /// Replaces the stored settings object as given.
    pub fn update_settings(&mut self, settings: &SiteSettings) -> Result<(), StoreError> {
        self.write_json(StorageKey::Settings, settings)?;
        self.bus.notify();
        Ok(())
    }

    pub fn export_document(&mut self, now: DateTime<Utc>) -> Result<ExportDocument, StoreError> {
        Ok(ExportDocument {
            properties: self.properties()?,
            settings: self.settings()?,
            testimonials: self.testimonials()?,
            blog: self.blog_posts()?,
            messages: self.messages()?,
            timestamp: export_timestamp(now),
        })
    }

    /// Pretty-printed backup of every collection.
    pub fn export_data(&mut self) -> Result<String, StoreError> {
        let doc = self.export_document(Utc::now())?;
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Restores a backup produced by [`ContentStore::export_data`].
    ///
    /// The document is fully validated before anything is written, so a
    /// rejected import leaves every collection as it was. One notification is
    /// sent after all writes.
    pub fn import_data(&mut self, text: &str) -> Result<ImportSummary, StoreError> {
        let plan = parse_import(text)?;
        let summary = plan.summary();

        self.write_json(StorageKey::Properties, &plan.properties)?;
        self.write_json(StorageKey::Settings, &plan.settings)?;
        if let Some(value) = &plan.testimonials {
            self.write_json(StorageKey::Testimonials, value)?;
        }
        if let Some(value) = &plan.blog {
            self.write_json(StorageKey::Blog, value)?;
        }
        if let Some(value) = &plan.messages {
            self.write_json(StorageKey::Messages, value)?;
        }

        info!(
            testimonials = summary.testimonials,
            blog = summary.blog,
            messages = summary.messages,
            "backup imported"
        );
        self.bus.notify();
        Ok(summary)
    }

    /// Drops every key so the next read reseeds the defaults.
    pub fn reset_to_defaults(&mut self) -> Result<(), StoreError> {
        for key in StorageKey::ALL {
            self.backend.remove(key)?;
        }
        info!("store reset to defaults");
        self.bus.notify();
        Ok(())
    }
}
