//! Event storage.
//!
//! Every event is one .ics file in `<data_dir>/events/`. The directory is the
//! source of truth; nothing is cached between calls.

mod filename;

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::access::{EditPolicy, can_assign_level, can_create, can_edit};
use crate::attachments::AttachmentStore;
use crate::config::SharecalConfig;
use crate::date_range::DateRange;
use crate::error::{SharecalError, SharecalResult};
use crate::event::{Event, EventId};
use crate::ics;
use crate::viewer::Viewer;

/// An event together with the file it was read from.
struct StoredEvent {
    path: PathBuf,
    event: Event,
}

/// Outcome of [`EventStore::import`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Clones share one lock, so every handle to a directory sees writes as a
/// whole: a reader never observes an event mid-rename.
#[derive(Debug, Clone)]
pub struct EventStore {
    dir: PathBuf,
    attachments: AttachmentStore,
    lock: Arc<RwLock<()>>,
}

impl EventStore {
    /// Open the store described by the configuration, creating its
    /// directories on first use.
    pub fn open(config: &SharecalConfig) -> SharecalResult<Self> {
        let dir = config.events_dir();
        let attachments_dir = config.attachments_dir();
        std::fs::create_dir_all(&dir)?;
        std::fs::create_dir_all(&attachments_dir)?;

        Ok(EventStore::new(
            dir,
            AttachmentStore::new(attachments_dir, &config.public_base_url),
        ))
    }

    pub fn new(dir: PathBuf, attachments: AttachmentStore) -> Self {
        EventStore {
            dir,
            attachments,
            lock: Arc::new(RwLock::new(())),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn attachments(&self) -> &AttachmentStore {
        &self.attachments
    }

    /// All events, ordered by start.
    pub fn events(&self) -> SharecalResult<Vec<Event>> {
        let _guard = self.read_guard();
        Ok(self.entries()?.into_iter().map(|e| e.event).collect())
    }

    /// Events overlapping `range`, ordered by start.
    pub fn events_in(&self, range: &DateRange) -> SharecalResult<Vec<Event>> {
        let _guard = self.read_guard();
        Ok(self
            .entries()?
            .into_iter()
            .map(|e| e.event)
            .filter(|event| range.overlaps(event))
            .collect())
    }

    pub fn get(&self, id: EventId) -> SharecalResult<Event> {
        let _guard = self.read_guard();
        self.find(id).map(|e| e.event)
    }

    /// Persist a new event. An id is assigned unless the event brings one.
    pub fn create(&self, event: Event) -> SharecalResult<Event> {
        let _guard = self.write_guard();
        self.create_locked(event)
    }

    fn create_locked(&self, mut event: Event) -> SharecalResult<Event> {
        event.truncate_to_seconds();
        event.validate()?;

        match event.id {
            Some(id) if self.find(id).is_ok() => {
                return Err(SharecalError::InvalidInput(format!(
                    "Event {} already exists",
                    id
                )));
            }
            Some(_) => {}
            None => event.id = Some(EventId::new()),
        }

        let path = self.write(&event)?;
        tracing::info!(id = ?event.id, path = %path.display(), "Created event");

        Ok(self.resolved(event))
    }

    /// Replace an existing event. The file is renamed when the start or
    /// name changed.
    pub fn update(&self, event: Event) -> SharecalResult<Event> {
        let _guard = self.write_guard();
        self.update_locked(event)
    }

    fn update_locked(&self, mut event: Event) -> SharecalResult<Event> {
        let id = event.id.ok_or(SharecalError::MissingId)?;
        let old = self.find(id)?;

        event.truncate_to_seconds();
        event.validate()?;

        let path = self.write(&event)?;
        if path != old.path {
            std::fs::remove_file(&old.path)?;
        }

        let old_blob = old.event.attachment.map(|a| a.path);
        let new_blob = event.attachment.as_ref().map(|a| a.path.as_str());
        if let Some(old_blob) = old_blob.filter(|p| Some(p.as_str()) != new_blob) {
            self.remove_blob(&old_blob);
        }

        tracing::info!(id = %id, path = %path.display(), "Updated event");
        Ok(self.resolved(event))
    }

    /// Upload `bytes` and make them the event's attachment, replacing any
    /// earlier one. The new blob is removed again if the event cannot be saved.
    pub fn attach(&self, mut event: Event, filename: &str, bytes: &[u8]) -> SharecalResult<Event> {
        let attachment = self.attachments.upload(filename, bytes)?;
        let blob = attachment.path.clone();
        event.attachment = Some(attachment);

        self.update(event).inspect_err(|e| {
            tracing::warn!(path = %blob, error = %e, "Discarding attachment of unsaved event");
            self.remove_blob(&blob);
        })
    }

    /// Remove an event and its attachment.
    pub fn delete(&self, id: EventId) -> SharecalResult<Event> {
        let _guard = self.write_guard();
        let stored = self.find(id)?;
        std::fs::remove_file(&stored.path)?;

        if let Some(ref attachment) = stored.event.attachment {
            self.remove_blob(&attachment.path);
        }

        tracing::info!(id = %id, path = %stored.path.display(), "Deleted event");
        Ok(stored.event)
    }

    /// Import events parsed from an ICS file on behalf of `viewer`.
    ///
    /// Events whose id already exists replace the stored one when the viewer
    /// may edit it; new events are created with the viewer as creator.
    /// Anything the viewer may not write is skipped.
    pub fn import(
        &self,
        events: Vec<Event>,
        viewer: &Viewer,
        policy: EditPolicy,
    ) -> SharecalResult<ImportSummary> {
        let mut summary = ImportSummary::default();
        let _guard = self.write_guard();

        if !can_create(viewer) {
            return Err(SharecalError::PermissionDenied(format!(
                "{} may not import events",
                viewer
            )));
        }

        for mut event in events {
            if !can_assign_level(viewer, event.access_level) {
                tracing::warn!(name = %event.name, "Skipping event with admin access level");
                summary.skipped += 1;
                continue;
            }

            let existing = event.id.and_then(|id| self.find(id).ok());
            let result = match existing {
                Some(existing) => {
                    if !can_edit(viewer, &existing.event, policy) {
                        tracing::warn!(id = ?event.id, "Skipping event the importer may not edit");
                        summary.skipped += 1;
                        continue;
                    }
                    event.created_by = existing.event.created_by;
                    event.attachment = existing.event.attachment;
                    self.update_locked(event).map(|_| summary.updated += 1)
                }
                None => {
                    event.created_by = viewer.identity.clone();
                    event.attachment = None;
                    self.create_locked(event).map(|_| summary.created += 1)
                }
            };

            if let Err(e) = result {
                match e {
                    SharecalError::InvalidInput(_) | SharecalError::InvalidRange(_) => {
                        tracing::warn!(error = %e, "Skipping invalid event");
                        summary.skipped += 1;
                    }
                    other => return Err(other),
                }
            }
        }

        tracing::info!(
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            "Imported events"
        );
        Ok(summary)
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn find(&self, id: EventId) -> SharecalResult<StoredEvent> {
        self.entries()?
            .into_iter()
            .find(|e| e.event.id == Some(id))
            .ok_or_else(|| SharecalError::EventNotFound(id.to_string()))
    }

    fn entries(&self) -> SharecalResult<Vec<StoredEvent>> {
        let mut entries = Vec::new();

        if !self.dir.exists() {
            return Ok(entries);
        }

        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|e| e != "ics") {
                continue;
            }

            let parsed = std::fs::read_to_string(&path)
                .ok()
                .and_then(|content| ics::parse_event(&content))
                .filter(|e| e.id.is_some());
            match parsed {
                Some(event) => entries.push(StoredEvent {
                    path,
                    event: self.resolved(event),
                }),
                None => tracing::warn!(path = %path.display(), "Skipping unreadable event file"),
            }
        }

        entries.sort_by(|a, b| {
            a.event
                .start
                .cmp(&b.event.start)
                .then_with(|| a.event.name.cmp(&b.event.name))
        });

        Ok(entries)
    }

    fn write(&self, event: &Event) -> SharecalResult<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;

        let content = ics::generate_ics(event)?;
        let path = self.dir.join(filename::filename_for(event, &self.dir)?);
        std::fs::write(&path, content)?;

        Ok(path)
    }

    fn resolved(&self, mut event: Event) -> Event {
        if let Some(ref mut attachment) = event.attachment {
            self.attachments.resolve(attachment);
        }
        event
    }

    fn remove_blob(&self, path: &str) {
        if let Err(e) = self.attachments.remove(path) {
            tracing::warn!(path = %path, error = %e, "Could not remove attachment");
        }
    }
}
