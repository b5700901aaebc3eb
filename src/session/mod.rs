//! Per-resource editing state.
//!
//! An [`EditSession`] owns the working copy of one resource in its
//! normalized form. Items are edited through a scratch copy that is either
//! applied back at its original slot or discarded. Saving encodes the whole
//! working copy and replaces the remote document in one call; while a save
//! is in flight every other transition is refused.

use crate::client::ConsoleClient;
use crate::codec::{
    ApisResource, AuthResource, ConfigResource, GroupsResource, ResourceCodec, SchedulesResource,
};
use crate::error::Error;
use crate::models::{Ack, ResourceKind};
use log::debug;
use serde_json::Value;
use std::fmt;

mod editable;
mod resources;

pub use editable::{Collection, Editable};

type Slot<C> = <<C as ResourceCodec>::Form as Editable>::Slot;
type Item<C> = <<C as ResourceCodec>::Form as Editable>::Item;
type Section<C> = <<C as ResourceCodec>::Form as Collection>::Section;

pub type ConfigSession = EditSession<ConfigResource>;
pub type ApisSession = EditSession<ApisResource>;
pub type SchedulesSession = EditSession<SchedulesResource>;
pub type GroupsSession = EditSession<GroupsResource>;
pub type AuthSession = EditSession<AuthResource>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing loaded yet, or a fetch is in progress.
    Loading,
    /// The working copy is loaded and no item is open.
    Ready,
    /// One item is open in the scratch copy.
    Editing,
    /// A replace call is in flight.
    Saving,
    /// The last fetch failed and there is no working copy.
    Error,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Loading => "loading",
            Phase::Ready => "ready",
            Phase::Editing => "editing",
            Phase::Saving => "saving",
            Phase::Error => "error",
        };
        f.write_str(name)
    }
}

/// Snapshot of one item taken when editing starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Scratch<S, I> {
    pub slot: S,
    pub item: I,
}

pub struct EditSession<C: ResourceCodec> {
    phase: Phase,
    working: Option<C::Form>,
    scratch: Option<Scratch<Slot<C>, Item<C>>>,
    last_error: Option<String>,
}

impl<C: ResourceCodec> Default for EditSession<C> {
    fn default() -> Self {
        Self {
            phase: Phase::Loading,
            working: None,
            scratch: None,
            last_error: None,
        }
    }
}

impl<C: ResourceCodec> fmt::Debug for EditSession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("kind", &C::KIND)
            .field("phase", &self.phase)
            .field("working", &self.working)
            .field("scratch", &self.scratch)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl<C: ResourceCodec> EditSession<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session already holding `document`, as if it had just been fetched.
    pub fn from_document(document: &Value) -> Result<Self, Error> {
        let mut session = Self::new();
        session.accept_document(document)?;
        Ok(session)
    }

    pub fn kind(&self) -> ResourceKind {
        C::KIND
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn working(&self) -> Option<&C::Form> {
        self.working.as_ref()
    }

    /// User-facing message of the last failed load or save. Unauthorized
    /// failures are not recorded here.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn editing_slot(&self) -> Option<Slot<C>> {
        self.scratch.as_ref().map(|scratch| scratch.slot)
    }

    pub fn scratch(&self) -> Option<&Item<C>> {
        self.scratch.as_ref().map(|scratch| &scratch.item)
    }

    /// Mutable scratch copy; `None` unless an item is open for editing.
    pub fn scratch_mut(&mut self) -> Option<&mut Item<C>> {
        if self.phase != Phase::Editing {
            return None;
        }
        self.scratch.as_mut().map(|scratch| &mut scratch.item)
    }

    /// Fetches and decodes the document.
    ///
    /// Only a successful fetch replaces the working copy. On failure an
    /// existing working copy and any open edit are kept; without one the
    /// session enters [`Phase::Error`].
    pub async fn load(&mut self, client: &ConsoleClient) -> Result<(), Error> {
        self.ensure_not_saving()?;
        self.phase = Phase::Loading;
        let result = match client.fetch(C::KIND).await {
            Ok(document) => self.accept_document(&document),
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            self.record_failure(err);
            self.phase = if self.working.is_some() {
                self.idle_phase()
            } else {
                Phase::Error
            };
        }
        result
    }

    /// Replaces the working copy with a decoded `document`.
    ///
    /// On a decode failure nothing changes.
    pub fn accept_document(&mut self, document: &Value) -> Result<(), Error> {
        self.ensure_not_saving()?;
        let form = C::from_api(document)?;
        self.working = Some(form);
        self.scratch = None;
        self.last_error = None;
        self.phase = Phase::Ready;
        Ok(())
    }

    /// Opens the item at `slot` in a scratch copy.
    ///
    /// Starting an edit while another item is open discards that scratch.
    pub fn begin_edit(&mut self, slot: Slot<C>) -> Result<&mut Item<C>, Error> {
        self.ensure_editable()?;
        let item = self
            .working
            .as_ref()
            .and_then(|form| form.item(slot))
            .cloned()
            .ok_or_else(|| Error::invalid_state(format!("{}: no item at {slot:?}", C::KIND)))?;
        self.phase = Phase::Editing;
        let scratch = self.scratch.insert(Scratch { slot, item });
        Ok(&mut scratch.item)
    }

    /// Writes the scratch copy back at its slot.
    pub fn apply(&mut self) -> Result<(), Error> {
        if self.phase != Phase::Editing {
            return Err(Error::invalid_state(format!(
                "{}: nothing to apply while {}",
                C::KIND,
                self.phase
            )));
        }
        let Some(Scratch { slot, item }) = self.scratch.take() else {
            return Err(Error::invalid_state(format!("{}: no open edit", C::KIND)));
        };
        match self.working.as_mut().and_then(|form| form.item_mut(slot)) {
            Some(target) => *target = item,
            None => {
                self.phase = Phase::Ready;
                return Err(Error::invalid_state(format!(
                    "{}: item at {slot:?} no longer exists",
                    C::KIND
                )));
            }
        }
        self.phase = Phase::Ready;
        Ok(())
    }

    /// Discards the scratch copy. Does nothing unless an item is open.
    pub fn cancel(&mut self) {
        if self.phase == Phase::Editing {
            self.scratch = None;
            self.phase = Phase::Ready;
        }
    }

    /// Mutates the item at `slot` directly in the working copy.
    pub fn update<F>(&mut self, slot: Slot<C>, edit: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Item<C>) -> Result<(), Error>,
    {
        self.ensure_editable()?;
        let target = self
            .working
            .as_mut()
            .and_then(|form| form.item_mut(slot))
            .ok_or_else(|| Error::invalid_state(format!("{}: no item at {slot:?}", C::KIND)))?;
        let mut edited = target.clone();
        edit(&mut edited)?;
        *target = edited;
        Ok(())
    }

    /// Encodes the working copy and enters `Saving`.
    ///
    /// Returns the canonical document to pass to the replace call, and must
    /// be followed by [`Self::finish_save`].
    pub fn begin_save(&mut self) -> Result<Value, Error> {
        if self.phase == Phase::Saving {
            return Err(Error::invalid_state(format!(
                "{}: a save is already in progress",
                C::KIND
            )));
        }
        self.ensure_editable()?;
        let form = self.loaded()?;
        let document = C::to_api(form)?;
        self.phase = Phase::Saving;
        Ok(document)
    }

    /// Leaves `Saving` with the outcome of the replace call.
    ///
    /// Success closes any open edit. Failure keeps the working copy and the
    /// scratch copy so the save can be retried.
    pub fn finish_save(&mut self, outcome: Result<Ack, Error>) -> Result<Ack, Error> {
        if self.phase != Phase::Saving {
            return Err(Error::invalid_state(format!(
                "{}: no save in progress",
                C::KIND
            )));
        }
        match outcome {
            Ok(ack) => {
                debug!("{}: saved ({})", C::KIND, ack.status);
                self.scratch = None;
                self.last_error = None;
                self.phase = Phase::Ready;
                Ok(ack)
            }
            Err(err) => {
                self.record_failure(&err);
                self.phase = self.idle_phase();
                Err(err)
            }
        }
    }

    /// Leaves `Saving` without an outcome, keeping the working copy.
    ///
    /// For callers that gave up on the replace call started after
    /// [`Self::begin_save`]. Does nothing outside `Saving`.
    pub fn abort_save(&mut self) {
        if self.phase == Phase::Saving {
            debug!("{}: save abandoned", C::KIND);
            self.phase = self.idle_phase();
        }
    }

    /// Replaces the remote document with the working copy.
    ///
    /// Dropping the returned future before it completes leaves `Saving` as
    /// [`Self::abort_save`] does.
    pub async fn save(&mut self, client: &ConsoleClient) -> Result<Ack, Error> {
        let document = self.begin_save()?;
        let guard = SaveGuard {
            session: self,
            settled: false,
        };
        let outcome = client.replace(C::KIND, document).await;
        guard.finish(outcome)
    }

    /// Canonical document of the working copy as pretty-printed JSON.
    pub fn raw_text(&self) -> Result<String, Error> {
        let document = C::to_api(self.loaded()?)?;
        serde_json::to_string_pretty(&document).map_err(Error::from)
    }

    /// Replaces the whole working copy from JSON text.
    ///
    /// Text that does not parse, or does not decode as this resource, is
    /// rejected before anything changes.
    pub fn replace_from_text(&mut self, text: &str) -> Result<(), Error> {
        self.ensure_not_saving()?;
        let document: Value = serde_json::from_str(text)
            .map_err(|e| Error::validation(C::KIND.as_str(), format!("not valid JSON: {e}")))?;
        self.accept_document(&document)
    }

    /// [`Self::replace_from_text`] followed by [`Self::save`].
    pub async fn save_text(&mut self, client: &ConsoleClient, text: &str) -> Result<Ack, Error> {
        self.replace_from_text(text)?;
        self.save(client).await
    }

    /// Phase to return to once no call is in flight.
    fn idle_phase(&self) -> Phase {
        if self.scratch.is_some() {
            Phase::Editing
        } else {
            Phase::Ready
        }
    }

    /// Unauthorized is handled by re-authentication, not shown inline.
    fn record_failure(&mut self, err: &Error) {
        if !err.is_unauthorized() {
            self.last_error = Some(err.user_message());
        }
    }

    fn loaded(&self) -> Result<&C::Form, Error> {
        self.working
            .as_ref()
            .ok_or_else(|| Error::invalid_state(format!("{}: not loaded", C::KIND)))
    }

    fn ensure_not_saving(&self) -> Result<(), Error> {
        if self.phase == Phase::Saving {
            return Err(Error::invalid_state(format!(
                "{}: a save is in progress",
                C::KIND
            )));
        }
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), Error> {
        match self.phase {
            Phase::Ready | Phase::Editing => Ok(()),
            phase => Err(Error::invalid_state(format!(
                "{}: cannot edit while {phase}",
                C::KIND
            ))),
        }
    }
}

struct SaveGuard<'a, C: ResourceCodec> {
    session: &'a mut EditSession<C>,
    settled: bool,
}

impl<C: ResourceCodec> SaveGuard<'_, C> {
    fn finish(mut self, outcome: Result<Ack, Error>) -> Result<Ack, Error> {
        self.settled = true;
        self.session.finish_save(outcome)
    }
}

impl<C: ResourceCodec> Drop for SaveGuard<'_, C> {
    fn drop(&mut self) {
        if !self.settled {
            self.session.abort_save();
        }
    }
}

impl<C> EditSession<C>
where
    C: ResourceCodec,
    C::Form: Collection,
{
    /// Appends `item` to `section` of the working copy.
    pub fn add(&mut self, section: Section<C>, item: Item<C>) -> Result<Slot<C>, Error> {
        self.ensure_editable()?;
        let form = self
            .working
            .as_mut()
            .ok_or_else(|| Error::invalid_state(format!("{}: not loaded", C::KIND)))?;
        Ok(form.push(section, item))
    }

    /// Appends `item` and opens it for editing right away.
    pub fn add_and_edit(
        &mut self,
        section: Section<C>,
        item: Item<C>,
    ) -> Result<Slot<C>, Error> {
        let slot = self.add(section, item)?;
        self.begin_edit(slot)?;
        Ok(slot)
    }

    /// Removes the item at `slot` from the working copy.
    ///
    /// An open edit of that item is discarded; an open edit of a later
    /// item follows it to its new slot.
    pub fn remove(&mut self, slot: Slot<C>) -> Result<Item<C>, Error> {
        self.ensure_editable()?;
        let removed = self
            .working
            .as_mut()
            .and_then(|form| form.remove(slot))
            .ok_or_else(|| Error::invalid_state(format!("{}: no item at {slot:?}", C::KIND)))?;
        if let Some(scratch) = self.scratch.take() {
            match <C::Form as Collection>::slot_after_removal(slot, scratch.slot) {
                Some(moved) => {
                    self.scratch = Some(Scratch {
                        slot: moved,
                        item: scratch.item,
                    });
                }
                None => self.phase = Phase::Ready,
            }
        }
        Ok(removed)
    }
}
