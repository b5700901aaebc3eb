use super::EditSession;
use crate::codec::{
    ApisResource, AuthResource, ConfigResource, GroupsResource, SchedulesResource,
};
use crate::error::Error;
use crate::models::{
    ApiEntry, AuthCredential, AuthEntry, ConfigForm, GroupRow, GroupSlot, GroupTable,
    ScheduleEntry,
};

impl EditSession<ConfigResource> {
    /// Opens the settings document for editing.
    pub fn edit_config(&mut self) -> Result<&mut ConfigForm, Error> {
        self.begin_edit(())
    }
}

impl EditSession<ApisResource> {
    /// Appends the new-API template and opens it for editing.
    pub fn add_api(&mut self) -> Result<usize, Error> {
        self.add_and_edit((), ApiEntry::template())
    }

    /// Flips `enabled` of the entry at `index` in the working list.
    pub fn toggle_enabled(&mut self, index: usize) -> Result<(), Error> {
        self.update(index, |entry| {
            entry.toggle_enabled();
            Ok(())
        })
    }
}

impl EditSession<SchedulesResource> {
    pub fn add_schedule(&mut self) -> Result<usize, Error> {
        self.add((), ScheduleEntry::template())
    }
}

impl EditSession<GroupsResource> {
    /// Appends an empty row to `table` and opens it for editing.
    pub fn add_group(&mut self, table: GroupTable) -> Result<GroupSlot, Error> {
        self.add_and_edit(table, GroupRow::default())
    }
}

impl EditSession<AuthResource> {
    /// Appends an entry named `name` holding an empty bearer token and
    /// opens it for editing.
    pub fn add_entry(&mut self, name: impl Into<String>) -> Result<usize, Error> {
        self.add_and_edit((), AuthEntry::new(name, AuthCredential::default()))
    }
}
