use serde_json::{Map, Value};
use std::fmt;

/// Which of the two membership tables a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupTable {
    /// `user_groups`: group name to user ids.
    Users,
    /// `group_groups`: group name to chat group ids.
    Groups,
}

impl GroupTable {
    pub fn key(self) -> &'static str {
        match self {
            GroupTable::Users => "user_groups",
            GroupTable::Groups => "group_groups",
        }
    }
}

impl fmt::Display for GroupTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Editable row: the group name and its members as comma-joined text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupRow {
    pub name: String,
    pub members: String,
}

impl GroupRow {
    pub fn new(name: impl Into<String>, members: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: members.into(),
        }
    }
}

/// Position of a row inside [`GroupsForm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupSlot {
    pub table: GroupTable,
    pub index: usize,
}

impl GroupSlot {
    pub fn new(table: GroupTable, index: usize) -> Self {
        Self { table, index }
    }
}

/// Normalized form of the `groups` document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupsForm {
    pub user_groups: Vec<GroupRow>,
    pub group_groups: Vec<GroupRow>,
    /// Top-level keys other than the two tables.
    pub extra: Map<String, Value>,
}

impl GroupsForm {
    pub fn rows(&self, table: GroupTable) -> &[GroupRow] {
        match table {
            GroupTable::Users => &self.user_groups,
            GroupTable::Groups => &self.group_groups,
        }
    }

    pub fn rows_mut(&mut self, table: GroupTable) -> &mut Vec<GroupRow> {
        match table {
            GroupTable::Users => &mut self.user_groups,
            GroupTable::Groups => &mut self.group_groups,
        }
    }
}
