use crate::models::{ConfigForm, GroupRow, GroupSlot, GroupTable, GroupsForm};
use std::fmt::Debug;

/// A normalized form whose items can be snapshotted into a scratch copy.
pub trait Editable {
    /// Address of one item inside the form.
    type Slot: Copy + Eq + Debug;
    /// Unit of editing.
    type Item: Clone + Debug + PartialEq;

    fn item(&self, slot: Self::Slot) -> Option<&Self::Item>;

    fn item_mut(&mut self, slot: Self::Slot) -> Option<&mut Self::Item>;
}

/// A form made of ordered rows that can be added and removed.
pub trait Collection: Editable {
    /// Where new rows are appended.
    type Section: Copy + Debug;

    /// Appends `item` to the end of `section` and returns its slot.
    fn push(&mut self, section: Self::Section, item: Self::Item) -> Self::Slot;

    fn remove(&mut self, slot: Self::Slot) -> Option<Self::Item>;

    /// Where `slot` lives once the row at `removed` is gone, or `None` when
    /// it was the removed row.
    fn slot_after_removal(removed: Self::Slot, slot: Self::Slot) -> Option<Self::Slot>;
}

impl<T: Clone + Debug + PartialEq> Editable for Vec<T> {
    type Slot = usize;
    type Item = T;

    fn item(&self, slot: usize) -> Option<&T> {
        self.get(slot)
    }

    fn item_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.get_mut(slot)
    }
}

impl<T: Clone + Debug + PartialEq> Collection for Vec<T> {
    type Section = ();

    fn push(&mut self, _section: (), item: T) -> usize {
        Vec::push(self, item);
        self.len() - 1
    }

    fn remove(&mut self, slot: usize) -> Option<T> {
        (slot < self.len()).then(|| Vec::remove(self, slot))
    }

    fn slot_after_removal(removed: usize, slot: usize) -> Option<usize> {
        match slot.cmp(&removed) {
            std::cmp::Ordering::Less => Some(slot),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(slot - 1),
        }
    }
}

/// The settings document is edited as a whole.
impl Editable for ConfigForm {
    type Slot = ();
    type Item = ConfigForm;

    fn item(&self, _slot: ()) -> Option<&ConfigForm> {
        Some(self)
    }

    fn item_mut(&mut self, _slot: ()) -> Option<&mut ConfigForm> {
        Some(self)
    }
}

impl Editable for GroupsForm {
    type Slot = GroupSlot;
    type Item = GroupRow;

    fn item(&self, slot: GroupSlot) -> Option<&GroupRow> {
        self.rows(slot.table).get(slot.index)
    }

    fn item_mut(&mut self, slot: GroupSlot) -> Option<&mut GroupRow> {
        self.rows_mut(slot.table).get_mut(slot.index)
    }
}

impl Collection for GroupsForm {
    type Section = GroupTable;

    fn push(&mut self, table: GroupTable, row: GroupRow) -> GroupSlot {
        let rows = self.rows_mut(table);
        rows.push(row);
        GroupSlot::new(table, rows.len() - 1)
    }

    fn remove(&mut self, slot: GroupSlot) -> Option<GroupRow> {
        Collection::remove(self.rows_mut(slot.table), slot.index)
    }

    fn slot_after_removal(removed: GroupSlot, slot: GroupSlot) -> Option<GroupSlot> {
        if removed.table != slot.table {
            return Some(slot);
        }
        <Vec<GroupRow> as Collection>::slot_after_removal(removed.index, slot.index)
            .map(|index| GroupSlot::new(slot.table, index))
    }
}
