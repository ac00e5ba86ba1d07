use std::collections::HashMap;

use crate::error::TypeError;
use crate::id::AttrId;

/// Standard attribute names of a DOORS module export.
pub mod names {
    pub const ABSOLUTE_NUMBER: &str = "Absolute Number";
    pub const OBJECT_TEXT: &str = "Object Text";
    pub const OBJECT_NUMBER: &str = "Object Number";
    pub const LAST_MODIFIED_BY: &str = "Last Modified By";
    pub const LAST_MODIFIED_ON: &str = "Last Modified On";
    pub const CREATED_BY: &str = "Created By";
    pub const CREATED_ON: &str = "Created On";
}

/// Attribute atom registry.
///
/// Interns attribute names into [`AttrId`]s and records which attributes play
/// the well-known roles the diff engine relies on. One schema is shared by all
/// snapshots that are compared with each other; ids from different schemas
/// must not be mixed.
#[derive(Clone, Debug)]
pub struct Schema {
    names: Vec<String>,
    by_name: HashMap<String, AttrId>,
    identifier: AttrId,
    text: AttrId,
    object_number: AttrId,
    modified_by: AttrId,
    modified_on: AttrId,
    created_by: AttrId,
    created_on: AttrId,
}

impl Schema {
    /// A schema with the standard DOORS attribute names pre-registered.
    pub fn doors() -> Self {
        let mut atoms = Vec::new();
        let mut index = HashMap::new();
        let mut reg = |name: &str| intern_into(&mut atoms, &mut index, name);

        let identifier = reg(names::ABSOLUTE_NUMBER);
        let text = reg(names::OBJECT_TEXT);
        let object_number = reg(names::OBJECT_NUMBER);
        let modified_by = reg(names::LAST_MODIFIED_BY);
        let modified_on = reg(names::LAST_MODIFIED_ON);
        let created_by = reg(names::CREATED_BY);
        let created_on = reg(names::CREATED_ON);

        Self {
            names: atoms,
            by_name: index,
            identifier,
            text,
            object_number,
            modified_by,
            modified_on,
            created_by,
            created_on,
        }
    }

    /// Intern `name`, returning the existing id if already registered.
    pub fn intern(&mut self, name: &str) -> AttrId {
        intern_into(&mut self.names, &mut self.by_name, name)
    }

    pub fn lookup(&self, name: &str) -> Option<AttrId> {
        self.by_name.get(name).copied()
    }

    /// Like [`lookup`](Self::lookup) but unknown names are an error.
    pub fn resolve(&self, name: &str) -> Result<AttrId, TypeError> {
        self.lookup(name)
            .ok_or_else(|| TypeError::UnknownAttribute(name.to_string()))
    }

    pub fn name(&self, id: AttrId) -> Option<&str> {
        self.names.get(id.raw() as usize).map(String::as_str)
    }

    /// Display name, falling back to the raw id for foreign atoms.
    pub fn display_name(&self, id: AttrId) -> String {
        self.name(id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("attr#{}", id.raw()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Attribute holding the stable id ("Absolute Number").
    pub fn identifier(&self) -> AttrId {
        self.identifier
    }

    /// Main text attribute; heading text for titles, body text otherwise.
    pub fn text(&self) -> AttrId {
        self.text
    }

    /// Outline number such as `3.2.1`.
    pub fn object_number(&self) -> AttrId {
        self.object_number
    }

    pub fn modified_by(&self) -> AttrId {
        self.modified_by
    }

    pub fn modified_on(&self) -> AttrId {
        self.modified_on
    }

    pub fn created_by(&self) -> AttrId {
        self.created_by
    }

    pub fn created_on(&self) -> AttrId {
        self.created_on
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::doors()
    }
}

fn intern_into(names: &mut Vec<String>, by_name: &mut HashMap<String, AttrId>, name: &str) -> AttrId {
    if let Some(id) = by_name.get(name) {
        return *id;
    }
    let id = AttrId::new(names.len() as u32);
    names.push(name.to_string());
    by_name.insert(name.to_string(), id);
    id
}
