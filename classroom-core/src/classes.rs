//! The class collection and its field validation.
//!
//! The map is only reachable through the guards below, so every access is
//! made under the class lock in the mode the guard names.

use std::collections::HashMap;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::RegistryError;
use crate::types::{Class, ClassId, ClassInput};

type ClassMap = HashMap<ClassId, Class>;

/// Owner of all classes.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: RwLock<ClassMap>,
}

/// Evidence that the class lock is held, in either mode.
///
/// Task-side operations that depend on class existence take one of these so
/// the class lock cannot be released between the check and the task write.
pub trait ClassGuard {
    fn contains(&self, id: &ClassId) -> bool;
}

/// Shared access to the class map.
pub struct ClassesRead<'a> {
    classes: RwLockReadGuard<'a, ClassMap>,
}

/// Exclusive access to the class map.
pub struct ClassesWrite<'a> {
    classes: RwLockWriteGuard<'a, ClassMap>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read(&self) -> ClassesRead<'_> {
        ClassesRead {
            classes: self.classes.read(),
        }
    }

    pub(crate) fn write(&self) -> ClassesWrite<'_> {
        ClassesWrite {
            classes: self.classes.write(),
        }
    }

    pub fn get(&self, id: &ClassId) -> Result<Class, RegistryError> {
        self.read().get(id).cloned()
    }

    pub fn list(&self) -> Vec<Class> {
        self.read().list()
    }

    /// Point-in-time check; the answer may be stale once the lock is released.
    pub(crate) fn exists(&self, id: &ClassId) -> bool {
        self.read().contains(id)
    }
}

impl ClassesRead<'_> {
    pub fn get(&self, id: &ClassId) -> Result<&Class, RegistryError> {
        self.classes
            .get(id)
            .ok_or_else(|| RegistryError::class_not_found(id))
    }

    pub fn list(&self) -> Vec<Class> {
        self.classes.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }
}

impl ClassGuard for ClassesRead<'_> {
    fn contains(&self, id: &ClassId) -> bool {
        self.classes.contains_key(id)
    }
}

impl ClassesWrite<'_> {
    /// Insert a freshly-created class. A colliding id is an identifier
    /// source failure, not a caller error.
    pub fn insert(&mut self, class: Class) -> Result<Class, RegistryError> {
        if self.classes.contains_key(&class.id) {
            return Err(RegistryError::Internal(format!(
                "identifier collision on class {}",
                class.id
            )));
        }
        self.classes.insert(class.id.clone(), class.clone());
        Ok(class)
    }

    /// Replace name and teacher in place; the id never changes.
    pub fn update(&mut self, id: &ClassId, input: ClassInput) -> Result<Class, RegistryError> {
        let class = self
            .classes
            .get_mut(id)
            .ok_or_else(|| RegistryError::class_not_found(id))?;
        class.class_name = input.class_name;
        class.teacher = input.teacher;
        Ok(class.clone())
    }

    pub fn remove(&mut self, id: &ClassId) -> Result<Class, RegistryError> {
        self.classes
            .remove(id)
            .ok_or_else(|| RegistryError::class_not_found(id))
    }
}

impl ClassGuard for ClassesWrite<'_> {
    fn contains(&self, id: &ClassId) -> bool {
        self.classes.contains_key(id)
    }
}

/// Both fields must be non-blank. Values are stored untrimmed.
pub fn validate(input: &ClassInput) -> Result<(), RegistryError> {
    if input.class_name.trim().is_empty() || input.teacher.trim().is_empty() {
        return Err(RegistryError::invalid(
            "class_name and teacher are required",
        ));
    }
    Ok(())
}
