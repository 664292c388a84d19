//! Service registration types.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::DiResult;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::provider::ResolverContext;

// Type-erased Arc for storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

pub(crate) type Ctor = Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync>;

/// Service registration with lifetime and constructor
pub(crate) struct Registration {
    pub(crate) lifetime: Lifetime,
    pub(crate) ctor: Ctor,
    /// Implementation type name, when the registering call knows it
    pub(crate) impl_name: Option<&'static str>,
    /// Singleton cache; the lock is held while the constructor runs so the
    /// instance is built exactly once
    pub(crate) singleton: Option<Mutex<Option<AnyArc>>>,
}

impl Registration {
    pub(crate) fn new(lifetime: Lifetime, ctor: Ctor, impl_name: Option<&'static str>) -> Self {
        let singleton = match lifetime {
            Lifetime::Singleton => Some(Mutex::new(None)),
            _ => None,
        };
        Self { lifetime, ctor, impl_name, singleton }
    }
}

/// Service registry holding all registrations
#[derive(Default)]
pub(crate) struct Registry {
    /// Single bindings; re-registering a key replaces the previous entry
    pub(crate) one: HashMap<Key, Registration>,
    /// Multi-binding registrations per trait name (append-only)
    pub(crate) many: HashMap<&'static str, Vec<Registration>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: Key, registration: Registration) {
        self.one.insert(key, registration);
    }

    pub(crate) fn push_many(&mut self, trait_name: &'static str, registration: Registration) -> usize {
        let list = self.many.entry(trait_name).or_default();
        list.push(registration);
        list.len() - 1
    }

    #[inline]
    pub(crate) fn get(&self, key: &Key) -> Option<&Registration> {
        match key {
            Key::MultiTrait(name, idx) => self.many.get(name).and_then(|regs| regs.get(*idx)),
            _ => self.one.get(key),
        }
    }

    /// Registration backing a single resolution. A trait key without a
    /// single binding falls back to the last multi-binding entry, returned
    /// under its own `MultiTrait` key.
    pub(crate) fn get_single(&self, key: &Key) -> Option<(Key, &Registration)> {
        if let Some(reg) = self.get(key) {
            return Some((key.clone(), reg));
        }
        let Key::Trait(name) = key else {
            return None;
        };
        let regs = self.many.get(name)?;
        let idx = regs.len().checked_sub(1)?;
        Some((Key::MultiTrait(*name, idx), &regs[idx]))
    }

    pub(crate) fn len(&self) -> usize {
        self.one.len() + self.many.values().map(Vec::len).sum::<usize>()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Key, &Registration)> {
        self.one
            .iter()
            .map(|(k, r)| (k.clone(), r))
            .chain(self.many.iter().flat_map(|(&name, regs)| {
                regs.iter()
                    .enumerate()
                    .map(move |(idx, r)| (Key::MultiTrait(name, idx), r))
            }))
    }
}
