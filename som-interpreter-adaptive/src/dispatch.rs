//!
//! Inline caches for message sends.
//!
//! Each send site starts out uninitialized. The first lookup turns it monomorphic,
//! further receiver categories make it polymorphic (most recent entry first), and
//! once the chain would outgrow the configured size the site goes megamorphic:
//! from then on, it always does a full lookup.
//!
//! Entries remember the method dictionary version they were looked up in.
//! Installing a method bumps that version: stale entries stop matching and get
//! replaced in place, so a site's state never goes back.
//!

use std::rc::Rc;

use log::{debug, trace};

use crate::class::ClassId;
use crate::interner::Interned;
use crate::invokable::{Invoke, Return};
use crate::method::Method;
use crate::nodes::ControlState;
use crate::shape::{FieldCache, FieldSiteId};
use crate::universe::Universe;
use crate::value::Value;

/// The identifier of a message send site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSiteId(pub(crate) u32);

/// The identifier of a control-flow send site (`ifTrue:`, `whileTrue:`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlSiteId(pub(crate) u32);

/// A cheap check that a receiver has the same lookup behaviour as a previous one.
///
/// Every value in a given category has the same class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverGuard {
    Nil,
    True,
    False,
    /// Both small and big integers.
    Integer,
    Double,
    String,
    Symbol,
    Array,
    /// Blocks, by number of parameters.
    Block(usize),
    Method,
    Primitive,
    /// A class object.
    Class(ClassId),
    /// An instance of a given class.
    Instance(ClassId),
}

impl ReceiverGuard {
    /// Get the category of a given receiver.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Nil => Self::Nil,
            Value::Boolean(true) => Self::True,
            Value::Boolean(false) => Self::False,
            Value::Integer(_) | Value::BigInteger(_) => Self::Integer,
            Value::Double(_) => Self::Double,
            Value::String(_) => Self::String,
            Value::Symbol(_) => Self::Symbol,
            Value::Array(_) => Self::Array,
            Value::Block(block) => Self::Block(block.nb_parameters()),
            Value::Invokable(method) if method.is_primitive() => Self::Primitive,
            Value::Invokable(_) => Self::Method,
            Value::Class(class) => Self::Class(*class),
            Value::Instance(instance) => Self::Instance(instance.borrow().class()),
        }
    }

    /// Whether a given receiver falls in this category.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Nil, Value::Nil) => true,
            (Self::True, Value::Boolean(value)) => *value,
            (Self::False, Value::Boolean(value)) => !*value,
            (Self::Integer, Value::Integer(_) | Value::BigInteger(_)) => true,
            (Self::Double, Value::Double(_)) => true,
            (Self::String, Value::String(_)) => true,
            (Self::Symbol, Value::Symbol(_)) => true,
            (Self::Array, Value::Array(_)) => true,
            (Self::Block(nb_params), Value::Block(block)) => block.nb_parameters() == *nb_params,
            (Self::Method, Value::Invokable(method)) => !method.is_primitive(),
            (Self::Primitive, Value::Invokable(method)) => method.is_primitive(),
            (Self::Class(class), Value::Class(other)) => class == other,
            (Self::Instance(class), Value::Instance(instance)) => {
                instance.borrow().class() == *class
            }
            _ => false,
        }
    }
}

/// A single (guard, target) pair of an inline cache.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub guard: ReceiverGuard,
    pub target: Rc<Method>,
    pub version: u32,
}

impl CacheEntry {
    fn hits(&self, receiver: &Value, version: u32) -> bool {
        self.version == version && self.guard.matches(receiver)
    }
}

/// The observable state of an inline cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Uninitialized,
    Monomorphic,
    Polymorphic,
    Megamorphic,
}

/// The inline cache of a message send site.
#[derive(Debug, Clone, Default)]
pub enum DispatchCache {
    /// Never executed.
    #[default]
    Uninitialized,
    /// Seen a single receiver category.
    Monomorphic(CacheEntry),
    /// Seen a few receiver categories, the most recent one first.
    Polymorphic(Vec<CacheEntry>),
    /// Seen too many receiver categories: always does a full lookup.
    Megamorphic,
}

impl DispatchCache {
    /// Get the state of this cache.
    pub fn state(&self) -> CacheState {
        match self {
            Self::Uninitialized => CacheState::Uninitialized,
            Self::Monomorphic(_) => CacheState::Monomorphic,
            Self::Polymorphic(_) => CacheState::Polymorphic,
            Self::Megamorphic => CacheState::Megamorphic,
        }
    }

    /// The number of (guard, target) pairs held.
    pub fn len(&self) -> usize {
        match self {
            Self::Uninitialized | Self::Megamorphic => 0,
            Self::Monomorphic(_) => 1,
            Self::Polymorphic(entries) => entries.len(),
        }
    }

    /// Whether no (guard, target) pairs are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Search for a cached target for a given receiver.
    pub fn lookup(&self, receiver: &Value, version: u32) -> Option<Rc<Method>> {
        match self {
            Self::Monomorphic(entry) if entry.hits(receiver, version) => {
                Some(Rc::clone(&entry.target))
            }
            Self::Polymorphic(entries) => entries
                .iter()
                .find(|entry| entry.hits(receiver, version))
                .map(|entry| Rc::clone(&entry.target)),
            _ => None,
        }
    }

    /// Record the result of a successful lookup after a cache miss.
    ///
    /// A stale entry (same guard first, then any) is overwritten in place before the
    /// chain is grown. Returns the state transition, if the state changed.
    pub fn record(
        &mut self,
        guard: ReceiverGuard,
        target: Rc<Method>,
        version: u32,
        max_entries: usize,
    ) -> Option<(CacheState, CacheState)> {
        let before = self.state();
        let entry = CacheEntry {
            guard,
            target,
            version,
        };
        match self {
            Self::Monomorphic(first) if first.guard == guard || first.version != version => {
                *first = entry;
                return None;
            }
            Self::Polymorphic(entries) => {
                let stale = entries
                    .iter()
                    .position(|it| it.guard == guard)
                    .or_else(|| entries.iter().position(|it| it.version != version));
                if let Some(idx) = stale {
                    entries.remove(idx);
                    entries.insert(0, entry);
                    return None;
                }
            }
            _ => {}
        }
        *self = match std::mem::take(self) {
            Self::Uninitialized => Self::Monomorphic(entry),
            Self::Monomorphic(_) if max_entries < 2 => Self::Megamorphic,
            Self::Monomorphic(first) => Self::Polymorphic(vec![entry, first]),
            Self::Polymorphic(mut entries) if entries.len() < max_entries => {
                entries.insert(0, entry);
                Self::Polymorphic(entries)
            }
            Self::Polymorphic(_) | Self::Megamorphic => Self::Megamorphic,
        };
        let after = self.state();
        (before != after).then_some((before, after))
    }
}

/// The state of every specializing site of every prepared method.
#[derive(Debug, Default)]
pub struct SpecializationTable {
    dispatch: Vec<DispatchCache>,
    /// The method dictionary version, bumped on every method installation.
    version: u32,
    fields: Vec<FieldCache>,
    controls: Vec<ControlState>,
}

impl SpecializationTable {
    /// Allocate a new message send site.
    pub fn new_call_site(&mut self) -> CallSiteId {
        self.dispatch.push(DispatchCache::Uninitialized);
        CallSiteId(self.dispatch.len() as u32 - 1)
    }

    /// Allocate a new field access site.
    pub fn new_field_site(&mut self) -> FieldSiteId {
        self.fields.push(FieldCache::Uninitialized);
        FieldSiteId(self.fields.len() as u32 - 1)
    }

    /// Allocate a new control-flow send site.
    pub fn new_control_site(&mut self) -> ControlSiteId {
        self.controls.push(ControlState::Specialized);
        ControlSiteId(self.controls.len() as u32 - 1)
    }

    pub fn dispatch(&self, site: CallSiteId) -> &DispatchCache {
        &self.dispatch[site.0 as usize]
    }

    pub fn dispatch_mut(&mut self, site: CallSiteId) -> &mut DispatchCache {
        &mut self.dispatch[site.0 as usize]
    }

    pub fn field(&self, site: FieldSiteId) -> &FieldCache {
        &self.fields[site.0 as usize]
    }

    pub fn field_mut(&mut self, site: FieldSiteId) -> &mut FieldCache {
        &mut self.fields[site.0 as usize]
    }

    pub fn control(&self, site: ControlSiteId) -> ControlState {
        self.controls[site.0 as usize]
    }

    pub fn control_mut(&mut self, site: ControlSiteId) -> &mut ControlState {
        &mut self.controls[site.0 as usize]
    }

    /// The current method dictionary version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Mark every cached target as stale, returning how many call sites held one.
    ///
    /// Cache states are left as they are.
    pub fn invalidate_dispatch(&mut self) -> usize {
        self.version = self.version.wrapping_add(1);
        self.dispatch.iter().filter(|cache| !cache.is_empty()).count()
    }
}

impl Universe {
    /// Get the state of a given call site's inline cache.
    pub fn call_site_state(&self, site: CallSiteId) -> CacheState {
        self.sites.dispatch(site).state()
    }

    /// Get the inline cache of a given call site.
    pub fn call_site(&self, site: CallSiteId) -> &DispatchCache {
        self.sites.dispatch(site)
    }

    /// Find the target of a send at a given site, going through (and updating) its inline cache.
    ///
    /// Failed lookups leave the cache untouched.
    pub fn lookup_cached(
        &mut self,
        site: CallSiteId,
        selector: Interned,
        receiver: &Value,
    ) -> Option<Rc<Method>> {
        let version = self.sites.version();
        if let Some(method) = self.sites.dispatch(site).lookup(receiver, version) {
            return Some(method);
        }

        let class = receiver.class(self);
        let method = self.lookup_method(class, selector)?;
        let max_entries = self.config.inline_cache_size;
        let guard = ReceiverGuard::of(receiver);
        let transition = self
            .sites
            .dispatch_mut(site)
            .record(guard, Rc::clone(&method), version, max_entries);
        match transition {
            Some((before, after)) => debug!(
                "#{}: call site {} went from {:?} to {:?} (receiver category {:?})",
                self.lookup_symbol(selector),
                site.0,
                before,
                after,
                guard,
            ),
            None => trace!(
                "#{}: call site {} now caches {} targets",
                self.lookup_symbol(selector),
                site.0,
                self.sites.dispatch(site).len(),
            ),
        }

        Some(method)
    }

    /// Find the target of a super send, starting the lookup at the holder's superclass.
    ///
    /// The lookup class is fixed for a given site, so the first result is cached for good.
    pub fn lookup_super(
        &mut self,
        site: CallSiteId,
        lookup_class: ClassId,
        selector: Interned,
    ) -> Option<Rc<Method>> {
        let version = self.sites.version();
        if let DispatchCache::Monomorphic(entry) = self.sites.dispatch(site) {
            if entry.version == version {
                return Some(Rc::clone(&entry.target));
            }
        }
        let method = self.lookup_method(lookup_class, selector)?;
        *self.sites.dispatch_mut(site) = DispatchCache::Monomorphic(CacheEntry {
            guard: ReceiverGuard::Class(lookup_class),
            target: Rc::clone(&method),
            version,
        });
        Some(method)
    }

    /// Send a message at a given site (`args[0]` being the receiver).
    pub fn send_cached(&mut self, site: CallSiteId, selector: Interned, args: Vec<Value>) -> Return {
        let Some(receiver) = args.first() else {
            return Return::internal("message send without a receiver");
        };
        match self.lookup_cached(site, selector, receiver) {
            Some(method) => method.invoke(self, args),
            None => self.does_not_understand_args(selector, args),
        }
    }

    /// Send a message to super at a given site (`args[0]` being the receiver).
    pub fn send_super(
        &mut self,
        site: CallSiteId,
        lookup_class: ClassId,
        selector: Interned,
        args: Vec<Value>,
    ) -> Return {
        match self.lookup_super(site, lookup_class, selector) {
            Some(method) => method.invoke(self, args),
            None => self.does_not_understand_args(selector, args),
        }
    }
}
