//!
//! Object shapes and storage locations.
//!
//! Every class has a current [`Shape`]: the storage kind of each of its instances' fields.
//! A field starts out unwritten, gets specialized by the first value stored into it and is
//! generalized to a reference slot if a value of another representation shows up later.
//! Generalization never goes back, and creates a new shape version for the class.
//! Instances still laid out for an older version are migrated when they are next accessed.
//!

use log::{debug, trace};

use crate::class::ClassId;
use crate::instance::Instance;
use crate::universe::Universe;
use crate::value::Value;

/// The number of fields stored directly within an instance.
///
/// Fields past this index live in the instance's overflow storage.
pub const INLINE_FIELDS: usize = 5;

/// The identifier of a shape within its [`ShapeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub(crate) u32);

/// How a field is physically stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    /// Never written to by any instance since the class was created: reads as **nil**.
    Unwritten,
    /// An unboxed 64-bit integer, stored inline.
    Integer,
    /// An unboxed double, stored inline.
    Double,
    /// Any value, stored inline.
    Reference,
    /// Any value, stored in the overflow storage.
    Overflow,
}

impl LocationKind {
    /// The kind a value would be stored as, if the field at `index` was unwritten.
    pub fn for_value(index: usize, value: &Value) -> Self {
        if index >= INLINE_FIELDS {
            return Self::Overflow;
        }
        match value {
            Value::Integer(_) => Self::Integer,
            Value::Double(_) => Self::Double,
            _ => Self::Reference,
        }
    }

    /// Whether `value` can be stored in a location of this kind, as-is.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Unwritten => false,
            Self::Integer => matches!(value, Value::Integer(_)),
            Self::Double => matches!(value, Value::Double(_)),
            Self::Reference | Self::Overflow => true,
        }
    }

    /// The kind a location of this kind turns into, so that it can accept `value`.
    pub fn generalize(self, index: usize, value: &Value) -> Self {
        match self {
            Self::Unwritten => Self::for_value(index, value),
            Self::Integer | Self::Double => Self::Reference,
            Self::Reference | Self::Overflow => self,
        }
    }
}

/// A field's storage descriptor, as valid for one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageLocation {
    /// How the field is stored.
    pub kind: LocationKind,
    /// The field's index.
    pub index: usize,
    /// The shape this descriptor belongs to.
    pub shape: ShapeId,
}

/// The storage layout of a class' instances, at a given version.
#[derive(Debug, Clone)]
pub struct Shape {
    /// This shape's identifier.
    pub id: ShapeId,
    /// The class this shape describes.
    pub class: ClassId,
    /// Starts at zero and increases by one with each generalization.
    pub version: u32,
    /// One location per field.
    pub locations: Vec<StorageLocation>,
    /// The shape that replaced this one, if any.
    pub successor: Option<ShapeId>,
}

impl Shape {
    /// Whether this is the class' current shape.
    pub fn is_current(&self) -> bool {
        self.successor.is_none()
    }

    /// Get the location of a given field.
    pub fn location(&self, index: usize) -> Option<StorageLocation> {
        self.locations.get(index).copied()
    }
}

/// The arena owning every shape ever created.
#[derive(Debug, Default)]
pub struct ShapeTable {
    shapes: Vec<Shape>,
}

impl ShapeTable {
    /// Create the initial shape for a class with `nb_fields` fields.
    pub fn create(&mut self, class: ClassId, nb_fields: usize) -> ShapeId {
        let id = ShapeId(self.shapes.len() as u32);
        let locations = (0..nb_fields)
            .map(|index| StorageLocation {
                kind: if index < INLINE_FIELDS {
                    LocationKind::Unwritten
                } else {
                    LocationKind::Overflow
                },
                index,
                shape: id,
            })
            .collect();
        self.shapes.push(Shape {
            id,
            class,
            version: 0,
            locations,
            successor: None,
        });
        id
    }

    /// Get a shape by its identifier.
    pub fn get(&self, id: ShapeId) -> &Shape {
        &self.shapes[id.0 as usize]
    }

    /// Derive a new version of a shape, with the field at `index` stored as `kind`.
    pub fn derive(&mut self, from: ShapeId, index: usize, kind: LocationKind) -> ShapeId {
        let id = ShapeId(self.shapes.len() as u32);
        let previous = self.get(from);
        let mut shape = Shape {
            id,
            class: previous.class,
            version: previous.version + 1,
            locations: previous.locations.clone(),
            successor: None,
        };
        for location in shape.locations.iter_mut() {
            location.shape = id;
        }
        shape.locations[index].kind = kind;
        self.shapes[from.0 as usize].successor = Some(id);
        self.shapes.push(shape);
        id
    }

    /// The number of shapes created so far.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether no shapes were created.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// The state of a field access site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCache {
    /// Never executed.
    Uninitialized,
    /// The location last used by this site.
    Cached(StorageLocation),
}

impl Universe {
    /// Get the current shape of a class' instances.
    pub fn shape_of(&self, class: ClassId) -> &Shape {
        self.shapes.get(self.class(class).shape())
    }

    /// Bring an instance up to date with its class' current shape.
    pub fn revalidate(&self, instance: &mut Instance) {
        let current = self.class(instance.class()).shape();
        if instance.shape() != current {
            trace!(
                "migrating an instance of '{}' to shape version {}",
                self.class(instance.class()).name(),
                self.shapes.get(current).version,
            );
            instance.migrate(self.shapes.get(instance.shape()), self.shapes.get(current));
        }
    }

    /// Read a field from an instance or class object.
    ///
    /// Fields that were never written to read as **nil**.
    pub fn read_field(&self, receiver: &Value, index: usize) -> Option<Value> {
        match receiver {
            Value::Instance(instance) => {
                let mut instance = instance.borrow_mut();
                self.revalidate(&mut instance);
                let location = self.shapes.get(instance.shape()).location(index)?;
                Some(instance.read_location(&location))
            }
            Value::Class(class) => self.class(*class).locals.get(index).cloned(),
            _ => None,
        }
    }

    /// Write a field of an instance or class object.
    pub fn write_field(&mut self, receiver: &Value, index: usize, value: Value) -> Option<()> {
        match receiver {
            Value::Instance(instance) => {
                let mut instance = instance.borrow_mut();
                self.write_instance_field(&mut instance, index, value)?;
                Some(())
            }
            Value::Class(class) => {
                *self.class_mut(*class).locals.get_mut(index)? = value;
                Some(())
            }
            _ => None,
        }
    }

    /// Read a field through a field access site's cached location.
    pub(crate) fn read_field_cached(
        &mut self,
        site: FieldSiteId,
        receiver: &Value,
        index: usize,
    ) -> Option<Value> {
        let Value::Instance(instance) = receiver else {
            return self.read_field(receiver, index);
        };
        let mut instance = instance.borrow_mut();
        if let Some(location) = self.cached_location(site, &instance) {
            return Some(instance.read_location(&location));
        }
        self.revalidate(&mut instance);
        let location = self.shapes.get(instance.shape()).location(index)?;
        *self.sites.field_mut(site) = FieldCache::Cached(location);
        Some(instance.read_location(&location))
    }

    /// Write a field through a field access site's cached location.
    pub(crate) fn write_field_cached(
        &mut self,
        site: FieldSiteId,
        receiver: &Value,
        index: usize,
        value: Value,
    ) -> Option<()> {
        let Value::Instance(instance) = receiver else {
            return self.write_field(receiver, index, value);
        };
        let mut instance = instance.borrow_mut();
        if let Some(location) = self.cached_location(site, &instance) {
            if location.kind.accepts(&value) {
                return instance.write_location(&location, value).ok();
            }
        }
        let location = self.write_instance_field(&mut instance, index, value)?;
        *self.sites.field_mut(site) = FieldCache::Cached(location);
        Some(())
    }

    /// The site's cached location, if it is valid for `instance` as it is laid out right now.
    fn cached_location(&self, site: FieldSiteId, instance: &Instance) -> Option<StorageLocation> {
        match *self.sites.field(site) {
            FieldCache::Cached(location)
                if location.shape == instance.shape()
                    && self.shapes.get(location.shape).is_current() =>
            {
                Some(location)
            }
            _ => None,
        }
    }

    fn write_instance_field(
        &mut self,
        instance: &mut Instance,
        index: usize,
        value: Value,
    ) -> Option<StorageLocation> {
        self.revalidate(instance);
        let location = self.shapes.get(instance.shape()).location(index)?;
        let value = match instance.write_location(&location, value) {
            Ok(()) => return Some(location),
            Err(value) => value,
        };

        let kind = location.kind.generalize(index, &value);
        self.generalize(instance.class(), index, kind);
        self.revalidate(instance);
        let location = self.shapes.get(instance.shape()).location(index)?;
        instance.write_location(&location, value).ok()?;
        Some(location)
    }

    /// Install a new shape version for `class`, where the field at `index` is stored as `kind`.
    fn generalize(&mut self, class: ClassId, index: usize, kind: LocationKind) {
        let current = self.class(class).shape();
        let shape = self.shapes.derive(current, index, kind);
        self.class_mut(class).shape = shape;
        debug!(
            "'{}': field #{} ('{}') is now stored as {:?} (shape version {})",
            self.class(class).name(),
            index,
            self.class(class).fields[index],
            kind,
            self.shapes.get(shape).version,
        );
    }
}

/// The identifier of a field access site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldSiteId(pub(crate) u32);

