use std::fmt;

use crate::class::ClassId;
use crate::shape::{LocationKind, Shape, ShapeId, StorageLocation, INLINE_FIELDS};
use crate::value::Value;

/// Represents a generic (non-primitive) class instance.
///
/// The first few fields are stored inline, either unboxed (integers and doubles)
/// or as references, according to the instance's shape. The rest overflow into
/// a separately allocated array.
#[derive(Clone)]
pub struct Instance {
    /// The class of which this is an instance from.
    pub class: ClassId,
    /// The shape this instance's storage is laid out for.
    pub shape: ShapeId,
    /// Unboxed storage, for integer and double locations.
    scalars: [u64; INLINE_FIELDS],
    /// Which of the `scalars` have been written to.
    written: u8,
    /// Boxed storage, for reference locations.
    references: [Value; INLINE_FIELDS],
    /// Storage for the fields past the inline ones.
    overflow: Vec<Value>,
}

impl Instance {
    /// Construct an instance laid out according to a given shape.
    pub fn from_shape(class: ClassId, shape: &Shape) -> Self {
        Self {
            class,
            shape: shape.id,
            scalars: [0; INLINE_FIELDS],
            written: 0,
            references: std::array::from_fn(|_| Value::Nil),
            overflow: vec![Value::Nil; shape.locations.len().saturating_sub(INLINE_FIELDS)],
        }
    }

    /// Get the class of which this is an instance from.
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Get the shape this instance is currently laid out for.
    pub fn shape(&self) -> ShapeId {
        self.shape
    }

    /// Read a field, as described by a location of this instance's shape.
    pub fn read_location(&self, location: &StorageLocation) -> Value {
        let index = location.index;
        match location.kind {
            LocationKind::Unwritten => Value::Nil,
            LocationKind::Integer if self.is_written(index) => {
                Value::Integer(self.scalars[index] as i64)
            }
            LocationKind::Double if self.is_written(index) => {
                Value::Double(f64::from_bits(self.scalars[index]))
            }
            LocationKind::Integer | LocationKind::Double => Value::Nil,
            LocationKind::Reference => self.references[index].clone(),
            LocationKind::Overflow => self.overflow[index - INLINE_FIELDS].clone(),
        }
    }

    /// Write a field, as described by a location of this instance's shape.
    ///
    /// The value is handed back if the location cannot hold it.
    pub fn write_location(&mut self, location: &StorageLocation, value: Value) -> Result<(), Value> {
        let index = location.index;
        match (location.kind, value) {
            (LocationKind::Integer, Value::Integer(value)) => {
                self.scalars[index] = value as u64;
                self.written |= 1 << index;
            }
            (LocationKind::Double, Value::Double(value)) => {
                self.scalars[index] = value.to_bits();
                self.written |= 1 << index;
            }
            (LocationKind::Reference, value) => self.references[index] = value,
            (LocationKind::Overflow, value) => self.overflow[index - INLINE_FIELDS] = value,
            (_, value) => return Err(value),
        }
        Ok(())
    }

    /// Relayout this instance from the `from` shape into the `to` shape.
    ///
    /// Both shapes must be versions of this instance's class shape, `to` being the newer one.
    pub fn migrate(&mut self, from: &Shape, to: &Shape) {
        for (old, new) in from.locations.iter().zip(to.locations.iter()) {
            if old.kind == new.kind {
                continue;
            }
            let value = self.read_location(old);
            self.clear(old);
            if !value.is_nil() {
                let migrated = self.write_location(new, value);
                debug_assert!(migrated.is_ok(), "field kinds only ever generalize");
            }
        }
        self.shape = to.id;
    }

    fn is_written(&self, index: usize) -> bool {
        self.written & (1 << index) != 0
    }

    fn clear(&mut self, location: &StorageLocation) {
        let index = location.index;
        match location.kind {
            LocationKind::Unwritten => {}
            LocationKind::Integer | LocationKind::Double => {
                self.scalars[index] = 0;
                self.written &= !(1 << index);
            }
            LocationKind::Reference => self.references[index] = Value::Nil,
            LocationKind::Overflow => self.overflow[index - INLINE_FIELDS] = Value::Nil,
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class)
            .field("shape", &self.shape)
            .finish()
    }
}
