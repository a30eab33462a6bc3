use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::interner::Interned;
use crate::method::Method;
use crate::shape::{ShapeId, ShapeTable};
use crate::value::Value;

/// The identifier of a class within its [`ClassRegistry`].
///
/// Metaclasses are classes too, and get their own identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub(crate) u32);

/// Represents a loaded class.
#[derive(Clone)]
pub struct Class {
    /// The class' name.
    pub name: String,
    /// The class of this class.
    pub class: ClassId,
    /// The superclass of this class.
    pub super_class: Option<ClassId>,
    /// The names of the fields carried by this class' instances, inherited ones first.
    pub fields: Vec<String>,
    /// The values of this class object's own fields (its class-side variables).
    pub locals: Vec<Value>,
    /// The class' methods/invokables.
    pub methods: IndexMap<Interned, Rc<Method>>,
    /// The current shape of this class' instances.
    pub shape: ShapeId,
    /// Is this class a static one ?
    pub is_static: bool,
}

impl Class {
    /// Get the class' name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Get the class of this class.
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Get the superclass of this class.
    pub fn super_class(&self) -> Option<ClassId> {
        self.super_class
    }

    /// Get the current shape of this class' instances.
    pub fn shape(&self) -> ShapeId {
        self.shape
    }

    /// The number of fields each instance of this class carries.
    pub fn nb_fields(&self) -> usize {
        self.fields.len()
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("shape", &self.shape)
            .finish()
    }
}

/// The arena owning every loaded class.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: Vec<Class>,
}

impl ClassRegistry {
    /// Get a class by its identifier.
    pub fn get(&self, id: ClassId) -> &Class {
        &self.classes[id.0 as usize]
    }

    /// Get a class by its identifier, mutably.
    pub fn get_mut(&mut self, id: ClassId) -> &mut Class {
        &mut self.classes[id.0 as usize]
    }

    /// The number of classes (metaclasses included) registered so far.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no classes are registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Search for a given method, starting at `class` and walking up the superclass chain.
    pub fn lookup_method(&self, class: ClassId, signature: Interned) -> Option<Rc<Method>> {
        let mut current = Some(class);
        while let Some(id) = current {
            let class = self.get(id);
            if let Some(method) = class.methods.get(&signature) {
                return Some(Rc::clone(method));
            }
            current = class.super_class;
        }
        None
    }

    /// Register a class along with its metaclass, returning the (instance-side) class.
    ///
    /// Inherited fields (on both sides) come first, followed by the given ones.
    /// When `metaclass_class` is `None`, the metaclass temporarily refers to itself
    /// as its own class: the caller is expected to patch it.
    pub(crate) fn create_pair(
        &mut self,
        shapes: &mut ShapeTable,
        name: &str,
        super_class: Option<ClassId>,
        metaclass_class: Option<ClassId>,
        instance_fields: &[String],
        static_fields: &[String],
    ) -> ClassId {
        let super_metaclass = super_class.map(|id| self.get(id).class);

        let mut class_side_fields = super_metaclass
            .map(|id| self.get(id).fields.clone())
            .unwrap_or_default();
        class_side_fields.extend(static_fields.iter().cloned());

        let mut fields = super_class
            .map(|id| self.get(id).fields.clone())
            .unwrap_or_default();
        fields.extend(instance_fields.iter().cloned());

        let nb_class_side_fields = class_side_fields.len();
        let metaclass = self.allocate(shapes, nb_class_side_fields, |id, shape| Class {
            name: format!("{} class", name),
            class: metaclass_class.unwrap_or(id),
            super_class: super_metaclass,
            fields: class_side_fields,
            locals: Vec::new(),
            methods: IndexMap::new(),
            shape,
            is_static: true,
        });

        self.allocate(shapes, fields.len(), |_, shape| Class {
            name: name.to_string(),
            class: metaclass,
            super_class,
            fields,
            locals: vec![Value::Nil; nb_class_side_fields],
            methods: IndexMap::new(),
            shape,
            is_static: false,
        })
    }

    fn allocate(
        &mut self,
        shapes: &mut ShapeTable,
        nb_fields: usize,
        build: impl FnOnce(ClassId, ShapeId) -> Class,
    ) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        let shape = shapes.create(id, nb_fields);
        self.classes.push(build(id, shape));
        id
    }
}
