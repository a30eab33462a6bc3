use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{anyhow, bail, Result};
use log::{debug, warn};
use som_core::ast::{ClassDef, MethodBody, MethodDef};
use som_core::span::Span;

use crate::class::{Class, ClassId, ClassRegistry};
use crate::compiler;
use crate::config::UniverseConfig;
use crate::dispatch::SpecializationTable;
use crate::error::{ExecError, Exception};
use crate::frame::{Frame, FrameKind};
use crate::instance::Instance;
use crate::interner::{Interned, Interner};
use crate::invokable::{Invoke, Return};
use crate::method::{Method, MethodKind};
use crate::primitives;
use crate::shape::ShapeTable;
use crate::value::Value;
use crate::SOMRef;

/// The core classes of the SOM interpreter.
///
/// This struct allows to always keep a reference to important classes,
/// even in case of modifications to global bindings by user-defined code.
#[derive(Debug, Clone, Copy)]
pub struct CoreClasses {
    /// The **Object** class.
    pub object_class: ClassId,
    /// The **Class** class.
    pub class_class: ClassId,
    /// The **Metaclass** class.
    pub metaclass_class: ClassId,

    /// The **Nil** class.
    pub nil_class: ClassId,
    /// The **Integer** class.
    pub integer_class: ClassId,
    /// The **Double** class.
    pub double_class: ClassId,
    /// The **Array** class.
    pub array_class: ClassId,
    /// The **Method** class.
    pub method_class: ClassId,
    /// The **Primitive** class.
    pub primitive_class: ClassId,
    /// The **String** class.
    pub string_class: ClassId,
    /// The **Symbol** class.
    pub symbol_class: ClassId,

    /// The **Block** class.
    pub block_class: ClassId,
    /// The **Block1** class.
    pub block1_class: ClassId,
    /// The **Block2** class.
    pub block2_class: ClassId,
    /// The **Block3** class.
    pub block3_class: ClassId,

    /// The **Boolean** class.
    pub boolean_class: ClassId,
    /// The **True** class.
    pub true_class: ClassId,
    /// The **False** class.
    pub false_class: ClassId,
}

/// The central data structure for the interpreter.
///
/// It represents the complete state of the interpreter, like the known class definitions,
/// the string interner, the object shapes and the state of every specializing site.
pub struct Universe {
    /// The string interner for symbols.
    pub interner: Interner,
    /// The known global bindings.
    pub globals: HashMap<Interned, Value>,
    /// Every loaded class (metaclasses included).
    pub classes: ClassRegistry,
    /// Every shape, current or superseded.
    pub shapes: ShapeTable,
    /// The state of every message send, field access and control-flow site.
    pub sites: SpecializationTable,
    /// The interpreter's core classes.
    pub core: CoreClasses,
    /// The interpreter's tunables.
    pub config: UniverseConfig,
}

impl Universe {
    /// Initialize the universe with the default configuration.
    pub fn new() -> Self {
        Self::with_config(UniverseConfig::default())
    }

    /// Initialize the universe, with its core classes and their primitives.
    pub fn with_config(config: UniverseConfig) -> Self {
        let mut classes = ClassRegistry::default();
        let mut shapes = ShapeTable::default();

        // `Object`, `Class` and `Metaclass` refer to each other, their metaclasses are patched below.
        let object_class = classes.create_pair(&mut shapes, "Object", None, None, &[], &[]);
        let class_class =
            classes.create_pair(&mut shapes, "Class", Some(object_class), None, &[], &[]);
        let metaclass_class =
            classes.create_pair(&mut shapes, "Metaclass", Some(class_class), None, &[], &[]);

        let mut pair = |name: &str, super_class: ClassId| {
            classes.create_pair(
                &mut shapes,
                name,
                Some(super_class),
                Some(metaclass_class),
                &[],
                &[],
            )
        };

        let nil_class = pair("Nil", object_class);
        let boolean_class = pair("Boolean", object_class);
        let true_class = pair("True", boolean_class);
        let false_class = pair("False", boolean_class);
        let integer_class = pair("Integer", object_class);
        let double_class = pair("Double", object_class);
        let array_class = pair("Array", object_class);
        let string_class = pair("String", object_class);
        let symbol_class = pair("Symbol", string_class);
        let method_class = pair("Method", object_class);
        let primitive_class = pair("Primitive", object_class);
        let block_class = pair("Block", object_class);
        let block1_class = pair("Block1", block_class);
        let block2_class = pair("Block2", block_class);
        let block3_class = pair("Block3", block_class);

        for class in [object_class, class_class, metaclass_class] {
            let metaclass = classes.get(class).class();
            classes.get_mut(metaclass).class = metaclass_class;
        }
        let object_metaclass = classes.get(object_class).class();
        classes.get_mut(object_metaclass).super_class = Some(class_class);

        let mut universe = Self {
            interner: Interner::with_capacity(256),
            globals: HashMap::new(),
            classes,
            shapes,
            sites: SpecializationTable::default(),
            core: CoreClasses {
                object_class,
                class_class,
                metaclass_class,
                nil_class,
                integer_class,
                double_class,
                array_class,
                method_class,
                primitive_class,
                string_class,
                symbol_class,
                block_class,
                block1_class,
                block2_class,
                block3_class,
                boolean_class,
                true_class,
                false_class,
            },
            config,
        };

        let core_classes = [
            object_class,
            class_class,
            metaclass_class,
            nil_class,
            boolean_class,
            true_class,
            false_class,
            integer_class,
            double_class,
            array_class,
            string_class,
            symbol_class,
            method_class,
            primitive_class,
            block_class,
            block1_class,
            block2_class,
            block3_class,
        ];
        for class in core_classes {
            universe.install_primitives(class);
            let name = universe.class(class).name().to_string();
            let name = universe.intern_symbol(&name);
            universe.globals.insert(name, Value::Class(class));
        }

        for (name, value) in [
            ("nil", Value::Nil),
            ("true", Value::Boolean(true)),
            ("false", Value::Boolean(false)),
        ] {
            let name = universe.intern_symbol(name);
            universe.globals.insert(name, value);
        }

        debug!(
            "universe initialized ({} classes, inline cache size {}, control-flow specialization {})",
            universe.classes.len(),
            universe.config.inline_cache_size,
            if universe.config.specialize_control_flow { "on" } else { "off" },
        );

        universe
    }

    /// Load up a class from its definition, registering it as a global.
    ///
    /// A missing superclass name means `Object`.
    pub fn define_class(&mut self, defn: &ClassDef) -> Result<ClassId> {
        let super_class = match defn.super_class.as_deref() {
            None => self.core.object_class,
            Some(name) => match self.global(name) {
                Some(Value::Class(class)) => class,
                Some(_) => bail!("{}: superclass '{}' is not a class", defn.name, name),
                None => bail!("{}: superclass '{}' is not defined", defn.name, name),
            },
        };

        check_fields(&defn.name, &self.class(super_class).fields, &defn.instance_fields)?;
        let super_metaclass = self.class(super_class).class();
        check_fields(&defn.name, &self.class(super_metaclass).fields, &defn.static_fields)?;

        let class = self.classes.create_pair(
            &mut self.shapes,
            &defn.name,
            Some(super_class),
            Some(self.core.metaclass_class),
            &defn.instance_fields,
            &defn.static_fields,
        );
        let metaclass = self.class(class).class();

        for method in &defn.static_methods {
            self.install_method(metaclass, method)?;
        }
        for method in &defn.instance_methods {
            self.install_method(class, method)?;
        }

        let name = self.intern_symbol(&defn.name);
        if self.globals.insert(name, Value::Class(class)).is_some() {
            warn!("class '{}' redefined, the global now refers to the new one", defn.name);
        }

        debug!(
            "defined class '{}' ({} fields, {} methods)",
            defn.name,
            self.class(class).nb_fields(),
            self.class(class).methods.len(),
        );

        Ok(class)
    }

    /// Prepare a method and add it to a class (replacing any previous one with that signature).
    ///
    /// Methods declared as primitives are bound to their implementation, if one exists.
    pub fn install_method(&mut self, class: ClassId, defn: &MethodDef) -> Result<()> {
        let kind = match &defn.body {
            MethodBody::Primitive => {
                let holder = self.class(class);
                match primitives::lookup(base_name(holder), holder.is_static, &defn.signature) {
                    Some(primitive) => MethodKind::Primitive(primitive),
                    None => {
                        let name = format!("{}>>#{}", holder.name(), defn.signature);
                        warn!("no implementation for primitive '{}'", name);
                        MethodKind::NotImplemented(name)
                    }
                }
            }
            MethodBody::Body { .. } => MethodKind::Defined(compiler::compile_method(self, class, defn)?),
        };

        let signature = self.intern_symbol(&defn.signature);
        self.add_method(class, signature, kind);
        Ok(())
    }

    fn add_method(&mut self, class: ClassId, signature: Interned, kind: MethodKind) {
        let method = Rc::new(Method {
            kind,
            holder: class,
            signature,
        });
        self.class_mut(class).methods.insert(signature, method);

        let stale = self.sites.invalidate_dispatch();
        if stale > 0 {
            debug!(
                "installed '{}>>#{}', {} call sites now revalidate their targets",
                self.class(class).name(),
                self.lookup_symbol(signature),
                stale,
            );
        }
    }

    fn install_primitives(&mut self, class: ClassId) {
        let name = self.class(class).name().to_string();
        let metaclass = self.class(class).class();
        let tables = [
            (class, primitives::get_instance_primitives(&name)),
            (metaclass, primitives::get_class_primitives(&name)),
        ];
        for (holder, table) in tables {
            for (signature, primitive) in table.into_iter().flatten() {
                let signature = self.intern_symbol(signature);
                self.add_method(holder, signature, MethodKind::Primitive(*primitive));
            }
        }
    }

    /// Create a new instance of a given class, with all its fields set to **nil**.
    pub fn instantiate(&self, class: ClassId) -> Value {
        let shape = self.shape_of(class);
        Value::Instance(Rc::new(RefCell::new(Instance::from_shape(class, shape))))
    }

    /// Get a class by its identifier.
    pub fn class(&self, id: ClassId) -> &Class {
        self.classes.get(id)
    }

    /// Get a class by its identifier, mutably.
    pub fn class_mut(&mut self, id: ClassId) -> &mut Class {
        self.classes.get_mut(id)
    }

    /// Search for a method, starting at a given class and walking up the superclass chain.
    pub fn lookup_method(&self, class: ClassId, signature: Interned) -> Option<Rc<Method>> {
        self.classes.lookup_method(class, signature)
    }

    /// Get the printable identity of a method (eg. `Counter>>#increment`).
    pub fn method_name(&self, method: &Method) -> String {
        format!(
            "{}>>#{}",
            self.class(method.holder()).name(),
            self.lookup_symbol(method.signature()),
        )
    }

    /// Execute a function within a fresh activation, terminating it once done.
    pub fn with_frame<T>(
        &mut self,
        frame: Frame,
        func: impl FnOnce(&mut Self, &SOMRef<Frame>) -> T,
    ) -> T {
        let frame = Rc::new(RefCell::new(frame));
        let output = func(self, &frame);
        frame.borrow_mut().terminate();
        output
    }

    /// Get the class of blocks with a given number of parameters.
    pub fn block_class(&self, nb_params: usize) -> ClassId {
        match nb_params {
            0 => self.core.block1_class,
            1 => self.core.block2_class,
            _ => self.core.block3_class,
        }
    }

    /// Get the **Nil** class.
    pub fn nil_class(&self) -> ClassId {
        self.core.nil_class
    }

    /// Get the **Object** class.
    pub fn object_class(&self) -> ClassId {
        self.core.object_class
    }

    /// Get the **Symbol** class.
    pub fn symbol_class(&self) -> ClassId {
        self.core.symbol_class
    }
    /// Get the **String** class.
    pub fn string_class(&self) -> ClassId {
        self.core.string_class
    }
    /// Get the **Array** class.
    pub fn array_class(&self) -> ClassId {
        self.core.array_class
    }

    /// Get the **Integer** class.
    pub fn integer_class(&self) -> ClassId {
        self.core.integer_class
    }
    /// Get the **Double** class.
    pub fn double_class(&self) -> ClassId {
        self.core.double_class
    }

    /// Get the **Boolean** class.
    pub fn boolean_class(&self) -> ClassId {
        self.core.boolean_class
    }
    /// Get the **True** class.
    pub fn true_class(&self) -> ClassId {
        self.core.true_class
    }
    /// Get the **False** class.
    pub fn false_class(&self) -> ClassId {
        self.core.false_class
    }

    /// Get the **Class** class.
    pub fn class_class(&self) -> ClassId {
        self.core.class_class
    }
    /// Get the **Metaclass** class.
    pub fn metaclass_class(&self) -> ClassId {
        self.core.metaclass_class
    }

    /// Get the **Method** class.
    pub fn method_class(&self) -> ClassId {
        self.core.method_class
    }
    /// Get the **Primitive** class.
    pub fn primitive_class(&self) -> ClassId {
        self.core.primitive_class
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::new()
    }
}

impl Universe {
    /// Intern a symbol.
    pub fn intern_symbol(&mut self, symbol: &str) -> Interned {
        self.interner.intern(symbol)
    }

    /// Lookup a symbol.
    pub fn lookup_symbol(&self, symbol: Interned) -> &str {
        self.interner.lookup(symbol)
    }

    /// Search for a global binding.
    pub fn lookup_global(&self, idx: Interned) -> Option<Value> {
        self.globals.get(&idx).cloned()
    }

    /// Search for a global binding, by name.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.lookup_global(self.interner.get(name)?)
    }

    /// Assign a value to a global binding, returning the previous value if there was one.
    pub fn assign_global(&mut self, name: Interned, value: Value) -> Option<Value> {
        self.globals.insert(name, value)
    }
}

impl Universe {
    /// Send a message, with a full method lookup.
    ///
    /// This is the entry point for hosts; escaping non-local returns and
    /// other failures end up in the error.
    pub fn send(
        &mut self,
        selector: &str,
        receiver: Value,
        args: Vec<Value>,
    ) -> Result<Value, Exception> {
        let selector = self.intern_symbol(selector);
        let mut all_args = Vec::with_capacity(args.len() + 1);
        all_args.push(receiver);
        all_args.extend(args);
        let output = self.send_message(selector, all_args);
        self.complete(output)
    }

    /// Invoke a given method on a receiver.
    pub fn invoke(
        &mut self,
        method: &Method,
        receiver: Value,
        args: Vec<Value>,
    ) -> Result<Value, Exception> {
        let mut all_args = Vec::with_capacity(args.len() + 1);
        all_args.push(receiver);
        all_args.extend(args);
        let output = method.invoke(self, all_args);
        self.complete(output)
    }

    /// Turn the outcome of a top-level evaluation into a result.
    fn complete(&self, output: Return) -> Result<Value, Exception> {
        match output {
            Return::Local(value) => Ok(value),
            Return::NonLocal(_, frame) => {
                let method = match *frame.borrow().kind() {
                    FrameKind::Method { holder, signature } => format!(
                        "{}>>#{}",
                        self.class(holder).name(),
                        self.lookup_symbol(signature)
                    ),
                    FrameKind::Block => "<block>".to_string(),
                };
                Err(Exception::new(ExecError::EscapedNonLocalReturn {
                    method,
                    span: Span::default(),
                }))
            }
            Return::Exception(exception) => Err(*exception),
        }
    }

    /// Send a message (`args[0]` being the receiver), with a full method lookup.
    ///
    /// This is what reflective primitives (like `perform:`) go through.
    pub fn send_message(&mut self, selector: Interned, args: Vec<Value>) -> Return {
        let Some(receiver) = args.first() else {
            return Return::internal("message send without a receiver");
        };
        match receiver.lookup_method(self, selector) {
            Some(method) => method.invoke(self, args),
            None => self.does_not_understand_args(selector, args),
        }
    }

    /// Call `doesNotUnderstand:arguments:` on the receiver (`args[0]`).
    pub fn does_not_understand_args(&mut self, selector: Interned, args: Vec<Value>) -> Return {
        let mut iter = args.into_iter();
        let Some(receiver) = iter.next() else {
            return Return::internal("message send without a receiver");
        };
        self.does_not_understand(receiver, selector, iter.collect())
    }

    /// Call `doesNotUnderstand:arguments:` on the given value.
    ///
    /// If even that is not understood, the registry is broken and this is fatal.
    pub fn does_not_understand(
        &mut self,
        value: Value,
        symbol: Interned,
        args: Vec<Value>,
    ) -> Return {
        let method_name = self.intern_symbol("doesNotUnderstand:arguments:");
        let Some(method) = value.lookup_method(self, method_name) else {
            let class = value.class(self);
            return Return::error(ExecError::LookupFailure {
                class: self.class(class).name().to_string(),
                selector: self.lookup_symbol(method_name).to_string(),
            });
        };

        debug!(
            "'{}' does not understand #{}",
            value.to_string(self),
            self.lookup_symbol(symbol),
        );
        let args = Value::Array(Rc::new(RefCell::new(args)));
        method.invoke(self, vec![value, Value::Symbol(symbol), args])
    }

    /// Call `unknownGlobal:` on the given value, if it is defined.
    pub fn unknown_global(&mut self, value: Value, name: Interned) -> Return {
        let method_name = self.intern_symbol("unknownGlobal:");
        match value.lookup_method(self, method_name) {
            Some(method) => method.invoke(self, vec![value, Value::Symbol(name)]),
            None => Return::error(ExecError::UnknownGlobal(self.lookup_symbol(name).to_string())),
        }
    }
}

/// The name of a class, without the ` class` suffix for metaclasses.
fn base_name(class: &Class) -> &str {
    if class.is_static {
        class.name().strip_suffix(" class").unwrap_or(class.name())
    } else {
        class.name()
    }
}

fn check_fields(class_name: &str, inherited: &[String], declared: &[String]) -> Result<()> {
    for (idx, field) in declared.iter().enumerate() {
        if inherited.contains(field) || declared[..idx].contains(field) {
            return Err(anyhow!(
                "{}: the field named '{}' is already defined in this class",
                class_name,
                field,
            ));
        }
    }
    Ok(())
}
