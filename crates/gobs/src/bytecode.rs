//! Bytecode instruction set and compiled code representation.
//!
//! This module defines the instructions that the compiler produces and the
//! VM executes. Labels are symbolic: a [`Op::Label`] names a position in
//! the stream and every jump refers to such a name. The VM resolves them
//! when it loads the code; the compiler guarantees each name is defined
//! exactly once per [`Code`].

use std::collections::BTreeMap;
use std::fmt;

use num_bigint::BigInt;

use crate::span::Span;

// ---------------------------------------------------------------------------
// Runtime type assertions
// ---------------------------------------------------------------------------

/// A type tree for the [`Op::TypeCheck`] instruction.
///
/// Typing is enforced dynamically: the compiler performs no inference and
/// instead asserts the shape it relies on right before using a value.
/// `Any` matches every value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Type {
    Any,
    Integer,
    String,
    /// A tuple with one component type per position.
    Tuple(Vec<Type>),
    /// A homogeneous list.
    List(Box<Type>),
    /// A value of the variant type `type_name`. `cases` maps constructor
    /// names to their field types; an empty map accepts any constructor of
    /// the type.
    Structure {
        type_name: String,
        cases: BTreeMap<String, BTreeMap<String, Type>>,
    },
}

impl Type {
    /// A structure assertion that only constrains the type name.
    pub fn structure(type_name: impl Into<String>) -> Self {
        Type::Structure {
            type_name: type_name.into(),
            cases: BTreeMap::new(),
        }
    }

    /// A tuple of `size` unconstrained components.
    pub fn any_tuple(size: usize) -> Self {
        Type::Tuple(vec![Type::Any; size])
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => write!(f, "Any"),
            Type::Integer => write!(f, "Integer"),
            Type::String => write!(f, "String"),
            Type::Tuple(components) => {
                write!(f, "Tuple(")?;
                for (i, component) in components.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{component}")?;
                }
                write!(f, ")")
            }
            Type::List(element) => write!(f, "List({element})"),
            Type::Structure { type_name, cases } => {
                write!(f, "{type_name}")?;
                if !cases.is_empty() {
                    write!(f, "(")?;
                    for (i, constructor) in cases.keys().enumerate() {
                        if i > 0 {
                            write!(f, " | ")?;
                        }
                        write!(f, "{constructor}")?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

/// A single bytecode instruction.
///
/// The VM interprets these using a `loop { match op { ... } }` dispatch
/// over a flat array. Name arguments are carried as owned strings, so the
/// stream is self-contained once compilation ends.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Op {
    // --- Stack pushes ---
    /// Push an integer constant.
    PushInteger(BigInt),

    /// Push a string constant.
    PushString(String),

    /// Push the value of a variable. Reading an unbound variable is a
    /// runtime error.
    PushVariable(String),

    // --- Variable binding ---
    /// Pop the top of the stack and assign it. Creates the variable on
    /// first use; on re-assignment the VM checks the new value against the
    /// old value's type.
    SetVariable(String),

    /// Remove a variable binding. No-op if the variable is absent.
    UnsetVariable(String),

    // --- Control flow ---
    /// Name the next position in the stream. Each name is defined once.
    Label(String),

    /// Unconditional jump.
    Jump(String),

    /// Pop a Bool; branch if it is `False`.
    JumpIfFalse(String),

    /// Branch if the top of the stack is a structure built by the named
    /// constructor. Does **not** pop.
    JumpIfStructure(String, String),

    /// Branch if the top of the stack is a tuple of the given size.
    /// Does **not** pop.
    JumpIfTuple(usize, String),

    /// Call the routine at a label with `nargs` arguments on the stack.
    Call(String, usize),

    /// Return to the caller, or end execution at the top level.
    Return,

    // --- Value construction ---
    /// Pop N values, build a tuple, push it. The first value pushed
    /// becomes component 0.
    MakeTuple(usize),

    /// Pop N values, build a list, push it. The first value pushed
    /// becomes element 0.
    MakeList(usize),

    /// Pop one value per listed field (last field on top), build a
    /// structure of the named constructor, push it.
    MakeStructure {
        type_name: String,
        constructor: String,
        fields: Vec<String>,
    },

    /// Like `MakeStructure`, but starts from an existing structure popped
    /// from beneath the field values and replaces only the listed fields.
    UpdateStructure {
        type_name: String,
        constructor: String,
        fields: Vec<String>,
    },

    // --- Value inspection ---
    /// Push component `i` of the tuple at the top of the stack. Does not
    /// pop; an out-of-range index is a runtime error.
    ReadTupleComponent(usize),

    /// Push the named field of the structure at the top of the stack.
    /// Does not pop.
    ReadStructureField(String),

    // --- Stack utilities ---
    /// Duplicate the top of the stack.
    Dup,

    /// Discard the top of the stack.
    Pop,

    /// Pop two integers, push their sum.
    Add,

    // --- Dispatch ---
    /// Call a runtime primitive with `nargs` arguments on the stack.
    /// Primitive functions push their result; primitive procedures do not.
    PrimitiveCall(String, usize),

    // --- Global state ---
    /// Snapshot the global board state.
    SaveState,

    /// Restore the last saved board state.
    RestoreState,

    // --- Type assertion ---
    /// Fail at runtime unless the top of the stack matches the type tree.
    /// Does not pop.
    TypeCheck(Type),
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::PushInteger(n) => write!(f, "PushInteger {n}"),
            Op::PushString(s) => write!(f, "PushString {s:?}"),
            Op::PushVariable(name) => write!(f, "PushVariable {name}"),
            Op::SetVariable(name) => write!(f, "SetVariable {name}"),
            Op::UnsetVariable(name) => write!(f, "UnsetVariable {name}"),
            Op::Label(name) => write!(f, "Label {name}"),
            Op::Jump(label) => write!(f, "Jump {label}"),
            Op::JumpIfFalse(label) => write!(f, "JumpIfFalse {label}"),
            Op::JumpIfStructure(constructor, label) => {
                write!(f, "JumpIfStructure {constructor} {label}")
            }
            Op::JumpIfTuple(size, label) => write!(f, "JumpIfTuple {size} {label}"),
            Op::Call(label, nargs) => write!(f, "Call {label} {nargs}"),
            Op::Return => write!(f, "Return"),
            Op::MakeTuple(size) => write!(f, "MakeTuple {size}"),
            Op::MakeList(size) => write!(f, "MakeList {size}"),
            Op::MakeStructure {
                type_name,
                constructor,
                fields,
            } => write!(
                f,
                "MakeStructure {type_name}:{constructor} [{}]",
                fields.join(", ")
            ),
            Op::UpdateStructure {
                type_name,
                constructor,
                fields,
            } => write!(
                f,
                "UpdateStructure {type_name}:{constructor} [{}]",
                fields.join(", ")
            ),
            Op::ReadTupleComponent(index) => write!(f, "ReadTupleComponent {index}"),
            Op::ReadStructureField(field) => write!(f, "ReadStructureField {field}"),
            Op::Dup => write!(f, "Dup"),
            Op::Pop => write!(f, "Pop"),
            Op::Add => write!(f, "Add"),
            Op::PrimitiveCall(name, nargs) => write!(f, "PrimitiveCall {name} {nargs}"),
            Op::SaveState => write!(f, "SaveState"),
            Op::RestoreState => write!(f, "RestoreState"),
            Op::TypeCheck(assertion) => write!(f, "TypeCheck {assertion}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Compiled code representation
// ---------------------------------------------------------------------------

/// A compiled instruction sequence.
///
/// `instructions` and `spans` are always the same length: each instruction
/// keeps the source range of the construct that produced it, so the VM can
/// report runtime failures with accurate locations long after the AST is
/// gone. The sequence only ever grows during compilation; ownership
/// transfers to the caller when the compiler finishes.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Code {
    pub instructions: Vec<Op>,
    pub spans: Vec<Span>,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one instruction with its source span.
    pub fn push(&mut self, op: Op, span: Span) {
        self.instructions.push(op);
        self.spans.push(span);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Names defined by `Label` instructions, in emission order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.instructions.iter().filter_map(|op| match op {
            Op::Label(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for Code {
    /// Renders a disassembly listing: labels flush left as `name:`, every
    /// other instruction indented beneath them.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.instructions {
            match op {
                Op::Label(name) => writeln!(f, "{name}:")?,
                _ => writeln!(f, "  {op}")?,
            }
        }
        Ok(())
    }
}
