//! Operands of instructions

use std::fmt::{Display, Formatter};

use crate::names::write_name;
use crate::types::IrType;

/// A typed operand.
///
/// Displays as the bare operand, ie `%v3`, `7` or `@.intF`. Use [Value::typed] to include the
/// type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// An integer constant
    Const { ty: IrType, value: i64 },
    /// A register local to a function, either an instruction result or a parameter
    Local { ty: IrType, name: String },
    /// The address of a global, always a pointer
    Global { name: String },
}

impl Value {
    /// An i32 constant
    pub fn i32(value: i32) -> Self {
        Self::Const {
            ty: IrType::I32,
            value: value.into(),
        }
    }

    pub fn global(name: impl Into<String>) -> Self {
        Self::Global { name: name.into() }
    }

    pub fn ty(&self) -> IrType {
        match self {
            Value::Const { ty, .. } | Value::Local { ty, .. } => ty.clone(),
            Value::Global { .. } => IrType::Ptr,
        }
    }

    /// Displays as `<type> <operand>`
    pub fn typed(&self) -> Typed<'_> {
        Typed(self)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Const { value, .. } => write!(f, "{value}"),
            Value::Local { name, .. } => {
                write!(f, "%")?;
                write_name(f, name)
            }
            Value::Global { name } => {
                write!(f, "@")?;
                write_name(f, name)
            }
        }
    }
}

/// See [Value::typed]
#[derive(Debug)]
pub struct Typed<'a>(&'a Value);

impl Display for Typed<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0.ty(), self.0)
    }
}
