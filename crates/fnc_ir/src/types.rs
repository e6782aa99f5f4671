//! IR types

use std::fmt::{Display, Formatter};

use itertools::Itertools;

/// The types values can have
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IrType {
    Void,
    /// A truth value, produced by comparisons
    I1,
    I8,
    I32,
    /// An opaque pointer
    Ptr,
    Array(usize, Box<IrType>),
}

impl IrType {
    pub fn array(len: usize, elem: IrType) -> Self {
        Self::Array(len, Box::new(elem))
    }
}

impl Display for IrType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IrType::Void => write!(f, "void"),
            IrType::I1 => write!(f, "i1"),
            IrType::I8 => write!(f, "i8"),
            IrType::I32 => write!(f, "i32"),
            IrType::Ptr => write!(f, "ptr"),
            IrType::Array(len, elem) => write!(f, "[{len} x {elem}]"),
        }
    }
}

/// The signature of a function
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub ret: IrType,
    pub params: Vec<IrType>,
    pub variadic: bool,
}

impl Signature {
    /// Creates a fixed arity signature
    pub fn new(ret: IrType, params: impl IntoIterator<Item = IrType>) -> Self {
        Self {
            ret,
            params: params.into_iter().collect(),
            variadic: false,
        }
    }

    /// A signature with `arity` i32 parameters returning an i32
    pub fn i32_function(arity: usize) -> Self {
        Self::new(IrType::I32, std::iter::repeat(IrType::I32).take(arity))
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Writes the parameter list, ie `(ptr, ...)`
    pub(crate) fn fmt_params(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let params = self
            .params
            .iter()
            .map(ToString::to_string)
            .chain(self.variadic.then(|| "...".to_string()))
            .join(", ");
        write!(f, "({params})")
    }
}

/// Function type syntax, ie `i32 (ptr, ...)`
impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ", self.ret)?;
        self.fmt_params(f)
    }
}
