//! Modules, functions and basic blocks

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use itertools::Itertools;
use tracing::trace;

use crate::instruction::{Instruction, Terminator};
use crate::names::{write_escaped, write_name};
use crate::types::{IrType, Signature};
use crate::value::Value;

/// Identifies a block within its function
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display(fmt = "#{}", _0)]
pub struct BlockId(pub(crate) usize);

/// A labelled run of instructions with a single terminator
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    pub(crate) label: String,
    pub(crate) instructions: Vec<Instruction>,
    pub(crate) terminator: Option<Terminator>,
}

impl BasicBlock {
    pub(crate) fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            instructions: vec![],
            terminator: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The terminator, always present in a finished function
    pub fn terminator(&self) -> Option<&Terminator> {
        self.terminator.as_ref()
    }
}

/// A function, either only declared or defined with a body of blocks
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub(crate) name: String,
    pub(crate) signature: Signature,
    pub(crate) params: Vec<Value>,
    pub(crate) blocks: Vec<BasicBlock>,
}

impl Function {
    /// Declares an externally defined function
    pub fn declaration(name: impl Into<String>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            signature,
            params: vec![],
            blocks: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The blocks of this function, the entry block comes first
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.0)
    }

    /// Finds a block by its label
    pub fn block_id(&self, label: &str) -> Option<BlockId> {
        self.blocks
            .iter()
            .position(|block| block.label == label)
            .map(BlockId)
    }

    fn fmt_label_ref(&self, f: &mut Formatter<'_>, id: BlockId) -> std::fmt::Result {
        write!(f, "label %")?;
        match self.block(id) {
            Some(block) => write_name(f, &block.label),
            None => write!(f, "{id}"),
        }
    }

    fn fmt_terminator(&self, f: &mut Formatter<'_>, terminator: &Terminator) -> std::fmt::Result {
        match terminator {
            Terminator::Br(target) => {
                write!(f, "br ")?;
                self.fmt_label_ref(f, *target)
            }
            Terminator::CondBr {
                cond,
                then_block,
                else_block,
            } => {
                write!(f, "br {}, ", cond.typed())?;
                self.fmt_label_ref(f, *then_block)?;
                write!(f, ", ")?;
                self.fmt_label_ref(f, *else_block)
            }
            Terminator::Ret(Some(value)) => write!(f, "ret {}", value.typed()),
            Terminator::Ret(None) => write!(f, "ret void"),
        }
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_declaration() {
            write!(f, "declare {} @", self.signature.ret)?;
            write_name(f, &self.name)?;
            return self.signature.fmt_params(f);
        }
        write!(f, "define {} @", self.signature.ret)?;
        write_name(f, &self.name)?;
        writeln!(
            f,
            "({}) {{",
            self.params.iter().map(|param| param.typed()).join(", ")
        )?;
        for (index, block) in self.blocks.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write_name(f, &block.label)?;
            writeln!(f, ":")?;
            for instruction in &block.instructions {
                writeln!(f, "  {instruction}")?;
            }
            if let Some(terminator) = &block.terminator {
                write!(f, "  ")?;
                self.fmt_terminator(f, terminator)?;
                writeln!(f)?;
            }
        }
        write!(f, "}}")
    }
}

/// A private constant global
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Global {
    name: String,
    ty: IrType,
    bytes: Vec<u8>,
}

impl Global {
    /// A nul terminated string constant
    pub fn c_string(name: impl Into<String>, text: &str) -> Self {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        Self {
            name: name.into(),
            ty: IrType::array(bytes.len(), IrType::I8),
            bytes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// A pointer to this global
    pub fn value(&self) -> Value {
        Value::global(&self.name)
    }
}

impl Display for Global {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@")?;
        write_name(f, &self.name)?;
        write!(f, " = private unnamed_addr constant {} c\"", self.ty)?;
        write_escaped(f, &self.bytes)?;
        write!(f, "\"")
    }
}

/// A whole compilation unit
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    source_filename: String,
    globals: Vec<Global>,
    functions: IndexMap<String, Function>,
    reserved: HashSet<String>,
}

impl Module {
    pub fn new(source_filename: impl Into<String>) -> Self {
        Self {
            source_filename: source_filename.into(),
            globals: vec![],
            functions: IndexMap::new(),
            reserved: HashSet::new(),
        }
    }

    pub fn source_filename(&self) -> &str {
        &self.source_filename
    }

    /// Claims a unique function symbol starting from `base`.
    ///
    /// If `base` is taken, `.1`, `.2`, ... are appended until a free symbol is found.
    pub fn reserve_symbol(&mut self, base: &str) -> String {
        let mut symbol = base.to_string();
        let mut suffix = 0;
        while self.reserved.contains(&symbol) || self.functions.contains_key(&symbol) {
            suffix += 1;
            symbol = format!("{base}.{suffix}");
        }
        trace!("reserved symbol {symbol:?}");
        self.reserved.insert(symbol.clone());
        symbol
    }

    pub fn add_global(&mut self, global: Global) -> Value {
        let value = global.value();
        self.globals.push(global);
        value
    }

    /// Adds a function, replacing any function with the same name
    pub fn add_function(&mut self, function: Function) {
        self.reserved.insert(function.name.clone());
        self.functions.insert(function.name.clone(), function);
    }

    pub fn globals(&self) -> &[Global] {
        &self.globals
    }

    pub fn global(&self, name: &str) -> Option<&Global> {
        self.globals.iter().find(|global| global.name == name)
    }

    /// All functions in the order they were added
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }
}

/// The module as llvm assembly
impl Display for Module {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "source_filename = \"")?;
        write_escaped(f, self.source_filename.as_bytes())?;
        writeln!(f, "\"")?;
        if !self.globals.is_empty() {
            writeln!(f)?;
            for global in &self.globals {
                writeln!(f, "{global}")?;
            }
        }
        let (declarations, definitions): (Vec<_>, Vec<_>) = self
            .functions
            .values()
            .partition(|function| function.is_declaration());
        if !declarations.is_empty() {
            writeln!(f)?;
            for declaration in declarations {
                writeln!(f, "{declaration}")?;
            }
        }
        for definition in definitions {
            writeln!(f)?;
            writeln!(f, "{definition}")?;
        }
        Ok(())
    }
}
