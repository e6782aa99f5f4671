//! Lowers a [Program] into an ir [Module].
//!
//! Lowering is a single depth first walk over the tree. The [Lowerer] owns the module being
//! built, the scope arena and the block label counter. The function currently being built is
//! passed along explicitly, as is a [Cursor] telling each statement which block to append to,
//! which scope to resolve names in and where a `break` jumps to. Lowering a statement returns
//! the cursor the next statement continues from.

use fnc_ast::expr::{BinaryOp, Expr, ExprKind};
use fnc_ast::statements::{AssignStmt, DeclareStmt, FunctionDef, IfStmt, Stmt, StmtKind};
use fnc_ast::Program;
use fnc_ir::{self as ir, BlockId, FunctionBuilder, IntPredicate, IrType, Module, Signature, Value};
use fnc_tokens::spanned::{Span, Spanned};
use tracing::{debug, trace};

pub use error::{LoweringError, LoweringResult};
use scope::{Binding, Callee, ScopeId, Scopes};

pub mod builtins;
mod error;
pub mod scope;

/// Symbol of the function top level statements are lowered into
pub const MAIN: &str = "main";

/// Source file name recorded in modules lowered with [lower]
pub const DEFAULT_SOURCE_FILENAME: &str = "main.fnc";

/// Lowers a whole program into a module with a `main` function.
pub fn lower(program: &Program) -> LoweringResult<Module> {
    Lowerer::new(DEFAULT_SOURCE_FILENAME).lower_program(program)
}

/// Where lowering continues from
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Cursor {
    block: BlockId,
    scope: ScopeId,
    /// The block a `break` leaves to, if in a loop
    break_target: Option<BlockId>,
}

/// A lowered expression, comparisons stay i1 until their value is needed as an integer
#[derive(Debug)]
enum Operand {
    Int(Value),
    Bool(Value),
}

/// Lowers programs into modules.
#[derive(Debug)]
pub struct Lowerer {
    module: Module,
    scopes: Scopes,
    next_block: usize,
}

impl Lowerer {
    /// Creates a lowerer for a module with the given source file name
    pub fn new(source_filename: impl Into<String>) -> Self {
        Self {
            module: Module::new(source_filename),
            scopes: Scopes::new(),
            next_block: 0,
        }
    }

    /// Lowers the program, consuming this lowerer.
    pub fn lower_program(mut self, program: &Program) -> LoweringResult<Module> {
        for (name, callee) in builtins::register(&mut self.module)? {
            self.scopes.declare_global_function(name, callee);
        }

        let symbol = self.module.reserve_symbol(MAIN);
        let scope = self.scopes.main_scope(&symbol);
        let mut main = FunctionBuilder::new(&symbol, IrType::I32, []);
        let mut cursor = Cursor {
            block: main.entry(),
            scope,
            break_target: None,
        };
        for stmt in &program.statements {
            cursor = self.lower_stmt(&mut main, cursor, stmt)?;
        }
        self.finish_function(main, cursor)?;
        debug!(
            "lowered program into {} functions using {} labelled blocks",
            self.module.functions().count(),
            self.next_block
        );
        Ok(self.module)
    }

    /// Produces the next `block-N` base label
    fn block_name(&mut self) -> String {
        let name = format!("block-{}", self.next_block);
        self.next_block += 1;
        name
    }

    /// Seals an unterminated final block with `ret i32 0` and adds the function to the module
    fn finish_function(&mut self, mut f: FunctionBuilder, end: Cursor) -> LoweringResult {
        if !f.is_terminated(end.block)? {
            f.ret(end.block, Some(Value::i32(0)))?;
        }
        let function = f.finish()?;
        trace!("lowered function {}", function.name());
        self.module.add_function(function);
        Ok(())
    }

    /// Moves the cursor to a fresh unreachable block if its block was already terminated
    fn ensure_open(&mut self, f: &mut FunctionBuilder, cx: Cursor) -> LoweringResult<Cursor> {
        if !f.is_terminated(cx.block)? {
            return Ok(cx);
        }
        let name = self.block_name();
        let dead = f.create_block(format!("{name}-dead"));
        trace!("statement follows a terminator, continuing in {name}-dead");
        Ok(Cursor { block: dead, ..cx })
    }

    fn lower_stmt(
        &mut self,
        f: &mut FunctionBuilder,
        cx: Cursor,
        stmt: &Stmt,
    ) -> LoweringResult<Cursor> {
        match &stmt.kind {
            StmtKind::Function(def) => {
                self.lower_function(cx, def)?;
                Ok(cx)
            }
            StmtKind::Block(stmts) => {
                let mut cx = cx;
                for stmt in stmts {
                    cx = self.lower_stmt(f, cx, stmt)?;
                }
                Ok(cx)
            }
            StmtKind::Return(value) => {
                let cx = self.ensure_open(f, cx)?;
                let value = self.lower_value(f, cx, value)?;
                f.ret(cx.block, Some(value))?;
                Ok(cx)
            }
            StmtKind::If(if_stmt) => {
                let cx = self.ensure_open(f, cx)?;
                self.lower_if(f, cx, if_stmt)
            }
            StmtKind::For(body) => {
                let cx = self.ensure_open(f, cx)?;
                self.lower_for(f, cx, body)
            }
            StmtKind::Break => {
                let cx = self.ensure_open(f, cx)?;
                let target = cx
                    .break_target
                    .ok_or(LoweringError::BreakOutsideLoop { span: stmt.span() })?;
                f.br(cx.block, target)?;
                Ok(cx)
            }
            StmtKind::Declare(DeclareStmt { name, init }) => {
                let cx = self.ensure_open(f, cx)?;
                let slot = f.alloca(IrType::I32);
                let value = self.lower_value(f, cx, init)?;
                f.store(cx.block, value, slot.clone())?;
                self.scopes.declare_var(cx.scope, name, Binding::Slot(slot));
                Ok(cx)
            }
            StmtKind::Assign(AssignStmt {
                target,
                target_span,
                value,
            }) => {
                let cx = self.ensure_open(f, cx)?;
                let slot = match self.scopes.lookup_var(cx.scope, target) {
                    Some(Binding::Slot(slot)) => slot.clone(),
                    Some(Binding::Direct(_)) => {
                        return Err(LoweringError::AssignToParameter {
                            name: target.clone(),
                            span: *target_span,
                        })
                    }
                    None => {
                        return Err(LoweringError::UndefinedVariable {
                            name: target.clone(),
                            span: *target_span,
                        })
                    }
                };
                let value = self.lower_value(f, cx, value)?;
                f.store(cx.block, value, slot)?;
                Ok(cx)
            }
            StmtKind::Expr(expr) => {
                let cx = self.ensure_open(f, cx)?;
                self.lower_operand(f, cx, expr)?;
                Ok(cx)
            }
        }
    }

    fn lower_if(
        &mut self,
        f: &mut FunctionBuilder,
        cx: Cursor,
        if_stmt: &IfStmt,
    ) -> LoweringResult<Cursor> {
        let cond = self.lower_condition(f, cx, &if_stmt.cond)?;
        let name = self.block_name();
        let then_block = f.create_block(format!("{name}-then"));
        let leave = f.create_block(format!("{name}-leave"));
        let else_block = if_stmt
            .else_branch
            .as_ref()
            .map(|branch| (f.create_block(format!("{name}-else")), branch));
        let otherwise = else_block.map_or(leave, |(block, _)| block);
        f.cond_br(cx.block, cond, then_block, otherwise)?;

        self.lower_branch(f, cx, then_block, &if_stmt.then_branch, leave)?;
        if let Some((else_block, else_branch)) = else_block {
            self.lower_branch(f, cx, else_block, else_branch, leave)?;
        }
        Ok(Cursor { block: leave, ..cx })
    }

    /// Lowers one arm of a conditional in its own scope, falling through to `leave`
    fn lower_branch(
        &mut self,
        f: &mut FunctionBuilder,
        cx: Cursor,
        block: BlockId,
        stmt: &Stmt,
        leave: BlockId,
    ) -> LoweringResult {
        let branch = Cursor {
            block,
            scope: self.scopes.child(cx.scope),
            ..cx
        };
        let end = self.lower_stmt(f, branch, stmt)?;
        if !f.is_terminated(end.block)? {
            f.br(end.block, leave)?;
        }
        Ok(())
    }

    fn lower_for(
        &mut self,
        f: &mut FunctionBuilder,
        cx: Cursor,
        body: &Stmt,
    ) -> LoweringResult<Cursor> {
        let name = self.block_name();
        let looped = f.create_block(format!("{name}-for"));
        let leave = f.create_block(format!("{name}-leave-for"));
        f.br(cx.block, looped)?;

        let inner = Cursor {
            block: looped,
            scope: self.scopes.child(cx.scope),
            break_target: Some(leave),
        };
        let end = self.lower_stmt(f, inner, body)?;
        if !f.is_terminated(end.block)? {
            f.br(end.block, looped)?;
        }
        Ok(Cursor { block: leave, ..cx })
    }

    /// Lowers a nested function definition into its own module function.
    ///
    /// The function is bound before its body is lowered so it can call itself.
    fn lower_function(&mut self, cx: Cursor, def: &FunctionDef) -> LoweringResult {
        let base = format!("{}.{}", self.scopes.function_symbol(cx.scope), def.name);
        let symbol = self.module.reserve_symbol(&base);
        trace!("lowering function {:?} as {symbol}", def.name);
        let signature = Signature::i32_function(def.params.len());
        self.scopes
            .declare_function(cx.scope, &def.name, Callee::new(&symbol, signature));

        let scope = self.scopes.function_scope(cx.scope, &symbol);
        let mut f = FunctionBuilder::new(
            &symbol,
            IrType::I32,
            def.params.iter().map(|param| (param.as_str(), IrType::I32)),
        );
        for (param, value) in def.params.iter().zip(f.params()) {
            self.scopes
                .declare_var(scope, param, Binding::Direct(value.clone()));
        }
        let entry = Cursor {
            block: f.entry(),
            scope,
            break_target: None,
        };
        let end = self.lower_stmt(&mut f, entry, &def.body)?;
        self.finish_function(f, end)
    }

    /// Lowers an expression used as an integer
    fn lower_value(
        &mut self,
        f: &mut FunctionBuilder,
        cx: Cursor,
        expr: &Expr,
    ) -> LoweringResult<Value> {
        match self.lower_operand(f, cx, expr)? {
            Operand::Int(value) => Ok(value),
            Operand::Bool(value) => Ok(f.zext(cx.block, value, IrType::I32)?),
        }
    }

    /// Lowers an expression used as a branch condition
    fn lower_condition(
        &mut self,
        f: &mut FunctionBuilder,
        cx: Cursor,
        expr: &Expr,
    ) -> LoweringResult<Value> {
        match self.lower_operand(f, cx, expr)? {
            Operand::Bool(value) => Ok(value),
            Operand::Int(value) => Ok(f.icmp(cx.block, IntPredicate::Ne, value, Value::i32(0))?),
        }
    }

    fn lower_operand(
        &mut self,
        f: &mut FunctionBuilder,
        cx: Cursor,
        expr: &Expr,
    ) -> LoweringResult<Operand> {
        match &expr.kind {
            ExprKind::Integer(value) => Ok(Operand::Int(Value::i32(*value))),
            ExprKind::Var(name) => match self.scopes.lookup_var(cx.scope, name) {
                Some(Binding::Slot(slot)) => {
                    let slot = slot.clone();
                    Ok(Operand::Int(f.load(cx.block, IrType::I32, slot)?))
                }
                Some(Binding::Direct(value)) => Ok(Operand::Int(value.clone())),
                None => Err(LoweringError::UndefinedVariable {
                    name: name.clone(),
                    span: expr.span(),
                }),
            },
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.lower_value(f, cx, lhs)?;
                let rhs = self.lower_value(f, cx, rhs)?;
                let block = cx.block;
                let operand = match op {
                    BinaryOp::Add => Operand::Int(f.binary(block, ir::BinaryOp::Add, lhs, rhs)?),
                    BinaryOp::Sub => Operand::Int(f.binary(block, ir::BinaryOp::Sub, lhs, rhs)?),
                    BinaryOp::Mul => Operand::Int(f.binary(block, ir::BinaryOp::Mul, lhs, rhs)?),
                    BinaryOp::Div => Operand::Int(f.binary(block, ir::BinaryOp::SDiv, lhs, rhs)?),
                    BinaryOp::Eq => Operand::Bool(f.icmp(block, IntPredicate::Eq, lhs, rhs)?),
                    BinaryOp::Ne => Operand::Bool(f.icmp(block, IntPredicate::Ne, lhs, rhs)?),
                    BinaryOp::Lt => Operand::Bool(f.icmp(block, IntPredicate::Slt, lhs, rhs)?),
                    BinaryOp::Le => Operand::Bool(f.icmp(block, IntPredicate::Sle, lhs, rhs)?),
                };
                Ok(operand)
            }
            ExprKind::Call { name, args } => self.lower_call(f, cx, name, args, expr.span()),
        }
    }

    fn lower_call(
        &mut self,
        f: &mut FunctionBuilder,
        cx: Cursor,
        name: &str,
        args: &[Expr],
        span: Span,
    ) -> LoweringResult<Operand> {
        let callee = self
            .scopes
            .lookup_function(cx.scope, name)
            .cloned()
            .ok_or_else(|| LoweringError::UndefinedFunction {
                name: name.to_string(),
                span,
            })?;
        if callee.arity() != args.len() {
            return Err(LoweringError::ArityMismatch {
                name: name.to_string(),
                expected: callee.arity(),
                found: args.len(),
                span,
            });
        }
        let args = args
            .iter()
            .map(|arg| self.lower_value(f, cx, arg))
            .collect::<LoweringResult<Vec<_>>>()?;
        let result = f.call(cx.block, &callee.symbol, &callee.signature, args)?;
        Ok(Operand::Int(result.unwrap_or_else(|| Value::i32(0))))
    }
}

#[cfg(test)]
mod tests;
