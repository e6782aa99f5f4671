//! Incrementally builds a function

use tracing::trace;

use crate::error::{IrError, IrResult};
use crate::instruction::{BinaryOp, Instruction, IntPredicate, Terminator};
use crate::module::{BasicBlock, BlockId, Function};
use crate::types::{IrType, Signature};
use crate::value::Value;

/// Builds a single function block by block.
///
/// Every operation names the block it appends to. Once a block has a terminator it is sealed,
/// appending anything else to it is an [IrError::BlockTerminated]. [FunctionBuilder::finish]
/// only succeeds if every block has been terminated.
#[derive(Debug)]
pub struct FunctionBuilder {
    name: String,
    signature: Signature,
    params: Vec<Value>,
    blocks: Vec<BasicBlock>,
    next_value: usize,
}

impl FunctionBuilder {
    /// Label of the first block of every function
    pub const ENTRY: &'static str = "entry";

    /// Creates a builder for a function returning `ret` with the given named parameters.
    ///
    /// The entry block is created immediately.
    pub fn new<'a>(
        name: impl Into<String>,
        ret: IrType,
        params: impl IntoIterator<Item = (&'a str, IrType)>,
    ) -> Self {
        let params = params
            .into_iter()
            .enumerate()
            .map(|(index, (name, ty))| Value::Local {
                ty,
                name: format!("{name}.{index}"),
            })
            .collect::<Vec<_>>();
        let signature = Signature::new(ret, params.iter().map(Value::ty));
        Self {
            name: name.into(),
            signature,
            params,
            blocks: vec![BasicBlock::new(Self::ENTRY)],
            next_value: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn entry(&self) -> BlockId {
        BlockId(0)
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Creates a new, empty block
    pub fn create_block(&mut self, label: impl Into<String>) -> BlockId {
        let id = BlockId(self.blocks.len());
        let block = BasicBlock::new(label);
        trace!("created block {:?} in {}", block.label, self.name);
        self.blocks.push(block);
        id
    }

    pub fn is_terminated(&self, block: BlockId) -> IrResult<bool> {
        Ok(self.block(block)?.terminator.is_some())
    }

    fn block(&self, block: BlockId) -> IrResult<&BasicBlock> {
        self.blocks.get(block.0).ok_or_else(|| IrError::UnknownBlock {
            function: self.name.clone(),
            block,
        })
    }

    /// Gets a block that can still be appended to
    fn open_block(&mut self, block: BlockId) -> IrResult<&mut BasicBlock> {
        self.block(block)?;
        let name = &self.name;
        let found = &mut self.blocks[block.0];
        if found.terminator.is_some() {
            return Err(IrError::BlockTerminated {
                function: name.clone(),
                label: found.label.clone(),
            });
        }
        Ok(found)
    }

    fn next_local(&mut self, ty: IrType) -> Value {
        let name = format!("v{}", self.next_value);
        self.next_value += 1;
        Value::Local { ty, name }
    }

    fn push(&mut self, block: BlockId, instruction: Instruction) -> IrResult {
        self.open_block(block)?.instructions.push(instruction);
        Ok(())
    }

    /// Allocates a stack slot in the entry block, ahead of its terminator.
    ///
    /// Allowed even after the entry block is sealed.
    pub fn alloca(&mut self, ty: IrType) -> Value {
        let result = self.next_local(IrType::Ptr);
        self.blocks[0].instructions.push(Instruction::Alloca {
            result: result.clone(),
            ty,
        });
        result
    }

    pub fn store(&mut self, block: BlockId, value: Value, ptr: Value) -> IrResult {
        self.push(block, Instruction::Store { value, ptr })
    }

    pub fn load(&mut self, block: BlockId, ty: IrType, ptr: Value) -> IrResult<Value> {
        self.open_block(block)?;
        let result = self.next_local(ty.clone());
        self.push(
            block,
            Instruction::Load {
                result: result.clone(),
                ty,
                ptr,
            },
        )?;
        Ok(result)
    }

    /// Integer arithmetic, the result has the type of `lhs`
    pub fn binary(
        &mut self,
        block: BlockId,
        op: BinaryOp,
        lhs: Value,
        rhs: Value,
    ) -> IrResult<Value> {
        self.open_block(block)?;
        let result = self.next_local(lhs.ty());
        self.push(
            block,
            Instruction::Binary {
                result: result.clone(),
                op,
                lhs,
                rhs,
            },
        )?;
        Ok(result)
    }

    /// Compares two integers, producing an i1
    pub fn icmp(
        &mut self,
        block: BlockId,
        predicate: IntPredicate,
        lhs: Value,
        rhs: Value,
    ) -> IrResult<Value> {
        self.open_block(block)?;
        let result = self.next_local(IrType::I1);
        self.push(
            block,
            Instruction::ICmp {
                result: result.clone(),
                predicate,
                lhs,
                rhs,
            },
        )?;
        Ok(result)
    }

    pub fn zext(&mut self, block: BlockId, value: Value, to: IrType) -> IrResult<Value> {
        self.open_block(block)?;
        let result = self.next_local(to);
        self.push(
            block,
            Instruction::ZExt {
                result: result.clone(),
                value,
            },
        )?;
        Ok(result)
    }

    /// Calls a function, returning its result unless it returns void
    pub fn call(
        &mut self,
        block: BlockId,
        callee: &str,
        signature: &Signature,
        args: Vec<Value>,
    ) -> IrResult<Option<Value>> {
        self.open_block(block)?;
        let result = match signature.ret {
            IrType::Void => None,
            ref ret => Some(self.next_local(ret.clone())),
        };
        self.push(
            block,
            Instruction::Call {
                result: result.clone(),
                signature: signature.clone(),
                callee: callee.to_string(),
                args,
            },
        )?;
        Ok(result)
    }

    fn terminate(&mut self, block: BlockId, terminator: Terminator) -> IrResult {
        for successor in terminator.successors() {
            self.block(successor)?;
        }
        let name = self.name.clone();
        let open = self.open_block(block)?;
        trace!("terminating {} in {} with {:?}", open.label, name, terminator);
        open.terminator = Some(terminator);
        Ok(())
    }

    pub fn br(&mut self, block: BlockId, target: BlockId) -> IrResult {
        self.terminate(block, Terminator::Br(target))
    }

    pub fn cond_br(
        &mut self,
        block: BlockId,
        cond: Value,
        then_block: BlockId,
        else_block: BlockId,
    ) -> IrResult {
        self.terminate(
            block,
            Terminator::CondBr {
                cond,
                then_block,
                else_block,
            },
        )
    }

    pub fn ret(&mut self, block: BlockId, value: Option<Value>) -> IrResult {
        self.terminate(block, Terminator::Ret(value))
    }

    /// Completes the function, failing if any block is still open
    pub fn finish(self) -> IrResult<Function> {
        if let Some(open) = self.blocks.iter().find(|block| block.terminator.is_none()) {
            return Err(IrError::UnterminatedBlock {
                function: self.name,
                label: open.label.clone(),
            });
        }
        trace!("finished {} with {} blocks", self.name, self.blocks.len());
        Ok(Function {
            name: self.name,
            signature: self.signature,
            params: self.params,
            blocks: self.blocks,
        })
    }
}
