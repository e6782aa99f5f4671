//! A small interpreter for lowered modules, so programs can be run without a native toolchain

#![allow(dead_code)]

use std::collections::HashMap;

use eyre::{bail, eyre};
use fnc_ir::{BinaryOp, Function, Instruction, IntPredicate, Module, Terminator, Value};

/// Upper bound on executed instructions before a run is considered stuck
const STEP_LIMIT: usize = 100_000;

/// What running `main` produced
#[derive(Debug, PartialEq, Eq)]
pub struct Run {
    pub exit: i32,
    /// Every value passed to `printf`
    pub printed: Vec<i32>,
}

impl Run {
    /// Stdout as the native program would print it
    pub fn stdout(&self) -> String {
        self.printed.iter().map(|value| format!("{value}\n")).collect()
    }
}

/// Runs `main` of a module
pub fn run(module: &Module) -> eyre::Result<Run> {
    let mut evaluator = Evaluator {
        module,
        printed: vec![],
        steps: 0,
    };
    let exit = evaluator.call("main", vec![])?;
    Ok(Run {
        exit,
        printed: evaluator.printed,
    })
}

/// Lowers and runs some source
pub fn run_source(source: &str) -> eyre::Result<Run> {
    let module = fncc::compile_source(source)?;
    run(&module)
}

struct Evaluator<'m> {
    module: &'m Module,
    printed: Vec<i32>,
    steps: usize,
}

/// Registers and stack slots of one call
#[derive(Default)]
struct Frame {
    registers: HashMap<String, i32>,
    slots: Vec<i32>,
}

impl Frame {
    fn get(&self, value: &Value) -> eyre::Result<i32> {
        match value {
            Value::Const { value, .. } => {
                i32::try_from(*value).map_err(|_| eyre!("{value} does not fit in i32"))
            }
            Value::Local { name, .. } => self
                .registers
                .get(name)
                .copied()
                .ok_or_else(|| eyre!("%{name} used before it was defined")),
            Value::Global { .. } => Ok(-1),
        }
    }

    fn set(&mut self, result: &Value, value: i32) -> eyre::Result<()> {
        match result {
            Value::Local { name, .. } => {
                self.registers.insert(name.clone(), value);
                Ok(())
            }
            other => Err(eyre!("can not assign to {other}")),
        }
    }

    fn slot(&mut self, ptr: &Value) -> eyre::Result<&mut i32> {
        let index = self.get(ptr)?;
        usize::try_from(index)
            .ok()
            .and_then(|index| self.slots.get_mut(index))
            .ok_or_else(|| eyre!("{ptr} is not a stack slot"))
    }
}

impl Evaluator<'_> {
    fn call(&mut self, name: &str, args: Vec<i32>) -> eyre::Result<i32> {
        let module = self.module;
        let function = module
            .function(name)
            .ok_or_else(|| eyre!("no function {name}"))?;
        if function.is_declaration() {
            return self.call_external(function, args);
        }
        let mut frame = Frame::default();
        for (param, arg) in function.params().iter().zip(args) {
            frame.set(param, arg)?;
        }
        let mut block = &function.blocks()[0];
        loop {
            for instruction in block.instructions() {
                self.step()?;
                self.execute(&mut frame, instruction)?;
            }
            self.step()?;
            let next = match block.terminator() {
                Some(Terminator::Br(target)) => *target,
                Some(Terminator::CondBr {
                    cond,
                    then_block,
                    else_block,
                }) => {
                    if frame.get(cond)? != 0 {
                        *then_block
                    } else {
                        *else_block
                    }
                }
                Some(Terminator::Ret(value)) => {
                    return match value {
                        Some(value) => frame.get(value),
                        None => Ok(0),
                    }
                }
                None => bail!("{} in {name} has no terminator", block.label()),
            };
            block = function
                .block(next)
                .ok_or_else(|| eyre!("{name} has no block {next}"))?;
        }
    }

    fn call_external(&mut self, function: &Function, args: Vec<i32>) -> eyre::Result<i32> {
        match (function.name(), args.as_slice()) {
            ("printf", [_format, value]) => {
                self.printed.push(*value);
                Ok(format!("{value}\n").len() as i32)
            }
            (other, _) => Err(eyre!("unsupported external function {other}")),
        }
    }

    fn step(&mut self) -> eyre::Result<()> {
        self.steps += 1;
        if self.steps > STEP_LIMIT {
            bail!("step limit exceeded");
        }
        Ok(())
    }

    fn execute(&mut self, frame: &mut Frame, instruction: &Instruction) -> eyre::Result<()> {
        match instruction {
            Instruction::Alloca { result, .. } => {
                frame.slots.push(0);
                let index = frame.slots.len() as i32 - 1;
                frame.set(result, index)
            }
            Instruction::Load { result, ptr, .. } => {
                let value = *frame.slot(ptr)?;
                frame.set(result, value)
            }
            Instruction::Store { value, ptr } => {
                let value = frame.get(value)?;
                *frame.slot(ptr)? = value;
                Ok(())
            }
            Instruction::Binary {
                result,
                op,
                lhs,
                rhs,
            } => {
                let (lhs, rhs) = (frame.get(lhs)?, frame.get(rhs)?);
                let value = match op {
                    BinaryOp::Add => lhs.wrapping_add(rhs),
                    BinaryOp::Sub => lhs.wrapping_sub(rhs),
                    BinaryOp::Mul => lhs.wrapping_mul(rhs),
                    BinaryOp::SDiv => lhs
                        .checked_div(rhs)
                        .ok_or_else(|| eyre!("{lhs} / {rhs} is undefined"))?,
                };
                frame.set(result, value)
            }
            Instruction::ICmp {
                result,
                predicate,
                lhs,
                rhs,
            } => {
                let (lhs, rhs) = (frame.get(lhs)?, frame.get(rhs)?);
                let holds = match predicate {
                    IntPredicate::Eq => lhs == rhs,
                    IntPredicate::Ne => lhs != rhs,
                    IntPredicate::Slt => lhs < rhs,
                    IntPredicate::Sle => lhs <= rhs,
                };
                frame.set(result, holds as i32)
            }
            Instruction::ZExt { result, value } => {
                let value = frame.get(value)?;
                frame.set(result, value)
            }
            Instruction::Call {
                result,
                callee,
                args,
                ..
            } => {
                let args = args
                    .iter()
                    .map(|arg| frame.get(arg))
                    .collect::<eyre::Result<Vec<_>>>()?;
                let value = self.call(callee, args)?;
                match result {
                    Some(result) => frame.set(result, value),
                    None => Ok(()),
                }
            }
        }
    }
}
