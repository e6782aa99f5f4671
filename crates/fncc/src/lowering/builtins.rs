//! Functions every program can call without defining them

use fnc_ir::{Function, FunctionBuilder, Global, IrType, Module, Signature, Value};
use tracing::trace;

use crate::lowering::error::LoweringResult;
use crate::lowering::scope::Callee;

/// Global holding the `printf` format used by `printValue`
pub const INT_FORMAT: &str = ".intF";
pub const PRINTF: &str = "printf";
/// Prints its single integer argument followed by a newline
pub const PRINT_VALUE: &str = "printValue";

/// Adds the builtins to `module`, returning the callable ones by their source name.
pub fn register(module: &mut Module) -> LoweringResult<Vec<(&'static str, Callee)>> {
    let format = module.add_global(Global::c_string(INT_FORMAT, "%d\n"));
    let printf = Signature::new(IrType::I32, [IrType::Ptr]).variadic();
    module.add_function(Function::declaration(PRINTF, printf.clone()));

    let mut print_value = FunctionBuilder::new(PRINT_VALUE, IrType::I32, [("value", IrType::I32)]);
    let entry = print_value.entry();
    let args = [format]
        .into_iter()
        .chain(print_value.params().iter().cloned())
        .collect();
    print_value.call(entry, PRINTF, &printf, args)?;
    print_value.ret(entry, Some(Value::i32(0)))?;
    let print_value = print_value.finish()?;
    let callee = Callee::new(PRINT_VALUE, print_value.signature().clone());
    module.add_function(print_value);
    trace!("registered builtins");

    Ok(vec![(PRINT_VALUE, callee)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_value_calls_printf() {
        let mut module = Module::new("test.fnc");
        let builtins = register(&mut module).unwrap();
        assert_eq!(builtins.len(), 1);
        assert_eq!(builtins[0].1.arity(), 1);
        let text = module.function(PRINT_VALUE).unwrap().to_string();
        assert_eq!(
            text,
            "define i32 @printValue(i32 %value.0) {\n\
             entry:\n  \
             %v0 = call i32 (ptr, ...) @printf(ptr @.intF, i32 %value.0)\n  \
             ret i32 0\n}"
        );
        assert!(module.function(PRINTF).unwrap().is_declaration());
    }
}
