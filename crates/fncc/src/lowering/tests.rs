use fnc_ir::{Instruction, Terminator};
use fnc_parsing::parse_source;
use test_log::test;

use super::*;

fn lower_source(source: &str) -> LoweringResult<Module> {
    let program = parse_source(source).expect("could not parse");
    lower(&program)
}

fn function_text(module: &Module, name: &str) -> String {
    module
        .function(name)
        .unwrap_or_else(|| panic!("no function {name}"))
        .to_string()
}

#[test]
fn test_every_block_is_terminated() {
    let module = lower_source(
        "fnc f(n) { if (n < 1) { return 0; } else { for { break; var m = n; } } } \
         var i = 0; for { if (i == 3) { break; } i = i + f(i); } printValue(i);",
    )
    .unwrap();
    for function in module.functions().filter(|f| !f.is_declaration()) {
        for block in function.blocks() {
            assert!(
                block.terminator().is_some(),
                "{} in {} is open",
                block.label(),
                function.name()
            );
        }
    }
}

#[test]
fn test_simple_if() {
    let module = lower_source("var x = 1; if (x < 2) { x = 3; }").unwrap();
    assert_eq!(
        function_text(&module, MAIN),
        "define i32 @main() {
entry:
  %v0 = alloca i32
  store i32 1, ptr %v0
  %v1 = load i32, ptr %v0
  %v2 = icmp slt i32 %v1, 2
  br i1 %v2, label %block-0-then, label %block-0-leave

block-0-then:
  store i32 3, ptr %v0
  br label %block-0-leave

block-0-leave:
  ret i32 0
}"
    );
}

#[test]
fn test_if_else_falls_through_to_leave() {
    let module = lower_source("var x = 0; if (x) x = 1; else x = 2; printValue(x);").unwrap();
    let main = module.function(MAIN).unwrap();
    let leave = main.block_id("block-0-leave").unwrap();
    for label in ["block-0-then", "block-0-else"] {
        let block = main.block(main.block_id(label).unwrap()).unwrap();
        assert_eq!(block.terminator(), Some(&Terminator::Br(leave)));
    }
    let entry = &main.blocks()[0];
    assert!(matches!(
        entry.instructions().last(),
        Some(Instruction::ICmp {
            predicate: IntPredicate::Ne,
            ..
        })
    ));
}

#[test]
fn test_nested_if_funnels_into_outer_leave() {
    let module =
        lower_source("var a = 1; var b = 2; if (a) { if (b) { a = 3; } } printValue(a);").unwrap();
    let main = module.function(MAIN).unwrap();
    let outer_leave = main.block_id("block-0-leave").unwrap();
    let inner_leave = main.block_id("block-1-leave").unwrap();
    let inner = main.block(inner_leave).unwrap();
    assert_eq!(inner.terminator(), Some(&Terminator::Br(outer_leave)));
}

#[test]
fn test_empty_for_is_self_loop() {
    let module = lower_source("for { }").unwrap();
    let main = module.function(MAIN).unwrap();
    let looped = main.block_id("block-0-for").unwrap();
    assert_eq!(
        main.block(looped).unwrap().terminator(),
        Some(&Terminator::Br(looped))
    );
    assert!(main.block_id("block-0-leave-for").is_some());
}

#[test]
fn test_break_leaves_loop() {
    let module = lower_source("for { break; }").unwrap();
    let main = module.function(MAIN).unwrap();
    let looped = main.block_id("block-0-for").unwrap();
    let leave = main.block_id("block-0-leave-for").unwrap();
    assert_eq!(
        main.block(looped).unwrap().terminator(),
        Some(&Terminator::Br(leave))
    );
}

#[test]
fn test_code_after_break_goes_to_dead_block() {
    let module = lower_source("for { break; printValue(1); }").unwrap();
    let main = module.function(MAIN).unwrap();
    let dead = main.block(main.block_id("block-1-dead").unwrap()).unwrap();
    assert!(matches!(
        dead.instructions(),
        [Instruction::Call { callee, .. }] if callee == "printValue"
    ));
    let looped = main.block_id("block-0-for").unwrap();
    assert_eq!(dead.terminator(), Some(&Terminator::Br(looped)));
}

#[test]
fn test_function_symbols() {
    let module = lower_source(
        "fnc add(a, b) { return a + b; } var x = add(2, 3); printValue(x);",
    )
    .unwrap();
    assert_eq!(
        function_text(&module, "main.add"),
        "define i32 @main.add(i32 %a.0, i32 %b.1) {
entry:
  %v0 = add i32 %a.0, %b.1
  ret i32 %v0
}"
    );
    assert!(function_text(&module, MAIN).contains("%v1 = call i32 @main.add(i32 2, i32 3)"));
}

#[test]
fn test_nested_functions_are_added_before_their_parent() {
    let module =
        lower_source("fnc outer() { fnc inner() { return 1; } return inner(); }").unwrap();
    let names = module.functions().map(|f| f.name()).collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["printf", "printValue", "main.outer.inner", "main.outer", "main"]
    );
}

#[test]
fn test_duplicate_function_names_get_unique_symbols() {
    let module = lower_source(
        "if (1) { fnc f() return 1; printValue(f()); } else { fnc f() return 2; printValue(f()); }",
    )
    .unwrap();
    assert!(module.function("main.f").is_some());
    assert!(module.function("main.f.1").is_some());
    let main = function_text(&module, MAIN);
    assert!(main.contains("call i32 @main.f()"));
    assert!(main.contains("call i32 @main.f.1()"));
}

#[test]
fn test_function_defined_in_branch_is_visible_after_it() {
    assert!(lower_source("if (1) { fnc f() return 1; } printValue(f());").is_ok());
}

#[test]
fn test_recursion() {
    let module = lower_source(
        "fnc fact(n) { if (n < 2) { return 1; } return n * fact(n - 1); } printValue(fact(5));",
    )
    .unwrap();
    assert!(function_text(&module, "main.fact").contains("call i32 @main.fact(i32 %v"));
}

#[test]
fn test_shadowing_in_if_body() {
    let module = lower_source("var x = 1; if (1) { var x = 2; printValue(x); } printValue(x);")
        .unwrap();
    let main = module.function(MAIN).unwrap();
    let allocas = main.blocks()[0]
        .instructions()
        .iter()
        .filter(|i| matches!(i, Instruction::Alloca { .. }))
        .count();
    assert_eq!(allocas, 2);
    let then = main.block(main.block_id("block-0-then").unwrap()).unwrap();
    let leave = main.block(main.block_id("block-0-leave").unwrap()).unwrap();
    let loaded_from = |block: &fnc_ir::BasicBlock| {
        block
            .instructions()
            .iter()
            .find_map(|i| match i {
                Instruction::Load { ptr, .. } => Some(ptr.clone()),
                _ => None,
            })
            .unwrap()
    };
    assert_eq!(loaded_from(then).to_string(), "%v2");
    assert_eq!(loaded_from(leave).to_string(), "%v0");
}

#[test]
fn test_comparison_as_value_is_widened() {
    let module = lower_source("printValue(1 < 2 < 3);").unwrap();
    let main = function_text(&module, MAIN);
    assert!(main.contains("%v1 = zext i1 %v0 to i32"));
    assert!(main.contains("%v2 = icmp slt i32 %v1, 3"));
}

#[test]
fn test_parameters_are_used_directly() {
    let module = lower_source("fnc id(x) { return x; }").unwrap();
    assert!(function_text(&module, "main.id").contains("ret i32 %x.0"));
}

#[test]
fn test_function_without_return_returns_zero() {
    let module = lower_source("fnc f() { printValue(1); }").unwrap();
    assert!(function_text(&module, "main.f").ends_with("ret i32 0\n}"));
}

#[test]
fn test_functions_do_not_see_outer_variables() {
    let err = lower_source("var x = 1; fnc f() { return x; }").unwrap_err();
    assert!(matches!(err, LoweringError::UndefinedVariable { ref name, .. } if name == "x"));
}

#[test]
fn test_break_outside_loop() {
    let err = lower_source("var x = 1;\nbreak;").unwrap_err();
    assert_eq!(
        err,
        LoweringError::BreakOutsideLoop {
            span: Span::new(11, 6, 2, 1)
        }
    );
}

#[test]
fn test_break_does_not_cross_functions() {
    let err = lower_source("for { fnc f() { break; } }").unwrap_err();
    assert!(matches!(err, LoweringError::BreakOutsideLoop { .. }));
}

#[test]
fn test_undefined_variable() {
    let err = lower_source("printValue(y);").unwrap_err();
    assert!(matches!(err, LoweringError::UndefinedVariable { ref name, .. } if name == "y"));
    let err = lower_source("y = 1;").unwrap_err();
    assert!(matches!(err, LoweringError::UndefinedVariable { ref name, .. } if name == "y"));
}

#[test]
fn test_undefined_function() {
    let err = lower_source("var x = nope(1);").unwrap_err();
    assert!(matches!(err, LoweringError::UndefinedFunction { ref name, .. } if name == "nope"));
}

#[test]
fn test_arity_mismatch() {
    let err = lower_source("printValue(1, 2);").unwrap_err();
    assert!(matches!(
        err,
        LoweringError::ArityMismatch {
            expected: 1,
            found: 2,
            ..
        }
    ));
}

#[test]
fn test_assign_to_parameter() {
    let err = lower_source("fnc f(a) { a = 2; return a; }").unwrap_err();
    assert!(matches!(err, LoweringError::AssignToParameter { ref name, .. } if name == "a"));
}

#[test]
fn test_module_text() {
    let module = lower_source("printValue(7);").unwrap();
    let text = module.to_string();
    assert!(text.starts_with("source_filename = \"main.fnc\"\n"));
    assert!(text.contains("@.intF = private unnamed_addr constant [4 x i8] c\"%d\\0A\\00\"\n"));
    assert!(text.contains("declare i32 @printf(ptr, ...)\n"));
    assert!(text.contains("define i32 @main() {\nentry:\n  %v0 = call i32 @printValue(i32 7)\n  ret i32 0\n}\n"));
}
