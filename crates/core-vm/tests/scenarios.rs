//! The concrete end-to-end scenarios from spec §8, plus the determinism
//! and alias properties that fall out of every `step`/`run` call being a
//! pure function of its input state.

use core_heap::{environment, heap};
use core_ir::{ConstValue, HeapAddress, HeapValue, IrInstruction, VmState};
use core_vm::{run, RunOptions, RunOutcome};

fn const_int(n: i64) -> IrInstruction {
    IrInstruction::LoadConst {
        value: ConstValue::Int(n),
    }
}

fn read_final_top(state: &VmState) -> HeapValue {
    let top = *state.operand_stack.last().expect("operand stack is empty");
    heap::read(state, top).unwrap().clone()
}

#[test]
fn scenario_1_arithmetic() {
    // [LOAD_CONST 3, LOAD_CONST 4, ADD, LOAD_CONST 6, MUL, HALT] -> 42
    let program = vec![
        const_int(3),
        const_int(4),
        IrInstruction::Add,
        const_int(6),
        IrInstruction::Mul,
        IrInstruction::Halt,
    ];
    let result = run(program.clone(), RunOptions::default()).unwrap();
    assert_eq!(result.outcome, RunOutcome::Halted);
    assert_eq!(read_final_top(&result.state), HeapValue::Int(42));
    // One snapshot before each of the 6 instructions, plus the final
    // post-halt snapshot §4.4/§4.10 both describe the run loop appending.
    assert_eq!(result.trace.len(), program.len() + 1);
}

/// Builds `factorial(n)`: a recursive function bound at global scope, with
/// a base case of `n <= 1`. `CALL` itself binds the sole argument to
/// `arg0` in the callee's fresh environment (§4.3 "CALL semantics") — the
/// body reads it via `LOAD "arg0"`, no explicit parameter `STORE` needed.
/// Bytecode layout:
///
/// ```text
/// 0: MAKE_FUNCTION 4      ; push factorial fn, capturing the global env
/// 1: STORE "factorial"
/// 2: JUMP 18              ; skip over the function body at top level
/// 3: LOAD_CONST 4
/// 4: LOAD "arg0"
/// 5: LOAD_CONST 1
/// 6: LTE
/// 7: JUMP_IF_FALSE 10
/// 8: LOAD_CONST 1
/// 9: RET
/// 10: LOAD "arg0"
/// 11: LOAD "arg0"
/// 12: LOAD_CONST 1
/// 13: SUB
/// 14: LOAD "factorial"
/// 15: CALL 1
/// 16: MUL
/// 17: RET
/// 18: ...                 (position 18 is where top level resumes)
/// ```
fn factorial_program() -> Vec<IrInstruction> {
    vec![
        /* 0 */ IrInstruction::MakeFunction { entry: 4 },
        /* 1 */ IrInstruction::Store { name: "factorial".into() },
        /* 2 */ const_int(4),
        /* 3 */ IrInstruction::Jump { target: 100 }, // placeholder, patched below
        /* 4 */ IrInstruction::Load { name: "arg0".into() },
        /* 5 */ const_int(1),
        /* 6 */ IrInstruction::Lte,
        /* 7 */ IrInstruction::JumpIfFalse { target: 10 },
        /* 8 */ const_int(1),
        /* 9 */ IrInstruction::Ret,
        /* 10 */ IrInstruction::Load { name: "arg0".into() },
        /* 11 */ IrInstruction::Load { name: "arg0".into() },
        /* 12 */ const_int(1),
        /* 13 */ IrInstruction::Sub,
        /* 14 */ IrInstruction::Load { name: "factorial".into() },
        /* 15 */ IrInstruction::Call { arg_count: 1 },
        /* 16 */ IrInstruction::Mul,
        /* 17 */ IrInstruction::Ret,
        /* 18 */ IrInstruction::Load { name: "factorial".into() },
        /* 19 */ IrInstruction::Call { arg_count: 1 },
        /* 20 */ IrInstruction::Halt,
    ]
}

#[test]
fn scenario_2_recursive_factorial() {
    let mut program = factorial_program();
    // top level: push 4, jump over the body to the call site.
    let call_site = 18usize;
    program[3] = IrInstruction::Jump { target: call_site };

    let result = run(program, RunOptions::default()).unwrap();
    assert_eq!(result.outcome, RunOutcome::Halted);
    assert_eq!(read_final_top(&result.state), HeapValue::Int(24));

    let max_call_depth = result
        .trace
        .entries()
        .iter()
        .map(|snapshot| snapshot.state.call_stack.len())
        .max()
        .unwrap();
    assert_eq!(max_call_depth, 4);
}

#[test]
fn scenario_3_closure_captures_current_binding_not_a_copy() {
    // a = 10; f = () => a; a = 20; f() -> 20
    let program = vec![
        /* 0 */ const_int(10),
        /* 1 */ IrInstruction::Store { name: "a".into() },
        /* 2 */ IrInstruction::MakeFunction { entry: 6 },
        /* 3 */ IrInstruction::Store { name: "f".into() },
        /* 4 */ const_int(20),
        /* 5 */ IrInstruction::Store { name: "a".into() },
        // top level continues at 9 after the call; function body below.
        /* 6 */ IrInstruction::Load { name: "a".into() },
        /* 7 */ IrInstruction::Ret,
        /* 8 */ IrInstruction::Jump { target: 9 }, // unreachable filler
        /* 9 */ IrInstruction::Load { name: "f".into() },
        /* 10 */ IrInstruction::Call { arg_count: 0 },
        /* 11 */ IrInstruction::Halt,
    ];
    let result = run(program, RunOptions::default()).unwrap();
    assert_eq!(read_final_top(&result.state), HeapValue::Int(20));
}

#[test]
fn scenario_4_alias_list_mutation_observed_through_both_bindings() {
    // a = []; b = a; a.append(99) -> both a and b see [99]
    let program = vec![
        /* 0 */ IrInstruction::NewList,
        /* 1 */ IrInstruction::Store { name: "a".into() },
        /* 2 */ IrInstruction::Load { name: "a".into() },
        /* 3 */ IrInstruction::Store { name: "b".into() },
        /* 4 */ IrInstruction::Load { name: "a".into() },
        /* 5 */ const_int(99),
        /* 6 */ IrInstruction::ListAppend,
        /* 7 */ IrInstruction::Pop,
        /* 8 */ IrInstruction::Halt,
    ];
    let result = run(program, RunOptions::default()).unwrap();
    let state = &result.state;
    let a_addr = environment::lookup(state, state.global_environment, "a").unwrap();
    let b_addr = environment::lookup(state, state.global_environment, "b").unwrap();
    assert_eq!(a_addr, b_addr);
    match heap::read(state, a_addr).unwrap() {
        HeapValue::List { elements } => {
            assert_eq!(elements.len(), 1);
            let element = heap::read(state, elements[0]).unwrap();
            assert_eq!(*element, HeapValue::Int(99));
        }
        other => panic!("expected a list, got {other:?}"),
    }
}

#[test]
fn scenario_5_gc_reclaims_orphan_without_moving_allocation_counter() {
    // NEW_OBJECT; STORE tmp; LOAD_CONST 42; STORE tmp; HALT, gc=true
    let program = vec![
        IrInstruction::NewObject,
        IrInstruction::Store { name: "tmp".into() },
        const_int(42),
        IrInstruction::Store { name: "tmp".into() },
        IrInstruction::Halt,
    ];
    let gc_result = run(program.clone(), RunOptions { max_steps: 10_000, gc: true }).unwrap();
    let no_gc_result = run(program, RunOptions { max_steps: 10_000, gc: false }).unwrap();

    assert!(!gc_result.state.heap.contains_key(&HeapAddress::new(0)));
    assert_eq!(
        gc_result.state.allocation_counter,
        no_gc_result.state.allocation_counter
    );
}

#[test]
fn determinism_identical_programs_produce_byte_identical_traces() {
    let program = factorial_program();
    let mut a = program.clone();
    a[3] = IrInstruction::Jump { target: 18 };
    let mut b = program;
    b[3] = IrInstruction::Jump { target: 18 };

    let run_a = run(a, RunOptions::default()).unwrap();
    let run_b = run(b, RunOptions::default()).unwrap();

    assert_eq!(run_a.trace.entries().len(), run_b.trace.entries().len());
    for (left, right) in run_a.trace.entries().iter().zip(run_b.trace.entries()) {
        assert_eq!(left.state, right.state);
    }
}
