//! Full Jack-to-assembly pipeline tests. Each scenario compiles Jack
//! source with `jackc`, links it against small hand-written VM stubs for
//! the OS routines it calls, translates with `hackvm`, assembles with
//! `hackasm`, and executes on the reference CPU.
//!
//! The driver function is always named `Sys.init` so `hackvm::translate`
//! emits the bootstrap (`SP=256; call Sys.init 0`) and the call protocol
//! sets up every register correctly — no hand-spliced register state is
//! needed anywhere in this file.

use std::path::PathBuf;

fn run(files: Vec<(&str, &str)>, max_steps: usize) -> n2t_core::Cpu {
    let vm_files: Vec<(PathBuf, String)> = files
        .into_iter()
        .map(|(name, text)| (PathBuf::from(name), text.to_string()))
        .collect();
    let asm = hackvm::translate(&vm_files, true).unwrap();
    let binary = hackasm::assemble(&asm, &PathBuf::from("out.asm")).unwrap();
    let mut cpu = n2t_core::Cpu::from_hack_text(&binary);
    cpu.run(max_steps);
    cpu
}

const MATH_MULTIPLY_STUB: &str = "\
function Math.multiply 2
push constant 0
pop local 0
push constant 0
pop local 1
label LOOP
push local 1
push argument 1
lt
not
if-goto END
push local 0
push argument 0
add
pop local 0
push local 1
push constant 1
add
pop local 1
goto LOOP
label END
push local 0
return
";

const MEMORY_ALLOC_STUB: &str = "\
function Memory.alloc 1
push constant 2048
return
";

#[test]
fn scenario_5_arithmetic_expression_evaluates_strictly_left_to_right() {
    let a_vm = jackc::compile_file(
        "class A { function int f() { return 2+3*4; } }",
        &PathBuf::from("A.jack"),
    )
    .unwrap();
    let sys_vm = "\
function Sys.init 0
call A.f 0
pop temp 0
label Halt
goto Halt
";

    let cpu = run(
        vec![("A.vm", &a_vm), ("Math.vm", MATH_MULTIPLY_STUB), ("Sys.vm", sys_vm)],
        20_000,
    );
    // No operator precedence: `2+3*4` is `(2+3)*4`, not `2+(3*4)`.
    assert_eq!(cpu.ram[5], 20);
}

#[test]
fn jack_shift_operators_lower_to_the_extended_alu_through_execution() {
    let a_vm = jackc::compile_file(
        "class A { function int f() { return ^#8; } }",
        &PathBuf::from("A.jack"),
    )
    .unwrap();
    let sys_vm = "\
function Sys.init 0
call A.f 0
pop temp 0
label Halt
goto Halt
";

    let cpu = run(vec![("A.vm", &a_vm), ("Sys.vm", sys_vm)], 20_000);
    // `#8` is `shl(8)=16`; `^16` is `shr(16)=8`.
    assert_eq!(cpu.ram[5], 8);
}

#[test]
fn scenario_6_constructor_and_method_round_trip_a_field() {
    let p_vm = jackc::compile_file(
        "class P { \
            field int x; \
            constructor P new(int v) { let x = v; return this; } \
            method int get() { return x; } \
         }",
        &PathBuf::from("P.jack"),
    )
    .unwrap();
    let sys_vm = "\
function Sys.init 0
push constant 9
call P.new 1
call P.get 1
pop temp 0
label Halt
goto Halt
";

    let cpu = run(
        vec![("P.vm", &p_vm), ("Memory.vm", MEMORY_ALLOC_STUB), ("Sys.vm", sys_vm)],
        20_000,
    );
    assert_eq!(cpu.ram[5], 9);
}

#[test]
fn array_write_survives_a_nested_array_read_on_the_right_hand_side() {
    let vm = jackc::compile_file(
        "class A { \
            function void f(Array a) { \
                let a[0] = a[1]; \
                return; \
            } \
         }",
        &PathBuf::from("A.jack"),
    )
    .unwrap();
    assert!(vm.contains("pop pointer 1"));
    assert!(vm.contains("pop temp 0"));
    // The RHS's own `pointer 1`/`that 0` read must be fully resolved
    // before the LHS address overwrites `pointer 1` for the store.
    let temp_pop = vm.find("pop temp 0").unwrap();
    let second_pointer_pop = vm.rfind("pop pointer 1").unwrap();
    assert!(temp_pop < second_pointer_pop);
}
