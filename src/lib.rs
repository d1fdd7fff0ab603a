//! Interpreter, bytecode and source-to-source compiler for Assembunny+, a
//! register language whose registers are declared by name at run time and whose
//! only control flow is a relative `jnz`.

pub mod bytecode;
pub mod codegen;
pub mod error;
pub mod machine;
pub mod repl;
pub mod syntax;
