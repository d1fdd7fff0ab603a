pub mod instruction;
pub mod name;
pub mod parser;
