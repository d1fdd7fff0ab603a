pub mod source_text;
pub mod structured_program;
