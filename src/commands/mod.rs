pub mod form;
pub mod generate;
