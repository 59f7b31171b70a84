pub mod build;
pub mod lora;
pub mod schema;
