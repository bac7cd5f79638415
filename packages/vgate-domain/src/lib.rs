pub mod collection;
pub mod credential;
pub mod filter;
pub mod rules;
pub mod semantic;
