//! JSON endpoints and the loaders the HTML views share with them.

pub mod catalog;
pub mod collections;
pub mod embed;
pub mod hero;
pub mod search;
