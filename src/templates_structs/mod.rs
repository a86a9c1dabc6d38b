// Template context structures for Askama templates.

mod hotel;

pub use hotel::*;
