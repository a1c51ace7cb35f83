pub mod book;
mod paging;

pub use paging::Paging;
