pub mod dto;
mod mapper;
pub mod render;

pub use render::{render, render_pretty, render_with_header};
