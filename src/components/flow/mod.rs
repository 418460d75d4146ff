mod canvas;
mod component;
mod error;
mod fetch;
mod highlight;
mod layout;
mod pipeline;
mod render;
mod sanitize;
mod state;
mod types;

pub use component::FlowView;
