//! Headless browser lifecycle management

mod pool;

pub use pool::{BrowserPool, BrowserPoolConfig, PageRenderer, RenderedPage};

#[cfg(test)]
pub use pool::mock::MockPageRenderer;
