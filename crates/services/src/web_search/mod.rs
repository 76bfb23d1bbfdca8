pub mod ports;
pub mod tavily;

pub use ports::*;
pub use tavily::TavilyWebSearchProvider;
