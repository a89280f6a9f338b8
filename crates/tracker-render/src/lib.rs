pub mod adapter;
pub mod colors;
pub mod meters;
pub mod traits;

pub use adapter::RenderAdapter;
pub use colors::Color;
pub use meters::decay_peak;
pub use traits::TextSurface;
