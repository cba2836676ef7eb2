pub mod preview;

pub use preview::{PreviewRecord, PreviewType};
