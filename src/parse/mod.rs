pub mod frontmatter;
pub mod task_parser;
pub mod task_serializer;

pub use frontmatter::{FrontmatterError, split_frontmatter};
pub use task_parser::{DecodeError, decode, decode_with_fallback};
pub use task_serializer::encode;
