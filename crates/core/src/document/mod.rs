pub mod model;
pub mod parser;
pub mod serializer;

pub use model::{
    BulletItem, BulletList, DocNode, DocumentTree, FormatFragment, Section, SourceSpan,
};
pub use parser::{parse, SkillLexicon};
pub use serializer::serialize;
