// Engine modules: asset catalog and builtin content

pub mod assets;
pub mod content;
