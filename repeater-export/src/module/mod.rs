pub mod codeplug;
pub mod directory;
