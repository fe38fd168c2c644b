pub mod kraskov;

pub use kraskov::{CondMiKraskov, KsgVariant};
