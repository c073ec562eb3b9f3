//! Chart of accounts: class types and the account group hierarchy.

pub mod class_type;
pub mod group;

pub use class_type::{AccountClassType, ClassTypeView};
pub use group::{GroupDraft, GroupNode, GroupPlacement, resolve_placement};
