//! Binary format layers: plist container, keyed archive, bookmark data.

pub mod archive;
pub mod bookmark;
pub mod plist;

pub use archive::Object;
pub use bookmark::ResolvedBookmark;
pub use plist::Value;
