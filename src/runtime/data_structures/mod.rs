/// The dictionary module provides the linked-list word registry the outer
/// interpreter searches and the colon compiler extends.  Entry headers live
/// inline in arena memory; this module knows their layout.
pub mod dictionary;

/// The byte arena shared by the terminal input buffer and the dictionary,
/// with bounds-checked cell and byte access.
pub mod memory;

/// Bounded cell stack used for both the parameter and return stacks.
pub mod stack;
