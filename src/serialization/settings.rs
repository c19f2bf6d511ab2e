/// Bounds applied while decoding (and re-checked while encoding)
///
/// Streams handed to this crate are frequently hostile, so anything that recursion or looping
/// depends on is capped.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Maximum number of descriptors visited when following super class pointers
    ///
    /// Real class hierarchies are shallow, but a descriptor whose super pointer refers back to
    /// itself (or to a subclass) would otherwise be followed forever.
    pub max_class_depth: usize,

    /// Maximum nesting of records inside records (objects in fields of objects in arrays...)
    ///
    /// Decoding recurses once per level, so this is what keeps a deep stream from exhausting the
    /// native stack.
    pub max_nesting_depth: usize,
}

impl Settings {
    pub const DEFAULT_MAX_CLASS_DEPTH: usize = 256;
    pub const DEFAULT_MAX_NESTING_DEPTH: usize = 256;

    pub fn new() -> Settings {
        Settings {
            max_class_depth: Self::DEFAULT_MAX_CLASS_DEPTH,
            max_nesting_depth: Self::DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl Default for Settings {
    fn default() -> Settings {
        Settings::new()
    }
}
