//! Decode configuration with default-deny class whitelisting.

/// Configuration for keyed-archive decoding.
///
/// The archive format tags every object with a class name and historically
/// lets the reader instantiate whatever the tag names. This configuration
/// enumerates the classes a decode is willing to materialize; anything else
/// fails the whole decode.
///
/// # Examples
///
/// ```
/// use sflist_core::DecodeConfig;
///
/// // Permissive-but-whitelisted defaults
/// let config = DecodeConfig::default();
/// assert!(config.is_class_allowed("NSDictionary"));
/// assert!(!config.is_class_allowed("NSInvocation"));
///
/// // Tighter set for the bare recents schema
/// let minimal = DecodeConfig::minimal();
/// assert!(!minimal.is_class_allowed("NSString"));
/// ```
#[derive(Debug, Clone)]
pub struct DecodeConfig {
    /// Class names the archive layer may materialize.
    pub allowed_classes: Vec<String>,

    /// Maximum number of objects accepted in a single archive.
    pub max_objects: usize,

    /// Maximum nesting depth while resolving the object graph.
    pub max_depth: usize,
}

impl Default for DecodeConfig {
    /// Creates a `DecodeConfig` with the widest still-whitelisted class set.
    ///
    /// Default values:
    /// - `allowed_classes`: collection, data, string, and null classes plus
    ///   their mutable variants
    /// - `max_objects`: 65,536
    /// - `max_depth`: 64
    fn default() -> Self {
        Self {
            allowed_classes: [
                "NSDictionary",
                "NSMutableDictionary",
                "NSArray",
                "NSMutableArray",
                "NSData",
                "NSMutableData",
                "NSString",
                "NSMutableString",
                "NSNull",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
            max_objects: 65_536,
            max_depth: 64,
        }
    }
}

impl DecodeConfig {
    /// Creates a configuration limited to the shapes the recents schema
    /// actually requires: dictionaries, arrays, and data blobs.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            allowed_classes: ["NSDictionary", "NSArray", "NSData"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            ..Self::default()
        }
    }

    /// Returns `true` if the named class may be materialized.
    #[must_use]
    pub fn is_class_allowed(&self, name: &str) -> bool {
        self.allowed_classes.iter().any(|c| c == name)
    }
}
