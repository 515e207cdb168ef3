//! Section hierarchy tracking.
//!
//! Maintains a stack of active headers keyed by font-size ordering so every
//! block can carry a breadcrumb section path without an explicit outline in
//! the source layout. The tracker is an explicit accumulator folded over one
//! document's block stream; independent documents get independent trackers.

/// Direct header assigned to blocks that appear before any header.
pub const DOCUMENT_START: &str = "Document Start";

/// Comparison slack for "same level" font sizes.
const SIZE_EPSILON: f32 = 0.01;

#[derive(Debug, Clone)]
struct ActiveHeader {
    text: String,
    font_size: f32,
}

/// Stack of active headers for one document.
///
/// On a new header: a larger font than the current top starts a new
/// top-level section (stack resets), a smaller font opens a sub-section
/// (push), an equal font replaces the top (sibling heading).
#[derive(Debug, Clone, Default)]
pub struct HierarchyTracker {
    stack: Vec<ActiveHeader>,
}

impl HierarchyTracker {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Record a header block and return the section path including the
    /// header itself as the last element.
    pub fn observe_header(&mut self, text: &str, font_size: f32) -> Vec<String> {
        let entry = ActiveHeader {
            text: text.to_string(),
            font_size,
        };
        match self.stack.last() {
            None => self.stack.push(entry),
            Some(top) => {
                if font_size > top.font_size + SIZE_EPSILON {
                    self.stack.clear();
                    self.stack.push(entry);
                } else if font_size < top.font_size - SIZE_EPSILON {
                    self.stack.push(entry);
                } else {
                    *self.stack.last_mut().unwrap() = entry;
                }
            }
        }
        self.current_path()
    }

    /// Section path non-header blocks inherit verbatim.
    pub fn current_path(&self) -> Vec<String> {
        self.stack.iter().map(|h| h.text.clone()).collect()
    }

    /// Innermost active header, or [`DOCUMENT_START`] before any header.
    pub fn direct_header(&self) -> String {
        self.stack
            .last()
            .map(|h| h.text.clone())
            .unwrap_or_else(|| DOCUMENT_START.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_header_starts_stack() {
        let mut t = HierarchyTracker::new();
        let path = t.observe_header("Definitions", 16.0);
        assert_eq!(path, vec!["Definitions"]);
        assert_eq!(t.direct_header(), "Definitions");
    }

    #[test]
    fn test_smaller_header_nests() {
        let mut t = HierarchyTracker::new();
        t.observe_header("Definitions", 16.0);
        let path = t.observe_header("Pre-existing Conditions", 13.0);
        assert_eq!(path, vec!["Definitions", "Pre-existing Conditions"]);
    }

    #[test]
    fn test_equal_header_replaces_sibling() {
        let mut t = HierarchyTracker::new();
        t.observe_header("Definitions", 16.0);
        t.observe_header("Grace Period", 13.0);
        let path = t.observe_header("Waiting Period", 13.0);
        assert_eq!(path, vec!["Definitions", "Waiting Period"]);
    }

    #[test]
    fn test_larger_header_resets() {
        let mut t = HierarchyTracker::new();
        t.observe_header("Definitions", 14.0);
        t.observe_header("Terms", 12.0);
        let path = t.observe_header("Exclusions", 16.0);
        assert_eq!(path, vec!["Exclusions"]);
    }

    #[test]
    fn test_body_blocks_inherit_path() {
        let mut t = HierarchyTracker::new();
        t.observe_header("Benefits", 15.0);
        t.observe_header("Ambulance Cover", 12.0);
        assert_eq!(t.current_path(), vec!["Benefits", "Ambulance Cover"]);
        // Inheriting does not mutate the stack.
        assert_eq!(t.current_path(), vec!["Benefits", "Ambulance Cover"]);
    }

    #[test]
    fn test_empty_tracker_defaults() {
        let t = HierarchyTracker::new();
        assert!(t.current_path().is_empty());
        assert_eq!(t.direct_header(), DOCUMENT_START);
    }

    #[test]
    fn test_near_equal_sizes_treated_as_siblings() {
        let mut t = HierarchyTracker::new();
        t.observe_header("One", 12.0);
        let path = t.observe_header("Two", 12.004);
        assert_eq!(path, vec!["Two"]);
    }
}
