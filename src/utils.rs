// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Utility functions for console output.

/// Plural form of an English noun for summary lines.
#[must_use]
pub fn pluralize(word: &str) -> String {
    match word {
        "person" => "people".to_string(),
        "foot" => "feet".to_string(),
        _ => {
            if word.ends_with('s') || word.ends_with("ch") || word.ends_with("sh") {
                format!("{word}es")
            } else if word.ends_with('y') && !word.ends_with("ey") && !word.ends_with("ay") {
                format!("{}ies", &word[..word.len() - 1])
            } else {
                format!("{word}s")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("keypoint"), "keypoints");
        assert_eq!(pluralize("body"), "bodies");
        assert_eq!(pluralize("patch"), "patches");
    }
}
