//! Name sanitization shared by every writer of registry records.
//!
//! Registry file names and the `projectName` field both come from
//! user-controlled strings (package descriptors, directory names, OS user
//! names). Sanitizing keeps them safe as path components on every platform.

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_names_pass_through() {
        assert_eq!(sanitize_name("petstore-api_v2"), "petstore-api_v2");
    }

    #[test]
    fn test_scoped_package_name() {
        assert_eq!(sanitize_name("@acme/petstore"), "_acme_petstore");
    }

    #[test]
    fn test_spaces_dots_and_unicode() {
        assert_eq!(sanitize_name("my project.app"), "my_project_app");
        assert_eq!(sanitize_name("café"), "caf_");
    }

    #[test]
    fn test_empty_stays_empty() {
        assert_eq!(sanitize_name(""), "");
    }
}
