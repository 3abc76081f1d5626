/// Turn a camel-case identifier into a display name.
///
/// The first character is upper-cased and a space is inserted before every
/// ASCII upper-case letter that follows: `"fontSize"` becomes `"Font Size"`.
pub fn display_name(value: &str) -> String {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out: String = first.to_uppercase().collect();
    for c in chars {
        if c.is_ascii_uppercase() {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Display name for a dotted attribute path, one [`display_name`] per
/// segment.
pub fn path_label(path: &str) -> String {
    path.split('.')
        .map(display_name)
        .collect::<Vec<_>>()
        .join(" > ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("fontSize"), "Font Size");
        assert_eq!(display_name("wordWrapColumn"), "Word Wrap Column");
        assert_eq!(display_name("vs-dark"), "Vs-dark");
        assert_eq!(display_name("on"), "On");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn test_path_label() {
        assert_eq!(path_label("minimap.enabled"), "Minimap > Enabled");
        assert_eq!(path_label("readOnly"), "Read Only");
    }
}
