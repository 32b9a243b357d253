/// Merge `--ext` values into a normalized extension list.
///
/// Each value may hold several comma separated extensions. Empty items are
/// dropped, a missing leading dot is added, and duplicates are removed
/// keeping the first occurrence.
///
/// # Examples
///
/// ```
/// use esm_cycles_cli::cli::normalize_extensions;
///
/// let values = vec!["ts,.tsx".to_string(), ".ts".to_string()];
/// assert_eq!(normalize_extensions(&values), [".ts", ".tsx"]);
/// ```
pub fn normalize_extensions(values: &[String]) -> Vec<String> {
    let mut extensions: Vec<String> = Vec::new();
    for extension in values.iter().flat_map(|value| value.split(',')) {
        let extension = extension.trim();
        if extension.is_empty() {
            continue;
        }

        let extension = if extension.starts_with('.') {
            extension.to_string()
        } else {
            format!(".{extension}")
        };
        if !extensions.contains(&extension) {
            extensions.push(extension);
        }
    }
    extensions
}
