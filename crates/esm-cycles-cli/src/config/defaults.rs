use crate::config::OutputFormat;

pub fn default_extensions() -> Vec<String> {
    esm_cycles::DEFAULT_EXTENSIONS
        .iter()
        .map(|extension| extension.to_string())
        .collect()
}

pub fn default_format() -> OutputFormat {
    OutputFormat::Stylish
}
