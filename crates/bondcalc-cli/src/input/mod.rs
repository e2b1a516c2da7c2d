pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load a typed input from `--input <file>` or piped stdin, in that order.
/// Returns `None` when neither source supplied anything.
pub fn read_input<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => file::read_json(path).map(Some),
        None => stdin::read_piped(),
    }
}
