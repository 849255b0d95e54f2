//! Text utilities for message definition preprocessing
//!
//! Message definitions are plain text with no quoting or escaping, so the
//! only primitive the parser needs is a delimiter split that drops empty
//! tokens. It is used at three levels: definition into blocks (`=`), block
//! into lines (`\n`), line into tokens (` `).

/// Split `text` on `delimiter`, dropping empty tokens.
///
/// Consecutive, leading and trailing delimiters never produce empty tokens,
/// so a separator line like `"===="` contributes nothing when splitting on `=`.
pub fn split(text: &str, delimiter: char) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut token = String::new();

    for ch in text.chars() {
        if ch == delimiter {
            if !token.is_empty() {
                tokens.push(std::mem::take(&mut token));
            }
        } else {
            token.push(ch);
        }
    }

    if !token.is_empty() {
        tokens.push(token);
    }

    tokens
}

/// Final `/`-separated segment of a namespaced type name.
///
/// `geometry_msgs/Point` becomes `Point`; a name without a namespace is
/// returned unchanged.
pub fn short_type_name(qualified: &str) -> &str {
    qualified.rsplit('/').next().unwrap_or(qualified)
}
