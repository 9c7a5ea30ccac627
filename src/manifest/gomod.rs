// src/manifest/gomod.rs
// =============================================================================
// This module extracts `require` declarations from go.mod text.
//
// go.mod declares dependencies in two forms:
//
//   require example.com/c v0.1.0          <- single line
//
//   require (                             <- block
//       example.com/a v1.0.0
//       example.com/b v2.3.1 // indirect
//   )
//
// The scan is line-oriented and lenient: anything it doesn't understand is
// skipped rather than reported. A `require` line that isn't exactly
// `require <name> <version>` is taken to be the opening of a block, so a
// short or odd declaration switches the scanner into block mode.
//
// Only two things are real failures: a line too long to be a go.mod line
// and a NUL byte (the file is binary, not a manifest).
// =============================================================================

use thiserror::Error;

/// Longest line the scanner accepts (64 KiB)
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// One declared dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub version: String,
}

impl Requirement {
    fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
        }
    }
}

/// Why a manifest could not be scanned
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("line {line} is {len} bytes long (limit 65536)")]
    LineTooLong { line: usize, len: usize },

    #[error("line {line} contains a NUL byte")]
    BinaryContent { line: usize },
}

// Extracts every (name, version) pair declared with `require`
//
// Parameters:
//   content: the go.mod text
//
// Returns: the requirements in the order they appear
//
// Example:
//   "require example.com/c v0.1.0" -> [Requirement { "example.com/c", "v0.1.0" }]
pub fn parse_requirements(content: &str) -> Result<Vec<Requirement>, ScanError> {
    let mut requirements = Vec::new();

    // True while we're between `require (` and `)`
    let mut in_block = false;

    for (index, raw) in content.lines().enumerate() {
        let line_number = index + 1;

        if raw.len() > MAX_LINE_LEN {
            return Err(ScanError::LineTooLong {
                line: line_number,
                len: raw.len(),
            });
        }
        if raw.contains('\0') {
            return Err(ScanError::BinaryContent { line: line_number });
        }

        let tokens: Vec<&str> = strip_comment(raw).split_whitespace().collect();

        match tokens.first() {
            // Blank or comment-only line
            None => continue,

            Some(first) if first.starts_with(')') => {
                in_block = false;
            }

            // Checked before the keyword: a module path may itself start
            // with "require" (requirejs.org/...)
            Some(name) if in_block && tokens.len() == 2 && !is_require_keyword(name) => {
                requirements.push(Requirement::new(name, tokens[1]));
            }

            Some(first) if is_require_keyword(first) => {
                if *first == "require" && tokens.len() == 3 {
                    requirements.push(Requirement::new(tokens[1], tokens[2]));
                } else {
                    // `require (` or a declaration we can't read
                    in_block = true;
                }
            }

            // module, go, replace, exclude, odd block lines, ...
            Some(_) => {}
        }
    }

    Ok(requirements)
}

// `require` on its own, or glued to the block's paren: `require(`
fn is_require_keyword(token: &str) -> bool {
    token == "require" || token.starts_with("require(")
}

// Drops a trailing `// ...` comment (e.g. `// indirect`)
fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    }
}
