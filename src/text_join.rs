//! Multi-line text concatenation.

use serde::{Deserialize, Serialize};

/// How lines are wrapped and joined.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JoinOptions {
    pub delimiter: String,
    pub prefix: String,
    pub suffix: String,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Preset::Comma.options()
    }
}

/// Ready-made option sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// `a,b,c`
    Comma,
    /// `"a","b","c"`
    QuotedCsv,
}

impl Preset {
    pub fn options(self) -> JoinOptions {
        match self {
            Preset::Comma => JoinOptions {
                delimiter: ",".to_string(),
                prefix: String::new(),
                suffix: String::new(),
            },
            Preset::QuotedCsv => JoinOptions {
                delimiter: ",".to_string(),
                prefix: "\"".to_string(),
                suffix: "\"".to_string(),
            },
        }
    }
}

/// Counters shown next to the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextStats {
    /// Characters other than whitespace
    pub character_count: usize,
    /// Lines with non-whitespace content
    pub line_count: usize,
}

impl TextStats {
    pub fn of(input: &str) -> Self {
        Self {
            character_count: input.chars().filter(|c| !c.is_whitespace()).count(),
            line_count: content_lines(input).count(),
        }
    }
}

/// Trim every non-blank line, wrap it in prefix/suffix and join with the delimiter.
pub fn join_lines(input: &str, options: &JoinOptions) -> String {
    let mut joined = String::with_capacity(input.len());
    for (idx, line) in content_lines(input).enumerate() {
        if idx > 0 {
            joined.push_str(&options.delimiter);
        }
        joined.push_str(&options.prefix);
        joined.push_str(line.trim());
        joined.push_str(&options.suffix);
    }
    joined
}

fn content_lines(input: &str) -> impl Iterator<Item = &str> {
    input.lines().filter(|line| !line.trim().is_empty())
}
