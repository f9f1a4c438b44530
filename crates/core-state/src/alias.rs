//! Per-executable command aliases with `$` macro expansion.
//!
//! Macros in an alias target:
//! - `$T` line separator (each produces another `\r\n`-terminated line)
//! - `$1`..`$9` positional arguments, `$*` everything after the alias name
//! - `$G` `>`, `$L` `<`, `$B` `|`, `$$` `$`
//!
//! Names and executables compare case-insensitively. Every expansion ends in
//! `\r\n`.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasExpansion {
    pub text: String,
    /// Number of `\r\n`-terminated lines in `text`.
    pub line_count: usize,
}

/// Alias collaborator consumed at read completion.
pub trait AliasExpander {
    fn expand(&self, line: &str, exe_name: &str) -> Option<AliasExpansion>;
    /// Remove all aliases registered for `exe_name`.
    fn clear(&mut self, exe_name: &str);
}

#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    by_exe: HashMap<String, HashMap<String, String>>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, exe_name: &str, name: &str, target: &str) {
        self.by_exe
            .entry(exe_name.to_lowercase())
            .or_default()
            .insert(name.to_lowercase(), target.to_owned());
    }

    pub fn get(&self, exe_name: &str, name: &str) -> Option<&str> {
        self.by_exe
            .get(&exe_name.to_lowercase())?
            .get(&name.to_lowercase())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.by_exe.values().all(HashMap::is_empty)
    }
}

impl AliasExpander for AliasTable {
    fn expand(&self, line: &str, exe_name: &str) -> Option<AliasExpansion> {
        let trimmed = line.trim_start_matches(' ');
        let (name, tail) = match trimmed.find(' ') {
            Some(i) => (&trimmed[..i], trimmed[i..].trim_start_matches(' ')),
            None => (trimmed, ""),
        };
        if name.is_empty() {
            return None;
        }
        let target = self.get(exe_name, name)?;
        let args: Vec<&str> = tail.split_whitespace().collect();
        Some(apply_macros(target, &args, tail))
    }

    fn clear(&mut self, exe_name: &str) {
        if let Some(table) = self.by_exe.get_mut(&exe_name.to_lowercase()) {
            table.clear();
            tracing::debug!(target: "editor.read", exe = exe_name, "aliases cleared");
        }
    }
}

fn apply_macros(target: &str, args: &[&str], tail: &str) -> AliasExpansion {
    let mut text = String::with_capacity(target.len() + tail.len() + 2);
    let mut line_count = 1;
    let mut chars = target.chars();
    while let Some(c) = chars.next() {
        if c != '$' {
            text.push(c);
            continue;
        }
        match chars.next() {
            Some('t' | 'T') => {
                text.push_str("\r\n");
                line_count += 1;
            }
            Some(d @ '1'..='9') => {
                let n = d as usize - '1' as usize;
                text.push_str(args.get(n).copied().unwrap_or(""));
            }
            Some('*') => text.push_str(tail),
            Some('g' | 'G') => text.push('>'),
            Some('l' | 'L') => text.push('<'),
            Some('b' | 'B') => text.push('|'),
            Some('$') => text.push('$'),
            Some(other) => {
                text.push('$');
                text.push(other);
            }
            None => text.push('$'),
        }
    }
    text.push_str("\r\n");
    AliasExpansion { text, line_count }
}
