//! Template inclusion: `@include('partial.html', {"key": "value"})`.
//!
//! The partial path resolves against the directory of the including file.
//! Context keys are substituted as `@key` (or `@a.b` for nested objects)
//! inside the included text and inherited by nested includes.

use std::{
    fs,
    path::{Path, PathBuf},
};

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

/// Nesting limit; deeper chains are reported as a cycle.
pub const MAX_DEPTH: usize = 32;

#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("cannot read partial `{}` included from {}", .path.display(), .from.display())]
    Missing {
        path: PathBuf,
        from: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed include directive in {} at byte {offset}: {reason}", .file.display())]
    Malformed {
        file: PathBuf,
        offset: usize,
        reason: String,
    },

    #[error("includes nested deeper than {} levels at {}, check for a cycle", MAX_DEPTH, .file.display())]
    TooDeep { file: PathBuf },
}

/// A parsed directive: byte span in the source plus arguments.
#[derive(Debug, PartialEq)]
struct Directive {
    start: usize,
    end: usize,
    file: String,
    context: Map<String, Value>,
}

/// Expander bound to one directive prefix.
pub struct Includer {
    prefix: String,
    var: Regex,
}

impl Includer {
    pub fn new(prefix: &str) -> Self {
        let var = Regex::new(&format!(r"{}([A-Za-z_][\w.]*)", regex::escape(prefix)))
            .expect("escaped prefix forms a valid pattern");
        Self {
            prefix: prefix.to_string(),
            var,
        }
    }

    fn needle(&self) -> String {
        format!("{}include(", self.prefix)
    }

    /// Expand every directive in `text`, read from `file`.
    pub fn expand(&self, text: &str, file: &Path) -> Result<String, IncludeError> {
        self.expand_with(text, file, &Map::new(), 0)
    }

    fn expand_with(
        &self,
        text: &str,
        file: &Path,
        vars: &Map<String, Value>,
        depth: usize,
    ) -> Result<String, IncludeError> {
        if depth > MAX_DEPTH {
            return Err(IncludeError::TooDeep {
                file: file.to_path_buf(),
            });
        }

        let directives = self.parse(text, file)?;
        let dir = file.parent().unwrap_or(Path::new(""));
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;

        for d in directives {
            out.push_str(&self.substitute(&text[cursor..d.start], vars));

            let partial = dir.join(&d.file);
            let content = fs::read_to_string(&partial).map_err(|source| IncludeError::Missing {
                path: partial.clone(),
                from: file.to_path_buf(),
                source,
            })?;

            let mut merged = vars.clone();
            merged.extend(d.context);
            out.push_str(&self.expand_with(&content, &partial, &merged, depth + 1)?);
            cursor = d.end;
        }

        out.push_str(&self.substitute(&text[cursor..], vars));
        Ok(out)
    }

    fn substitute(&self, text: &str, vars: &Map<String, Value>) -> String {
        if vars.is_empty() {
            return text.to_string();
        }
        self.var
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let key = &caps[1];
                // "@name." at the end of a sentence: the dot is punctuation
                let trimmed = key.trim_end_matches('.');
                match lookup(vars, trimmed) {
                    Some(value) => format!("{}{}", value, &key[trimmed.len()..]),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    fn parse(&self, text: &str, file: &Path) -> Result<Vec<Directive>, IncludeError> {
        let needle = self.needle();
        let mut found = Vec::new();
        let mut from = 0;

        while let Some(pos) = text[from..].find(&needle) {
            let start = from + pos;
            let malformed = |offset: usize, reason: &str| IncludeError::Malformed {
                file: file.to_path_buf(),
                offset,
                reason: reason.to_string(),
            };

            let mut p = start + needle.len();
            p = skip_ws(text, p);

            let quote = text[p..]
                .chars()
                .next()
                .filter(|c| *c == '\'' || *c == '"')
                .ok_or_else(|| malformed(p, "expected a quoted file name"))?;
            let name_start = p + 1;
            let name_len = text[name_start..]
                .find(quote)
                .ok_or_else(|| malformed(p, "unterminated file name"))?;
            let name = &text[name_start..name_start + name_len];
            if name.is_empty() {
                return Err(malformed(p, "empty file name"));
            }
            p = skip_ws(text, name_start + name_len + 1);

            let mut context = Map::new();
            if text[p..].starts_with(',') {
                p = skip_ws(text, p + 1);
                let mut stream =
                    serde_json::Deserializer::from_str(&text[p..]).into_iter::<Map<String, Value>>();
                match stream.next() {
                    Some(Ok(map)) => context = map,
                    Some(Err(e)) => return Err(malformed(p, &format!("invalid context: {e}"))),
                    None => return Err(malformed(p, "expected a context object")),
                }
                p = skip_ws(text, p + stream.byte_offset());
            }

            if !text[p..].starts_with(')') {
                return Err(malformed(p, "expected `)`"));
            }

            found.push(Directive {
                start,
                end: p + 1,
                file: name.to_string(),
                context,
            });
            from = p + 1;
        }

        Ok(found)
    }
}

fn skip_ws(text: &str, from: usize) -> usize {
    from + (text[from..].len() - text[from..].trim_start().len())
}

/// Resolve a dotted key; strings render raw, other values as JSON.
fn lookup(vars: &Map<String, Value>, key: &str) -> Option<String> {
    let mut parts = key.split('.');
    let mut value = vars.get(parts.next()?)?;
    for part in parts {
        value = value.get(part)?;
    }
    Some(match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
