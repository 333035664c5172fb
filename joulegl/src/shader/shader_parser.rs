/// ShaderParser - source templating applied line by line
///
/// - Static variables: `$name$` is replaced by its value everywhere
/// - Dynamic variables: `$$group_sub$$` markers make the line repeat once per
///   value of the group, the n-th copy using the n-th value of each marker.
///   All sub-variables of a group hold the same number of values, and one
///   line may only use markers of a single group.
/// - Leftover `//$$`, `$$` and `//$` markers are stripped, so templated lines
///   can be kept commented out in the raw source

use std::fs;
use std::path::Path;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct ShaderParser {
    /// ("$name$", value) in registration order
    static_vars: Vec<(String, String)>,
    /// Group → number of values of each of its sub-variables
    group_sizes: FxHashMap<String, usize>,
    /// ("$$group_sub$$", group, values) in registration order
    dynamic_vars: Vec<(String, String, Vec<String>)>,
}

impl ShaderParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `$name$` replacements
    pub fn set_static<K, V>(&mut self, vars: impl IntoIterator<Item = (K, V)>)
    where
        K: AsRef<str>,
        V: ToString,
    {
        for (key, value) in vars {
            let marker = format!("${}$", key.as_ref());
            let value = value.to_string();
            match self.static_vars.iter_mut().find(|(known, _)| *known == marker) {
                Some(entry) => entry.1 = value,
                None => self.static_vars.push((marker, value)),
            }
        }
    }

    /// Register the sub-variables of a dynamic group
    ///
    /// Fails if a sub-variable's value count differs from the group's.
    pub fn set_dynamic<S: AsRef<str>>(
        &mut self,
        group: &str,
        sub_vars: impl IntoIterator<Item = (S, Vec<String>)>,
    ) -> Result<()> {
        for (sub, values) in sub_vars {
            match self.group_sizes.get(group) {
                Some(&size) if size != values.len() => {
                    return Err(Error::ShaderParse(format!(
                        "group '{}' holds {} values, '{}' has {}",
                        group, size, sub.as_ref(), values.len()
                    )));
                }
                Some(_) => {}
                None => {
                    self.group_sizes.insert(group.to_string(), values.len());
                }
            }

            let marker = format!("$${}_{}$$", group, sub.as_ref());
            match self.dynamic_vars.iter_mut().find(|(known, _, _)| *known == marker) {
                Some(entry) => entry.2 = values,
                None => self.dynamic_vars.push((marker, group.to_string(), values)),
            }
        }
        Ok(())
    }

    /// Expand one line (including its line break, if any)
    pub fn process_line(&self, line: &str) -> Result<String> {
        let mut processed = line.to_string();
        for (marker, value) in &self.static_vars {
            processed = processed.replace(marker.as_str(), value);
        }

        if processed.contains("$$") {
            let mut current_group: Option<&str> = None;
            for (marker, group, _) in &self.dynamic_vars {
                if !processed.contains(marker.as_str()) {
                    continue;
                }
                match current_group {
                    Some(current) if current != group => {
                        return Err(Error::ShaderParse(format!(
                            "line mixes dynamic groups '{}' and '{}'",
                            current, group
                        )));
                    }
                    _ => current_group = Some(group),
                }
            }

            if let Some(group) = current_group {
                let size = self.group_sizes.get(group).copied().unwrap_or(0);
                let mut expanded = String::new();
                for index in 0..size {
                    let mut copy = processed.clone();
                    for (marker, _, values) in self.dynamic_vars.iter().filter(|(_, g, _)| g == group) {
                        copy = copy.replace(marker.as_str(), &values[index]);
                    }
                    expanded.push_str(&copy);
                }
                processed = expanded;
            }
        }

        Ok(processed.replace("//$$", "").replace("$$", "").replace("//$", ""))
    }

    /// Expand a whole source
    pub fn parse(&self, source: &str) -> Result<String> {
        let mut processed = String::with_capacity(source.len());
        for line in source.split_inclusive('\n') {
            processed.push_str(&self.process_line(line)?);
        }
        Ok(processed)
    }

    /// Read and expand a source file
    pub fn parse_file(&self, path: &Path) -> Result<String> {
        let source = fs::read_to_string(path)?;
        self.parse(&source)
    }
}

#[cfg(test)]
#[path = "shader_parser_tests.rs"]
mod tests;
