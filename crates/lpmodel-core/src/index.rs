use std::fmt;
use std::ops::Range;

use indexmap::IndexMap;

/// One namespace: name to the ranges it owns, plus the allocation cursor
#[derive(Debug, Clone, Default)]
struct Namespace {
    ranges: IndexMap<String, Vec<Range<usize>>>,
    cursor: usize,
}

impl Namespace {
    fn add(&mut self, name: &str, count: usize) {
        if count == 0 {
            return;
        }
        let start = self.cursor;
        self.cursor += count;
        let ranges = self.ranges.entry(name.to_string()).or_default();
        match ranges.last_mut() {
            // Nothing was allocated since this name's last range
            Some(last) if last.end == start => last.end = self.cursor,
            _ => ranges.push(start..self.cursor),
        }
    }

    fn index(&self, name: &str) -> Option<Vec<usize>> {
        self.ranges
            .get(name)
            .map(|ranges| ranges.iter().cloned().flatten().collect())
    }

    fn last_index(&self) -> Option<usize> {
        self.cursor.checked_sub(1)
    }
}

/// Assigns global column positions to variable blocks and row positions to
/// named constraints, in first-seen order.
///
/// Re-adding a name extends it with a fresh disjoint range; nothing is ever
/// reassigned.
#[derive(Debug, Clone, Default)]
pub struct IndexFactory {
    vars: Namespace,
    consts: Namespace,
}

impl IndexFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_var(&mut self, name: &str, count: usize) {
        self.vars.add(name, count);
    }

    pub fn add_const(&mut self, name: &str, count: usize) {
        self.consts.add(name, count);
    }

    pub fn has_var(&self, name: &str) -> bool {
        self.vars.ranges.contains_key(name)
    }

    pub fn has_const(&self, name: &str) -> bool {
        self.consts.ranges.contains_key(name)
    }

    /// Global column positions of block `name`
    pub fn var_index(&self, name: &str) -> Option<Vec<usize>> {
        self.vars.index(name)
    }

    /// Global row positions of constraint `name`
    pub fn const_index(&self, name: &str) -> Option<Vec<usize>> {
        self.consts.index(name)
    }

    pub fn var_ranges(&self, name: &str) -> Option<&[Range<usize>]> {
        self.vars.ranges.get(name).map(Vec::as_slice)
    }

    pub fn const_ranges(&self, name: &str) -> Option<&[Range<usize>]> {
        self.consts.ranges.get(name).map(Vec::as_slice)
    }

    /// Highest column assigned so far
    pub fn last_var_index(&self) -> Option<usize> {
        self.vars.last_index()
    }

    /// Highest row assigned so far
    pub fn last_const_index(&self) -> Option<usize> {
        self.consts.last_index()
    }

    /// Block names in the order they were first added
    pub fn var_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.vars.ranges.keys().map(String::as_str)
    }

    pub fn const_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.consts.ranges.keys().map(String::as_str)
    }

    pub fn n_vars(&self) -> usize {
        self.vars.cursor
    }

    pub fn n_consts(&self) -> usize {
        self.consts.cursor
    }
}

fn write_namespace(f: &mut fmt::Formatter<'_>, title: &str, ns: &Namespace) -> fmt::Result {
    writeln!(f, "{title}:")?;
    for (name, ranges) in &ns.ranges {
        let spans: Vec<String> = ranges
            .iter()
            .map(|r| format!("{}..{}", r.start, r.end))
            .collect();
        writeln!(f, "  {name}: {}", spans.join(", "))?;
    }
    Ok(())
}

impl fmt::Display for IndexFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_namespace(f, "variables", &self.vars)?;
        write_namespace(f, "constraints", &self.consts)
    }
}
