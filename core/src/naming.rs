use std::collections::HashMap;

/// Generates readable, per-controller-unique names for doubles from the
/// type name they impersonate: `Browser` becomes `browser`, then
/// `browser_2`, `browser_3`, ...
#[derive(Debug, Default)]
pub struct NameSequence {
    counts: HashMap<String, usize>,
}

impl NameSequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name_for(&mut self, type_name: &str) -> String {
        let base = snake_case(last_segment(type_name));
        let count = self.counts.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{base}_{count}")
        }
    }
}

fn last_segment(type_name: &str) -> &str {
    type_name.rsplit("::").next().unwrap_or(type_name)
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut chars = name.chars().peekable();
    let mut prev: Option<char> = None;
    while let Some(ch) = chars.next() {
        if ch.is_uppercase() {
            // An uppercase run is one segment; a boundary starts after a
            // lowercase/digit or where the run ends before a lowercase.
            let after_lower = prev.is_some_and(|p| p.is_lowercase() || p.is_numeric());
            let run_ends = prev.is_some_and(char::is_uppercase)
                && chars.peek().is_some_and(|c| c.is_lowercase());
            if after_lower || run_ends {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
        prev = Some(ch);
    }
    out
}
