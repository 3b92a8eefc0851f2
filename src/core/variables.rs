//! # Prompt Variables
//!
//! Prompts may contain `{{name}}` placeholders. Before a prompt is placed in
//! the composer, the user fills every placeholder through a small form.

use std::fmt;

/// A placeholder that was left empty on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingVariable(pub String);

impl fmt::Display for MissingVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Please fill out all variables ({} is empty)", self.0)
    }
}

impl std::error::Error for MissingVariable {}

/// Unique placeholder names in first-appearance order.
pub fn parse_variables(content: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let mut rest = content;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        let name = &after[..end];
        if !found.iter().any(|v| v == name) {
            found.push(name.to_string());
        }
        rest = &after[end + 2..];
    }
    found
}

/// Replace every `{{name}}` with its value in one pass. Substituted text is
/// never scanned again; unknown placeholders stay as written.
pub fn fill(content: &str, values: &[(String, String)]) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        let name = &after[..end];
        out.push_str(&rest[..start]);
        match values.iter().find(|(key, _)| key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableEntry {
    pub key: String,
    pub value: String,
}

/// Form state for filling a prompt's variables.
#[derive(Debug, Clone)]
pub struct VariableForm {
    pub prompt_name: String,
    pub description: String,
    content: String,
    pub entries: Vec<VariableEntry>,
    pub selected: usize,
}

impl VariableForm {
    /// Returns `None` when the prompt has no placeholders.
    pub fn for_prompt(name: &str, description: &str, content: &str) -> Option<Self> {
        let entries: Vec<VariableEntry> = parse_variables(content)
            .into_iter()
            .map(|key| VariableEntry {
                key,
                value: String::new(),
            })
            .collect();
        if entries.is_empty() {
            return None;
        }
        Some(Self {
            prompt_name: name.to_string(),
            description: description.to_string(),
            content: content.to_string(),
            entries,
            selected: 0,
        })
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.entries.len();
    }

    pub fn select_prev(&mut self) {
        self.selected = self
            .selected
            .checked_sub(1)
            .unwrap_or(self.entries.len() - 1);
    }

    pub fn selected_value_mut(&mut self) -> Option<&mut String> {
        self.entries.get_mut(self.selected).map(|e| &mut e.value)
    }

    /// The prompt text with every variable substituted.
    pub fn submit(&self) -> Result<String, MissingVariable> {
        if let Some(empty) = self.entries.iter().find(|e| e.value.is_empty()) {
            return Err(MissingVariable(empty.key.clone()));
        }
        let values: Vec<(String, String)> = self
            .entries
            .iter()
            .map(|e| (e.key.clone(), e.value.clone()))
            .collect();
        Ok(fill(&self.content, &values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variables_dedupes_in_order() {
        let vars = parse_variables("Translate {{text}} into {{language}}. Keep {{text}} short.");
        assert_eq!(vars, vec!["text".to_string(), "language".to_string()]);
    }

    #[test]
    fn test_parse_variables_ignores_unclosed() {
        assert_eq!(parse_variables("Hello {{name"), Vec::<String>::new());
        assert_eq!(parse_variables("no vars here"), Vec::<String>::new());
    }

    #[test]
    fn test_fill_replaces_every_occurrence() {
        let out = fill(
            "{{a}} and {{a}} then {{b}}",
            &[
                ("a".to_string(), "x".to_string()),
                ("b".to_string(), "y".to_string()),
            ],
        );
        assert_eq!(out, "x and x then y");
    }

    #[test]
    fn test_fill_does_not_rescan_values() {
        let out = fill(
            "{{a}} / {{b}} / {{unknown}}",
            &[
                ("a".to_string(), "{{b}}".to_string()),
                ("b".to_string(), "y".to_string()),
            ],
        );
        assert_eq!(out, "{{b}} / y / {{unknown}}");
    }

    #[test]
    fn test_form_requires_every_value() {
        let mut form = VariableForm::for_prompt("Translate", "", "{{text}} -> {{lang}}").unwrap();
        form.entries[0].value = "hola".to_string();
        assert_eq!(form.submit(), Err(MissingVariable("lang".to_string())));

        form.select_next();
        form.selected_value_mut().unwrap().push_str("en");
        assert_eq!(form.submit().unwrap(), "hola -> en");
    }

    #[test]
    fn test_form_without_variables() {
        assert!(VariableForm::for_prompt("Plain", "", "just text").is_none());
    }

    #[test]
    fn test_selection_wraps() {
        let mut form = VariableForm::for_prompt("p", "", "{{a}}{{b}}").unwrap();
        form.select_prev();
        assert_eq!(form.selected, 1);
        form.select_next();
        assert_eq!(form.selected, 0);
    }
}
