//! Submitted form data.

use std::collections::HashMap;

/// Text fields and file parts of a submitted form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Vec<u8>>,
}

impl MailForm {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text field. The first value for a name is kept.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_field(name, value);
        self
    }

    /// Adds a file part.
    pub fn with_file(mut self, name: impl Into<String>, contents: Vec<u8>) -> Self {
        self.insert_file(name, contents);
        self
    }

    /// Inserts a text field unless one with the same name exists.
    pub fn insert_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_insert_with(|| value.into());
    }

    /// Inserts a file part unless one with the same name exists.
    pub fn insert_file(&mut self, name: impl Into<String>, contents: Vec<u8>) {
        self.files.entry(name.into()).or_insert(contents);
    }

    /// Returns a text field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Removes and returns a file part.
    pub fn take_file(&mut self, name: &str) -> Option<Vec<u8>> {
        self.files.remove(name)
    }

    /// Iterates over text fields.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<HashMap<String, String>> for MailForm {
    fn from(fields: HashMap<String, String>) -> Self {
        Self {
            fields,
            files: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_and_files() {
        let mut form = MailForm::new()
            .with_field("mlid", "w1234567890123456")
            .with_file("uploaded_config", vec![1, 2]);

        assert_eq!(form.field("mlid"), Some("w1234567890123456"));
        assert_eq!(form.field("passwd"), None);
        assert_eq!(form.take_file("uploaded_config"), Some(vec![1, 2]));
        assert_eq!(form.take_file("uploaded_config"), None);
        assert_eq!(form.fields().count(), 1);
    }

    #[test]
    fn repeated_names_keep_first_value() {
        let mut form = MailForm::new()
            .with_field("mlid", "w1111111111111111")
            .with_field("mlid", "w2222222222222222")
            .with_file("uploaded_config", vec![1])
            .with_file("uploaded_config", vec![2]);

        assert_eq!(form.field("mlid"), Some("w1111111111111111"));
        assert_eq!(form.take_file("uploaded_config"), Some(vec![1]));
    }
}
