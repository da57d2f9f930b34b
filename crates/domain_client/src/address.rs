//! Postal address

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    pub fn new(
        line1: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            line1: line1.into(),
            line2: None,
            city: city.into(),
            postal_code: postal_code.into(),
            country: country.into(),
        }
    }

    /// Multi-line form used on invoices
    pub fn format(&self) -> String {
        let mut lines = vec![self.line1.clone()];
        if let Some(l2) = &self.line2 {
            lines.push(l2.clone());
        }
        lines.push(format!("{} {}", self.postal_code, self.city));
        lines.push(self.country.clone());
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_second_line() {
        let mut address = Address::new("12 rue des Lilas", "Lyon", "69003", "France");
        address.line2 = Some("Bâtiment B".to_string());
        assert_eq!(
            address.format(),
            "12 rue des Lilas\nBâtiment B\n69003 Lyon\nFrance"
        );
    }
}
