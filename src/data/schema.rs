use serde::Deserialize;

use crate::error::ViewError;

// ---------------------------------------------------------------------------
// Schema – which columns mean what
// ---------------------------------------------------------------------------

/// Static description of the dataset columns the explorer understands.
/// Read-only once the application has started.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Schema {
    /// Numeric columns that may be placed on an axis.
    pub numeric_fields: Vec<String>,
    /// Column holding the sex category ("Female" / "Male").
    pub sex_field: String,
    /// Column holding the outcome category ("Survived" / "Died").
    pub outcome_field: String,
    /// Binary clinical-condition columns (0/1).
    pub condition_flags: Vec<String>,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            numeric_fields: [
                "age",
                "creatinine_phosphokinase",
                "ejection_fraction",
                "platelets",
                "serum_creatinine",
                "serum_sodium",
                "time",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            sex_field: "sex_label".to_string(),
            outcome_field: "death_label".to_string(),
            condition_flags: ["anaemia", "diabetes", "high_blood_pressure", "smoking"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Schema {
    pub fn is_numeric(&self, field: &str) -> bool {
        self.numeric_fields.iter().any(|f| f == field)
    }

    /// Every column a conformed record must carry.
    pub fn all_fields(&self) -> impl Iterator<Item = &str> {
        self.numeric_fields
            .iter()
            .map(String::as_str)
            .chain([self.sex_field.as_str(), self.outcome_field.as_str()])
            .chain(self.condition_flags.iter().map(String::as_str))
    }

    /// Reject axis fields that are not declared numeric.
    pub fn check_axis(&self, field: &str) -> Result<(), ViewError> {
        if self.is_numeric(field) {
            Ok(())
        } else {
            Err(ViewError::schema(field, "is not a numeric axis field"))
        }
    }

    /// Preferred field if the schema has it, otherwise the first numeric field.
    pub fn axis_or_first(&self, preferred: &str) -> Option<String> {
        if self.is_numeric(preferred) {
            Some(preferred.to_string())
        } else {
            self.numeric_fields.first().cloned()
        }
    }
}

/// Human-readable label for a column name: `serum_sodium` → `serum sodium`.
pub fn pretty_label(field: &str) -> String {
    field.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schema_fields() {
        let schema = Schema::default();
        assert!(schema.is_numeric("age"));
        assert!(!schema.is_numeric("sex_label"));
        assert_eq!(schema.all_fields().count(), 7 + 2 + 4);
    }

    #[test]
    fn test_check_axis_rejects_categorical() {
        let schema = Schema::default();
        assert!(schema.check_axis("ejection_fraction").is_ok());
        assert!(matches!(
            schema.check_axis("death_label"),
            Err(ViewError::Schema { .. })
        ));
    }

    #[test]
    fn test_axis_or_first_falls_back() {
        let schema = Schema::default();
        assert_eq!(schema.axis_or_first("time").as_deref(), Some("time"));
        assert_eq!(schema.axis_or_first("bogus").as_deref(), Some("age"));
    }

    #[test]
    fn test_pretty_label() {
        assert_eq!(pretty_label("high_blood_pressure"), "high blood pressure");
        assert_eq!(pretty_label("age"), "age");
    }
}
