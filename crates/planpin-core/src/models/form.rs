use crate::error::ValidationError;
use planpin_proto::FormResponseRow;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Field types supported by form schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Date,
}

/// One field of a form schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSchema {
    pub fields: Vec<FormField>,
}

/// A form definition as served by the backend `forms` table.
///
/// Definitions with no `project_id` are global and offered to every project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormDefinition {
    pub id: Uuid,
    pub name: String,
    pub project_id: Option<Uuid>,
    pub schema: FormSchema,
}

impl FormDefinition {
    /// Validate submitted values against the schema.
    ///
    /// Every required field must be present and answered; a blank string is
    /// not an answer, an explicit `false` boolean is.
    pub fn validate(&self, values: &Map<String, Value>) -> Result<(), ValidationError> {
        for field in &self.schema.fields {
            if !field.required {
                continue;
            }
            let answered = match values.get(&field.name) {
                None | Some(Value::Null) => false,
                Some(Value::String(text)) => !text.trim().is_empty(),
                Some(_) => true,
            };
            if !answered {
                return Err(ValidationError::MissingField(field.name.clone()));
            }
        }
        Ok(())
    }

    /// Build the response row for submission.
    ///
    /// Validation happens here, at capture time; an invalid response never
    /// reaches the queue or the backend.
    pub fn response(
        &self,
        project_id: Uuid,
        submitted_by: Uuid,
        values: Map<String, Value>,
    ) -> Result<FormResponseRow, ValidationError> {
        self.validate(&values)?;
        Ok(FormResponseRow {
            form_id: self.id,
            project_id,
            submitted_by,
            data: values,
        })
    }
}
