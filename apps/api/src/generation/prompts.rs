// All LLM prompt constants for the survey generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use serde_json::{json, Value};

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// Domain framing for the generation model.
pub const SURVEY_SYSTEM: &str =
    "You are a helpful assistant that generates surveys for healthcare providers.";

/// Survey prompt template. Replace `{prompt}` before sending.
pub const SURVEY_PROMPT_TEMPLATE: &str = "Take the prompt and return a survey form with 3 to 5 \
    fields in structured format. Here is the prompt: {prompt}";

pub fn survey_system() -> String {
    format!("{SURVEY_SYSTEM} {JSON_ONLY_SYSTEM}")
}

pub fn survey_prompt(prompt: &str) -> String {
    SURVEY_PROMPT_TEMPLATE.replace("{prompt}", prompt)
}

/// Structured-output schema for the reply: an array of wire-shaped fields.
pub fn survey_response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "description": "An array of fields in the survey form. At least three types of fields \
            are required. At least has one rating field.",
        "nullable": false,
        "items": {
            "type": "OBJECT",
            "properties": {
                "fieldType": {
                    "type": "NUMBER",
                    "description": "The field type of the survey, 0 for short text, 1 for long \
                        text, 2 for number, 3 for yes/no, 4 for multiple choice, 5 for dropdown, \
                        6 for rating. Rating field has a range of 1 to 5."
                },
                "fieldLabel": {
                    "type": "STRING",
                    "description": "The label of the survey field."
                },
                "fieldDescription": {
                    "type": "STRING",
                    "description": "The description of the survey field."
                },
                "requiredField": {
                    "type": "BOOLEAN",
                    "description": "Whether the field is required or not."
                },
                "maximumLength": {
                    "type": "NUMBER",
                    "description": "The maximum length of the field, required if the field type \
                        is short text."
                },
                "range": {
                    "type": "ARRAY",
                    "description": "The 2 length array to define the number range, first element \
                        is the minimum value, second element is the maximum value, required if the \
                        field type is number.",
                    "items": { "type": "NUMBER" }
                },
                "options": {
                    "type": "ARRAY",
                    "description": "The options for the multiple choice or dropdown field, minimum \
                        2 options are required, required if the field type is multiple choice or \
                        dropdown.",
                    "items": { "type": "STRING" }
                },
                "allowMultipleSelection": {
                    "type": "BOOLEAN",
                    "description": "Whether the multiple choice field allows multiple selection."
                }
            },
            "required": ["fieldType", "fieldLabel", "requiredField"]
        }
    })
}
