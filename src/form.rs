use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CEDULA_LEN: usize = 10;

/// Registration form as the UI sends it. Every field is kept as the raw JSON
/// value so a rejected submission can be handed back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentForm {
    #[serde(default)]
    pub cedula: Option<Value>,
    #[serde(default)]
    pub first_name: Option<Value>,
    #[serde(default)]
    pub last_name: Option<Value>,
    #[serde(default)]
    pub score1: Option<Value>,
    #[serde(default)]
    pub score2: Option<Value>,
    #[serde(default)]
    pub attendance: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidStudent {
    pub cedula: String,
    pub first_name: String,
    pub last_name: String,
    pub score1: f64,
    pub score2: f64,
    pub attendance: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            code,
            message: message.into(),
        }
    }
}

enum Raw {
    Missing,
    WrongType,
    Text(String),
}

/// Text content of a raw field; numbers are accepted as their decimal form.
/// Blank strings count as missing.
fn text(v: &Option<Value>) -> Raw {
    let s = match v {
        None | Some(Value::Null) => return Raw::Missing,
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => return Raw::WrongType,
    };
    if s.is_empty() {
        Raw::Missing
    } else {
        Raw::Text(s)
    }
}

fn required_text(
    field: &'static str,
    v: &Option<Value>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match text(v) {
        Raw::Text(t) => Some(t),
        Raw::Missing => {
            errors.push(FieldError::new(field, "required", format!("{field} is required")));
            None
        }
        Raw::WrongType => {
            errors.push(FieldError::new(
                field,
                "type",
                format!("{field} must be text or a number"),
            ));
            None
        }
    }
}

fn required_number(
    field: &'static str,
    v: &Option<Value>,
    errors: &mut Vec<FieldError>,
) -> Option<f64> {
    let t = required_text(field, v, errors)?;
    match t.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => {
            errors.push(FieldError::new(
                field,
                "number",
                format!("{field} must be a number"),
            ));
            None
        }
    }
}

fn check_cedula(cedula: &str, errors: &mut Vec<FieldError>) {
    let len = cedula.chars().count();
    if len < CEDULA_LEN {
        errors.push(FieldError::new(
            "cedula",
            "minlength",
            format!("cedula must have {CEDULA_LEN} digits"),
        ));
    }
    if len > CEDULA_LEN {
        errors.push(FieldError::new(
            "cedula",
            "maxlength",
            format!("cedula must have {CEDULA_LEN} digits"),
        ));
    }
    if !cedula.chars().all(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new(
            "cedula",
            "pattern",
            "cedula must contain digits only",
        ));
    }
}

/// Runs every field check and reports all failures together.
pub fn validate(form: &StudentForm) -> Result<ValidStudent, Vec<FieldError>> {
    let mut errors = Vec::new();

    let cedula = required_text("cedula", &form.cedula, &mut errors);
    if let Some(c) = cedula.as_deref() {
        check_cedula(c, &mut errors);
    }
    let first_name = required_text("firstName", &form.first_name, &mut errors);
    let last_name = required_text("lastName", &form.last_name, &mut errors);
    let score1 = required_number("score1", &form.score1, &mut errors);
    let score2 = required_number("score2", &form.score2, &mut errors);
    if let (Some(a), Some(b)) = (score1, score2) {
        if !(a + b).is_finite() {
            errors.push(FieldError::new(
                "score2",
                "range",
                "score1 + score2 is too large to average",
            ));
        }
    }
    let attendance = required_number("attendance", &form.attendance, &mut errors);
    if let Some(a) = attendance {
        if !(0.0..=100.0).contains(&a) {
            errors.push(FieldError::new(
                "attendance",
                "range",
                "attendance must be between 0 and 100",
            ));
        }
    }

    match (cedula, first_name, last_name, score1, score2, attendance) {
        (
            Some(cedula),
            Some(first_name),
            Some(last_name),
            Some(score1),
            Some(score2),
            Some(attendance),
        ) if errors.is_empty() => {
            Ok(ValidStudent {
                cedula,
                first_name,
                last_name,
                score1,
                score2,
                attendance,
            })
        }
        _ => Err(errors),
    }
}
