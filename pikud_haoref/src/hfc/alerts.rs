use serde::Deserialize;

/// Body of the alerts endpoint when an alert is active.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertPayload {
    pub id: Option<String>,
    pub cat: Option<CategoryCode>,
    pub title: Option<String>,
    pub data: Option<Vec<Option<String>>>,
    pub desc: Option<String>,
}

/// `cat` arrives as a numeric string, but plain numbers have been seen too.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CategoryCode {
    Number(serde_json::Number),
    Text(String),
}

impl CategoryCode {
    /// `None` when the field carries no category at all (`""` or `0`).
    pub fn code(&self) -> Option<Option<i64>> {
        match self {
            CategoryCode::Number(n) => match n.as_i64() {
                Some(0) => None,
                other => Some(other),
            },
            CategoryCode::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(s.parse().ok())
                }
            }
        }
    }
}
