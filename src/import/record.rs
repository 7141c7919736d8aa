use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{MessageTemplate, TemplateKey};
use crate::resolution::{parse_field, MalformedQuery};

/// An external record describing one template's identity and content.
pub trait ImportRecord {
    /// The record's canonical key.
    fn key(&self) -> Result<TemplateKey, MalformedQuery>;

    fn english(&self) -> &str;

    /// Replacement English text. Used when `english` is blank.
    fn new_text(&self) -> &str;

    fn swahili(&self) -> &str;

    fn luo(&self) -> &str;

    fn comment(&self) -> &str {
        ""
    }

    fn priority(&self) -> Result<i32, MalformedQuery> {
        Ok(0)
    }

    fn description(&self) -> Result<String, MalformedQuery> {
        Ok(self.key()?.description())
    }

    /// English text to store: `english`, or `new_text` if that is empty.
    fn primary_text(&self) -> &str {
        if self.english().is_empty() {
            self.new_text()
        } else {
            self.english()
        }
    }

    /// A fresh template built from this record.
    fn to_template(&self) -> Result<MessageTemplate, MalformedQuery> {
        let mut template = MessageTemplate::new(self.key()?);
        template.english = self.primary_text().to_string();
        template.swahili = self.swahili().to_string();
        template.luo = self.luo().to_string();
        template.comment = self.comment().to_string();
        template.priority = self.priority()?;
        Ok(template)
    }
}

/// One spreadsheet row as exported for bulk import.
///
/// Key and priority cells stay as raw strings so a bad cell is reported as a
/// `MalformedQuery` for that row rather than failing the whole file. JSON
/// sources may give them as native booleans and numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateRow {
    #[serde(deserialize_with = "cell_text")]
    pub send_base: String,
    #[serde(deserialize_with = "cell_text")]
    pub group: String,
    #[serde(deserialize_with = "cell_text")]
    pub condition: String,
    #[serde(deserialize_with = "cell_text")]
    pub hiv_messaging: String,
    #[serde(deserialize_with = "cell_text")]
    pub second_preg: String,
    #[serde(alias = "offset", deserialize_with = "cell_text")]
    pub send_offset: String,
    #[serde(default)]
    pub english: String,
    #[serde(default)]
    pub new: String,
    #[serde(default)]
    pub swahili: String,
    #[serde(default)]
    pub luo: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default, deserialize_with = "cell_text")]
    pub priority: String,
}

impl ImportRecord for TemplateRow {
    fn key(&self) -> Result<TemplateKey, MalformedQuery> {
        let offset = self.send_offset.trim();
        Ok(TemplateKey {
            send_base: parse_field("send_base", self.send_base.trim())?,
            group: parse_field("group", self.group.trim())?,
            condition: parse_field("condition", self.condition.trim())?,
            hiv_messaging: parse_cell_flag("hiv_messaging", &self.hiv_messaging)?,
            second_preg: parse_cell_flag("second_preg", &self.second_preg)?,
            send_offset: offset
                .parse()
                .map_err(|_| MalformedQuery::InvalidOffset(offset.to_string()))?,
        })
    }

    fn english(&self) -> &str {
        &self.english
    }

    fn new_text(&self) -> &str {
        &self.new
    }

    fn swahili(&self) -> &str {
        &self.swahili
    }

    fn luo(&self) -> &str {
        &self.luo
    }

    fn comment(&self) -> &str {
        &self.comment
    }

    fn priority(&self) -> Result<i32, MalformedQuery> {
        let raw = self.priority.trim();
        if raw.is_empty() {
            return Ok(0);
        }
        raw.parse()
            .map_err(|_| MalformedQuery::InvalidPriority(raw.to_string()))
    }
}

/// A cell as it arrives from CSV (text) or JSON (any scalar).
#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
    Text(String),
    Flag(bool),
    Int(i64),
    Float(f64),
}

fn cell_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Cell>::deserialize(deserializer)? {
        None => String::new(),
        Some(Cell::Text(s)) => s,
        Some(Cell::Flag(true)) => "Y".to_string(),
        Some(Cell::Flag(false)) => "N".to_string(),
        Some(Cell::Int(n)) => n.to_string(),
        Some(Cell::Float(f)) => f.to_string(),
    })
}

/// Spreadsheet booleans: `Y`/`N`, `true`/`false` or `1`/`0`, any case.
fn parse_cell_flag(field: &'static str, value: &str) -> Result<bool, MalformedQuery> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Ok(true),
        "n" | "no" | "false" | "0" => Ok(false),
        _ => Err(MalformedQuery::InvalidFlag {
            field,
            value: value.to_string(),
        }),
    }
}
