use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{Condition, Language, MessageGroup, SendBase};

/// The 6-part identity of a message template.
///
/// Two templates in a catalog never share a key. Resolution queries use the
/// same shape but need not match any stored template exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateKey {
    pub send_base: SendBase,
    pub group: MessageGroup,
    pub condition: Condition,
    pub hiv_messaging: bool,
    pub second_preg: bool,
    pub send_offset: i32,
}

impl TemplateKey {
    pub fn new(
        send_base: SendBase,
        group: MessageGroup,
        condition: Condition,
        hiv_messaging: bool,
        second_preg: bool,
        send_offset: i32,
    ) -> Self {
        Self {
            send_base,
            group,
            condition,
            hiv_messaging,
            second_preg,
            send_offset,
        }
    }

    /// `send_base.group.condition.hiv.second` without the offset.
    pub fn category(&self) -> String {
        format!(
            "{}.{}.{}.{}.{}",
            self.send_base,
            self.group,
            self.condition,
            yes_no(self.hiv_messaging),
            yes_no(self.second_preg),
        )
    }

    /// Canonical description, e.g. `edd.two-way.normal.N.N.-4`.
    pub fn description(&self) -> String {
        format!("{}.{}", self.category(), self.send_offset)
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

fn yes_no(flag: bool) -> char {
    if flag {
        'Y'
    } else {
        'N'
    }
}

/// An automated message template. Represents message _content_ for a
/// participant cohort, not a sent message instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub id: Uuid,
    #[serde(flatten)]
    pub key: TemplateKey,
    pub priority: i32,
    pub english: String,
    pub swahili: String,
    pub luo: String,
    pub comment: String,
    pub created: NaiveDateTime,
    pub modified: NaiveDateTime,
}

impl MessageTemplate {
    /// Empty template for `key`, stamped with the current local time.
    pub fn new(key: TemplateKey) -> Self {
        let now = chrono::Local::now().naive_local();
        Self {
            id: Uuid::new_v4(),
            key,
            priority: 0,
            english: String::new(),
            swahili: String::new(),
            luo: String::new(),
            comment: String::new(),
            created: now,
            modified: now,
        }
    }

    pub fn description(&self) -> String {
        self.key.description()
    }

    pub fn category(&self) -> String {
        self.key.category()
    }

    pub fn text(&self, language: Language) -> &str {
        match language {
            Language::English => &self.english,
            Language::Swahili => &self.swahili,
            Language::Luo => &self.luo,
        }
    }

    pub fn set_text(&mut self, language: Language, text: impl Into<String>) {
        let text = text.into();
        match language {
            Language::English => self.english = text,
            Language::Swahili => self.swahili = text,
            Language::Luo => self.luo = text,
        }
    }

    /// Fill `{placeholder}` fields of the text for `language`.
    pub fn render(
        &self,
        language: Language,
        vars: &std::collections::HashMap<String, String>,
    ) -> Result<String, crate::render::RenderError> {
        crate::render::render(self.text(language), vars)
    }
}
