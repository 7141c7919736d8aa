use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::{is_unique_violation, DatabaseError};
use crate::models::enums::*;
use crate::models::*;

const TEMPLATE_COLUMNS: &str = "id, send_base, msg_group, condition, hiv_messaging, second_preg,
     send_offset, priority, english, swahili, luo, comment, created, modified";

pub fn insert_message_template(
    conn: &Connection,
    template: &MessageTemplate,
) -> Result<(), DatabaseError> {
    let key = &template.key;
    conn.execute(
        "INSERT INTO message_templates (id, send_base, msg_group, condition, hiv_messaging,
         second_preg, send_offset, priority, english, swahili, luo, comment, created, modified)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            template.id.to_string(),
            key.send_base.as_str(),
            key.group.as_str(),
            key.condition.as_str(),
            key.hiv_messaging as i32,
            key.second_preg as i32,
            key.send_offset,
            template.priority,
            template.english,
            template.swahili,
            template.luo,
            template.comment,
            template.created.to_string(),
            template.modified.to_string(),
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            DatabaseError::DuplicateKey {
                description: key.description(),
            }
        } else {
            DatabaseError::from(e)
        }
    })?;
    Ok(())
}

pub fn get_message_template_by_key(
    conn: &Connection,
    key: &TemplateKey,
) -> Result<Option<MessageTemplate>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TEMPLATE_COLUMNS} FROM message_templates
         WHERE send_base = ?1 AND msg_group = ?2 AND condition = ?3
           AND hiv_messaging = ?4 AND second_preg = ?5 AND send_offset = ?6"
    ))?;

    let result = stmt.query_row(
        params![
            key.send_base.as_str(),
            key.group.as_str(),
            key.condition.as_str(),
            key.hiv_messaging as i32,
            key.second_preg as i32,
            key.send_offset,
        ],
        read_row,
    );

    match result {
        Ok(row) => Ok(Some(template_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All templates for an anchor + offset, in insertion order.
pub fn get_message_templates_by_offset(
    conn: &Connection,
    send_base: SendBase,
    send_offset: i32,
) -> Result<Vec<MessageTemplate>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TEMPLATE_COLUMNS} FROM message_templates
         WHERE send_base = ?1 AND send_offset = ?2
         ORDER BY rowid"
    ))?;

    let rows = stmt.query_map(params![send_base.as_str(), send_offset], read_row)?;

    let mut templates = Vec::new();
    for row in rows {
        templates.push(template_from_row(row?)?);
    }
    Ok(templates)
}

pub fn list_message_templates(conn: &Connection) -> Result<Vec<MessageTemplate>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TEMPLATE_COLUMNS} FROM message_templates ORDER BY rowid"
    ))?;

    let rows = stmt.query_map([], read_row)?;

    let mut templates = Vec::new();
    for row in rows {
        templates.push(template_from_row(row?)?);
    }
    Ok(templates)
}

pub fn count_message_templates(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM message_templates", [], |row| row.get(0))?;
    Ok(count)
}

/// Overwrite content fields of the stored template sharing `template.key`.
pub fn update_message_template_content(
    conn: &Connection,
    template: &MessageTemplate,
) -> Result<(), DatabaseError> {
    let key = &template.key;
    let updated = conn.execute(
        "UPDATE message_templates SET english = ?7, swahili = ?8, luo = ?9,
         comment = ?10, priority = ?11, modified = ?12
         WHERE send_base = ?1 AND msg_group = ?2 AND condition = ?3
           AND hiv_messaging = ?4 AND second_preg = ?5 AND send_offset = ?6",
        params![
            key.send_base.as_str(),
            key.group.as_str(),
            key.condition.as_str(),
            key.hiv_messaging as i32,
            key.second_preg as i32,
            key.send_offset,
            template.english,
            template.swahili,
            template.luo,
            template.comment,
            template.priority,
            template.modified.to_string(),
        ],
    )?;

    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "MessageTemplate".into(),
            id: key.description(),
        });
    }
    Ok(())
}

// Internal row type for MessageTemplate mapping
struct MessageTemplateRow {
    id: String,
    send_base: String,
    group: String,
    condition: String,
    hiv_messaging: i32,
    second_preg: i32,
    send_offset: i32,
    priority: i32,
    english: String,
    swahili: String,
    luo: String,
    comment: String,
    created: String,
    modified: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<MessageTemplateRow> {
    Ok(MessageTemplateRow {
        id: row.get(0)?,
        send_base: row.get(1)?,
        group: row.get(2)?,
        condition: row.get(3)?,
        hiv_messaging: row.get(4)?,
        second_preg: row.get(5)?,
        send_offset: row.get(6)?,
        priority: row.get(7)?,
        english: row.get(8)?,
        swahili: row.get(9)?,
        luo: row.get(10)?,
        comment: row.get(11)?,
        created: row.get(12)?,
        modified: row.get(13)?,
    })
}

fn template_from_row(row: MessageTemplateRow) -> Result<MessageTemplate, DatabaseError> {
    Ok(MessageTemplate {
        id: Uuid::parse_str(&row.id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        key: TemplateKey {
            send_base: SendBase::from_str(&row.send_base)?,
            group: MessageGroup::from_str(&row.group)?,
            condition: Condition::from_str(&row.condition)?,
            hiv_messaging: row.hiv_messaging != 0,
            second_preg: row.second_preg != 0,
            send_offset: row.send_offset,
        },
        priority: row.priority,
        english: row.english,
        swahili: row.swahili,
        luo: row.luo,
        comment: row.comment,
        created: parse_timestamp(&row.created)?,
        modified: parse_timestamp(&row.modified)?,
    })
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| DatabaseError::ConstraintViolation(format!("timestamp {s:?}: {e}")))
}
