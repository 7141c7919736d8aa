use std::str::FromStr;

use crate::models::enums::SendBase;
use crate::models::TemplateKey;

use super::MalformedQuery;

/// Parse a canonical description (`edd.two-way.art.Y.N.-4`) into its key.
pub fn parse_description(description: &str) -> Result<TemplateKey, MalformedQuery> {
    let parts: Vec<&str> = description.trim().split('.').collect();
    let [send_base, group, condition, hiv, second, offset] = parts.as_slice() else {
        return Err(MalformedQuery::WrongPartCount {
            description: description.to_string(),
            found: parts.len(),
        });
    };

    Ok(TemplateKey {
        send_base: parse_field("send_base", send_base)?,
        group: parse_field("group", group)?,
        condition: parse_field("condition", condition)?,
        hiv_messaging: parse_flag("hiv_messaging", hiv)?,
        second_preg: parse_flag("second_preg", second)?,
        send_offset: offset
            .parse()
            .map_err(|_| MalformedQuery::InvalidOffset(offset.to_string()))?,
    })
}

/// Parse a raw send base, group or condition string.
pub fn parse_field<T: FromStr>(field: &'static str, value: &str) -> Result<T, MalformedQuery> {
    T::from_str(value).map_err(|_| MalformedQuery::InvalidValue {
        field,
        value: value.to_string(),
    })
}

fn parse_flag(field: &'static str, value: &str) -> Result<bool, MalformedQuery> {
    match value {
        "Y" => Ok(true),
        "N" => Ok(false),
        _ => Err(MalformedQuery::InvalidFlag {
            field,
            value: value.to_string(),
        }),
    }
}

/// Post-date messages alternate between the week 41 and week 42 texts:
/// for `over` offsets below -2 the offset folds onto -1/-2.
pub fn normalize_offset(send_base: SendBase, send_offset: i32) -> i32 {
    if send_base == SendBase::Over && send_offset < -2 {
        floored_mod(send_offset + 1, -2) - 1
    } else {
        send_offset
    }
}

/// Query with its offset normalized; every other field is unchanged.
pub fn normalize_query(query: &TemplateKey) -> TemplateKey {
    TemplateKey {
        send_offset: normalize_offset(query.send_base, query.send_offset),
        ..*query
    }
}

/// Modulo whose result takes the sign of the divisor.
fn floored_mod(a: i32, b: i32) -> i32 {
    let r = a % b;
    if r != 0 && ((r < 0) != (b < 0)) {
        r + b
    } else {
        r
    }
}
