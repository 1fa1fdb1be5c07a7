//! String-to-column conversions applied right before a save.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::{FormError, FormFields};
use crate::db::DatabaseError;
use crate::models::{Address, ContactInfo};

pub const ADDRESS_FIELDS: [&str; 4] = ["street", "city", "state", "zip"];
pub const CONTACT_FIELDS: [&str; 3] = ["contact_name", "phone", "email"];

/// Trimmed value, or `None` when blank or absent.
pub fn text(fields: &FormFields, name: &str) -> Option<String> {
    fields
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn required_text(fields: &FormFields, name: &str) -> Result<String, FormError> {
    text(fields, name).ok_or(FormError::MissingRequired)
}

pub fn opt_int(fields: &FormFields, name: &str) -> Result<Option<i64>, FormError> {
    text(fields, name)
        .map(|raw| {
            raw.parse::<i64>().map_err(|_| FormError::InvalidValue {
                field: name.to_string(),
                reason: format!("'{raw}' is not a whole number"),
            })
        })
        .transpose()
}

pub fn required_int(fields: &FormFields, name: &str) -> Result<i64, FormError> {
    opt_int(fields, name)?.ok_or(FormError::MissingRequired)
}

pub fn opt_float(fields: &FormFields, name: &str) -> Result<Option<f64>, FormError> {
    text(fields, name)
        .map(|raw| {
            let cleaned = raw.trim_start_matches('$').replace(',', "");
            cleaned
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| FormError::InvalidValue {
                    field: name.to_string(),
                    reason: format!("'{raw}' is not an amount"),
                })
        })
        .transpose()
}

pub fn opt_enum<T>(fields: &FormFields, name: &str) -> Result<Option<T>, FormError>
where
    T: FromStr<Err = DatabaseError>,
{
    text(fields, name)
        .map(|raw| {
            T::from_str(&raw).map_err(|_| FormError::InvalidValue {
                field: name.to_string(),
                reason: format!("'{raw}' is not a recognised option"),
            })
        })
        .transpose()
}

/// Join a `YYYY-MM-DD` date field and an `HH:MM[:SS]` time field into one
/// local instant.
pub fn date_and_time(fields: &FormFields, date_field: &str, time_field: &str) -> Result<NaiveDateTime, FormError> {
    let date_raw = required_text(fields, date_field)?;
    let time_raw = required_text(fields, time_field)?;
    let date = NaiveDate::parse_from_str(&date_raw, "%Y-%m-%d").map_err(|_| FormError::InvalidValue {
        field: date_field.to_string(),
        reason: format!("'{date_raw}' is not a date"),
    })?;
    let time = NaiveTime::parse_from_str(&time_raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(&time_raw, "%H:%M"))
        .map_err(|_| FormError::InvalidValue {
            field: time_field.to_string(),
            reason: format!("'{time_raw}' is not a time"),
        })?;
    Ok(date.and_time(time))
}

/// Split an instant back into the date and time fields.
pub fn split_date_time(fields: &mut FormFields, ts: &NaiveDateTime, date_field: &str, time_field: &str) {
    fields.insert(date_field.to_string(), ts.format("%Y-%m-%d").to_string());
    fields.insert(time_field.to_string(), ts.format("%H:%M").to_string());
}

/// Rebuild the nested address, or `None` when every part is blank.
pub fn address(fields: &FormFields) -> Option<Address> {
    let addr = Address {
        street: text(fields, "street"),
        city: text(fields, "city"),
        state: text(fields, "state"),
        zip: text(fields, "zip"),
    };
    (!addr.is_empty()).then_some(addr)
}

pub fn contact_info(fields: &FormFields) -> Option<ContactInfo> {
    let contact = ContactInfo {
        contact_name: text(fields, "contact_name"),
        phone: text(fields, "phone"),
        email: text(fields, "email"),
    };
    (!contact.is_empty()).then_some(contact)
}

pub fn put_address(fields: &mut FormFields, addr: Option<&Address>) {
    let addr = addr.cloned().unwrap_or_default();
    put_opt(fields, "street", addr.street.as_deref());
    put_opt(fields, "city", addr.city.as_deref());
    put_opt(fields, "state", addr.state.as_deref());
    put_opt(fields, "zip", addr.zip.as_deref());
}

pub fn put_contact_info(fields: &mut FormFields, contact: Option<&ContactInfo>) {
    let contact = contact.cloned().unwrap_or_default();
    put_opt(fields, "contact_name", contact.contact_name.as_deref());
    put_opt(fields, "phone", contact.phone.as_deref());
    put_opt(fields, "email", contact.email.as_deref());
}

pub fn put_opt(fields: &mut FormFields, name: &str, value: Option<&str>) {
    fields.insert(name.to_string(), value.unwrap_or_default().to_string());
}

pub fn put_num<T: ToString>(fields: &mut FormFields, name: &str, value: Option<T>) {
    fields.insert(name.to_string(), value.map(|v| v.to_string()).unwrap_or_default());
}
