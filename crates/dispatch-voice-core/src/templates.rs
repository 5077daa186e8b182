//! Announcement text for each dispatch event.
//!
//! Every builder is pure: identical input yields identical text.

use crate::error::{VoiceAlertError, VoiceAlertResult};
use std::collections::{BTreeMap, HashMap};

/// New call for service
#[must_use]
pub fn new_call(call_number: &str, call_type: &str, priority: &str, location: &str) -> String {
    format!("New {priority} priority call. {call_type} at {location}. Call number {call_number}.")
}

/// Plate hit against a BOLO
#[must_use]
pub fn bolo_hit(plate: &str, reason: &str, location: &str) -> String {
    format!("BOLO alert. Plate {} flagged for {reason}. Last seen at {location}.", spell_plate(plate))
}

/// Plate hit against the stolen vehicle list
#[must_use]
pub fn stolen_vehicle(plate: &str, vehicle: &str, location: &str) -> String {
    format!(
        "Stolen vehicle alert. {vehicle}, plate {}, spotted at {location}.",
        spell_plate(plate)
    )
}

/// Officer panic button
#[must_use]
pub fn panic_button(unit: &str, location: &str) -> String {
    format!("Emergency. Panic button activated by unit {unit} at {location}. All units respond.")
}

/// Unit assigned to a call
#[must_use]
pub fn unit_assigned(unit: &str, call_number: &str) -> String {
    format!("Unit {unit} assigned to call {call_number}.")
}

/// Call priority raised
#[must_use]
pub fn priority_upgrade(call_number: &str, new_priority: &str) -> String {
    format!("Call {call_number} upgraded to {new_priority} priority.")
}

/// Unit requesting backup
#[must_use]
pub fn backup_requested(unit: &str, location: &str) -> String {
    format!("Unit {unit} requesting backup at {location}.")
}

/// Backup on the way
#[must_use]
pub fn backup_en_route(unit: &str, requesting_unit: &str) -> String {
    format!("Unit {unit} en route to assist unit {requesting_unit}.")
}

/// Scene secure
#[must_use]
pub fn code_four(unit: &str) -> String {
    format!("Unit {unit} reports code 4. Scene is secure.")
}

/// Unit available
#[must_use]
pub fn unit_available(unit: &str) -> String {
    format!("Unit {unit} is now available.")
}

/// Unit busy
#[must_use]
pub fn unit_busy(unit: &str) -> String {
    format!("Unit {unit} is now busy.")
}

/// Unit out of service
#[must_use]
pub fn unit_offline(unit: &str) -> String {
    format!("Unit {unit} is now out of service.")
}

/// Unit responding
#[must_use]
pub fn unit_en_route(unit: &str, location: &str) -> String {
    format!("Unit {unit} en route to {location}.")
}

/// Unit arrived
#[must_use]
pub fn unit_on_scene(unit: &str, location: &str) -> String {
    format!("Unit {unit} on scene at {location}.")
}

/// Shift start reminder
#[must_use]
pub fn shift_start(shift: &str, minutes: u32) -> String {
    format!("{shift} shift begins in {}.", minutes_phrase(minutes))
}

/// Shift end reminder
#[must_use]
pub fn shift_end(shift: &str, minutes: u32) -> String {
    format!("{shift} shift ends in {}.", minutes_phrase(minutes))
}

/// Shift handoff
#[must_use]
pub fn shift_handoff(from_dispatcher: &str, to_dispatcher: &str) -> String {
    format!("Shift handoff. {from_dispatcher} is handing off to {to_dispatcher}.")
}

/// Unit entering a zone
#[must_use]
pub fn zone_entry(unit: &str, zone: &str) -> String {
    format!("Unit {unit} has entered {zone}.")
}

/// System notice
#[must_use]
pub fn system_update(message: &str) -> String {
    format!("System update. {message}")
}

/// Training notice
#[must_use]
pub fn training_available(course: &str) -> String {
    format!("New training available. {course}.")
}

/// Warrant list changes
#[must_use]
pub fn warrants_update(count: u32) -> String {
    let noun = if count == 1 { "warrant" } else { "warrants" };
    format!("Warrants update. {count} new {noun} on file.")
}

/// Estimated arrival
#[must_use]
pub fn eta_update(unit: &str, minutes: u32) -> String {
    format!("Unit {unit} estimated arrival in {}.", minutes_phrase(minutes))
}

/// Medical call
#[must_use]
pub fn medical_emergency(call_number: &str, condition: &str, location: &str) -> String {
    format!("Medical emergency. {condition} at {location}. Call number {call_number}.")
}

/// Ambulance request
#[must_use]
pub fn ambulance_requested(location: &str, patients: u32) -> String {
    let noun = if patients == 1 { "patient" } else { "patients" };
    format!("Ambulance requested at {location}. {patients} {noun}.")
}

/// Fire call
#[must_use]
pub fn fire_emergency(call_number: &str, fire_type: &str, location: &str) -> String {
    format!("Fire emergency. {fire_type} at {location}. Call number {call_number}.")
}

/// Hazardous materials incident
#[must_use]
pub fn hazmat_alert(material: &str, location: &str) -> String {
    format!("Hazmat alert. {material} reported at {location}. Approach with caution.")
}

/// Substitute `{name}` placeholders; unknown names stay as written
#[must_use]
pub fn substitute(template: &str, variables: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(['}', '{']) {
            Some(close) if after.as_bytes()[close] == b'}' => {
                let name = &after[..close];
                match variables.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Render a user template by key
///
/// # Errors
///
/// Returns `TemplateNotFound` when `key` is not in `templates`.
pub fn render_custom(
    templates: &BTreeMap<String, String>,
    key: &str,
    variables: &HashMap<String, String>,
) -> VoiceAlertResult<String> {
    let template = templates
        .get(key)
        .ok_or_else(|| VoiceAlertError::template_not_found(key))?;
    Ok(substitute(template, variables))
}

/// Space plate characters so they are read one at a time
fn spell_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn minutes_phrase(minutes: u32) -> String {
    if minutes == 1 {
        "1 minute".to_string()
    } else {
        format!("{minutes} minutes")
    }
}
