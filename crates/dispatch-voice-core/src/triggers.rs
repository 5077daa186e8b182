//! One call per dispatch event.
//!
//! Each trigger checks its alert-type switch, renders its template and
//! queues the text with a fixed priority and type. A disabled switch makes
//! the trigger a no-op returning `None`.

use crate::alert::{AlertType, Department, Priority, SpeakOptions};
use crate::config::AlertSwitch;
use crate::engine::VoiceAlertEngine;
use crate::error::VoiceAlertResult;
use crate::templates;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Priority for a new call, from the CAD priority label
#[must_use]
pub fn new_call_priority(label: &str) -> Priority {
    if label.trim().eq_ignore_ascii_case("CRITICAL") {
        Priority::Critical
    } else if label.trim().eq_ignore_ascii_case("HIGH") {
        Priority::High
    } else {
        Priority::Normal
    }
}

/// Event-to-announcement facade over an engine
#[derive(Debug, Clone)]
pub struct AlertTriggers {
    engine: VoiceAlertEngine,
}

impl AlertTriggers {
    /// Facade over `engine`
    #[must_use]
    pub fn new(engine: VoiceAlertEngine) -> Self {
        Self { engine }
    }

    /// The underlying engine
    #[must_use]
    pub fn engine(&self) -> &VoiceAlertEngine {
        &self.engine
    }

    fn announce<F>(&self, switch: AlertSwitch, render: F, options: SpeakOptions) -> Option<Uuid>
    where
        F: FnOnce() -> String,
    {
        if !self.engine.alert_type_enabled(switch) {
            debug!("{:?} announcements disabled", switch);
            return None;
        }
        self.engine.speak(render(), options)
    }

    /// New call for service
    pub fn announce_new_call(
        &self,
        call_number: &str,
        call_type: &str,
        priority: &str,
        location: &str,
        department: Option<Department>,
    ) -> Option<Uuid> {
        let mut options = SpeakOptions::new(new_call_priority(priority), AlertType::Call);
        options.department = department;
        self.announce(
            AlertSwitch::NewCalls,
            || templates::new_call(call_number, call_type, priority, location),
            options,
        )
    }

    /// BOLO plate hit
    pub fn announce_bolo_hit(&self, plate: &str, reason: &str, location: &str) -> Option<Uuid> {
        self.announce(
            AlertSwitch::BoloHits,
            || templates::bolo_hit(plate, reason, location),
            SpeakOptions::new(Priority::High, AlertType::Bolo).with_department(Department::Police),
        )
    }

    /// Stolen vehicle plate hit
    pub fn announce_stolen_vehicle(
        &self,
        plate: &str,
        vehicle: &str,
        location: &str,
    ) -> Option<Uuid> {
        self.announce(
            AlertSwitch::BoloHits,
            || templates::stolen_vehicle(plate, vehicle, location),
            SpeakOptions::new(Priority::High, AlertType::Bolo).with_department(Department::Police),
        )
    }

    /// Officer panic button
    pub fn announce_panic_button(
        &self,
        unit: &str,
        location: &str,
        department: Option<Department>,
    ) -> Option<Uuid> {
        let mut options = SpeakOptions::new(Priority::Critical, AlertType::Panic);
        options.department = department;
        self.announce(
            AlertSwitch::PanicAlerts,
            || templates::panic_button(unit, location),
            options,
        )
    }

    /// Unit assigned to a call
    pub fn announce_unit_assigned(&self, unit: &str, call_number: &str) -> Option<Uuid> {
        self.announce(
            AlertSwitch::UnitStatus,
            || templates::unit_assigned(unit, call_number),
            SpeakOptions::new(Priority::Normal, AlertType::Status),
        )
    }

    /// Call priority raised
    pub fn announce_priority_upgrade(&self, call_number: &str, new_priority: &str) -> Option<Uuid> {
        self.announce(
            AlertSwitch::PriorityUpgrades,
            || templates::priority_upgrade(call_number, new_priority),
            SpeakOptions::new(Priority::High, AlertType::Call),
        )
    }

    /// Unit requesting backup
    pub fn announce_backup_requested(&self, unit: &str, location: &str) -> Option<Uuid> {
        self.announce(
            AlertSwitch::BackupRequests,
            || templates::backup_requested(unit, location),
            SpeakOptions::new(Priority::High, AlertType::Call).with_department(Department::Police),
        )
    }

    /// Backup on the way
    pub fn announce_backup_en_route(&self, unit: &str, requesting_unit: &str) -> Option<Uuid> {
        self.announce(
            AlertSwitch::BackupRequests,
            || templates::backup_en_route(unit, requesting_unit),
            SpeakOptions::new(Priority::Normal, AlertType::Status)
                .with_department(Department::Police),
        )
    }

    /// Scene secure
    pub fn announce_code_four(&self, unit: &str) -> Option<Uuid> {
        self.announce(
            AlertSwitch::UnitStatus,
            || templates::code_four(unit),
            SpeakOptions::new(Priority::Normal, AlertType::Status),
        )
    }

    /// Unit available
    pub fn announce_unit_available(&self, unit: &str) -> Option<Uuid> {
        self.announce(
            AlertSwitch::StatusChanges,
            || templates::unit_available(unit),
            SpeakOptions::new(Priority::Low, AlertType::Status),
        )
    }

    /// Unit busy
    pub fn announce_unit_busy(&self, unit: &str) -> Option<Uuid> {
        self.announce(
            AlertSwitch::StatusChanges,
            || templates::unit_busy(unit),
            SpeakOptions::new(Priority::Low, AlertType::Status),
        )
    }

    /// Unit out of service
    pub fn announce_unit_offline(&self, unit: &str) -> Option<Uuid> {
        self.announce(
            AlertSwitch::StatusChanges,
            || templates::unit_offline(unit),
            SpeakOptions::new(Priority::Low, AlertType::Status),
        )
    }

    /// Unit responding
    pub fn announce_unit_en_route(&self, unit: &str, location: &str) -> Option<Uuid> {
        self.announce(
            AlertSwitch::UnitStatus,
            || templates::unit_en_route(unit, location),
            SpeakOptions::new(Priority::Normal, AlertType::Status),
        )
    }

    /// Unit arrived
    pub fn announce_unit_on_scene(&self, unit: &str, location: &str) -> Option<Uuid> {
        self.announce(
            AlertSwitch::UnitStatus,
            || templates::unit_on_scene(unit, location),
            SpeakOptions::new(Priority::Normal, AlertType::Status),
        )
    }

    /// Shift start reminder
    pub fn announce_shift_start(&self, shift: &str, minutes: u32) -> Option<Uuid> {
        self.announce(
            AlertSwitch::ShiftReminders,
            || templates::shift_start(shift, minutes),
            SpeakOptions::new(Priority::Low, AlertType::Admin),
        )
    }

    /// Shift end reminder
    pub fn announce_shift_end(&self, shift: &str, minutes: u32) -> Option<Uuid> {
        self.announce(
            AlertSwitch::ShiftReminders,
            || templates::shift_end(shift, minutes),
            SpeakOptions::new(Priority::Low, AlertType::Admin),
        )
    }

    /// Shift handoff
    pub fn announce_shift_handoff(&self, from_dispatcher: &str, to_dispatcher: &str) -> Option<Uuid> {
        self.announce(
            AlertSwitch::ShiftReminders,
            || templates::shift_handoff(from_dispatcher, to_dispatcher),
            SpeakOptions::new(Priority::Normal, AlertType::Admin),
        )
    }

    /// Unit entering a zone
    pub fn announce_zone_entry(&self, unit: &str, zone: &str) -> Option<Uuid> {
        self.announce(
            AlertSwitch::StatusChanges,
            || templates::zone_entry(unit, zone),
            SpeakOptions::new(Priority::Low, AlertType::Notification),
        )
    }

    /// System notice
    pub fn announce_system_update(&self, message: &str) -> Option<Uuid> {
        self.announce(
            AlertSwitch::AdminAlerts,
            || templates::system_update(message),
            SpeakOptions::new(Priority::Normal, AlertType::Admin),
        )
    }

    /// Training notice
    pub fn announce_training_available(&self, course: &str) -> Option<Uuid> {
        self.announce(
            AlertSwitch::AdminAlerts,
            || templates::training_available(course),
            SpeakOptions::new(Priority::Low, AlertType::Admin),
        )
    }

    /// Warrant list changes
    pub fn announce_warrants_update(&self, count: u32) -> Option<Uuid> {
        self.announce(
            AlertSwitch::AdminAlerts,
            || templates::warrants_update(count),
            SpeakOptions::new(Priority::Normal, AlertType::Admin),
        )
    }

    /// Estimated arrival
    pub fn announce_eta_update(&self, unit: &str, minutes: u32) -> Option<Uuid> {
        self.announce(
            AlertSwitch::UnitStatus,
            || templates::eta_update(unit, minutes),
            SpeakOptions::new(Priority::Low, AlertType::Status),
        )
    }

    /// Medical call
    pub fn announce_medical_emergency(
        &self,
        call_number: &str,
        condition: &str,
        location: &str,
    ) -> Option<Uuid> {
        self.announce(
            AlertSwitch::NewCalls,
            || templates::medical_emergency(call_number, condition, location),
            SpeakOptions::new(Priority::High, AlertType::Call).with_department(Department::Ems),
        )
    }

    /// Ambulance request
    pub fn announce_ambulance_requested(&self, location: &str, patients: u32) -> Option<Uuid> {
        self.announce(
            AlertSwitch::NewCalls,
            || templates::ambulance_requested(location, patients),
            SpeakOptions::new(Priority::High, AlertType::Call).with_department(Department::Ems),
        )
    }

    /// Fire call
    pub fn announce_fire_emergency(
        &self,
        call_number: &str,
        fire_type: &str,
        location: &str,
    ) -> Option<Uuid> {
        self.announce(
            AlertSwitch::NewCalls,
            || templates::fire_emergency(call_number, fire_type, location),
            SpeakOptions::new(Priority::Critical, AlertType::Call)
                .with_department(Department::Fire),
        )
    }

    /// Hazardous materials incident
    pub fn announce_hazmat_alert(&self, material: &str, location: &str) -> Option<Uuid> {
        self.announce(
            AlertSwitch::NewCalls,
            || templates::hazmat_alert(material, location),
            SpeakOptions::new(Priority::Critical, AlertType::Call)
                .with_department(Department::Fire),
        )
    }

    /// Speak a user template
    ///
    /// # Errors
    ///
    /// Returns `TemplateNotFound` when no custom template has this key.
    pub fn announce_custom(
        &self,
        key: &str,
        variables: &HashMap<String, String>,
        options: SpeakOptions,
    ) -> VoiceAlertResult<Option<Uuid>> {
        let text = templates::render_custom(&self.engine.config().custom_templates, key, variables)?;
        Ok(self.engine.speak(text, options))
    }
}
