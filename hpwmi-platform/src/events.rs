//! Event notification dispatch
//!
//! Every known event id maps to one [`EventAction`] through a fixed table.
//! Unknown ids are logged and dropped.

use serde::Serialize;
use tracing::{debug, info, warn};

use hpwmi_transport::protocol::query;
use hpwmi_transport::{parse_notification, BiosQuery, EventId, Notification, RawNotification};

use crate::Platform;

/// What an event triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Re-read dock and tablet switches
    Switches,
    /// Read the hotkey scancode and report the key
    Hotkey,
    /// Refresh every registered radio
    RadioRefresh,
    /// Logged, no state change
    BatteryThrottle,
    /// Recognised, no state change
    Ignore,
}

/// Dispatch table
pub const DISPATCH: [(EventId, EventAction); 16] = [
    (EventId::Dock, EventAction::Switches),
    (EventId::ParkHdd, EventAction::Ignore),
    (EventId::SmartAdapter, EventAction::Ignore),
    (EventId::BezelButton, EventAction::Hotkey),
    (EventId::Wireless, EventAction::RadioRefresh),
    (EventId::CpuBatteryThrottle, EventAction::BatteryThrottle),
    (EventId::LockSwitch, EventAction::Ignore),
    (EventId::LidSwitch, EventAction::Ignore),
    (EventId::ScreenRotation, EventAction::Ignore),
    (EventId::CoolsenseSystemMobile, EventAction::Ignore),
    (EventId::CoolsenseSystemHot, EventAction::Ignore),
    (EventId::ProximitySensor, EventAction::Ignore),
    (EventId::BacklitKbBrightness, EventAction::Ignore),
    (EventId::PeakshiftPeriod, EventAction::Ignore),
    (EventId::BatteryChargePeriod, EventAction::Ignore),
    (EventId::OmenKey, EventAction::Hotkey),
];

pub fn action_for(event_id: u32) -> Option<EventAction> {
    DISPATCH
        .iter()
        .find(|(id, _)| *id as u32 == event_id)
        .map(|(_, action)| *action)
}

impl Platform {
    /// Decode a raw notification and dispatch it
    ///
    /// Returns the action taken, or `None` when the notification was dropped.
    pub fn handle_notification(&self, raw: &RawNotification) -> Option<EventAction> {
        match parse_notification(raw.payload.as_ref()) {
            Ok(notification) => self.dispatch(notification),
            Err(e) => {
                info!("bad event value 0x{:x}: {}", raw.value, e);
                None
            }
        }
    }

    pub fn dispatch(&self, notification: Notification) -> Option<EventAction> {
        let Some(action) = action_for(notification.event_id) else {
            info!(
                "Unknown event_id - {} - 0x{:x}",
                notification.event_id, notification.event_data
            );
            return None;
        };
        debug!(
            "event {} data=0x{:x} -> {:?}",
            notification.id().map_or("UNKNOWN", |id| id.name()),
            notification.event_data,
            action
        );

        let state = self.state.lock();
        match action {
            EventAction::Switches => self.report_switches(),
            EventAction::Hotkey => self.report_hotkey(),
            EventAction::RadioRefresh => {
                if let Some(radios) = &state.radios {
                    if let Err(e) = radios.refresh(&*self.transport) {
                        warn!("radio refresh failed: {}", e);
                    }
                }
            }
            EventAction::BatteryThrottle => {
                info!("Unimplemented CPU throttle because of 3 Cell battery event detected");
            }
            EventAction::Ignore => {}
        }
        Some(action)
    }

    fn report_hotkey(&self) {
        let scancode = match self.transport.read_int(query::HOTKEY) {
            Ok(scancode) => scancode,
            Err(e) => {
                warn!("hotkey query failed: {}", e);
                return;
            }
        };

        match self.keymap.lookup(scancode) {
            Some(key) => {
                self.input.report_key(key, true);
                self.input.sync();
                self.input.report_key(key, false);
                self.input.sync();
            }
            None => info!("Unknown key code - 0x{:x}", scancode),
        }
    }
}
