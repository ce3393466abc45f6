//! Notification injection and resume handlers.

use super::{print_input_events, CommandResult};
use hp_wmi::{parse_hex_bytes, Session};
use hpwmi_transport::RawNotification;

/// Notification value the event interface is signalled with
const EVENT_NOTIFY_VALUE: u32 = 0x80;

/// Decode and dispatch one notification buffer
pub fn event(session: &Session, bytes: &[String], no_data: bool) -> CommandResult {
    let raw = if no_data {
        RawNotification::new(EVENT_NOTIFY_VALUE, None)
    } else {
        RawNotification::buffer(EVENT_NOTIFY_VALUE, parse_hex_bytes(bytes)?)
    };

    session.input.take();
    match session.platform.handle_notification(&raw) {
        Some(action) => println!("Dispatched: {:?}", action),
        None => println!("Dropped"),
    }
    print_input_events(&session.input.take());
    Ok(())
}

/// Run the resume hook
pub fn resume(session: &Session) -> CommandResult {
    session.input.take();
    session.platform.resume()?;
    println!("Resumed");
    print_input_events(&session.input.take());
    super::rfkill::list(session)
}
