//! Radio kill-switch command handlers.

use crossterm::style::Stylize;

use super::CommandResult;
use hp_wmi::{RadioRow, Session};

fn print_row(row: &RadioRow) {
    let soft = if row.soft_blocked {
        "blocked".red()
    } else {
        "unblocked".green()
    };
    let hard = if row.hard_blocked {
        "blocked".red()
    } else {
        "unblocked".green()
    };
    let id = row
        .info
        .firmware_id
        .map(|id| format!(" id=0x{:02x}", id))
        .unwrap_or_default();
    println!(
        "{}: {:<14} soft: {}  hard: {}{}",
        row.info.index, row.info.name, soft, hard, id
    );
}

/// List registered radios
pub fn list(session: &Session) -> CommandResult {
    let rows = session.radio_rows();
    if rows.is_empty() {
        println!("No radios registered");
        return Ok(());
    }
    for row in &rows {
        print_row(row);
    }
    Ok(())
}

/// Change a radio's software block and show the refreshed state
pub fn set_blocked(session: &Session, index: usize, blocked: bool) -> CommandResult {
    session.platform.set_radio_blocked(index, blocked)?;
    if let Some(row) = session.radio_rows().get(index) {
        print_row(row);
    }
    Ok(())
}
