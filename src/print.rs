//! ## Printing Module
//!
//! This module is only here to make logging in the terminal easier to read.
//! It allows to print in appropriate colors depending on the situation.
//! It also provides a nice print-format for the [WorldView].
use std::sync::Mutex;

use ansi_term::Colour::{self, Green, Red, Yellow, Purple, White, Cyan};
use once_cell::sync::Lazy;
use unicode_width::UnicodeWidthStr;

use crate::config;
use crate::elevator_logic::Direction;
use crate::world_view::WorldView;

fn enabled(flag: &Lazy<Mutex<bool>>) -> bool {
    *flag.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Prints an error message in red to the terminal.
///
/// If [config::PRINT_ERR_ON] is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[ERROR\]:   {}", msg
///
/// ## Example
/// ```
/// use elevatorbank::print;
///
/// print::err("Something went wrong!".to_string());
/// ```
pub fn err(msg: String) {
    if enabled(&config::PRINT_ERR_ON) {
        println!("{}{}", Red.paint("[ERROR]:   "), Red.paint(msg));
    }
}

/// Prints a warning message in yellow to the terminal.
///
/// If [config::PRINT_WARN_ON] is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[WARNING\]: {}", msg
pub fn warn(msg: String) {
    if enabled(&config::PRINT_WARN_ON) {
        println!("{}{}", Yellow.paint("[WARNING]: "), Yellow.paint(msg));
    }
}

/// Prints a success message in green to the terminal.
///
/// If [config::PRINT_OK_ON] is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[OK\]:      {}", msg
pub fn ok(msg: String) {
    if enabled(&config::PRINT_OK_ON) {
        println!("{}{}", Green.paint("[OK]:      "), Green.paint(msg));
    }
}

/// Prints an informational message in light blue to the terminal.
///
/// If [config::PRINT_INFO_ON] is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[INFO\]:    {}", msg
pub fn info(msg: String) {
    if enabled(&config::PRINT_INFO_ON) {
        let light_blue = Colour::RGB(102, 178, 255);
        println!("{}{}", light_blue.paint("[INFO]:    "), light_blue.paint(msg));
    }
}

/// Prints a per-car movement message, tagged with the car id (one-based, like the floors).
///
/// Gated by [config::PRINT_ELSE_ON]. Cars cycle through a few colours so
/// interleaved trails stay readable.
///
/// ## Terminal output
/// - "\[CAR 2\]:   {}", msg
pub fn elevator(id: u32, msg: String) {
    if enabled(&config::PRINT_ELSE_ON) {
        let colours = [
            Colour::RGB(255, 51, 255),
            Colour::RGB(153, 76, 0),
            Cyan,
            Colour::RGB(0, 153, 76),
        ];
        let colour = colours[id as usize % colours.len()];
        let tag = pad_text(&format!("[CAR {}]:", id + 1), 11);
        println!("{}{}", colour.paint(tag), colour.paint(msg));
    }
}

/// Pads the input text to a fixed display width using spaces.
///
/// Accounts for characters that may take more than one column width (e.g. Unicode symbols),
/// ensuring aligned text in terminal-based tables.
fn pad_text(text: &str, width: usize) -> String {
    let visible_width = UnicodeWidthStr::width(text);
    let padding = width.saturating_sub(visible_width);
    format!("{}{}", text, " ".repeat(padding))
}

fn direction_label(dirn: Direction, width: usize) -> String {
    match dirn {
        Direction::Idle => Green.paint(pad_text("Idle", width)).to_string(),
        Direction::Up => Yellow.paint(pad_text("⬆ Up", width)).to_string(),
        Direction::Down => Yellow.paint(pad_text("⬇ Down", width)).to_string(),
    }
}

/// Logs the current [WorldView] to the terminal as a table.
///
/// One row per car (floor, direction, doors, load, pending floors), then one row
/// per floor with the number of passengers waiting in each direction.
///
/// If [config::PRINT_STATUS_ON] is false, the function exits early.
pub fn world_view(view: &WorldView) {
    if !enabled(&config::PRINT_STATUS_ON) {
        return;
    }

    println!("{}", Purple.bold().paint("┌────────────────────────────────┐"));
    println!("{}", Purple.bold().paint("│          BUILDING STATUS       │"));
    println!("{}", Purple.bold().paint("└────────────────────────────────┘"));

    println!("┌──────┬───────┬──────────┬────────┬──────────┬──────────────────────┐");
    println!("{}", White.bold().paint("│ Car  │ Floor │ Dirn     │ Doors  │ Load     │ Pending floors       │"));
    println!("├──────┼───────┼──────────┼────────┼──────────┼──────────────────────┤");
    for car in &view.elevators {
        let doors = if car.doors_open {
            Yellow.paint(pad_text("Open", 6)).to_string()
        } else {
            Green.paint(pad_text("Closed", 6)).to_string()
        };
        let load = format!("{}/{}", car.passengers, car.capacity);
        let pending: Vec<String> = car.pending_floors.iter().map(|f| f.to_string()).collect();
        let running = if car.running { "" } else { " (stopped)" };
        println!(
            "│ {} │ {} │ {} │ {} │ {} │ {} │",
            pad_text(&(car.id + 1).to_string(), 4),
            pad_text(&car.floor.to_string(), 5),
            direction_label(car.direction, 8),
            doors,
            pad_text(&load, 8),
            pad_text(&format!("{}{}", pending.join(","), running), 20),
        );
    }
    println!("└──────┴───────┴──────────┴────────┴──────────┴──────────────────────┘");

    println!("┌───────┬──────────┬──────────┐");
    println!("{}", White.bold().paint("│ Floor │ Wait up  │ Wait dn  │"));
    println!("├───────┼──────────┼──────────┤");
    for floor in view.floors.iter().rev() {
        let up = count_label(floor.waiting_up, 8);
        let down = count_label(floor.waiting_down, 8);
        println!("│ {} │ {} │ {} │", pad_text(&floor.floor.to_string(), 5), up, down);
    }
    println!("└───────┴──────────┴──────────┘");
    println!("{}", Cyan.paint(format!("Delivered passengers: {}", view.delivered)));
}

fn count_label(count: usize, width: usize) -> String {
    let text = pad_text(&count.to_string(), width);
    if count == 0 {
        Green.paint(text).to_string()
    } else {
        Red.paint(text).to_string()
    }
}
