//! Terminal styling for table output.

use crossterm::style::Stylize;

const LABEL_WIDTH: usize = 14;

pub fn heading(title: &str) {
    println!("{}", title.bold().underlined());
}

/// One-line confirmation of a finished command.
pub fn done(msg: &str) {
    println!("{} {}", "ok".green().bold(), msg);
}

/// Right-aligned label followed by its value.
pub fn field(label: &str, value: &str) {
    println!("{}  {}", label_cell(label).dark_grey(), value);
}

pub fn tip(msg: &str) {
    println!("{} {}", "hint:".yellow(), msg.italic());
}

fn label_cell(label: &str) -> String {
    format!("{:>width$}", label, width = LABEL_WIDTH)
}
