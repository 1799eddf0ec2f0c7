//! Terminal output for the scaffold commands.

use std::time::Duration;

use console::{style, Color};
use indicatif::{ProgressBar, ProgressStyle};

const ACCENT: Color = Color::Color256(51);
const ALERT: Color = Color::Color256(201);
const CAUTION: Color = Color::Color256(220);
const SUCCESS: Color = Color::Color256(82);
const MUTED: Color = Color::Color256(240);

/// Outer width of a panel, borders included.
const PANEL_WIDTH: usize = 55;

pub mod symbols {
    pub const DIAMOND: &str = "\u{25C6}"; // ◆
    pub const TRIANGLE: &str = "\u{25B8}"; // ▸
    pub const DOT: &str = "\u{00B7}"; // ·
}

const OUTLINE: &str = "\u{25C7}"; // ◇
const WARNING: &str = "\u{25B2}"; // ▲
const TARGET: &str = "\u{25C9}"; // ◉

pub fn header(version: &str) {
    println!(
        "  {} {} {}",
        style(symbols::DIAMOND).fg(ACCENT),
        style("scaffold").fg(ACCENT).bold(),
        style(version).dim()
    );
}

pub fn info(msg: &str) {
    println!("  {} {}", style(OUTLINE).fg(ACCENT), msg);
}

pub fn muted(msg: &str) {
    println!("  {}", style(msg).fg(MUTED));
}

/// Warning line with an optional hint underneath.
pub fn warning(msg: &str, help: Option<&str>) {
    println!("  {} {}", style(WARNING).fg(CAUTION), style(msg).fg(CAUTION));
    if let Some(help) = help {
        println!("      {}", style(help).fg(MUTED));
    }
}

pub fn timing(label: &str, duration_ms: u128) {
    println!("  {} {} in {}ms", style(OUTLINE).fg(ACCENT), label, duration_ms);
}

/// Result line for `check`.
pub fn verdict(ok: bool) {
    if ok {
        println!("  {} {}", style(TARGET).fg(SUCCESS), style("Looking good.").bold());
    } else {
        println!();
        println!("  {} {}", style(symbols::DIAMOND).fg(ALERT).bold(), style("Nope.").fg(ALERT).bold());
        println!();
    }
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let spinner_style = ProgressStyle::default_spinner()
        .tick_chars("\u{25CE}\u{25C9}\u{25CE}\u{25C9}") // ◎◉◎◉
        .template("  {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(spinner_style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(150));
    pb
}

/// Rounded box with a title in the top border.
pub fn panel(title: &str, lines: &[String]) {
    let inner = PANEL_WIDTH - 2;
    let title = format!(" {} ", title);
    let rule = inner.saturating_sub(title.chars().count() + 1);

    println!(
        "  {}{}{}{}",
        style("\u{256D}\u{2500}").fg(ACCENT),
        style(&title).fg(ACCENT).bold(),
        style("\u{2500}".repeat(rule)).fg(ACCENT),
        style("\u{256E}").fg(ACCENT)
    );
    for line in lines {
        let padding = (inner - 1).saturating_sub(line.chars().count());
        println!(
            "  {} {}{}{}",
            style("\u{2502}").fg(ACCENT),
            line,
            " ".repeat(padding),
            style("\u{2502}").fg(ACCENT)
        );
    }
    println!(
        "  {}{}{}",
        style("\u{2570}").fg(ACCENT),
        style("\u{2500}".repeat(inner)).fg(ACCENT),
        style("\u{256F}").fg(ACCENT)
    );
}

pub fn section(name: &str) {
    println!();
    println!("  {} {}", style(symbols::TRIANGLE).fg(ACCENT), style(name).bold());
}

/// Tree of `(name, description)` rows.
pub fn tree(rows: &[(String, String)]) {
    for (i, (name, description)) in rows.iter().enumerate() {
        let connector = if i + 1 == rows.len() {
            "\u{2570}\u{2500}\u{2500}" // ╰──
        } else {
            "\u{251C}\u{2500}\u{2500}" // ├──
        };
        println!(
            "    {}  {}   {}",
            style(connector).fg(MUTED),
            style(name).fg(ACCENT),
            style(description).dim()
        );
    }
}

/// Pads a label to a fixed column width.
pub fn column(label: &str, width: usize) -> String {
    format!("{:<width$}", label, width = width)
}
