// Seraph Server — French Datetime
// Renders the current local time the way the personas speak: lowercase French
// day and month names, 24h clock. The string is appended verbatim to every
// system prompt so the model always knows "now".

use chrono::{DateTime, Datelike, Local, Timelike};

const JOURS: [&str; 7] = [
    "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
];

const MOIS: [&str; 12] = [
    "janvier",
    "fevrier",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "aout",
    "septembre",
    "octobre",
    "novembre",
    "decembre",
];

/// `"{jour} {day} {mois} {year}, {HH:MM}"`, e.g. `"mardi 3 mars 2026, 14:05"`.
pub fn format_french(t: &DateTime<Local>) -> String {
    format!(
        "{} {} {} {}, {:02}:{:02}",
        JOURS[t.weekday().num_days_from_monday() as usize],
        t.day(),
        MOIS[t.month0() as usize],
        t.year(),
        t.hour(),
        t.minute()
    )
}

pub fn french_now() -> String {
    format_french(&Local::now())
}

// ── Tests ──────────────────────────────────────────────────────────────────
