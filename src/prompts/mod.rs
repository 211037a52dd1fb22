//! System message assembly
//!
//! Every request's system message is the persona prompt, followed by the
//! current local time, then optional live search results, then optional
//! retrieved context.

pub mod persona_prompt;

use chrono::{Local, NaiveDateTime};

/// Format a timestamp as the time block shown to the model
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use jarvis::prompts::format_time_information;
///
/// let at = NaiveDate::from_ymd_opt(2026, 2, 5)
///     .unwrap()
///     .and_hms_opt(9, 7, 3)
///     .unwrap();
/// let block = format_time_information(&at);
/// assert!(block.contains("Day: Thursday\n"));
/// assert!(block.contains("Time: 09 hours, 07 minutes, 03 seconds\n"));
/// ```
pub fn format_time_information(now: &NaiveDateTime) -> String {
    format!(
        "Current Real-time Information:\nDay: {}\nDate: {}\nMonth: {}\nYear: {}\nTime: {} hours, {} minutes, {} seconds\n",
        now.format("%A"),
        now.format("%d"),
        now.format("%B"),
        now.format("%Y"),
        now.format("%H"),
        now.format("%M"),
        now.format("%S"),
    )
}

/// The time block for the current local time
pub fn time_information() -> String {
    format_time_information(&Local::now().naive_local())
}

/// Assemble the system message for one request
///
/// # Arguments
///
/// * `persona` - Persona prompt
/// * `time_info` - Output of [`time_information`]
/// * `search_results` - Formatted search block, empty to omit
/// * `context` - Retrieved context, empty to omit
///
/// # Returns
///
/// The complete system message
pub fn build_system_message(
    persona: &str,
    time_info: &str,
    search_results: &str,
    context: &str,
) -> String {
    let mut message = format!("{}\n\nCurrent time and date: {}", persona, time_info);
    if !search_results.is_empty() {
        message.push_str("\n\nRecent search results:\n");
        message.push_str(search_results);
    }
    if !context.is_empty() {
        message.push_str("\n\nRelevant context from your learning data and past conversations:\n");
        message.push_str(context);
    }
    message
}
