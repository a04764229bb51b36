/// Render whole seconds as `H:MM:SS`.
///
/// Hours are unbounded; minutes and seconds are zero-padded.
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}
