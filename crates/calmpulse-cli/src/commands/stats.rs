use calmpulse_core::risk::{daily_goal_progress_pct, format_time};
use calmpulse_core::TrackerHandle;

pub async fn run(handle: &TrackerHandle, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let stats = handle.statistics().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let settings = handle.settings().await?;
    println!("Date:            {}", stats.last_update_date);
    println!(
        "Today:           {} ({}% of daily goal)",
        format_time(stats.daily_screen_time),
        daily_goal_progress_pct(stats.daily_screen_time, settings.daily_goal_minutes)
    );
    println!("This week:       {}", format_time(stats.weekly_screen_time));
    println!("Breaks today:    {}", stats.total_breaks_today);
    println!("Average session: {}", format_time(stats.average_session_length));
    println!("Longest session: {}", format_time(stats.longest_session_seconds));
    Ok(())
}
