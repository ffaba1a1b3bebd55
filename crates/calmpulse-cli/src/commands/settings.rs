use calmpulse_core::storage::SettingField;
use calmpulse_core::{PomodoroConfig, TrackerHandle};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub async fn list(handle: &TrackerHandle) -> CmdResult {
    let settings = handle.settings().await?;
    for field in SettingField::ALL {
        let unit = if field.minimum().is_some() { " min" } else { "" };
        println!("{:<20}{}{unit}", field.name(), settings.value_of(field));
    }
    Ok(())
}

pub async fn set(handle: &TrackerHandle, field: &str, value: &str) -> CmdResult {
    let settings = handle.update_setting(field, value).await?;
    let field: SettingField = field.parse()?;
    println!("{} = {}", field.name(), settings.value_of(field));
    Ok(())
}

pub async fn pomodoro(handle: &TrackerHandle, edit: Option<(String, String)>) -> CmdResult {
    let pomodoro = match edit {
        Some((field, value)) => handle.update_pomodoro(&field, &value).await?,
        None => handle.pomodoro().await?,
    };
    print_pomodoro(&pomodoro);
    Ok(())
}

fn print_pomodoro(p: &PomodoroConfig) {
    println!("enabled             {}", if p.enabled { "on" } else { "off" });
    println!("work                {} min", p.work_duration_minutes);
    println!("break               {} min", p.break_duration_minutes);
    println!("long-break          {} min", p.long_break_duration_minutes);
    println!("sessions            {}", p.sessions_before_long_break);
    println!(
        "current session     {} of {}",
        p.current_session_index + 1,
        p.sessions_before_long_break
    );
}
