use calmpulse_core::risk::format_time;
use calmpulse_core::{Event, StateKind, TrackerHandle};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub async fn start(handle: &TrackerHandle) -> CmdResult {
    match handle.start().await? {
        Some(_) => println!("Tracking started."),
        None => println!("Already tracking."),
    }
    Ok(())
}

pub async fn stop(handle: &TrackerHandle) -> CmdResult {
    match handle.stop().await? {
        Some(Event::TrackingStopped {
            elapsed_secs,
            breaks,
            ..
        }) => println!(
            "Tracking stopped after {} with {breaks} break(s).",
            format_time(elapsed_secs)
        ),
        Some(_) => println!("Tracking stopped."),
        None => println!("Not tracking."),
    }
    Ok(())
}

pub async fn pause(handle: &TrackerHandle) -> CmdResult {
    match handle.pause().await? {
        Some(_) => println!("Paused."),
        None => println!("Only a running session can be paused."),
    }
    Ok(())
}

pub async fn resume(handle: &TrackerHandle) -> CmdResult {
    match handle.resume().await? {
        Some(_) => println!("Resumed."),
        None => println!("Nothing to resume."),
    }
    Ok(())
}

pub async fn start_break(handle: &TrackerHandle) -> CmdResult {
    match handle.start_break().await? {
        Some(Event::BreakStarted {
            duration_secs,
            activity,
            ..
        }) => println!(
            "Break started ({}): {}",
            format_time(duration_secs),
            activity.description()
        ),
        Some(_) => println!("Break started."),
        None => println!("Breaks can only be taken while tracking."),
    }
    Ok(())
}

pub async fn skip_break(handle: &TrackerHandle) -> CmdResult {
    match handle.skip_break().await? {
        Some(_) => println!("Break skipped."),
        None => println!("Not on a break."),
    }
    Ok(())
}

pub async fn status(handle: &TrackerHandle, json: bool) -> CmdResult {
    let snapshot = handle.snapshot().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let Event::StateSnapshot {
        state,
        elapsed_secs,
        time_since_last_break_secs,
        breaks_this_session,
        break_remaining_secs,
        activity,
        pomodoro_session,
        ..
    } = snapshot
    else {
        return Err("tracker returned an unexpected reply".into());
    };

    println!("State: {}", state.label());
    println!("Session: {}", format_time(elapsed_secs));
    println!("Since last break: {}", format_time(time_since_last_break_secs));
    println!("Breaks this session: {breaks_this_session}");
    if state == StateKind::OnBreak {
        let activity = activity.map(|a| a.description()).unwrap_or_default();
        println!(
            "Break: {} remaining. {activity}",
            format_time(break_remaining_secs)
        );
    }
    if let Some(index) = pomodoro_session {
        let pomodoro = handle.pomodoro().await?;
        println!(
            "Pomodoro: session {} of {}",
            index + 1,
            pomodoro.sessions_before_long_break
        );
    }

    let assessment = handle.assess().await?;
    println!("Risk: {}", assessment.tier.label());
    println!("Status: {}", assessment.status_label);
    for line in &assessment.recommendations {
        println!("  - {line}");
    }
    Ok(())
}
