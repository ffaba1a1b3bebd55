use tokio::task::JoinHandle;
use tracing::debug;

use calmpulse_core::advisory::{burnout_tips, estimate_locally};
use calmpulse_core::{BurnoutClient, BurnoutPrediction, BurnoutRequest, BurnoutRisk, TrackerHandle};

/// Start a burnout check for the current session.
///
/// The request runs on its own task so the shell and the tracker keep going
/// while it is in flight. Offline checks finish immediately.
pub async fn check(
    handle: &TrackerHandle,
    client: Option<&BurnoutClient>,
    mood: u8,
    sleep: f64,
    offline: bool,
) -> Result<Option<JoinHandle<()>>, Box<dyn std::error::Error>> {
    let session = handle.session().await?;
    let stats = handle.statistics().await?;
    let request = BurnoutRequest::from_tracking(&session, &stats, mood, sleep);
    request.validate()?;

    if offline {
        print_prediction(
            "Estimated burnout risk",
            &BurnoutPrediction {
                risk: estimate_locally(&request),
                recommendations: Vec::new(),
            },
        );
        return Ok(None);
    }

    let client = client
        .ok_or("burnout checks are unavailable; fix advisory_endpoint or use --offline")?
        .clone();
    println!("Checking burnout risk...");
    Ok(Some(tokio::spawn(async move {
        match client.predict(&request).await {
            Ok(prediction) => print_prediction("Burnout risk", &prediction),
            Err(e) => {
                debug!(error = ?e, "burnout check failed");
                println!("{e}");
            }
        }
    })))
}

pub fn tips() {
    println!("Tips to Reduce Burnout:");
    for tip in burnout_tips() {
        println!("  - {tip}");
    }
}

fn print_prediction(heading: &str, prediction: &BurnoutPrediction) {
    println!("{heading}: {}", prediction.risk.label());
    for line in &prediction.recommendations {
        println!("  - {line}");
    }
    if prediction.risk == BurnoutRisk::High {
        tips();
    }
}
